//! Core data model for margo annotations.
//!
//! Mirrors the wire shapes of the W3C Web Annotation model as spoken by the
//! remote annotation store, plus the transient per-document context the
//! engine resolves on load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::selector::{Selector, SelectorKind};

// =============================================================================
// DOCUMENT KIND
// =============================================================================

/// The kind of document surface a session runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Html,
    Pdf,
}

impl DocumentKind {
    /// Selector kinds this document kind supports.
    ///
    /// PDF text layers have no stable DOM ranges, so the range selector is
    /// only produced for HTML documents.
    pub fn capabilities(&self) -> &'static [SelectorKind] {
        match self {
            DocumentKind::Html => &[
                SelectorKind::Fragment,
                SelectorKind::Range,
                SelectorKind::TextPosition,
                SelectorKind::TextQuote,
            ],
            DocumentKind::Pdf => &[
                SelectorKind::Fragment,
                SelectorKind::TextPosition,
                SelectorKind::TextQuote,
            ],
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Html => write!(f, "html"),
            DocumentKind::Pdf => write!(f, "pdf"),
        }
    }
}

impl FromStr for DocumentKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(DocumentKind::Html),
            "pdf" => Ok(DocumentKind::Pdf),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown document kind: {other}"
            ))),
        }
    }
}

// =============================================================================
// ANNOTATION
// =============================================================================

/// One annotation target: a document URI plus the selectors that locate the
/// annotated span within it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Target {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub selector: Vec<Selector>,
}

/// Read permissions attached to an annotation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub read: Vec<String>,
}

impl Permissions {
    /// Group-scoped read permission (`group:<id>`).
    pub fn group_read(group_id: &str) -> Self {
        Self {
            read: vec![format!("group:{group_id}")],
        }
    }
}

/// An annotation as returned by the store.
///
/// An annotation with a non-empty `references` list is a reply and is never
/// highlighted as a primary annotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    /// Store-assigned durable identifier.
    pub id: String,
    /// Primary target document URI.
    pub uri: String,
    /// Authoring user identifier (`acct:<user>@<authority>`).
    pub user: String,
    /// Free-text comment body.
    #[serde(default)]
    pub text: String,
    /// Tag set, including structural guide/theme/code tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Owning group identifier.
    pub group: String,
    /// Creation time (assigned by the store).
    pub created: DateTime<Utc>,
    /// Last modification time.
    pub updated: DateTime<Utc>,
    /// Parent annotation ids; non-empty for replies.
    #[serde(default)]
    pub references: Vec<String>,
    /// Targets with their selector lists; empty for page-level annotations.
    #[serde(default)]
    pub target: Vec<Target>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
    /// Document metadata echoed back by the store, when available.
    #[serde(skip_serializing_if = "Option::is_none", rename = "documentMetadata")]
    pub document_metadata: Option<DocumentInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motivation: Option<Motivation>,
}

impl Annotation {
    /// True when this annotation replies to another annotation.
    pub fn is_reply(&self) -> bool {
        !self.references.is_empty()
    }

    /// Selectors of the first target, or an empty slice for page-level
    /// annotations.
    pub fn selectors(&self) -> &[Selector] {
        self.target
            .first()
            .map(|t| t.selector.as_slice())
            .unwrap_or(&[])
    }

    /// True when every tag in `tags` is present on this annotation.
    pub fn has_all_tags(&self, tags: &[String]) -> bool {
        tags.iter().all(|t| self.tags.contains(t))
    }

    /// True when any tag of this annotation appears in `tags`.
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|t| tags.contains(t))
    }

    /// Username part of the authoring user id (`acct:alice@h.is` → `alice`).
    pub fn author_username(&self) -> &str {
        username_of(&self.user)
    }
}

/// Extract the username part of an `acct:` user identifier.
pub fn username_of(userid: &str) -> &str {
    let stripped = userid.strip_prefix("acct:").unwrap_or(userid);
    stripped.split('@').next().unwrap_or(stripped)
}

/// Extract the authority part of an `acct:` user identifier, if present.
pub fn authority_of(userid: &str) -> Option<&str> {
    userid.strip_prefix("acct:").and_then(|s| {
        let mut parts = s.splitn(2, '@');
        parts.next();
        parts.next()
    })
}

// =============================================================================
// ANNOTATION PAYLOAD (outbound wire format)
// =============================================================================

/// Motivation of an annotation, serialized in the `oa:`-prefixed wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motivation {
    #[serde(rename = "oa:classifying")]
    Classifying,
    #[serde(rename = "oa:commenting")]
    Commenting,
    #[serde(rename = "oa:replying")]
    Replying,
    #[serde(rename = "oa:defining")]
    Defining,
    #[serde(rename = "oa:codebookDevelopment")]
    CodebookDevelopment,
}

impl Motivation {
    /// The structural tag form (`oa:motivation:<value>`).
    pub fn as_tag(&self) -> String {
        format!(
            "{}:{}:{}",
            crate::defaults::TAG_NAMESPACE,
            crate::defaults::TAG_MOTIVATION,
            self.value()
        )
    }

    fn value(&self) -> &'static str {
        match self {
            Motivation::Classifying => "classifying",
            Motivation::Commenting => "commenting",
            Motivation::Replying => "replying",
            Motivation::Defining => "defining",
            Motivation::CodebookDevelopment => "codebookDevelopment",
        }
    }
}

/// One entry of the document link list sent with a new annotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLink {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    pub link_type: Option<String>,
}

impl DocumentLink {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            link_type: None,
        }
    }

    pub fn pdf(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            link_type: Some("application/pdf".to_string()),
        }
    }
}

/// Dublin Core identifiers carried for DOI-bearing documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DcMetadata {
    #[serde(default)]
    pub identifier: Vec<String>,
}

/// Highwire press metadata carried for DOI-bearing documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighwireMetadata {
    #[serde(default)]
    pub doi: Vec<String>,
}

/// Document identity metadata embedded in an annotation payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<DocumentLink>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "documentFingerprint")]
    pub document_fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dc: Option<DcMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highwire: Option<HighwireMetadata>,
}

/// Outbound payload for creating or updating an annotation.
///
/// The document metadata is duplicated into `documentMetadata` because the
/// store does not echo the `document` field back from its search API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationPayload {
    #[serde(rename = "@context")]
    pub context: String,
    pub group: String,
    pub creator: String,
    pub document: DocumentInfo,
    #[serde(skip_serializing_if = "Option::is_none", rename = "documentMetadata")]
    pub document_metadata: Option<DocumentInfo>,
    pub permissions: Permissions,
    #[serde(default)]
    pub references: Vec<String>,
    pub motivation: Motivation,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub target: Vec<Target>,
    pub text: String,
    pub uri: String,
}

// =============================================================================
// GROUPS AND PROFILE
// =============================================================================

/// Links exposed by a group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

/// A workspace group annotations belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub links: GroupLinks,
}

/// Profile metadata used for creator URI derivation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// The authenticated user's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub userid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ProfileMetadata>,
}

impl Profile {
    pub fn username(&self) -> &str {
        username_of(&self.userid)
    }

    pub fn authority(&self) -> Option<&str> {
        authority_of(&self.userid)
    }
}

// =============================================================================
// SEARCH
// =============================================================================

/// Sort order for annotation searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown sort order: {other}"
            ))),
        }
    }
}

/// Query parameters for searching annotations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchQuery {
    /// Primary identifier (fingerprint URN for fingerprinted documents).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Secondary identifier (canonical URL form).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

// =============================================================================
// DOCUMENT CONTEXT
// =============================================================================

/// Transient identity of the currently loaded document.
///
/// One per document-load session; replaced when the underlying URL changes.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentContext {
    pub kind: DocumentKind,
    /// Canonical URL with tracking parameters stripped. `None` for local
    /// files with no usable URL.
    pub canonical_url: Option<String>,
    pub doi: Option<String>,
    pub citation_pdf_url: Option<String>,
    /// SHA-256 fingerprint of the visible text of a local plain-text file.
    pub content_fingerprint: Option<String>,
    /// Fingerprint supplied by the PDF viewer for PDF documents.
    pub pdf_fingerprint: Option<String>,
    pub title: Option<String>,
    /// True when the document was opened from the local filesystem.
    pub local_file: bool,
}

impl DocumentContext {
    /// Identifier used to query existing annotations.
    ///
    /// Prefers content fingerprints over URLs so that the same PDF opened
    /// from different mirrors still resolves to one annotation set.
    pub fn uri_to_search(&self) -> Option<String> {
        if self.kind == DocumentKind::Pdf {
            if let Some(fp) = &self.pdf_fingerprint {
                return Some(format!("urn:x-pdf:{fp}"));
            }
        }
        if let Some(fp) = &self.content_fingerprint {
            return Some(format!("urn:x-txt:{fp}"));
        }
        self.canonical_url.clone()
    }

    /// Identifier stored on newly created annotations.
    ///
    /// Local files have no stable URL, so their fingerprint URN is saved
    /// instead of the canonical URL.
    pub fn uri_to_save(&self) -> Option<String> {
        if self.local_file {
            if let Some(fp) = &self.pdf_fingerprint {
                return Some(format!("urn:x-pdf:{fp}"));
            }
            if let Some(fp) = &self.content_fingerprint {
                return Some(format!("urn:x-txt:{fp}"));
            }
        }
        self.canonical_url.clone()
    }

    /// Every identifier known for this document, most authoritative first.
    pub fn document_uris(&self) -> Vec<String> {
        let mut uris = Vec::new();
        if let Some(doi) = &self.doi {
            uris.push(format!("https://doi.org/{doi}"));
        }
        if let Some(url) = &self.canonical_url {
            uris.push(url.clone());
        }
        if let Some(fp) = &self.pdf_fingerprint {
            uris.push(format!("urn:x-pdf:{fp}"));
        }
        if let Some(fp) = &self.content_fingerprint {
            uris.push(format!("urn:x-txt:{fp}"));
        }
        uris
    }

    /// Link list embedded in new annotation payloads.
    pub fn document_links(&self) -> Vec<DocumentLink> {
        self.document_uris()
            .into_iter()
            .map(DocumentLink::new)
            .collect()
    }

    /// Whichever fingerprint this document carries, if any.
    pub fn fingerprint(&self) -> Option<&str> {
        self.pdf_fingerprint
            .as_deref()
            .or(self.content_fingerprint.as_deref())
    }
}

// =============================================================================
// BULK OUTCOMES
// =============================================================================

/// A single failed item within a bulk operation.
#[derive(Debug, Clone, Serialize)]
pub struct BulkFailure {
    pub id: String,
    pub error: String,
}

/// Settled result of a bulk operation (retag, delete-all).
///
/// Bulk operations never roll back: already-applied items stay applied and
/// failures are collected per item.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkOutcome {
    pub succeeded: Vec<String>,
    pub failures: Vec<BulkFailure>,
}

impl BulkOutcome {
    pub fn record_success(&mut self, id: impl Into<String>) {
        self.succeeded.push(id.into());
    }

    pub fn record_failure(&mut self, id: impl Into<String>, error: impl fmt::Display) {
        self.failures.push(BulkFailure {
            id: id.into(),
            error: error.to_string(),
        });
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_annotation() -> Annotation {
        Annotation {
            id: "an-1".to_string(),
            uri: "https://example.com/article".to_string(),
            user: "acct:alice@hypothes.is".to_string(),
            text: String::new(),
            tags: vec!["oa:theme:Methodology".to_string()],
            group: "g1".to_string(),
            created: Utc::now(),
            updated: Utc::now(),
            references: vec![],
            target: vec![Target {
                source: None,
                selector: vec![Selector::TextQuoteSelector {
                    exact: "quoted".to_string(),
                    prefix: String::new(),
                    suffix: String::new(),
                }],
            }],
            permissions: None,
            document_metadata: None,
            motivation: Some(Motivation::Classifying),
        }
    }

    #[test]
    fn test_annotation_is_reply() {
        let mut a = sample_annotation();
        assert!(!a.is_reply());
        a.references = vec!["an-0".to_string()];
        assert!(a.is_reply());
    }

    #[test]
    fn test_annotation_selectors_empty_for_page_level() {
        let mut a = sample_annotation();
        a.target = vec![];
        assert!(a.selectors().is_empty());
    }

    #[test]
    fn test_annotation_author_username() {
        let a = sample_annotation();
        assert_eq!(a.author_username(), "alice");
    }

    #[test]
    fn test_username_of_plain_string() {
        assert_eq!(username_of("bob"), "bob");
        assert_eq!(username_of("acct:bob@example.org"), "bob");
    }

    #[test]
    fn test_authority_of() {
        assert_eq!(authority_of("acct:bob@example.org"), Some("example.org"));
        assert_eq!(authority_of("bob"), None);
    }

    #[test]
    fn test_annotation_tag_queries() {
        let a = sample_annotation();
        assert!(a.has_all_tags(&["oa:theme:Methodology".to_string()]));
        assert!(!a.has_all_tags(&["missing".to_string()]));
        assert!(a.has_any_tag(&[
            "missing".to_string(),
            "oa:theme:Methodology".to_string()
        ]));
        assert!(!a.has_any_tag(&["missing".to_string()]));
    }

    #[test]
    fn test_document_kind_capabilities() {
        assert!(DocumentKind::Html
            .capabilities()
            .contains(&SelectorKind::Range));
        assert!(!DocumentKind::Pdf
            .capabilities()
            .contains(&SelectorKind::Range));
        assert_eq!(DocumentKind::Html.capabilities().len(), 4);
        assert_eq!(DocumentKind::Pdf.capabilities().len(), 3);
    }

    #[test]
    fn test_document_kind_roundtrip() {
        assert_eq!("html".parse::<DocumentKind>().unwrap(), DocumentKind::Html);
        assert_eq!("pdf".parse::<DocumentKind>().unwrap(), DocumentKind::Pdf);
        assert!("docx".parse::<DocumentKind>().is_err());
        assert_eq!(DocumentKind::Pdf.to_string(), "pdf");
    }

    #[test]
    fn test_sort_order_roundtrip() {
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!(SortOrder::Desc.to_string(), "desc");
        assert!("sideways".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_motivation_wire_form() {
        let json = serde_json::to_string(&Motivation::Classifying).unwrap();
        assert_eq!(json, r#""oa:classifying""#);
        let json = serde_json::to_string(&Motivation::CodebookDevelopment).unwrap();
        assert_eq!(json, r#""oa:codebookDevelopment""#);
    }

    #[test]
    fn test_motivation_as_tag() {
        assert_eq!(
            Motivation::CodebookDevelopment.as_tag(),
            "oa:motivation:codebookDevelopment"
        );
    }

    #[test]
    fn test_permissions_group_read() {
        let p = Permissions::group_read("g42");
        assert_eq!(p.read, vec!["group:g42".to_string()]);
    }

    #[test]
    fn test_payload_wire_shape() {
        let payload = AnnotationPayload {
            context: crate::defaults::ANNOTATION_CONTEXT.to_string(),
            group: "g1".to_string(),
            creator: "https://orcid.org/0000-0001".to_string(),
            document: DocumentInfo {
                title: Some("Article".to_string()),
                link: vec![DocumentLink::new("https://example.com/article")],
                ..Default::default()
            },
            document_metadata: None,
            permissions: Permissions::group_read("g1"),
            references: vec![],
            motivation: Motivation::Classifying,
            tags: vec!["oa:code:Interview".to_string()],
            target: vec![],
            text: String::new(),
            uri: "https://example.com/article".to_string(),
        };

        let json: serde_json::Value = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["@context"], "http://www.w3.org/ns/anno.jsonld");
        assert_eq!(json["permissions"]["read"][0], "group:g1");
        assert_eq!(json["motivation"], "oa:classifying");
        assert_eq!(json["document"]["link"][0]["href"], "https://example.com/article");
        // documentMetadata absent when None
        assert!(json.get("documentMetadata").is_none());
    }

    #[test]
    fn test_document_link_pdf_type() {
        let link = DocumentLink::pdf("https://example.com/paper.pdf");
        let json: serde_json::Value = serde_json::to_value(&link).unwrap();
        assert_eq!(json["type"], "application/pdf");
    }

    #[test]
    fn test_annotation_deserializes_store_response() {
        let raw = r#"{
            "id": "d3Nv1A",
            "uri": "https://example.com/a",
            "user": "acct:bob@hypothes.is",
            "text": "interesting",
            "tags": ["oa:code:Survey"],
            "group": "g9",
            "created": "2026-08-01T10:00:00Z",
            "updated": "2026-08-01T10:05:00Z",
            "references": [],
            "target": [{"selector": [{"type": "TextQuoteSelector", "exact": "x", "prefix": "", "suffix": ""}]}]
        }"#;
        let a: Annotation = serde_json::from_str(raw).unwrap();
        assert_eq!(a.id, "d3Nv1A");
        assert_eq!(a.selectors().len(), 1);
        assert!(!a.is_reply());
    }

    #[test]
    fn test_search_query_serializes_only_set_fields() {
        let q = SearchQuery {
            uri: Some("urn:x-pdf:abc".to_string()),
            group: Some("g1".to_string()),
            order: Some(SortOrder::Asc),
            ..Default::default()
        };
        let json: serde_json::Value = serde_json::to_value(&q).unwrap();
        assert_eq!(json["uri"], "urn:x-pdf:abc");
        assert_eq!(json["order"], "asc");
        assert!(json.get("url").is_none());
        assert!(json.get("tag").is_none());
    }

    fn sample_context() -> DocumentContext {
        DocumentContext {
            kind: DocumentKind::Html,
            canonical_url: Some("https://example.com/article".to_string()),
            doi: None,
            citation_pdf_url: None,
            content_fingerprint: None,
            pdf_fingerprint: None,
            title: Some("Article".to_string()),
            local_file: false,
        }
    }

    #[test]
    fn test_context_uri_preference_html() {
        let ctx = sample_context();
        assert_eq!(
            ctx.uri_to_search().as_deref(),
            Some("https://example.com/article")
        );
        assert_eq!(
            ctx.uri_to_save().as_deref(),
            Some("https://example.com/article")
        );
    }

    #[test]
    fn test_context_uri_preference_pdf_fingerprint() {
        let mut ctx = sample_context();
        ctx.kind = DocumentKind::Pdf;
        ctx.pdf_fingerprint = Some("fp123".to_string());
        assert_eq!(ctx.uri_to_search().as_deref(), Some("urn:x-pdf:fp123"));
        // Web-hosted PDF still saves its URL
        assert_eq!(
            ctx.uri_to_save().as_deref(),
            Some("https://example.com/article")
        );
    }

    #[test]
    fn test_context_uri_preference_local_file() {
        let mut ctx = sample_context();
        ctx.local_file = true;
        ctx.canonical_url = None;
        ctx.content_fingerprint = Some("deadbeef".to_string());
        assert_eq!(ctx.uri_to_search().as_deref(), Some("urn:x-txt:deadbeef"));
        assert_eq!(ctx.uri_to_save().as_deref(), Some("urn:x-txt:deadbeef"));
    }

    #[test]
    fn test_context_document_uris_order() {
        let mut ctx = sample_context();
        ctx.doi = Some("10.1234/xyz".to_string());
        ctx.pdf_fingerprint = Some("fp".to_string());
        let uris = ctx.document_uris();
        assert_eq!(uris[0], "https://doi.org/10.1234/xyz");
        assert_eq!(uris[1], "https://example.com/article");
        assert_eq!(uris[2], "urn:x-pdf:fp");
    }

    #[test]
    fn test_bulk_outcome_accounting() {
        let mut outcome = BulkOutcome::default();
        outcome.record_success("a");
        outcome.record_success("b");
        outcome.record_failure("c", "store said no");
        assert_eq!(outcome.success_count(), 2);
        assert_eq!(outcome.failure_count(), 1);
        assert!(!outcome.is_complete());
        assert_eq!(outcome.failures[0].error, "store said no");
    }
}
