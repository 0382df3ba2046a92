//! Construction of outbound annotation payloads.
//!
//! The store never echoes the `document` block back from search, so every
//! payload duplicates it into `documentMetadata`, which does survive.

use margo_core::defaults::ANNOTATION_CONTEXT;
use margo_core::{
    Annotation, AnnotationPayload, DcMetadata, DocumentContext, DocumentInfo, Error,
    HighwireMetadata, Motivation, Permissions, Result, Selector, Target,
};

fn document_info(context: &DocumentContext) -> DocumentInfo {
    DocumentInfo {
        title: context.title.clone(),
        link: context.document_links(),
        document_fingerprint: context.fingerprint().map(str::to_string),
        dc: context.doi.as_ref().map(|doi| DcMetadata {
            identifier: vec![doi.clone()],
        }),
        highwire: context.doi.as_ref().map(|doi| HighwireMetadata {
            doi: vec![doi.clone()],
        }),
    }
}

/// Payload for a new primary annotation on the current document.
///
/// An empty selector list produces a page-level annotation with no target.
pub fn annotation_payload(
    context: &DocumentContext,
    group_id: &str,
    creator: &str,
    tags: Vec<String>,
    selectors: Vec<Selector>,
    text: impl Into<String>,
) -> Result<AnnotationPayload> {
    let uri = context
        .uri_to_save()
        .ok_or_else(|| Error::InvalidInput("document has no savable URI".to_string()))?;
    let target = if selectors.is_empty() {
        Vec::new()
    } else {
        vec![Target {
            source: Some(uri.clone()),
            selector: selectors,
        }]
    };
    let document = document_info(context);
    Ok(AnnotationPayload {
        context: ANNOTATION_CONTEXT.to_string(),
        group: group_id.to_string(),
        creator: creator.to_string(),
        document: document.clone(),
        document_metadata: Some(document),
        permissions: Permissions::group_read(group_id),
        references: Vec::new(),
        motivation: Motivation::Classifying,
        tags,
        target,
        text: text.into(),
        uri,
    })
}

/// Payload for a reply to an existing annotation.
///
/// The reference chain is the parent's chain plus the parent itself, so
/// nested replies stay threaded.
pub fn reply_payload(
    parent: &Annotation,
    creator: &str,
    text: impl Into<String>,
) -> AnnotationPayload {
    let mut references = parent.references.clone();
    references.push(parent.id.clone());
    AnnotationPayload {
        context: ANNOTATION_CONTEXT.to_string(),
        group: parent.group.clone(),
        creator: creator.to_string(),
        document: parent.document_metadata.clone().unwrap_or_default(),
        document_metadata: parent.document_metadata.clone(),
        permissions: Permissions::group_read(&parent.group),
        references,
        motivation: Motivation::Replying,
        tags: Vec::new(),
        target: Vec::new(),
        text: text.into(),
        uri: parent.uri.clone(),
    }
}

/// Payload re-asserting an existing annotation, for in-place updates.
///
/// Callers mutate `text` or `tags` on the result before sending.
pub fn update_payload(annotation: &Annotation, creator: &str) -> AnnotationPayload {
    AnnotationPayload {
        context: ANNOTATION_CONTEXT.to_string(),
        group: annotation.group.clone(),
        creator: creator.to_string(),
        document: annotation.document_metadata.clone().unwrap_or_default(),
        document_metadata: annotation.document_metadata.clone(),
        permissions: annotation
            .permissions
            .clone()
            .unwrap_or_else(|| Permissions::group_read(&annotation.group)),
        references: annotation.references.clone(),
        motivation: annotation.motivation.unwrap_or(Motivation::Classifying),
        tags: annotation.tags.clone(),
        target: annotation.target.clone(),
        text: annotation.text.clone(),
        uri: annotation.uri.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use margo_core::DocumentKind;

    fn doi_context() -> DocumentContext {
        DocumentContext {
            kind: DocumentKind::Html,
            canonical_url: Some("https://example.com/article".to_string()),
            doi: Some("10.1145/3025453.3025496".to_string()),
            citation_pdf_url: None,
            content_fingerprint: None,
            pdf_fingerprint: None,
            title: Some("An Article".to_string()),
            local_file: false,
        }
    }

    #[test]
    fn test_payload_carries_document_identity() {
        let selectors = vec![Selector::TextPositionSelector { start: 5, end: 9 }];
        let payload = annotation_payload(
            &doi_context(),
            "g1",
            "https://orcid.org/0000-0002-1825-0097",
            vec!["oa:theme:Trust".to_string()],
            selectors,
            "",
        )
        .unwrap();

        assert_eq!(payload.context, ANNOTATION_CONTEXT);
        assert_eq!(payload.uri, "https://example.com/article");
        assert_eq!(payload.permissions.read, vec!["group:g1"]);
        assert_eq!(payload.motivation, Motivation::Classifying);

        let document = &payload.document;
        assert_eq!(document.title.as_deref(), Some("An Article"));
        assert_eq!(
            document.link[0].href,
            "https://doi.org/10.1145/3025453.3025496"
        );
        assert_eq!(
            document.dc.as_ref().unwrap().identifier,
            vec!["10.1145/3025453.3025496"]
        );
        assert_eq!(
            document.highwire.as_ref().unwrap().doi,
            vec!["10.1145/3025453.3025496"]
        );

        let target = &payload.target[0];
        assert_eq!(target.source.as_deref(), Some("https://example.com/article"));
        assert_eq!(target.selector.len(), 1);
    }

    #[test]
    fn test_page_level_payload_has_no_target() {
        let payload =
            annotation_payload(&doi_context(), "g1", "creator", vec![], vec![], "a note").unwrap();
        assert!(payload.target.is_empty());
        assert_eq!(payload.text, "a note");
    }

    #[test]
    fn test_payload_requires_savable_uri() {
        let context = DocumentContext {
            kind: DocumentKind::Html,
            canonical_url: None,
            doi: None,
            citation_pdf_url: None,
            content_fingerprint: None,
            pdf_fingerprint: None,
            title: None,
            local_file: true,
        };
        let err = annotation_payload(&context, "g1", "creator", vec![], vec![], "").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_reply_payload_extends_reference_chain() {
        let parent = Annotation {
            id: "parent-id".to_string(),
            uri: "https://example.com/article".to_string(),
            user: "acct:alice@h.is".to_string(),
            text: "original".to_string(),
            tags: vec!["oa:theme:Trust".to_string()],
            group: "g1".to_string(),
            created: Utc::now(),
            updated: Utc::now(),
            references: vec!["root-id".to_string()],
            target: Vec::new(),
            permissions: None,
            document_metadata: None,
            motivation: None,
        };
        let payload = reply_payload(&parent, "creator", "I agree");
        assert_eq!(payload.references, vec!["root-id", "parent-id"]);
        assert_eq!(payload.motivation, Motivation::Replying);
        assert_eq!(payload.uri, parent.uri);
        assert!(payload.tags.is_empty());
    }

    #[test]
    fn test_update_payload_preserves_annotation_fields() {
        let annotation = Annotation {
            id: "a1".to_string(),
            uri: "https://example.com/article".to_string(),
            user: "acct:alice@h.is".to_string(),
            text: "a comment".to_string(),
            tags: vec!["oa:code:Delegation".to_string()],
            group: "g1".to_string(),
            created: Utc::now(),
            updated: Utc::now(),
            references: Vec::new(),
            target: vec![Target {
                source: Some("https://example.com/article".to_string()),
                selector: vec![Selector::TextPositionSelector { start: 1, end: 4 }],
            }],
            permissions: Some(Permissions::group_read("g1")),
            document_metadata: None,
            motivation: Some(Motivation::Classifying),
        };
        let payload = update_payload(&annotation, "creator");
        assert_eq!(payload.tags, annotation.tags);
        assert_eq!(payload.text, "a comment");
        assert_eq!(payload.target.len(), 1);
        assert_eq!(payload.motivation, Motivation::Classifying);
    }
}
