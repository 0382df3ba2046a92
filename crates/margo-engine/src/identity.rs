//! Document identity resolution.
//!
//! A document can be identified many ways: a DOI carried in the URL fragment
//! or in page metadata, an explicit URL override in the fragment, a content
//! fingerprint for local files, or just its canonical URL. This module
//! resolves them all into one [`DocumentContext`] and watches live pages for
//! URL changes that happen without a full reload.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};
use tracing::debug;

use margo_core::{DocumentContext, DocumentKind, EventBus, SessionEvent};
use margo_dom::DocumentSurface;

use crate::tasks::PeriodicTask;

/// Query parameters stripped when canonicalizing a URL.
///
/// `utm_*` parameters are matched by prefix in addition to this set.
static TRACKING_PARAMS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "fbclid", "gclid", "dclid", "msclkid", "twclid", "mc_cid", "mc_eid", "igshid", "s_kwcid",
        "ref_src", "ref_url",
    ]
    .into_iter()
    .collect()
});

/// Extract a named parameter from a URL fragment.
///
/// Fragment parameters are `&`-separated `key<sep>value` pairs. The DOI
/// parameter uses a single `:` separator; the URL override uses `::` so that
/// scheme colons inside the value survive. Values are percent-decoded.
pub fn hash_param(url: &str, key: &str, separator: &str) -> Option<String> {
    let fragment = url.split_once('#')?.1;
    let prefix = format!("{key}{separator}");
    fragment
        .split('&')
        .find_map(|pair| pair.strip_prefix(prefix.as_str()))
        .filter(|value| !value.is_empty())
        .map(|value| {
            urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
}

/// Canonical form of a URL: fragment removed, tracking parameters stripped.
///
/// Two loads of the same page that differ only in campaign parameters or
/// fragment must resolve to the same annotation set.
pub fn canonical_url(url: &str) -> Option<String> {
    let without_fragment = url.split('#').next().unwrap_or(url);
    if without_fragment.is_empty() {
        return None;
    }
    let (base, query) = match without_fragment.split_once('?') {
        Some((base, query)) => (base, query),
        None => return Some(without_fragment.to_string()),
    };
    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| {
            let name = pair.split('=').next().unwrap_or(pair);
            !name.starts_with("utm_") && !TRACKING_PARAMS.contains(name)
        })
        .collect();
    if kept.is_empty() {
        Some(base.to_string())
    } else {
        Some(format!("{base}?{}", kept.join("&")))
    }
}

fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Resolve the identity of the document behind a surface.
///
/// Resolution order: DOI from the URL fragment, DOI from page metadata,
/// citation-PDF URL from metadata, explicit `url::` fragment override,
/// content fingerprint for local plain-text files, canonical URL with
/// tracking parameters stripped.
pub fn resolve_document(surface: &dyn DocumentSurface) -> DocumentContext {
    let kind = surface.kind();
    let raw_url = surface.url();

    let doi = raw_url
        .as_deref()
        .and_then(|u| hash_param(u, "doi", ":"))
        .or_else(|| surface.metadata("citation_doi"));
    let citation_pdf_url = surface.metadata("citation_pdf_url");
    let url_override = raw_url.as_deref().and_then(|u| hash_param(u, "url", "::"));

    let local_file = url_override.is_none()
        && raw_url
            .as_deref()
            .map(|u| u.starts_with("file://"))
            .unwrap_or(false);

    let canonical = if local_file {
        None
    } else {
        url_override.or_else(|| raw_url.as_deref().and_then(canonical_url))
    };

    let pdf_fingerprint = surface.pdf_fingerprint();
    let content_fingerprint = if local_file && kind == DocumentKind::Html {
        let text = surface.visible_text();
        if text.is_empty() {
            None
        } else {
            Some(sha256_hex(&text))
        }
    } else {
        None
    };

    let title = surface
        .metadata("citation_title")
        .or_else(|| surface.metadata("og:title"))
        .or_else(|| {
            if kind == DocumentKind::Pdf {
                surface.metadata("title")
            } else {
                None
            }
        })
        .or_else(|| surface.title())
        .or_else(|| Some("Unknown document".to_string()));

    let context = DocumentContext {
        kind,
        canonical_url: canonical,
        doi,
        citation_pdf_url,
        content_fingerprint,
        pdf_fingerprint,
        title,
        local_file,
    };
    debug!(
        kind = %context.kind,
        document_uri = context.uri_to_search().as_deref().unwrap_or("-"),
        doi = context.doi.as_deref().unwrap_or("-"),
        local_file = context.local_file,
        "Resolved document identity"
    );
    context
}

/// Watch a live page for canonical-URL changes.
///
/// Single-page applications navigate without a reload; the poll compares the
/// canonical URL each period and emits [`SessionEvent::DocumentUrlChanged`]
/// when it differs from the last observed value.
pub fn spawn_url_watch(
    surface: Arc<dyn DocumentSurface>,
    events: EventBus,
    period: Duration,
) -> PeriodicTask {
    let last = Arc::new(Mutex::new(
        surface.url().as_deref().and_then(canonical_url),
    ));
    PeriodicTask::spawn("url_watch", period, move || {
        let surface = surface.clone();
        let events = events.clone();
        let last = last.clone();
        async move {
            let Some(url) = surface.url().as_deref().and_then(canonical_url) else {
                return;
            };
            let mut last = last.lock().unwrap_or_else(|e| e.into_inner());
            if last.as_deref() != Some(url.as_str()) {
                debug!(url = %url, "Document URL changed");
                *last = Some(url.clone());
                events.emit(SessionEvent::DocumentUrlChanged { url });
            }
        }
    })
}
