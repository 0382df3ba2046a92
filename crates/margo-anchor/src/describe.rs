//! Selector description: from a selection to its serialized selectors.

use margo_core::defaults::QUOTE_CONTEXT_CHARS;
use margo_core::models::DocumentKind;
use margo_core::selector::{Selector, SelectorKind};
use margo_core::{Error, Result};
use margo_dom::DocumentSurface;

/// A user selection on a document surface, in character offsets within the
/// page's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub page: usize,
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(page: usize, start: usize, end: usize) -> Self {
        Self { page, start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Container path convention for range selectors produced against a
/// surface page. Browser adapters substitute real node paths.
pub(crate) fn page_container_path(page: usize) -> String {
    format!("/page[{page}]")
}

pub(crate) fn parse_container_path(path: &str) -> Option<usize> {
    path.strip_prefix("/page[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}

/// Describe a selection with every selector kind the document supports.
///
/// Selectors are emitted in the document kind's capability order; anchoring
/// later consumes them from most precise to most robust. Fails when the
/// selection is empty or falls outside the page text.
pub fn describe(surface: &dyn DocumentSurface, selection: &Selection) -> Result<Vec<Selector>> {
    if selection.is_empty() {
        return Err(Error::InvalidInput(
            "cannot describe an empty selection".to_string(),
        ));
    }
    let text = surface.page_text(selection.page).ok_or_else(|| {
        Error::InvalidInput(format!("page {} is not loaded", selection.page))
    })?;
    let chars: Vec<char> = text.chars().collect();
    if selection.end > chars.len() {
        return Err(Error::InvalidInput(format!(
            "selection {}..{} outside page text of length {}",
            selection.start,
            selection.end,
            chars.len()
        )));
    }

    let exact: String = chars[selection.start..selection.end].iter().collect();
    let prefix_start = selection.start.saturating_sub(QUOTE_CONTEXT_CHARS);
    let prefix: String = chars[prefix_start..selection.start].iter().collect();
    let suffix_end = (selection.end + QUOTE_CONTEXT_CHARS).min(chars.len());
    let suffix: String = chars[selection.end..suffix_end].iter().collect();

    let mut selectors = Vec::new();
    for kind in surface.kind().capabilities() {
        match kind {
            SelectorKind::Fragment => {
                // Page fragments are only meaningful for paginated viewers.
                if surface.kind() == DocumentKind::Pdf {
                    selectors.push(Selector::pdf_page(selection.page + 1));
                }
            }
            SelectorKind::Range => {
                let container = page_container_path(selection.page);
                selectors.push(Selector::RangeSelector {
                    start_container: container.clone(),
                    start_offset: selection.start,
                    end_container: container,
                    end_offset: selection.end,
                });
            }
            SelectorKind::TextPosition => {
                selectors.push(Selector::TextPositionSelector {
                    start: selection.start,
                    end: selection.end,
                });
            }
            SelectorKind::TextQuote => {
                selectors.push(Selector::TextQuoteSelector {
                    exact: exact.clone(),
                    prefix: prefix.clone(),
                    suffix: suffix.clone(),
                });
            }
        }
    }
    Ok(selectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use margo_dom::MemoryDocument;

    #[test]
    fn test_describe_html_selection() {
        let doc = MemoryDocument::html("the quick brown fox jumps over the lazy dog");
        let selectors = describe(&doc, &Selection::new(0, 10, 19)).unwrap();
        // Range, TextPosition, TextQuote; no fragment without a paginated viewer.
        assert_eq!(selectors.len(), 3);
        assert!(matches!(selectors[0], Selector::RangeSelector { .. }));
        match &selectors[1] {
            Selector::TextPositionSelector { start, end } => {
                assert_eq!((*start, *end), (10, 19));
            }
            other => panic!("unexpected selector: {other:?}"),
        }
        match &selectors[2] {
            Selector::TextQuoteSelector { exact, prefix, suffix } => {
                assert_eq!(exact, "brown fox");
                assert_eq!(prefix, "the quick ");
                assert_eq!(suffix, " jumps over the lazy dog");
            }
            other => panic!("unexpected selector: {other:?}"),
        }
    }

    #[test]
    fn test_describe_pdf_selection_includes_page_fragment() {
        let doc = MemoryDocument::pdf("fp", &["first page text", "second page text"]);
        let selectors = describe(&doc, &Selection::new(1, 7, 11)).unwrap();
        assert_eq!(selectors.len(), 3);
        // Fragment pages are 1-based.
        assert_eq!(selectors[0].pdf_page_number(), Some(2));
        assert!(matches!(selectors[1], Selector::TextPositionSelector { .. }));
        match &selectors[2] {
            Selector::TextQuoteSelector { exact, .. } => assert_eq!(exact, "page"),
            other => panic!("unexpected selector: {other:?}"),
        }
        // PDF capability list carries no range selector.
        assert!(!selectors
            .iter()
            .any(|s| matches!(s, Selector::RangeSelector { .. })));
    }

    #[test]
    fn test_describe_context_clipped_at_page_edges() {
        let doc = MemoryDocument::html("tiny page");
        let selectors = describe(&doc, &Selection::new(0, 0, 4)).unwrap();
        match selectors
            .iter()
            .find(|s| matches!(s, Selector::TextQuoteSelector { .. }))
            .unwrap()
        {
            Selector::TextQuoteSelector { exact, prefix, suffix } => {
                assert_eq!(exact, "tiny");
                assert!(prefix.is_empty());
                assert_eq!(suffix, " page");
            }
            other => panic!("unexpected selector: {other:?}"),
        }
    }

    #[test]
    fn test_describe_rejects_empty_selection() {
        let doc = MemoryDocument::html("text");
        assert!(describe(&doc, &Selection::new(0, 2, 2)).is_err());
        assert!(describe(&doc, &Selection::new(0, 3, 1)).is_err());
    }

    #[test]
    fn test_describe_rejects_out_of_range_selection() {
        let doc = MemoryDocument::html("text");
        assert!(describe(&doc, &Selection::new(0, 0, 99)).is_err());
        assert!(describe(&doc, &Selection::new(3, 0, 1)).is_err());
    }

    #[test]
    fn test_describe_counts_characters_not_bytes() {
        let doc = MemoryDocument::html("naïve café test");
        let selectors = describe(&doc, &Selection::new(0, 6, 10)).unwrap();
        match selectors
            .iter()
            .find(|s| matches!(s, Selector::TextQuoteSelector { .. }))
            .unwrap()
        {
            Selector::TextQuoteSelector { exact, .. } => assert_eq!(exact, "café"),
            other => panic!("unexpected selector: {other:?}"),
        }
    }

    #[test]
    fn test_container_path_roundtrip() {
        assert_eq!(parse_container_path(&page_container_path(3)), Some(3));
        assert_eq!(parse_container_path("/page[0]"), Some(0));
        assert_eq!(parse_container_path("/div[1]/p[2]"), None);
    }
}
