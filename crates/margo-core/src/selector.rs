//! W3C Web Annotation selectors.
//!
//! Selectors describe where in a document an annotation is attached. They
//! serialize with their W3C `type` discriminator so payloads interoperate
//! with other annotation clients reading the same store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant-only view of a selector, used for capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    Fragment,
    Range,
    TextPosition,
    TextQuote,
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorKind::Fragment => write!(f, "FragmentSelector"),
            SelectorKind::Range => write!(f, "RangeSelector"),
            SelectorKind::TextPosition => write!(f, "TextPositionSelector"),
            SelectorKind::TextQuote => write!(f, "TextQuoteSelector"),
        }
    }
}

/// A serialized description of an annotated location.
///
/// Robustness varies by kind: fragment and range selectors break as soon as
/// the document structure shifts, position selectors survive structure
/// changes but not edits, and quote selectors survive both at the cost of
/// ambiguity when the quoted text repeats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Selector {
    /// Fragment identifier, e.g. an element id or a PDF `page=<n>` fragment.
    FragmentSelector {
        #[serde(skip_serializing_if = "Option::is_none", rename = "conformsTo")]
        conforms_to: Option<String>,
        value: String,
    },
    /// DOM range endpoints as XPath-like container paths plus offsets.
    RangeSelector {
        #[serde(rename = "startContainer")]
        start_container: String,
        #[serde(rename = "startOffset")]
        start_offset: usize,
        #[serde(rename = "endContainer")]
        end_container: String,
        #[serde(rename = "endOffset")]
        end_offset: usize,
    },
    /// Absolute character offsets into the document's visible text.
    TextPositionSelector { start: usize, end: usize },
    /// The annotated text itself with short disambiguating context.
    TextQuoteSelector {
        exact: String,
        #[serde(default)]
        prefix: String,
        #[serde(default)]
        suffix: String,
    },
}

impl Selector {
    pub fn kind(&self) -> SelectorKind {
        match self {
            Selector::FragmentSelector { .. } => SelectorKind::Fragment,
            Selector::RangeSelector { .. } => SelectorKind::Range,
            Selector::TextPositionSelector { .. } => SelectorKind::TextPosition,
            Selector::TextQuoteSelector { .. } => SelectorKind::TextQuote,
        }
    }

    /// PDF page fragment selector (`page=<n>`, RFC 3778 scheme).
    pub fn pdf_page(page: usize) -> Self {
        Selector::FragmentSelector {
            conforms_to: Some(crate::defaults::PDF_FRAGMENT_CONFORMS_TO.to_string()),
            value: format!("page={page}"),
        }
    }

    /// Page number of a PDF page fragment selector, if this is one.
    pub fn pdf_page_number(&self) -> Option<usize> {
        match self {
            Selector::FragmentSelector { value, .. } => {
                value.strip_prefix("page=").and_then(|n| n.parse().ok())
            }
            _ => None,
        }
    }
}

/// First selector of the given kind in a selector list.
pub fn find_selector(selectors: &[Selector], kind: SelectorKind) -> Option<&Selector> {
    selectors.iter().find(|s| s.kind() == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_kind_display_matches_wire_type() {
        assert_eq!(SelectorKind::TextQuote.to_string(), "TextQuoteSelector");
        assert_eq!(SelectorKind::Fragment.to_string(), "FragmentSelector");
    }

    #[test]
    fn test_quote_selector_wire_shape() {
        let s = Selector::TextQuoteSelector {
            exact: "the annotated span".to_string(),
            prefix: "before ".to_string(),
            suffix: " after".to_string(),
        };
        let json: serde_json::Value = serde_json::to_value(&s).unwrap();
        assert_eq!(json["type"], "TextQuoteSelector");
        assert_eq!(json["exact"], "the annotated span");
        assert_eq!(json["prefix"], "before ");
    }

    #[test]
    fn test_position_selector_roundtrip() {
        let s = Selector::TextPositionSelector { start: 120, end: 138 };
        let json = serde_json::to_string(&s).unwrap();
        let back: Selector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
        assert_eq!(back.kind(), SelectorKind::TextPosition);
    }

    #[test]
    fn test_range_selector_field_names() {
        let s = Selector::RangeSelector {
            start_container: "/div[1]/p[2]".to_string(),
            start_offset: 4,
            end_container: "/div[1]/p[2]".to_string(),
            end_offset: 27,
        };
        let json: serde_json::Value = serde_json::to_value(&s).unwrap();
        assert_eq!(json["startContainer"], "/div[1]/p[2]");
        assert_eq!(json["endOffset"], 27);
    }

    #[test]
    fn test_pdf_page_fragment() {
        let s = Selector::pdf_page(7);
        assert_eq!(s.pdf_page_number(), Some(7));
        let json: serde_json::Value = serde_json::to_value(&s).unwrap();
        assert_eq!(json["value"], "page=7");
        assert_eq!(json["conformsTo"], "http://tools.ietf.org/rfc/rfc3778");
    }

    #[test]
    fn test_pdf_page_number_rejects_other_fragments() {
        let s = Selector::FragmentSelector {
            conforms_to: None,
            value: "section-3".to_string(),
        };
        assert_eq!(s.pdf_page_number(), None);
        let pos = Selector::TextPositionSelector { start: 0, end: 1 };
        assert_eq!(pos.pdf_page_number(), None);
    }

    #[test]
    fn test_quote_selector_defaults_context_fields() {
        let raw = r#"{"type": "TextQuoteSelector", "exact": "bare quote"}"#;
        let s: Selector = serde_json::from_str(raw).unwrap();
        match s {
            Selector::TextQuoteSelector { exact, prefix, suffix } => {
                assert_eq!(exact, "bare quote");
                assert!(prefix.is_empty());
                assert!(suffix.is_empty());
            }
            other => panic!("unexpected selector: {other:?}"),
        }
    }

    #[test]
    fn test_find_selector_picks_first_of_kind() {
        let selectors = vec![
            Selector::TextPositionSelector { start: 0, end: 5 },
            Selector::TextQuoteSelector {
                exact: "one".to_string(),
                prefix: String::new(),
                suffix: String::new(),
            },
            Selector::TextQuoteSelector {
                exact: "two".to_string(),
                prefix: String::new(),
                suffix: String::new(),
            },
        ];
        let found = find_selector(&selectors, SelectorKind::TextQuote).unwrap();
        match found {
            Selector::TextQuoteSelector { exact, .. } => assert_eq!(exact, "one"),
            other => panic!("unexpected selector: {other:?}"),
        }
        assert!(find_selector(&selectors, SelectorKind::Range).is_none());
    }

    #[test]
    fn test_unknown_selector_type_is_rejected() {
        let raw = r#"{"type": "CssSelector", "value": ".para"}"#;
        assert!(serde_json::from_str::<Selector>(raw).is_err());
    }
}
