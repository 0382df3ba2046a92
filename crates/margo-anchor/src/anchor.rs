//! Anchoring: from serialized selectors back to a live document position.

use std::fmt;

use similar::TextDiff;
use tracing::debug;

use margo_core::defaults::{FUZZY_MATCH_THRESHOLD, QUOTE_CONTEXT_CHARS};
use margo_core::selector::{find_selector, Selector, SelectorKind};
use margo_dom::DocumentSurface;

/// A resolved location on the document surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub page: usize,
    pub start: usize,
    pub end: usize,
}

/// Why a selector list could not be anchored right now.
///
/// This is an expected outcome, not an error: paginated viewers render
/// pages lazily and documents drift from the text they were annotated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorFailure {
    /// A candidate page is not rendered yet; retrying after it loads may
    /// succeed.
    NotRenderable,
    /// Every candidate page is rendered and none contains the target.
    TextAbsent,
}

impl fmt::Display for AnchorFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorFailure::NotRenderable => write!(f, "target pages are not rendered"),
            AnchorFailure::TextAbsent => write!(f, "annotated text is absent from the document"),
        }
    }
}

/// Locate the position a selector list points at.
///
/// Strategies run most precise first:
///
/// 1. text position, verified against the quote when one is present
/// 2. exact quote occurrence, disambiguated by context similarity
/// 3. fuzzy quote match over a sliding window, accepted at or above the
///    similarity threshold
///
/// A PDF page fragment narrows the candidate pages; otherwise every page
/// is a candidate. Unloaded candidate pages make the failure
/// [`AnchorFailure::NotRenderable`] instead of [`AnchorFailure::TextAbsent`].
pub fn anchor(
    surface: &dyn DocumentSurface,
    selectors: &[Selector],
) -> std::result::Result<Anchor, AnchorFailure> {
    let quote = match find_selector(selectors, SelectorKind::TextQuote) {
        Some(Selector::TextQuoteSelector {
            exact,
            prefix,
            suffix,
        }) => Some((exact.as_str(), prefix.as_str(), suffix.as_str())),
        _ => None,
    };
    let position = match find_selector(selectors, SelectorKind::TextPosition) {
        Some(Selector::TextPositionSelector { start, end }) => Some((*start, *end)),
        _ => None,
    };
    if quote.is_none() && position.is_none() {
        return Err(AnchorFailure::TextAbsent);
    }

    let page_count = surface.page_count();
    let candidates: Vec<usize> = match find_selector(selectors, SelectorKind::Fragment)
        .and_then(|s| s.pdf_page_number())
    {
        Some(n) if n >= 1 && n <= page_count => vec![n - 1],
        _ => (0..page_count).collect(),
    };

    let mut saw_unloaded = false;
    let mut pages: Vec<(usize, Vec<char>)> = Vec::new();
    for page in candidates {
        match surface.page_text(page) {
            Some(text) => pages.push((page, text.chars().collect())),
            None => saw_unloaded = true,
        }
    }

    // Strategy 1: exact position, verified against the quote if present.
    if let Some((start, end)) = position {
        for (page, chars) in &pages {
            if start < end && end <= chars.len() {
                match quote {
                    Some((exact, _, _)) => {
                        let at_position: String = chars[start..end].iter().collect();
                        if at_position == exact {
                            debug!(strategy = "position", page, "Anchored");
                            return Ok(Anchor {
                                page: *page,
                                start,
                                end,
                            });
                        }
                    }
                    None => {
                        debug!(strategy = "position", page, "Anchored without quote");
                        return Ok(Anchor {
                            page: *page,
                            start,
                            end,
                        });
                    }
                }
            }
        }
    }

    // Strategy 2: exact quote occurrences, best context similarity wins.
    if let Some((exact, prefix, suffix)) = quote {
        let exact_chars: Vec<char> = exact.chars().collect();
        if !exact_chars.is_empty() {
            let mut best: Option<(f32, usize, usize)> = None;
            for (page, chars) in &pages {
                for start in find_occurrences(chars, &exact_chars) {
                    let score = context_score(chars, start, exact_chars.len(), prefix, suffix);
                    if best.map(|(b, _, _)| score > b).unwrap_or(true) {
                        best = Some((score, *page, start));
                    }
                }
            }
            if let Some((score, page, start)) = best {
                debug!(strategy = "quote", page, score, "Anchored");
                return Ok(Anchor {
                    page,
                    start,
                    end: start + exact_chars.len(),
                });
            }

            // Strategy 3: fuzzy sliding window.
            let qlen = exact_chars.len();
            let mut best: Option<(f32, usize, usize)> = None;
            for (page, chars) in &pages {
                if chars.len() < qlen {
                    continue;
                }
                for start in 0..=chars.len() - qlen {
                    let window: String = chars[start..start + qlen].iter().collect();
                    let ratio = TextDiff::from_chars(exact, window.as_str()).ratio();
                    if ratio >= FUZZY_MATCH_THRESHOLD
                        && best.map(|(b, _, _)| ratio > b).unwrap_or(true)
                    {
                        best = Some((ratio, *page, start));
                    }
                }
            }
            if let Some((score, page, start)) = best {
                debug!(strategy = "fuzzy", page, score, "Anchored");
                return Ok(Anchor {
                    page,
                    start,
                    end: start + qlen,
                });
            }
        }
    }

    if saw_unloaded {
        Err(AnchorFailure::NotRenderable)
    } else {
        Err(AnchorFailure::TextAbsent)
    }
}

fn find_occurrences(chars: &[char], needle: &[char]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > chars.len() {
        return Vec::new();
    }
    (0..=chars.len() - needle.len())
        .filter(|&i| &chars[i..i + needle.len()] == needle)
        .collect()
}

/// Similarity of the document context around an occurrence to the
/// selector's recorded context. Empty-on-both-sides compares as identical,
/// so context-free selectors fall back to document order.
fn context_score(chars: &[char], start: usize, qlen: usize, prefix: &str, suffix: &str) -> f32 {
    let doc_prefix: String = chars[start.saturating_sub(QUOTE_CONTEXT_CHARS)..start]
        .iter()
        .collect();
    let end = start + qlen;
    let doc_suffix: String = chars[end..(end + QUOTE_CONTEXT_CHARS).min(chars.len())]
        .iter()
        .collect();
    (side_score(prefix, &doc_prefix) + side_score(suffix, &doc_suffix)) / 2.0
}

fn side_score(expected: &str, actual: &str) -> f32 {
    if expected.is_empty() && actual.is_empty() {
        1.0
    } else {
        TextDiff::from_chars(expected, actual).ratio()
    }
}
