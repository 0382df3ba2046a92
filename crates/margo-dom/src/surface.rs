//! The document surface trait and highlight mark types.
//!
//! A surface is a paginated view of a document. HTML documents are a single
//! always-loaded page; PDF documents have one page per rendered sheet, and
//! pages may be unloaded while scrolled out of view. All offsets are
//! character offsets into a page's text, never byte offsets.

use serde::{Deserialize, Serialize};

use margo_core::models::DocumentKind;
use margo_core::Result;

/// Request to paint one highlight mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkSpec {
    /// Annotation this mark belongs to.
    pub annotation_id: String,
    /// Page index the offsets refer to.
    pub page: usize,
    /// Inclusive start character offset within the page text.
    pub start: usize,
    /// Exclusive end character offset within the page text.
    pub end: usize,
    /// CSS background color, when the annotation maps to a codebook entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Hover text: entry name plus the annotation's comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

/// A highlight mark applied to the surface.
///
/// The id is surface-assigned and unique for the lifetime of the surface;
/// removing a mark never recycles its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub id: u64,
    pub annotation_id: String,
    pub page: usize,
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

/// A document the engine can annotate.
///
/// Implementations must be safe to share across tasks; the engine calls
/// concurrently from periodic sweeps and user operations.
pub trait DocumentSurface: Send + Sync {
    fn kind(&self) -> DocumentKind;

    /// Current document URL, if the document has one.
    fn url(&self) -> Option<String>;

    /// Document title as the surface knows it (HTML `<title>`, PDF info
    /// dictionary).
    fn title(&self) -> Option<String>;

    /// Named metadata value (`citation_doi`, `citation_pdf_url`,
    /// `citation_title`, `og:title`).
    fn metadata(&self, name: &str) -> Option<String>;

    /// Viewer-supplied fingerprint for PDF documents.
    fn pdf_fingerprint(&self) -> Option<String>;

    fn page_count(&self) -> usize;

    /// Whether a page is currently rendered. Out-of-range pages are not
    /// loaded.
    fn is_page_loaded(&self, page: usize) -> bool;

    /// Text of a page, or `None` while the page is not loaded.
    fn page_text(&self, page: usize) -> Option<String>;

    /// Concatenated text of all loaded pages.
    fn visible_text(&self) -> String {
        (0..self.page_count())
            .filter_map(|p| self.page_text(p))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Paint a mark. Fails when the page is not loaded or the offsets fall
    /// outside the page text.
    fn apply_mark(&self, spec: &MarkSpec) -> Result<Mark>;

    /// Remove one mark. Returns whether it existed.
    fn remove_mark(&self, mark_id: u64) -> bool;

    /// Remove every mark of one annotation. Returns how many were removed.
    fn remove_marks_for(&self, annotation_id: &str) -> usize;

    /// Remove every mark. Returns how many were removed.
    fn clear_marks(&self) -> usize;

    fn marks(&self) -> Vec<Mark>;

    fn marks_for(&self, annotation_id: &str) -> Vec<Mark> {
        self.marks()
            .into_iter()
            .filter(|m| m.annotation_id == annotation_id)
            .collect()
    }

    /// Text currently under a mark. `None` when the mark is gone or its
    /// page is unloaded; empty when the marked span no longer holds text.
    fn mark_text(&self, mark_id: u64) -> Option<String>;

    /// Bring a position into view.
    fn scroll_to(&self, page: usize, offset: usize) -> Result<()>;

    /// Page currently in view.
    fn current_page(&self) -> usize;

    /// Navigate a paginated viewer to a page.
    fn set_current_page(&self, page: usize) -> Result<()>;

    /// Drive the viewer's find facility. Returns whether any loaded page
    /// contains the query.
    fn find_text(&self, query: &str) -> bool;
}
