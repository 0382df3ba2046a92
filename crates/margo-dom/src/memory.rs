//! In-memory document surface.
//!
//! Models the documents the engine annotates without a browser attached:
//! a single-page HTML document or a paginated PDF whose pages load and
//! unload as a viewer would render them. Mutation helpers on the concrete
//! type let tests simulate edits, navigation, and page churn; the engine
//! itself only ever sees the [`DocumentSurface`] trait.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use margo_core::models::DocumentKind;
use margo_core::{Error, Result};

use crate::surface::{DocumentSurface, Mark, MarkSpec};

#[derive(Debug, Clone)]
struct Page {
    text: String,
    loaded: bool,
}

#[derive(Debug)]
struct Inner {
    kind: DocumentKind,
    url: Option<String>,
    title: Option<String>,
    metadata: HashMap<String, String>,
    pdf_fingerprint: Option<String>,
    pages: Vec<Page>,
    marks: Vec<Mark>,
    next_mark_id: u64,
    current_page: usize,
    last_scroll: Option<(usize, usize)>,
    last_find: Option<String>,
}

/// An in-process [`DocumentSurface`].
#[derive(Debug)]
pub struct MemoryDocument {
    inner: Mutex<Inner>,
}

impl MemoryDocument {
    /// Single-page HTML document with the given visible text.
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                kind: DocumentKind::Html,
                url: None,
                title: None,
                metadata: HashMap::new(),
                pdf_fingerprint: None,
                pages: vec![Page {
                    text: text.into(),
                    loaded: true,
                }],
                marks: Vec::new(),
                next_mark_id: 1,
                current_page: 0,
                last_scroll: None,
                last_find: None,
            }),
        }
    }

    /// PDF document with the given fingerprint and page texts, all pages
    /// initially loaded.
    pub fn pdf(fingerprint: impl Into<String>, pages: &[&str]) -> Self {
        Self {
            inner: Mutex::new(Inner {
                kind: DocumentKind::Pdf,
                url: None,
                title: None,
                metadata: HashMap::new(),
                pdf_fingerprint: Some(fingerprint.into()),
                pages: pages
                    .iter()
                    .map(|t| Page {
                        text: (*t).to_string(),
                        loaded: true,
                    })
                    .collect(),
                marks: Vec::new(),
                next_mark_id: 1,
                current_page: 0,
                last_scroll: None,
                last_find: None,
            }),
        }
    }

    pub fn with_url(self, url: impl Into<String>) -> Self {
        self.lock().url = Some(url.into());
        self
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        self.lock().title = Some(title.into());
        self
    }

    pub fn with_metadata(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.lock().metadata.insert(name.into(), value.into());
        self
    }

    /// Mark a page as not yet rendered.
    pub fn with_unloaded_page(self, page: usize) -> Self {
        {
            let mut inner = self.lock();
            if let Some(p) = inner.pages.get_mut(page) {
                p.loaded = false;
            }
        }
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock carries valid data; keep going with it.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ─── Mutation helpers for tests and tooling ────────────────────────────

    /// Change the document URL, as a single-page navigation would.
    pub fn set_url(&self, url: impl Into<String>) {
        self.lock().url = Some(url.into());
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.lock().title = Some(title.into());
    }

    pub fn set_metadata(&self, name: impl Into<String>, value: impl Into<String>) {
        self.lock().metadata.insert(name.into(), value.into());
    }

    /// Replace a page's text, simulating a document edit. Existing marks
    /// keep their offsets; spans beyond the new text read back empty.
    pub fn set_page_text(&self, page: usize, text: impl Into<String>) -> bool {
        let mut inner = self.lock();
        match inner.pages.get_mut(page) {
            Some(p) => {
                p.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Unload a page as a viewer scrolling away would, dropping its marks.
    /// Returns how many marks were dropped.
    pub fn unload_page(&self, page: usize) -> usize {
        let mut inner = self.lock();
        if page >= inner.pages.len() {
            return 0;
        }
        inner.pages[page].loaded = false;
        let before = inner.marks.len();
        inner.marks.retain(|m| m.page != page);
        let dropped = before - inner.marks.len();
        tracing::trace!(page, dropped, "Page unloaded");
        dropped
    }

    /// Re-render a previously unloaded page.
    pub fn load_page(&self, page: usize) -> bool {
        let mut inner = self.lock();
        match inner.pages.get_mut(page) {
            Some(p) => {
                p.loaded = true;
                true
            }
            None => false,
        }
    }

    /// Last position brought into view, as `(page, offset)`.
    pub fn last_scroll(&self) -> Option<(usize, usize)> {
        self.lock().last_scroll
    }

    /// Last query sent to the find facility.
    pub fn last_find(&self) -> Option<String> {
        self.lock().last_find.clone()
    }
}

impl DocumentSurface for MemoryDocument {
    fn kind(&self) -> DocumentKind {
        self.lock().kind
    }

    fn url(&self) -> Option<String> {
        self.lock().url.clone()
    }

    fn title(&self) -> Option<String> {
        self.lock().title.clone()
    }

    fn metadata(&self, name: &str) -> Option<String> {
        self.lock().metadata.get(name).cloned()
    }

    fn pdf_fingerprint(&self) -> Option<String> {
        self.lock().pdf_fingerprint.clone()
    }

    fn page_count(&self) -> usize {
        self.lock().pages.len()
    }

    fn is_page_loaded(&self, page: usize) -> bool {
        self.lock().pages.get(page).map(|p| p.loaded).unwrap_or(false)
    }

    fn page_text(&self, page: usize) -> Option<String> {
        let inner = self.lock();
        inner
            .pages
            .get(page)
            .filter(|p| p.loaded)
            .map(|p| p.text.clone())
    }

    fn apply_mark(&self, spec: &MarkSpec) -> Result<Mark> {
        let mut inner = self.lock();
        let len = {
            let page = inner.pages.get(spec.page).ok_or_else(|| {
                Error::InvalidInput(format!("page {} out of range", spec.page))
            })?;
            if !page.loaded {
                return Err(Error::InvalidInput(format!(
                    "page {} is not loaded",
                    spec.page
                )));
            }
            page.text.chars().count()
        };
        if spec.start > spec.end || spec.end > len {
            return Err(Error::InvalidInput(format!(
                "mark span {}..{} outside page text of length {len}",
                spec.start, spec.end
            )));
        }
        let id = inner.next_mark_id;
        inner.next_mark_id += 1;
        let mark = Mark {
            id,
            annotation_id: spec.annotation_id.clone(),
            page: spec.page,
            start: spec.start,
            end: spec.end,
            color: spec.color.clone(),
            tooltip: spec.tooltip.clone(),
        };
        inner.marks.push(mark.clone());
        tracing::trace!(
            mark_id = id,
            annotation_id = %mark.annotation_id,
            page = mark.page,
            "Mark applied"
        );
        Ok(mark)
    }

    fn remove_mark(&self, mark_id: u64) -> bool {
        let mut inner = self.lock();
        let before = inner.marks.len();
        inner.marks.retain(|m| m.id != mark_id);
        inner.marks.len() < before
    }

    fn remove_marks_for(&self, annotation_id: &str) -> usize {
        let mut inner = self.lock();
        let before = inner.marks.len();
        inner.marks.retain(|m| m.annotation_id != annotation_id);
        before - inner.marks.len()
    }

    fn clear_marks(&self) -> usize {
        let mut inner = self.lock();
        let cleared = inner.marks.len();
        inner.marks.clear();
        cleared
    }

    fn marks(&self) -> Vec<Mark> {
        self.lock().marks.clone()
    }

    fn mark_text(&self, mark_id: u64) -> Option<String> {
        let inner = self.lock();
        let mark = inner.marks.iter().find(|m| m.id == mark_id)?;
        let page = inner.pages.get(mark.page)?;
        if !page.loaded {
            return None;
        }
        Some(
            page.text
                .chars()
                .skip(mark.start)
                .take(mark.end.saturating_sub(mark.start))
                .collect(),
        )
    }

    fn scroll_to(&self, page: usize, offset: usize) -> Result<()> {
        let mut inner = self.lock();
        if page >= inner.pages.len() {
            return Err(Error::InvalidInput(format!("page {page} out of range")));
        }
        inner.current_page = page;
        inner.last_scroll = Some((page, offset));
        Ok(())
    }

    fn current_page(&self) -> usize {
        self.lock().current_page
    }

    fn set_current_page(&self, page: usize) -> Result<()> {
        let mut inner = self.lock();
        if page >= inner.pages.len() {
            return Err(Error::InvalidInput(format!("page {page} out of range")));
        }
        inner.current_page = page;
        Ok(())
    }

    fn find_text(&self, query: &str) -> bool {
        let mut inner = self.lock();
        inner.last_find = Some(query.to_string());
        inner
            .pages
            .iter()
            .any(|p| p.loaded && p.text.contains(query))
    }
}
