//! The annotation reconciliation engine.
//!
//! Owns the canonical annotation collections for one document session and
//! keeps the document surface's highlight marks consistent with them. All
//! other components hold ids or recomputable copies; mutation happens here,
//! inside one write-lock scope per operation, so the whole effect of a
//! completed operation is visible before the next one starts.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use margo_anchor::{anchor, describe, Selection};
use margo_core::defaults::GUIDE_TAG;
use margo_core::selector::find_selector;
use margo_core::{
    Annotation, AnnotationPayload, AnnotationStore, BulkOutcome, ContentAnnotator,
    DocumentContext, DocumentKind, Error, EventBus, Motivation, Result, SearchQuery, Selector,
    SelectorKind, SessionEvent, SortOrder,
};
use margo_dom::{DocumentSurface, MarkSpec};

use crate::filter::{RegisterOutcome, SharedUserFilter};
use crate::payload::{annotation_payload, reply_payload, update_payload};
use crate::tags::TagManager;

/// Lifecycle of one annotator.
///
/// Only `Ready` permits highlight operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotatorPhase {
    Idle,
    Loading,
    Ready,
    Destroyed,
}

/// Result of a create request.
#[derive(Debug, Clone)]
pub enum CreateOutcome {
    Created(Annotation),
    /// The selection was empty but annotations with the requested tags
    /// exist; navigated to the first one instead of creating.
    NavigatedToExisting(String),
}

#[derive(Debug)]
struct EngineState {
    phase: AnnotatorPhase,
    primaries: Vec<Annotation>,
    replies: Vec<Annotation>,
}

/// Everything a [`TextAnnotator`] is wired to.
pub struct AnnotatorDeps {
    pub store: Arc<dyn AnnotationStore>,
    pub surface: Arc<dyn DocumentSurface>,
    pub tag_manager: Arc<TagManager>,
    pub filter: SharedUserFilter,
    pub events: EventBus,
    pub context: DocumentContext,
    pub group_id: String,
    pub creator: String,
}

/// Tags marking codebook bookkeeping annotations, which never enter the
/// primary set.
fn structural_exclusion_tags() -> Vec<String> {
    vec![
        GUIDE_TAG.to_string(),
        Motivation::CodebookDevelopment.as_tag(),
    ]
}

fn tooltip_for(entry_name: Option<&str>, comment: &str) -> Option<String> {
    match (entry_name, comment.trim()) {
        (Some(name), "") => Some(name.to_string()),
        (Some(name), comment) => Some(format!("{name}: {comment}")),
        (None, "") => None,
        (None, comment) => Some(comment.to_string()),
    }
}

/// Tag set after a retag: `old_tags` removed, `new_tags` appended without
/// duplicates, unrelated tags untouched.
fn retagged(tags: &[String], old_tags: &[String], new_tags: &[String]) -> Vec<String> {
    let mut result: Vec<String> = tags
        .iter()
        .filter(|t| !old_tags.contains(t))
        .cloned()
        .collect();
    for tag in new_tags {
        if !result.contains(tag) {
            result.push(tag.clone());
        }
    }
    result
}

/// Concrete [`ContentAnnotator`] for text-bearing documents (HTML and PDF).
pub struct TextAnnotator {
    store: Arc<dyn AnnotationStore>,
    surface: Arc<dyn DocumentSurface>,
    tag_manager: Arc<TagManager>,
    filter: SharedUserFilter,
    events: EventBus,
    group_id: String,
    creator: String,
    context: RwLock<DocumentContext>,
    state: RwLock<EngineState>,
}

impl std::fmt::Debug for TextAnnotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextAnnotator")
            .field("group_id", &self.group_id)
            .field("creator", &self.creator)
            .finish_non_exhaustive()
    }
}

impl TextAnnotator {
    pub fn new(deps: AnnotatorDeps) -> Self {
        Self {
            store: deps.store,
            surface: deps.surface,
            tag_manager: deps.tag_manager,
            filter: deps.filter,
            events: deps.events,
            group_id: deps.group_id,
            creator: deps.creator,
            context: RwLock::new(deps.context),
            state: RwLock::new(EngineState {
                phase: AnnotatorPhase::Idle,
                primaries: Vec::new(),
                replies: Vec::new(),
            }),
        }
    }

    pub async fn phase(&self) -> AnnotatorPhase {
        self.state.read().await.phase
    }

    /// Snapshot of the primary annotation set.
    pub async fn primaries(&self) -> Vec<Annotation> {
        self.state.read().await.primaries.clone()
    }

    /// Snapshot of the reply set.
    pub async fn replies(&self) -> Vec<Annotation> {
        self.state.read().await.replies.clone()
    }

    async fn ensure_ready(&self) -> Result<()> {
        match self.state.read().await.phase {
            AnnotatorPhase::Ready => Ok(()),
            AnnotatorPhase::Destroyed => {
                Err(Error::Session("annotator is destroyed".to_string()))
            }
            _ => Err(Error::Session("annotator is not initialized".to_string())),
        }
    }

    async fn search_query(&self) -> SearchQuery {
        let context = self.context.read().await;
        let uri = context.uri_to_search();
        let url = match (&uri, &context.canonical_url) {
            (Some(uri), Some(url)) if uri != url => Some(url.clone()),
            _ => None,
        };
        SearchQuery {
            uri,
            url,
            group: Some(self.group_id.clone()),
            order: Some(SortOrder::Asc),
            ..Default::default()
        }
    }

    /// Replace the canonical collections from a fresh store search.
    ///
    /// On store error the prior collections stay untouched. Codebook
    /// bookkeeping annotations are excluded before partitioning into
    /// primaries and replies.
    pub async fn load_all(&self) -> Result<()> {
        {
            let state = self.state.read().await;
            if state.phase == AnnotatorPhase::Destroyed {
                return Err(Error::Session("annotator is destroyed".to_string()));
            }
        }
        let query = self.search_query().await;
        let result = self.store.search(&query).await?;

        let excluded = structural_exclusion_tags();
        let mut primaries = Vec::new();
        let mut replies = Vec::new();
        for annotation in result.rows {
            if annotation.has_any_tag(&excluded) {
                continue;
            }
            if annotation.is_reply() {
                replies.push(annotation);
            } else {
                primaries.push(annotation);
            }
        }
        debug!(
            document_uri = query.uri.as_deref().unwrap_or("-"),
            annotation_count = primaries.len() + replies.len(),
            primary_count = primaries.len(),
            reply_count = replies.len(),
            "Loaded annotations from store"
        );

        {
            let mut state = self.state.write().await;
            if state.phase == AnnotatorPhase::Destroyed {
                return Err(Error::Session("annotator is destroyed".to_string()));
            }
            state.primaries = primaries;
            state.replies = replies;
        }
        self.emit_set_events().await;
        Ok(())
    }

    /// Primaries narrowed to the active users of the filter.
    ///
    /// Recomputed on every call, never cached.
    pub async fn current_view(&self) -> Vec<Annotation> {
        let state = self.state.read().await;
        let filter = self.filter.lock().unwrap_or_else(|e| e.into_inner());
        state
            .primaries
            .iter()
            .filter(|a| filter.allows(&a.user))
            .cloned()
            .collect()
    }

    /// Remove every live mark, then highlight every view annotation.
    ///
    /// A full repaint, not a diff.
    pub async fn redraw(&self) -> Result<()> {
        self.ensure_ready().await?;
        let removed = self.surface.clear_marks();
        let view = self.current_view().await;
        debug!(
            mark_count = removed,
            annotation_count = view.len(),
            "Redrawing highlights"
        );
        for annotation in &view {
            self.highlight(annotation).await?;
        }
        Ok(())
    }

    /// Re-run the full load-and-repaint cycle. The coarse periodic refresh.
    pub async fn refresh(&self) -> Result<()> {
        self.load_all().await?;
        self.redraw().await
    }

    /// Retry highlighting for view annotations that lack a live mark.
    ///
    /// Returns how many gained a mark. Lazily rendered pages make this
    /// succeed where the initial highlight attempt could not.
    pub async fn reconcile_sweep(&self) -> Result<usize> {
        self.ensure_ready().await?;
        let view = self.current_view().await;
        let mut anchored = 0;
        for annotation in &view {
            if annotation.selectors().is_empty() {
                continue;
            }
            if !self.surface.marks_for(&annotation.id).is_empty() {
                continue;
            }
            self.highlight(annotation).await?;
            if !self.surface.marks_for(&annotation.id).is_empty() {
                anchored += 1;
            }
        }
        if anchored > 0 {
            debug!(anchored_count = anchored, "Reconciliation sweep anchored annotations");
        }
        Ok(anchored)
    }

    /// Remove marks whose highlighted text has become empty.
    ///
    /// Marks on unloaded pages are left alone; only marks whose span
    /// collapsed under document mutation are stale.
    pub async fn clean_sweep(&self) -> Result<usize> {
        self.ensure_ready().await?;
        let mut removed = 0;
        for mark in self.surface.marks() {
            if matches!(self.surface.mark_text(mark.id), Some(text) if text.is_empty()) {
                self.surface.remove_mark(mark.id);
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(mark_count = removed, "Removed stale highlight marks");
        }
        Ok(removed)
    }

    /// Create an annotation over a selection, classified with `tags`.
    ///
    /// An empty selection creates nothing: when annotations with the given
    /// tags already exist the document navigates to the first one, otherwise
    /// the request is rejected.
    pub async fn create(&self, selection: &Selection, tags: Vec<String>) -> Result<CreateOutcome> {
        self.ensure_ready().await?;
        if selection.is_empty() {
            let view = self.current_view().await;
            if let Some(existing) = view.iter().find(|a| a.has_all_tags(&tags)) {
                let id = existing.id.clone();
                self.go_to_annotation(&id).await?;
                return Ok(CreateOutcome::NavigatedToExisting(id));
            }
            return Err(Error::InvalidInput("selection is empty".to_string()));
        }

        let selectors = describe(self.surface.as_ref(), selection)?;
        let payload = {
            let context = self.context.read().await;
            annotation_payload(&context, &self.group_id, &self.creator, tags, selectors, "")?
        };
        let created = self.store.create_annotation(&payload).await?;

        {
            let mut state = self.state.write().await;
            state.primaries.push(created.clone());
        }
        let registration = {
            let mut filter = self.filter.lock().unwrap_or_else(|e| e.into_inner());
            filter.register_author(&created.user)
        };
        match registration {
            // The author's other annotations just became visible too.
            RegisterOutcome::Reactivated => self.redraw().await?,
            _ => self.highlight(&created).await?,
        }
        info!(annotation_id = %created.id, user = %created.user, "Annotation created");
        self.events.emit(SessionEvent::AnnotationCreated {
            annotation: created.clone(),
        });
        self.emit_set_events().await;
        Ok(CreateOutcome::Created(created))
    }

    /// Create an annotation classified under a codebook entry.
    pub async fn create_for_entry(
        &self,
        selection: &Selection,
        entry_id: &str,
    ) -> Result<CreateOutcome> {
        let guide = self
            .tag_manager
            .guide()
            .await
            .ok_or_else(|| Error::Guide("no guide loaded".to_string()))?;
        let entry = guide.get_entry(entry_id).ok_or_else(|| {
            Error::NotFound(format!("no codebook entry with id {entry_id}"))
        })?;
        self.create(selection, entry.annotation_tags()).await
    }

    /// Reply to an existing annotation.
    pub async fn reply(&self, parent_id: &str, text: &str) -> Result<Annotation> {
        self.ensure_ready().await?;
        let parent = self
            .find_annotation(parent_id)
            .await
            .ok_or_else(|| Error::AnnotationNotFound(parent_id.to_string()))?;
        let payload = reply_payload(&parent, &self.creator, text);
        let created = self.store.create_annotation(&payload).await?;
        {
            let mut state = self.state.write().await;
            state.replies.push(created.clone());
        }
        self.events.emit(SessionEvent::AnnotationCreated {
            annotation: created.clone(),
        });
        self.emit_set_events().await;
        Ok(created)
    }

    /// Update an annotation in the store, then in memory, then on screen.
    pub async fn update(&self, id: &str, payload: &AnnotationPayload) -> Result<Annotation> {
        self.ensure_ready().await?;
        let updated = self.store.update_annotation(id, payload).await?;
        self.replace_annotation(&updated).await;
        self.highlight(&updated).await?;
        self.emit_set_events().await;
        Ok(updated)
    }

    /// Edit the free-text comment of an annotation.
    ///
    /// The marker tooltip shows the comment, so the mark is re-rendered.
    pub async fn edit_comment(&self, id: &str, text: &str) -> Result<Annotation> {
        self.ensure_ready().await?;
        let current = self
            .find_annotation(id)
            .await
            .ok_or_else(|| Error::AnnotationNotFound(id.to_string()))?;
        let mut payload = update_payload(&current, &self.creator);
        payload.text = text.to_string();
        let updated = self.update(id, &payload).await?;
        self.events.emit(SessionEvent::CommentUpdated {
            annotation: updated.clone(),
        });
        Ok(updated)
    }

    /// Move every annotation tagged with all of `old_tags` to `new_tags`.
    ///
    /// Updates run concurrently and settle before reporting; individual
    /// failures are collected, already-applied updates stay applied.
    pub async fn retag(&self, old_tags: &[String], new_tags: &[String]) -> Result<BulkOutcome> {
        self.ensure_ready().await?;
        if old_tags.is_empty() {
            return Err(Error::InvalidInput("old tag set is empty".to_string()));
        }
        let targets: Vec<Annotation> = {
            let state = self.state.read().await;
            state
                .primaries
                .iter()
                .filter(|a| a.has_all_tags(old_tags))
                .cloned()
                .collect()
        };
        let updates = targets.iter().map(|annotation| {
            let mut payload = update_payload(annotation, &self.creator);
            payload.tags = retagged(&annotation.tags, old_tags, new_tags);
            async move {
                let result = self.store.update_annotation(&annotation.id, &payload).await;
                (annotation.id.clone(), result)
            }
        });
        let results = join_all(updates).await;

        let mut outcome = BulkOutcome::default();
        for (id, result) in results {
            match result {
                Ok(updated) => {
                    self.replace_annotation(&updated).await;
                    outcome.record_success(id);
                }
                Err(e) => {
                    warn!(annotation_id = %id, error = %e, "Retag update failed");
                    outcome.record_failure(id, e);
                }
            }
        }
        info!(
            succeeded = outcome.success_count(),
            failed = outcome.failure_count(),
            "Retag settled"
        );
        self.redraw().await?;
        self.emit_set_events().await;
        Ok(outcome)
    }

    /// Delete an annotation: store first, then memory, then its marks.
    ///
    /// A store refusal aborts with no local mutation.
    pub async fn delete(&self, id: &str) -> Result<Annotation> {
        self.ensure_ready().await?;
        let doomed = self
            .find_annotation(id)
            .await
            .ok_or_else(|| Error::AnnotationNotFound(id.to_string()))?;
        let deleted = self.store.delete_annotation(id).await?;
        if !deleted {
            return Err(Error::Store(format!("store rejected deletion of {id}")));
        }
        {
            let mut state = self.state.write().await;
            state.primaries.retain(|a| a.id != id);
            state.replies.retain(|a| a.id != id);
        }
        self.surface.remove_marks_for(id);
        info!(annotation_id = id, "Annotation deleted");
        self.events.emit(SessionEvent::AnnotationDeleted {
            annotation: doomed.clone(),
        });
        self.emit_set_events().await;
        Ok(doomed)
    }

    /// Delete every primary and reply, settling all deletions before
    /// reporting, then unhighlight.
    pub async fn delete_all(&self) -> Result<BulkOutcome> {
        self.ensure_ready().await?;
        let targets: Vec<Annotation> = {
            let state = self.state.read().await;
            state
                .primaries
                .iter()
                .chain(state.replies.iter())
                .cloned()
                .collect()
        };
        let deletes = targets.iter().map(|annotation| async move {
            let result = self.store.delete_annotation(&annotation.id).await;
            (annotation.id.clone(), result)
        });
        let results = join_all(deletes).await;

        let mut outcome = BulkOutcome::default();
        for (id, result) in results {
            match result {
                Ok(true) => outcome.record_success(id),
                Ok(false) => {
                    warn!(annotation_id = %id, "Store rejected deletion");
                    outcome.record_failure(id, Error::Store("store rejected deletion".to_string()));
                }
                Err(e) => {
                    warn!(annotation_id = %id, error = %e, "Delete failed");
                    outcome.record_failure(id, e);
                }
            }
        }
        {
            let failed: HashSet<&str> = outcome.failures.iter().map(|f| f.id.as_str()).collect();
            let mut state = self.state.write().await;
            state.primaries.retain(|a| failed.contains(a.id.as_str()));
            state.replies.retain(|a| failed.contains(a.id.as_str()));
        }
        self.surface.clear_marks();
        if !outcome.is_complete() {
            self.redraw().await?;
        }
        info!(
            succeeded = outcome.success_count(),
            failed = outcome.failure_count(),
            "Bulk delete settled"
        );
        self.emit_set_events().await;
        Ok(outcome)
    }

    /// Navigate the document surface to an annotation's anchored range.
    pub async fn go_to_annotation(&self, id: &str) -> Result<()> {
        self.ensure_ready().await?;
        let annotation = self
            .find_annotation(id)
            .await
            .ok_or_else(|| Error::AnnotationNotFound(id.to_string()))?;
        let selectors = annotation.selectors();

        if self.surface.kind() == DocumentKind::Pdf {
            if let Some(page) = find_selector(selectors, SelectorKind::Fragment)
                .and_then(|s| s.pdf_page_number())
            {
                if page >= 1 {
                    self.surface.set_current_page(page - 1)?;
                }
            }
            if let Some(Selector::TextQuoteSelector { exact, .. }) =
                find_selector(selectors, SelectorKind::TextQuote)
            {
                self.surface.find_text(exact);
            }
            return Ok(());
        }

        if let Some(mark) = self.surface.marks_for(id).into_iter().next() {
            return self.surface.scroll_to(mark.page, mark.start);
        }
        match anchor(self.surface.as_ref(), selectors) {
            Ok(located) => self.surface.scroll_to(located.page, located.start),
            Err(failure) => Err(Error::NotFound(format!(
                "annotation {id} cannot be located: {failure}"
            ))),
        }
    }

    /// React to a session event.
    ///
    /// Guide and document-URL changes reload from the store; filter changes
    /// recompute the view and repaint without any network traffic.
    pub async fn handle_event(&self, event: &SessionEvent) -> Result<()> {
        match event {
            SessionEvent::GuideUpdated => {
                debug!("Guide updated, reloading annotations");
                self.load_all().await?;
                self.redraw().await
            }
            SessionEvent::FilterChanged { .. } => {
                let view = self.current_view().await;
                self.events.emit(SessionEvent::CurrentViewUpdated { annotations: view });
                self.redraw().await
            }
            SessionEvent::DocumentUrlChanged { url } => {
                {
                    let mut context = self.context.write().await;
                    context.canonical_url = Some(url.clone());
                }
                debug!(url = %url, "Document URL changed, reloading annotations");
                self.load_all().await?;
                self.redraw().await
            }
            _ => Ok(()),
        }
    }

    async fn find_annotation(&self, id: &str) -> Option<Annotation> {
        let state = self.state.read().await;
        state
            .primaries
            .iter()
            .chain(state.replies.iter())
            .find(|a| a.id == id)
            .cloned()
    }

    async fn replace_annotation(&self, updated: &Annotation) {
        let mut state = self.state.write().await;
        if let Some(slot) = state.primaries.iter_mut().find(|a| a.id == updated.id) {
            *slot = updated.clone();
        } else if let Some(slot) = state.replies.iter_mut().find(|a| a.id == updated.id) {
            *slot = updated.clone();
        }
    }

    async fn emit_set_events(&self) {
        let all: Vec<Annotation> = {
            let state = self.state.read().await;
            state
                .primaries
                .iter()
                .chain(state.replies.iter())
                .cloned()
                .collect()
        };
        self.events
            .emit(SessionEvent::AnnotationsUpdated { annotations: all });
        let view = self.current_view().await;
        self.events
            .emit(SessionEvent::CurrentViewUpdated { annotations: view });
    }
}

#[async_trait]
impl ContentAnnotator for TextAnnotator {
    /// Load the annotation set and paint the initial highlights.
    async fn init(&self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            match state.phase {
                AnnotatorPhase::Idle => state.phase = AnnotatorPhase::Loading,
                AnnotatorPhase::Destroyed => {
                    return Err(Error::Session("annotator is destroyed".to_string()))
                }
                _ => {
                    return Err(Error::Session(
                        "annotator is already initialized".to_string(),
                    ))
                }
            }
        }
        if let Err(e) = self.load_all().await {
            let mut state = self.state.write().await;
            if state.phase == AnnotatorPhase::Loading {
                state.phase = AnnotatorPhase::Idle;
            }
            return Err(e);
        }
        {
            let mut state = self.state.write().await;
            if state.phase != AnnotatorPhase::Loading {
                return Err(Error::Session(
                    "annotator destroyed during initialization".to_string(),
                ));
            }
            state.phase = AnnotatorPhase::Ready;
        }
        self.redraw().await?;
        info!(group_id = %self.group_id, "Annotator ready");
        Ok(())
    }

    /// Anchor one annotation and wrap its range with a mark.
    ///
    /// Idempotent: existing marks for the id are removed first. Anchoring
    /// failure is not an error; the annotation stays a candidate for the
    /// reconciliation sweep.
    async fn highlight(&self, annotation: &Annotation) -> Result<()> {
        self.ensure_ready().await?;
        self.surface.remove_marks_for(&annotation.id);
        let selectors = annotation.selectors();
        if selectors.is_empty() {
            return Ok(());
        }
        let located = match anchor(self.surface.as_ref(), selectors) {
            Ok(located) => located,
            Err(failure) => {
                debug!(
                    annotation_id = %annotation.id,
                    reason = %failure,
                    "Annotation not anchorable yet"
                );
                return Ok(());
            }
        };
        let entry = self.tag_manager.entry_for(&annotation.tags).await;
        let color = entry
            .as_ref()
            .and_then(|(_, color)| color.map(|c| c.to_css()));
        let tooltip = tooltip_for(entry.as_ref().map(|(name, _)| name.as_str()), &annotation.text);
        let spec = MarkSpec {
            annotation_id: annotation.id.clone(),
            page: located.page,
            start: located.start,
            end: located.end,
            color,
            tooltip,
        };
        self.surface.apply_mark(&spec)?;
        Ok(())
    }

    /// Clear collections and marks. Idempotent; the phase guard rejects
    /// every later operation.
    async fn destroy(&self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            if state.phase == AnnotatorPhase::Destroyed {
                return Ok(());
            }
            state.phase = AnnotatorPhase::Destroyed;
            state.primaries.clear();
            state.replies.clear();
        }
        let removed = self.surface.clear_marks();
        info!(mark_count = removed, "Annotator destroyed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tooltip_formats() {
        assert_eq!(tooltip_for(Some("Trust"), ""), Some("Trust".to_string()));
        assert_eq!(
            tooltip_for(Some("Trust"), "verbatim quote"),
            Some("Trust: verbatim quote".to_string())
        );
        assert_eq!(tooltip_for(None, ""), None);
        assert_eq!(tooltip_for(None, "note"), Some("note".to_string()));
    }

    #[test]
    fn test_retagged_replaces_and_preserves() {
        let tags = vec![
            "oa:theme:Trust".to_string(),
            "custom".to_string(),
        ];
        let old = vec!["oa:theme:Trust".to_string()];
        let new = vec![
            "oa:code:Delegation".to_string(),
            "oa:isCodeOf:Trust".to_string(),
        ];
        assert_eq!(
            retagged(&tags, &old, &new),
            vec!["custom", "oa:code:Delegation", "oa:isCodeOf:Trust"]
        );
    }

    #[test]
    fn test_retagged_does_not_duplicate() {
        let tags = vec!["a".to_string(), "b".to_string()];
        let old = vec!["a".to_string()];
        let new = vec!["b".to_string()];
        assert_eq!(retagged(&tags, &old, &new), vec!["b"]);
    }

    #[test]
    fn test_structural_exclusion_tags() {
        let tags = structural_exclusion_tags();
        assert!(tags.contains(&"oa:guide".to_string()));
        assert!(tags.contains(&"oa:motivation:codebookDevelopment".to_string()));
    }
}
