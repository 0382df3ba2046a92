//! Session event system.
//!
//! Components of a session communicate through a broadcast bus rather than
//! calling each other directly. The annotator reacts to guide and filter
//! changes, filter views react to reconciled annotation sets, and the
//! document watcher announces URL changes, all without holding references
//! across component boundaries.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::defaults::EVENT_BUS_CAPACITY;
use crate::models::Annotation;

/// Events emitted over a session's bus.
///
/// Collection-bearing variants carry the full annotation list so consumers
/// never re-query state that was already computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// The reconciled set of all annotations for the document changed.
    AnnotationsUpdated { annotations: Vec<Annotation> },
    /// The filtered view over the reconciled set changed.
    CurrentViewUpdated { annotations: Vec<Annotation> },
    /// A single annotation was created by the local user.
    AnnotationCreated { annotation: Annotation },
    /// A single annotation was deleted.
    AnnotationDeleted { annotation: Annotation },
    /// The free-text comment of an annotation was edited.
    CommentUpdated { annotation: Annotation },
    /// The annotation guide (codebook) was reloaded or edited.
    GuideUpdated,
    /// The set of active users in the user filter changed.
    FilterChanged { active_users: Vec<String> },
    /// The underlying document URL changed (single-page navigation).
    DocumentUrlChanged { url: String },
}

impl SessionEvent {
    /// Event type string for logging and routing.
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::AnnotationsUpdated { .. } => "annotations_updated",
            SessionEvent::CurrentViewUpdated { .. } => "current_view_updated",
            SessionEvent::AnnotationCreated { .. } => "annotation_created",
            SessionEvent::AnnotationDeleted { .. } => "annotation_deleted",
            SessionEvent::CommentUpdated { .. } => "comment_updated",
            SessionEvent::GuideUpdated => "guide_updated",
            SessionEvent::FilterChanged { .. } => "filter_changed",
            SessionEvent::DocumentUrlChanged { .. } => "document_url_changed",
        }
    }

    /// Namespaced event type (`margo.<event_type>`).
    pub fn namespaced_event_type(&self) -> String {
        format!("margo.{}", self.event_type())
    }

    /// The kind of entity this event concerns.
    pub fn entity_type(&self) -> &'static str {
        match self {
            SessionEvent::AnnotationsUpdated { .. }
            | SessionEvent::CurrentViewUpdated { .. } => "annotation_set",
            SessionEvent::AnnotationCreated { .. }
            | SessionEvent::AnnotationDeleted { .. }
            | SessionEvent::CommentUpdated { .. } => "annotation",
            SessionEvent::GuideUpdated => "guide",
            SessionEvent::FilterChanged { .. } => "filter",
            SessionEvent::DocumentUrlChanged { .. } => "document",
        }
    }

    /// Id of the single annotation this event concerns, when there is one.
    pub fn annotation_id(&self) -> Option<&str> {
        match self {
            SessionEvent::AnnotationCreated { annotation }
            | SessionEvent::AnnotationDeleted { annotation }
            | SessionEvent::CommentUpdated { annotation } => Some(&annotation.id),
            _ => None,
        }
    }
}

/// Broadcast bus for session events.
///
/// Cloning is cheap; all clones share the same channel. Slow subscribers
/// that fall more than the channel capacity behind lose the oldest events.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all current subscribers.
    ///
    /// Emitting with no subscribers is not an error; the event is dropped.
    pub fn emit(&self, event: SessionEvent) {
        let event_type = event.event_type();
        match self.tx.send(event) {
            Ok(subscriber_count) => {
                tracing::debug!(event_type, subscriber_count, "Event emitted");
            }
            Err(_) => {
                tracing::debug!(event_type, "Event emitted with no subscribers");
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_BUS_CAPACITY)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
