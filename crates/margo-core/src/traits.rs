//! Seam traits between the engine and its collaborators.
//!
//! The engine only ever talks to an [`AnnotationStore`] and drives a
//! [`ContentAnnotator`]; concrete implementations (remote HTTP client,
//! in-memory test store, text annotator) live in their own crates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Annotation, AnnotationPayload, Group, Profile, SearchQuery};

/// Result of an annotation search: one page of rows plus the total match
/// count reported by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub rows: Vec<Annotation>,
    #[serde(default)]
    pub total: usize,
}

/// Persistence facade over an annotation store.
///
/// Implementations are expected to be cheap to clone behind an `Arc` and
/// safe to call concurrently.
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    /// Search annotations matching the query.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult>;

    /// Create an annotation, returning it with its store-assigned id.
    async fn create_annotation(&self, payload: &AnnotationPayload) -> Result<Annotation>;

    /// Update an existing annotation, returning the stored result.
    async fn update_annotation(&self, id: &str, payload: &AnnotationPayload)
        -> Result<Annotation>;

    /// Delete an annotation. Returns whether the store confirmed deletion.
    async fn delete_annotation(&self, id: &str) -> Result<bool>;

    /// List groups visible to the authenticated user.
    async fn list_groups(&self) -> Result<Vec<Group>>;

    /// Create a new group with the given name.
    async fn create_group(&self, name: &str) -> Result<Group>;

    /// Fetch the authenticated user's profile.
    async fn user_profile(&self) -> Result<Profile>;
}

/// Lifecycle contract for annotator implementations.
///
/// A session drives exactly one annotator: `init` once after the document
/// identity and group are resolved, `highlight` whenever a single
/// annotation needs (re)painting, and `destroy` exactly once on teardown.
/// `destroy` must be idempotent; the session may race it against in-flight
/// periodic work.
#[async_trait]
pub trait ContentAnnotator: Send + Sync {
    /// Load existing annotations, paint them, and start periodic tasks.
    async fn init(&self) -> Result<()>;

    /// Paint or re-paint the marks for one annotation.
    async fn highlight(&self, annotation: &Annotation) -> Result<()>;

    /// Stop periodic tasks and remove every mark this annotator applied.
    async fn destroy(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traits_are_object_safe() {
        fn assert_store(_: Option<&dyn AnnotationStore>) {}
        fn assert_annotator(_: Option<&dyn ContentAnnotator>) {}
        assert_store(None);
        assert_annotator(None);
    }

    #[test]
    fn test_search_result_defaults_missing_fields() {
        let result: SearchResult = serde_json::from_str("{}").unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.total, 0);
    }

    #[test]
    fn test_search_result_deserializes_rows() {
        let raw = r#"{
            "total": 1,
            "rows": [{
                "id": "a1",
                "uri": "https://example.com",
                "user": "acct:alice@hypothes.is",
                "group": "g1",
                "created": "2026-08-01T10:00:00Z",
                "updated": "2026-08-01T10:00:00Z"
            }]
        }"#;
        let result: SearchResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.rows[0].id, "a1");
    }
}
