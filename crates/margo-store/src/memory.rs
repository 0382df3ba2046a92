//! In-memory annotation store with call logging and failure injection.
//!
//! Backs engine tests and offline tooling. Behavior mirrors the remote
//! store: ids are store-assigned, searches filter and sort, deletes report
//! whether anything was removed. Failure injection is deterministic so
//! tests can script exactly which call fails.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use margo_core::models::{
    Annotation, AnnotationPayload, Group, GroupLinks, Profile, SearchQuery, SortOrder,
};
use margo_core::traits::{AnnotationStore, SearchResult};
use margo_core::{Error, Result};

/// Knobs shared by all clones of one [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Artificial latency applied to every call.
    pub latency_ms: u64,
    /// Probability in `0.0..=1.0` that any call fails at random.
    pub failure_rate: f32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            failure_rate: 0.0,
        }
    }
}

/// One logged store call.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Search {
        uri: Option<String>,
        group: Option<String>,
    },
    Create {
        id: String,
    },
    Update {
        id: String,
    },
    Delete {
        id: String,
    },
    ListGroups,
    CreateGroup {
        name: String,
    },
    Profile,
}

#[derive(Debug)]
struct State {
    annotations: Vec<Annotation>,
    groups: Vec<Group>,
    profile: Profile,
    calls: Vec<StoreCall>,
    fail_next: HashMap<String, u32>,
    fail_update_ids: HashSet<String>,
    reject_next_delete: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            annotations: Vec::new(),
            groups: Vec::new(),
            profile: Profile {
                userid: "acct:researcher@hypothes.is".to_string(),
                display_name: None,
                metadata: None,
            },
            calls: Vec::new(),
            fail_next: HashMap::new(),
            fail_update_ids: HashSet::new(),
            reject_next_delete: false,
        }
    }
}

/// In-process [`AnnotationStore`].
///
/// Clones share the same state, so a test can hold one clone while the
/// engine holds another.
#[derive(Clone)]
pub struct MemoryStore {
    config: Arc<MemoryConfig>,
    state: Arc<Mutex<State>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            config: Arc::new(MemoryConfig::default()),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        Arc::make_mut(&mut self.config).latency_ms = latency_ms;
        self
    }

    pub fn with_failure_rate(mut self, failure_rate: f32) -> Self {
        Arc::make_mut(&mut self.config).failure_rate = failure_rate;
        self
    }

    pub fn with_profile(self, profile: Profile) -> Self {
        self.lock().profile = profile;
        self
    }

    pub fn with_group(self, group: Group) -> Self {
        self.lock().groups.push(group);
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert an annotation as-is, without logging a call.
    pub fn seed(&self, annotation: Annotation) {
        self.lock().annotations.push(annotation);
    }

    /// Materialize and insert a payload as the store's own user, without
    /// logging a call. Returns the stored annotation.
    pub fn seed_payload(&self, payload: &AnnotationPayload) -> Annotation {
        let mut state = self.lock();
        let annotation = materialize(payload, &state.profile.userid, new_annotation_id());
        state.annotations.push(annotation.clone());
        annotation
    }

    /// Make the next call of the named operation fail. Queuing the same
    /// operation twice fails its next two calls.
    pub fn fail_next(&self, op: &str) {
        *self.lock().fail_next.entry(op.to_string()).or_insert(0) += 1;
    }

    /// Make the next update of one specific annotation fail.
    pub fn fail_update_for(&self, id: &str) {
        self.lock().fail_update_ids.insert(id.to_string());
    }

    /// Make the next delete report `deleted: false` without removing
    /// anything.
    pub fn reject_next_delete(&self) {
        self.lock().reject_next_delete = true;
    }

    pub fn get_calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn search_call_count(&self) -> usize {
        self.count_calls(|c| matches!(c, StoreCall::Search { .. }))
    }

    pub fn create_call_count(&self) -> usize {
        self.count_calls(|c| matches!(c, StoreCall::Create { .. }))
    }

    pub fn update_call_count(&self) -> usize {
        self.count_calls(|c| matches!(c, StoreCall::Update { .. }))
    }

    pub fn delete_call_count(&self) -> usize {
        self.count_calls(|c| matches!(c, StoreCall::Delete { .. }))
    }

    fn count_calls(&self, predicate: impl Fn(&StoreCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| predicate(c)).count()
    }

    /// Snapshot of everything currently stored.
    pub fn stored_annotations(&self) -> Vec<Annotation> {
        self.lock().annotations.clone()
    }

    async fn simulate(&self, op: &str) -> Result<()> {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }
        let injected = {
            let mut state = self.lock();
            match state.fail_next.get_mut(op) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    true
                }
                _ => false,
            }
        };
        if injected {
            return Err(Error::Store(format!("Injected failure for {op}")));
        }
        if self.config.failure_rate > 0.0 && rand::random::<f32>() < self.config.failure_rate {
            return Err(Error::Store(format!("Simulated random failure for {op}")));
        }
        Ok(())
    }
}

fn new_annotation_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn materialize(payload: &AnnotationPayload, userid: &str, id: String) -> Annotation {
    let now = Utc::now();
    Annotation {
        id,
        uri: payload.uri.clone(),
        user: userid.to_string(),
        text: payload.text.clone(),
        tags: payload.tags.clone(),
        group: payload.group.clone(),
        created: now,
        updated: now,
        references: payload.references.clone(),
        target: payload.target.clone(),
        permissions: Some(payload.permissions.clone()),
        document_metadata: payload
            .document_metadata
            .clone()
            .or_else(|| Some(payload.document.clone())),
        motivation: Some(payload.motivation),
    }
}

#[async_trait::async_trait]
impl AnnotationStore for MemoryStore {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult> {
        self.simulate("search").await?;
        let mut state = self.lock();
        state.calls.push(StoreCall::Search {
            uri: query.uri.clone(),
            group: query.group.clone(),
        });
        let mut rows: Vec<Annotation> = state
            .annotations
            .iter()
            .filter(|a| {
                let uri_match = match (&query.uri, &query.url) {
                    (None, None) => true,
                    (uri, url) => {
                        uri.as_deref() == Some(a.uri.as_str())
                            || url.as_deref() == Some(a.uri.as_str())
                    }
                };
                let group_match = query.group.as_deref().map_or(true, |g| g == a.group);
                let user_match = query.user.as_deref().map_or(true, |u| u == a.user);
                let tag_match = query
                    .tag
                    .as_deref()
                    .map_or(true, |t| a.tags.iter().any(|tag| tag == t));
                uri_match && group_match && user_match && tag_match
            })
            .cloned()
            .collect();
        match query.order {
            Some(SortOrder::Desc) => rows.sort_by(|a, b| b.created.cmp(&a.created)),
            _ => rows.sort_by(|a, b| a.created.cmp(&b.created)),
        }
        let total = rows.len();
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(SearchResult { rows, total })
    }

    async fn create_annotation(&self, payload: &AnnotationPayload) -> Result<Annotation> {
        self.simulate("create").await?;
        let mut state = self.lock();
        let annotation = materialize(payload, &state.profile.userid, new_annotation_id());
        state.calls.push(StoreCall::Create {
            id: annotation.id.clone(),
        });
        state.annotations.push(annotation.clone());
        Ok(annotation)
    }

    async fn update_annotation(
        &self,
        id: &str,
        payload: &AnnotationPayload,
    ) -> Result<Annotation> {
        self.simulate("update").await?;
        let mut state = self.lock();
        state.calls.push(StoreCall::Update { id: id.to_string() });
        if state.fail_update_ids.remove(id) {
            return Err(Error::Store(format!("Injected update failure for {id}")));
        }
        let annotation = state
            .annotations
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::AnnotationNotFound(id.to_string()))?;
        annotation.uri = payload.uri.clone();
        annotation.text = payload.text.clone();
        annotation.tags = payload.tags.clone();
        annotation.references = payload.references.clone();
        annotation.target = payload.target.clone();
        annotation.permissions = Some(payload.permissions.clone());
        annotation.motivation = Some(payload.motivation);
        annotation.updated = Utc::now();
        Ok(annotation.clone())
    }

    async fn delete_annotation(&self, id: &str) -> Result<bool> {
        self.simulate("delete").await?;
        let mut state = self.lock();
        state.calls.push(StoreCall::Delete { id: id.to_string() });
        if state.reject_next_delete {
            state.reject_next_delete = false;
            return Ok(false);
        }
        let before = state.annotations.len();
        state.annotations.retain(|a| a.id != id);
        if state.annotations.len() == before {
            return Err(Error::AnnotationNotFound(id.to_string()));
        }
        Ok(true)
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        self.simulate("list_groups").await?;
        let mut state = self.lock();
        state.calls.push(StoreCall::ListGroups);
        Ok(state.groups.clone())
    }

    async fn create_group(&self, name: &str) -> Result<Group> {
        self.simulate("create_group").await?;
        let mut state = self.lock();
        state.calls.push(StoreCall::CreateGroup {
            name: name.to_string(),
        });
        let id: String = new_annotation_id().chars().take(8).collect();
        let group = Group {
            id: id.clone(),
            name: name.to_string(),
            links: GroupLinks {
                html: Some(format!("https://hypothes.is/groups/{id}")),
            },
        };
        state.groups.push(group.clone());
        Ok(group)
    }

    async fn user_profile(&self) -> Result<Profile> {
        self.simulate("profile").await?;
        let mut state = self.lock();
        state.calls.push(StoreCall::Profile);
        Ok(state.profile.clone())
    }
}
