//! Codebook management for a session's group.
//!
//! The coding guide lives as annotations on the group's activity page. The
//! tag manager loads it from there, provisions one when the group has none,
//! and persists codebook edits back as annotation creates and deletes.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use margo_core::guide::group_uri;
use margo_core::{
    AnnotationGuide, AnnotationStore, Code, Color, Error, EventBus, Group, GuideDefinition,
    Result, SearchQuery, SessionEvent, SortOrder, Theme,
};

/// Loads and edits the annotation guide of one group.
pub struct TagManager {
    store: Arc<dyn AnnotationStore>,
    events: EventBus,
    group: Group,
    creator: String,
    guide: RwLock<Option<AnnotationGuide>>,
}

impl std::fmt::Debug for TagManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagManager")
            .field("group", &self.group)
            .field("creator", &self.creator)
            .finish_non_exhaustive()
    }
}

impl TagManager {
    pub fn new(
        store: Arc<dyn AnnotationStore>,
        events: EventBus,
        group: Group,
        creator: impl Into<String>,
    ) -> Self {
        Self {
            store,
            events,
            group,
            creator: creator.into(),
            guide: RwLock::new(None),
        }
    }

    /// Load the group's guide, provisioning one when the group has none.
    ///
    /// A provided definition seeds the provisioned codebook; without one the
    /// group gets an empty guide named after it.
    pub async fn init(&self, definition: Option<&GuideDefinition>) -> Result<()> {
        let guide = match self.fetch_guide().await? {
            Some(guide) => guide,
            None => {
                self.provision(definition).await?;
                self.fetch_guide().await?.ok_or_else(|| {
                    Error::Guide("provisioned codebook is not readable back".to_string())
                })?
            }
        };
        info!(
            group_id = %self.group.id,
            theme_count = guide.themes.len(),
            "Annotation guide loaded"
        );
        *self.guide.write().await = Some(guide);
        Ok(())
    }

    async fn fetch_guide(&self) -> Result<Option<AnnotationGuide>> {
        let query = SearchQuery {
            uri: Some(group_uri(&self.group)),
            group: Some(self.group.id.clone()),
            order: Some(SortOrder::Asc),
            ..Default::default()
        };
        let result = self.store.search(&query).await?;
        debug!(
            group_id = %self.group.id,
            annotation_count = result.rows.len(),
            "Fetched group page annotations"
        );
        Ok(AnnotationGuide::from_annotations(&result.rows))
    }

    async fn provision(&self, definition: Option<&GuideDefinition>) -> Result<()> {
        let guide = match definition {
            Some(definition) => AnnotationGuide::from_definition(definition),
            None => AnnotationGuide::new(self.group.name.clone()),
        };
        for payload in guide.to_payloads(&self.group, &self.creator) {
            self.store.create_annotation(&payload).await?;
        }
        info!(
            group_id = %self.group.id,
            theme_count = guide.themes.len(),
            "Provisioned annotation guide for group"
        );
        Ok(())
    }

    /// Re-fetch the guide and broadcast the change.
    ///
    /// A group page that lost its guide marker keeps the previously loaded
    /// guide rather than degrading the session.
    pub async fn reload(&self) -> Result<()> {
        match self.fetch_guide().await? {
            Some(guide) => {
                *self.guide.write().await = Some(guide);
                self.events.emit(SessionEvent::GuideUpdated);
                Ok(())
            }
            None => {
                warn!(
                    group_id = %self.group.id,
                    "Group page has no readable guide, keeping loaded codebook"
                );
                Ok(())
            }
        }
    }

    /// Snapshot of the current guide.
    pub async fn guide(&self) -> Option<AnnotationGuide> {
        self.guide.read().await.clone()
    }

    /// Resolve the codebook entry a tag set classifies under.
    ///
    /// Returns the entry name and color for marker rendering.
    pub async fn entry_for(&self, tags: &[String]) -> Option<(String, Option<Color>)> {
        let guide = self.guide.read().await;
        guide
            .as_ref()?
            .entry_for_tags(tags)
            .map(|entry| (entry.name().to_string(), entry.color()))
    }

    /// Persist a new theme (with its codes) and reload.
    pub async fn add_theme(&self, theme: Theme) -> Result<()> {
        {
            let guide = self.guide.read().await;
            let guide = guide
                .as_ref()
                .ok_or_else(|| Error::Guide("no guide loaded".to_string()))?;
            if guide.find_theme(&theme.name).is_some() {
                return Err(Error::InvalidInput(format!(
                    "theme already exists: {}",
                    theme.name
                )));
            }
        }
        for payload in theme.to_payloads(&self.group, &self.creator) {
            self.store.create_annotation(&payload).await?;
        }
        self.reload().await
    }

    /// Persist a new code under an existing theme and reload.
    pub async fn add_code(&self, theme_name: &str, mut code: Code) -> Result<()> {
        {
            let guide = self.guide.read().await;
            let guide = guide
                .as_ref()
                .ok_or_else(|| Error::Guide("no guide loaded".to_string()))?;
            if guide.find_theme(theme_name).is_none() {
                return Err(Error::InvalidInput(format!("unknown theme: {theme_name}")));
            }
        }
        code.theme_name = theme_name.to_string();
        self.store
            .create_annotation(&code.to_payload(&self.group, &self.creator))
            .await?;
        self.reload().await
    }

    /// Delete a theme or code from the codebook by its entry id.
    ///
    /// Removing a theme also removes every code under it.
    pub async fn remove_entry(&self, entry_id: &str) -> Result<()> {
        let doomed: Vec<String> = {
            let guide = self.guide.read().await;
            let guide = guide
                .as_ref()
                .ok_or_else(|| Error::Guide("no guide loaded".to_string()))?;
            match guide.get_entry(entry_id) {
                Some(margo_core::CodebookEntry::Theme(theme)) => theme
                    .id
                    .iter()
                    .chain(theme.codes.iter().filter_map(|c| c.id.as_ref()))
                    .cloned()
                    .collect(),
                Some(margo_core::CodebookEntry::Code(code)) => {
                    code.id.iter().cloned().collect()
                }
                None => {
                    return Err(Error::NotFound(format!(
                        "no codebook entry with id {entry_id}"
                    )))
                }
            }
        };
        for id in &doomed {
            self.store.delete_annotation(id).await?;
        }
        debug!(
            group_id = %self.group.id,
            removed = doomed.len(),
            "Removed codebook entry annotations"
        );
        self.reload().await
    }
}
