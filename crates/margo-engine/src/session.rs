//! Session lifecycle and dependency wiring.
//!
//! A [`Session`] owns one annotated document from initialization to
//! teardown. Construction takes a [`SessionContext`] carrying the injected
//! store and document surface; `init` runs the staged startup sequence and
//! spawns the background tasks, `destroy` stops them in reverse order.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use margo_core::{
    AnnotationGuide, AnnotationStore, ContentAnnotator, DocumentContext, DocumentKind, Error,
    EventBus, GuideDefinition, Group, Profile, Result, SessionConfig, SessionEvent,
};
use margo_dom::DocumentSurface;

use crate::annotator::{AnnotatorDeps, TextAnnotator};
use crate::filter::{SharedUserFilter, UserFilter};
use crate::groups::{creator_uri, resolve_group};
use crate::identity::{resolve_document, spawn_url_watch};
use crate::tags::TagManager;
use crate::tasks::PeriodicTask;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Created,
    Initializing,
    Initialized,
    Destroyed,
}

/// Injected dependencies shared by every component of one session.
pub struct SessionContext {
    pub store: Arc<dyn AnnotationStore>,
    pub surface: Arc<dyn DocumentSurface>,
    pub events: EventBus,
    pub config: SessionConfig,
}

impl SessionContext {
    pub fn new(
        store: Arc<dyn AnnotationStore>,
        surface: Arc<dyn DocumentSurface>,
        config: SessionConfig,
    ) -> Self {
        let events = EventBus::new(config.event_capacity);
        Self {
            store,
            surface,
            events,
            config,
        }
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("group_name", &self.config.group_name)
            .field("document_kind", &self.surface.kind())
            .finish()
    }
}

/// Everything `init` builds and `destroy` tears down.
struct Components {
    document: DocumentContext,
    profile: Profile,
    group: Group,
    tag_manager: Arc<TagManager>,
    annotator: Arc<TextAnnotator>,
    filter: SharedUserFilter,
    tasks: Vec<PeriodicTask>,
    wiring_tx: mpsc::Sender<()>,
}

struct SessionInner {
    status: SessionStatus,
    components: Option<Components>,
}

/// One annotation session over one document.
pub struct Session {
    ctx: Arc<SessionContext>,
    guide_definition: Option<GuideDefinition>,
    inner: RwLock<SessionInner>,
}

fn not_initialized() -> Error {
    Error::Session("session is not initialized".to_string())
}

impl Session {
    pub fn new(ctx: Arc<SessionContext>) -> Self {
        Self {
            ctx,
            guide_definition: None,
            inner: RwLock::new(SessionInner {
                status: SessionStatus::Created,
                components: None,
            }),
        }
    }

    /// Seed the group's codebook from this definition when the group has no
    /// guide yet. Groups with an existing guide ignore it.
    pub fn with_guide_definition(mut self, definition: GuideDefinition) -> Self {
        self.guide_definition = Some(definition);
        self
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.ctx
    }

    pub fn events(&self) -> &EventBus {
        &self.ctx.events
    }

    pub async fn status(&self) -> SessionStatus {
        self.inner.read().await.status
    }

    /// Run the staged startup sequence.
    ///
    /// Stages run in a fixed order: document identity, user profile, group,
    /// guide, annotator, filter seed. A failed stage leaves the session in
    /// `Created`, ready for another attempt; nothing from the failed attempt
    /// survives.
    pub async fn init(&self) -> Result<()> {
        {
            let mut inner = self.inner.write().await;
            match inner.status {
                SessionStatus::Created => inner.status = SessionStatus::Initializing,
                SessionStatus::Destroyed => {
                    return Err(Error::Session("session is destroyed".to_string()))
                }
                _ => {
                    return Err(Error::Session(
                        "session is already initialized".to_string(),
                    ))
                }
            }
        }

        let components = match self.build_components().await {
            Ok(components) => components,
            Err(e) => {
                let mut inner = self.inner.write().await;
                if inner.status == SessionStatus::Initializing {
                    inner.status = SessionStatus::Created;
                }
                return Err(e);
            }
        };

        let mut inner = self.inner.write().await;
        if inner.status != SessionStatus::Initializing {
            drop(inner);
            Self::teardown(components).await;
            return Err(Error::Session(
                "session destroyed during initialization".to_string(),
            ));
        }
        info!(
            group_id = %components.group.id,
            user = %components.profile.userid,
            "Session initialized"
        );
        inner.components = Some(components);
        inner.status = SessionStatus::Initialized;
        Ok(())
    }

    async fn build_components(&self) -> Result<Components> {
        let ctx = &self.ctx;

        info!(stage = "document", "Resolving document identity");
        let document = resolve_document(ctx.surface.as_ref());

        info!(stage = "profile", "Fetching user profile");
        let profile = ctx.store.user_profile().await?;
        let creator = creator_uri(&profile);

        info!(stage = "group", group_name = %ctx.config.group_name, "Resolving workspace group");
        let group = resolve_group(ctx.store.as_ref(), &ctx.config.group_name).await?;

        info!(stage = "guide", group_id = %group.id, "Loading annotation guide");
        let tag_manager = Arc::new(TagManager::new(
            ctx.store.clone(),
            ctx.events.clone(),
            group.clone(),
            creator.clone(),
        ));
        tag_manager.init(self.guide_definition.as_ref()).await?;

        info!(stage = "annotator", "Initializing annotator");
        let filter: SharedUserFilter = Arc::new(Mutex::new(UserFilter::new(ctx.events.clone())));
        let annotator = Arc::new(TextAnnotator::new(AnnotatorDeps {
            store: ctx.store.clone(),
            surface: ctx.surface.clone(),
            tag_manager: tag_manager.clone(),
            filter: filter.clone(),
            events: ctx.events.clone(),
            context: document.clone(),
            group_id: group.id.clone(),
            creator,
        }));
        annotator.init().await?;

        info!(stage = "filter", "Seeding user filter");
        {
            let primaries = annotator.primaries().await;
            let mut filter = filter.lock().unwrap_or_else(|e| e.into_inner());
            filter.rebuild(&primaries);
        }

        let wiring_tx = Self::spawn_wiring(ctx, annotator.clone(), filter.clone());
        let tasks = Self::spawn_tasks(ctx, &document, annotator.clone());

        Ok(Components {
            document,
            profile,
            group,
            tag_manager,
            annotator,
            filter,
            tasks,
            wiring_tx,
        })
    }

    /// Route bus events to the components that react to them.
    ///
    /// Reconciled-set updates rebuild the filter's user list; guide, filter,
    /// and URL changes go to the annotator.
    fn spawn_wiring(
        ctx: &SessionContext,
        annotator: Arc<TextAnnotator>,
        filter: SharedUserFilter,
    ) -> mpsc::Sender<()> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let mut events_rx = ctx.events.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        debug!("Session wiring stopped");
                        break;
                    }
                    event = events_rx.recv() => match event {
                        Ok(SessionEvent::AnnotationsUpdated { annotations }) => {
                            let mut filter = filter.lock().unwrap_or_else(|e| e.into_inner());
                            filter.rebuild(&annotations);
                        }
                        Ok(event @ (SessionEvent::GuideUpdated
                        | SessionEvent::FilterChanged { .. }
                        | SessionEvent::DocumentUrlChanged { .. })) => {
                            if let Err(e) = annotator.handle_event(&event).await {
                                warn!(
                                    event_type = event.event_type(),
                                    error = %e,
                                    "Event handling failed"
                                );
                            }
                        }
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped_count = skipped, "Event bus lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        });
        shutdown_tx
    }

    fn spawn_tasks(
        ctx: &SessionContext,
        document: &DocumentContext,
        annotator: Arc<TextAnnotator>,
    ) -> Vec<PeriodicTask> {
        let intervals = &ctx.config.intervals;
        let mut tasks = Vec::new();

        let refresh = annotator.clone();
        tasks.push(PeriodicTask::spawn(
            "annotation_refresh",
            intervals.reload,
            move || {
                let annotator = refresh.clone();
                async move {
                    if let Err(e) = annotator.refresh().await {
                        warn!(error = %e, "Periodic refresh failed");
                    }
                }
            },
        ));

        let reconcile = annotator.clone();
        tasks.push(PeriodicTask::spawn(
            "anchor_reconcile",
            intervals.reconcile,
            move || {
                let annotator = reconcile.clone();
                async move {
                    if let Err(e) = annotator.reconcile_sweep().await {
                        debug!(error = %e, "Reconcile sweep skipped");
                    }
                }
            },
        ));

        let clean = annotator;
        tasks.push(PeriodicTask::spawn(
            "mark_clean",
            intervals.clean,
            move || {
                let annotator = clean.clone();
                async move {
                    if let Err(e) = annotator.clean_sweep().await {
                        debug!(error = %e, "Clean sweep skipped");
                    }
                }
            },
        ));

        // Live web pages can navigate without a reload; local files and
        // PDFs cannot.
        if document.kind == DocumentKind::Html
            && !document.local_file
            && ctx.surface.url().is_some()
        {
            tasks.push(spawn_url_watch(
                ctx.surface.clone(),
                ctx.events.clone(),
                intervals.url_poll,
            ));
        }

        tasks
    }

    async fn teardown(components: Components) {
        let _ = components.wiring_tx.send(()).await;
        for task in components.tasks.iter().rev() {
            if let Err(e) = task.shutdown().await {
                debug!(task = task.name(), error = %e, "Task already stopped");
            }
        }
        if let Err(e) = components.annotator.destroy().await {
            warn!(error = %e, "Annotator destroy failed");
        }
    }

    /// Stop background tasks in reverse start order and destroy the
    /// annotator. Idempotent.
    pub async fn destroy(&self) -> Result<()> {
        let components = {
            let mut inner = self.inner.write().await;
            if inner.status == SessionStatus::Destroyed {
                return Ok(());
            }
            inner.status = SessionStatus::Destroyed;
            inner.components.take()
        };
        if let Some(components) = components {
            Self::teardown(components).await;
        }
        info!("Session destroyed");
        Ok(())
    }

    pub async fn annotator(&self) -> Result<Arc<TextAnnotator>> {
        let inner = self.inner.read().await;
        inner
            .components
            .as_ref()
            .map(|c| c.annotator.clone())
            .ok_or_else(not_initialized)
    }

    pub async fn tag_manager(&self) -> Result<Arc<TagManager>> {
        let inner = self.inner.read().await;
        inner
            .components
            .as_ref()
            .map(|c| c.tag_manager.clone())
            .ok_or_else(not_initialized)
    }

    pub async fn filter(&self) -> Result<SharedUserFilter> {
        let inner = self.inner.read().await;
        inner
            .components
            .as_ref()
            .map(|c| c.filter.clone())
            .ok_or_else(not_initialized)
    }

    /// Resolved identity of the annotated document.
    pub async fn document(&self) -> Result<DocumentContext> {
        let inner = self.inner.read().await;
        inner
            .components
            .as_ref()
            .map(|c| c.document.clone())
            .ok_or_else(not_initialized)
    }

    pub async fn group(&self) -> Result<Group> {
        let inner = self.inner.read().await;
        inner
            .components
            .as_ref()
            .map(|c| c.group.clone())
            .ok_or_else(not_initialized)
    }

    pub async fn profile(&self) -> Result<Profile> {
        let inner = self.inner.read().await;
        inner
            .components
            .as_ref()
            .map(|c| c.profile.clone())
            .ok_or_else(not_initialized)
    }

    pub async fn guide(&self) -> Result<Option<AnnotationGuide>> {
        let tag_manager = self.tag_manager().await?;
        Ok(tag_manager.guide().await)
    }
}
