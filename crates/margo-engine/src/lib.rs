//! # margo-engine
//!
//! Session engine for margo: ties a document surface, an annotation store,
//! and a coding guide together into one running annotation session.
//!
//! This crate provides:
//! - Document identity resolution (DOI, URL overrides, content fingerprints)
//! - The annotation reconciliation engine (load, highlight, sweep, redraw)
//! - User filter views over the reconciled annotation set
//! - Group resolution and creator URI derivation
//! - Staged session initialization and teardown
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use margo_core::SessionConfig;
//! use margo_dom::MemoryDocument;
//! use margo_engine::{Session, SessionContext};
//! use margo_store::MemoryStore;
//!
//! let surface = Arc::new(MemoryDocument::html("The annotated page text."));
//! let store = Arc::new(MemoryStore::new());
//! let ctx = SessionContext::new(store, surface, SessionConfig::default());
//!
//! let session = Session::new(Arc::new(ctx));
//! session.init().await?;
//!
//! let annotator = session.annotator().await?;
//! let view = annotator.current_view().await;
//!
//! session.destroy().await?;
//! ```

pub mod annotator;
pub mod filter;
pub mod groups;
pub mod identity;
pub mod payload;
pub mod session;
pub mod tags;
pub mod tasks;

// Re-export core types
pub use margo_core::*;

// Re-export engine types
pub use annotator::{AnnotatorDeps, AnnotatorPhase, CreateOutcome, TextAnnotator};
pub use filter::{RegisterOutcome, SharedUserFilter, UserFilter};
pub use groups::{creator_uri, resolve_group};
pub use identity::{resolve_document, spawn_url_watch};
pub use payload::{annotation_payload, reply_payload, update_payload};
pub use session::{Session, SessionContext, SessionStatus};
pub use tags::TagManager;
pub use tasks::PeriodicTask;
