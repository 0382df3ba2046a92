//! # margo-core
//!
//! Core types, traits, and abstractions for the margo annotation engine.
//!
//! This crate provides the foundational data structures and trait definitions
//! that other margo crates depend on: the annotation data model, the selector
//! tagged union, the coding guide (themes and codes), the event bus, and the
//! annotation store trait.

pub mod color;
pub mod config;
pub mod defaults;
pub mod error;
pub mod events;
pub mod guide;
pub mod logging;
pub mod models;
pub mod selector;
pub mod traits;

// Re-export commonly used types at crate root
pub use color::Color;
pub use config::{Intervals, SessionConfig, StoreConfig};
pub use error::{Error, Result};
pub use events::{EventBus, SessionEvent};
pub use guide::{
    AnnotationGuide, Code, CodeDefinition, CodebookEntry, GuideDefinition, Theme, ThemeDefinition,
};
pub use models::*;
pub use selector::{Selector, SelectorKind};
pub use traits::{AnnotationStore, ContentAnnotator, SearchResult};
