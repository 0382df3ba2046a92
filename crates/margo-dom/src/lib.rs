//! # margo-dom
//!
//! Document surface abstraction for the margo annotation engine.
//!
//! The engine never touches a concrete document directly; it reads text,
//! applies highlight marks, and scrolls through the [`DocumentSurface`]
//! trait. [`MemoryDocument`] is the in-process implementation used by tests
//! and headless tooling, modeling paginated documents with lazily loaded
//! pages the way a PDF viewer renders them.

pub mod memory;
pub mod surface;

pub use memory::MemoryDocument;
pub use surface::{DocumentSurface, Mark, MarkSpec};
