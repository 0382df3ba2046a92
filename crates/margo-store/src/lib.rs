//! # margo-store
//!
//! Annotation store clients implementing the
//! [`AnnotationStore`](margo_core::AnnotationStore) trait.
//!
//! [`RemoteStore`] speaks the Hypothesis-compatible HTTP API with bearer
//! authentication. [`MemoryStore`] is an in-process store with a call log
//! and deterministic failure injection for tests and offline use.

pub mod memory;
pub mod remote;

pub use memory::{MemoryStore, StoreCall};
pub use remote::RemoteStore;
