//! # margo-anchor
//!
//! Turns selections into selectors and selectors back into document
//! positions.
//!
//! [`describe`] runs at annotation creation time and produces every
//! selector the document kind supports, from most precise to most robust.
//! [`anchor`] runs at highlight time and walks the strategies in the other
//! direction: exact position first, then exact quote with context
//! disambiguation, then fuzzy quote matching. Text offsets throughout are
//! character offsets within one page's text.

pub mod anchor;
pub mod describe;

pub use anchor::{anchor, Anchor, AnchorFailure};
pub use describe::{describe, Selection};
