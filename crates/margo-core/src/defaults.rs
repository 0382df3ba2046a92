//! Centralized default constants for the margo annotation engine.
//!
//! **This module is the single source of truth** for all shared default values.
//! All crates should reference these constants instead of defining their own
//! magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// PERIODIC TASKS
// =============================================================================

/// Interval between full annotation refreshes from the store (coarse poll).
pub const RELOAD_INTERVAL_SECS: u64 = 60;

/// Interval between reconciliation sweeps that re-anchor annotations whose
/// highlight marks have gone missing from the document.
pub const RECONCILE_INTERVAL_SECS: u64 = 3;

/// Interval between sweeps that prune highlight marks whose text content has
/// vanished due to document mutation.
pub const CLEAN_INTERVAL_SECS: u64 = 3;

/// Interval between canonical-URL checks for pages that can navigate without
/// a full reload.
pub const URL_POLL_INTERVAL_SECS: u64 = 1;

// =============================================================================
// EVENTS
// =============================================================================

/// Default broadcast buffer capacity for the session event bus.
pub const EVENT_BUS_CAPACITY: usize = 256;

// =============================================================================
// TAG GRAMMAR
// =============================================================================

/// Namespace prefix for every structural tag written by margo.
pub const TAG_NAMESPACE: &str = "oa";

/// Tag group name for themes (`oa:theme:<name>`).
pub const TAG_GROUP: &str = "theme";

/// Tag subgroup name for codes (`oa:code:<name>`).
pub const TAG_SUBGROUP: &str = "code";

/// Relation tag linking a code to its theme (`oa:isCodeOf:<theme>`).
pub const TAG_RELATION: &str = "isCodeOf";

/// Motivation tag component (`oa:motivation:<value>`).
pub const TAG_MOTIVATION: &str = "motivation";

/// Marker tag carried by the guide annotation itself.
pub const GUIDE_TAG: &str = "oa:guide";

/// Name of the group margo provisions when the user has none.
pub const GROUP_NAME: &str = "Annotations";

// =============================================================================
// COLORS
// =============================================================================

/// Alpha applied to theme colors (lightest visible blend).
pub const MIN_ALPHA: f32 = 0.2;

/// Upper alpha bound for code colors within a theme.
pub const MAX_ALPHA: f32 = 0.8;

// =============================================================================
// SELECTORS
// =============================================================================

/// Characters of leading/trailing context captured by a text-quote selector.
pub const QUOTE_CONTEXT_CHARS: usize = 32;

/// Minimum similarity ratio for the fuzzy anchoring fallback to accept a
/// candidate window as a match.
pub const FUZZY_MATCH_THRESHOLD: f32 = 0.75;

// =============================================================================
// STORE
// =============================================================================

/// Default annotation store API endpoint.
pub const STORE_URL: &str = "https://api.hypothes.is/api";

/// Request timeout for store calls (seconds).
pub const STORE_TIMEOUT_SECS: u64 = 30;

/// Maximum annotations requested per search call.
pub const SEARCH_LIMIT: usize = 200;

/// JSON-LD context declared on every annotation payload.
pub const ANNOTATION_CONTEXT: &str = "http://www.w3.org/ns/anno.jsonld";

/// `conformsTo` value for PDF page fragment selectors.
pub const PDF_FRAGMENT_CONFORMS_TO: &str = "http://tools.ietf.org/rfc/rfc3778";
