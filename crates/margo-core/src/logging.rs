//! Structured logging schema and field name constants for margo.
//!
//! All crates use these constants for consistent structured logging fields.
//! This ensures log aggregation tools can query by standardized field names
//! across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Session left degraded, requires user or operator attention |
//! | WARN  | Recoverable issue, automatic fallback or skip applied |
//! | INFO  | Lifecycle events (init stages, destroy), operation completions |
//! | DEBUG | Decision points, anchoring strategy choices, event routing |
//! | TRACE | Per-annotation iteration, high-volume data (marks, selectors) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "dom", "anchor", "store", "engine"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "annotator", "user_filter", "identity", "session", "remote_store"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "load_all", "create", "retag", "anchor", "search"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Annotation id being operated on.
pub const ANNOTATION_ID: &str = "annotation_id";

/// Workspace group id.
pub const GROUP_ID: &str = "group_id";

/// Document URI a session or search is scoped to.
pub const DOCUMENT_URI: &str = "document_uri";

/// Theme name within the annotation guide.
pub const THEME: &str = "theme";

/// Code name within the annotation guide.
pub const CODE: &str = "code";

/// User identifier (`acct:` form or bare username).
pub const USER: &str = "user";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of annotations returned or affected.
pub const ANNOTATION_COUNT: &str = "annotation_count";

/// Number of annotations successfully anchored to the document.
pub const ANCHORED_COUNT: &str = "anchored_count";

/// Number of annotations whose targets could not be located.
pub const ORPHAN_COUNT: &str = "orphan_count";

/// Number of marks currently applied to the document surface.
pub const MARK_COUNT: &str = "mark_count";

// ─── Anchoring fields ──────────────────────────────────────────────────────

/// Anchoring strategy that produced a match.
/// Values: "position", "quote", "fuzzy"
pub const STRATEGY: &str = "strategy";

/// Similarity score of a fuzzy match (0.0..=1.0).
pub const SCORE: &str = "score";

/// Page number within a paginated document.
pub const PAGE: &str = "page";

// ─── Store fields ──────────────────────────────────────────────────────────

/// HTTP status returned by the remote store.
pub const STATUS: &str = "status";

/// Request URL sent to the remote store.
pub const URL: &str = "url";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
