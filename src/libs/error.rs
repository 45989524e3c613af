//! Typed errors for the ordering subsystem.
//!
//! Everything the store and planner can fail with is enumerated here and
//! returned to the caller; data-correctness failures (a bad cursor, an
//! exhausted key) are never logged and swallowed, since that would silently
//! corrupt the user-visible ordering.

use thiserror::Error;

/// Errors surfaced by the ordering store and reorder planner.
///
/// - `MalformedCursor` and `InvalidLimit` are client-input errors: report,
///   never retry.
/// - `OrderKeyExhausted` is an internal signal; the store converts it into a
///   renumber maintenance pass before it can reach a caller.
/// - `Db` wraps transient persistence failures; reads and the single-row
///   reorder write are safe for the caller to retry.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("pagination cursor is malformed")]
    MalformedCursor,

    #[error("order key is malformed: {0:?}")]
    MalformedOrderKey(String),

    #[error("no representable order key exists between the given bounds")]
    OrderKeyExhausted,

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("neighbor task not found: {0}")]
    NeighborNotFound(String),

    #[error("neighbor task belongs to another owner: {0}")]
    NeighborNotOwned(String),

    #[error("page limit {0} is out of range (1-100)")]
    InvalidLimit(u32),

    #[error(transparent)]
    Db(#[from] rusqlite::Error),
}
