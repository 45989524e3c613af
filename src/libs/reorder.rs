//! Reorder planning: one drag gesture, one key write.
//!
//! A drag is described by the two neighbors the moved task now sits between.
//! The planner turns that into a single fresh [`OrderKey`] for the moved
//! task; neighbor rows are read but never written. The legacy alternative
//! (absolute target index, server rewrites every integer position) is
//! deliberately not implemented.

use crate::libs::error::OrderError;
use crate::libs::order_key::OrderKey;

/// The "reorder between neighbors" request shape.
///
/// Either neighbor may be absent: no `previous_task_id` means moved to the
/// very front, no `next_task_id` means moved to the very end, both absent
/// means the task is the only active one. The caller is responsible for
/// verifying that the neighbors belong to the same owner as the moved task
/// before the plan is persisted; the planner itself is not an authorization
/// boundary.
#[derive(Debug, Clone)]
pub struct ReorderRequest {
    pub task_id: String,
    pub previous_task_id: Option<String>,
    pub next_task_id: Option<String>,
}

pub struct ReorderPlanner;

impl ReorderPlanner {
    /// Computes the moved task's new key from its neighbors' keys.
    ///
    /// Fails only with [`OrderError::OrderKeyExhausted`] when both neighbors
    /// are present and no key fits between them; the store catches that and
    /// renumbers the owner's active set before retrying, so the signal never
    /// reaches an end user.
    pub fn plan(
        previous: Option<&OrderKey>,
        next: Option<&OrderKey>,
    ) -> Result<OrderKey, OrderError> {
        match (previous, next) {
            (None, None) => Ok(OrderKey::middle()),
            (None, Some(next)) => Ok(next.prev()),
            (Some(previous), None) => Ok(previous.next()),
            (Some(previous), Some(next)) => OrderKey::between(previous, next),
        }
    }
}
