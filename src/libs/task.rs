//! Task domain types and the pagination request/response shapes.

use crate::libs::error::OrderError;
use crate::libs::order_key::OrderKey;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Default page size when the caller does not specify one.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;
/// Upper bound on the page size a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// A todo-list task, scoped to one owner.
///
/// `order_key` is assigned at creation and rewritten only by an explicit
/// reorder; title, comment, and status edits leave it untouched. A non-null
/// `deleted_at` removes the task from the live ordering without clearing the
/// key, so a restore re-admits the task at its last position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub comment: String,
    pub status_id: Option<String>,
    pub order_key: OrderKey,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(
        owner_id: &str,
        name: &str,
        comment: &str,
        status_id: Option<&str>,
        order_key: OrderKey,
    ) -> Self {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            comment: comment.to_string(),
            status_id: status_id.map(str::to_string),
            order_key,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Optional predicate applied to listings; composes with the cursor by AND
/// and never changes the sort order.
#[derive(Debug, Clone, Default)]
pub enum TaskFilter {
    #[default]
    All,
    ByStatus(String),
}

/// A pagination request: page size, opaque cursor from a prior page, filter.
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
    /// 1-100 inclusive; `None` means [`DEFAULT_PAGE_LIMIT`].
    pub limit: Option<u32>,
    /// Opaque string produced by a prior page's `next_cursor`, passed back
    /// unmodified.
    pub cursor: Option<String>,
    pub filter: TaskFilter,
}

impl PageQuery {
    pub fn effective_limit(&self) -> Result<u32, OrderError> {
        match self.limit {
            None => Ok(DEFAULT_PAGE_LIMIT),
            Some(limit) if (1..=MAX_PAGE_LIMIT).contains(&limit) => Ok(limit),
            Some(limit) => Err(OrderError::InvalidLimit(limit)),
        }
    }
}

/// One page of tasks in canonical order.
///
/// `has_more` and `next_cursor` are always consistent: both present past the
/// end of the page, both absent at end-of-sequence.
#[derive(Debug, Clone, Serialize)]
pub struct TaskPage {
    pub data: Vec<Task>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}
