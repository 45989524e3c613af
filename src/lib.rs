//! # Taskrank - Todo List Ordering Engine
//!
//! The ordering and pagination core of a todo-list application: stable,
//! densely-insertable order keys per task, cursor-based pagination that stays
//! correct while rows are concurrently inserted, reordered, or soft-deleted,
//! and minimal-diff reorder planning for drag-and-drop.
//!
//! ## Features
//!
//! - **Order Keys**: Dense, totally-ordered string keys with unbounded midpoint
//!   resolution, so inserting or moving a task never renumbers other rows
//! - **Cursor Pagination**: Opaque seek cursors over the canonical
//!   `(order_key, created_at, id)` order; no offsets, no skipped or repeated
//!   rows under concurrent appends
//! - **Reorder Planning**: A drag between two neighbors computes exactly one
//!   new key and writes exactly one row
//! - **Soft Delete**: Trash listing and restore, with the live ordering
//!   untouched by deleted rows
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taskrank::db::tasks::Tasks;
//! use taskrank::libs::task::PageQuery;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut tasks = Tasks::new()?;
//! let task = tasks.create("owner-1", "Review code", "Check PR #123", None)?;
//! let page = tasks.fetch_page("owner-1", &PageQuery::default())?;
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod libs;
