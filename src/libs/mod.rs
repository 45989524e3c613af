//! Core library modules for the taskrank ordering engine.
//!
//! Domain types and pure logic live here, decoupled from persistence: order
//! key arithmetic, cursor encoding, reorder planning, and the task shapes the
//! store reads and writes.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taskrank::db::tasks::Tasks;
//! use taskrank::libs::reorder::ReorderRequest;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut tasks = Tasks::new()?;
//! let moved = tasks.reorder(
//!     "owner-1",
//!     &ReorderRequest {
//!         task_id: "…".into(),
//!         previous_task_id: None,
//!         next_task_id: None,
//!     },
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod cursor;
pub mod data_storage;
pub mod error;
pub mod order_key;
pub mod reorder;
pub mod task;
