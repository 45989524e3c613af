//! Persistence layer for the taskrank ordering engine.
//!
//! A thin SQLite-backed layer in three parts: connection bootstrap, versioned
//! schema migrations, and the ordered task store itself. All ordering state
//! lives here; the modules in `libs` stay persistence-free.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taskrank::db::tasks::Tasks;
//! use taskrank::libs::task::TaskFilter;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut tasks = Tasks::new()?;
//! let active = tasks.fetch_active("owner-1", &TaskFilter::All)?;
//! # Ok(())
//! # }
//! ```

/// Core database connection and initialization module.
pub mod db;

/// Versioned schema migration system.
pub mod migrations;

/// The ordered task store: canonical-order reads, seek pagination, reorder
/// and soft-delete writes.
pub mod tasks;
