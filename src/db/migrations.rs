//! Versioned schema migrations.
//!
//! Each migration runs inside its own transaction and is recorded in the
//! `migrations` bookkeeping table, so initialization is idempotent and a
//! database created by an older release is upgraded in place.

use anyhow::Result;
use rusqlite::{params, Connection, Transaction};

const MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";
const INSERT_MIGRATION: &str = "INSERT INTO migrations (version, name) VALUES (?1, ?2)";
const SELECT_VERSION: &str = "SELECT COALESCE(MAX(version), 0) FROM migrations";

/// A single schema change: version, descriptive name, and the transformation
/// applied within a transaction.
#[derive(Clone)]
struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Transaction) -> Result<()>,
}

/// Registry of all migrations in version order.
pub struct MigrationManager {
    migrations: Vec<Migration>,
}

impl MigrationManager {
    pub fn new() -> Self {
        let mut manager = Self { migrations: Vec::new() };
        manager.register_migrations();
        manager
    }

    fn register_migrations(&mut self) {
        self.migrations.push(Migration {
            version: 1,
            name: "create_tasks_table",
            up: migrate_v1_create_tasks,
        });
    }

    /// Applies every migration newer than the database's recorded version.
    pub fn migrate(&self, conn: &mut Connection) -> Result<()> {
        conn.execute(MIGRATIONS_TABLE, [])?;
        let current = get_db_version(conn)?;

        for migration in &self.migrations {
            if migration.version > current {
                tracing::debug!(version = migration.version, name = migration.name, "applying migration");
                let tx = conn.transaction()?;
                (migration.up)(&tx)?;
                tx.execute(INSERT_MIGRATION, params![migration.version, migration.name])?;
                tx.commit()?;
            }
        }
        Ok(())
    }
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Current schema version; 0 when no migration has been applied yet.
/// Expects the `migrations` table to exist.
pub fn get_db_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn.query_row(SELECT_VERSION, [], |row| row.get(0))?;
    Ok(version)
}

/// Opens-or-upgrades: ensures the schema matches this build.
pub fn init_with_migrations(conn: &mut Connection) -> Result<()> {
    MigrationManager::new().migrate(conn)
}

/// v1: the tasks table and the indexes the ordering queries lean on.
///
/// `order_key` is a sortable TEXT column, never an integer position; the
/// composite index mirrors the canonical `(order_key, created_at, id)` sort
/// so seek pagination is a single range scan.
fn migrate_v1_create_tasks(tx: &Transaction) -> Result<()> {
    tx.execute(
        "CREATE TABLE IF NOT EXISTS tasks (
            id TEXT NOT NULL PRIMARY KEY,
            owner_id TEXT NOT NULL,
            name TEXT NOT NULL,
            comment TEXT NOT NULL DEFAULT '',
            status_id TEXT,
            order_key TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL,
            deleted_at TIMESTAMP
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_tasks_owner_order
         ON tasks (owner_id, deleted_at, order_key, created_at, id)",
        [],
    )?;
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_tasks_owner_deleted
         ON tasks (owner_id, deleted_at)",
        [],
    )?;
    Ok(())
}
