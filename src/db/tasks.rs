//! The ordered task store.
//!
//! Reads and writes tasks respecting the canonical per-owner order
//! `(order_key, created_at, id)` ascending. The triple, not `order_key`
//! alone, is the sort key: two tasks that transiently share a key still sort
//! deterministically, so pagination can neither skip nor duplicate rows.
//!
//! Every operation is a single round trip against the connection and the
//! store holds no state of its own; concurrent access is arbitrated entirely
//! by SQLite. Concurrent reorders by the same owner are last-write-wins at
//! the row level.

use crate::db::db::Db;
use crate::db::migrations;
use crate::libs::cursor::Cursor;
use crate::libs::error::OrderError;
use crate::libs::order_key::OrderKey;
use crate::libs::reorder::{ReorderPlanner, ReorderRequest};
use crate::libs::task::{PageQuery, Task, TaskFilter, TaskPage};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SELECT_TASKS: &str = "SELECT id, owner_id, name, comment, status_id, order_key, created_at, updated_at, deleted_at FROM tasks";
const WHERE_ACTIVE: &str = "WHERE owner_id = ?1 AND deleted_at IS NULL";
const SEEK_AFTER: &str = "AND (order_key > ?2 \
    OR (order_key = ?2 AND created_at > ?3) \
    OR (order_key = ?2 AND created_at = ?3 AND id > ?4))";
const ORDER_CANONICAL: &str = "ORDER BY order_key ASC, created_at ASC, id ASC";

const INSERT_TASK: &str = "INSERT INTO tasks (id, owner_id, name, comment, status_id, order_key, created_at, updated_at, deleted_at) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";
const UPDATE_TASK: &str =
    "UPDATE tasks SET name = ?3, comment = ?4, status_id = ?5, updated_at = ?6 WHERE id = ?1 AND owner_id = ?2";
const UPDATE_ORDER_KEY: &str =
    "UPDATE tasks SET order_key = ?3, updated_at = ?4 WHERE id = ?1 AND owner_id = ?2 AND deleted_at IS NULL";
const SOFT_DELETE_TASK: &str =
    "UPDATE tasks SET deleted_at = ?3, updated_at = ?3 WHERE id = ?1 AND owner_id = ?2 AND deleted_at IS NULL";
const RESTORE_TASK: &str =
    "UPDATE tasks SET deleted_at = NULL, updated_at = ?3 WHERE id = ?1 AND owner_id = ?2 AND deleted_at IS NOT NULL";
const PURGE_TASK: &str = "DELETE FROM tasks WHERE id = ?1 AND owner_id = ?2 AND deleted_at IS NOT NULL";
const PURGE_ALL_TASKS: &str = "DELETE FROM tasks WHERE owner_id = ?1 AND deleted_at IS NOT NULL";

const SELECT_TASK_BY_ID: &str = "SELECT id, owner_id, name, comment, status_id, order_key, created_at, updated_at, deleted_at \
    FROM tasks WHERE id = ?1 AND owner_id = ?2";
const SELECT_NEIGHBOR: &str = "SELECT owner_id, order_key, deleted_at FROM tasks WHERE id = ?1";
const SELECT_LAST_KEY: &str =
    "SELECT order_key FROM tasks WHERE owner_id = ?1 AND deleted_at IS NULL ORDER BY order_key DESC LIMIT 1";
const SELECT_ACTIVE_IDS: &str = "SELECT id FROM tasks WHERE owner_id = ?1 AND deleted_at IS NULL \
    ORDER BY order_key ASC, created_at ASC, id ASC";
const SELECT_TRASH: &str = "SELECT id, owner_id, name, comment, status_id, order_key, created_at, updated_at, deleted_at \
    FROM tasks WHERE owner_id = ?1 AND deleted_at IS NOT NULL ORDER BY deleted_at DESC, id ASC";

pub struct Tasks {
    pub conn: Connection,
}

impl Tasks {
    pub fn new() -> anyhow::Result<Tasks> {
        let db = Db::new()?;
        Ok(Tasks { conn: db.conn })
    }

    /// Builds a store over an explicit connection, running migrations on it.
    /// An in-memory connection makes the store unit-testable without touching
    /// the filesystem.
    pub fn with_connection(mut conn: Connection) -> anyhow::Result<Tasks> {
        migrations::init_with_migrations(&mut conn)?;
        Ok(Tasks { conn })
    }

    /// Creates a task appended after the owner's current last task.
    pub fn create(
        &mut self,
        owner_id: &str,
        name: &str,
        comment: &str,
        status_id: Option<&str>,
    ) -> Result<Task, OrderError> {
        let key = self.append_key(owner_id)?;
        let task = Task::new(owner_id, name, comment, status_id, key);
        self.insert(&task)?;
        Ok(task)
    }

    /// Creates a task at an explicit position between two named neighbors.
    pub fn create_between(
        &mut self,
        owner_id: &str,
        name: &str,
        comment: &str,
        status_id: Option<&str>,
        previous_task_id: Option<&str>,
        next_task_id: Option<&str>,
    ) -> Result<Task, OrderError> {
        let key = self.planned_key(owner_id, previous_task_id, next_task_id)?;
        let task = Task::new(owner_id, name, comment, status_id, key);
        self.insert(&task)?;
        Ok(task)
    }

    pub fn insert(&mut self, task: &Task) -> Result<(), OrderError> {
        self.conn.execute(
            INSERT_TASK,
            params![
                task.id,
                task.owner_id,
                task.name,
                task.comment,
                task.status_id,
                task.order_key.as_str(),
                task.created_at,
                task.updated_at,
                task.deleted_at,
            ],
        )?;
        Ok(())
    }

    /// Edits title, comment, and status. Deliberately never touches
    /// `order_key`: unrelated edits must not move a task.
    pub fn update(&mut self, task: &Task) -> Result<(), OrderError> {
        let affected = self.conn.execute(
            UPDATE_TASK,
            params![task.id, task.owner_id, task.name, task.comment, task.status_id, Utc::now()],
        )?;
        if affected == 0 {
            return Err(OrderError::TaskNotFound(task.id.clone()));
        }
        Ok(())
    }

    pub fn get_by_id(&mut self, owner_id: &str, task_id: &str) -> Result<Option<Task>, OrderError> {
        Ok(self
            .conn
            .query_row(SELECT_TASK_BY_ID, params![task_id, owner_id], Self::map_row)
            .optional()?)
    }

    /// The owner's full active working set in canonical order. No
    /// pagination; an owner's active task count is small enough to hold in
    /// memory for a drag-and-drop list.
    pub fn fetch_active(
        &mut self,
        owner_id: &str,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, OrderError> {
        match filter {
            TaskFilter::All => {
                let sql = format!("{SELECT_TASKS} {WHERE_ACTIVE} {ORDER_CANONICAL}");
                self.query_tasks(&sql, params![owner_id])
            }
            TaskFilter::ByStatus(status_id) => {
                let sql = format!("{SELECT_TASKS} {WHERE_ACTIVE} AND status_id = ?2 {ORDER_CANONICAL}");
                self.query_tasks(&sql, params![owner_id, status_id])
            }
        }
    }

    /// One page of active tasks strictly after the cursor position, in
    /// canonical order.
    ///
    /// Fetches `limit + 1` rows to learn whether more exist without a second
    /// round trip, then trims the page. The seek predicate is the composite
    /// strictly-greater comparison on the full `(order_key, created_at, id)`
    /// triple, so rows that tie on `order_key` are neither skipped nor
    /// repeated.
    ///
    /// Each call observes one consistent snapshot, but a multi-page walk does
    /// not: a concurrent reorder can move a row across the already-yielded
    /// boundary, making a long walk observe it twice or not at all. That is
    /// the standard seek-pagination trade-off; appends past the cursor are
    /// always picked up exactly once.
    pub fn fetch_page(&mut self, owner_id: &str, query: &PageQuery) -> Result<TaskPage, OrderError> {
        let limit = query.effective_limit()? as usize;
        let cursor = query.cursor.as_deref().map(Cursor::decode).transpose()?;
        let fetch = limit + 1;

        let mut rows = match (&cursor, &query.filter) {
            (None, TaskFilter::All) => {
                let sql = format!("{SELECT_TASKS} {WHERE_ACTIVE} {ORDER_CANONICAL} LIMIT {fetch}");
                self.query_tasks(&sql, params![owner_id])?
            }
            (Some(c), TaskFilter::All) => {
                let sql = format!("{SELECT_TASKS} {WHERE_ACTIVE} {SEEK_AFTER} {ORDER_CANONICAL} LIMIT {fetch}");
                self.query_tasks(&sql, params![owner_id, c.order_key.as_str(), c.created_at, c.id])?
            }
            (None, TaskFilter::ByStatus(status_id)) => {
                let sql =
                    format!("{SELECT_TASKS} {WHERE_ACTIVE} AND status_id = ?2 {ORDER_CANONICAL} LIMIT {fetch}");
                self.query_tasks(&sql, params![owner_id, status_id])?
            }
            (Some(c), TaskFilter::ByStatus(status_id)) => {
                let sql = format!(
                    "{SELECT_TASKS} {WHERE_ACTIVE} {SEEK_AFTER} AND status_id = ?5 {ORDER_CANONICAL} LIMIT {fetch}"
                );
                self.query_tasks(
                    &sql,
                    params![owner_id, c.order_key.as_str(), c.created_at, c.id, status_id],
                )?
            }
        };

        let has_more = rows.len() > limit;
        rows.truncate(limit);
        let next_cursor = if has_more {
            rows.last().map(|last| Cursor::after(last).encode())
        } else {
            None
        };
        tracing::debug!(owner = owner_id, returned = rows.len(), has_more, "fetched task page");
        Ok(TaskPage { data: rows, next_cursor, has_more })
    }

    /// The key a task created now should get: strictly after the owner's
    /// current last active task, or the canonical middle when there is none.
    pub fn append_key(&mut self, owner_id: &str) -> Result<OrderKey, OrderError> {
        let last: Option<String> = self
            .conn
            .query_row(SELECT_LAST_KEY, params![owner_id], |row| row.get(0))
            .optional()?;
        match last {
            Some(raw) => Ok(OrderKey::parse(&raw)?.next()),
            None => Ok(OrderKey::middle()),
        }
    }

    /// Persists a task's new order key: a single-row write with the same
    /// identity check as any other task mutation.
    pub fn write_order(
        &mut self,
        owner_id: &str,
        task_id: &str,
        key: &OrderKey,
    ) -> Result<(), OrderError> {
        let affected = self
            .conn
            .execute(UPDATE_ORDER_KEY, params![task_id, owner_id, key.as_str(), Utc::now()])?;
        if affected == 0 {
            return Err(OrderError::TaskNotFound(task_id.to_string()));
        }
        Ok(())
    }

    /// Moves a task between the two neighbors named in `request`.
    ///
    /// Loads the neighbors, plans one fresh key, writes one row. Returns the
    /// key the moved task now carries. Neighbor rows are read but never
    /// written.
    pub fn reorder(&mut self, owner_id: &str, request: &ReorderRequest) -> Result<OrderKey, OrderError> {
        let moved = self
            .get_by_id(owner_id, &request.task_id)?
            .filter(|task| task.deleted_at.is_none())
            .ok_or_else(|| OrderError::TaskNotFound(request.task_id.clone()))?;

        let key = self.planned_key(
            owner_id,
            request.previous_task_id.as_deref(),
            request.next_task_id.as_deref(),
        )?;
        self.write_order(owner_id, &moved.id, &key)?;
        Ok(key)
    }

    /// Plans a key between two neighbor ids, renumbering the owner's active
    /// set once if the planner reports exhaustion.
    fn planned_key(
        &mut self,
        owner_id: &str,
        previous_task_id: Option<&str>,
        next_task_id: Option<&str>,
    ) -> Result<OrderKey, OrderError> {
        let previous = self.neighbor_key(owner_id, previous_task_id)?;
        let next = self.neighbor_key(owner_id, next_task_id)?;
        match ReorderPlanner::plan(previous.as_ref(), next.as_ref()) {
            Err(OrderError::OrderKeyExhausted) => {
                tracing::warn!(owner = owner_id, "no key fits between neighbors, renumbering active set");
                self.renumber(owner_id)?;
                let previous = self.neighbor_key(owner_id, previous_task_id)?;
                let next = self.neighbor_key(owner_id, next_task_id)?;
                ReorderPlanner::plan(previous.as_ref(), next.as_ref())
            }
            planned => planned,
        }
    }

    /// Resolves a neighbor id to its order key. A missing or soft-deleted
    /// neighbor is `NeighborNotFound`; a neighbor owned by someone else is
    /// `NeighborNotOwned`.
    fn neighbor_key(
        &mut self,
        owner_id: &str,
        neighbor_id: Option<&str>,
    ) -> Result<Option<OrderKey>, OrderError> {
        let Some(neighbor_id) = neighbor_id else {
            return Ok(None);
        };
        let row: Option<(String, String, Option<chrono::DateTime<Utc>>)> = self
            .conn
            .query_row(SELECT_NEIGHBOR, params![neighbor_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })
            .optional()?;
        match row {
            None => Err(OrderError::NeighborNotFound(neighbor_id.to_string())),
            Some((owner, _, _)) if owner != owner_id => {
                Err(OrderError::NeighborNotOwned(neighbor_id.to_string()))
            }
            Some((_, _, Some(_))) => Err(OrderError::NeighborNotFound(neighbor_id.to_string())),
            Some((_, raw_key, None)) => Ok(Some(OrderKey::parse(&raw_key)?)),
        }
    }

    /// Assigns fresh, evenly spaced keys to the owner's whole active set, in
    /// its current canonical order, within one transaction.
    ///
    /// This is the explicit, rare O(n) maintenance pass behind
    /// `OrderKeyExhausted`; it is never attempted implicitly inside a normal
    /// reorder path that still has room.
    pub fn renumber(&mut self, owner_id: &str) -> Result<usize, OrderError> {
        let now = Utc::now();
        let tx = self.conn.transaction()?;
        let ids: Vec<String> = {
            let mut stmt = tx.prepare(SELECT_ACTIVE_IDS)?;
            let iter = stmt.query_map(params![owner_id], |row| row.get(0))?;
            let mut ids = Vec::new();
            for id in iter {
                ids.push(id?);
            }
            ids
        };
        let keys = OrderKey::spread(ids.len());
        for (id, key) in ids.iter().zip(keys.iter()) {
            tx.execute(UPDATE_ORDER_KEY, params![id, owner_id, key.as_str(), now])?;
        }
        tx.commit()?;
        tracing::info!(owner = owner_id, count = ids.len(), "renumbered active task set");
        Ok(ids.len())
    }

    /// Marks a task deleted, removing it from the live ordering. The order
    /// key is neither cleared nor reused.
    pub fn soft_delete(&mut self, owner_id: &str, task_id: &str) -> Result<(), OrderError> {
        let affected = self
            .conn
            .execute(SOFT_DELETE_TASK, params![task_id, owner_id, Utc::now()])?;
        if affected == 0 {
            return Err(OrderError::TaskNotFound(task_id.to_string()));
        }
        Ok(())
    }

    /// Re-admits a trashed task to the live ordering at its last key,
    /// verbatim. The key may be stale relative to tasks touched while it was
    /// deleted; the `(order_key, created_at, id)` tie-break keeps the order
    /// deterministic regardless.
    pub fn restore(&mut self, owner_id: &str, task_id: &str) -> Result<(), OrderError> {
        let affected = self
            .conn
            .execute(RESTORE_TASK, params![task_id, owner_id, Utc::now()])?;
        if affected == 0 {
            return Err(OrderError::TaskNotFound(task_id.to_string()));
        }
        Ok(())
    }

    /// Trashed tasks, most recently deleted first. Trash ordering is by
    /// deletion time, not order key.
    pub fn fetch_trash(&mut self, owner_id: &str) -> Result<Vec<Task>, OrderError> {
        self.query_tasks(SELECT_TRASH, params![owner_id])
    }

    /// Permanently removes a trashed task. Active tasks must be soft-deleted
    /// first.
    pub fn purge(&mut self, owner_id: &str, task_id: &str) -> Result<(), OrderError> {
        let affected = self.conn.execute(PURGE_TASK, params![task_id, owner_id])?;
        if affected == 0 {
            return Err(OrderError::TaskNotFound(task_id.to_string()));
        }
        Ok(())
    }

    /// Empties the owner's trash, returning how many rows were removed.
    pub fn purge_all(&mut self, owner_id: &str) -> Result<usize, OrderError> {
        Ok(self.conn.execute(PURGE_ALL_TASKS, params![owner_id])?)
    }

    fn query_tasks<P: rusqlite::Params>(
        &mut self,
        sql: &str,
        params: P,
    ) -> Result<Vec<Task>, OrderError> {
        let mut stmt = self.conn.prepare(sql)?;
        let task_iter = stmt.query_map(params, Self::map_row)?;
        let mut tasks = Vec::new();
        for task in task_iter {
            tasks.push(task?);
        }
        Ok(tasks)
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Task> {
        let raw_key: String = row.get(5)?;
        let order_key = OrderKey::parse(&raw_key).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(Task {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            comment: row.get(3)?,
            status_id: row.get(4)?,
            order_key,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
            deleted_at: row.get(8)?,
        })
    }
}
