//! Opaque pagination cursors.
//!
//! A cursor names an exact position in the canonical `(order_key, created_at,
//! id)` task order: "continue strictly after this row". It is deliberately
//! not a row offset, so concurrent inserts and deletes elsewhere in the
//! sequence cannot make pagination skip or repeat rows. Cursors are
//! ephemeral: they live for one pagination walk and are never persisted.
//!
//! The wire form is JSON wrapped in URL-safe base64 without padding, so
//! clients can pass it back in a query string unmodified.

use crate::libs::error::OrderError;
use crate::libs::order_key::OrderKey;
use crate::libs::task::Task;
use base64::prelude::*;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// The composite sort position of the last item a client has seen.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Cursor {
    pub order_key: OrderKey,
    pub created_at: DateTime<Utc>,
    pub id: String,
}

impl Cursor {
    /// The cursor positioned exactly at `task`: a follow-up page continues
    /// strictly after it.
    pub fn after(task: &Task) -> Cursor {
        Cursor {
            order_key: task.order_key.clone(),
            created_at: task.created_at,
            id: task.id.clone(),
        }
    }

    /// Encodes the cursor to its opaque wire string.
    ///
    /// Pure and deterministic; [`Cursor::decode`] inverts it exactly.
    pub fn encode(&self) -> String {
        let json = serde_json::json!({
            "order_key": self.order_key.as_str(),
            "created_at": self.created_at,
            "id": self.id,
        });
        BASE64_URL_SAFE_NO_PAD.encode(json.to_string())
    }

    /// Decodes a wire string back into a cursor.
    ///
    /// Any string not produced by [`Cursor::encode`] fails with
    /// [`OrderError::MalformedCursor`]: bad base64, bad JSON, a missing
    /// field, an unparseable timestamp, a non-canonical order key, or an
    /// empty id. Client input, so an error here is reported and never
    /// retried server-side.
    pub fn decode(raw: &str) -> Result<Cursor, OrderError> {
        let bytes = BASE64_URL_SAFE_NO_PAD
            .decode(raw)
            .map_err(|_| OrderError::MalformedCursor)?;
        let cursor: Cursor =
            serde_json::from_slice(&bytes).map_err(|_| OrderError::MalformedCursor)?;
        if cursor.id.is_empty() {
            return Err(OrderError::MalformedCursor);
        }
        Ok(cursor)
    }
}
