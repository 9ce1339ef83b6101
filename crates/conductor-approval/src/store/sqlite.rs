//! SQLite approval store.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{OptionalExtension, params};
use std::path::Path;
use tokio_rusqlite::Connection;
use tracing::debug;

use conductor_protocols::approval::{ApprovalRequest, ApprovalStatus, ApprovalStore, ApprovalUpdate};
use conductor_protocols::error::ApprovalError;

use super::schema::init_schema;

const SELECT_COLUMNS: &str =
    "SELECT id, action, payload, requester, status, created_at, resolved_at, comment, resolver FROM approval_requests";

/// Durable approval store. The database is the source of truth; a request
/// created before a restart is resolvable afterwards.
pub struct SqliteApprovalStore {
    conn: Connection,
}

/// A row as stored, converted to [`ApprovalRequest`] outside the connection thread.
struct RawRow {
    id: String,
    action: String,
    payload: String,
    requester: String,
    status: String,
    created_at: String,
    resolved_at: Option<String>,
    comment: Option<String>,
    resolver: Option<String>,
}

impl RawRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            action: row.get(1)?,
            payload: row.get(2)?,
            requester: row.get(3)?,
            status: row.get(4)?,
            created_at: row.get(5)?,
            resolved_at: row.get(6)?,
            comment: row.get(7)?,
            resolver: row.get(8)?,
        })
    }

    fn into_request(self) -> Result<ApprovalRequest, ApprovalError> {
        let payload = serde_json::from_str(&self.payload)
            .map_err(|e| ApprovalError::Storage(format!("corrupt payload for {}: {}", self.id, e)))?;
        let resolved_at = self.resolved_at.as_deref().map(parse_timestamp).transpose()?;
        Ok(ApprovalRequest {
            status: self.status.parse()?,
            created_at: parse_timestamp(&self.created_at)?,
            id: self.id,
            action: self.action,
            payload,
            requester: self.requester,
            resolved_at,
            comment: self.comment,
            resolver: self.resolver,
        })
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ApprovalError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ApprovalError::Storage(format!("invalid timestamp `{}`: {}", value, e)))
}

fn storage_error(e: tokio_rusqlite::Error) -> ApprovalError {
    ApprovalError::Storage(e.to_string())
}

impl SqliteApprovalStore {
    /// Create a new in-memory database.
    pub async fn in_memory() -> Result<Self, ApprovalError> {
        let conn = Connection::open_in_memory().await.map_err(storage_error)?;
        Self::init(conn).await
    }

    /// Open (or create) a file-backed database.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ApprovalError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ApprovalError::Storage(format!("cannot create {:?}: {}", parent, e)))?;
            }
        }
        debug!("Opening approval store at {:?}", path);
        let conn = Connection::open(path).await.map_err(storage_error)?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, ApprovalError> {
        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(storage_error)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl ApprovalStore for SqliteApprovalStore {
    async fn create(&self, request: &ApprovalRequest) -> Result<(), ApprovalError> {
        let id = request.id.clone();
        let action = request.action.clone();
        let payload = request.payload.to_string();
        let requester = request.requester.clone();
        let status = request.status.as_str();
        let created_at = format_timestamp(&request.created_at);
        let resolved_at = request.resolved_at.as_ref().map(format_timestamp);
        let comment = request.comment.clone();
        let resolver = request.resolver.clone();

        let inserted = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    "INSERT OR IGNORE INTO approval_requests
                     (id, action, payload, requester, status, created_at, resolved_at, comment, resolver)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![id, action, payload, requester, status, created_at, resolved_at, comment, resolver],
                )?;
                Ok(changed)
            })
            .await
            .map_err(storage_error)?;

        if inserted == 0 {
            return Err(ApprovalError::AlreadyExists(request.id.clone()));
        }
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<ApprovalRequest>, ApprovalError> {
        let id = id.to_string();
        let row = self
            .conn
            .call(move |conn| {
                let row = conn
                    .query_row(&format!("{} WHERE id = ?1", SELECT_COLUMNS), [&id], RawRow::from_row)
                    .optional()?;
                Ok(row)
            })
            .await
            .map_err(storage_error)?;

        row.map(RawRow::into_request).transpose()
    }

    async fn list(&self, status: Option<ApprovalStatus>) -> Result<Vec<ApprovalRequest>, ApprovalError> {
        let rows = self
            .conn
            .call(move |conn| {
                let rows = match status {
                    Some(status) => {
                        let mut stmt = conn.prepare(&format!(
                            "{} WHERE status = ?1 ORDER BY created_at ASC, rowid ASC",
                            SELECT_COLUMNS
                        ))?;
                        let rows = stmt
                            .query_map([status.as_str()], RawRow::from_row)?
                            .collect::<Result<Vec<_>, _>>()?;
                        rows
                    }
                    None => {
                        let mut stmt = conn.prepare(&format!(
                            "{} ORDER BY created_at ASC, rowid ASC",
                            SELECT_COLUMNS
                        ))?;
                        let rows = stmt
                            .query_map([], RawRow::from_row)?
                            .collect::<Result<Vec<_>, _>>()?;
                        rows
                    }
                };
                Ok(rows)
            })
            .await
            .map_err(storage_error)?;

        rows.into_iter().map(RawRow::into_request).collect()
    }

    async fn resolve_if_pending(
        &self,
        id: &str,
        update: ApprovalUpdate,
    ) -> Result<ApprovalRequest, ApprovalError> {
        let key = id.to_string();
        let status = update.status.as_str();
        let resolved_at = format_timestamp(&update.resolved_at);
        let comment = update.comment.clone();
        let resolver = update.resolver.clone();

        // Compare-and-swap on status: only one resolver can move the row out of pending.
        let (changed, row) = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    "UPDATE approval_requests
                     SET status = ?2, resolved_at = ?3, comment = ?4, resolver = ?5
                     WHERE id = ?1 AND status = 'pending'",
                    params![key, status, resolved_at, comment, resolver],
                )?;
                let row = conn
                    .query_row(&format!("{} WHERE id = ?1", SELECT_COLUMNS), [&key], RawRow::from_row)
                    .optional()?;
                Ok((changed, row))
            })
            .await
            .map_err(storage_error)?;

        let request = row
            .ok_or_else(|| ApprovalError::NotFound(id.to_string()))?
            .into_request()?;
        if changed == 0 {
            return Err(ApprovalError::AlreadyResolved {
                id: id.to_string(),
                status: request.status,
            });
        }
        Ok(request)
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod tests;
