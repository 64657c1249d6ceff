//! SQLite-backed primary audit store.

use crate::event::{AuditRecord, EventKind};
use crate::store::{AuditStore, StoreError};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Name of the audit table.
pub const AUDIT_TABLE: &str = "audit_logging_auditevent";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS audit_logging_auditevent (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    event TEXT NOT NULL,
    resource_type TEXT NOT NULL,
    resource_uuid TEXT,
    username TEXT,
    superuser BOOLEAN,
    staff BOOLEAN,
    datetime TEXT NOT NULL
)";

const CREATE_INDEX: &str = "CREATE INDEX IF NOT EXISTS audit_logging_auditevent_datetime
    ON audit_logging_auditevent (datetime)";

/// A row read back from the audit table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredEvent {
    /// Row id.
    pub id: i64,
    /// Event kind.
    pub event: EventKind,
    /// Resource type label.
    pub resource_type: String,
    /// Resource identifier as text.
    pub resource_uuid: Option<String>,
    /// Acting username.
    pub username: Option<String>,
    /// Superuser flag.
    pub superuser: Option<bool>,
    /// Staff flag.
    pub staff: Option<bool>,
    /// Creation time.
    pub datetime: DateTime<Utc>,
}

impl StoredEvent {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            event: EventKind::from(row.get::<_, String>(1)?),
            resource_type: row.get(2)?,
            resource_uuid: row.get(3)?,
            username: row.get(4)?,
            superuser: row.get(5)?,
            staff: row.get(6)?,
            datetime: row.get(7)?,
        })
    }
}

/// Primary audit store: one row per record in [`AUDIT_TABLE`].
///
/// Records are only ever inserted; rows are never updated or deleted here.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) a database file. The schema is not touched; call
    /// [`SqliteStore::init_schema`] to create the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Opened audit database");
        Ok(Self::from_connection(conn))
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    /// Wraps an existing connection.
    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Creates the audit table and its index if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the statements fail.
    pub fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(CREATE_TABLE, [])?;
        conn.execute(CREATE_INDEX, [])?;
        Ok(())
    }

    /// Returns up to `limit` records, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn latest(&self, limit: usize) -> Result<Vec<StoredEvent>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, event, resource_type, resource_uuid, username, superuser, staff, datetime
             FROM audit_logging_auditevent
             ORDER BY datetime DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], StoredEvent::from_row)?;
        let events = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM audit_logging_auditevent", [], |row| {
                row.get(0)
            })?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

impl AuditStore for SqliteStore {
    fn append(&self, record: &AuditRecord) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO audit_logging_auditevent
             (event, resource_type, resource_uuid, username, superuser, staff, datetime)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.event.as_str(),
                &record.resource_type,
                record.resource_id.as_ref().map(ToString::to_string),
                &record.username,
                record.superuser,
                record.staff,
                record.datetime,
            ],
        )?;
        Ok(())
    }

    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::FILE_RESOURCE_TYPE;
    use custos_core::{ActorIdentity, ResourceId};

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.init_schema().unwrap();
        store
    }

    #[test]
    fn test_append_and_read_back() {
        let store = store();
        let actor = ActorIdentity::new("alice").superuser();
        let record = AuditRecord::new(
            EventKind::Create,
            "Layer",
            Some(ResourceId::Integer(5)),
            Some(&actor),
        );
        store.append(&record).unwrap();

        let rows = store.latest(10).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.event, EventKind::Create);
        assert_eq!(row.resource_type, "Layer");
        assert_eq!(row.resource_uuid.as_deref(), Some("5"));
        assert_eq!(row.username.as_deref(), Some("alice"));
        assert_eq!(row.superuser, Some(true));
        assert_eq!(row.staff, Some(false));
        assert_eq!(row.datetime, record.datetime);
    }

    #[test]
    fn test_null_identity_columns() {
        let store = store();
        store
            .append(&AuditRecord::new(
                EventKind::FileCreate,
                FILE_RESOURCE_TYPE,
                Some(ResourceId::from("/tmp/x")),
                None,
            ))
            .unwrap();

        let row = &store.latest(1).unwrap()[0];
        assert_eq!(row.username, None);
        assert_eq!(row.superuser, None);
        assert_eq!(row.staff, None);
    }

    #[test]
    fn test_latest_newest_first() {
        let store = store();
        for kind in [EventKind::Create, EventKind::Update, EventKind::Delete] {
            store
                .append(&AuditRecord::new(kind, "Layer", None, None))
                .unwrap();
        }

        let rows = store.latest(2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].event, EventKind::Delete);
        assert_eq!(rows[1].event, EventKind::Update);
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_missing_schema_is_an_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        let result = store.append(&AuditRecord::new(EventKind::Create, "Layer", None, None));
        assert!(matches!(result, Err(StoreError::Database(_))));
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.sqlite3");

        let store = SqliteStore::open(&path).unwrap();
        store.init_schema().unwrap();
        store
            .append(&AuditRecord::new(EventKind::Login, "user", None, None))
            .unwrap();
        drop(store);

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
    }
}
