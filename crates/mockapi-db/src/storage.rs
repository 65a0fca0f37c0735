//! Scoped access to the single-file SQLite store.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use r2d2::ManageConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};

use crate::error::StoreError;

/// Runtime tunables for SQLite connection behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// Busy timeout for SQLite connections, in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
        }
    }
}

struct Inner {
    path: PathBuf,
    manager: SqliteConnectionManager,
}

/// Handle to the backing database file.
///
/// Holds no open connection. Each [`acquire`](Self::acquire) opens a new one,
/// creating the file if it does not exist yet. Clones share the same path and
/// connection settings.
///
/// A path of `:memory:` is accepted, but every acquisition then sees its own
/// empty database.
#[derive(Clone)]
pub struct StorageHandle {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for StorageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageHandle")
            .field("path", &self.inner.path)
            .finish()
    }
}

impl StorageHandle {
    /// Creates a handle for the database at `path`.
    pub fn new(path: impl AsRef<Path>, settings: DbRuntimeSettings) -> Self {
        let path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let manager = SqliteConnectionManager::file(&path)
            .with_flags(flags)
            .with_init(move |conn| {
                conn.execute_batch(&format!(
                    "PRAGMA foreign_keys = ON;
                     PRAGMA busy_timeout = {};",
                    settings.busy_timeout_ms
                ))
            });

        Self {
            inner: Arc::new(Inner { path, manager }),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Opens a connection to the backing file.
    ///
    /// The connection is closed when the returned handle is dropped.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConnectionFailure` if the file cannot be opened
    /// or the connection pragmas cannot be applied.
    pub fn acquire(&self) -> Result<ConnectionHandle, StoreError> {
        let conn = self.inner.manager.connect().map_err(|e| {
            tracing::error!(path = %self.inner.path.display(), error = %e, "failed to open database");
            StoreError::ConnectionFailure(e)
        })?;
        tracing::debug!(path = %self.inner.path.display(), "acquired connection");

        Ok(ConnectionHandle {
            conn,
            storage: Arc::clone(&self.inner),
        })
    }

    /// Runs `f` with a freshly acquired connection and releases it before
    /// returning, whether `f` succeeds or not.
    pub fn with_connection<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self.acquire()?;
        f(&conn)
    }

    /// Deletes the backing file.
    ///
    /// Only meant for ephemeral and test environments. Any handle still open
    /// at this point is left pointing at an unlinked file. A missing file is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Teardown` if the file exists but cannot be removed.
    pub fn teardown(&self) -> Result<(), StoreError> {
        if self.inner.path.as_os_str() == ":memory:" {
            return Ok(());
        }

        match std::fs::remove_file(&self.inner.path) {
            Ok(()) => {
                tracing::info!(path = %self.inner.path.display(), "removed database file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Teardown(e)),
        }
    }
}

/// An open connection scoped to the lifetime of this value.
pub struct ConnectionHandle {
    conn: Connection,
    storage: Arc<Inner>,
}

impl Deref for ConnectionHandle {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl DerefMut for ConnectionHandle {
    fn deref_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        tracing::debug!(path = %self.storage.path.display(), "released connection");
    }
}
