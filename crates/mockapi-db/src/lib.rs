//! Storage layer for the mock API.
//!
//! Owns everything that touches the SQLite file directly: opening and
//! releasing connections, creating the `users` and `products` tables, and
//! translating SQLite failures into [`StoreError`] kinds the rest of the
//! workspace can act on.
//!
//! # Connection lifecycle
//!
//! There is no pool. [`StorageHandle::acquire`] opens a fresh connection to
//! the backing file and hands it out as a [`ConnectionHandle`], which closes
//! the connection when dropped. Callers that only need the connection for one
//! operation use [`StorageHandle::with_connection`].
//!
//! Connections are configured through `r2d2_sqlite`'s connection manager, so
//! open flags and per-connection pragmas live in one place even though the
//! manager is never placed behind an `r2d2::Pool`.

mod error;
mod schema;
mod storage;

pub use error::StoreError;
pub use schema::{ensure_schema, ensure_schema_on, TABLE_NAMES};
pub use storage::{ConnectionHandle, DbRuntimeSettings, StorageHandle};
