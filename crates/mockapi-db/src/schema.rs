//! Table creation for the `users` and `products` tables.
//!
//! Table definitions are SQL files embedded at compile time. Each one uses
//! `CREATE TABLE IF NOT EXISTS`, so running them against a store that already
//! has the tables is a no-op. Existing tables are never dropped or altered.

use rusqlite::Connection;

use crate::error::StoreError;
use crate::storage::StorageHandle;

/// A single embedded table definition.
struct TableDef {
    name: &'static str,
    sql: &'static str,
}

const TABLES: &[TableDef] = &[
    TableDef {
        name: "users",
        sql: include_str!("schema/users.sql"),
    },
    TableDef {
        name: "products",
        sql: include_str!("schema/products.sql"),
    },
];

/// Names of the tables managed by [`ensure_schema`], in creation order.
pub const TABLE_NAMES: [&str; 2] = ["users", "products"];

/// Creates any missing tables using a connection from `storage`.
///
/// Returns the number of tables that did not exist before the call.
///
/// # Errors
///
/// Returns `StoreError` if the connection cannot be opened or a definition
/// fails to execute.
pub fn ensure_schema(storage: &StorageHandle) -> Result<usize, StoreError> {
    storage.with_connection(ensure_schema_on)
}

/// Creates any missing tables on an already-open connection.
///
/// All definitions run in one transaction.
pub fn ensure_schema_on(conn: &Connection) -> Result<usize, StoreError> {
    let tx = conn.unchecked_transaction()?;
    let mut created = 0;

    for table in TABLES {
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            [table.name],
            |row| row.get(0),
        )?;

        if exists {
            tracing::debug!(table = table.name, "table already exists, skipping");
            continue;
        }

        tx.execute_batch(table.sql)?;
        tracing::info!(table = table.name, "created table");
        created += 1;
    }

    tx.commit()?;
    Ok(created)
}
