//! SQLite-backed user repository.

use mockapi_db::{StorageHandle, StoreError};
use mockapi_types::{NewUser, User, UserUpdate};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::UserRepository;

/// Lists all users.
pub fn list_users(conn: &Connection) -> Result<Vec<User>, StoreError> {
    let mut stmt = conn.prepare("SELECT id, name, email, age, created_at FROM users")?;
    let users = stmt
        .query_map([], map_row_to_user)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

/// Retrieves a user by id.
pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>, StoreError> {
    let user = conn
        .query_row(
            "SELECT id, name, email, age, created_at FROM users WHERE id = ?1",
            [id],
            map_row_to_user,
        )
        .optional()?;
    Ok(user)
}

/// Inserts a user and returns the stored row.
pub fn insert_user(conn: &Connection, input: &NewUser) -> Result<User, StoreError> {
    let user = conn.query_row(
        "INSERT INTO users (name, email, age) VALUES (?1, ?2, ?3)
         RETURNING id, name, email, age, created_at",
        params![input.name, input.email, input.age],
        map_row_to_user,
    )?;
    Ok(user)
}

/// Updates a user using a single UPDATE statement.
///
/// Only fields that are `Some` in `updates` are modified. Returns `None` if
/// no user has `id`.
pub fn update_user(
    conn: &Connection,
    id: i64,
    updates: &UserUpdate,
) -> Result<Option<User>, StoreError> {
    if updates.is_empty() {
        return get_user(conn, id);
    }

    let mut set_parts: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut idx = 1usize;

    if let Some(name) = &updates.name {
        set_parts.push(format!("name = ?{}", idx));
        values.push(Box::new(name.clone()));
        idx += 1;
    }
    if let Some(email) = &updates.email {
        set_parts.push(format!("email = ?{}", idx));
        values.push(Box::new(email.clone()));
        idx += 1;
    }
    if let Some(age) = updates.age {
        set_parts.push(format!("age = ?{}", idx));
        values.push(Box::new(age));
        idx += 1;
    }

    let sql = format!(
        "UPDATE users SET {} WHERE id = ?{}
         RETURNING id, name, email, age, created_at",
        set_parts.join(", "),
        idx
    );
    values.push(Box::new(id));

    let params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let user = conn
        .query_row(&sql, params.as_slice(), map_row_to_user)
        .optional()?;
    Ok(user)
}

fn map_row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        age: row.get(3)?,
        created_at: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
    })
}

/// [`UserRepository`] over the SQLite store.
#[derive(Debug, Clone)]
pub struct SqliteUsers {
    storage: StorageHandle,
}

impl SqliteUsers {
    pub fn new(storage: StorageHandle) -> Self {
        Self { storage }
    }
}

impl UserRepository for SqliteUsers {
    fn list_all(&self) -> Result<Vec<User>, StoreError> {
        self.storage.with_connection(list_users)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        self.storage.with_connection(|conn| get_user(conn, id))
    }

    fn create(&self, input: &NewUser) -> Result<User, StoreError> {
        let user = self
            .storage
            .with_connection(|conn| insert_user(conn, input))?;
        tracing::info!(id = user.id, "created user");
        Ok(user)
    }

    fn update(&self, id: i64, changes: &UserUpdate) -> Result<Option<User>, StoreError> {
        let user = self
            .storage
            .with_connection(|conn| update_user(conn, id, changes))?;
        if user.is_some() {
            tracing::info!(id, "updated user");
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockapi_db::ensure_schema_on;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().expect("failed to open in-memory db");
        ensure_schema_on(&conn).expect("failed to create schema");
        conn
    }

    #[test]
    fn test_user_crud() {
        let conn = setup_db();

        let created = insert_user(&conn, &NewUser::new("Alice Johnson", "alice@example.com", 29))
            .expect("create failed");
        assert_eq!(created.id, 1);
        assert_eq!(created.name, "Alice Johnson");
        assert!(!created.created_at.is_empty(), "created_at should be assigned");

        let fetched = get_user(&conn, created.id)
            .expect("get failed")
            .expect("user should exist");
        assert_eq!(fetched, created);

        let users = list_users(&conn).expect("list failed");
        assert_eq!(users, vec![created.clone()]);

        let updates = UserUpdate {
            age: Some(30),
            ..Default::default()
        };
        let updated = update_user(&conn, created.id, &updates)
            .expect("update failed")
            .expect("user should exist");
        assert_eq!(updated.age, 30);
        assert_eq!(updated.email, "alice@example.com"); // Should be preserved
        assert_eq!(updated.created_at, created.created_at);
    }

    #[test]
    fn test_get_missing_user_is_none() {
        let conn = setup_db();
        assert_eq!(get_user(&conn, 999).expect("get failed"), None);
    }

    #[test]
    fn test_list_empty_table() {
        let conn = setup_db();
        assert!(list_users(&conn).expect("list failed").is_empty());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let conn = setup_db();
        insert_user(&conn, &NewUser::new("Z", "z@example.com", 40)).expect("create failed");

        let err = insert_user(&conn, &NewUser::new("Other Z", "z@example.com", 41))
            .expect_err("duplicate email should fail");
        assert!(err.is_constraint_violation(), "unexpected error: {err:?}");

        let users = list_users(&conn).expect("list failed");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Z");
    }

    #[test]
    fn test_update_to_taken_email_rejected() {
        let conn = setup_db();
        insert_user(&conn, &NewUser::new("A", "a@example.com", 20)).expect("create failed");
        let b = insert_user(&conn, &NewUser::new("B", "b@example.com", 21)).expect("create failed");

        let updates = UserUpdate {
            email: Some("a@example.com".to_string()),
            ..Default::default()
        };
        let err = update_user(&conn, b.id, &updates).expect_err("update should fail");
        assert!(err.is_constraint_violation(), "unexpected error: {err:?}");

        let unchanged = get_user(&conn, b.id)
            .expect("get failed")
            .expect("user should exist");
        assert_eq!(unchanged.email, "b@example.com");
    }

    #[test]
    fn test_update_nonexistent_user() {
        let conn = setup_db();
        let updates = UserUpdate {
            name: Some("Ghost".to_string()),
            ..Default::default()
        };
        assert_eq!(update_user(&conn, 42, &updates).expect("update failed"), None);
    }

    #[test]
    fn test_update_no_fields_returns_current() {
        let conn = setup_db();
        let created =
            insert_user(&conn, &NewUser::new("A", "a@example.com", 20)).expect("create failed");

        let same = update_user(&conn, created.id, &UserUpdate::default())
            .expect("update failed")
            .expect("user should exist");
        assert_eq!(same, created);

        assert_eq!(
            update_user(&conn, 42, &UserUpdate::default()).expect("update failed"),
            None
        );
    }

    #[test]
    fn test_update_multiple_fields() {
        let conn = setup_db();
        let created =
            insert_user(&conn, &NewUser::new("A", "a@example.com", 20)).expect("create failed");

        let updates = UserUpdate {
            name: Some("Ann".to_string()),
            email: Some("ann@example.com".to_string()),
            age: Some(21),
        };
        let updated = update_user(&conn, created.id, &updates)
            .expect("update failed")
            .expect("user should exist");
        assert_eq!(updated.name, "Ann");
        assert_eq!(updated.email, "ann@example.com");
        assert_eq!(updated.age, 21);
    }
}
