//! Fixture data for development stores.
//!
//! [`run_seeds`] is not idempotent: a second run hits the unique email
//! constraint. All rows go in through one transaction, so a failed run leaves
//! the store exactly as it was.

use mockapi_db::{ensure_schema, StorageHandle, StoreError};
use mockapi_types::{NewProduct, NewUser};

use crate::products::insert_product;
use crate::users::insert_user;

/// Row counts inserted by a seed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub products: usize,
}

/// The fixed sample users, in insertion order.
pub fn sample_users() -> Vec<NewUser> {
    vec![
        NewUser::new("Alice Johnson", "alice@example.com", 29),
        NewUser::new("Bob Wilson", "bob@example.com", 34),
        NewUser::new("Carol Davis", "carol@example.com", 27),
        NewUser::new("David Brown", "david@example.com", 31),
        NewUser::new("Eva Miller", "eva@example.com", 26),
    ]
}

/// The fixed sample products, in insertion order.
pub fn sample_products() -> Vec<NewProduct> {
    [
        ("Gaming Mouse", 59.99, "Electronics", "High-precision gaming mouse", 15),
        ("Yoga Mat", 24.99, "Sports", "Non-slip yoga mat", 30),
        ("Coffee Maker", 89.99, "Kitchen", "Automatic coffee maker", 8),
        ("Running Shorts", 34.99, "Sports", "Lightweight running shorts", 25),
        ("Bluetooth Speaker", 79.99, "Electronics", "Portable speaker", 12),
    ]
    .into_iter()
    .map(|(name, price, category, description, stock)| NewProduct {
        name: name.to_string(),
        price,
        category: category.to_string(),
        description: Some(description.to_string()),
        stock: Some(stock),
    })
    .collect()
}

/// Creates the schema if needed, then inserts the sample users and products.
///
/// # Errors
///
/// Returns `StoreError::ConstraintViolation` if any sample email is already
/// present. Nothing is inserted in that case.
pub fn run_seeds(storage: &StorageHandle) -> Result<SeedReport, StoreError> {
    ensure_schema(storage)?;

    let users = sample_users();
    let products = sample_products();

    storage.with_connection(|conn| {
        let tx = conn.unchecked_transaction()?;
        for user in &users {
            insert_user(&tx, user)?;
        }
        for product in &products {
            insert_product(&tx, product)?;
        }
        tx.commit()?;
        Ok(())
    })?;

    let report = SeedReport {
        users: users.len(),
        products: products.len(),
    };
    tracing::info!(
        users = report.users,
        products = report.products,
        "seeded database"
    );
    Ok(report)
}
