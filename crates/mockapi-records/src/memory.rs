//! In-memory repositories.
//!
//! Rows live in the repository instance behind a `Mutex`, so each instance is
//! an independent store. The lock is held for exactly one operation. Ids are
//! assigned as one past the current maximum, and `created_at` uses the same
//! `YYYY-MM-DD HH:MM:SS` UTC format the SQLite store writes.

use std::sync::{Mutex, MutexGuard};

use mockapi_db::StoreError;
use mockapi_types::{
    category_matches, NewProduct, NewUser, Product, ProductUpdate, User, UserUpdate,
    DEFAULT_STOCK,
};

use crate::{ProductRepository, UserRepository};

fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn next_id<T>(rows: &[T], id_of: impl Fn(&T) -> i64) -> i64 {
    rows.iter().map(id_of).max().unwrap_or(0) + 1
}

fn duplicate_email(email: &str) -> StoreError {
    StoreError::ConstraintViolation(format!("email already in use: {email}"))
}

/// [`UserRepository`] holding its rows in memory.
#[derive(Debug, Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<User>>,
}

impl InMemoryUsers {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository preloaded with `rows`.
    pub fn with_rows(rows: Vec<User>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    /// Creates a repository preloaded with the demo users.
    pub fn with_samples() -> Self {
        let created_at = now_timestamp();
        let rows = [
            (1, "John Doe", "john@example.com", 28),
            (2, "Jane Smith", "jane@example.com", 32),
            (3, "Bob Johnson", "bob@example.com", 25),
        ]
        .into_iter()
        .map(|(id, name, email, age)| User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            age,
            created_at: created_at.clone(),
        })
        .collect();
        Self::with_rows(rows)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<User>>, StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::LockPoisoned("user list"))
    }
}

impl UserRepository for InMemoryUsers {
    fn list_all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn get_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.lock()?.iter().find(|u| u.id == id).cloned())
    }

    fn create(&self, input: &NewUser) -> Result<User, StoreError> {
        let mut rows = self.lock()?;
        if rows.iter().any(|u| u.email == input.email) {
            return Err(duplicate_email(&input.email));
        }

        let user = User {
            id: next_id(rows.as_slice(), |u| u.id),
            name: input.name.clone(),
            email: input.email.clone(),
            age: input.age,
            created_at: now_timestamp(),
        };
        rows.push(user.clone());
        tracing::info!(id = user.id, "created user");
        Ok(user)
    }

    fn update(&self, id: i64, changes: &UserUpdate) -> Result<Option<User>, StoreError> {
        let mut rows = self.lock()?;
        let Some(index) = rows.iter().position(|u| u.id == id) else {
            return Ok(None);
        };

        if let Some(email) = &changes.email {
            if rows.iter().any(|u| u.id != id && &u.email == email) {
                return Err(duplicate_email(email));
            }
        }

        let user = &mut rows[index];
        if let Some(name) = &changes.name {
            user.name = name.clone();
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(age) = changes.age {
            user.age = age;
        }
        Ok(Some(user.clone()))
    }
}

/// [`ProductRepository`] holding its rows in memory.
#[derive(Debug, Default)]
pub struct InMemoryProducts {
    rows: Mutex<Vec<Product>>,
}

impl InMemoryProducts {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository preloaded with `rows`.
    pub fn with_rows(rows: Vec<Product>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    /// Creates a repository preloaded with the demo products.
    pub fn with_samples() -> Self {
        let rows = [
            (1, "Laptop", 999.99, "Electronics"),
            (2, "Coffee Mug", 12.50, "Kitchen"),
            (3, "Running Shoes", 89.99, "Sports"),
        ]
        .into_iter()
        .map(|(id, name, price, category)| Product {
            id,
            name: name.to_string(),
            price,
            category: category.to_string(),
            description: None,
            stock: DEFAULT_STOCK,
        })
        .collect();
        Self::with_rows(rows)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Product>>, StoreError> {
        self.rows
            .lock()
            .map_err(|_| StoreError::LockPoisoned("product list"))
    }
}

impl ProductRepository for InMemoryProducts {
    fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        Ok(self.lock()?.iter().find(|p| p.id == id).cloned())
    }

    fn list_by_category(&self, category: &str) -> Result<Vec<Product>, StoreError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|p| category_matches(&p.category, category))
            .cloned()
            .collect())
    }

    fn create(&self, input: &NewProduct) -> Result<Product, StoreError> {
        let mut rows = self.lock()?;
        let product = Product {
            id: next_id(rows.as_slice(), |p| p.id),
            name: input.name.clone(),
            price: input.price,
            category: input.category.clone(),
            description: input.description.clone(),
            stock: input.stock.unwrap_or(DEFAULT_STOCK),
        };
        rows.push(product.clone());
        tracing::info!(id = product.id, category = %product.category, "created product");
        Ok(product)
    }

    fn update(&self, id: i64, changes: &ProductUpdate) -> Result<Option<Product>, StoreError> {
        let mut rows = self.lock()?;
        let Some(product) = rows.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            product.name = name.clone();
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(category) = &changes.category {
            product.category = category.clone();
        }
        if let Some(description) = &changes.description {
            product.description = description.clone();
        }
        if let Some(stock) = changes.stock {
            product.stock = stock;
        }
        Ok(Some(product.clone()))
    }
}
