//! User and product repositories.
//!
//! Request handlers talk to storage only through [`UserRepository`] and
//! [`ProductRepository`]. Two backends implement them:
//!
//! - [`SqliteUsers`] / [`SqliteProducts`] persist to the SQLite file behind a
//!   [`StorageHandle`](mockapi_db::StorageHandle). Every call opens its own
//!   connection and closes it before returning.
//! - [`InMemoryUsers`] / [`InMemoryProducts`] keep their rows in the
//!   repository instance itself. Nothing survives a restart.
//!
//! Both backends follow the same contract: a missing id is `Ok(None)`, a
//! duplicate email is [`StoreError::ConstraintViolation`], and created
//! records come back with every store-assigned field filled in.
//!
//! The connection-level functions in [`users`] and [`products`] are public so
//! callers that already hold a connection (or a transaction, like the seed
//! loader) can use them directly.

pub mod memory;
pub mod products;
pub mod seed;
pub mod users;

use mockapi_types::{NewProduct, NewUser, Product, ProductUpdate, User, UserUpdate};

pub use memory::{InMemoryProducts, InMemoryUsers};
pub use mockapi_db::StoreError;
pub use products::SqliteProducts;
pub use seed::{run_seeds, SeedReport};
pub use users::SqliteUsers;

/// Storage contract for users.
///
/// Implementations are synchronous; async callers should run them on a
/// blocking thread.
pub trait UserRepository: Send + Sync {
    /// Returns every user, in store order.
    fn list_all(&self) -> Result<Vec<User>, StoreError>;

    /// Returns the user with `id`, or `None` if there is none.
    fn get_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// Inserts a user and returns it with its assigned `id` and `created_at`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConstraintViolation` if the email is taken.
    fn create(&self, input: &NewUser) -> Result<User, StoreError>;

    /// Applies the fields set in `changes` and returns the updated user, or
    /// `None` if there is no user with `id`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConstraintViolation` if the new email is taken.
    fn update(&self, id: i64, changes: &UserUpdate) -> Result<Option<User>, StoreError>;
}

/// Storage contract for products.
pub trait ProductRepository: Send + Sync {
    /// Returns every product, in store order.
    fn list_all(&self) -> Result<Vec<Product>, StoreError>;

    /// Returns the product with `id`, or `None` if there is none.
    fn get_by_id(&self, id: i64) -> Result<Option<Product>, StoreError>;

    /// Returns the products whose category equals `category` under Unicode
    /// lowercasing.
    fn list_by_category(&self, category: &str) -> Result<Vec<Product>, StoreError>;

    /// Inserts a product and returns it with its assigned `id`.
    fn create(&self, input: &NewProduct) -> Result<Product, StoreError>;

    /// Applies the fields set in `changes` and returns the updated product,
    /// or `None` if there is no product with `id`.
    fn update(&self, id: i64, changes: &ProductUpdate) -> Result<Option<Product>, StoreError>;
}
