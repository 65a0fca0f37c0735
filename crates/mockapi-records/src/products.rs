//! SQLite-backed product repository.

use mockapi_db::{StorageHandle, StoreError};
use mockapi_types::{category_matches, NewProduct, Product, ProductUpdate, DEFAULT_STOCK};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::ProductRepository;

/// Lists all products.
pub fn list_products(conn: &Connection) -> Result<Vec<Product>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT id, name, price, category, description, stock FROM products")?;
    let products = stmt
        .query_map([], map_row_to_product)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(products)
}

/// Lists products in `category`, compared after Unicode lowercasing.
///
/// SQLite's own `lower()` and `NOCASE` only fold ASCII, so the match runs
/// over the full table in Rust.
pub fn list_products_by_category(
    conn: &Connection,
    category: &str,
) -> Result<Vec<Product>, StoreError> {
    let products = list_products(conn)?
        .into_iter()
        .filter(|p| category_matches(&p.category, category))
        .collect();
    Ok(products)
}

/// Retrieves a product by id.
pub fn get_product(conn: &Connection, id: i64) -> Result<Option<Product>, StoreError> {
    let product = conn
        .query_row(
            "SELECT id, name, price, category, description, stock FROM products WHERE id = ?1",
            [id],
            map_row_to_product,
        )
        .optional()?;
    Ok(product)
}

/// Inserts a product and returns the stored row.
pub fn insert_product(conn: &Connection, input: &NewProduct) -> Result<Product, StoreError> {
    let product = conn.query_row(
        "INSERT INTO products (name, price, category, description, stock)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING id, name, price, category, description, stock",
        params![
            input.name,
            input.price,
            input.category,
            input.description,
            input.stock.unwrap_or(DEFAULT_STOCK),
        ],
        map_row_to_product,
    )?;
    Ok(product)
}

/// Updates a product using a single UPDATE statement.
///
/// Only fields that are `Some` in `updates` are modified; a description of
/// `Some(None)` is written as NULL. Returns `None` if no product has `id`.
pub fn update_product(
    conn: &Connection,
    id: i64,
    updates: &ProductUpdate,
) -> Result<Option<Product>, StoreError> {
    if updates.is_empty() {
        return get_product(conn, id);
    }

    let mut set_parts: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut idx = 1usize;

    if let Some(name) = &updates.name {
        set_parts.push(format!("name = ?{}", idx));
        values.push(Box::new(name.clone()));
        idx += 1;
    }
    if let Some(price) = updates.price {
        set_parts.push(format!("price = ?{}", idx));
        values.push(Box::new(price));
        idx += 1;
    }
    if let Some(category) = &updates.category {
        set_parts.push(format!("category = ?{}", idx));
        values.push(Box::new(category.clone()));
        idx += 1;
    }
    if let Some(description) = &updates.description {
        set_parts.push(format!("description = ?{}", idx));
        // Option<String> binds None as NULL
        values.push(Box::new(description.clone()));
        idx += 1;
    }
    if let Some(stock) = updates.stock {
        set_parts.push(format!("stock = ?{}", idx));
        values.push(Box::new(stock));
        idx += 1;
    }

    let sql = format!(
        "UPDATE products SET {} WHERE id = ?{}
         RETURNING id, name, price, category, description, stock",
        set_parts.join(", "),
        idx
    );
    values.push(Box::new(id));

    let params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let product = conn
        .query_row(&sql, params.as_slice(), map_row_to_product)
        .optional()?;
    Ok(product)
}

fn map_row_to_product(row: &Row) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        stock: row.get::<_, Option<i64>>(5)?.unwrap_or(DEFAULT_STOCK),
    })
}

/// [`ProductRepository`] over the SQLite store.
#[derive(Debug, Clone)]
pub struct SqliteProducts {
    storage: StorageHandle,
}

impl SqliteProducts {
    pub fn new(storage: StorageHandle) -> Self {
        Self { storage }
    }
}

impl ProductRepository for SqliteProducts {
    fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        self.storage.with_connection(list_products)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        self.storage.with_connection(|conn| get_product(conn, id))
    }

    fn list_by_category(&self, category: &str) -> Result<Vec<Product>, StoreError> {
        self.storage
            .with_connection(|conn| list_products_by_category(conn, category))
    }

    fn create(&self, input: &NewProduct) -> Result<Product, StoreError> {
        let product = self
            .storage
            .with_connection(|conn| insert_product(conn, input))?;
        tracing::info!(id = product.id, category = %product.category, "created product");
        Ok(product)
    }

    fn update(&self, id: i64, changes: &ProductUpdate) -> Result<Option<Product>, StoreError> {
        let product = self
            .storage
            .with_connection(|conn| update_product(conn, id, changes))?;
        if product.is_some() {
            tracing::info!(id, "updated product");
        }
        Ok(product)
    }
}
