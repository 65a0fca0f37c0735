//! Shared record types for the mock API.
//!
//! Every crate in the workspace exchanges users and products through the
//! types defined here. Stored records carry the fields the store assigns
//! (`id`, and `created_at` for users); the `New*` shapes are what a caller
//! supplies on creation, and the `*Update` shapes carry partial updates where
//! `None` means "leave unchanged".

use serde::{Deserialize, Deserializer, Serialize};

/// A stored user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Email address, unique across all users.
    pub email: String,
    /// Age in years.
    pub age: i64,
    /// Insertion timestamp (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub created_at: String,
}

/// Fields supplied when creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: i64,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, age: i64) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age,
        }
    }
}

/// Partial update for a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
}

impl UserUpdate {
    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.age.is_none()
    }
}

/// A stored product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned identifier.
    pub id: i64,
    pub name: String,
    /// Unit price. Expected to be non-negative; not enforced.
    pub price: f64,
    /// Free-form category label, matched by category queries through
    /// [`category_matches`].
    pub category: String,
    pub description: Option<String>,
    /// Units in stock. Defaults to 0.
    pub stock: i64,
}

/// Fields supplied when creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Initial stock; `None` stores the default of 0.
    #[serde(default)]
    pub stock: Option<i64>,
}

/// Partial update for a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    /// `None` leaves the description alone; `Some(None)` (an explicit JSON
    /// `null`) clears it.
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub stock: Option<i64>,
}

/// Maps a present field to `Some`, keeping an explicit `null` as `Some(None)`.
/// Absent fields never reach this function and fall back to `None` via
/// `#[serde(default)]`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ProductUpdate {
    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.stock.is_none()
    }
}

/// Default stock for products created without one.
pub const DEFAULT_STOCK: i64 = 0;

/// Returns `true` if `category` equals `query` after Unicode lowercasing.
///
/// Both repository backends filter with this, so "Électronique" and
/// "électronique" name the same category everywhere.
pub fn category_matches(category: &str, query: &str) -> bool {
    category.to_lowercase() == query.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_product_stock_and_description_are_optional() {
        let product: NewProduct = serde_json::from_str(
            r#"{"name": "Desk Lamp", "price": 19.5, "category": "Home"}"#,
        )
        .expect("should deserialize without optional fields");
        assert_eq!(product.stock, None);
        assert_eq!(product.description, None);
    }

    #[test]
    fn empty_updates_are_detected() {
        assert!(UserUpdate::default().is_empty());
        assert!(ProductUpdate::default().is_empty());

        let update: UserUpdate =
            serde_json::from_str(r#"{"age": 41}"#).expect("should deserialize partial update");
        assert!(!update.is_empty());
        assert_eq!(update.age, Some(41));
        assert_eq!(update.name, None);
    }

    #[test]
    fn product_update_distinguishes_null_from_absent_description() {
        let absent: ProductUpdate =
            serde_json::from_str(r#"{"stock": 3}"#).expect("should deserialize");
        assert_eq!(absent.description, None);

        let cleared: ProductUpdate =
            serde_json::from_str(r#"{"description": null}"#).expect("should deserialize");
        assert_eq!(cleared.description, Some(None));
        assert!(!cleared.is_empty());

        let set: ProductUpdate =
            serde_json::from_str(r#"{"description": "Warm light"}"#).expect("should deserialize");
        assert_eq!(set.description, Some(Some("Warm light".to_string())));
    }

    #[test]
    fn category_match_folds_non_ascii_case() {
        assert!(category_matches("Électronique", "électronique"));
        assert!(category_matches("ÉLECTRONIQUE", "électronique"));
        assert!(category_matches("Kitchen", "KITCHEN"));
        assert!(!category_matches("Electronique", "électronique"));
        assert!(!category_matches("Electronics", "Electro"));
    }

    #[test]
    fn user_serializes_with_snake_case_fields() {
        let user = User {
            id: 7,
            name: "Alice Johnson".to_string(),
            email: "alice@example.com".to_string(),
            age: 29,
            created_at: "2024-01-01 00:00:00".to_string(),
        };
        let json = serde_json::to_value(&user).expect("should serialize");
        assert_eq!(json["id"], 7);
        assert_eq!(json["created_at"], "2024-01-01 00:00:00");
    }
}
