use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sparse cart map: stringified product id -> quantity. Starts empty and is
/// populated lazily on the first add; quantities never go below zero.
pub type CartData = HashMap<String, i64>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Argon2 encoded hash, never the plaintext.
    pub password: String,
    #[serde(rename = "cartData", default)]
    pub cart_data: CartData,
    pub date: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        User {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password: password_hash,
            cart_data: CartData::new(),
            date: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignUpInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CartItemInput {
    #[serde(rename = "itemId")]
    pub item_id: u32,
}

#[derive(Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub exp: usize,  // Expiration time as UTC timestamp
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub category: String,
    pub new_price: f64,
    pub old_price: f64,
    pub date: DateTime<Utc>,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddProductInput {
    pub name: String,
    pub image: String,
    pub category: String,
    pub new_price: f64,
    pub old_price: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveProductInput {
    pub id: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Counter {
    pub _id: String,
    pub seq: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_starts_with_empty_cart() {
        let user = User::new(
            "alice".to_string(),
            "a@x.com".to_string(),
            "$argon2i$...".to_string(),
        );
        assert!(user.cart_data.is_empty());
        assert!(!user.id.is_empty());
    }

    #[test]
    fn cart_item_input_uses_wire_field_name() {
        let input: CartItemInput = serde_json::from_str(r#"{"itemId": 5}"#).unwrap();
        assert_eq!(input.item_id, 5);
    }

    #[test]
    fn user_missing_cart_data_deserializes_empty() {
        // Documents written before a user ever touched the cart may lack the field.
        let doc = r#"{
            "id": "u1",
            "name": "alice",
            "email": "a@x.com",
            "password": "hash",
            "date": "2024-01-01T00:00:00Z"
        }"#;
        let user: User = serde_json::from_str(doc).unwrap();
        assert!(user.cart_data.is_empty());
    }
}
