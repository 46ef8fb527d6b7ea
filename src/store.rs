use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::Collection;

use crate::error::ApiError;
use crate::models::{CartData, User};

/// Credential Store boundary: user lookup/creation plus the cart mutations the
/// Cart Engine needs. Implementations must be safe to call concurrently.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, ApiError>;

    /// Inserts a new user. Fails with `DuplicateEmail` if the email is taken.
    async fn create(&self, user: &User) -> Result<(), ApiError>;

    /// Atomically increments `cartData.<item_id>` by 1, creating the entry at
    /// 1 if absent. Fails with `Unauthenticated` if no such user exists.
    async fn cart_add(&self, user_id: &str, item_id: u32) -> Result<(), ApiError>;

    /// Atomically decrements `cartData.<item_id>` by 1, but only when the
    /// current quantity is positive. Absent/zero entries are an acknowledged
    /// no-op; quantities never go below zero.
    async fn cart_remove(&self, user_id: &str, item_id: u32) -> Result<(), ApiError>;

    async fn get_cart(&self, user_id: &str) -> Result<CartData, ApiError>;
}

pub struct MongoUserStore {
    users: Collection<User>,
}

impl MongoUserStore {
    pub fn new(users: Collection<User>) -> Self {
        MongoUserStore { users }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == 11000
    )
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let user = self.users.find_one(doc! { "email": email }, None).await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
        let user = self.users.find_one(doc! { "id": id }, None).await?;
        Ok(user)
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        // The unique index on `email` closes the check-then-insert race.
        self.users.insert_one(user, None).await.map_err(|e| {
            if is_duplicate_key(&e) {
                ApiError::DuplicateEmail
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    async fn cart_add(&self, user_id: &str, item_id: u32) -> Result<(), ApiError> {
        let field = format!("cartData.{item_id}");
        let result = self
            .users
            .update_one(doc! { "id": user_id }, doc! { "$inc": { field: 1 } }, None)
            .await?;
        if result.matched_count == 0 {
            // Token refers to an account that no longer exists.
            return Err(ApiError::Unauthenticated);
        }
        Ok(())
    }

    async fn cart_remove(&self, user_id: &str, item_id: u32) -> Result<(), ApiError> {
        let field = format!("cartData.{item_id}");
        // The quantity guard lives in the filter, so the decrement and the
        // check are a single atomic operation. A zero-match is a no-op.
        self.users
            .update_one(
                doc! { "id": user_id, &field: { "$gt": 0 } },
                doc! { "$inc": { &field: -1 } },
                None,
            )
            .await?;
        Ok(())
    }

    async fn get_cart(&self, user_id: &str) -> Result<CartData, ApiError> {
        match self.find_by_id(user_id).await? {
            Some(user) => Ok(user.cart_data),
            None => Err(ApiError::Unauthenticated),
        }
    }
}

/// In-memory store mirroring `MongoUserStore` semantics, for handler tests.
#[cfg(test)]
pub struct MemoryUserStore {
    users: std::sync::Mutex<std::collections::HashMap<String, User>>,
}

#[cfg(test)]
impl MemoryUserStore {
    pub fn new() -> Self {
        MemoryUserStore {
            users: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
        let users = self.users.lock().unwrap();
        Ok(users.get(id).cloned())
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(ApiError::DuplicateEmail);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn cart_add(&self, user_id: &str, item_id: u32) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(user_id).ok_or(ApiError::Unauthenticated)?;
        *user.cart_data.entry(item_id.to_string()).or_insert(0) += 1;
        Ok(())
    }

    async fn cart_remove(&self, user_id: &str, item_id: u32) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(user_id).ok_or(ApiError::Unauthenticated)?;
        if let Some(qty) = user.cart_data.get_mut(&item_id.to_string()) {
            if *qty > 0 {
                *qty -= 1;
            }
        }
        Ok(())
    }

    async fn get_cart(&self, user_id: &str) -> Result<CartData, ApiError> {
        let users = self.users.lock().unwrap();
        match users.get(user_id) {
            Some(user) => Ok(user.cart_data.clone()),
            None => Err(ApiError::Unauthenticated),
        }
    }
}
