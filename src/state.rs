use std::sync::Arc;

use crate::auth::TokenService;
use crate::store::UserStore;

/// Application context built once at startup and shared with the auth/cart
/// handlers through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        AppState { users, tokens }
    }
}
