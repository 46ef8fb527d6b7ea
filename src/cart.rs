use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::AuthedUser;
use crate::models::CartItemInput;
use crate::state::AppState;
use crate::store::UserStore as _;

/// Increments the item's quantity by one. The entry is created on first add;
/// there is no upper bound.
pub async fn add_to_cart(
    state: web::Data<AppState>,
    user: AuthedUser,
    input: web::Json<CartItemInput>,
) -> Result<HttpResponse, ApiError> {
    state.users.cart_add(&user.0, input.item_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// Decrements the item's quantity by one, never below zero. A no-op still
/// acknowledges success.
pub async fn remove_from_cart(
    state: web::Data<AppState>,
    user: AuthedUser,
    input: web::Json<CartItemInput>,
) -> Result<HttpResponse, ApiError> {
    state.users.cart_remove(&user.0, input.item_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// Returns the full cart map verbatim.
pub async fn get_cart(
    state: web::Data<AppState>,
    user: AuthedUser,
) -> Result<HttpResponse, ApiError> {
    let cart = state.users.get_cart(&user.0).await?;
    Ok(HttpResponse::Ok().json(cart))
}
