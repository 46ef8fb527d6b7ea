use actix_web::{web, HttpResponse};
use log::info;
use serde_json::json;

use crate::auth::{hash_password, verify_password};
use crate::error::ApiError;
use crate::models::{LoginInput, SignUpInput, User};
use crate::state::AppState;
use crate::store::UserStore as _;

/// Registers a new account and hands back a token so the client is logged in
/// immediately. The cart starts empty.
pub async fn signup(
    state: web::Data<AppState>,
    input: web::Json<SignUpInput>,
) -> Result<HttpResponse, ApiError> {
    if state.users.find_by_email(&input.email).await?.is_some() {
        return Err(ApiError::DuplicateEmail);
    }

    let hash = hash_password(&input.password)?;
    let user = User::new(input.username.clone(), input.email.clone(), hash);
    state.users.create(&user).await?;

    info!("registered user {}", user.id);
    let token = state.tokens.issue(&user.id)?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "token": token })))
}

pub async fn login(
    state: web::Data<AppState>,
    input: web::Json<LoginInput>,
) -> Result<HttpResponse, ApiError> {
    // Unknown email and wrong password collapse into the same error.
    let user = state
        .users
        .find_by_email(&input.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(&user.password, &input.password) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(&user.id)?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "token": token })))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    use super::*;
    use crate::auth::TokenService;
    use crate::store::{MemoryUserStore, UserStore as _};

    fn state() -> AppState {
        AppState::new(
            Arc::new(MemoryUserStore::new()),
            TokenService::new("test-secret".to_string(), 24),
        )
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .route("/signup", web::post().to(signup))
                    .route("/login", web::post().to(login)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn signup_then_login_succeeds() {
        let state = state();
        let app = app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/signup")
                .set_json(json!({ "username": "alice", "email": "a@x.com", "password": "p" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert!(body["token"].is_string());

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .set_json(json!({ "email": "a@x.com", "password": "p" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert!(body["token"].is_string());
    }

    #[actix_web::test]
    async fn signup_stores_a_hash_not_the_plaintext() {
        let state = state();
        let app = app!(state);

        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/signup")
                .set_json(json!({ "username": "alice", "email": "a@x.com", "password": "p" }))
                .to_request(),
        )
        .await;

        let user = state.users.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_ne!(user.password, "p");
        assert!(verify_password(&user.password, "p"));
    }

    #[actix_web::test]
    async fn duplicate_email_fails_and_issues_no_token() {
        let state = state();
        let app = app!(state);

        let signup = |email: &str| {
            test::TestRequest::post()
                .uri("/signup")
                .set_json(json!({ "username": "alice", "email": email, "password": "p" }))
                .to_request()
        };

        test::call_service(&app, signup("a@x.com")).await;
        let resp = test::call_service(&app, signup("a@x.com")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(body.get("token").is_none());
    }

    #[actix_web::test]
    async fn wrong_password_is_rejected() {
        let state = state();
        let app = app!(state);

        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/signup")
                .set_json(json!({ "username": "alice", "email": "a@x.com", "password": "p" }))
                .to_request(),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .set_json(json!({ "email": "a@x.com", "password": "wrong" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unknown_email_is_rejected() {
        let state = state();
        let app = app!(state);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .set_json(json!({ "email": "nobody@x.com", "password": "p" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
