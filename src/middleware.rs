use std::rc::Rc;

use actix_service::{forward_ready, Service};
use actix_web::body::EitherBody;
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, ResponseError};
use futures::future::{ok, ready, LocalBoxFuture, Ready};

use crate::auth::TokenService;
use crate::error::ApiError;

/// Identity resolved by the auth middleware, available to handlers as an
/// extractor.
#[derive(Debug, Clone)]
pub struct AuthedUser(pub String);

impl FromRequest for AuthedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthedUser>()
                .cloned()
                .ok_or(ApiError::Unauthenticated),
        )
    }
}

/// Middleware factory guarding the cart routes. The client presents its raw
/// token in the `auth-token` header; a missing or invalid token short-circuits
/// the request with 401 before the handler runs.
pub struct AuthMiddleware {
    tokens: TokenService,
}

impl AuthMiddleware {
    pub fn new(tokens: TokenService) -> Self {
        AuthMiddleware { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    tokens: TokenService,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let tokens = self.tokens.clone();
        let service = self.service.clone();

        Box::pin(async move {
            let verified = req
                .headers()
                .get("auth-token")
                .and_then(|v| v.to_str().ok())
                .and_then(|token| tokens.verify(token).ok());

            match verified {
                Some(user_id) => {
                    req.extensions_mut().insert(AuthedUser(user_id));
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                None => {
                    let res = ApiError::Unauthenticated.error_response();
                    Ok(req.into_response(res).map_into_right_body())
                }
            }
        })
    }
}
