use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use thiserror::Error;

/// Every handler returns `Result<HttpResponse, ApiError>`; failures render as
/// `{"success": false, "errors": "<message>"}`. Internal variants flatten to a
/// generic "Server Error" on the wire and log their source.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Please authenticate using a valid token")]
    Unauthenticated,

    #[error("Existing user found with the same email address")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("No file uploaded")]
    MissingFile,

    #[error("Server Error")]
    Database(#[from] mongodb::error::Error),

    #[error("Server Error")]
    Hash(#[from] argon2::Error),

    #[error("Server Error")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Server Error")]
    Multipart(#[from] actix_multipart::MultipartError),

    #[error("Server Error")]
    Io(#[from] std::io::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::DuplicateEmail | ApiError::InvalidCredentials | ApiError::MissingFile => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Database(_)
            | ApiError::Hash(_)
            | ApiError::Token(_)
            | ApiError::Multipart(_)
            | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {self:?}");
        }
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "errors": self.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(ApiError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::DuplicateEmail.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidCredentials.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingFile.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Io(std::io::Error::new(std::io::ErrorKind::Other, "boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let err = ApiError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"));
        assert_eq!(err.to_string(), "Server Error");
    }
}
