use argon2::Config as ArgonConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;

use crate::error::ApiError;
use crate::models::Claims;

/// Stateless bearer-token issuance and verification (HS256). Tokens carry the
/// user id as `sub` and expire after the configured TTL.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    ttl_hours: i64,
}

impl TokenService {
    pub fn new(secret: String, ttl_hours: i64) -> Self {
        TokenService { secret, ttl_hours }
    }

    pub fn issue(&self, user_id: &str) -> Result<String, ApiError> {
        let expiration = (Utc::now() + Duration::hours(self.ttl_hours)).timestamp() as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )?;
        Ok(token)
    }

    /// Returns the embedded user id. Any decode failure (bad signature,
    /// malformed token, expired) is an authentication failure.
    pub fn verify(&self, token: &str) -> Result<String, ApiError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims.sub)
        .map_err(|_| ApiError::Unauthenticated)
    }
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt: [u8; 16] = rand::thread_rng().gen();
    let hash = argon2::hash_encoded(password.as_bytes(), &salt, &ArgonConfig::default())?;
    Ok(hash)
}

pub fn verify_password(encoded_hash: &str, password: &str) -> bool {
    argon2::verify_encoded(encoded_hash, password.as_bytes()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret".to_string(), 24)
    }

    #[test]
    fn issue_then_verify_roundtrips_user_id() {
        let tokens = service();
        let token = tokens.issue("user-42").unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), "user-42");
    }

    #[test]
    fn tampered_token_is_rejected() {
        let tokens = service();
        let mut token = tokens.issue("user-42").unwrap();
        token.push('x');
        assert!(matches!(tokens.verify(&token), Err(ApiError::Unauthenticated)));
    }

    #[test]
    fn token_from_different_secret_is_rejected() {
        let token = TokenService::new("other-secret".to_string(), 24)
            .issue("user-42")
            .unwrap();
        assert!(matches!(service().verify(&token), Err(ApiError::Unauthenticated)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::new("test-secret".to_string(), -1);
        let token = tokens.issue("user-42").unwrap();
        assert!(matches!(tokens.verify(&token), Err(ApiError::Unauthenticated)));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            service().verify("not-a-jwt"),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn password_hash_verifies_and_is_not_plaintext() {
        let hash = hash_password("p").unwrap();
        assert_ne!(hash, "p");
        assert!(verify_password(&hash, "p"));
        assert!(!verify_password(&hash, "q"));
    }

    #[test]
    fn same_password_hashes_differently_per_salt() {
        let a = hash_password("p").unwrap();
        let b = hash_password("p").unwrap();
        assert_ne!(a, b);
    }
}
