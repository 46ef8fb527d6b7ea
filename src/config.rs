use std::env;

/// Runtime configuration, collected once at startup and passed to the server
/// via `web::Data` instead of being read ad hoc from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub upload_dir: String,
    pub public_url: String,
}

impl Config {
    /// Reads configuration from the environment. `DATABASE_URL` and
    /// `JWT_SECRET` are required; everything else has a default.
    pub fn from_env() -> Self {
        Config {
            port: optional("PORT", "4000"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            database_name: env::var("DATABASE_NAME").unwrap_or_else(|_| "e-commerce".to_string()),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            token_ttl_hours: optional("TOKEN_TTL_HOURS", "24"),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "upload/images".to_string()),
            public_url: env::var("PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:4000".to_string()),
        }
    }
}

fn optional<T: std::str::FromStr>(key: &str, default: &str) -> T
where
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .unwrap_or_else(|e| panic!("invalid {key} value {raw:?}: {e}"))
}
