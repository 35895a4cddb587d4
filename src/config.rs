// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Pickup times further apart than this never match an offer.
pub const MATCH_WINDOW_MINUTES: i64 = 30;

/// Upload size cap for photo endpoints (bytes).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// How long a password-reset code stays valid.
pub const OTP_TTL_SECONDS: u64 = 300;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub upload_dir: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86400);

        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            redis_url,
            jwt_secret,
            jwt_expiration,
            upload_dir,
            port,
            rust_log,
        }
    }
}
