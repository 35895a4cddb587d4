// src/utils/otp.rs

use rand::Rng;
use redis::{AsyncCommands, aio::ConnectionManager};

use crate::{config::OTP_TTL_SECONDS, error::AppError};

/// Redis-backed store for password-reset codes.
///
/// Codes live under `otp:<email>` with a TTL, so expiry needs no sweeper
/// and restarts do not wipe in-flight resets.
#[derive(Clone)]
pub struct OtpStore {
    conn: ConnectionManager,
}

impl OtpStore {
    pub async fn connect(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    fn key(email: &str) -> String {
        format!("otp:{}", email.trim().to_lowercase())
    }

    /// Stores a code for the given email, replacing any outstanding one.
    pub async fn put(&self, email: &str, code: &str) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(Self::key(email), code, OTP_TTL_SECONDS).await?;
        Ok(())
    }

    /// Fetches and consumes the code for the given email.
    /// A code can only be redeemed once.
    pub async fn take(&self, email: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.conn.clone();
        let code: Option<String> = redis::cmd("GETDEL")
            .arg(Self::key(email))
            .query_async(&mut conn)
            .await?;
        Ok(code)
    }
}

/// Generates a 6-digit numeric code.
pub fn generate_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(100_000..=999_999);
    code.to_string()
}
