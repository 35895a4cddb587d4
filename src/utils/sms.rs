// src/utils/sms.rs

use async_trait::async_trait;

use crate::error::AppError;

/// Seam for the external OTP delivery service (Twilio SMS in production).
/// Keeps credential handling and HTTP plumbing out of the handlers.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_reset_code(&self, email: &str, code: &str) -> Result<(), AppError>;
}

/// Default sender that only logs the dispatch. Used in development and in
/// integration tests; deployments wire a real provider in at startup.
pub struct LogSender;

#[async_trait]
impl SmsSender for LogSender {
    async fn send_reset_code(&self, email: &str, _code: &str) -> Result<(), AppError> {
        tracing::info!("Password reset code issued for {}", email);
        Ok(())
    }
}
