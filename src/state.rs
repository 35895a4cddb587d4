use crate::config::Config;
use crate::utils::otp::OtpStore;
use crate::utils::sms::SmsSender;
use axum::extract::FromRef;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub otp: OtpStore,
    pub sms: Arc<dyn SmsSender>,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for OtpStore {
    fn from_ref(state: &AppState) -> Self {
        state.otp.clone()
    }
}
