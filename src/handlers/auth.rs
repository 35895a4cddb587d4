// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{
        ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest,
        ResetPasswordRequest, User,
    },
    state::AppState,
    utils::{
        hash::{hash_password, verify_password},
        jwt::{Claims, sign_jwt},
        otp,
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(pool): State<PgPool>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, username, password)
        VALUES ($1, $2, $3)
        RETURNING id, email, username, password, photo_url, last_role, created_at
        "#,
    )
    .bind(payload.email.trim().to_lowercase())
    .bind(&payload.username)
    .bind(hashed_password)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        // Postgres error code for unique violation is 23505
        if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
            AppError::Conflict(format!("An account for '{}' already exists", payload.email))
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user against Postgres and returns a JWT token.
pub async fn login(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, username, password, photo_url, last_role, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(payload.email.trim().to_lowercase())
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let user = user.ok_or(AppError::AuthError("Invalid email or password".to_string()))?;

    let is_valid = verify_password(&payload.password, &user.password)?;

    if !is_valid {
        return Err(AppError::AuthError("Invalid email or password".to_string()));
    }

    let token = sign_jwt(user.id, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "user_id": user.id,
        "last_role": user.last_role,
    })))
}

/// Changes the authenticated user's password after verifying the old one.
pub async fn change_password(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.user_id()?;

    let current_hash =
        sqlx::query_scalar::<_, String>("SELECT password FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&pool)
            .await?
            .ok_or(AppError::NotFound("User not found".to_string()))?;

    if !verify_password(&payload.old_password, &current_hash)? {
        return Err(AppError::AuthError("Old password is incorrect".to_string()));
    }

    let new_hash = hash_password(&payload.new_password)?;

    sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
        .bind(new_hash)
        .bind(user_id)
        .execute(&pool)
        .await?;

    Ok(Json(json!({ "message": "Password updated" })))
}

/// Issues a password-reset code.
///
/// The code is stored in redis with a TTL and handed to the SMS/email
/// collaborator. The response is the same whether or not the account
/// exists, to avoid account enumeration.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let email = payload.email.trim().to_lowercase();

    let user_exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.pool)
        .await?;

    if user_exists.is_some() {
        let code = otp::generate_code();
        state.otp.put(&email, &code).await?;
        state.sms.send_reset_code(&email, &code).await?;
    }

    Ok(Json(json!({
        "message": "If the account exists, a reset code has been sent"
    })))
}

/// Redeems a reset code and sets a new password. Codes are single-use.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let email = payload.email.trim().to_lowercase();

    let stored = state.otp.take(&email).await?;
    match stored {
        Some(code) if code == payload.code => {}
        _ => return Err(AppError::AuthError("Invalid or expired reset code".to_string())),
    }

    let new_hash = hash_password(&payload.new_password)?;

    let result = sqlx::query("UPDATE users SET password = $1 WHERE email = $2")
        .bind(new_hash)
        .bind(&email)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(json!({ "message": "Password reset" })))
}
