// src/handlers/profile.rs

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::user::{UpdateProfileRequest, User},
    state::AppState,
    utils::{jwt::Claims, upload},
};

/// Fetch a user's public profile.
pub async fn get_user(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, username, password, photo_url, last_role, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Update the authenticated user's username and/or email.
pub async fn update_me(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if payload.username.is_none() && payload.email.is_none() {
        return Err(AppError::BadRequest("Nothing to update".to_string()));
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET username = COALESCE($1, username),
            email = COALESCE($2, email)
        WHERE id = $3
        RETURNING id, email, username, password, photo_url, last_role, created_at
        "#,
    )
    .bind(payload.username)
    .bind(payload.email.map(|e| e.trim().to_lowercase()))
    .bind(claims.user_id()?)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
            AppError::Conflict("That email is already in use".to_string())
        } else {
            AppError::from(e)
        }
    })?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Upload or replace the authenticated user's profile photo.
///
/// The new file is written first; the replaced one is only deleted after
/// the database row points at the new URL.
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let old_url = sqlx::query_scalar::<_, Option<String>>(
        "SELECT photo_url FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    let mut new_url: Option<String> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("photo") {
            new_url = Some(upload::save_image_part(&state.config.upload_dir, "profile", field).await?);
        }
    }

    let new_url =
        new_url.ok_or(AppError::BadRequest("Missing 'photo' form field".to_string()))?;

    sqlx::query("UPDATE users SET photo_url = $1 WHERE id = $2")
        .bind(&new_url)
        .bind(user_id)
        .execute(&state.pool)
        .await?;

    if let Some(old) = old_url {
        upload::remove_stored(&state.config.upload_dir, &old).await;
    }

    Ok(Json(json!({ "photo_url": new_url })))
}
