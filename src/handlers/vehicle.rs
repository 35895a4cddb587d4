// src/handlers/vehicle.rs
//
// Three endpoints converge on the single vehicle row per driver: details,
// the vehicle photo and the license photos. Each upsert touches only its
// own columns, so they can arrive in any order without clobbering the rest.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::vehicle::{Vehicle, VehicleDetailsRequest},
    state::AppState,
    utils::upload,
};

const VEHICLE_COLUMNS: &str =
    "id, driver_id, model, vehicle_type, color, capacity, plate_number, \
     vehicle_url, license_front_url, license_back_url";

/// Fetch a driver's vehicle, 404 before anything has been saved.
pub async fn get_vehicle(
    State(pool): State<PgPool>,
    Path(driver_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
        "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE driver_id = $1"
    ))
    .bind(driver_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("No vehicle registered for this driver".to_string()))?;

    Ok(Json(vehicle))
}

/// Upsert vehicle details (model, type, color, capacity, plate).
pub async fn save_details(
    State(pool): State<PgPool>,
    Path(driver_id): Path<i64>,
    Json(payload): Json<VehicleDetailsRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
        r#"
        INSERT INTO vehicles (driver_id, model, vehicle_type, color, capacity, plate_number)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (driver_id) DO UPDATE SET
            model = EXCLUDED.model,
            vehicle_type = EXCLUDED.vehicle_type,
            color = EXCLUDED.color,
            capacity = EXCLUDED.capacity,
            plate_number = EXCLUDED.plate_number
        RETURNING {VEHICLE_COLUMNS}
        "#
    ))
    .bind(driver_id)
    .bind(&payload.model)
    .bind(&payload.vehicle_type)
    .bind(&payload.color)
    .bind(payload.capacity)
    .bind(&payload.plate_number)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("violates foreign key constraint") {
            AppError::NotFound("Driver not found".to_string())
        } else {
            AppError::from(e)
        }
    })?;

    Ok(Json(vehicle))
}

/// Upload or replace the vehicle photo. Touches only `vehicle_url`.
pub async fn upload_vehicle_photo(
    State(state): State<AppState>,
    Path(driver_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let old_url = sqlx::query_scalar::<_, Option<String>>(
        "SELECT vehicle_url FROM vehicles WHERE driver_id = $1",
    )
    .bind(driver_id)
    .fetch_optional(&state.pool)
    .await?
    .flatten();

    let mut new_url: Option<String> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("photo") {
            new_url =
                Some(upload::save_image_part(&state.config.upload_dir, "vehicles", field).await?);
        }
    }

    let new_url =
        new_url.ok_or(AppError::BadRequest("Missing 'photo' form field".to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO vehicles (driver_id, vehicle_url)
        VALUES ($1, $2)
        ON CONFLICT (driver_id) DO UPDATE SET vehicle_url = EXCLUDED.vehicle_url
        "#,
    )
    .bind(driver_id)
    .bind(&new_url)
    .execute(&state.pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("violates foreign key constraint") {
            AppError::NotFound("Driver not found".to_string())
        } else {
            AppError::from(e)
        }
    })?;

    if let Some(old) = old_url {
        upload::remove_stored(&state.config.upload_dir, &old).await;
    }

    Ok(Json(json!({ "vehicle_url": new_url })))
}

/// Upload license photos. Accepts 'front' and/or 'back' parts; each side
/// updates its own column, leaving the other untouched.
pub async fn upload_license(
    State(state): State<AppState>,
    Path(driver_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let old = sqlx::query_as::<_, (Option<String>, Option<String>)>(
        "SELECT license_front_url, license_back_url FROM vehicles WHERE driver_id = $1",
    )
    .bind(driver_id)
    .fetch_optional(&state.pool)
    .await?;

    let mut front_url: Option<String> = None;
    let mut back_url: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("front") => {
                front_url =
                    Some(upload::save_image_part(&state.config.upload_dir, "licenses", field).await?);
            }
            Some("back") => {
                back_url =
                    Some(upload::save_image_part(&state.config.upload_dir, "licenses", field).await?);
            }
            _ => {}
        }
    }

    if front_url.is_none() && back_url.is_none() {
        return Err(AppError::BadRequest(
            "Expected a 'front' and/or 'back' image field".to_string(),
        ));
    }

    let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
        r#"
        INSERT INTO vehicles (driver_id, license_front_url, license_back_url)
        VALUES ($1, $2, $3)
        ON CONFLICT (driver_id) DO UPDATE SET
            license_front_url = COALESCE(EXCLUDED.license_front_url, vehicles.license_front_url),
            license_back_url = COALESCE(EXCLUDED.license_back_url, vehicles.license_back_url)
        RETURNING {VEHICLE_COLUMNS}
        "#
    ))
    .bind(driver_id)
    .bind(&front_url)
    .bind(&back_url)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("violates foreign key constraint") {
            AppError::NotFound("Driver not found".to_string())
        } else {
            AppError::from(e)
        }
    })?;

    // Remove replaced files only after the row points at the new ones.
    if let Some((old_front, old_back)) = old {
        if front_url.is_some() {
            if let Some(url) = old_front {
                upload::remove_stored(&state.config.upload_dir, &url).await;
            }
        }
        if back_url.is_some() {
            if let Some(url) = old_back {
                upload::remove_stored(&state.config.upload_dir, &url).await;
            }
        }
    }

    Ok(Json(vehicle))
}
