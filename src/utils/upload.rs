// src/utils/upload.rs

use axum::extract::multipart::Field;
use std::path::Path;
use uuid::Uuid;

use crate::error::AppError;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Public URL prefix under which the upload directory is served.
pub const URL_PREFIX: &str = "/uploads";

/// Persists one multipart image part under `<base_dir>/<subdir>/` with a
/// fresh UUID filename and returns the relative URL to store in the database.
///
/// The new file is fully written before the caller deletes any old one, so a
/// failed upload never loses the previous image.
pub async fn save_image_part(
    base_dir: &str,
    subdir: &str,
    field: Field<'_>,
) -> Result<String, AppError> {
    let ext = field
        .file_name()
        .and_then(|name| name.rsplit('.').next())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| AppError::BadRequest("File must have an extension".to_string()))?;

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unsupported image type '{}', expected one of: {}",
            ext,
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;

    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }

    let dir = Path::new(base_dir).join(subdir);
    tokio::fs::create_dir_all(&dir).await?;

    let filename = format!("{}.{}", Uuid::new_v4(), ext);
    tokio::fs::write(dir.join(&filename), &data).await?;

    Ok(format!("{}/{}/{}", URL_PREFIX, subdir, filename))
}

/// Best-effort removal of a previously stored file, given the relative URL
/// persisted in the database. Missing files are not an error.
pub async fn remove_stored(base_dir: &str, url: &str) {
    let Some(rel) = url.strip_prefix(&format!("{}/", URL_PREFIX)) else {
        return;
    };

    let path = Path::new(base_dir).join(rel);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove replaced upload {}: {}", path.display(), e);
        }
    }
}
