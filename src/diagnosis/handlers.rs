use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::{error::ApiError, state::AppState};

use super::dto::{Diagnosis, DiagnosisResponse};

pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/check-health", post(check_health))
        // Slack over the image cap for multipart framing.
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024))
}

/// Accepts one uploaded image (`image` multipart field), forwards it to
/// the identification service and returns the reshaped diagnosis. The
/// upload is validated before any outbound call is made.
#[instrument(skip(state, multipart))]
pub async fn check_health(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<DiagnosisResponse>, ApiError> {
    let mut image: Option<(Bytes, String)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("image") {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Could not read uploaded image: {e}")))?;
            image = Some((data, content_type));
            break;
        }
    }

    let (data, content_type) = image.ok_or_else(|| {
        ApiError::Validation(
            "No image file provided. Upload the file under the field name \"image\".".into(),
        )
    })?;
    validate_image(&content_type, data.len())?;

    let encoded = BASE64.encode(&data);
    let diagnosis = state.diagnosis.identify(&encoded).await?;

    info!(
        is_plant = ?diagnosis.is_plant,
        is_healthy = ?diagnosis.is_healthy,
        diseases = diagnosis.diseases.len(),
        "diagnosis completed"
    );
    log_diagnosis(&state.db, &diagnosis).await;

    Ok(Json(DiagnosisResponse {
        success: true,
        diagnosis,
    }))
}

pub(crate) fn validate_image(content_type: &str, len: usize) -> Result<(), ApiError> {
    if !content_type.starts_with("image/") {
        return Err(ApiError::Validation("Only image files are allowed".into()));
    }
    if len == 0 {
        return Err(ApiError::Validation("Uploaded image is empty".into()));
    }
    if len > MAX_IMAGE_BYTES {
        return Err(ApiError::Validation("Image size exceeds the 10MB limit".into()));
    }
    Ok(())
}

/// Best-effort log record; a store failure must never fail the request.
async fn log_diagnosis(db: &PgPool, diagnosis: &Diagnosis) {
    let diseases = serde_json::to_value(&diagnosis.diseases)
        .unwrap_or(serde_json::Value::Array(Vec::new()));
    let classification = serde_json::to_value(&diagnosis.classification)
        .unwrap_or(serde_json::Value::Array(Vec::new()));

    let result = sqlx::query(
        r#"
        INSERT INTO plant_logs (is_plant, is_healthy, diseases, classification)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(diagnosis.is_plant)
    .bind(diagnosis.is_healthy)
    .bind(diseases)
    .bind(classification)
    .execute(db)
    .await;

    if let Err(e) = result {
        warn!(error = %e, "failed to persist diagnosis log; continuing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn non_image_uploads_are_rejected() {
        let err = validate_image("application/pdf", 100).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("image files"));

        let err = validate_image("", 100).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn oversized_images_are_rejected() {
        let err = validate_image("image/jpeg", MAX_IMAGE_BYTES + 1).unwrap_err();
        assert!(err.to_string().contains("10MB"));
    }

    #[test]
    fn empty_uploads_are_rejected() {
        assert!(validate_image("image/png", 0).is_err());
    }

    #[test]
    fn images_within_the_cap_pass() {
        assert!(validate_image("image/jpeg", 1024).is_ok());
        assert!(validate_image("image/png", MAX_IMAGE_BYTES).is_ok());
    }
}
