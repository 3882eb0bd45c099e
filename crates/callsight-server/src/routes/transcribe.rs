//! Transcribe Route - Upload audio and run the pipeline
//!
//! Always answers with the full result shape unless transcription itself
//! failed; degraded extraction or persistence shows up inside the body.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::Instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use callsight::{normalize_mime_type, AudioPayload};

use crate::models::{ErrorResponse, TranscriptionResponse};
use crate::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Multipart upload form
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct TranscribeUpload {
    /// Audio file (mp3, wav, m4a, ...)
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

struct Upload {
    file_name: String,
    audio: AudioPayload,
}

/// Transcribe and analyze an audio file
#[utoipa::path(
    post,
    path = "/api/transcribe",
    request_body(content = TranscribeUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Call processed (possibly degraded)", body = TranscriptionResponse),
        (status = 400, description = "Missing or empty file", body = ErrorResponse),
        (status = 502, description = "Transcription failed", body = ErrorResponse)
    ),
    tag = "Transcription"
)]
pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TranscriptionResponse>, ApiError> {
    let upload = read_upload(multipart).await?;
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("transcribe", %request_id, file_name = %upload.file_name);

    let result = state
        .pipeline
        .process(&upload.file_name, upload.audio)
        .instrument(span)
        .await
        .map_err(|e| {
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse::new(e.code(), e.to_string())),
            )
        })?;

    Ok(Json(result.into()))
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            e.status(),
            Json(ErrorResponse::new("invalid_upload", e.body_text())),
        )
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = normalize_mime_type(field.content_type(), &file_name);
        let bytes = field.bytes().await.map_err(|e| {
            (
                e.status(),
                Json(ErrorResponse::new("invalid_upload", e.body_text())),
            )
        })?;

        if bytes.is_empty() {
            return Err(bad_request("Uploaded file is empty"));
        }

        return Ok(Upload {
            file_name,
            audio: AudioPayload::new(bytes.to_vec(), mime_type),
        });
    }

    Err(bad_request("Multipart field 'file' is required"))
}

fn bad_request(detail: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("invalid_upload", detail)),
    )
}

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/transcribe", post(transcribe))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
