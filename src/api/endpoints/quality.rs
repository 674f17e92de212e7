//! Image quality endpoint.
//!
//! `POST /quality`: multipart upload with one `file` part. The part's
//! `Content-Type` is the declared media type. The body is read chunk by
//! chunk and rejected as soon as it passes the upload ceiling, so an
//! oversized upload is never buffered whole or decoded.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::decode::check_content_type;
use crate::pipeline::{QualityError, QualityResult};

/// Multipart part carrying the image.
pub const FILE_FIELD: &str = "file";

/// Upload extracted from the multipart body.
#[derive(Debug)]
pub struct Upload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// `POST /quality`: score one image and decide whether it passes.
pub async fn assess(
    State(ctx): State<ApiContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<QualityResult>, ApiError> {
    let mut multipart = multipart?;
    let limit = ctx.settings.thresholds.max_upload_bytes();
    let upload = read_upload(&mut multipart, limit).await?;

    let settings = ctx.settings.clone();
    let pipeline = ctx.pipeline.clone();

    // Decode and metrics are CPU-bound
    let result = tokio::task::spawn_blocking(move || {
        pipeline.assess(&upload.bytes, &upload.content_type, &settings.thresholds)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Quality task failed: {e}")))??;

    Ok(Json(result))
}

/// Find the `file` part and read it under `limit` bytes.
///
/// The declared type is checked before any body byte is read. Other parts
/// are skipped.
pub async fn read_upload(multipart: &mut Multipart, limit: usize) -> Result<Upload, ApiError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .ok_or_else(|| {
                ApiError::UnsupportedMediaType("the file part has no Content-Type".into())
            })?;
        check_content_type(&content_type)?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            let size = bytes.len() + chunk.len();
            if size > limit {
                return Err(QualityError::PayloadTooLarge { size, limit }.into());
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(Upload {
            content_type,
            bytes,
        });
    }

    Err(ApiError::BadRequest(format!(
        "multipart field {FILE_FIELD:?} is required"
    )))
}
