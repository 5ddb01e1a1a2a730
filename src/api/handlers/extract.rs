use crate::AppState;
use crate::api::error::AppError;
use crate::utils::validation::{file_extension, sanitize_filename};
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use bytes::Bytes;
use serde::Serialize;
use utoipa::ToSchema;

/// Label reported for extracted content; the engine always renders to text
const CONTENT_FORMAT: &str = "text/plain";

#[derive(Serialize, ToSchema)]
pub struct ExtractResponse {
    pub filename: String,
    pub content: String,
    pub format: String,
}

/// Request-scoped capture of the uploaded file field
struct UploadedFile {
    payload: Bytes,
    filename: String,
    content_type: Option<String>,
}

#[utoipa::path(
    post,
    path = "/extract",
    request_body(
        content = Multipart,
        description = "Document to extract, in a `file` form field",
        content_type = "multipart/form-data"
    ),
    responses(
        (status = 200, description = "Content extracted", body = ExtractResponse),
        (status = 400, description = "Missing file part or empty filename"),
        (status = 413, description = "Upload exceeds the size limit"),
        (status = 415, description = "Format not supported by the engine"),
        (status = 500, description = "Conversion failed")
    ),
    tag = "extraction"
)]
pub async fn extract_content(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractResponse>, AppError> {
    // A request that is not multipart at all carries no file part either
    let mut multipart = multipart.map_err(|_| AppError::MissingFilePart)?;

    // Capture errors so the remaining stream can be drained before replying
    let result: Result<Json<ExtractResponse>, AppError> = async {
        let mut upload: Option<UploadedFile> = None;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            if field.name() != Some("file") {
                continue;
            }
            if upload.is_some() {
                // First file field wins
                continue;
            }

            let raw_filename = match field.file_name() {
                // A part without a filename is a form value, not a file
                None => continue,
                Some("") => return Err(AppError::EmptyFilename),
                Some(name) => name.to_string(),
            };
            let content_type = field.content_type().map(|s| s.to_string());

            tracing::info!(
                "Received file: {}, content-type: {}",
                raw_filename,
                content_type.as_deref().unwrap_or("unknown")
            );

            let payload = field.bytes().await.map_err(multipart_error)?;

            upload = Some(UploadedFile {
                payload,
                filename: raw_filename,
                content_type,
            });
        }

        let upload = upload.ok_or(AppError::MissingFilePart)?;

        let filename = sanitize_filename(&upload.filename);
        let extension = file_extension(&filename);

        tracing::info!(
            "Processing file: {}, extension: {}, content-type: {}",
            filename,
            extension,
            upload.content_type.as_deref().unwrap_or("unknown")
        );

        let converted = state.converter.convert(&upload.payload, &filename).await?;

        tracing::info!("Successfully extracted content from {}", filename);

        Ok(Json(ExtractResponse {
            filename,
            content: converted.content,
            format: CONTENT_FORMAT.to_string(),
        }))
    }
    .await;

    match result {
        Ok(res) => Ok(res),
        Err(e) => {
            // Consume the remaining multipart stream so early rejections don't
            // reset the connection mid-upload
            tracing::warn!("Extraction rejected: {}. Consuming remaining stream...", e);
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            Err(e)
        }
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(e.body_text())
    }
}
