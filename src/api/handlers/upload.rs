use crate::AppState;
use crate::api::error::AppError;
use crate::api::middleware::request_id::RequestId;
use crate::models::UploadRequest;
use axum::{
    Extension,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use utoipa::ToSchema;
use uuid::Uuid;

/// Form accepted by `POST /upload`
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data", description = "Single file in the `file` part"),
    responses(
        (status = 200, description = "File uploaded", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing or malformed file part", body = crate::api::error::ErrorResponse),
        (status = 413, description = "Upload exceeds the size limit", body = crate::api::error::ErrorResponse),
        (status = 500, description = "Staging or storage failure", body = crate::api::error::ErrorResponse)
    ),
    tag = "upload"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let request_id = request_id
        .map(|Extension(id)| id.as_str().to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut multipart = multipart.map_err(|rejection| {
        AppError::BadRequest(format!("Expected a multipart form: {}", rejection.body_text()))
    })?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("The 'file' part has no filename".to_string()))?;
        let content = field.bytes().await.map_err(multipart_error)?;

        upload = Some(UploadRequest::new(file_name, content));
        break;
    }

    let upload = upload
        .ok_or_else(|| AppError::BadRequest("Missing 'file' part in form".to_string()))?;

    if upload.size() > state.max_file_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File is {} bytes, the limit is {} bytes",
            upload.size(),
            state.max_file_size
        )));
    }

    tracing::info!(
        "📨 Upload '{}' ({} bytes) [request_id={}]",
        upload.file_name,
        upload.size(),
        request_id
    );

    let message = state.upload_service.upload_file(&request_id, upload).await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.to_string())],
        message,
    )
        .into_response())
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}
