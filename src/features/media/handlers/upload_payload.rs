use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::{header, StatusCode},
};
use base64::prelude::*;
use tracing::debug;

use crate::core::error::AppError;
use crate::core::extractor::AppJson;
use crate::features::media::dtos::UploadMediaBase64Dto;

/// An uploaded file, read either from a `multipart/form-data` body or from a
/// JSON body carrying base64 content.
#[derive(Debug)]
pub struct UploadPayload {
    pub file_name: String,
    pub content: Vec<u8>,
    /// Content type declared by the client for the file part, if any
    pub content_type: Option<String>,
}

impl<S> FromRequest<S> for UploadPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let request_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if request_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state).await.map_err(|e| {
                AppError::BadRequest(format!("Invalid multipart request: {}", e))
            })?;
            return from_multipart(multipart).await;
        }

        if request_type.starts_with("application/json") {
            let AppJson(dto) = AppJson::<UploadMediaBase64Dto>::from_request(req, state).await?;
            return from_base64(dto);
        }

        Err(AppError::BadRequest(
            "Expected a multipart/form-data or application/json body".to_string(),
        ))
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge("Request body is too large".to_string());
    }
    debug!("Failed to read multipart data: {}", e);
    AppError::BadRequest(format!("Failed to read multipart data: {}", e))
}

async fn from_multipart(mut multipart: Multipart) -> Result<UploadPayload, AppError> {
    let mut file: Option<(String, Vec<u8>, Option<String>)> = None;
    let mut name_override: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await.map_err(multipart_error)?;

                file = Some((file_name, data.to_vec(), content_type));
            }
            "name" => {
                let text = field.text().await.map_err(multipart_error)?;
                if !text.trim().is_empty() {
                    name_override = Some(text);
                }
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let (file_name, content, content_type) =
        file.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    Ok(UploadPayload {
        file_name: name_override.unwrap_or(file_name),
        content,
        content_type,
    })
}

fn from_base64(dto: UploadMediaBase64Dto) -> Result<UploadPayload, AppError> {
    let content = BASE64_STANDARD
        .decode(dto.file.trim())
        .map_err(|e| AppError::BadRequest(format!("File content is not valid base64: {}", e)))?;

    Ok(UploadPayload {
        file_name: dto.name,
        content,
        content_type: None,
    })
}
