use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::media::dtos::{
    DeleteMediaResponseDto, MediaResponseDto, RenameMediaDto, UploadMediaBase64Dto,
    UploadMediaDto,
};
use crate::features::media::handlers::UploadPayload;
use crate::features::media::services::{MediaContent, MediaService};
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Set on view responses; `true` when the body is a resampled copy
pub const DOWNSCALED_HEADER: HeaderName = HeaderName::from_static("x-media-downscaled");

/// `Content-Disposition` value with an ASCII fallback and an RFC 5987 UTF-8 name
fn content_disposition(disposition: &str, file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "{}; filename=\"{}\"; filename*=UTF-8''{}",
        disposition,
        fallback,
        urlencoding::encode(file_name)
    )
}

fn binary_response(content: MediaContent, disposition: &str) -> Result<Response> {
    let disposition = HeaderValue::from_str(&content_disposition(disposition, &content.file_name))
        .map_err(|e| AppError::Internal(format!("Invalid content disposition: {}", e)))?;
    let downscaled = HeaderValue::from_static(if content.downscaled { "true" } else { "false" });

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content.mime_type)),
            (header::CONTENT_DISPOSITION, disposition),
            (DOWNSCALED_HEADER, downscaled),
        ],
        content.data,
    )
        .into_response())
}

/// List the caller's media, newest first
#[utoipa::path(
    get,
    path = "/api/media",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Media retrieved successfully", body = ApiResponse<Vec<MediaResponseDto>>),
        (status = 401, description = "Authentication required")
    ),
    tag = "media",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_media(
    user: AuthenticatedUser,
    State(service): State<Arc<MediaService>>,
    Query(params): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<MediaResponseDto>>>> {
    let (items, total) = service.list(user.user_id, &params).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// View media inline
///
/// Images stored at or above the downscale threshold are returned as a PNG
/// resampled to the display bounds. The `X-Media-Downscaled` header tells
/// whether that happened.
#[utoipa::path(
    get,
    path = "/api/media/{id}",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Media content for display", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Media belongs to another user"),
        (status = 404, description = "Media not found"),
        (status = 500, description = "Stored content could not be processed")
    ),
    tag = "media",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn view_media(
    user: AuthenticatedUser,
    State(service): State<Arc<MediaService>>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let content = service.view(user.user_id, id).await?;
    binary_response(content, "inline")
}

/// Get media metadata
#[utoipa::path(
    get,
    path = "/api/media/{id}/details",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Media retrieved successfully", body = ApiResponse<MediaResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Media belongs to another user"),
        (status = 404, description = "Media not found")
    ),
    tag = "media",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_media_details(
    user: AuthenticatedUser,
    State(service): State<Arc<MediaService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MediaResponseDto>>> {
    let media = service.details(user.user_id, id).await?;
    Ok(Json(ApiResponse::success(Some(media), None, None)))
}

/// Download the stored file as an attachment
#[utoipa::path(
    get,
    path = "/api/media/{id}/download",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Stored file content", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Media belongs to another user"),
        (status = 404, description = "Media not found")
    ),
    tag = "media",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_media(
    user: AuthenticatedUser,
    State(service): State<Arc<MediaService>>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let content = service.download(user.user_id, id).await?;
    binary_response(content, "attachment")
}

/// Upload a .png image or .mkv video
///
/// Accepts multipart/form-data with:
/// - `file`: The file to upload (required)
/// - `name`: Stored name (optional, defaults to the file name)
///
/// or a JSON body `{ "name": "...", "file": "<base64>" }`.
#[utoipa::path(
    post,
    path = "/api/media",
    request_body(
        content(
            (UploadMediaDto = "multipart/form-data"),
            (UploadMediaBase64Dto = "application/json")
        ),
        description = "File upload as a multipart form or base64 JSON",
    ),
    responses(
        (status = 201, description = "Media uploaded successfully", body = ApiResponse<MediaResponseDto>),
        (status = 400, description = "Unsupported or spoofed media format"),
        (status = 401, description = "Authentication required"),
        (status = 413, description = "File too large")
    ),
    tag = "media",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_media(
    user: AuthenticatedUser,
    State(service): State<Arc<MediaService>>,
    payload: UploadPayload,
) -> Result<(StatusCode, Json<ApiResponse<MediaResponseDto>>)> {
    let media = service
        .create(
            user.user_id,
            &payload.file_name,
            payload.content,
            payload.content_type.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(media),
            Some("Media uploaded successfully".to_string()),
            None,
        )),
    ))
}

/// Rename media
#[utoipa::path(
    post,
    path = "/api/media/{id}",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    request_body = RenameMediaDto,
    responses(
        (status = 200, description = "Media renamed successfully", body = ApiResponse<MediaResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Media belongs to another user"),
        (status = 404, description = "Media not found"),
        (status = 409, description = "Concurrent modification")
    ),
    tag = "media",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn rename_media(
    user: AuthenticatedUser,
    State(service): State<Arc<MediaService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<RenameMediaDto>,
) -> Result<Json<ApiResponse<MediaResponseDto>>> {
    let media = service.rename(user.user_id, id, &dto.name).await?;
    Ok(Json(ApiResponse::success(Some(media), None, None)))
}

/// Delete media
///
/// Deleting media that no longer exists succeeds.
#[utoipa::path(
    delete,
    path = "/api/media/{id}",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Media deleted successfully", body = ApiResponse<DeleteMediaResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Media belongs to another user")
    ),
    tag = "media",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_media(
    user: AuthenticatedUser,
    State(service): State<Arc<MediaService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteMediaResponseDto>>> {
    service.delete(user.user_id, id).await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteMediaResponseDto { deleted: true }),
        Some("Media deleted successfully".to_string()),
        None,
    )))
}

/// Delete media (form-friendly alias of `DELETE /api/media/{id}`)
#[utoipa::path(
    post,
    path = "/api/media/{id}/delete",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Media deleted successfully", body = ApiResponse<DeleteMediaResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Media belongs to another user")
    ),
    tag = "media",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_media_post(
    user: AuthenticatedUser,
    state: State<Arc<MediaService>>,
    path: Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteMediaResponseDto>>> {
    delete_media(user, state, path).await
}
