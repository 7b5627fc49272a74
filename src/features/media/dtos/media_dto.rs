use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::media::models::{MediaSummary, MediaType};
use crate::shared::byte_size::format_file_size;

/// Upload media request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler reads the multipart stream directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadMediaDto {
    /// The .png or .mkv file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Stored name, defaults to the uploaded file name
    #[schema(example = "holiday.png")]
    pub name: Option<String>,
}

/// JSON upload with base64 encoded content
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadMediaBase64Dto {
    /// File name including its extension
    #[schema(example = "holiday.png")]
    pub name: String,
    /// Base64 (standard alphabet) encoded file content
    pub file: String,
}

// Rename request
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RenameMediaDto {
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "renamed.png")]
    pub name: String,
}

// Response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MediaResponseDto {
    pub id: Uuid,
    pub name: String,
    pub file_type: MediaType,
    /// Size of the stored content in bytes
    pub file_size: i64,
    /// Human readable size, e.g. `2.5 MB`
    pub display_file_size: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MediaSummary> for MediaResponseDto {
    fn from(m: MediaSummary) -> Self {
        Self {
            id: m.id,
            display_file_size: format_file_size(m.file_size),
            name: m.name,
            file_type: m.file_type,
            file_size: m.file_size,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteMediaResponseDto {
    pub deleted: bool,
}
