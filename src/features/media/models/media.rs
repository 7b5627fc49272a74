use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::modules::media::MediaFormat;

/// Media kind enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "media_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// MIME type used when serving stored content
    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaType::Image => MediaFormat::Png.mime_type(),
            MediaType::Video => MediaFormat::Matroska.mime_type(),
        }
    }
}

impl From<MediaFormat> for MediaType {
    fn from(format: MediaFormat) -> Self {
        match format {
            MediaFormat::Png => MediaType::Image,
            MediaFormat::Matroska => MediaType::Video,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Image => write!(f, "image"),
            MediaType::Video => write!(f, "video"),
        }
    }
}

/// Full media record including its content
#[derive(Debug, Clone, FromRow)]
pub struct Media {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub file_type: MediaType,
    pub content: Vec<u8>,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Media record without content
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MediaSummary {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub file_type: MediaType,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Media> for MediaSummary {
    fn from(media: &Media) -> Self {
        Self {
            id: media.id,
            owner_id: media.owner_id,
            name: media.name.clone(),
            file_type: media.file_type,
            file_size: media.file_size,
            created_at: media.created_at,
            updated_at: media.updated_at,
        }
    }
}

/// Validated media ready to be persisted
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub file_type: MediaType,
    pub content: Vec<u8>,
}

impl NewMedia {
    pub fn file_size(&self) -> i64 {
        self.content.len() as i64
    }
}
