use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::core::config::MediaConfig;
use crate::core::error::{AppError, Result};
use crate::features::media::dtos::{MediaResponseDto, RenameMediaDto};
use crate::features::media::models::{Media, MediaSummary, MediaType, NewMedia};
use crate::features::media::repositories::MediaRepository;
use crate::modules::media::{downscale, signature, DownscaleError, MediaFormat};
use crate::shared::constants::MAX_MEDIA_NAME_LENGTH;
use crate::shared::types::PaginationQuery;

/// Content types that carry no format claim and are always accepted
const GENERIC_CONTENT_TYPES: &[&str] = &["", "application/octet-stream"];

/// Stored (or display-downscaled) bytes ready to be sent to the client
#[derive(Debug)]
pub struct MediaContent {
    pub data: Vec<u8>,
    pub file_type: MediaType,
    pub mime_type: &'static str,
    pub file_name: String,
    /// True when `data` is a resampled copy rather than the stored original
    pub downscaled: bool,
}

impl MediaContent {
    fn original(media: Media) -> Self {
        Self {
            mime_type: media.file_type.mime_type(),
            file_type: media.file_type,
            file_name: media.name,
            data: media.content,
            downscaled: false,
        }
    }
}

pub struct MediaService {
    repository: Arc<dyn MediaRepository>,
    config: MediaConfig,
}

impl std::fmt::Debug for MediaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaService")
            .field("repository", &"<MediaRepository>")
            .field("config", &self.config)
            .finish()
    }
}

impl MediaService {
    pub fn new(repository: Arc<dyn MediaRepository>, config: MediaConfig) -> Self {
        Self { repository, config }
    }

    /// List the caller's media, newest first
    pub async fn list(
        &self,
        caller: Uuid,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<MediaResponseDto>, i64)> {
        let (items, total) = self
            .repository
            .list_by_owner(caller, pagination.limit(), pagination.offset())
            .await?;

        Ok((items.into_iter().map(MediaResponseDto::from).collect(), total))
    }

    /// Metadata for a single record owned by the caller
    pub async fn details(&self, caller: Uuid, id: Uuid) -> Result<MediaResponseDto> {
        let summary = self.find_owned_summary(caller, id).await?;
        Ok(summary.into())
    }

    /// Full record, including content, owned by the caller.
    /// Ownership is checked on metadata before the content is loaded.
    pub async fn get(&self, caller: Uuid, id: Uuid) -> Result<Media> {
        self.find_owned_summary(caller, id).await?;

        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Validate and store a new upload.
    ///
    /// Checks run in order: size limit, file signature, declared content type,
    /// name rules. Nothing is persisted unless all of them pass.
    pub async fn create(
        &self,
        caller: Uuid,
        file_name: &str,
        content: Vec<u8>,
        declared_content_type: Option<&str>,
    ) -> Result<MediaResponseDto> {
        if content.len() > self.config.max_upload_bytes {
            warn!(
                user_id = %caller,
                size = content.len(),
                "Rejected upload over the size limit"
            );
            return Err(AppError::PayloadTooLarge(format!(
                "The file is too large ({} bytes maximum allowed)",
                self.config.max_upload_bytes
            )));
        }

        let name = file_name.trim();
        let format = signature::validate(name, &content).inspect_err(|e| {
            warn!(user_id = %caller, file_name = %name, "Rejected upload: {}", e);
        })?;

        ensure_declared_type_matches(declared_content_type, format)?;
        validate_name(name)?;

        let new_media = NewMedia {
            id: Uuid::new_v4(),
            owner_id: caller,
            name: name.to_string(),
            file_type: format.into(),
            content,
        };

        let summary = self.repository.insert(new_media).await?;
        info!(
            media_id = %summary.id,
            user_id = %caller,
            file_type = %summary.file_type,
            size = summary.file_size,
            "Media uploaded"
        );

        Ok(summary.into())
    }

    /// Change the stored name, leaving every other field untouched
    pub async fn rename(&self, caller: Uuid, id: Uuid, new_name: &str) -> Result<MediaResponseDto> {
        let current = self.find_owned_summary(caller, id).await?;

        let request = RenameMediaDto {
            name: new_name.trim().to_string(),
        };
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let name = request.name.as_str();
        if current.name == name {
            return Err(AppError::Validation(
                "New name is the same as the current name".to_string(),
            ));
        }

        // The record can disappear between the ownership check and the update
        let summary = self
            .repository
            .rename(id, caller, name)
            .await?
            .ok_or_else(|| not_found(id))?;

        info!(media_id = %id, user_id = %caller, "Media renamed");
        Ok(summary.into())
    }

    /// Delete a record. Deleting an id that does not exist succeeds.
    pub async fn delete(&self, caller: Uuid, id: Uuid) -> Result<()> {
        let Some(summary) = self.repository.find_summary(id).await? else {
            debug!(media_id = %id, "Delete of missing media ignored");
            return Ok(());
        };

        ensure_owner(summary.owner_id, caller, id)?;

        if self.repository.delete(id, caller).await? {
            info!(media_id = %id, user_id = %caller, "Media deleted");
        }

        Ok(())
    }

    /// Stored bytes exactly as uploaded
    pub async fn download(&self, caller: Uuid, id: Uuid) -> Result<MediaContent> {
        let media = self.get(caller, id).await?;
        Ok(MediaContent::original(media))
    }

    /// Bytes for display. Large images are downscaled to the configured
    /// bounds; everything else is returned as stored.
    pub async fn view(&self, caller: Uuid, id: Uuid) -> Result<MediaContent> {
        let media = self.get(caller, id).await?;

        if media.file_type != MediaType::Image
            || media.file_size < self.config.downscale_threshold_bytes as i64
        {
            return Ok(MediaContent::original(media));
        }

        let bounds = self.config.display_bounds();
        let Media { name, content, .. } = media;

        let (content, resized) = tokio::task::spawn_blocking(move || {
            let resized = downscale::fit_within(&content, bounds);
            (content, resized)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Downscale task failed: {}", e)))?;

        let (data, downscaled) = match resized {
            Ok(Some(resized)) => {
                debug!(
                    media_id = %id,
                    width = resized.width,
                    height = resized.height,
                    "Image downscaled for display"
                );
                (resized.data, true)
            }
            Ok(None) => (content, false),
            Err(DownscaleError::ExceedsLimits(reason)) => {
                warn!(media_id = %id, "Image served as stored: {}", reason);
                (content, false)
            }
            Err(e) => return Err(e.into()),
        };

        Ok(MediaContent {
            data,
            file_type: MediaType::Image,
            mime_type: MediaType::Image.mime_type(),
            file_name: name,
            downscaled,
        })
    }

    async fn find_owned_summary(&self, caller: Uuid, id: Uuid) -> Result<MediaSummary> {
        let summary = self
            .repository
            .find_summary(id)
            .await?
            .ok_or_else(|| not_found(id))?;

        ensure_owner(summary.owner_id, caller, id)?;
        Ok(summary)
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Media with id {} not found", id))
}

fn ensure_owner(owner_id: Uuid, caller: Uuid, id: Uuid) -> Result<()> {
    if owner_id != caller {
        warn!(media_id = %id, user_id = %caller, "Access to media owned by another user denied");
        return Err(AppError::Forbidden(
            "You do not have access to this media".to_string(),
        ));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(AppError::Validation("Name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_MEDIA_NAME_LENGTH {
        return Err(AppError::Validation(format!(
            "Name must be at most {} characters",
            MAX_MEDIA_NAME_LENGTH
        )));
    }
    Ok(())
}

fn ensure_declared_type_matches(declared: Option<&str>, format: MediaFormat) -> Result<()> {
    let Some(declared) = declared else {
        return Ok(());
    };

    let essence = declared
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if GENERIC_CONTENT_TYPES.contains(&essence.as_str()) || essence == format.mime_type() {
        return Ok(());
    }

    Err(AppError::InvalidFormat(format!(
        "Declared content type '{}' does not match the file content ({})",
        essence,
        format.mime_type()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::media::repositories::InMemoryMediaRepository;
    use crate::modules::media::DisplayBounds;
    use crate::shared::test_helpers::{create_test_mkv, create_test_png};
    use async_trait::async_trait;
    use image::GenericImageView;

    fn test_config() -> MediaConfig {
        MediaConfig {
            max_upload_bytes: 1_000_000,
            downscale_threshold_bytes: 0,
            display_max_width: 64,
            display_max_height: 36,
        }
    }

    fn service_with(repository: Arc<dyn MediaRepository>, config: MediaConfig) -> MediaService {
        MediaService::new(repository, config)
    }

    fn test_service() -> (MediaService, Arc<InMemoryMediaRepository>) {
        let repository = Arc::new(InMemoryMediaRepository::new());
        (service_with(repository.clone(), test_config()), repository)
    }

    #[tokio::test]
    async fn test_create_png_yields_image() {
        let (service, _) = test_service();
        let owner = Uuid::new_v4();
        let png = create_test_png(10, 10);

        let created = service
            .create(owner, "photo.png", png.clone(), Some("image/png"))
            .await
            .unwrap();

        assert_eq!(created.file_type, MediaType::Image);
        assert_eq!(created.file_size, png.len() as i64);
        assert_eq!(created.name, "photo.png");
    }

    #[tokio::test]
    async fn test_create_mkv_yields_video() {
        let (service, _) = test_service();

        let created = service
            .create(Uuid::new_v4(), "clip.MKV", create_test_mkv(64), None)
            .await
            .unwrap();

        assert_eq!(created.file_type, MediaType::Video);
    }

    #[tokio::test]
    async fn test_create_over_limit_is_rejected_before_validation() {
        let (service, repository) = test_service();
        let garbage = vec![0u8; 1_000_001];

        let err = service
            .create(Uuid::new_v4(), "notes.txt", garbage, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PayloadTooLarge(_)));
        assert_eq!(repository.len().await, 0);
    }

    #[tokio::test]
    async fn test_create_at_exact_limit_is_accepted() {
        let (service, _) = test_service();
        let mkv = create_test_mkv(1_000_000);

        assert!(service
            .create(Uuid::new_v4(), "clip.mkv", mkv, None)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_create_rejects_spoofed_content() {
        let (service, repository) = test_service();

        let err = service
            .create(Uuid::new_v4(), "photo.png", create_test_mkv(64), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidFormat(_)));
        assert_eq!(repository.len().await, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_unsupported_extension() {
        let (service, _) = test_service();

        let err = service
            .create(Uuid::new_v4(), "photo.gif", create_test_png(4, 4), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidFormat(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_mismatched_declared_type() {
        let (service, _) = test_service();

        let err = service
            .create(
                Uuid::new_v4(),
                "photo.png",
                create_test_png(4, 4),
                Some("video/x-matroska"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidFormat(_)));
    }

    #[tokio::test]
    async fn test_create_accepts_generic_declared_type() {
        let (service, _) = test_service();

        assert!(service
            .create(
                Uuid::new_v4(),
                "photo.png",
                create_test_png(4, 4),
                Some("application/octet-stream"),
            )
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_create_rejects_overlong_name() {
        let (service, _) = test_service();
        let name = format!("{}.png", "a".repeat(MAX_MEDIA_NAME_LENGTH));

        let err = service
            .create(Uuid::new_v4(), &name, create_test_png(4, 4), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_download_returns_identical_bytes() {
        let (service, _) = test_service();
        let owner = Uuid::new_v4();
        let png = create_test_png(100, 100);
        let created = service
            .create(owner, "big.png", png.clone(), None)
            .await
            .unwrap();

        let content = service.download(owner, created.id).await.unwrap();

        assert_eq!(content.data, png);
        assert_eq!(content.mime_type, "image/png");
        assert_eq!(content.file_name, "big.png");
        assert!(!content.downscaled);
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden() {
        let (service, _) = test_service();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let created = service
            .create(owner, "photo.png", create_test_png(4, 4), None)
            .await
            .unwrap();

        assert!(matches!(
            service.get(stranger, created.id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.download(stranger, created.id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.view(stranger, created.id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.details(stranger, created.id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.rename(stranger, created.id, "mine.png").await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.delete(stranger, created.id).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let (service, _) = test_service();

        assert!(matches!(
            service.get(Uuid::new_v4(), Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.rename(Uuid::new_v4(), Uuid::new_v4(), "x.png").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_view_downscales_large_image() {
        let (service, _) = test_service();
        let owner = Uuid::new_v4();
        let created = service
            .create(owner, "wide.png", create_test_png(128, 96), None)
            .await
            .unwrap();

        let content = service.view(owner, created.id).await.unwrap();
        assert!(content.downscaled);

        let decoded = image::load_from_memory(&content.data).unwrap();
        // 128x96 into 64x36: scale = min(0.5, 0.375)
        assert_eq!(decoded.dimensions(), (48, 36));
    }

    #[tokio::test]
    async fn test_view_below_threshold_returns_original() {
        let repository = Arc::new(InMemoryMediaRepository::new());
        let config = MediaConfig {
            downscale_threshold_bytes: 2_000_000,
            ..test_config()
        };
        let service = service_with(repository, config);
        let owner = Uuid::new_v4();
        let png = create_test_png(200, 150);
        let created = service
            .create(owner, "wide.png", png.clone(), None)
            .await
            .unwrap();

        let content = service.view(owner, created.id).await.unwrap();

        assert!(!content.downscaled);
        assert_eq!(content.data, png);
    }

    #[tokio::test]
    async fn test_view_small_image_over_threshold_is_untouched() {
        let (service, _) = test_service();
        let owner = Uuid::new_v4();
        let png = create_test_png(32, 18);
        let created = service
            .create(owner, "small.png", png.clone(), None)
            .await
            .unwrap();

        let content = service.view(owner, created.id).await.unwrap();

        assert!(!content.downscaled);
        assert_eq!(content.data, png);
    }

    #[tokio::test]
    async fn test_view_video_is_never_downscaled() {
        let (service, _) = test_service();
        let owner = Uuid::new_v4();
        let mkv = create_test_mkv(512);
        let created = service
            .create(owner, "clip.mkv", mkv.clone(), None)
            .await
            .unwrap();

        let content = service.view(owner, created.id).await.unwrap();

        assert_eq!(content.data, mkv);
        assert_eq!(content.mime_type, "video/x-matroska");
        assert_eq!(content.file_type, MediaType::Video);
    }

    #[tokio::test]
    async fn test_view_undecodable_image_is_malformed() {
        let (service, _) = test_service();
        let owner = Uuid::new_v4();
        let mut broken = create_test_png(8, 8);
        broken.truncate(16);
        let created = service
            .create(owner, "broken.png", broken, None)
            .await
            .unwrap();

        let err = service.view(owner, created.id).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedContent(_)));
    }

    #[tokio::test]
    async fn test_view_image_beyond_decoder_limits_returns_original() {
        let (service, _) = test_service();
        let owner = Uuid::new_v4();
        let mut wide = std::io::Cursor::new(Vec::new());
        image::DynamicImage::new_luma8(20000, 2)
            .write_to(&mut wide, image::ImageFormat::Png)
            .unwrap();
        let wide = wide.into_inner();
        let created = service
            .create(owner, "panorama.png", wide.clone(), None)
            .await
            .unwrap();

        let content = service.view(owner, created.id).await.unwrap();

        assert!(!content.downscaled);
        assert_eq!(content.data, wide);
        assert_eq!(content.mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_rename_changes_name_only() {
        let (service, _) = test_service();
        let owner = Uuid::new_v4();
        let png = create_test_png(4, 4);
        let created = service
            .create(owner, "before.png", png.clone(), None)
            .await
            .unwrap();

        let renamed = service
            .rename(owner, created.id, "  after.png  ")
            .await
            .unwrap();

        assert_eq!(renamed.name, "after.png");
        assert_eq!(renamed.id, created.id);
        assert_eq!(renamed.file_type, created.file_type);
        assert_eq!(renamed.file_size, created.file_size);
        assert_eq!(renamed.created_at, created.created_at);
        assert_eq!(service.download(owner, created.id).await.unwrap().data, png);
    }

    #[tokio::test]
    async fn test_rename_rejects_blank_name() {
        let (service, _) = test_service();
        let owner = Uuid::new_v4();
        let created = service
            .create(owner, "a.png", create_test_png(4, 4), None)
            .await
            .unwrap();

        let err = service.rename(owner, created.id, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_rename_to_current_name_is_rejected() {
        let (service, _) = test_service();
        let owner = Uuid::new_v4();
        let created = service
            .create(owner, "same.png", create_test_png(4, 4), None)
            .await
            .unwrap();

        let err = service
            .rename(owner, created.id, "  same.png ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(service.details(owner, created.id).await.unwrap().name, "same.png");
    }

    #[tokio::test]
    async fn test_rename_checks_access_before_name() {
        let (service, _) = test_service();
        let owner = Uuid::new_v4();
        let created = service
            .create(owner, "a.png", create_test_png(4, 4), None)
            .await
            .unwrap();

        let missing = service.rename(owner, Uuid::new_v4(), "").await.unwrap_err();
        assert!(matches!(missing, AppError::NotFound(_)));

        let foreign = service
            .rename(Uuid::new_v4(), created.id, "   ")
            .await
            .unwrap_err();
        assert!(matches!(foreign, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (service, repository) = test_service();
        let owner = Uuid::new_v4();
        let created = service
            .create(owner, "a.png", create_test_png(4, 4), None)
            .await
            .unwrap();

        service.delete(owner, created.id).await.unwrap();
        service.delete(owner, created.id).await.unwrap();

        assert_eq!(repository.len().await, 0);
        assert!(matches!(
            service.get(owner, created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_paged() {
        let (service, _) = test_service();
        let owner = Uuid::new_v4();
        for i in 0..3 {
            service
                .create(owner, &format!("{}.png", i), create_test_png(2, 2), None)
                .await
                .unwrap();
        }
        service
            .create(Uuid::new_v4(), "other.png", create_test_png(2, 2), None)
            .await
            .unwrap();

        let page = PaginationQuery {
            page: 1,
            page_size: 2,
        };
        let (items, total) = service.list(owner, &page).await.unwrap();

        assert_eq!(total, 3);
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|m| m.name != "other.png"));
    }

    /// Reports the record during the ownership check, then loses it
    struct VanishingRepository {
        inner: InMemoryMediaRepository,
    }

    #[async_trait]
    impl MediaRepository for VanishingRepository {
        async fn insert(&self, media: NewMedia) -> Result<MediaSummary> {
            self.inner.insert(media).await
        }
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Media>> {
            self.inner.find_by_id(id).await
        }
        async fn find_summary(&self, id: Uuid) -> Result<Option<MediaSummary>> {
            self.inner.find_summary(id).await
        }
        async fn list_by_owner(
            &self,
            owner_id: Uuid,
            limit: i64,
            offset: i64,
        ) -> Result<(Vec<MediaSummary>, i64)> {
            self.inner.list_by_owner(owner_id, limit, offset).await
        }
        async fn rename(&self, id: Uuid, owner_id: Uuid, _name: &str) -> Result<Option<MediaSummary>> {
            self.inner.delete(id, owner_id).await?;
            Ok(None)
        }
        async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool> {
            self.inner.delete(id, owner_id).await
        }
    }

    /// Fails every rename with a concurrency conflict
    struct ConflictingRepository {
        inner: InMemoryMediaRepository,
    }

    #[async_trait]
    impl MediaRepository for ConflictingRepository {
        async fn insert(&self, media: NewMedia) -> Result<MediaSummary> {
            self.inner.insert(media).await
        }
        async fn find_by_id(&self, id: Uuid) -> Result<Option<Media>> {
            self.inner.find_by_id(id).await
        }
        async fn find_summary(&self, id: Uuid) -> Result<Option<MediaSummary>> {
            self.inner.find_summary(id).await
        }
        async fn list_by_owner(
            &self,
            owner_id: Uuid,
            limit: i64,
            offset: i64,
        ) -> Result<(Vec<MediaSummary>, i64)> {
            self.inner.list_by_owner(owner_id, limit, offset).await
        }
        async fn rename(&self, _id: Uuid, _owner_id: Uuid, _name: &str) -> Result<Option<MediaSummary>> {
            Err(AppError::Conflict("serialization failure".to_string()))
        }
        async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool> {
            self.inner.delete(id, owner_id).await
        }
    }

    /// Metadata lookups work, loading content fails
    struct ContentlessRepository {
        inner: InMemoryMediaRepository,
    }

    #[async_trait]
    impl MediaRepository for ContentlessRepository {
        async fn insert(&self, media: NewMedia) -> Result<MediaSummary> {
            self.inner.insert(media).await
        }
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Media>> {
            Err(AppError::Internal("content unavailable".to_string()))
        }
        async fn find_summary(&self, id: Uuid) -> Result<Option<MediaSummary>> {
            self.inner.find_summary(id).await
        }
        async fn list_by_owner(
            &self,
            owner_id: Uuid,
            limit: i64,
            offset: i64,
        ) -> Result<(Vec<MediaSummary>, i64)> {
            self.inner.list_by_owner(owner_id, limit, offset).await
        }
        async fn rename(&self, id: Uuid, owner_id: Uuid, name: &str) -> Result<Option<MediaSummary>> {
            self.inner.rename(id, owner_id, name).await
        }
        async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool> {
            self.inner.delete(id, owner_id).await
        }
    }

    #[tokio::test]
    async fn test_non_owner_never_loads_content() {
        let repository = Arc::new(ContentlessRepository {
            inner: InMemoryMediaRepository::new(),
        });
        let service = service_with(repository, test_config());
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let created = service
            .create(owner, "a.png", create_test_png(4, 4), None)
            .await
            .unwrap();

        assert!(matches!(
            service.get(stranger, created.id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.download(stranger, created.id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.view(stranger, created.id).await,
            Err(AppError::Forbidden(_))
        ));
        // The owner does reach the content store
        assert!(matches!(
            service.get(owner, created.id).await,
            Err(AppError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_rename_of_vanished_record_is_not_found() {
        let repository = Arc::new(VanishingRepository {
            inner: InMemoryMediaRepository::new(),
        });
        let service = service_with(repository, test_config());
        let owner = Uuid::new_v4();
        let created = service
            .create(owner, "a.png", create_test_png(4, 4), None)
            .await
            .unwrap();

        let err = service.rename(owner, created.id, "b.png").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rename_conflict_is_surfaced() {
        let repository = Arc::new(ConflictingRepository {
            inner: InMemoryMediaRepository::new(),
        });
        let service = service_with(repository, test_config());
        let owner = Uuid::new_v4();
        let created = service
            .create(owner, "a.png", create_test_png(4, 4), None)
            .await
            .unwrap();

        let err = service.rename(owner, created.id, "b.png").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_declared_type_parameters_are_ignored() {
        assert!(ensure_declared_type_matches(Some("IMAGE/PNG; charset=binary"), MediaFormat::Png).is_ok());
        assert!(ensure_declared_type_matches(None, MediaFormat::Matroska).is_ok());
        assert!(ensure_declared_type_matches(Some("image/png"), MediaFormat::Matroska).is_err());
    }

    #[test]
    fn test_display_bounds_follow_config() {
        assert_eq!(
            test_config().display_bounds(),
            DisplayBounds {
                max_width: 64,
                max_height: 36
            }
        );
    }
}
