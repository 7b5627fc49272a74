use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::media::models::{Media, MediaSummary, NewMedia};

const SUMMARY_COLUMNS: &str = "id, owner_id, name, file_type, file_size, created_at, updated_at";

/// Persistence for media records.
///
/// Writes are scoped by both `id` and `owner_id` so that a single statement
/// performs the ownership check and the change atomically.
#[async_trait]
pub trait MediaRepository: Send + Sync + 'static {
    async fn insert(&self, media: NewMedia) -> Result<MediaSummary>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Media>>;

    /// Metadata lookup that never loads the content blob
    async fn find_summary(&self, id: Uuid) -> Result<Option<MediaSummary>>;

    /// Newest first, with the owner's total record count
    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<MediaSummary>, i64)>;

    /// Returns `None` when no record with this id and owner exists
    async fn rename(&self, id: Uuid, owner_id: Uuid, name: &str)
        -> Result<Option<MediaSummary>>;

    /// Returns whether a record was removed
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool>;
}

/// Convert database error to a more specific AppError
pub(crate) fn handle_db_error(e: sqlx::Error) -> AppError {
    if is_concurrency_violation(&e) {
        return AppError::Conflict(
            "The media record was modified concurrently. Please retry.".to_string(),
        );
    }

    AppError::Database(e)
}

/// Serialization failure (40001) or deadlock (40P01)
fn is_concurrency_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.code().as_deref(), Some("40001") | Some("40P01"))
        }
        _ => false,
    }
}

pub struct PgMediaRepository {
    pool: PgPool,
}

impl std::fmt::Debug for PgMediaRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgMediaRepository")
            .field("pool", &"<PgPool>")
            .finish()
    }
}

impl PgMediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaRepository for PgMediaRepository {
    async fn insert(&self, media: NewMedia) -> Result<MediaSummary> {
        let file_size = media.file_size();
        let query = format!(
            r#"
            INSERT INTO media (id, owner_id, name, file_type, content, file_size)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            SUMMARY_COLUMNS
        );

        sqlx::query_as::<_, MediaSummary>(&query)
            .bind(media.id)
            .bind(media.owner_id)
            .bind(&media.name)
            .bind(media.file_type)
            .bind(&media.content)
            .bind(file_size)
            .fetch_one(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Media>> {
        sqlx::query_as::<_, Media>(
            r#"
            SELECT id, owner_id, name, file_type, content, file_size, created_at, updated_at
            FROM media
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(handle_db_error)
    }

    async fn find_summary(&self, id: Uuid) -> Result<Option<MediaSummary>> {
        let query = format!("SELECT {} FROM media WHERE id = $1", SUMMARY_COLUMNS);

        sqlx::query_as::<_, MediaSummary>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<MediaSummary>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM media WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(handle_db_error)?;

        let query = format!(
            r#"
            SELECT {}
            FROM media
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            SUMMARY_COLUMNS
        );

        let items = sqlx::query_as::<_, MediaSummary>(&query)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(handle_db_error)?;

        Ok((items, total))
    }

    async fn rename(
        &self,
        id: Uuid,
        owner_id: Uuid,
        name: &str,
    ) -> Result<Option<MediaSummary>> {
        let query = format!(
            r#"
            UPDATE media
            SET name = $3, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {}
            "#,
            SUMMARY_COLUMNS
        );

        sqlx::query_as::<_, MediaSummary>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM media WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(handle_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
