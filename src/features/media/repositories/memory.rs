use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::media::models::{Media, MediaSummary, NewMedia};
use crate::features::media::repositories::MediaRepository;

/// Map-backed repository used by service and handler tests
#[derive(Debug, Default)]
pub struct InMemoryMediaRepository {
    records: RwLock<HashMap<Uuid, Media>>,
}

impl InMemoryMediaRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl MediaRepository for InMemoryMediaRepository {
    async fn insert(&self, media: NewMedia) -> Result<MediaSummary> {
        let now = Utc::now();
        let file_size = media.file_size();
        let record = Media {
            id: media.id,
            owner_id: media.owner_id,
            name: media.name,
            file_type: media.file_type,
            content: media.content,
            file_size,
            created_at: now,
            updated_at: now,
        };
        let summary = MediaSummary::from(&record);

        self.records.write().await.insert(record.id, record);
        Ok(summary)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Media>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_summary(&self, id: Uuid) -> Result<Option<MediaSummary>> {
        Ok(self.records.read().await.get(&id).map(MediaSummary::from))
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<MediaSummary>, i64)> {
        let records = self.records.read().await;
        let mut owned: Vec<MediaSummary> = records
            .values()
            .filter(|m| m.owner_id == owner_id)
            .map(MediaSummary::from)
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = owned.len() as i64;
        let page = owned
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();

        Ok((page, total))
    }

    async fn rename(
        &self,
        id: Uuid,
        owner_id: Uuid,
        name: &str,
    ) -> Result<Option<MediaSummary>> {
        let mut records = self.records.write().await;
        match records.get_mut(&id) {
            Some(record) if record.owner_id == owner_id => {
                record.name = name.to_string();
                record.updated_at = Utc::now();
                Ok(Some(MediaSummary::from(&*record)))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool> {
        let mut records = self.records.write().await;
        match records.get(&id) {
            Some(record) if record.owner_id == owner_id => {
                records.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
