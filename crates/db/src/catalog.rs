//! PostgreSQL implementation of the core catalog traits.

use async_trait::async_trait;
use bridge_core::catalog::{Frame, FrameCatalog, Recording, RecordingCatalog};
use bridge_core::types::DbId;

use crate::repositories::{FrameRepo, RecordingRepo};
use crate::DbPool;

/// Catalog view over a connected pool.
#[derive(Clone)]
pub struct PgCatalog {
    pool: DbPool,
}

impl PgCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl RecordingCatalog for PgCatalog {
    type Error = sqlx::Error;

    async fn find_by_directory(&self, directory: &str) -> Result<Vec<Recording>, sqlx::Error> {
        let rows = RecordingRepo::find_by_directory(&self.pool, directory).await?;
        Ok(rows.into_iter().map(Recording::from).collect())
    }

    async fn find_by_final_segment(&self, segment: &str) -> Result<Vec<Recording>, sqlx::Error> {
        let rows = RecordingRepo::find_by_final_segment(&self.pool, segment).await?;
        Ok(rows.into_iter().map(Recording::from).collect())
    }

    async fn list_all(&self) -> Result<Vec<Recording>, sqlx::Error> {
        let rows = RecordingRepo::list(&self.pool).await?;
        Ok(rows.into_iter().map(Recording::from).collect())
    }
}

#[async_trait]
impl FrameCatalog for PgCatalog {
    type Error = sqlx::Error;

    async fn frames_by_index(
        &self,
        recording_id: DbId,
        limit: i64,
    ) -> Result<Vec<Frame>, sqlx::Error> {
        let rows = FrameRepo::list_by_index(&self.pool, recording_id, limit).await?;
        Ok(rows.into_iter().map(Frame::from).collect())
    }

    async fn frames_by_timestamp(&self, recording_id: DbId) -> Result<Vec<Frame>, sqlx::Error> {
        let rows = FrameRepo::list_by_timestamp(&self.pool, recording_id).await?;
        Ok(rows.into_iter().map(Frame::from).collect())
    }
}
