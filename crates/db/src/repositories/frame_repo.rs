//! Read-only queries against the `frames` table.

use bridge_core::types::DbId;
use sqlx::PgPool;

use crate::models::frame::FrameRow;

/// Column list for `frames` queries.
const COLUMNS: &str = "\
    id, recordingid, guid, \"index\", stamp, \
    latitude, longitude, altitude, azimuth";

/// Provides read access to frames.
pub struct FrameRepo;

impl FrameRepo {
    /// First `limit` frames of a recording by ascending index.
    pub async fn list_by_index(
        pool: &PgPool,
        recording_id: DbId,
        limit: i64,
    ) -> Result<Vec<FrameRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM frames WHERE recordingid = $1 \
             ORDER BY \"index\", id LIMIT $2"
        );
        sqlx::query_as::<_, FrameRow>(&query)
            .bind(recording_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// All frames of a recording by ascending timestamp; untimed frames last.
    pub async fn list_by_timestamp(
        pool: &PgPool,
        recording_id: DbId,
    ) -> Result<Vec<FrameRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM frames WHERE recordingid = $1 \
             ORDER BY stamp ASC NULLS LAST, id"
        );
        sqlx::query_as::<_, FrameRow>(&query)
            .bind(recording_id)
            .fetch_all(pool)
            .await
    }
}
