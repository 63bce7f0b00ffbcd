//! Read-only queries against the `recordings` table.

use sqlx::PgPool;

use crate::models::recording::RecordingRow;

/// Column list for `recordings` queries.
const COLUMNS: &str = "id, directory, boundingbox, created";

/// Final path segment of `directory`, treating `\` and `/` as separators.
const FINAL_SEGMENT: &str = r"regexp_replace(rtrim(directory, '\/'), '^.*[\\/]', '')";

/// Provides read access to recordings.
pub struct RecordingRepo;

impl RecordingRepo {
    /// All recordings, in id order.
    pub async fn list(pool: &PgPool) -> Result<Vec<RecordingRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recordings ORDER BY id");
        sqlx::query_as::<_, RecordingRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Recordings whose directory equals `directory` exactly.
    pub async fn find_by_directory(
        pool: &PgPool,
        directory: &str,
    ) -> Result<Vec<RecordingRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recordings WHERE directory = $1 ORDER BY id");
        sqlx::query_as::<_, RecordingRow>(&query)
            .bind(directory)
            .fetch_all(pool)
            .await
    }

    /// Recordings whose directory's last segment equals `segment`.
    pub async fn find_by_final_segment(
        pool: &PgPool,
        segment: &str,
    ) -> Result<Vec<RecordingRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM recordings WHERE {FINAL_SEGMENT} = $1 ORDER BY id"
        );
        sqlx::query_as::<_, RecordingRow>(&query)
            .bind(segment)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recordings")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// First `limit` recordings by id.
    pub async fn sample(pool: &PgPool, limit: i64) -> Result<Vec<RecordingRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recordings ORDER BY id LIMIT $1");
        sqlx::query_as::<_, RecordingRow>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
