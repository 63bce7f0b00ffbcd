//! Server and schema introspection used by the diagnostics endpoints.

use sqlx::PgPool;

use crate::models::schema::{CatalogOverview, PublicTable};
use crate::repositories::RecordingRepo;

/// Rows shown in the overview sample.
pub const SAMPLE_LIMIT: i64 = 10;

pub struct SchemaRepo;

impl SchemaRepo {
    /// Names of the tables in the `public` schema, alphabetically.
    pub async fn public_tables(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        let rows = sqlx::query_as::<_, PublicTable>(
            "SELECT table_name::text AS table_name FROM information_schema.tables \
             WHERE table_schema = 'public' ORDER BY table_name",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|t| t.table_name).collect())
    }

    /// `SELECT version()`.
    pub async fn server_version(pool: &PgPool) -> Result<String, sqlx::Error> {
        let (version,): (String,) = sqlx::query_as("SELECT version()").fetch_one(pool).await?;
        Ok(version)
    }

    /// Tables, recording count and a handful of recordings.
    ///
    /// A missing `recordings` table is reported in the result, not as an
    /// error, so the overview stays useful against the wrong database.
    pub async fn overview(pool: &PgPool) -> Result<CatalogOverview, sqlx::Error> {
        let tables = Self::public_tables(pool).await?;

        if !tables.iter().any(|t| t == "recordings") {
            tracing::warn!("No recordings table in public schema");
            return Ok(CatalogOverview {
                tables,
                recordings_count: None,
                sample_recordings: Vec::new(),
            });
        }

        let recordings_count = RecordingRepo::count(pool).await?;
        let sample_recordings = RecordingRepo::sample(pool, SAMPLE_LIMIT).await?;

        Ok(CatalogOverview {
            tables,
            recordings_count: Some(recordings_count),
            sample_recordings,
        })
    }
}
