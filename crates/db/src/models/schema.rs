//! Shapes returned by the diagnostics queries.

use serde::Serialize;
use sqlx::FromRow;

use super::recording::RecordingRow;

/// A table in the `public` schema.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PublicTable {
    pub table_name: String,
}

/// Snapshot of what the connected database contains.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogOverview {
    pub tables: Vec<String>,
    /// `None` when the `recordings` table is missing or unreadable.
    pub recordings_count: Option<i64>,
    pub sample_recordings: Vec<RecordingRow>,
}
