use bridge_core::catalog::Recording;
use bridge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `recordings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecordingRow {
    pub id: DbId,
    pub directory: String,
    pub boundingbox: Option<String>,
    pub created: Option<Timestamp>,
}

impl From<RecordingRow> for Recording {
    fn from(row: RecordingRow) -> Self {
        Recording {
            id: row.id,
            directory: row.directory,
            bounding_box: row.boundingbox,
            created: row.created,
        }
    }
}
