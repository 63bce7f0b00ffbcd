//! Read-only view of the recordings/frames catalog.
//!
//! The lookup and selection logic in [`crate::locator`] and [`crate::frames`]
//! only talks to the catalog through the traits below, so it runs the same
//! against PostgreSQL and against in-memory fixtures.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::types::{DbId, Timestamp};

/// A capture session in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recording {
    pub id: DbId,
    /// Path-like key, e.g. `Rotterdam360\Ladybug5plus`.
    pub directory: String,
    /// Spatial extent as text, when the catalog has one.
    pub bounding_box: Option<String>,
    pub created: Option<Timestamp>,
}

impl Recording {
    /// Human-facing name: the final segment of the directory.
    pub fn display_name(&self) -> String {
        let name = final_segment(&self.directory);
        if name.is_empty() {
            format!("Recording {}", self.id)
        } else {
            name.to_string()
        }
    }
}

/// WGS84 position of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
}

/// One captured sample of a recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub id: DbId,
    pub recording_id: DbId,
    /// Identifier the media service addresses the frame by.
    pub guid: Uuid,
    pub index: i32,
    pub timestamp: Option<Timestamp>,
    pub location: Option<GeoPoint>,
    pub azimuth: Option<f64>,
}

/// Final path segment, with `\` and `/` both treated as separators.
///
/// Trailing separators are ignored, so `A\B\` yields `B`.
pub fn final_segment(path: &str) -> &str {
    path.trim_end_matches(['\\', '/'])
        .rsplit(['\\', '/'])
        .next()
        .unwrap_or("")
}

/// Recording lookups used by the locator.
///
/// Every method returns rows in the store's natural order.
#[async_trait]
pub trait RecordingCatalog: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Recordings whose directory equals `directory` exactly.
    async fn find_by_directory(&self, directory: &str) -> Result<Vec<Recording>, Self::Error>;

    /// Recordings whose directory ends in the segment `segment`.
    async fn find_by_final_segment(&self, segment: &str) -> Result<Vec<Recording>, Self::Error>;

    /// Every recording.
    async fn list_all(&self) -> Result<Vec<Recording>, Self::Error>;
}

/// Frame lookups used by the selector.
#[async_trait]
pub trait FrameCatalog: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// At most `limit` frames of a recording, ascending by index.
    async fn frames_by_index(
        &self,
        recording_id: DbId,
        limit: i64,
    ) -> Result<Vec<Frame>, Self::Error>;

    /// All frames of a recording, ascending by timestamp.
    async fn frames_by_timestamp(&self, recording_id: DbId) -> Result<Vec<Frame>, Self::Error>;
}
