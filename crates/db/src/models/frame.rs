use bridge_core::catalog::{Frame, GeoPoint};
use bridge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `frames` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FrameRow {
    pub id: DbId,
    pub recordingid: DbId,
    pub guid: Uuid,
    pub index: i32,
    pub stamp: Option<Timestamp>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub azimuth: Option<f64>,
}

impl From<FrameRow> for Frame {
    fn from(row: FrameRow) -> Self {
        // A position needs both coordinates; altitude alone is dropped.
        let location = match (row.latitude, row.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
                altitude: row.altitude,
            }),
            _ => None,
        };

        Frame {
            id: row.id,
            recording_id: row.recordingid,
            guid: row.guid,
            index: row.index,
            timestamp: row.stamp,
            location,
            azimuth: row.azimuth,
        }
    }
}
