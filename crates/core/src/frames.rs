//! Frame selection for a located recording.
//!
//! Two modes: a window of the first N frames in index order, or the single
//! frame closest in time to a target timestamp.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::catalog::{Frame, FrameCatalog};
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Frames returned when a window request does not say how many.
pub const DEFAULT_WINDOW: i64 = 5;

/// Upper bound on a single window request.
pub const MAX_WINDOW: i64 = 100;

/// Resolve an optional requested window size to a validated count.
pub fn validate_window_count(count: Option<i64>) -> Result<i64, CoreError> {
    let count = count.unwrap_or(DEFAULT_WINDOW);
    if count < 0 {
        return Err(CoreError::Validation(format!(
            "count must not be negative (got {count})"
        )));
    }
    if count > MAX_WINDOW {
        return Err(CoreError::Validation(format!(
            "count must not exceed {MAX_WINDOW} (got {count})"
        )));
    }
    Ok(count)
}

/// First `count` frames of a recording, ascending by index.
///
/// A count of zero returns an empty window without touching the catalog.
pub async fn select_window<C: FrameCatalog>(
    catalog: &C,
    recording_id: DbId,
    count: i64,
) -> Result<Vec<Frame>, C::Error> {
    if count <= 0 {
        return Ok(Vec::new());
    }
    let mut frames = catalog.frames_by_index(recording_id, count).await?;
    frames.sort_by_key(|f| f.index);
    frames.truncate(usize::try_from(count).unwrap_or(usize::MAX));
    Ok(frames)
}

/// The frame of a recording whose timestamp is nearest to `target`.
///
/// `Ok(None)` when no frame carries a timestamp.
pub async fn select_nearest<C: FrameCatalog>(
    catalog: &C,
    recording_id: DbId,
    target: Timestamp,
) -> Result<Option<Frame>, C::Error> {
    let frames = catalog.frames_by_timestamp(recording_id).await?;
    let scanned = frames.len();
    let nearest = nearest_frame(frames, target);
    tracing::debug!(
        recording_id,
        scanned,
        found = nearest.is_some(),
        "Nearest-timestamp scan complete"
    );
    Ok(nearest)
}

/// Linear scan for the smallest absolute time difference.
///
/// Frames without a timestamp are skipped. On equal distance the earlier
/// frame in scan order is kept.
pub fn nearest_frame(frames: Vec<Frame>, target: Timestamp) -> Option<Frame> {
    let mut best: Option<(chrono::Duration, Frame)> = None;
    for frame in frames {
        let Some(stamp) = frame.timestamp else {
            continue;
        };
        let diff = (stamp - target).abs();
        match &best {
            Some((best_diff, _)) if diff >= *best_diff => {}
            _ => best = Some((diff, frame)),
        }
    }
    best.map(|(_, frame)| frame)
}

/// Parse a client-supplied target time.
///
/// Accepts RFC 3339 (`2019-05-01T10:00:00Z`, with offset) or a naive
/// ISO-8601 date-time (`2019-05-01T10:00:00.250`), which is taken as UTC.
pub fn parse_target_timestamp(raw: &str) -> Result<Timestamp, CoreError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc());
        }
    }
    Err(CoreError::Validation(format!(
        "Invalid timestamp '{raw}': expected ISO-8601, e.g. 2019-05-01T10:00:00Z"
    )))
}
