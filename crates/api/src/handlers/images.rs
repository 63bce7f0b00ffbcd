//! Spherical image endpoints.
//!
//! Both endpoints run the same pipeline: locate the recording, select
//! frames, fetch each frame from Horus and return base64 JPEG.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use bridge_core::catalog::Recording;
use bridge_core::error::CoreError;
use bridge_core::frames::{parse_target_timestamp, select_nearest, select_window, validate_window_count};
use bridge_core::imaging::{fetch_batch, fetch_image, ImageBatch, ImageResult, ViewRequest};
use bridge_core::locator::{locate, LookupStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /images`.
#[derive(Debug, Deserialize)]
pub struct ImagesRequest {
    pub recording_endpoint: String,
    pub count: Option<i64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub yaw: Option<f64>,
    pub pitch: Option<f64>,
    pub fov: Option<f64>,
}

/// Query of `GET /image/{*target}`.
#[derive(Debug, Default, Deserialize)]
pub struct ImageParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    pub recording: Recording,
    pub strategy: LookupStrategy,
    #[serde(flatten)]
    pub batch: ImageBatch,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub recording: Recording,
    pub strategy: LookupStrategy,
    pub image: ImageResult,
}

/// Split `<recording key>/<timestamp>` at the last `/`.
pub fn split_target(target: &str) -> Result<(&str, &str), CoreError> {
    match target.rsplit_once('/') {
        Some((key, timestamp)) if !key.trim().is_empty() && !timestamp.trim().is_empty() => {
            Ok((key, timestamp))
        }
        _ => Err(CoreError::Validation(format!(
            "Expected '<recording>/<timestamp>', got '{target}'"
        ))),
    }
}

/// POST /api/v1/images
///
/// Fetch the first `count` frames (default 5) of a recording. Frames that
/// fail are listed under `failures`; the call only fails when every
/// requested frame did.
pub async fn fetch_images(
    State(state): State<AppState>,
    Json(input): Json<ImagesRequest>,
) -> AppResult<impl IntoResponse> {
    let count = validate_window_count(input.count)?;
    let view = ViewRequest::from_parts(input.width, input.height, input.yaw, input.pitch, input.fov)?;

    let session = state.session.require().await?;
    let source = session.image_source()?;

    let located = locate(&session.catalog, &input.recording_endpoint).await?;
    let frames = select_window(&session.catalog, located.recording.id, count).await?;

    tracing::info!(
        recording_id = located.recording.id,
        strategy = ?located.strategy,
        frames = frames.len(),
        "Fetching images",
    );

    let batch = fetch_batch(source, &frames, &view).await;
    if batch.is_total_failure() {
        let first = batch
            .failures
            .first()
            .map(|f| f.reason.as_str())
            .unwrap_or("unknown error");
        return Err(AppError::Core(CoreError::Upstream(format!(
            "All {} requested frames failed; first error: {first}",
            batch.requested
        ))));
    }

    Ok(Json(DataResponse {
        data: ImagesResponse {
            recording: located.recording,
            strategy: located.strategy,
            batch,
        },
    }))
}

/// GET /api/v1/image/{*target}?width=&height=
///
/// The frame nearest in time to the timestamp in `target`.
pub async fn image_by_timestamp(
    State(state): State<AppState>,
    Path(target): Path<String>,
    Query(params): Query<ImageParams>,
) -> AppResult<impl IntoResponse> {
    let (key, raw_timestamp) = split_target(&target)?;
    let timestamp = parse_target_timestamp(raw_timestamp)?;
    let view = ViewRequest::from_parts(params.width, params.height, None, None, None)?;

    let session = state.session.require().await?;
    let source = session.image_source()?;

    let located = locate(&session.catalog, key).await?;
    let frame = select_nearest(&session.catalog, located.recording.id, timestamp)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Frame",
            key: format!("nearest to {raw_timestamp} in {}", located.recording.directory),
        })?;

    tracing::info!(
        recording_id = located.recording.id,
        frame_index = frame.index,
        %timestamp,
        "Fetching image by timestamp",
    );

    let image = fetch_image(source, &frame, &view, 0)
        .await
        .map_err(CoreError::from)?;

    Ok(Json(DataResponse {
        data: ImageResponse {
            recording: located.recording,
            strategy: located.strategy,
            image,
        },
    }))
}
