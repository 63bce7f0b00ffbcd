//! Spherical image retrieval and normalisation to JPEG.
//!
//! An image source answers with one of several payload shapes; each shape
//! has exactly one conversion path to JPEG bytes, which are then base64
//! encoded for JSON transport.

use std::fmt;

use async_trait::async_trait;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::catalog::Frame;
use crate::error::CoreError;
use crate::types::Timestamp;

pub const DEFAULT_IMAGE_SIZE: u32 = 600;
pub const MAX_IMAGE_SIZE: u32 = 4096;
pub const DEFAULT_YAW: f64 = 0.0;
pub const DEFAULT_PITCH: f64 = -30.0;
pub const DEFAULT_HORIZONTAL_FOV: f64 = 90.0;

/// MIME type of every produced image.
pub const JPEG_MIME: &str = "image/jpeg";

const JPEG_QUALITY: u8 = 90;
const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

/* --------------------------------------------------------------------------
View parameters
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Camera parameters for one spherical render. Request-level, not per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewRequest {
    pub size: ImageSize,
    pub yaw: f64,
    pub pitch: f64,
    pub horizontal_fov: f64,
}

impl Default for ViewRequest {
    fn default() -> Self {
        Self {
            size: ImageSize {
                width: DEFAULT_IMAGE_SIZE,
                height: DEFAULT_IMAGE_SIZE,
            },
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            horizontal_fov: DEFAULT_HORIZONTAL_FOV,
        }
    }
}

impl ViewRequest {
    /// Build a view from optional client values, filling in defaults.
    pub fn from_parts(
        width: Option<u32>,
        height: Option<u32>,
        yaw: Option<f64>,
        pitch: Option<f64>,
        horizontal_fov: Option<f64>,
    ) -> Result<Self, CoreError> {
        let defaults = Self::default();
        let view = Self {
            size: ImageSize {
                width: width.unwrap_or(defaults.size.width),
                height: height.unwrap_or(defaults.size.height),
            },
            yaw: yaw.unwrap_or(defaults.yaw),
            pitch: pitch.unwrap_or(defaults.pitch),
            horizontal_fov: horizontal_fov.unwrap_or(defaults.horizontal_fov),
        };
        view.validate()?;
        Ok(view)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, value) in [("width", self.size.width), ("height", self.size.height)] {
            if value == 0 || value > MAX_IMAGE_SIZE {
                return Err(CoreError::Validation(format!(
                    "{name} must be between 1 and {MAX_IMAGE_SIZE} (got {value})"
                )));
            }
        }
        if !(self.horizontal_fov > 0.0 && self.horizontal_fov <= 180.0) {
            return Err(CoreError::Validation(format!(
                "fov must be in (0, 180] degrees (got {})",
                self.horizontal_fov
            )));
        }
        if !(-90.0..=90.0).contains(&self.pitch) {
            return Err(CoreError::Validation(format!(
                "pitch must be within [-90, 90] degrees (got {})",
                self.pitch
            )));
        }
        if !self.yaw.is_finite() {
            return Err(CoreError::Validation("yaw must be a finite number".to_string()));
        }
        Ok(())
    }
}

/* --------------------------------------------------------------------------
Payloads
-------------------------------------------------------------------------- */

/// What an image source hands back for one frame.
pub enum MediaPayload {
    /// Complete encoded image bytes.
    RawBytes(Vec<u8>),
    /// Encoded image bytes still arriving from the source.
    BufferedStream(Box<dyn AsyncRead + Send + Unpin>),
    /// An already decoded raster.
    DecodedImage(DynamicImage),
}

impl fmt::Debug for MediaPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaPayload::RawBytes(bytes) => write!(f, "RawBytes({} bytes)", bytes.len()),
            MediaPayload::BufferedStream(_) => f.write_str("BufferedStream(..)"),
            MediaPayload::DecodedImage(img) => {
                write!(f, "DecodedImage({}x{})", img.width(), img.height())
            }
        }
    }
}

/// Why a single frame could not be turned into an image.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Source(#[from] CoreError),

    #[error("Image payload was empty")]
    Empty,

    #[error("Could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Could not read image stream: {0}")]
    Stream(#[from] std::io::Error),
}

impl From<FetchError> for CoreError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Source(core) => core,
            other => CoreError::Upstream(other.to_string()),
        }
    }
}

impl MediaPayload {
    /// Convert the payload to JPEG bytes.
    ///
    /// JPEG input passes through untouched; anything else decodable is
    /// re-encoded. Alpha is dropped.
    pub async fn into_jpeg(self) -> Result<Vec<u8>, FetchError> {
        match self {
            MediaPayload::RawBytes(bytes) => bytes_to_jpeg(bytes),
            MediaPayload::BufferedStream(mut reader) => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes).await?;
                bytes_to_jpeg(bytes)
            }
            MediaPayload::DecodedImage(img) => Ok(encode_jpeg(&img)?),
        }
    }
}

fn bytes_to_jpeg(bytes: Vec<u8>) -> Result<Vec<u8>, FetchError> {
    if bytes.is_empty() {
        return Err(FetchError::Empty);
    }
    if bytes.starts_with(&JPEG_MAGIC) {
        // Forwarded as-is only once it decodes.
        image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg)?;
        return Ok(bytes);
    }
    let img = image::load_from_memory(&bytes)?;
    Ok(encode_jpeg(&img)?)
}

fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&rgb)?;
    Ok(out)
}

/* --------------------------------------------------------------------------
Source seam
-------------------------------------------------------------------------- */

/// Anything that can render a spherical view of a frame.
#[async_trait]
pub trait SphericalImageSource: Send + Sync {
    async fn request(&self, frame: &Frame, view: &ViewRequest)
        -> Result<MediaPayload, CoreError>;
}

/* --------------------------------------------------------------------------
Results
-------------------------------------------------------------------------- */

/// One transport-ready image.
#[derive(Debug, Clone, Serialize)]
pub struct ImageResult {
    /// Position within the response.
    pub index: usize,
    /// Base64 JPEG.
    pub data: String,
    pub format: &'static str,
    pub timestamp: Option<Timestamp>,
    pub frame_index: i32,
    pub frame_guid: uuid::Uuid,
    pub byte_len: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameFailure {
    pub index: usize,
    pub frame_index: i32,
    pub reason: String,
}

/// Outcome of fetching a window of frames.
#[derive(Debug, Clone, Serialize)]
pub struct ImageBatch {
    pub images: Vec<ImageResult>,
    pub requested: usize,
    pub produced: usize,
    pub failures: Vec<FrameFailure>,
}

impl ImageBatch {
    /// Every requested frame failed. An empty request is not a failure.
    pub fn is_total_failure(&self) -> bool {
        self.requested > 0 && self.produced == 0
    }
}

/// Fetch and encode the image for a single frame.
pub async fn fetch_image<S: SphericalImageSource + ?Sized>(
    source: &S,
    frame: &Frame,
    view: &ViewRequest,
    index: usize,
) -> Result<ImageResult, FetchError> {
    let payload = source.request(frame, view).await?;
    let jpeg = payload.into_jpeg().await?;
    Ok(ImageResult {
        index,
        byte_len: jpeg.len(),
        data: base64::engine::general_purpose::STANDARD.encode(&jpeg),
        format: JPEG_MIME,
        timestamp: frame.timestamp,
        frame_index: frame.index,
        frame_guid: frame.guid,
    })
}

/// Fetch every frame in order. Per-frame failures are logged and skipped.
pub async fn fetch_batch<S: SphericalImageSource + ?Sized>(
    source: &S,
    frames: &[Frame],
    view: &ViewRequest,
) -> ImageBatch {
    let mut images = Vec::with_capacity(frames.len());
    let mut failures = Vec::new();

    for (index, frame) in frames.iter().enumerate() {
        match fetch_image(source, frame, view, index).await {
            Ok(image) => images.push(image),
            Err(e) => {
                tracing::warn!(
                    index,
                    frame_id = frame.id,
                    frame_index = frame.index,
                    error = %e,
                    "Skipping frame that failed to render",
                );
                failures.push(FrameFailure {
                    index,
                    frame_index: frame.index,
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::debug!(
        requested = frames.len(),
        produced = images.len(),
        "Image batch complete"
    );

    ImageBatch {
        requested: frames.len(),
        produced: images.len(),
        images,
        failures,
    }
}
