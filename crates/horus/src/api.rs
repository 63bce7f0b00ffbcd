//! REST client for the Horus web service endpoints.

use std::time::Duration;

use async_trait::async_trait;
use bridge_core::catalog::Frame;
use bridge_core::config::HorusConfig;
use bridge_core::connection::{stage_for_http_status, FailureStage};
use bridge_core::error::CoreError;
use bridge_core::imaging::{MediaPayload, SphericalImageSource, ViewRequest};
use bridge_core::types::DbId;
use uuid::Uuid;

use crate::payload;

/// HTTP client for one Horus web service.
#[derive(Clone)]
pub struct HorusClient {
    client: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

/// Errors from the Horus REST layer.
#[derive(Debug, thiserror::Error)]
pub enum HorusApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Horus returned a non-2xx status code.
    #[error("Horus API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// The response carried a content type we cannot turn into an image.
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Could not decode image: {0}")]
    Decode(#[from] image::ImageError),
}

impl HorusApiError {
    /// Layer at which the call failed.
    pub fn stage(&self) -> FailureStage {
        match self {
            HorusApiError::Request(e) if e.is_connect() || e.is_timeout() => FailureStage::Network,
            HorusApiError::Request(e) if e.is_builder() => FailureStage::MalformedRequest,
            HorusApiError::Request(_) => FailureStage::ServiceHandshake,
            HorusApiError::ApiError { status, .. } => stage_for_http_status(*status),
            HorusApiError::UnsupportedContentType(_) | HorusApiError::Decode(_) => {
                FailureStage::ServiceHandshake
            }
        }
    }
}

impl From<HorusApiError> for CoreError {
    fn from(err: HorusApiError) -> Self {
        match err {
            HorusApiError::UnsupportedContentType(content_type) => {
                CoreError::UnsupportedDataShape(content_type)
            }
            HorusApiError::Request(ref e) if e.is_connect() || e.is_timeout() => {
                CoreError::Connectivity {
                    stage: FailureStage::Network,
                    message: err.to_string(),
                }
            }
            other => CoreError::Upstream(other.to_string()),
        }
    }
}

impl HorusClient {
    /// Build a client for `config`. Validates the config first.
    pub fn new(config: &HorusConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, config))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &HorusConfig) -> Self {
        Self {
            client,
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the service root answers with a success status.
    pub async fn handshake(&self) -> Result<(), HorusApiError> {
        let response = self
            .authorized(self.client.get(format!("{}/", self.base_url)))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        tracing::info!(base_url = %self.base_url, "Horus handshake succeeded");
        Ok(())
    }

    /// Render a spherical view of one frame.
    ///
    /// Sends `GET {base}/images/{recording_id}/{frame_guid}` with the view
    /// parameters as query arguments.
    pub async fn request_spherical_image(
        &self,
        recording_id: DbId,
        frame_guid: Uuid,
        view: &ViewRequest,
    ) -> Result<MediaPayload, HorusApiError> {
        let url = self.image_url(recording_id, frame_guid);
        let response = self
            .authorized(self.client.get(&url))
            .query(&Self::view_query(view))
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        payload::into_payload(response).await
    }

    pub fn image_url(&self, recording_id: DbId, frame_guid: Uuid) -> String {
        format!("{}/images/{recording_id}/{frame_guid}", self.base_url)
    }

    fn view_query(view: &ViewRequest) -> [(&'static str, String); 5] {
        [
            ("mode", "spherical".to_string()),
            ("size", format!("{}x{}", view.size.width, view.size.height)),
            ("yaw", view.yaw.to_string()),
            ("pitch", view.pitch.to_string()),
            ("hor_fov", view.horizontal_fov.to_string()),
        ]
    }

    // ---- private helpers ----

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.username {
            Some(user) => request.basic_auth(user, self.password.as_deref()),
            None => request,
        }
    }

    /// Return the response unchanged on success, or an
    /// [`HorusApiError::ApiError`] with the status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, HorusApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(HorusApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl SphericalImageSource for HorusClient {
    async fn request(&self, frame: &Frame, view: &ViewRequest) -> Result<MediaPayload, CoreError> {
        self.request_spherical_image(frame.recording_id, frame.guid, view)
            .await
            .map_err(|e| {
                tracing::debug!(frame_id = frame.id, error = %e, "Horus image request failed");
                CoreError::from(e)
            })
    }
}
