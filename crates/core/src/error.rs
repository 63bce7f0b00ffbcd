use crate::connection::FailureStage;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// One or more required configuration fields are absent or blank.
    #[error("Missing required fields: {}", fields.join(", "))]
    MissingField { fields: Vec<String> },

    /// An external service could not be reached or refused the session.
    #[error("Connectivity failure at {stage} stage: {message}")]
    Connectivity {
        stage: FailureStage,
        message: String,
    },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// The operation needs a session component that is not connected.
    #[error("Not connected: {0}")]
    NotConnected(String),

    /// The media service answered with a representation we cannot convert.
    #[error("Unsupported data shape: {0}")]
    UnsupportedDataShape(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
