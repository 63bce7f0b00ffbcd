use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bridge_core::error::CoreError;
use bridge_core::locator::{LookupAttempt, LookupError};
use bridge_db::resolver::ResolveError;
use serde_json::{json, Value};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses of
/// the form `{"error": ..., "code": ..., "details"?: ...}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `bridge_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No recording matched a search key.
    #[error("No recording found for '{key}'")]
    RecordingNotFound {
        key: String,
        attempts: Vec<LookupAttempt>,
    },

    /// Opening a database connection failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<LookupError<sqlx::Error>> for AppError {
    fn from(err: LookupError<sqlx::Error>) -> Self {
        match err {
            LookupError::Invalid(core) => AppError::Core(core),
            LookupError::NotFound { key, attempts } => AppError::RecordingNotFound { key, attempts },
            LookupError::Catalog(db) => AppError::Database(db),
        }
    }
}

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            AppError::RecordingNotFound { attempts, .. } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                self.to_string(),
                Some(json!({ "attempts": attempts })),
            ),

            AppError::Resolve(err) => match err {
                ResolveError::Invalid(core) => classify_core_error(core),
                ResolveError::Failed { report } => (
                    StatusCode::BAD_GATEWAY,
                    "CONNECTIVITY_ERROR",
                    report.summary(),
                    Some(json!({
                        "stage": err.stage(),
                        "attempts": report.failures,
                    })),
                ),
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, axum::Json(body)).into_response()
    }
}

type Classified = (StatusCode, &'static str, String, Option<Value>);

fn classify_core_error(core: &CoreError) -> Classified {
    match core {
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None),
        CoreError::MissingField { fields } => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            core.to_string(),
            Some(json!({ "fields": fields })),
        ),
        CoreError::Connectivity { stage, message } => (
            StatusCode::BAD_GATEWAY,
            "CONNECTIVITY_ERROR",
            message.clone(),
            Some(json!({ "stage": stage })),
        ),
        CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", core.to_string(), None),
        CoreError::NotConnected(msg) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "NOT_CONNECTED",
            msg.clone(),
            None,
        ),
        CoreError::UnsupportedDataShape(content_type) => (
            StatusCode::BAD_GATEWAY,
            "UNSUPPORTED_DATA_SHAPE",
            core.to_string(),
            Some(json!({ "content_type": content_type })),
        ),
        CoreError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone(), None),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
                None,
            )
        }
    }
}

/// Classify a sqlx error raised while serving a request.
///
/// - `RowNotFound` maps to 404.
/// - A closed pool means the session was torn down mid-request: 503.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> Classified {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
            None,
        ),
        sqlx::Error::PoolClosed => (
            StatusCode::SERVICE_UNAVAILABLE,
            "NOT_CONNECTED",
            "The database session was closed".to_string(),
            None,
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
                None,
            )
        }
    }
}
