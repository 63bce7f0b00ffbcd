//! Connection attempt plan and failure diagnostics.
//!
//! Pure logic shared by the database resolver and the Horus handshake: the
//! fixed order of SSL variants, the failure stage taxonomy, and the
//! per-attempt report handed back to clients.

use std::fmt;

use serde::Serialize;

/// Layer at which a connection attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// TCP endpoint unreachable, refused, or timed out.
    Network,
    /// Something answered but the protocol/TLS handshake did not complete.
    ServiceHandshake,
    /// The service rejected the credentials.
    Authentication,
    /// The request itself was rejected (bad parameters, unknown database).
    MalformedRequest,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureStage::Network => "network",
            FailureStage::ServiceHandshake => "service_handshake",
            FailureStage::Authentication => "authentication",
            FailureStage::MalformedRequest => "malformed_request",
        };
        f.write_str(label)
    }
}

/// Classify a PostgreSQL SQLSTATE code returned while connecting.
///
/// Class `28` (invalid authorization) is an authentication failure; class
/// `08` (connection exception) and `57P03` (cannot connect now) are handshake
/// failures. Everything else the server rejects is a malformed request.
pub fn stage_for_sqlstate(code: &str) -> FailureStage {
    if code.starts_with("28") {
        FailureStage::Authentication
    } else if code.starts_with("08") || code == "57P03" {
        FailureStage::ServiceHandshake
    } else {
        FailureStage::MalformedRequest
    }
}

/// Classify an HTTP status returned by a service handshake.
pub fn stage_for_http_status(status: u16) -> FailureStage {
    match status {
        401 | 403 | 407 => FailureStage::Authentication,
        400 | 404 | 405 | 422 => FailureStage::MalformedRequest,
        _ => FailureStage::ServiceHandshake,
    }
}

/// SSL negotiation variant used for one database connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SslPreference {
    Prefer,
    Require,
    Disable,
}

/// Order in which SSL variants are tried. Each variant is tried once.
pub const SSL_ATTEMPT_ORDER: [SslPreference; 3] = [
    SslPreference::Prefer,
    SslPreference::Require,
    SslPreference::Disable,
];

impl fmt::Display for SslPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SslPreference::Prefer => "prefer",
            SslPreference::Require => "require",
            SslPreference::Disable => "disable",
        };
        f.write_str(label)
    }
}

/// Outcome of a single failed attempt.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptFailure {
    /// Human label of what was tried, e.g. `sslmode=require` or `tcp connect`.
    pub variant: String,
    pub stage: FailureStage,
    pub message: String,
}

/// Accumulated attempt history for one resolve call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConnectionReport {
    /// Secret-free description of the target, e.g. `host:5432/db as user`.
    pub target: String,
    pub failures: Vec<AttemptFailure>,
    /// Variant that finally succeeded, if any.
    pub succeeded_with: Option<String>,
}

impl ConnectionReport {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn record_failure(
        &mut self,
        variant: impl Into<String>,
        stage: FailureStage,
        message: impl Into<String>,
    ) {
        self.failures.push(AttemptFailure {
            variant: variant.into(),
            stage,
            message: message.into(),
        });
    }

    /// Stage of the most informative failure.
    ///
    /// Later attempts got at least as far as earlier ones, so the deepest
    /// stage reached wins: authentication beats handshake beats network.
    pub fn dominant_stage(&self) -> Option<FailureStage> {
        self.failures
            .iter()
            .map(|f| f.stage)
            .max_by_key(|stage| match stage {
                FailureStage::Network => 0,
                FailureStage::ServiceHandshake => 1,
                FailureStage::MalformedRequest => 2,
                FailureStage::Authentication => 3,
            })
    }

    pub fn summary(&self) -> String {
        match (&self.succeeded_with, self.failures.len()) {
            (Some(variant), 0) => format!("Connected to {} ({variant})", self.target),
            (Some(variant), n) => format!(
                "Connected to {} ({variant}) after {n} failed attempt(s)",
                self.target
            ),
            (None, n) => format!("All {n} connection attempt(s) to {} failed", self.target),
        }
    }
}
