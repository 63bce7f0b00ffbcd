//! Open a catalog connection from user-supplied parameters.
//!
//! The resolver validates the parameters, checks that the TCP endpoint is
//! reachable, then tries each SSL variant in [`SSL_ATTEMPT_ORDER`] once. The
//! first variant that connects and passes a verification query wins. Every
//! failed step is recorded in a [`ConnectionReport`] so the client can see
//! how far each attempt got.

use std::time::Duration;

use bridge_core::config::ConnectionConfig;
use bridge_core::connection::{
    stage_for_sqlstate, ConnectionReport, FailureStage, SslPreference, SSL_ATTEMPT_ORDER,
};
use bridge_core::error::CoreError;
use serde::Serialize;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use tokio::net::TcpStream;

use crate::repositories::SchemaRepo;
use crate::DbPool;

/// Budget for the initial reachability check.
pub const REACHABILITY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default budget for a single connect attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Label recorded for the reachability check.
const REACHABILITY_VARIANT: &str = "tcp connect";

/// A verified connection.
#[derive(Debug)]
pub struct Resolved {
    pub pool: DbPool,
    pub ssl: SslPreference,
    pub database: String,
    pub user: String,
    pub report: ConnectionReport,
}

/// Server details reported by a connection test.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionTestResult {
    pub database: String,
    pub user: String,
    pub server_version: String,
    pub report: ConnectionReport,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The parameters were rejected before any network activity.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// Every attempt failed.
    #[error("{}", .report.summary())]
    Failed { report: ConnectionReport },
}

impl ResolveError {
    /// Failure stage to report for this error.
    pub fn stage(&self) -> FailureStage {
        match self {
            ResolveError::Invalid(_) => FailureStage::MalformedRequest,
            ResolveError::Failed { report } => report
                .dominant_stage()
                .unwrap_or(FailureStage::Network),
        }
    }
}

fn ssl_mode(preference: SslPreference) -> PgSslMode {
    match preference {
        SslPreference::Prefer => PgSslMode::Prefer,
        SslPreference::Require => PgSslMode::Require,
        SslPreference::Disable => PgSslMode::Disable,
    }
}

fn variant_label(preference: SslPreference) -> String {
    format!("sslmode={preference}")
}

/// Map a connect error to the layer it failed at.
pub fn classify_connect_error(err: &sqlx::Error) -> FailureStage {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => FailureStage::Network,
        sqlx::Error::Tls(_) | sqlx::Error::Protocol(_) => FailureStage::ServiceHandshake,
        sqlx::Error::Database(db_err) => db_err
            .code()
            .map(|code| stage_for_sqlstate(&code))
            .unwrap_or(FailureStage::MalformedRequest),
        sqlx::Error::Configuration(_) => FailureStage::MalformedRequest,
        _ => FailureStage::ServiceHandshake,
    }
}

fn connect_options(config: &ConnectionConfig, port: u16, ssl: SslPreference) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(config.host.trim())
        .port(port)
        .database(config.database.trim())
        .username(config.user.trim())
        .password(&config.password)
        .ssl_mode(ssl_mode(ssl))
        .application_name("horus-bridge")
}

/// Check that `host:port` accepts TCP connections.
async fn check_reachable(host: &str, port: u16) -> Result<(), String> {
    match tokio::time::timeout(REACHABILITY_TIMEOUT, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => Ok(()),
        Ok(Err(e)) => Err(format!("{host}:{port} is not reachable: {e}")),
        Err(_) => Err(format!(
            "{host}:{port} did not answer within {}s",
            REACHABILITY_TIMEOUT.as_secs()
        )),
    }
}

/// Connect to the catalog described by `config`.
///
/// Returns a pool limited to a single connection. No pool is left open when
/// an error is returned.
pub async fn resolve(
    config: &ConnectionConfig,
    connect_timeout: Duration,
) -> Result<Resolved, ResolveError> {
    let port = config.validate()?;
    let host = config.host.trim();
    let mut report = ConnectionReport::new(format!(
        "{host}:{port}/{} as {}",
        config.database.trim(),
        config.user.trim()
    ));

    tracing::info!(db_target = %report.target, "Resolving database connection");

    if let Err(message) = check_reachable(host, port).await {
        tracing::warn!(db_target = %report.target, %message, "Database endpoint unreachable");
        report.record_failure(REACHABILITY_VARIANT, FailureStage::Network, message);
        return Err(ResolveError::Failed { report });
    }

    for ssl in SSL_ATTEMPT_ORDER {
        let variant = variant_label(ssl);
        let pool = match PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(connect_timeout)
            .connect_with(connect_options(config, port, ssl))
            .await
        {
            Ok(pool) => pool,
            Err(e) => {
                let stage = classify_connect_error(&e);
                tracing::warn!(%variant, %stage, error = %e, "Database connect attempt failed");
                report.record_failure(variant, stage, e.to_string());
                continue;
            }
        };

        let verified: Result<(String, String), sqlx::Error> =
            sqlx::query_as("SELECT current_database()::text, current_user::text")
                .fetch_one(&pool)
                .await;

        match verified {
            Ok((database, user)) => {
                tracing::info!(%variant, %database, %user, "Database connection verified");
                report.succeeded_with = Some(variant);
                return Ok(Resolved {
                    pool,
                    ssl,
                    database,
                    user,
                    report,
                });
            }
            Err(e) => {
                pool.close().await;
                let stage = classify_connect_error(&e);
                tracing::warn!(%variant, %stage, error = %e, "Database verification query failed");
                report.record_failure(variant, stage, e.to_string());
            }
        }
    }

    tracing::error!(summary = %report.summary(), "All database connect attempts failed");
    Err(ResolveError::Failed { report })
}

/// Connect, read the server version, and disconnect again.
pub async fn test_connection(
    config: &ConnectionConfig,
    connect_timeout: Duration,
) -> Result<ConnectionTestResult, ResolveError> {
    let resolved = resolve(config, connect_timeout).await?;
    let version = SchemaRepo::server_version(&resolved.pool).await;
    resolved.pool.close().await;

    match version {
        Ok(server_version) => Ok(ConnectionTestResult {
            database: resolved.database,
            user: resolved.user,
            server_version,
            report: resolved.report,
        }),
        Err(e) => {
            let mut report = resolved.report;
            let variant = report.succeeded_with.take().unwrap_or_default();
            report.record_failure(variant, classify_connect_error(&e), e.to_string());
            Err(ResolveError::Failed { report })
        }
    }
}
