//! The active catalog + media session.
//!
//! Handlers never reach for a global connection. Each request takes an
//! `Arc<BridgeSession>` snapshot from the [`SessionSlot`] on entry and keeps
//! using that snapshot, so a concurrent reconnect cannot hand one request
//! two different sessions.

use std::sync::Arc;

use bridge_core::error::CoreError;
use bridge_core::types::Timestamp;
use bridge_db::{DbPool, PgCatalog};
use bridge_horus::HorusClient;
use tokio::sync::RwLock;

/// One connected database pool plus, optionally, a Horus client.
pub struct BridgeSession {
    pub catalog: PgCatalog,
    /// Database name as reported by the server.
    pub database: String,
    /// Role name as reported by the server.
    pub user: String,
    /// `None` when the Horus handshake failed or was not attempted.
    pub horus: Option<HorusClient>,
    pub connected_at: Timestamp,
}

impl BridgeSession {
    pub fn new(
        pool: DbPool,
        database: String,
        user: String,
        horus: Option<HorusClient>,
    ) -> Self {
        Self {
            catalog: PgCatalog::new(pool),
            database,
            user,
            horus,
            connected_at: chrono::Utc::now(),
        }
    }

    pub fn pool(&self) -> &DbPool {
        self.catalog.pool()
    }

    /// The Horus client, or `NotConnected` if the session has none.
    pub fn image_source(&self) -> Result<&HorusClient, CoreError> {
        self.horus.as_ref().ok_or_else(|| {
            CoreError::NotConnected(
                "Horus media service is not connected; call /api/v1/connect first".to_string(),
            )
        })
    }

    pub async fn close(&self) {
        self.pool().close().await;
        tracing::info!(database = %self.database, "Session closed");
    }
}

/// Holder for the current session.
#[derive(Default)]
pub struct SessionSlot {
    inner: RwLock<Option<Arc<BridgeSession>>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self) -> Option<Arc<BridgeSession>> {
        self.inner.read().await.clone()
    }

    /// Snapshot of the current session, or `NotConnected`.
    pub async fn require(&self) -> Result<Arc<BridgeSession>, CoreError> {
        self.current().await.ok_or_else(|| {
            CoreError::NotConnected(
                "No database session; call /api/v1/connect first".to_string(),
            )
        })
    }

    /// Install `session` and close whatever it replaced.
    pub async fn replace(&self, session: BridgeSession) -> Arc<BridgeSession> {
        let session = Arc::new(session);
        let previous = self.inner.write().await.replace(Arc::clone(&session));
        if let Some(previous) = previous {
            previous.close().await;
        }
        session
    }

    /// Remove and close the current session. Returns it if there was one.
    pub async fn take(&self) -> Option<Arc<BridgeSession>> {
        let previous = self.inner.write().await.take();
        if let Some(session) = &previous {
            session.close().await;
        }
        previous
    }
}
