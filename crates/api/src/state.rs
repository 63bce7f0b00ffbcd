use std::sync::Arc;

use bridge_core::config::BridgeSettings;
use tokio::sync::RwLock;

use crate::config::ServerConfig;
use crate::session::SessionSlot;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Connection settings; replaced wholesale on every update.
    pub settings: Arc<RwLock<BridgeSettings>>,
    /// The active session, if connected.
    pub session: Arc<SessionSlot>,
}

impl AppState {
    pub fn new(config: ServerConfig, settings: BridgeSettings) -> Self {
        Self {
            config: Arc::new(config),
            settings: Arc::new(RwLock::new(settings)),
            session: Arc::new(SessionSlot::new()),
        }
    }

    /// Copy of the current settings.
    pub async fn settings_snapshot(&self) -> BridgeSettings {
        self.settings.read().await.clone()
    }
}
