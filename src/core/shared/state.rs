use crate::config::AppConfig;
use crate::security::{AdminSessions, CredentialHasher};
use crate::core::shared::utils::DbPool;
use std::sync::Arc;

/// Everything a request handler needs, handed out through axum `State`.
pub struct AppState {
    pub conn: DbPool,
    pub config: AppConfig,
    pub sessions: Arc<AdminSessions>,
    pub hasher: Arc<CredentialHasher>,
}

impl AppState {
    pub fn new(
        conn: DbPool,
        config: AppConfig,
        sessions: AdminSessions,
        hasher: CredentialHasher,
    ) -> Self {
        Self {
            conn,
            config,
            sessions: Arc::new(sessions),
            hasher: Arc::new(hasher),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("database", &self.config.database.url)
            .field("pool_size", &self.conn.state().connections)
            .finish()
    }
}
