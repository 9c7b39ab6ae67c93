use crate::config::AppConfig;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::{create_conn, run_migrations, DbPool};
use crate::main_module::build_app_state;
use crate::security::Argon2Config;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Configuration rooted in `dir`, with cheap password hashing.
pub fn test_config(dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = dir.join("tickets.db").to_string_lossy().into_owned();
    config.database.pool_size = 2;
    config.export.csv_path = dir.join("exports").join("tickets.csv");
    config.argon2 = Argon2Config::minimal();
    config
}

/// A migrated SQLite file that disappears with the value.
pub struct TestDatabase {
    pub pool: DbPool,
    _dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = test_config(dir.path());
        let pool = create_conn(&config.database).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        Self { pool, _dir: dir }
    }

    pub fn conn(
        &self,
    ) -> diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::SqliteConnection>>
    {
        self.pool.get().expect("Failed to get connection")
    }
}

#[derive(Debug, Default)]
pub struct TestAppStateBuilder {
    config: Option<AppConfig>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// The returned directory must outlive the state.
    pub fn build(self) -> (TempDir, Arc<AppState>) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = self.config.unwrap_or_else(|| test_config(dir.path()));
        let state = build_app_state(config).expect("Failed to build app state");
        (dir, Arc::new(state))
    }
}
