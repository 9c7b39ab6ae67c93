//! Builds the shared application state before the server starts.

use anyhow::{anyhow, Context, Result};
use log::info;

use crate::admin::bootstrap_admin;
use crate::config::AppConfig;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::{create_conn, run_migrations};
use crate::security::{AdminSessions, CredentialHasher, InMemorySessionStore, SessionManager};

/// Opens the pool, migrates the schema and makes sure the seed admin exists.
/// Blocking; call it from `spawn_blocking` inside a runtime.
pub fn build_app_state(config: AppConfig) -> Result<AppState> {
    let pool = create_conn(&config.database)
        .with_context(|| format!("Failed to open database {}", config.database.url))?;

    run_migrations(&pool).map_err(|e| anyhow!("Failed to run migrations: {e}"))?;
    info!("Database ready at {}", config.database.url);

    let hasher = CredentialHasher::new(&config.argon2)?;

    let mut conn = pool
        .get()
        .context("Failed to get a connection for admin bootstrap")?;
    bootstrap_admin(&mut conn, &hasher).context("Failed to bootstrap admin account")?;
    drop(conn);

    let sessions: AdminSessions =
        SessionManager::new(InMemorySessionStore::new(), config.session.clone());

    Ok(AppState::new(pool, config, sessions, hasher))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::schema::admin;
    use crate::core::shared::test_utils::test_config;
    use diesel::prelude::*;

    #[test]
    fn test_build_app_state_is_repeatable() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let config = test_config(dir.path());

        let first = build_app_state(config.clone()).expect("first start");
        drop(first);
        let state = build_app_state(config).expect("second start");

        let mut conn = state.conn.get().expect("conn");
        let admins: i64 = admin::table.count().get_result(&mut conn).expect("count");
        assert_eq!(admins, 1);
    }
}
