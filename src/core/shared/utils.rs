use crate::config::DatabaseConfig;
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::SqliteConnection;
use log::debug;
use std::time::Duration;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Pragmas applied to every pooled SQLite connection: a busy timeout, WAL
/// journaling and enforced foreign keys.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    pub busy_timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; \
             PRAGMA journal_mode = WAL; \
             PRAGMA synchronous = NORMAL; \
             PRAGMA foreign_keys = ON;",
            self.busy_timeout.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn create_conn(config: &DatabaseConfig) -> Result<DbPool, diesel::r2d2::PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(&config.url);
    debug!(
        "Opening SQLite pool at {} (max {} connections)",
        config.url, config.pool_size
    );
    Pool::builder()
        .max_size(config.pool_size)
        .connection_customizer(Box::new(ConnectionOptions::default()))
        .build(manager)
}

/// Run database migrations
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS).map_err(
        |e| -> Box<dyn std::error::Error + Send + Sync> {
            Box::new(std::io::Error::other(format!("Migration error: {e}")))
        },
    )?;
    for version in applied {
        debug!("Applied migration {version}");
    }
    Ok(())
}

/// Failure to get a connection onto a blocking worker.
#[derive(Debug, thiserror::Error)]
pub enum DbTaskError {
    #[error("connection pool error: {0}")]
    Pool(String),
    #[error("blocking task failed: {0}")]
    Join(String),
}

/// Runs `f` on the blocking thread pool with a pooled connection.
///
/// Diesel is synchronous, so every handler funnels its database work through
/// here instead of holding a connection on the async executor.
pub async fn with_connection<T, E, F>(pool: &DbPool, f: F) -> Result<T, E>
where
    F: FnOnce(&mut SqliteConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: From<DbTaskError> + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| E::from(DbTaskError::Pool(e.to_string())))?;
        f(&mut *conn)
    })
    .await
    .map_err(|e| E::from(DbTaskError::Join(e.to_string())))?
}
