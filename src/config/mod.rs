use crate::security::{Argon2Config, SessionConfig};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub export: ExportConfig,
    pub argon2: Argon2Config,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub csv_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8009,
            },
            database: DatabaseConfig {
                url: "tickets.db".to_string(),
                pool_size: 8,
            },
            session: SessionConfig::default(),
            export: ExportConfig {
                csv_path: PathBuf::from("exports/tickets.csv"),
            },
            argon2: Argon2Config::default(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Builds the configuration from the process environment, falling back to
    /// the defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server = ServerConfig {
            host: get("HELPDESK_HOST").unwrap_or(defaults.server.host),
            port: parse_or(get("HELPDESK_PORT"), "HELPDESK_PORT", defaults.server.port)?,
        };

        let database = DatabaseConfig {
            url: get("DATABASE_URL").unwrap_or(defaults.database.url),
            pool_size: parse_or(
                get("DATABASE_POOL_SIZE"),
                "DATABASE_POOL_SIZE",
                defaults.database.pool_size,
            )?,
        };
        if database.pool_size == 0 {
            anyhow::bail!("DATABASE_POOL_SIZE must be at least 1");
        }

        let session_defaults = defaults.session;
        let session = SessionConfig {
            cookie_name: get("SESSION_COOKIE_NAME").unwrap_or(session_defaults.cookie_name),
            idle_timeout_minutes: parse_or(
                get("SESSION_IDLE_TIMEOUT_MINUTES"),
                "SESSION_IDLE_TIMEOUT_MINUTES",
                session_defaults.idle_timeout_minutes,
            )?,
            absolute_timeout_hours: parse_or(
                get("SESSION_ABSOLUTE_TIMEOUT_HOURS"),
                "SESSION_ABSOLUTE_TIMEOUT_HOURS",
                session_defaults.absolute_timeout_hours,
            )?,
            cookie_secure: parse_or(
                get("SESSION_COOKIE_SECURE"),
                "SESSION_COOKIE_SECURE",
                session_defaults.cookie_secure,
            )?,
            ..session_defaults
        };

        let export = ExportConfig {
            csv_path: get("EXPORT_CSV_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.export.csv_path),
        };

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            server,
            database,
            session,
            export,
            argon2: defaults.argon2,
            cors_allowed_origins,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid listen address {}:{}",
                    self.server.host, self.server.port
                )
            })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
