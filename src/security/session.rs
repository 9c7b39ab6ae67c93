use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_cookies::Cookie;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub idle_timeout_minutes: i64,
    pub absolute_timeout_hours: i64,
    pub session_id_length: usize,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub cookie_http_only: bool,
    pub cookie_same_site: SameSite,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: 30,
            absolute_timeout_hours: 12,
            session_id_length: 48,
            cookie_name: "helpdesk_session".into(),
            cookie_secure: false,
            cookie_http_only: true,
            cookie_same_site: SameSite::Lax,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn to_cookie(self) -> tower_cookies::cookie::SameSite {
        match self {
            Self::Strict => tower_cookies::cookie::SameSite::Strict,
            Self::Lax => tower_cookies::cookie::SameSite::Lax,
            Self::None => tower_cookies::cookie::SameSite::None,
        }
    }
}

/// Server-side state behind an admin session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub admin_id: i32,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub absolute_expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(admin_id: i32, config: &SessionConfig) -> Self {
        let now = Utc::now();

        Self {
            id: generate_session_id(config.session_id_length),
            admin_id,
            created_at: now,
            last_accessed_at: now,
            expires_at: now + Duration::minutes(config.idle_timeout_minutes),
            absolute_expires_at: now + Duration::hours(config.absolute_timeout_hours),
        }
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now();
        now > self.expires_at || now > self.absolute_expires_at
    }

    pub fn touch(&mut self, idle_timeout_minutes: i64) {
        let now = Utc::now();
        self.last_accessed_at = now;
        self.expires_at = now + Duration::minutes(idle_timeout_minutes);
    }
}

pub trait SessionStore: Send + Sync {
    fn create(&self, session: Session) -> impl std::future::Future<Output = Result<()>> + Send;
    fn get(&self, session_id: &str) -> impl std::future::Future<Output = Result<Option<Session>>> + Send;
    fn update(&self, session: &Session) -> impl std::future::Future<Output = Result<()>> + Send;
    fn delete(&self, session_id: &str) -> impl std::future::Future<Output = Result<()>> + Send;
    fn cleanup_expired(&self) -> impl std::future::Future<Output = Result<usize>> + Send;
}

#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn update(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            sessions.insert(session.id.clone(), session.clone());
            Ok(())
        } else {
            Err(anyhow!("Session not found: {}", session.id))
        }
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
        Ok(())
    }

    async fn cleanup_expired(&self) -> Result<usize> {
        let mut sessions = self.sessions.write().await;
        let initial_count = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        Ok(initial_count - sessions.len())
    }
}

pub struct SessionManager<S: SessionStore> {
    store: S,
    config: SessionConfig,
}

pub type AdminSessions = SessionManager<InMemorySessionStore>;

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self { store, config }
    }

    pub async fn create_session(&self, admin_id: i32) -> Result<Session> {
        let cleaned = self.store.cleanup_expired().await?;
        if cleaned > 0 {
            debug!("Dropped {cleaned} expired sessions");
        }

        let session = Session::new(admin_id, &self.config);
        self.store.create(session.clone()).await?;
        info!("Created session for admin {admin_id}");

        Ok(session)
    }

    /// Returns the session if it is still active, sliding its idle expiry.
    pub async fn validate_session(&self, session_id: &str) -> Result<Option<Session>> {
        let mut session = match self.store.get(session_id).await? {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            self.store.delete(session_id).await?;
            debug!("Discarded stale session for admin {}", session.admin_id);
            return Ok(None);
        }

        session.touch(self.config.idle_timeout_minutes);
        self.store.update(&session).await?;

        Ok(Some(session))
    }

    pub async fn end_session(&self, session_id: &str) -> Result<bool> {
        let existed = self.store.get(session_id).await?.is_some();
        self.store.delete(session_id).await?;
        if existed {
            info!("Ended admin session");
        }
        Ok(existed)
    }

    pub fn build_cookie(&self, session: &Session) -> Cookie<'static> {
        Cookie::build((self.config.cookie_name.clone(), session.id.clone()))
            .path("/")
            .http_only(self.config.cookie_http_only)
            .secure(self.config.cookie_secure)
            .same_site(self.config.cookie_same_site.to_cookie())
            .build()
    }

    pub fn build_logout_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.config.cookie_name.clone(), String::new()))
            .path("/")
            .http_only(self.config.cookie_http_only)
            .secure(self.config.cookie_secure)
            .same_site(self.config.cookie_same_site.to_cookie())
            .build()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

pub fn generate_session_id(length: usize) -> String {
    use rand::Rng;

    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();

    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> AdminSessions {
        SessionManager::new(InMemorySessionStore::new(), SessionConfig::default())
    }

    #[test]
    fn test_session_touch() {
        let config = SessionConfig::default();
        let mut session = Session::new(1, &config);
        let original_expires = session.expires_at;

        std::thread::sleep(std::time::Duration::from_millis(10));
        session.touch(config.idle_timeout_minutes);

        assert!(session.expires_at > original_expires);
    }

    #[test]
    fn test_expired_session_is_invalid() {
        let config = SessionConfig {
            idle_timeout_minutes: -1,
            ..SessionConfig::default()
        };
        let session = Session::new(1, &config);

        assert!(session.is_expired());
    }

    #[test]
    fn test_generate_session_id() {
        let id1 = generate_session_id(32);
        let id2 = generate_session_id(32);

        assert_eq!(id1.len(), 32);
        assert!(id1.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id1, id2);
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemorySessionStore::new();
        let session = Session::new(7, &SessionConfig::default());
        let session_id = session.id.clone();

        store.create(session).await.expect("Create failed");
        let retrieved = store.get(&session_id).await.expect("Get failed");
        assert_eq!(retrieved.map(|s| s.admin_id), Some(7));

        store.delete(&session_id).await.expect("Delete failed");
        assert!(store.get(&session_id).await.expect("Get failed").is_none());
    }

    #[tokio::test]
    async fn test_session_manager_validate() {
        let manager = manager();
        let session = manager.create_session(1).await.expect("Create failed");

        let validated = manager
            .validate_session(&session.id)
            .await
            .expect("Validate failed");
        assert_eq!(validated.map(|s| s.admin_id), Some(1));

        let missing = manager
            .validate_session("nonexistent")
            .await
            .expect("Validate failed");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_end_session_is_idempotent() {
        let manager = manager();
        let session = manager.create_session(1).await.expect("Create failed");

        assert!(manager.end_session(&session.id).await.expect("End failed"));
        assert!(!manager.end_session(&session.id).await.expect("End failed"));
        assert!(manager
            .validate_session(&session.id)
            .await
            .expect("Validate failed")
            .is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_discarded() {
        let config = SessionConfig {
            idle_timeout_minutes: -1,
            ..SessionConfig::default()
        };
        let manager = SessionManager::new(InMemorySessionStore::new(), config);
        let session = manager.create_session(1).await.expect("Create failed");

        assert!(manager
            .validate_session(&session.id)
            .await
            .expect("Validate failed")
            .is_none());
    }

    #[test]
    fn test_build_cookie() {
        let manager = manager();
        let session = Session::new(1, manager.config());
        let cookie = manager.build_cookie(&session);

        assert_eq!(cookie.name(), "helpdesk_session");
        assert_eq!(cookie.value(), session.id);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(
            cookie.same_site(),
            Some(tower_cookies::cookie::SameSite::Lax)
        );
        assert!(cookie.max_age().is_none());
    }

    #[test]
    fn test_strict_same_site_reaches_cookie() {
        let config = SessionConfig {
            cookie_same_site: SameSite::Strict,
            cookie_secure: true,
            ..SessionConfig::default()
        };
        let manager = SessionManager::new(InMemorySessionStore::new(), config);
        let cookie = manager.build_logout_cookie();

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(
            cookie.same_site(),
            Some(tower_cookies::cookie::SameSite::Strict)
        );
    }
}
