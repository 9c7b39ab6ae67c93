pub mod cors;
pub mod password;
pub mod session;

pub use cors::create_cors_layer;
pub use password::{Argon2Config, CredentialHasher};
pub use session::{
    AdminSessions, InMemorySessionStore, SameSite, Session, SessionConfig, SessionManager,
    SessionStore,
};
