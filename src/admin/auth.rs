//! Seed account handling, credential checks and the session gate used by
//! every admin page.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
    RequestPartsExt,
};
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::{error, info, warn};
use std::sync::Arc;
use tower_cookies::Cookies;

use super::{Admin, AdminError, NewAdmin};
use crate::core::shared::schema::admin;
use crate::core::shared::state::AppState;
use crate::security::CredentialHasher;

pub const ADMIN_USERNAME: &str = "admin";
pub const SEED_PASSWORD: &str = "admin123";
pub const LOGIN_PATH: &str = "/admin/login";

fn find_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> QueryResult<Option<Admin>> {
    admin::table
        .filter(admin::username.eq(username))
        .select(Admin::as_select())
        .first(conn)
        .optional()
}

/// Ensures the seed account exists and that its stored hash verifies the seed
/// password under the current Argon2 parameters. Safe to run on every start.
pub fn bootstrap_admin(
    conn: &mut SqliteConnection,
    hasher: &CredentialHasher,
) -> Result<Admin, AdminError> {
    let account = conn.immediate_transaction::<_, AdminError, _>(|conn| {
        let Some(existing) = find_by_username(conn, ADMIN_USERNAME)? else {
            let created = diesel::insert_into(admin::table)
                .values(&NewAdmin {
                    username: ADMIN_USERNAME,
                    password: &hasher.hash(SEED_PASSWORD)?,
                })
                .returning(Admin::as_returning())
                .get_result(conn)?;
            info!("Created admin account '{ADMIN_USERNAME}'");
            return Ok(created);
        };

        let current = match hasher.verify(SEED_PASSWORD, &existing.password) {
            Ok(true) => !hasher.needs_rehash(&existing.password)?,
            Ok(false) => false,
            Err(e) => {
                warn!("Stored credential for '{ADMIN_USERNAME}' is unreadable: {e}");
                false
            }
        };
        if current {
            return Ok(existing);
        }

        let refreshed = diesel::update(admin::table.find(existing.id))
            .set(admin::password.eq(hasher.hash(SEED_PASSWORD)?))
            .returning(Admin::as_returning())
            .get_result(conn)?;
        info!("Reset stored credential for '{ADMIN_USERNAME}'");
        Ok(refreshed)
    })?;

    warn!(
        "Admin account '{ADMIN_USERNAME}' uses the built-in seed password; \
         do not expose this service beyond a trusted network"
    );
    Ok(account)
}

/// Unknown usernames and wrong passwords fail the same way.
pub fn authenticate(
    conn: &mut SqliteConnection,
    hasher: &CredentialHasher,
    username: &str,
    password: &str,
) -> Result<Admin, AdminError> {
    let Some(account) = find_by_username(conn, username)? else {
        warn!("Rejected login for unknown user {username:?}");
        return Err(AdminError::InvalidCredentials);
    };

    match hasher.verify(password, &account.password) {
        Ok(true) => Ok(account),
        Ok(false) => {
            warn!("Rejected login for {username:?}: wrong password");
            Err(AdminError::InvalidCredentials)
        }
        Err(e) => {
            error!("Credential check for {username:?} failed: {e}");
            Err(AdminError::InvalidCredentials)
        }
    }
}

/// Proof of a live admin session. Requests without one are sent to the
/// login page with `303 See Other`.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub admin_id: i32,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminSession {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let cookies = parts
            .extract::<Cookies>()
            .await
            .map_err(|_| Redirect::to(LOGIN_PATH))?;

        let token = cookies
            .get(&state.sessions.config().cookie_name)
            .map(|c| c.value().to_string())
            .ok_or_else(|| Redirect::to(LOGIN_PATH))?;

        match state.sessions.validate_session(&token).await {
            Ok(Some(session)) => Ok(Self {
                admin_id: session.admin_id,
            }),
            Ok(None) => Err(Redirect::to(LOGIN_PATH)),
            Err(e) => {
                error!("Session lookup failed: {e}");
                Err(Redirect::to(LOGIN_PATH))
            }
        }
    }
}
