pub mod auth;
pub mod ui;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use diesel::prelude::*;
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_cookies::Cookies;

use crate::core::shared::schema::admin;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::{with_connection, DbTaskError};
use crate::tickets::{service, TicketError};
pub use auth::{authenticate, bootstrap_admin, AdminSession, ADMIN_USERNAME, SEED_PASSWORD};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = admin)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Admin {
    pub id: i32,
    pub username: String,
    /// Argon2id PHC string.
    pub password: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = admin)]
pub(crate) struct NewAdmin<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<diesel::result::Error> for AdminError {
    fn from(e: diesel::result::Error) -> Self {
        Self::Database(e.to_string())
    }
}

impl From<DbTaskError> for AdminError {
    fn from(e: DbTaskError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<anyhow::Error> for AdminError {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Invalid credentials" })),
            )
                .into_response(),
            Self::Database(_) | Self::Internal(_) => {
                error!("Admin request failed: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": self.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

pub async fn login_page() -> Html<String> {
    Html(ui::render_login_page())
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AdminError> {
    // An unreadable body is treated like a failed login.
    let Json(req) = payload.map_err(|_| AdminError::InvalidCredentials)?;

    let hasher = Arc::clone(&state.hasher);
    let account = with_connection(&state.conn, move |conn| {
        authenticate(conn, &hasher, &req.username, &req.password)
    })
    .await?;

    let session = state.sessions.create_session(account.id).await?;
    cookies.add(state.sessions.build_cookie(&session));
    info!("Admin '{}' logged in", account.username);

    Ok(Json(json!({ "message": "Logged in successfully" })))
}

/// Always succeeds; ends the server-side session when the cookie names one.
pub async fn logout(State(state): State<Arc<AppState>>, cookies: Cookies) -> impl IntoResponse {
    let cookie_name = &state.sessions.config().cookie_name;
    if let Some(token) = cookies.get(cookie_name).map(|c| c.value().to_string()) {
        if let Err(e) = state.sessions.end_session(&token).await {
            error!("Failed to end session: {e}");
        }
    }
    cookies.remove(state.sessions.build_logout_cookie());

    Json(json!({ "message": "Logged out successfully" }))
}

pub async fn admin_panel(
    session: AdminSession,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, TicketError> {
    let tickets = with_connection(&state.conn, service::list_tickets).await?;
    log::debug!("Admin {} viewed {} tickets", session.admin_id, tickets.len());
    Ok(Html(ui::render_admin_panel(&tickets)))
}

pub fn configure_admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin", get(admin_panel))
        .route("/admin/login", get(login_page).post(login))
        .route("/admin/logout", get(logout).post(logout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_defaults_missing_fields() {
        let req: LoginRequest = serde_json::from_str(r#"{"username":"admin"}"#).expect("json");
        assert_eq!(req.username, "admin");
        assert_eq!(req.password, "");
    }

    #[test]
    fn test_invalid_credentials_response() {
        let response = AdminError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AdminError::Internal("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
