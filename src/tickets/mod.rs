pub mod audit;
pub mod service;
pub mod ui;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::shared::schema::ticket;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::{with_connection, DbTaskError};
pub use audit::{ActionKind, TicketAction};

pub const DEFAULT_STATUS: &str = "Open";

/// Suggested workflow states offered by the UI. The service accepts any text.
pub const SUGGESTED_STATUSES: [&str; 4] = ["Open", "In Progress", "Resolved", "Closed"];

#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable, Identifiable,
)]
#[diesel(table_name = ticket)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Ticket {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: String,
    pub name: String,
    pub office: String,
    pub created_at: NaiveDateTime,
    pub deleted: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = ticket)]
pub(crate) struct NewTicket<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub status: &'a str,
    pub name: &'a str,
    pub office: &'a str,
    pub created_at: NaiveDateTime,
    pub deleted: bool,
}

/// Request body for `POST /api/tickets`; every field is required.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub name: Option<String>,
    pub office: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTicketRequest {
    pub status: Option<String>,
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicketInput {
    pub title: String,
    pub description: String,
    pub name: String,
    pub office: String,
}

impl CreateTicketRequest {
    pub fn validate(self) -> Result<NewTicketInput, TicketError> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        let title = present(self.title);
        let description = present(self.description);
        let name = present(self.name);
        let office = present(self.office);

        match (title, description, name, office) {
            (Some(title), Some(description), Some(name), Some(office)) => Ok(NewTicketInput {
                title,
                description,
                name,
                office,
            }),
            (title, description, name, office) => {
                let missing: Vec<&str> = [
                    ("title", title.is_none()),
                    ("description", description.is_none()),
                    ("name", name.is_none()),
                    ("office", office.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, absent)| absent.then_some(field))
                .collect();
                Err(TicketError::Validation(format!(
                    "Missing required field(s): {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

impl UpdateTicketRequest {
    pub fn validate(self) -> Result<String, TicketError> {
        self.status
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| TicketError::Validation("Missing required field(s): status".into()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("{0}")]
    Validation(String),
    #[error("Ticket {0} not found")]
    NotFound(i32),
    /// The path segment is not a ticket id at all.
    #[error("Ticket not found")]
    InvalidId,
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<diesel::result::Error> for TicketError {
    fn from(e: diesel::result::Error) -> Self {
        Self::Database(e.to_string())
    }
}

impl From<DbTaskError> for TicketError {
    fn from(e: DbTaskError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<JsonRejection> for TicketError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for TicketError {
    fn from(rejection: PathRejection) -> Self {
        debug!("Unusable ticket id in path: {}", rejection.body_text());
        Self::InvalidId
    }
}

impl IntoResponse for TicketError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::InvalidId => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => {
                error!("Ticket request failed: {self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Ticket>>, TicketError> {
    let tickets = with_connection(&state.conn, service::list_tickets).await?;
    Ok(Json(tickets))
}

pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateTicketRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Ticket>), TicketError> {
    let Json(req) = payload?;
    let input = req.validate()?;

    let created =
        with_connection(&state.conn, move |conn| service::create_ticket(conn, &input)).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateTicketRequest>, JsonRejection>,
) -> Result<Json<Ticket>, TicketError> {
    let Path(id) = path?;
    let Json(req) = payload?;
    let status = req.validate()?;

    let updated =
        with_connection(&state.conn, move |conn| service::update_status(conn, id, &status))
            .await?;

    Ok(Json(updated))
}

pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, TicketError> {
    let Path(id) = path?;
    with_connection(&state.conn, move |conn| service::soft_delete(conn, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_ticket_history(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<TicketAction>>, TicketError> {
    let Path(id) = path?;
    let actions = with_connection(&state.conn, move |conn| service::history(conn, id)).await?;
    Ok(Json(actions))
}

pub fn configure_tickets_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/tickets", get(list_tickets).post(create_ticket))
        .route("/api/tickets/:id", put(update_ticket).delete(delete_ticket))
        .route("/api/tickets/:id/history", get(get_ticket_history))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: Option<&str>, office: Option<&str>) -> CreateTicketRequest {
        CreateTicketRequest {
            title: title.map(str::to_string),
            description: Some("No toner".into()),
            name: Some("Alice".into()),
            office: office.map(str::to_string),
        }
    }

    #[test]
    fn test_validate_complete_request() {
        let input = request(Some("Printer broken"), Some("3B"))
            .validate()
            .expect("valid");
        assert_eq!(input.title, "Printer broken");
        assert_eq!(input.office, "3B");
    }

    #[test]
    fn test_validate_lists_missing_fields() {
        let err = request(None, Some("  ")).validate().expect_err("invalid");
        match err {
            TicketError::Validation(msg) => {
                assert_eq!(msg, "Missing required field(s): title, office");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_update_requires_status() {
        assert!(UpdateTicketRequest { status: None }.validate().is_err());
        assert!(UpdateTicketRequest {
            status: Some(String::new())
        }
        .validate()
        .is_err());
        assert_eq!(
            UpdateTicketRequest {
                status: Some("Closed".into())
            }
            .validate()
            .expect("valid"),
            "Closed"
        );
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            TicketError::Validation("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            TicketError::NotFound(1).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            TicketError::InvalidId.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            TicketError::Database("x".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_ticket_json_shape() {
        let ticket = Ticket {
            id: 1,
            title: "Printer broken".into(),
            description: "No toner".into(),
            status: "Open".into(),
            name: "Alice".into(),
            office: "3B".into(),
            created_at: chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
                .and_then(|d| d.and_hms_opt(9, 30, 0))
                .expect("date"),
            deleted: false,
        };
        let value = serde_json::to_value(&ticket).expect("json");
        assert_eq!(value["created_at"], "2024-06-01T09:30:00");
        assert_eq!(value["deleted"], false);
        assert_eq!(value["office"], "3B");
    }
}
