pub mod chart;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use base64::Engine;
use log::{error, info};
use std::path::Path;
use std::sync::Arc;

use crate::admin::{ui::admin_nav, AdminSession};
use crate::core::shared::html::{html_escape, render_page};
use crate::core::shared::state::AppState;
use crate::core::shared::utils::{with_connection, DbTaskError};
use crate::tickets::{service, Ticket, TicketError};
use chart::{chart_series, render_bar_chart, title_frequencies, TitleCount};

pub const CSV_HEADER: [&str; 6] = ["ID", "Title", "Description", "Status", "Name", "Created At"];
pub const EXPORT_FILENAME: &str = "tickets.csv";
/// ISO-8601 without offset, matching the JSON API.
const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("CSV error: {0}")]
    Csv(String),
    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Chart rendering failed: {0}")]
    Render(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TicketError> for ReportError {
    fn from(e: TicketError) -> Self {
        Self::Database(e.to_string())
    }
}

impl From<DbTaskError> for ReportError {
    fn from(e: DbTaskError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<csv::Error> for ReportError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        error!("Report failed: {self}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// Header row first, then one row per ticket in the order given.
pub fn tickets_to_csv(tickets: &[Ticket]) -> Result<Vec<u8>, ReportError> {
    let mut csv_writer = csv::Writer::from_writer(vec![]);

    csv_writer.write_record(CSV_HEADER)?;
    for ticket in tickets {
        csv_writer.write_record([
            ticket.id.to_string(),
            ticket.title.clone(),
            ticket.description.clone(),
            ticket.status.clone(),
            ticket.name.clone(),
            ticket.created_at.format(CREATED_AT_FORMAT).to_string(),
        ])?;
    }

    csv_writer
        .into_inner()
        .map_err(|e| ReportError::Csv(e.to_string()))
}

/// Replaces any previous export at `path`.
pub async fn write_export(path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

pub async fn export_csv(
    _session: AdminSession,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ReportError> {
    let tickets = with_connection(&state.conn, service::list_active_by_id).await?;
    let bytes = tickets_to_csv(&tickets)?;

    let path = &state.config.export.csv_path;
    write_export(path, &bytes).await?;
    info!("Exported {} tickets to {}", tickets.len(), path.display());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

fn render_chart_page(frequencies: &[TitleCount], png: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);

    let legend = if frequencies.is_empty() {
        "<tr><td colspan=\"3\">No tickets yet.</td></tr>".to_string()
    } else {
        frequencies
            .iter()
            .enumerate()
            .map(|(i, f)| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                    i + 1,
                    html_escape(&f.title),
                    f.count
                )
            })
            .collect::<String>()
    };

    let body = format!(
        "<h1>Ticket titles</h1>\
        <p>Bars: ticket titles, numbered as in the table below. Height: number of tickets.</p>\
        <img src=\"data:image/png;base64,{encoded}\" alt=\"Ticket title frequency\" width=\"{w}\" height=\"{h}\">\
        <table>\
            <thead><tr><th>Bar</th><th>Title</th><th>Count</th></tr></thead>\
            <tbody>{legend}</tbody>\
        </table>",
        w = chart::CHART_WIDTH,
        h = chart::CHART_HEIGHT,
    );
    render_page("Ticket titles", admin_nav(), &body)
}

pub async fn plot_titles(
    _session: AdminSession,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, ReportError> {
    let tickets = with_connection(&state.conn, service::list_active_by_id).await?;
    let frequencies = chart_series(title_frequencies(&tickets));

    let png = tokio::task::spawn_blocking({
        let frequencies = frequencies.clone();
        move || render_bar_chart(&frequencies)
    })
    .await
    .map_err(|e| ReportError::Internal(e.to_string()))??;

    Ok(Html(render_chart_page(&frequencies, &png)))
}

pub fn configure_reports_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/export", get(export_csv))
        .route("/admin/plot_titles", get(plot_titles))
}
