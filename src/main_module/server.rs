//! Router assembly and the HTTP listener.

use axum::{routing::get, Router};
use log::{error, info};
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

use super::{health_check, shutdown_signal};
use crate::admin::configure_admin_routes;
use crate::core::shared::state::AppState;
use crate::reports::configure_reports_routes;
use crate::security::create_cors_layer;
use crate::tickets::{configure_tickets_routes, ui::configure_tickets_ui_routes};

pub fn build_router(app_state: Arc<AppState>) -> Router {
    let cors = create_cors_layer(&app_state.config.cors_allowed_origins);

    Router::new()
        .merge(configure_tickets_routes())
        .merge(configure_tickets_ui_routes())
        .merge(configure_admin_routes())
        .merge(configure_reports_routes())
        .route("/health", get(health_check))
        .with_state(app_state)
        .layer(CookieManagerLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_axum_server(app_state: Arc<AppState>) -> std::io::Result<()> {
    let addr = app_state
        .config
        .socket_addr()
        .map_err(std::io::Error::other)?;
    let app = build_router(app_state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {addr}: {e} - is another instance running?");
            return Err(e);
        }
    };
    info!("HTTP server listening on http://{addr}");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
