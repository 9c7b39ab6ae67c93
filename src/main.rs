use dotenvy::dotenv;
use log::{error, info};
use std::sync::Arc;

use helpdesk::config::AppConfig;
use helpdesk::main_module::{build_app_state, run_axum_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting helpdesk {}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::from_env()?;
    let app_state = tokio::task::spawn_blocking(move || build_app_state(config)).await??;

    if let Err(e) = run_axum_server(Arc::new(app_state)).await {
        error!("Server error: {e}");
        return Err(e.into());
    }

    Ok(())
}
