use std::net::SocketAddr;

mod app;
mod config;
mod errors;
mod menu;
mod models;
mod products;
mod state;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "menu_manager=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&app_state.db).await {
        tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
    }

    let addr: SocketAddr =
        format!("{}:{}", app_state.config.host, app_state.config.port).parse()?;
    let shutdown = app_state.shutdown.clone();
    let grace = app_state.config.shutdown_grace();

    app::serve(app::build_app(app_state), addr, shutdown, grace).await
}
