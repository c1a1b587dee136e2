use std::sync::Arc;

use reelshelf::api::{create_router, AppState};
use reelshelf::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelshelf=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let state = AppState::from_config(&config);

    // Warm the dashboard off the request path and keep it fresh
    let dashboard = Arc::clone(&state.dashboard);
    tokio::spawn(async move { dashboard.initialize().await });
    let _refresh_handle = state.dashboard.start_auto_refresh();

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
