use std::process::ExitCode;

use trail_backend::{AppState, config::AppConfig, create_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trail_backend=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    let addr = config.bind_addr;
    let state = AppState::new(config);
    tracing::info!(
        "route source {}, elevation service {}",
        state.config.route_source,
        state.elevation.base_url()
    );

    state.spawn_load(None);
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind {addr}: {err}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("starting backend on http://{addr}");
    tracing::info!("  GET    /api/status");
    tracing::info!("  GET    /api/route");
    tracing::info!("  GET    /api/profile");
    tracing::info!("  GET    /api/position?distance=<km>");
    tracing::info!("  GET    /api/pois");
    tracing::info!("  POST   /api/route/reload");
    tracing::info!("  DELETE /api/route");

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("server error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
