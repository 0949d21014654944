use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use workhours::background;
use workhours::config::AppConfig;
use workhours::handlers;
use workhours::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    if config.admin_token == "changeme" {
        tracing::warn!("ADMIN_TOKEN not set, using the default token");
    }

    let state = Arc::new(AppState::new(config.clone()));

    let sweeper_state = state.clone();
    tokio::spawn(async move {
        background::start_session_sweeper(sweeper_state).await;
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/durations", get(handlers::schedule::list_durations))
        .route("/api/schedules", post(handlers::schedule::create_schedule))
        .route(
            "/api/schedules/:id",
            get(handlers::schedule::get_schedule).delete(handlers::schedule::discard_schedule),
        )
        .route(
            "/api/schedules/:id/days/:day/availability",
            put(handlers::schedule::set_availability),
        )
        .route(
            "/api/schedules/:id/days/:day/periods",
            post(handlers::schedule::add_period),
        )
        .route(
            "/api/schedules/:id/days/:day/periods/:period",
            axum::routing::delete(handlers::schedule::remove_period),
        )
        .route(
            "/api/schedules/:id/days/:day/periods/:period/start",
            put(handlers::schedule::set_period_start),
        )
        .route(
            "/api/schedules/:id/days/:day/periods/:period/duration",
            put(handlers::schedule::set_period_duration),
        )
        .route(
            "/api/schedules/:id/days/:day/copy",
            post(handlers::schedule::copy_to_next_day),
        )
        .route("/api/schedules/:id/collect", post(handlers::schedule::collect))
        .route("/api/schedules/:id/events", get(handlers::schedule::events_stream))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
