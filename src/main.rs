use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hireai_backend::config::{get_config, init_config};
use hireai_backend::database::pool::create_pool;
use hireai_backend::middleware::cors::permissive_cors;
use hireai_backend::routes;
use hireai_backend::services::session_service;
use hireai_backend::AppState;

const SWEEP_INTERVAL_SECS: u64 = 60;
const MAX_BODY_BYTES: usize = 15 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("database ready");

    let state = AppState::new(pool.clone())?;

    // Deadline sweeper for sessions abandoned without a final submit.
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            ticker.tick().await;
            if let Err(err) = session_service::sweep_expired(&pool, chrono::Utc::now()).await {
                tracing::error!(error = %err, "deadline sweep failed");
            }
        }
    });

    let app = routes::app(state, config.public_rps, config.recruiter_rps)
        .layer(TraceLayer::new_for_http())
        .layer(permissive_cors())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    let listener = tokio::net::TcpListener::bind(&config.server_address).await?;
    tracing::info!(address = %config.server_address, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
