//! # Murmur API Server
//!
//! Actix-web front end for the ranked feed, post actions and live comments.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod background;
mod config;
mod handlers;
mod middleware;
mod sessions;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        host = %config.host,
        port = config.port,
        page_size = config.feed.page_size,
        "Starting Murmur API Server"
    );

    let state = AppState::new(&config).await;

    #[cfg(feature = "scheduler")]
    let mut sweeper = match background::start_session_sweeper(
        state.sessions.clone(),
        &config.feed.sweep_cron,
    )
    .await
    {
        Ok(scheduler) => Some(scheduler),
        Err(e) => {
            tracing::error!(error = %e, "Failed to start feed session sweeper");
            None
        }
    };

    #[cfg(not(feature = "scheduler"))]
    tracing::warn!("Scheduler feature disabled: idle feed sessions are kept until deleted");

    let app_state = state.clone();
    let result = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(app_state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    #[cfg(feature = "scheduler")]
    if let Some(scheduler) = sweeper.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!(error = %e, "Scheduler did not stop cleanly");
        }
    }

    result
}
