mod config;
mod db;
mod domain;
mod error;
mod middleware;
mod services;
mod state;
#[cfg(test)]
mod test_support;
mod time_utils;
mod web;

use crate::config::AppConfig;
use crate::db::{NotificationStore, PgStore};
use crate::services::dispatcher::Dispatcher;
use crate::services::lifecycle::Lifecycle;
use crate::services::push::{PushTransport, WebPushTransport};
use crate::services::sms::SmsClient;
use crate::state::SharedState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to run database migrations: {}", e);
            e
        })?;
    tracing::info!("Database migrations completed");

    let store: Arc<dyn NotificationStore> = Arc::new(PgStore::new(pool));
    let transport: Arc<dyn PushTransport> =
        Arc::new(WebPushTransport::new(config.push_timeout, config.push_ttl_secs)?);
    let dispatcher = Dispatcher::new(store.clone(), transport);

    let sms = match config.twilio.clone() {
        Some(credentials) => Some(SmsClient::new(credentials, config.push_timeout)?),
        None => {
            tracing::info!("Twilio not configured, SMS relay disabled");
            None
        }
    };

    let shared: SharedState = Arc::new(state::AppState {
        lifecycle: Lifecycle::new(store, dispatcher),
        sms,
        service_key: config.service_key.clone(),
    });

    let scheduler = JobScheduler::new().await?;

    let shared_for_reveal = shared.clone();
    scheduler
        .add(Job::new_async(config.reveal_sweep_cron.as_str(), move |_uuid, _l| {
            let state = shared_for_reveal.clone();
            Box::pin(async move {
                match state.lifecycle.reveal_sweep(chrono::Utc::now()).await {
                    Ok(report) if report.weeks_considered > 0 => {
                        tracing::info!(
                            "Reveal sweep: {} weeks, {} notified, {} failed, {} sent, {} undelivered",
                            report.weeks_considered,
                            report.weeks_notified,
                            report.weeks_failed,
                            report.delivery.success_count,
                            report.delivery.failure_count
                        );
                    }
                    Ok(_) => {}
                    Err(e) => tracing::error!("Reveal sweep failed: {}", e),
                }
            })
        })?)
        .await?;

    let shared_for_reminders = shared.clone();
    scheduler
        .add(Job::new_async(config.reminder_sweep_cron.as_str(), move |_uuid, _l| {
            let state = shared_for_reminders.clone();
            Box::pin(async move {
                tracing::info!("Running reminder check...");
                match state.lifecycle.reminder_sweep().await {
                    Ok(report) => tracing::info!(
                        "Reminder sweep: {} active weeks, {} reminded, {} failed, {} sent",
                        report.weeks_considered,
                        report.weeks_notified,
                        report.weeks_failed,
                        report.delivery.success_count
                    ),
                    Err(e) => tracing::error!("Reminder sweep failed: {}", e),
                }
            })
        })?)
        .await?;

    scheduler.start().await?;
    tracing::info!("Scheduler started:");
    tracing::info!("  - Reveal sweep: {}", config.reveal_sweep_cron);
    tracing::info!("  - Reminder sweep: {}", config.reminder_sweep_cron);

    let app = web::routes(shared.clone()).layer(TraceLayer::new_for_http());

    tracing::info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
