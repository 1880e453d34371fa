//! Renewal scheduler binary.
//!
//! Loads configuration from the environment, brings up the store and the
//! broker, then scans for due renewals until Ctrl-C.

use std::process::ExitCode;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;

use subscription_tracker::adapters::{
    PostgresSubscriptionRepository, RedisQueueConnector, SystemClock,
};
use subscription_tracker::application::renewal::{
    DispatcherSettings, RenewalDispatcher, RenewalQueues, RetryPolicy,
};
use subscription_tracker::config::AppConfig;
use subscription_tracker::telemetry;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load().and_then(|c| {
        c.validate()?;
        Ok(c)
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("renewal-scheduler: {}", e);
            return ExitCode::FAILURE;
        }
    };

    telemetry::init_tracing(&config.service);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Renewal scheduler stopped with an error");
            ExitCode::FAILURE
        }
    }
}

fn dispatcher_settings(config: &AppConfig) -> DispatcherSettings {
    DispatcherSettings {
        connect: RetryPolicy::new(config.queue.max_retries, config.queue.retry_delay()),
        store_readiness: RetryPolicy::new(
            config.database.readiness_max_retries,
            config.database.readiness_retry_delay(),
        ),
        poll_interval: config.scheduler.poll_interval(),
        queues: RenewalQueues {
            due_today: config.queue.due_today_queue.clone(),
            due_tomorrow: config.queue.due_tomorrow_queue.clone(),
        },
    }
}

async fn run(config: AppConfig) -> Result<(), BoxError> {
    tracing::info!(
        environment = ?config.service.environment,
        poll_interval_secs = config.scheduler.poll_interval_secs,
        "Starting renewal scheduler"
    );

    // Lazy pool: readiness is checked by the dispatcher with retries.
    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(Some(config.database.idle_timeout()))
        .connect_lazy(&config.database.url)?;

    let repository = Arc::new(PostgresSubscriptionRepository::new(pool));
    let settings = dispatcher_settings(&config);

    if config.database.run_migrations {
        settings
            .store_readiness
            .run("migrations", || repository.migrate())
            .await
            .map_err(|e| e.last_error)?;
        tracing::info!("Migrations applied");
    }

    let connector = Arc::new(RedisQueueConnector::new(&config.queue.url)?);
    let dispatcher = RenewalDispatcher::new(connector, repository, Arc::new(SystemClock), settings);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let running = dispatcher.start(shutdown_rx).await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown requested, draining");

    let _ = shutdown_tx.send(true);
    running.drain().await;

    Ok(())
}
