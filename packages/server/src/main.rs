use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use server::app::build_app;
use server::state::AppState;
use server::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;

    catalog::MIGRATOR
        .run(&pool)
        .await
        .context("failed to run database migrations")?;

    let catalog: Arc<dyn catalog::Catalog> = Arc::new(catalog::PostgresCatalog::new(pool));

    let execution_core = execution::ExecutionCore::new(
        catalog.clone(),
        execution::ExecutionConfig {
            max_workers: config.max_workers,
            max_retries: config.max_retries,
            request_timeout: config.request_timeout,
            queue_capacity: config.queue_capacity,
        },
    );
    execution_core.start().await;

    let dispatch_core = dispatch::DispatchCore::new(
        catalog.clone(),
        execution_core.clone(),
        config.refresh_interval,
    );
    let dispatch_handle = tokio::spawn(dispatch_core.clone().run());

    let state = AppState {
        catalog,
        dispatch: dispatch_core.clone(),
        execution: execution_core.clone(),
    };

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;

    tracing::info!(port = config.port, "scheduler server listening");

    let shutdown = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
        tracing::info!("shutdown signal received");
        dispatch_core.stop();
        execution_core.stop().await;
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("server error")?;

    dispatch_handle.abort();
    Ok(())
}
