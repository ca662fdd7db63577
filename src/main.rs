// src/main.rs

use std::{net::SocketAddr, str::FromStr, sync::Arc, time::Duration};

use dotenvy::dotenv;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use survey_backend::{
    config::Config,
    routes,
    state::AppState,
    store::{MemoryResponseStore, PgResponseStore, ResponseStore, RetryPolicy},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const CONNECT_RETRIES: u32 = 5;

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    tracing::debug!("Loaded configuration: {:?}", config);

    if let Err(e) = run(config).await {
        tracing::error!("Server terminated: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = connect_store(&config).await?;
    tracing::info!("Using {} response store", store.backend_tag());

    // Hashes the admin password; the plaintext stays only in `config`.
    let state = AppState::new(store, config.clone())?;

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Survey backend listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start the server
    axum::serve(listener, app).await?;
    Ok(())
}

async fn connect_store(config: &Config) -> Result<Arc<dyn ResponseStore>, Box<dyn std::error::Error>> {
    if config.uses_memory_store() {
        tracing::warn!("DATABASE_URL is memory://, responses will not survive a restart");
        return Ok(Arc::new(MemoryResponseStore::new()));
    }

    let mut options = PgConnectOptions::from_str(&config.database_url)?;
    if let Some(password) = &config.database_password {
        options = options.password(password);
    }

    // Initialize Database Pool with Retry
    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options.clone())
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > CONNECT_RETRIES {
                    return Err(format!(
                        "Failed to connect to database after {} retries: {}",
                        CONNECT_RETRIES, e
                    )
                    .into());
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations applied successfully.");

    Ok(Arc::new(PgResponseStore::new(
        pool,
        RetryPolicy::with_attempts(config.store_retry_attempts),
    )))
}
