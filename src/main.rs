// src/main.rs

use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use quiz_backend::adapters::{identity::HttpProfileProvider, text_generation::ChatCompletionsGenerator};
use quiz_backend::config::Config;
use quiz_backend::ports::{ProfileProvider, TextGenerator};
use quiz_backend::state::AppState;
use quiz_backend::{db, routes};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

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

    // Initialize Database Pool with Retry
    let mut retry_count = 0;
    let pool = loop {
        match db::connect(&config.database_url, 5).await {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to connect to database after 5 retries: {}", e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    db::MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    let text_generator = build_text_generator(&config);
    let profiles = build_profile_provider(&config);

    // Create AppState
    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
        text_generator,
        profiles,
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = config.bind_address;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listening address");

    // Start the server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    pool.close().await;
    tracing::info!("Server stopped.");
}

fn build_text_generator(config: &Config) -> Option<Arc<dyn TextGenerator>> {
    let Some(api_key) = config.llm_api_key.clone() else {
        tracing::warn!("LLM_API_KEY not set, note generation disabled (cached notes still served)");
        return None;
    };

    match ChatCompletionsGenerator::new(
        &config.llm_api_url,
        api_key,
        config.llm_model.clone(),
        config.llm_timeout,
    ) {
        Ok(generator) => Some(Arc::new(generator)),
        Err(e) => {
            tracing::error!("Failed to build text generation client: {}", e);
            None
        }
    }
}

fn build_profile_provider(config: &Config) -> Option<Arc<dyn ProfileProvider>> {
    let Some(secret) = config.identity_api_key.clone() else {
        tracing::info!("IDENTITY_API_KEY not set, leaderboard enrichment disabled");
        return None;
    };

    match HttpProfileProvider::new(&config.identity_api_url, secret, config.identity_timeout) {
        Ok(provider) => Some(Arc::new(provider)),
        Err(e) => {
            tracing::error!("Failed to build identity provider client: {}", e);
            None
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
