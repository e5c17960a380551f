//! IntelliJect server binary
//!
//! Run with: cargo run -p intelliject --bin intelliject-server

use intelliject::{config::AppConfig, server::IntelliJectServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intelliject=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Backend: {:?}", config.backend);
    tracing::info!("  - Generation model: {}", config.generation_model());
    tracing::info!("  - Embedding model: {}", config.embedding_model());
    tracing::info!("  - Database: {}", config.database.path.display());
    tracing::info!("  - Questions per chunk: {}", config.pipeline.top_k);

    let server = IntelliJectServer::new(config).await?;

    println!("\nIntelliJect starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  Ready: http://{}/ready", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
