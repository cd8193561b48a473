//! Headless monitor binary.
//!
//! Catches up configured channels, listens on the gateway for new scores
//! and resyncs periodically until Ctrl+C.

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use wordgame_scores_lib::{background, live};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting word-game score monitor");

    let ctx = wordgame_scores_lib::init_foundation()?;

    let s = ctx.clone();
    let startup = tokio::spawn(async move { background::startup_sync(s).await });

    let s = ctx.clone();
    let gateway = tokio::spawn(async move { live::run(s).await });

    tracing::info!("Monitor running. Press Ctrl+C to stop.");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");
    ctx.shutdown_token().cancel();

    // In-flight pages finish persisting before their sync returns.
    let _ = tokio::time::timeout(Duration::from_secs(10), async {
        let _ = startup.await;
        let _ = gateway.await;
    })
    .await;
    tracing::info!("Shutdown completed");
    Ok(())
}
