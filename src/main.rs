use std::sync::Arc;
use water_reports::api::router;
use water_reports::config::{ServerConfig, USAGE};
use water_reports::reports::store::ReportStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        // .with_max_level(tracing::Level::DEBUG)
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            eprintln!("Example: water-reports --bind 0.0.0.0:8080 --data-file reports.jsonl");
            std::process::exit(1);
        }
    };

    // 1. Report store:
    let store = Arc::new(match &config.data_file {
        Some(path) => {
            tracing::info!("Using journal {}", path.display());
            ReportStore::open(path)?
        }
        None => {
            tracing::info!("No data file configured, reports are kept in memory only");
            ReportStore::in_memory()
        }
    });

    // 2. HTTP router:
    let app = router(store.clone());

    // 3. Start HTTP server:
    tracing::info!("HTTP server listening on {}", config.bind);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 4. Tear down the store:
    store.shutdown()?;
    tracing::info!("Shut down cleanly");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
