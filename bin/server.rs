// Home Ledger - Web Server

use anyhow::{Context, Result};
use home_ledger::{build_router, telemetry, Config};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();

    let config = Config::from_env();
    let store = config.store();

    // Touch the file once so a corrupt ledger is repaired before the first request
    let records = store
        .load()
        .with_context(|| format!("Failed to open ledger at {:?}", store.path()))?;
    tracing::info!(
        path = %store.path().display(),
        movements = records.len(),
        import_mode = ?store.import_mode(),
        "ledger ready"
    );

    let app = build_router(store, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
