use anyhow::{Context, Result};
use strata_core::Settings;
use strata_server::{ServerConfig, create_app};

pub async fn run(settings: Settings, bind: Option<String>) -> Result<()> {
    let addr = bind.unwrap_or_else(|| settings.bind_address.clone());
    if !settings.jira_configured() {
        tracing::warn!("Jira credentials are not set; ticket fetches will fail until they are");
    }

    let config = ServerConfig::from_settings(settings)?;
    let app = create_app(config);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot listen on {}", addr))?;

    tracing::info!(%addr, "server started");
    println!("Strata server listening on http://{}", addr);
    println!("Press Ctrl+C to stop");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
