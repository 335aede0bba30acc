mod cli;

use clap::Parser;
use quotron_gateway::{app_config, router, startup};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let mut config = app_config::load_config();
    let cli = cli::Cli::parse();
    cli.apply(&mut config);
    config.log_summary();

    let state = startup::build_app_state(config.clone()).await?;
    let app = router::build_router(state);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("gateway listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Waits for SIGTERM or ctrl-c so `axum::serve` can drain in-flight requests
/// before exiting, grounded in `eisenbahn-launcher`'s `shutdown_signal()`.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to register SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.expect("failed to listen for ctrl_c");
    }

    info!("shutdown signal received — draining in-flight requests");
}
