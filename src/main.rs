use anyhow::Context;
use clap::Parser;

use paper_table::app;
use paper_table::config::Config;
use paper_table::data::loader::load_file;
use paper_table::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.default_log_filter()),
    )
    .init();

    // A broken dataset is fatal: nothing is served until it loads.
    let dataset = load_file(&config.data)
        .with_context(|| format!("loading paper table from {}", config.data.display()))?;

    let state = AppState::new(dataset, &config).context("compiling templates")?;
    let app = app::build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    log::info!("Serving research papers on http://{}", listener.local_addr()?);
    if config.debug {
        log::info!("Debug mode: error details and live reload enabled");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}
