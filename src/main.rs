use anyhow::Context;
use tracing_subscriber::EnvFilter;

use contacts_server::config::Config;
use contacts_server::db::{ConnectionProvider, RecordStore};
use contacts_server::http::run_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("loading configuration")?;

    let provider = if config.pooled {
        tracing::info!("using pooled database connections");
        ConnectionProvider::pooled(&config.db)
    } else {
        ConnectionProvider::direct(&config.db)
    };
    let store = RecordStore::new(provider);

    run_server(store, config.bind_addr)
        .await
        .context("running server")?;

    Ok(())
}
