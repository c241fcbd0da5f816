mod api_client;
mod config;
mod console;
mod errors;
mod models;
mod router;
mod saved_jobs;
mod screens;
mod session;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api_client::{ApiClient, RecruitingApi};
use crate::config::Config;
use crate::console::{Console, ConsoleSettings};
use crate::session::Session;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Logs go to stderr so they never interleave with rendered screens
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting recruiting console v{}", env!("CARGO_PKG_VERSION"));

    let client = ApiClient::new(&config.api_base_url, config.request_timeout)
        .context("Failed to build HTTP client")?;
    info!("API client initialized (base url: {})", client.base_url());
    let api: Arc<dyn RecruitingApi> = Arc::new(client);

    let mut session = Session::new(api);
    session.initialize().await;

    Console::new(session, ConsoleSettings::from(&config)).run().await
}
