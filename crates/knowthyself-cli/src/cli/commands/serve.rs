//! Gateway server command.

use anyhow::{Context, Result};
use knowthyself_core::config::Config;
use knowthyself_gateway::AppState;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub async fn run(addr: Option<&str>, config: &Config) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("knowthyself=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState::from_config(config).context("build gateway state")?;
    let addr = addr.map_or_else(|| config.resolved_gateway_addr(), str::to_string);

    knowthyself_gateway::serve(&addr, state).await
}
