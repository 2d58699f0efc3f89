use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobs::{Aggregator, Config, ProviderRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Logs go to stderr; stdout carries the JSON feed
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting jobs aggregator v{}", env!("CARGO_PKG_VERSION"));

    let registry = ProviderRegistry::from_config(&config)?;
    let aggregator =
        Aggregator::new(registry, config.sources.clone()).with_per_company(config.per_company);

    let jobs = if config.ranked {
        aggregator.get_ranked_jobs().await
    } else {
        aggregator.get_jobs().await
    };

    println!("{}", serde_json::to_string_pretty(&jobs)?);
    Ok(())
}
