use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::http::build_client;
use super::{
    AirtableProvider, BreezyProvider, GreenhouseProvider, JobProvider, LeverProvider, ProviderKind,
};
use crate::config::Config;
use crate::errors::ConfigError;

/// Provider instances keyed by kind. Held by the aggregator; cloning shares the adapters.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn JobProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds one adapter per provider named in `config.sources`, all sharing
    /// a single HTTP client. Fails if a named provider cannot be configured.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let client = build_client(config.http_timeout)?;
        let mut registry = Self::new();

        for kind in config.sources.kinds() {
            let provider: Arc<dyn JobProvider> = match kind {
                ProviderKind::Airtable => Arc::new(
                    AirtableProvider::new(client.clone(), config.airtable_credentials()?)
                        .with_api_url(config.airtable_api_url.clone()),
                ),
                ProviderKind::Breezy => Arc::new(BreezyProvider::new(client.clone())),
                ProviderKind::Greenhouse => Arc::new(GreenhouseProvider::new(client.clone())),
                ProviderKind::Lever => Arc::new(LeverProvider::new(client.clone())),
            };
            registry.register(provider);
        }

        info!("Provider registry ready: {:?}", registry.kinds());
        Ok(registry)
    }

    /// Adds or replaces the adapter for its kind.
    pub fn register(&mut self, provider: Arc<dyn JobProvider>) {
        self.providers.insert(provider.kind(), provider);
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn JobProvider>> {
        self.providers.get(&kind).cloned()
    }

    pub fn kinds(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<ProviderKind> = self.providers.keys().copied().collect();
        kinds.sort();
        kinds
    }
}
