//! Which companies to query on which ATS.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::providers::ProviderKind;

const BREEZY_COMPANIES: &[&str] = &[
    "the-graph",
    "immunefi",
    "superrare",
    "centrifuge",
    "celer-network",
    "bloxstaking",
    "hal-collective-inc",
    "spruce-systems",
];

const GREENHOUSE_COMPANIES: &[&str] = &[
    "consensys",
    "consensysinc",
    "gnosis",
    "openzeppelin",
    "figment",
    "0x",
    "blockdaemon",
    "setlabs",
    "dydx",
    "brave",
    "dharma",
    "thesis",
    "matterlabs",
    "chainsafesystems",
    "textileio",
    "optimism",
    "nethermind",
    "ankrnetwork",
];

const LEVER_COMPANIES: &[&str] = &[
    "aragon",
    "bobanetwork",
    "centrifuge",
    "protocol",
    "compound-2",
    "Uniswap",
    "Mycelium",
    "chainlink",
    "RabbitHoleStudios",
    "with-foundation",
    "Rarible",
    "defialliance",
    "zerion",
    "3box",
    "ArtBlocks",
    "blocknative",
    "connext-network",
    "fuellabs",
    "alchemy",
    "offchainlabs",
    "axiomzen",
    "immutable",
    "filecoin",
    "TorusLabs",
    "certik",
    "trailofbits",
    "obol-tech",
    "quicknode",
    "ETHGlobal",
    "Polygon",
];

/// One provider and the companies to query on it.
/// An empty company list means a single unscoped query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub provider: ProviderKind,
    #[serde(default)]
    pub companies: Vec<String>,
}

impl Source {
    pub fn new(provider: ProviderKind, companies: &[&str]) -> Self {
        Self {
            provider,
            companies: companies.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Ordered list of sources handed to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub sources: Vec<Source>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                Source::new(ProviderKind::Airtable, &[]),
                Source::new(ProviderKind::Breezy, BREEZY_COMPANIES),
                Source::new(ProviderKind::Greenhouse, GREENHOUSE_COMPANIES),
                Source::new(ProviderKind::Lever, LEVER_COMPANIES),
            ],
        }
    }
}

impl SourcesConfig {
    pub fn new(sources: Vec<Source>) -> Self {
        Self { sources }
    }

    /// Loads a JSON sources file: `{"sources": [{"provider": "breezy", "companies": [...]}]}`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::SourcesRead {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::SourcesParse {
            path: display,
            source,
        })
    }

    /// Distinct providers named, in first-mention order.
    pub fn kinds(&self) -> Vec<ProviderKind> {
        let mut kinds = Vec::new();
        for source in &self.sources {
            if !kinds.contains(&source.provider) {
                kinds.push(source.provider);
            }
        }
        kinds
    }

    /// Flattened (provider, company) requests in configuration order.
    pub fn requests(&self) -> Vec<(ProviderKind, Option<String>)> {
        self.sources
            .iter()
            .flat_map(|source| {
                if source.companies.is_empty() {
                    vec![(source.provider, None)]
                } else {
                    source
                        .companies
                        .iter()
                        .map(|company| (source.provider, Some(company.clone())))
                        .collect()
                }
            })
            .collect()
    }
}
