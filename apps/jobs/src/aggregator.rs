//! Fans out one `get_jobs` call per (provider, company) pair and concatenates
//! the results in configuration order.

use futures::future::join_all;
use tracing::{info, warn};

use crate::models::{Company, Job};
use crate::normalize::rank_featured_first;
use crate::providers::{ProviderKind, ProviderRegistry};
use crate::sources::SourcesConfig;

/// Per-company cap used by the aggregator unless overridden.
pub const JOBS_AMOUNT_PER_COMPANY: usize = 20;

pub struct Aggregator {
    registry: ProviderRegistry,
    sources: SourcesConfig,
    per_company: usize,
}

impl Aggregator {
    pub fn new(registry: ProviderRegistry, sources: SourcesConfig) -> Self {
        Self {
            registry,
            sources,
            per_company: JOBS_AMOUNT_PER_COMPANY,
        }
    }

    pub fn with_per_company(mut self, per_company: usize) -> Self {
        self.per_company = per_company;
        self
    }

    /// All configured requests run concurrently. Each company's slice is
    /// already filtered and sorted by its provider; no global re-sort happens here.
    pub async fn get_jobs(&self) -> Vec<Job> {
        let requests = self.sources.requests();
        let total = requests.len();

        let calls = requests.into_iter().map(|(kind, company)| async move {
            let Some(provider) = self.registry.get(kind) else {
                warn!(
                    "No provider registered for '{kind}', skipping {}",
                    company.as_deref().unwrap_or("<all>")
                );
                return Vec::new();
            };
            provider.get_jobs(company.as_deref(), Some(self.per_company)).await
        });

        let jobs: Vec<Job> = join_all(calls).await.into_iter().flatten().collect();
        info!("Aggregated {} jobs from {} requests", jobs.len(), total);
        jobs
    }

    /// `get_jobs` followed by `rank_jobs`.
    pub async fn get_ranked_jobs(&self) -> Vec<Job> {
        rank_jobs(self.get_jobs().await)
    }

    pub async fn get_company(&self, kind: ProviderKind, id: &str) -> Option<Company> {
        match self.registry.get(kind) {
            Some(provider) => provider.get_company(id).await,
            None => {
                warn!("No provider registered for '{kind}', cannot look up '{id}'");
                None
            }
        }
    }
}

/// Single feed across providers: featured first, then newest first.
pub fn rank_jobs(mut jobs: Vec<Job>) -> Vec<Job> {
    rank_featured_first(&mut jobs);
    jobs
}
