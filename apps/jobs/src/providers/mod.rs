//! Provider adapters, one per upstream ATS, all behind `JobProvider`.
//!
//! Adapters implement the two fallible primitives (`fetch_company`,
//! `fetch_postings`). The listing rules and the log-and-degrade boundary live
//! in the trait's provided methods, so every adapter behaves the same way.
//!
//! The aggregator holds adapters as `Arc<dyn JobProvider>` in a `ProviderRegistry`.

pub mod airtable;
pub mod breezy;
pub mod greenhouse;
pub mod http;
pub mod lever;
pub mod registry;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::errors::FetchError;
use crate::models::{Company, Job, Posting};
use crate::normalize::{finalize_listing, ListingRules};

pub use airtable::{AirtableCredentials, AirtableProvider};
pub use breezy::BreezyProvider;
pub use greenhouse::GreenhouseProvider;
pub use lever::LeverProvider;
pub use registry::ProviderRegistry;

/// Upstream ATS identifiers, as they appear in sources configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Airtable,
    Breezy,
    Greenhouse,
    Lever,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Airtable => "airtable",
            ProviderKind::Breezy => "breezy",
            ProviderKind::Greenhouse => "greenhouse",
            ProviderKind::Lever => "lever",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Internal result of a provider call. Public callers only ever see the
/// degraded form (`Option` / possibly-empty `Vec`); tests can inspect this.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    Found(T),
    Empty,
    Failed(FetchError),
}

impl<T> FetchOutcome<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }
}

/// One upstream ATS. Implement the two `fetch_*` primitives; callers use
/// `get_company` / `get_jobs`, which never fail.
#[async_trait]
pub trait JobProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Looks up one company. `Ok(None)` when the upstream has no such company.
    async fn fetch_company(&self, id: &str) -> Result<Option<Company>, FetchError>;

    /// Fetches and maps postings, optionally scoped to one company.
    /// `now` is the fetch time used for `featured`; listing rules are applied by the caller.
    async fn fetch_postings(
        &self,
        company_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Posting>, FetchError>;

    async fn try_get_company(&self, id: &str) -> FetchOutcome<Company> {
        match self.fetch_company(id).await {
            Ok(Some(company)) => FetchOutcome::Found(company),
            Ok(None) => FetchOutcome::Empty,
            Err(err) => FetchOutcome::Failed(err),
        }
    }

    async fn try_get_jobs(
        &self,
        company_id: Option<&str>,
        max_items: Option<usize>,
    ) -> FetchOutcome<Vec<Job>> {
        let now = Utc::now();
        match self.fetch_postings(company_id, now).await {
            Ok(postings) => {
                let jobs = finalize_listing(postings, now, ListingRules::with_max_items(max_items));
                if jobs.is_empty() {
                    FetchOutcome::Empty
                } else {
                    FetchOutcome::Found(jobs)
                }
            }
            Err(err) => FetchOutcome::Failed(err),
        }
    }

    async fn get_company(&self, id: &str) -> Option<Company> {
        match self.try_get_company(id).await {
            FetchOutcome::Found(company) => Some(company),
            FetchOutcome::Empty => {
                debug!("{}: no company found for '{}'", self.kind(), id);
                None
            }
            FetchOutcome::Failed(err) => {
                error!(
                    provider = %self.kind(),
                    company = id,
                    "GetCompany: unable to fetch company: {err}"
                );
                None
            }
        }
    }

    async fn get_jobs(&self, company_id: Option<&str>, max_items: Option<usize>) -> Vec<Job> {
        match self.try_get_jobs(company_id, max_items).await {
            FetchOutcome::Found(jobs) => {
                debug!(
                    "{}: {} jobs for {}",
                    self.kind(),
                    jobs.len(),
                    company_id.unwrap_or("<all>")
                );
                jobs
            }
            FetchOutcome::Empty => Vec::new(),
            FetchOutcome::Failed(err) => {
                error!(
                    provider = %self.kind(),
                    company = company_id.unwrap_or("<all>"),
                    "GetJobs: unable to fetch jobs: {err}"
                );
                Vec::new()
            }
        }
    }
}
