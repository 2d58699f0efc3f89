use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::http::{decode_each, get_json, id_string};
use super::{JobProvider, ProviderKind};
use crate::errors::FetchError;
use crate::models::{Company, Job, Posting};
use crate::normalize::department::department_or_guess;
use crate::normalize::{application_url, parse_timestamp_ms, slugify};

/// Public per-company feed; `{company}` is replaced with the Breezy subdomain.
pub const DEFAULT_ENDPOINT: &str = "https://{company}.breezy.hr/json";

/// Breezy HR public JSON feed. The feed only lists published positions and
/// there is no company lookup endpoint.
pub struct BreezyProvider {
    client: Client,
    endpoint: String,
}

impl BreezyProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Overrides the feed URL template (must contain `{company}`).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn feed_url(&self, company_id: &str) -> String {
        self.endpoint.replace("{company}", company_id)
    }
}

#[async_trait]
impl JobProvider for BreezyProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Breezy
    }

    async fn fetch_company(&self, id: &str) -> Result<Option<Company>, FetchError> {
        warn!("breezy: GetCompany not supported upstream, echoing '{id}'");
        Ok(Some(Company::stub(id)))
    }

    async fn fetch_postings(
        &self,
        company_id: Option<&str>,
        _now: DateTime<Utc>,
    ) -> Result<Vec<Posting>, FetchError> {
        let Some(company_id) = company_id else {
            debug!("breezy: no company given, nothing to fetch");
            return Ok(Vec::new());
        };

        let request = self.client.get(self.feed_url(company_id));
        let raw: Vec<serde_json::Value> = get_json(request).await?;

        Ok(decode_each::<BreezyPosition>(raw, "breezy position")
            .into_iter()
            .filter_map(|position| map_posting(position, company_id))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct BreezyPosition {
    #[serde(default)]
    id: serde_json::Value,
    #[serde(default)]
    name: String,
    #[serde(default)]
    department: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    published_date: Option<String>,
    #[serde(default)]
    location: Option<BreezyLocation>,
    #[serde(default)]
    company: Option<BreezyCompany>,
}

#[derive(Debug, Deserialize)]
struct BreezyLocation {
    name: Option<String>,
    is_remote: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct BreezyCompany {
    friendly_id: Option<String>,
    name: Option<String>,
    logo_url: Option<String>,
}

fn map_posting(position: BreezyPosition, company_id: &str) -> Option<Posting> {
    let updated = position.published_date.as_deref().and_then(parse_timestamp_ms)?;

    let company = match position.company {
        Some(company) => {
            let title = company.name.unwrap_or_else(|| company_id.to_string());
            Company {
                id: company.friendly_id.unwrap_or_else(|| company_id.to_string()),
                slug: slugify(&title),
                title,
                logo: company.logo_url.unwrap_or_default(),
                ..Default::default()
            }
        }
        None => Company::stub(company_id),
    };

    let (location, remote) = match position.location {
        Some(location) => (
            location.name.unwrap_or_default(),
            location.is_remote.unwrap_or(false),
        ),
        None => (String::new(), false),
    };

    let title = position.name;
    let job = Job {
        id: id_string(&position.id),
        slug: slugify(&title),
        department: department_or_guess(position.department.as_deref(), &title),
        description: String::new(),
        body: String::new(),
        location,
        remote,
        company,
        url: application_url(position.url.as_deref().unwrap_or_default(), &title),
        updated,
        featured_until: None,
        featured: false,
        min_salary: None,
        max_salary: None,
        title,
    };

    Some(Posting::active(job))
}
