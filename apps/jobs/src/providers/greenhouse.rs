use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::http::{decode_each, get_json, get_json_optional, id_string};
use super::{JobProvider, ProviderKind};
use crate::errors::FetchError;
use crate::models::{Company, Job, Posting};
use crate::normalize::department::department_or_guess;
use crate::normalize::{
    application_url, mentions_remote, parse_timestamp_ms, slugify, unescape_html,
};

pub const DEFAULT_API_URL: &str = "https://boards-api.greenhouse.io/v1/boards";

/// Greenhouse job board API. Boards expose both a company profile and the
/// open jobs, so jobs embed a real company snapshot.
pub struct GreenhouseProvider {
    client: Client,
    api_url: String,
}

impl GreenhouseProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Company for embedding in jobs; falls back to a stub so jobs survive a
    /// failed profile lookup.
    async fn embedded_company(&self, board: &str) -> Company {
        match self.fetch_company(board).await {
            Ok(Some(company)) => company,
            Ok(None) => Company::stub(board),
            Err(err) => {
                warn!("greenhouse: company lookup for '{board}' failed, using stub: {err}");
                Company::stub(board)
            }
        }
    }
}

#[async_trait]
impl JobProvider for GreenhouseProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Greenhouse
    }

    async fn fetch_company(&self, id: &str) -> Result<Option<Company>, FetchError> {
        let request = self.client.get(format!("{}/{}", self.api_url, id));
        let board: Option<GreenhouseBoard> = get_json_optional(request).await?;

        Ok(board.map(|board| {
            let title = board.name.unwrap_or_else(|| id.to_string());
            Company {
                id: id.to_string(),
                slug: slugify(&title),
                title,
                body: board.content.as_deref().map(unescape_html).unwrap_or_default(),
                ..Default::default()
            }
        }))
    }

    async fn fetch_postings(
        &self,
        company_id: Option<&str>,
        _now: DateTime<Utc>,
    ) -> Result<Vec<Posting>, FetchError> {
        let Some(board) = company_id else {
            debug!("greenhouse: no board given, nothing to fetch");
            return Ok(Vec::new());
        };

        let request = self
            .client
            .get(format!("{}/{}/jobs", self.api_url, board))
            .query(&[("content", "true")]);

        let (company, listing) = futures::join!(
            self.embedded_company(board),
            get_json::<GreenhouseJobs>(request)
        );
        let listing = listing?;

        Ok(decode_each::<GreenhouseJob>(listing.jobs, "greenhouse job")
            .into_iter()
            .filter_map(|job| map_posting(job, &company))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct GreenhouseBoard {
    name: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GreenhouseJobs {
    #[serde(default)]
    jobs: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GreenhouseJob {
    #[serde(default)]
    id: serde_json::Value,
    #[serde(default)]
    title: String,
    updated_at: Option<String>,
    absolute_url: Option<String>,
    content: Option<String>,
    location: Option<NamedValue>,
    #[serde(default)]
    departments: Vec<NamedValue>,
}

#[derive(Debug, Deserialize)]
struct NamedValue {
    name: Option<String>,
}

fn map_posting(raw: GreenhouseJob, company: &Company) -> Option<Posting> {
    let updated = raw.updated_at.as_deref().and_then(parse_timestamp_ms)?;
    let location = raw
        .location
        .and_then(|location| location.name)
        .unwrap_or_default();
    let department = raw.departments.into_iter().find_map(|dept| dept.name);
    let title = raw.title;

    let job = Job {
        id: id_string(&raw.id),
        slug: slugify(&title),
        department: department_or_guess(department.as_deref(), &title),
        description: String::new(),
        body: raw.content.as_deref().map(unescape_html).unwrap_or_default(),
        remote: mentions_remote(&location),
        location,
        company: company.clone(),
        url: application_url(raw.absolute_url.as_deref().unwrap_or_default(), &title),
        updated,
        featured_until: None,
        featured: false,
        min_salary: None,
        max_salary: None,
        title,
    };

    Some(Posting::active(job))
}
