//! Airtable-backed job board.
//!
//! Jobs and companies live in two tables of one base. Company columns on the
//! Jobs table are lookup fields, so they arrive as lists.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::http::{decode_each, get_json};
use super::{JobProvider, ProviderKind};
use crate::errors::{ConfigError, FetchError};
use crate::models::{Company, Job, Posting};
use crate::normalize::department::department_or_guess;
use crate::normalize::{application_url, first_or_empty, non_empty_or, parse_timestamp_ms, slugify};

pub const DEFAULT_API_URL: &str = "https://api.airtable.com";

const JOBS_TABLE: &str = "Jobs";

/// Upper bound on pages followed for one select.
const MAX_PAGES: usize = 100;
const COMPANIES_TABLE: &str = "Companies";

pub const API_KEY_VAR: &str = "AIRTABLE_API_KEY";
pub const API_BASE_VAR: &str = "AIRTABLE_API_BASE";

#[derive(Clone)]
pub struct AirtableCredentials {
    pub api_key: String,
    pub base_id: String,
}

impl fmt::Debug for AirtableCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirtableCredentials")
            .field("api_key", &"<redacted>")
            .field("base_id", &self.base_id)
            .finish()
    }
}

impl AirtableCredentials {
    /// Reads `AIRTABLE_API_KEY` / `AIRTABLE_API_BASE`. Both must be set and non-empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        match (read(API_KEY_VAR), read(API_BASE_VAR)) {
            (Some(api_key), Some(base_id)) => Ok(Self { api_key, base_id }),
            _ => Err(missing_credentials()),
        }
    }
}

pub fn missing_credentials() -> ConfigError {
    ConfigError::MissingCredentials {
        provider: "Airtable",
        vars: "AIRTABLE_API_KEY and AIRTABLE_API_BASE",
    }
}

pub struct AirtableProvider {
    client: Client,
    api_url: String,
    credentials: AirtableCredentials,
}

impl AirtableProvider {
    pub fn new(client: Client, credentials: AirtableCredentials) -> Self {
        Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
            credentials,
        }
    }

    /// Fails fast, before any request, when credentials are missing from the environment.
    pub fn from_env(client: Client) -> Result<Self, ConfigError> {
        Ok(Self::new(client, AirtableCredentials::from_env()?))
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Runs a filtered select over `table`, following the `offset` cursor to the end.
    /// Stops early on a repeated cursor or after `MAX_PAGES` pages.
    async fn select_all<F: DeserializeOwned>(
        &self,
        table: &str,
        formula: &str,
    ) -> Result<Vec<AirtableRecord<F>>, FetchError> {
        let url = format!("{}/v0/{}/{}", self.api_url, self.credentials.base_id, table);
        let mut records = Vec::new();
        let mut offset: Option<String> = None;
        let mut pages = 0;

        loop {
            let mut request = self
                .client
                .get(&url)
                .bearer_auth(&self.credentials.api_key)
                .query(&[("filterByFormula", formula)]);
            if let Some(cursor) = offset.as_deref() {
                request = request.query(&[("offset", cursor)]);
            }

            let page: AirtablePage = get_json(request).await?;
            records.extend(decode_each::<AirtableRecord<F>>(page.records, table));
            pages += 1;

            match page.offset {
                None => break,
                Some(next) if offset.as_deref() == Some(next.as_str()) => {
                    warn!("airtable: {table} returned offset '{next}' twice, stopping");
                    break;
                }
                Some(_) if pages >= MAX_PAGES => {
                    warn!("airtable: {table} select stopped after {MAX_PAGES} pages");
                    break;
                }
                Some(next) => offset = Some(next),
            }
        }

        debug!("airtable: {} records from {}", records.len(), table);
        Ok(records)
    }
}

#[async_trait]
impl JobProvider for AirtableProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Airtable
    }

    async fn fetch_company(&self, id: &str) -> Result<Option<Company>, FetchError> {
        let records = self
            .select_all::<CompanyFields>(COMPANIES_TABLE, &company_formula(id))
            .await?;

        // SEARCH matches substrings, so prefer the exact slug when there is one.
        let record = records
            .iter()
            .find(|r| r.fields.slug.as_deref() == Some(id))
            .or_else(|| records.first());

        Ok(record.map(|record| map_company(&record.fields, id)))
    }

    async fn fetch_postings(
        &self,
        company_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Posting>, FetchError> {
        let records = self
            .select_all::<JobFields>(JOBS_TABLE, &jobs_formula(company_id))
            .await?;

        Ok(records
            .into_iter()
            .filter_map(|record| map_posting(record, now))
            .collect())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Formulas
// ────────────────────────────────────────────────────────────────────────────

/// Escapes a value for use inside a double-quoted formula string literal.
fn quote_formula_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn jobs_formula(company_id: Option<&str>) -> String {
    match company_id {
        Some(id) => format!(
            "AND({{Active}}, {{Company Slug}} = {})",
            quote_formula_string(id)
        ),
        None => "AND({Active})".to_string(),
    }
}

fn company_formula(id: &str) -> String {
    format!("SEARCH({}, {{Slug}})", quote_formula_string(id))
}

// ────────────────────────────────────────────────────────────────────────────
// Wire format
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AirtablePage {
    #[serde(default)]
    records: Vec<serde_json::Value>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AirtableRecord<F> {
    id: String,
    fields: F,
}

#[derive(Debug, Deserialize)]
struct Attachment {
    url: String,
}

#[derive(Debug, Deserialize)]
struct JobFields {
    #[serde(rename = "Slug")]
    slug: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Department")]
    department: Option<String>,
    #[serde(rename = "Description")]
    description: Option<String>,
    #[serde(rename = "Body")]
    body: Option<String>,
    #[serde(rename = "Location")]
    location: Option<String>,
    #[serde(rename = "Remote")]
    remote: Option<bool>,
    #[serde(rename = "Active")]
    active: Option<bool>,
    #[serde(rename = "Company Slug", default)]
    company_slug: Vec<String>,
    #[serde(rename = "Company Name", default)]
    company_name: Vec<String>,
    #[serde(rename = "Company Description", default)]
    company_description: Vec<String>,
    #[serde(rename = "Company Body", default)]
    company_body: Vec<String>,
    #[serde(rename = "Company Website", default)]
    company_website: Vec<String>,
    #[serde(rename = "Company Twitter", default)]
    company_twitter: Vec<String>,
    #[serde(rename = "Company Github", default)]
    company_github: Vec<String>,
    #[serde(rename = "Company Logo", default)]
    company_logo: Vec<Attachment>,
    #[serde(rename = "External Url")]
    external_url: Option<String>,
    #[serde(rename = "Updated")]
    updated: Option<String>,
    #[serde(rename = "Featured")]
    featured: Option<String>,
    #[serde(rename = "Min Salary")]
    min_salary: Option<f64>,
    #[serde(rename = "Max Salary")]
    max_salary: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CompanyFields {
    #[serde(rename = "Slug")]
    slug: Option<String>,
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Description")]
    description: Option<String>,
    #[serde(rename = "Body")]
    body: Option<String>,
    #[serde(rename = "Website")]
    website: Option<String>,
    #[serde(rename = "Twitter")]
    twitter: Option<String>,
    #[serde(rename = "Github")]
    github: Option<String>,
    #[serde(rename = "Logo", default)]
    logo: Vec<Attachment>,
}

// ────────────────────────────────────────────────────────────────────────────
// Mapping
// ────────────────────────────────────────────────────────────────────────────

fn map_posting(record: AirtableRecord<JobFields>, now: DateTime<Utc>) -> Option<Posting> {
    let AirtableRecord { id: record_id, fields } = record;

    let Some(updated) = fields.updated.as_deref().and_then(parse_timestamp_ms) else {
        debug!("airtable: dropping job {record_id} without a usable Updated date");
        return None;
    };

    let title = fields.title.unwrap_or_default();
    let company_title = first_or_empty(&fields.company_name);
    let company = Company {
        id: first_or_empty(&fields.company_slug),
        slug: slugify(&company_title),
        title: company_title,
        description: first_or_empty(&fields.company_description),
        body: first_or_empty(&fields.company_body),
        website: first_or_empty(&fields.company_website),
        twitter: first_or_empty(&fields.company_twitter),
        github: first_or_empty(&fields.company_github),
        logo: fields
            .company_logo
            .first()
            .map(|logo| logo.url.clone())
            .unwrap_or_default(),
    };

    let job = Job {
        id: fields.slug.unwrap_or(record_id),
        slug: slugify(&title),
        department: department_or_guess(fields.department.as_deref(), &title),
        description: fields.description.unwrap_or_default(),
        body: fields.body.unwrap_or_default(),
        location: fields.location.unwrap_or_default(),
        remote: fields.remote.unwrap_or(false),
        company,
        url: application_url(fields.external_url.as_deref().unwrap_or_default(), &title),
        updated,
        featured_until: None,
        featured: false,
        min_salary: fields.min_salary.filter(|salary| *salary != 0.0),
        max_salary: fields.max_salary.filter(|salary| *salary != 0.0),
        title,
    }
    .with_featured_until(
        fields.featured.as_deref().and_then(parse_timestamp_ms),
        now.timestamp_millis(),
    );

    Some(Posting {
        job,
        active: fields.active.unwrap_or(false),
    })
}

fn map_company(fields: &CompanyFields, requested_id: &str) -> Company {
    let title = fields.name.clone().unwrap_or_default();
    Company {
        id: fields
            .slug
            .clone()
            .unwrap_or_else(|| requested_id.to_string()),
        slug: slugify(&title),
        description: non_empty_or(fields.description.as_deref(), &title),
        body: non_empty_or(fields.body.as_deref(), &title),
        website: fields.website.clone().unwrap_or_default(),
        twitter: fields.twitter.clone().unwrap_or_default(),
        github: fields.github.clone().unwrap_or_default(),
        logo: fields
            .logo
            .first()
            .map(|logo| logo.url.clone())
            .unwrap_or_default(),
        title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env_guard;
    use crate::providers::http::build_client;
    use chrono::Duration;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn credentials() -> AirtableCredentials {
        AirtableCredentials {
            api_key: "key-test".to_string(),
            base_id: "appBase".to_string(),
        }
    }

    fn provider(server: &Server) -> AirtableProvider {
        let client = build_client(std::time::Duration::from_secs(5)).unwrap();
        AirtableProvider::new(client, credentials()).with_api_url(server.url())
    }

    fn iso_days_ago(days: i64) -> String {
        (Utc::now() - Duration::days(days)).to_rfc3339()
    }

    fn job_record(slug: &str, title: &str, updated: &str) -> serde_json::Value {
        json!({
            "id": format!("rec{slug}"),
            "createdTime": "2021-01-01T00:00:00.000Z",
            "fields": {
                "Slug": slug,
                "Title": title,
                "Description": "Short blurb",
                "Body": "<p>Long body</p>",
                "Location": "Remote",
                "Active": true,
                "Company Slug": ["gitcoin"],
                "Company Name": ["Gitcoin"],
                "Company Description": ["Fund public goods"],
                "Company Body": ["Gitcoin body"],
                "Company Website": ["https://gitcoin.co"],
                "Company Twitter": [],
                "Company Github": ["https://github.com/gitcoinco"],
                "Company Logo": [{"id": "att1", "url": "https://cdn.example.com/logo.png"}],
                "External Url": "jobs@example.com",
                "Updated": updated
            }
        })
    }

    fn decode_job(value: serde_json::Value) -> AirtableRecord<JobFields> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_from_env_without_credentials_is_config_error() {
        let _lock = env_guard().lock().unwrap_or_else(|e| e.into_inner());
        std::env::remove_var(API_KEY_VAR);
        std::env::remove_var(API_BASE_VAR);

        let client = build_client(std::time::Duration::from_secs(5)).unwrap();
        let err = AirtableProvider::from_env(client).err().expect("missing credentials");
        assert!(matches!(err, ConfigError::MissingCredentials { .. }));
        assert!(err.to_string().contains("AIRTABLE_API_KEY"));
    }

    #[test]
    fn test_from_env_rejects_blank_values() {
        let _lock = env_guard().lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var(API_KEY_VAR, "key-test");
        std::env::set_var(API_BASE_VAR, "  ");

        assert!(AirtableCredentials::from_env().is_err());

        std::env::set_var(API_BASE_VAR, "appBase");
        let creds = AirtableCredentials::from_env().expect("credentials present");
        assert_eq!(creds.base_id, "appBase");
        assert!(!format!("{creds:?}").contains("key-test"));

        std::env::remove_var(API_KEY_VAR);
        std::env::remove_var(API_BASE_VAR);
    }

    #[test]
    fn test_formulas_embed_escaped_identifiers() {
        assert_eq!(jobs_formula(None), "AND({Active})");
        assert_eq!(
            jobs_formula(Some("gitcoin")),
            "AND({Active}, {Company Slug} = \"gitcoin\")"
        );
        assert_eq!(
            company_formula("evil\") , TRUE()"),
            "SEARCH(\"evil\\\") , TRUE()\", {Slug})"
        );
    }

    #[test]
    fn test_map_posting_field_contract() {
        let now = Utc::now();
        let record = decode_job(job_record(
            "senior-eng",
            "Senior Protocol Engineer",
            &iso_days_ago(1),
        ));
        let posting = map_posting(record, now).expect("mapped");
        let job = posting.job;

        assert!(posting.active);
        assert_eq!(job.id, "senior-eng");
        assert_eq!(job.slug, "senior-protocol-engineer");
        assert!(job.department.contains("Engineering"));
        assert!(!job.remote);
        assert_eq!(
            job.url,
            "mailto:jobs@example.com?subject=Apply for Senior Protocol Engineer (useWeb3)"
        );
        assert_eq!(job.company.id, "gitcoin");
        assert_eq!(job.company.slug, "gitcoin");
        assert_eq!(job.company.twitter, "");
        assert_eq!(job.company.github, "https://github.com/gitcoinco");
        assert_eq!(job.company.logo, "https://cdn.example.com/logo.png");
        assert!(!job.featured);
        assert!(job.min_salary.is_none());
    }

    #[test]
    fn test_map_posting_featured_and_salaries() {
        let now = Utc::now();
        let mut value = job_record("a", "Designer", &iso_days_ago(1));
        let featured_until = (now + Duration::days(7)).format("%Y-%m-%d").to_string();
        value["fields"]["Featured"] = json!(featured_until);
        value["fields"]["Min Salary"] = json!(90000);
        value["fields"]["Max Salary"] = json!(0);
        value["fields"]["Remote"] = json!(true);
        value["fields"]["Department"] = json!("Brand");

        let job = map_posting(decode_job(value), now).expect("mapped").job;
        assert!(job.featured);
        assert!(job.featured_until.is_some());
        assert_eq!(job.min_salary, Some(90000.0));
        assert!(job.max_salary.is_none());
        assert!(job.remote);
        assert_eq!(job.department, "Brand");

        let mut expired = job_record("b", "Designer", &iso_days_ago(1));
        expired["fields"]["Featured"] = json!("2020-01-01");
        let job = map_posting(decode_job(expired), now).expect("mapped").job;
        assert!(!job.featured);
    }

    #[test]
    fn test_map_posting_drops_records_without_updated_date() {
        let record = decode_job(job_record("a", "Engineer", "sometime soon"));
        assert!(map_posting(record, Utc::now()).is_none());
    }

    #[test]
    fn test_map_company_falls_back_to_name() {
        let fields: CompanyFields = serde_json::from_value(json!({
            "Slug": "gitcoin",
            "Name": "Gitcoin",
            "Twitter": "https://twitter.com/gitcoin",
            "Logo": [{"url": "https://cdn.example.com/g.png"}]
        }))
        .unwrap();
        let company = map_company(&fields, "gitcoin");
        assert_eq!(company.id, "gitcoin");
        assert_eq!(company.title, "Gitcoin");
        assert_eq!(company.description, "Gitcoin");
        assert_eq!(company.body, "Gitcoin");
        assert_eq!(company.twitter, "https://twitter.com/gitcoin");
        assert_eq!(company.logo, "https://cdn.example.com/g.png");
    }

    #[tokio::test]
    async fn test_get_jobs_follows_offset_and_applies_rules() {
        let mut server = Server::new_async().await;
        let first_page = server
            .mock("GET", "/v0/appBase/Jobs")
            .match_header("authorization", "Bearer key-test")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded(
                    "filterByFormula".into(),
                    "AND({Active}, {Company Slug} = \"gitcoin\")".into(),
                ),
                // first page carries no offset cursor
                Matcher::Regex("^filterByFormula=[^&]+$".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "records": [
                        job_record("older", "Rust Engineer", &iso_days_ago(10)),
                        job_record("stale", "Solidity Developer", &iso_days_ago(75)),
                    ],
                    "offset": "itrNext"
                })
                .to_string(),
            )
            .create_async()
            .await;
        let second_page = server
            .mock("GET", "/v0/appBase/Jobs")
            .match_query(Matcher::UrlEncoded("offset".into(), "itrNext".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "records": [
                        job_record("newest", "Community Lead", &iso_days_ago(1)),
                        {"id": "recBroken", "fields": {"Title": 42}}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let jobs = provider(&server).get_jobs(Some("gitcoin"), None).await;

        let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["newest", "older"]);
        first_page.assert_async().await;
        second_page.assert_async().await;
    }

    #[tokio::test]
    async fn test_repeated_offset_stops_paging() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v0/appBase/Jobs")
            .match_query(Matcher::Regex("^filterByFormula=[^&]+$".into()))
            .with_status(200)
            .with_body(
                json!({
                    "records": [job_record("first", "Rust Engineer", &iso_days_ago(2))],
                    "offset": "itrStuck"
                })
                .to_string(),
            )
            .create_async()
            .await;
        let stuck_page = server
            .mock("GET", "/v0/appBase/Jobs")
            .match_query(Matcher::UrlEncoded("offset".into(), "itrStuck".into()))
            .with_status(200)
            .with_body(
                json!({
                    "records": [job_record("second", "Data Analyst", &iso_days_ago(1))],
                    "offset": "itrStuck"
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let jobs = provider(&server).get_jobs(None, None).await;

        let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["second", "first"]);
        stuck_page.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_jobs_respects_max_items() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v0/appBase/Jobs")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({
                    "records": (0..5)
                        .map(|i| job_record(&format!("job-{i}"), "Engineer", &iso_days_ago(i + 1)))
                        .collect::<Vec<_>>()
                })
                .to_string(),
            )
            .create_async()
            .await;

        let jobs = provider(&server).get_jobs(None, Some(3)).await;
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].id, "job-0");
    }

    #[tokio::test]
    async fn test_upstream_error_degrades_to_empty() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error": {"type": "AUTHENTICATION_REQUIRED"}}"#)
            .create_async()
            .await;

        let provider = provider(&server);
        assert!(provider.try_get_jobs(Some("gitcoin"), None).await.is_failed());
        assert!(provider.get_jobs(Some("gitcoin"), None).await.is_empty());
        assert!(provider.get_company("gitcoin").await.is_none());
    }

    #[tokio::test]
    async fn test_get_company_prefers_exact_slug() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v0/appBase/Companies")
            .match_query(Matcher::UrlEncoded(
                "filterByFormula".into(),
                "SEARCH(\"gitcoin\", {Slug})".into(),
            ))
            .with_status(200)
            .with_body(
                json!({
                    "records": [
                        {
                            "id": "rec1",
                            "fields": {"Slug": "gitcoin-grants", "Name": "Gitcoin Grants"}
                        },
                        {
                            "id": "rec2",
                            "fields": {
                                "Slug": "gitcoin",
                                "Name": "Gitcoin",
                                "Description": "Public goods"
                            }
                        }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let company = provider(&server).get_company("gitcoin").await.expect("found");
        assert_eq!(company.title, "Gitcoin");
        assert_eq!(company.description, "Public goods");
    }

    #[tokio::test]
    async fn test_get_company_not_found_is_none() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v0/appBase/Companies")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"records": []}"#)
            .create_async()
            .await;

        let provider = provider(&server);
        assert!(matches!(
            provider.try_get_company("nobody").await,
            crate::providers::FetchOutcome::Empty
        ));
    }
}
