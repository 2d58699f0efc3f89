use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::http::{decode_each, get_json};
use super::{JobProvider, ProviderKind};
use crate::errors::FetchError;
use crate::models::{Company, Job, Posting};
use crate::normalize::department::department_or_guess;
use crate::normalize::{application_url, mentions_remote, slugify};

pub const DEFAULT_API_URL: &str = "https://api.lever.co/v0/postings";

/// Lever postings API. Like Breezy, there is no company profile endpoint.
pub struct LeverProvider {
    client: Client,
    api_url: String,
}

impl LeverProvider {
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
}

#[async_trait]
impl JobProvider for LeverProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Lever
    }

    async fn fetch_company(&self, id: &str) -> Result<Option<Company>, FetchError> {
        Ok(Some(Company::stub(id)))
    }

    async fn fetch_postings(
        &self,
        company_id: Option<&str>,
        _now: DateTime<Utc>,
    ) -> Result<Vec<Posting>, FetchError> {
        let Some(company_id) = company_id else {
            debug!("lever: no company given, nothing to fetch");
            return Ok(Vec::new());
        };

        let request = self
            .client
            .get(format!("{}/{}", self.api_url, company_id))
            .query(&[("mode", "json")]);
        let raw: Vec<serde_json::Value> = get_json(request).await?;

        let company = Company::stub(company_id);
        Ok(decode_each::<LeverPosting>(raw, "lever posting")
            .into_iter()
            .filter_map(|posting| map_posting(posting, &company))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeverPosting {
    id: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    categories: LeverCategories,
    created_at: Option<i64>,
    description: Option<String>,
    description_plain: Option<String>,
    hosted_url: Option<String>,
    apply_url: Option<String>,
    workplace_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LeverCategories {
    department: Option<String>,
    team: Option<String>,
    location: Option<String>,
}

fn map_posting(raw: LeverPosting, company: &Company) -> Option<Posting> {
    let updated = raw.created_at?;
    let location = raw.categories.location.unwrap_or_default();
    let remote = raw
        .workplace_type
        .as_deref()
        .is_some_and(|kind| kind.eq_ignore_ascii_case("remote"))
        || mentions_remote(&location);
    let department = raw.categories.department.or(raw.categories.team);
    let raw_url = raw.hosted_url.or(raw.apply_url).unwrap_or_default();
    let title = raw.text;

    let job = Job {
        id: raw.id,
        slug: slugify(&title),
        department: department_or_guess(department.as_deref(), &title),
        description: raw.description_plain.unwrap_or_default(),
        body: raw.description.unwrap_or_default(),
        location,
        remote,
        company: company.clone(),
        url: application_url(&raw_url, &title),
        updated,
        featured_until: None,
        featured: false,
        min_salary: None,
        max_salary: None,
        title,
    };

    Some(Posting::active(job))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::build_client;
    use chrono::Duration;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn provider(server: &Server) -> LeverProvider {
        let client = build_client(std::time::Duration::from_secs(5)).unwrap();
        LeverProvider::new(client).with_api_url(server.url())
    }

    fn lever_posting(id: &str, text: &str, days_ago: i64) -> serde_json::Value {
        json!({
            "id": id,
            "text": text,
            "categories": {
                "commitment": "Full-time",
                "location": "New York",
                "team": "Smart Contracts"
            },
            "createdAt": (Utc::now() - Duration::days(days_ago)).timestamp_millis(),
            "description": "<div>About the role</div>",
            "descriptionPlain": "About the role",
            "lists": [],
            "hostedUrl": format!("https://jobs.lever.co/chainlink/{id}"),
            "applyUrl": format!("https://jobs.lever.co/chainlink/{id}/apply"),
            "workplaceType": "onsite"
        })
    }

    #[test]
    fn test_map_posting_uses_team_when_department_missing() {
        let raw: LeverPosting =
            serde_json::from_value(lever_posting("p1", "Solidity Engineer", 1)).unwrap();
        let job = map_posting(raw, &Company::stub("chainlink")).expect("mapped").job;
        assert_eq!(job.department, "Smart Contracts");
        assert_eq!(job.description, "About the role");
        assert_eq!(job.body, "<div>About the role</div>");
        assert_eq!(job.url, "https://jobs.lever.co/chainlink/p1");
        assert!(!job.remote);
        assert_eq!(job.company.id, "chainlink");
    }

    #[test]
    fn test_map_posting_remote_from_workplace_type() {
        let mut value = lever_posting("p2", "Developer Advocate", 1);
        value["workplaceType"] = json!("remote");
        let job = map_posting(serde_json::from_value(value).unwrap(), &Company::stub("chainlink"))
            .expect("mapped")
            .job;
        assert!(job.remote);
    }

    #[tokio::test]
    async fn test_get_jobs_fetches_postings() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/chainlink")
            .match_query(Matcher::UrlEncoded("mode".into(), "json".into()))
            .with_status(200)
            .with_body(
                json!([
                    lever_posting("older", "Research Engineer", 20),
                    lever_posting("newer", "Product Designer", 2),
                    lever_posting("ancient", "Node Operator", 61),
                    {"id": "undated", "text": "Mystery"}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let jobs = provider(&server).get_jobs(Some("chainlink"), Some(1)).await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, "newer");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unknown_company_returns_empty() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/ghost")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"ok": false, "error": "Document not found"}"#)
            .create_async()
            .await;

        assert!(provider(&server).get_jobs(Some("ghost"), None).await.is_empty());
    }
}
