use serde::{Deserialize, Serialize};

use crate::models::company::Company;

/// A normalized job posting, identical in shape whichever ATS it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub department: String,
    pub description: String,
    pub body: String,
    pub location: String,
    pub remote: bool,
    pub company: Company,
    /// Application link; a `mailto:` URL when the upstream gave an email address.
    pub url: String,
    /// Last update, epoch millis.
    pub updated: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_until: Option<i64>,
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_salary: Option<f64>,
}

impl Job {
    /// Sets the promotion deadline and recomputes `featured` against `now_ms`.
    /// The only way `featured` is ever set.
    pub fn with_featured_until(mut self, featured_until: Option<i64>, now_ms: i64) -> Self {
        self.featured_until = featured_until;
        self.featured = featured_until.is_some_and(|until| until >= now_ms);
        self
    }
}

/// A mapped job plus the upstream's open/closed flag, before listing rules run.
#[derive(Debug, Clone)]
pub struct Posting {
    pub job: Job,
    pub active: bool,
}

impl Posting {
    pub fn active(job: Job) -> Self {
        Self { job, active: true }
    }
}
