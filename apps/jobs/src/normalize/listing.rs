use chrono::{DateTime, Duration, Utc};

use crate::models::{Job, Posting};

/// Postings not updated within this many days are dropped.
pub const JOBS_SINCE_LAST_UPDATED_DAYS: i64 = 60;

/// Cap applied when a caller does not pass `max_items`.
pub const DEFAULT_MAX_ITEMS: usize = 100;

/// Listing rules every provider applies after mapping.
#[derive(Debug, Clone, Copy)]
pub struct ListingRules {
    pub recency_window: Duration,
    pub max_items: usize,
}

impl Default for ListingRules {
    fn default() -> Self {
        Self {
            recency_window: Duration::days(JOBS_SINCE_LAST_UPDATED_DAYS),
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

impl ListingRules {
    pub fn with_max_items(max_items: Option<usize>) -> Self {
        Self {
            max_items: max_items.unwrap_or(DEFAULT_MAX_ITEMS),
            ..Self::default()
        }
    }
}

/// Turns mapped postings into the public listing:
/// 1. keep active postings
/// 2. keep postings updated strictly after `now - recency_window`
/// 3. stable sort, newest first
/// 4. truncate to `max_items`
pub fn finalize_listing(
    postings: Vec<Posting>,
    now: DateTime<Utc>,
    rules: ListingRules,
) -> Vec<Job> {
    let cutoff = (now - rules.recency_window).timestamp_millis();

    let mut jobs: Vec<Job> = postings
        .into_iter()
        .filter(|posting| posting.active)
        .map(|posting| posting.job)
        .filter(|job| job.updated > cutoff)
        .collect();

    jobs.sort_by(|a, b| b.updated.cmp(&a.updated));
    jobs.truncate(rules.max_items);
    jobs
}

/// Cross-provider ranking: featured jobs first, then newest first. Stable.
pub fn rank_featured_first(jobs: &mut [Job]) {
    jobs.sort_by(|a, b| {
        b.featured
            .cmp(&a.featured)
            .then_with(|| b.updated.cmp(&a.updated))
    });
}
