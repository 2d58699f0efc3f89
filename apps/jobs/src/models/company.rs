use serde::{Deserialize, Serialize};

use crate::normalize::slugify;

/// Denormalized company snapshot, embedded in every `Job` fetched alongside it.
///
/// Link fields are empty strings when the upstream has nothing to offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub website: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub twitter: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub github: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub logo: String,
}

impl Company {
    /// Builds a company whose slug is derived from `title`.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            id: id.into(),
            slug: slugify(&title),
            title,
            ..Default::default()
        }
    }

    /// Placeholder for upstreams with no company lookup: the identifier doubles as the title.
    pub fn stub(id: &str) -> Self {
        Self::new(id, id)
    }
}
