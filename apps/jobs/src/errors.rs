use thiserror::Error;

/// Raised while building configuration or constructing a provider.
/// Fatal to whatever was being built; never produced by a fetch.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{provider} credentials not set: expected {vars}")]
    MissingCredentials {
        provider: &'static str,
        vars: &'static str,
    },

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: &'static str, message: String },

    #[error("Unable to read sources file '{path}': {source}")]
    SourcesRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Sources file '{path}' is not valid JSON: {source}")]
    SourcesParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Upstream failure while talking to an ATS.
/// Caught at the provider boundary and logged; callers only see empty results.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Malformed payload from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
