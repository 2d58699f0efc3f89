use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::{ConfigError, FetchError};

/// Builds the single HTTP client shared by every adapter.
pub fn build_client(timeout: Duration) -> Result<Client, ConfigError> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Sends `request` and decodes a JSON body. Non-2xx is an error.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, FetchError> {
    let response = request.send().await?;
    let url = response.url().to_string();
    let status = response.status();
    debug!("GET {} -> {}", url, status);

    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url,
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| FetchError::Decode { url, source })
}

/// Like `get_json`, but a 404 is "no such resource" rather than a failure.
pub(crate) async fn get_json_optional<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<Option<T>, FetchError> {
    match get_json(request).await {
        Ok(value) => Ok(Some(value)),
        Err(FetchError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Decodes each element of a JSON array on its own so that one malformed
/// record is skipped instead of sinking the whole listing.
pub(crate) fn decode_each<T: DeserializeOwned>(
    values: Vec<serde_json::Value>,
    what: &str,
) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                debug!("skipping malformed {what}: {err}");
                None
            }
        })
        .collect()
}

/// Upstream ids arrive as strings or numbers; both become strings.
pub(crate) fn id_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
