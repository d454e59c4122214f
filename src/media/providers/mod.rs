mod eliteprotech;
mod http;
mod okatsu;
mod yupra;

pub use eliteprotech::EliteProTech;
pub use http::{FetchError, HttpFetcher, JsonFetcher, DEFAULT_USER_AGENT};
pub use okatsu::Okatsu;
pub use yupra::Yupra;

use super::retry::{self, RetryPolicy};
use super::types::ProviderResult;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Fetch {
        provider: &'static str,
        #[source]
        source: FetchError,
    },

    #[error("{provider} returned no download")]
    NoDownload { provider: &'static str },

    #[error("{provider} returned no download: {message}")]
    Rejected {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} endpoint is invalid: {source}")]
    InvalidEndpoint {
        provider: &'static str,
        #[source]
        source: url::ParseError,
    },
}

impl ProviderError {
    /// HTTP status reported by the provider, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Fetch { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Text the provider itself sent back, as opposed to transport details
    /// such as the request URL.
    pub fn reported_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// A third-party service that turns a video link into a direct media URL.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable name of the provider
    fn name(&self) -> &'static str;

    /// Resolve the given video link to a downloadable media URL
    async fn resolve(&self, video_url: &str) -> Result<ProviderResult, ProviderError>;
}

/// Providers in fallback priority order.
pub fn default_chain(fetcher: Arc<dyn JsonFetcher>, policy: RetryPolicy) -> Vec<Box<dyn Provider>> {
    vec![
        Box::new(EliteProTech::new(fetcher.clone(), policy)),
        Box::new(Yupra::new(fetcher.clone(), policy)),
        Box::new(Okatsu::new(fetcher, policy)),
    ]
}

/// Shared request plumbing for the adapters: builds the endpoint URL, fetches
/// it with retries, deserializes the body into the provider's shape and lets
/// the adapter decide whether the shape carries a download.
pub(crate) async fn fetch_result<T: DeserializeOwned>(
    provider: &'static str,
    fetcher: &dyn JsonFetcher,
    policy: &RetryPolicy,
    endpoint: &str,
    params: &[(&str, &str)],
    into_result: fn(T) -> Option<ProviderResult>,
) -> Result<ProviderResult, ProviderError> {
    let url = Url::parse_with_params(endpoint, params)
        .map_err(|source| ProviderError::InvalidEndpoint { provider, source })?;

    let body = retry::execute(policy, || fetcher.get_json(&url))
        .await
        .map_err(|source| ProviderError::Fetch { provider, source })?;

    let result = match serde_json::from_value::<T>(body.clone()) {
        Ok(shape) => into_result(shape),
        Err(e) => {
            debug!("{} response did not match expected shape: {}", provider, e);
            None
        }
    };

    result.ok_or_else(|| rejection(provider, &body))
}

/// `NoDownload`, or `Rejected` when the body explains itself in a top-level
/// `message`, `msg` or `error` string.
fn rejection(provider: &'static str, body: &Value) -> ProviderError {
    ["message", "msg", "error"]
        .iter()
        .find_map(|key| body[*key].as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(|message| ProviderError::Rejected {
            provider,
            message: message.to_string(),
        })
        .unwrap_or(ProviderError::NoDownload { provider })
}

/// Reads a string field, treating any other JSON type as absent.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_str().map(str::to_string)))
}
