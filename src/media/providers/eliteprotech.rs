use super::{fetch_result, lenient_string, JsonFetcher, Provider, ProviderError};
use crate::media::retry::RetryPolicy;
use crate::media::types::ProviderResult;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const NAME: &str = "EliteProTech";
const ENDPOINT: &str = "https://eliteprotech-apis.zone.id/ytdown";

/// `{ "success": true, "downloadURL": "...", "title": "..." }`
#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    success: bool,
    #[serde(rename = "downloadURL", default, deserialize_with = "lenient_string")]
    download_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,
}

impl Response {
    fn into_result(self) -> Option<ProviderResult> {
        if !self.success {
            return None;
        }
        let download_url = self.download_url.filter(|u| !u.is_empty())?;
        Some(ProviderResult::new(download_url, self.title, None))
    }
}

pub struct EliteProTech {
    fetcher: Arc<dyn JsonFetcher>,
    policy: RetryPolicy,
}

impl EliteProTech {
    pub fn new(fetcher: Arc<dyn JsonFetcher>, policy: RetryPolicy) -> Self {
        Self { fetcher, policy }
    }
}

#[async_trait]
impl Provider for EliteProTech {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn resolve(&self, video_url: &str) -> Result<ProviderResult, ProviderError> {
        fetch_result(
            NAME,
            self.fetcher.as_ref(),
            &self.policy,
            ENDPOINT,
            &[("url", video_url), ("format", "mp4")],
            Response::into_result,
        )
        .await
    }
}
