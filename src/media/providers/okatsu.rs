use super::{fetch_result, lenient_string, JsonFetcher, Provider, ProviderError};
use crate::media::retry::RetryPolicy;
use crate::media::types::ProviderResult;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

const NAME: &str = "Okatsu";
const ENDPOINT: &str = "https://okatsu-rolezapiiz.vercel.app/downloader/ytmp4";

// { status, creator, url, result: { status, title, mp4 } }
#[derive(Debug, Deserialize)]
struct Response {
    result: Option<Inner>,
}

#[derive(Debug, Deserialize)]
struct Inner {
    status: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    mp4: Option<String>,
}

impl Response {
    fn into_result(self) -> Option<ProviderResult> {
        let inner = self.result?;
        if matches!(inner.status, Some(Value::Bool(false))) {
            return None;
        }
        let mp4 = inner.mp4.filter(|u| !u.is_empty())?;
        Some(ProviderResult::new(mp4, inner.title, None))
    }
}

pub struct Okatsu {
    fetcher: Arc<dyn JsonFetcher>,
    policy: RetryPolicy,
}

impl Okatsu {
    pub fn new(fetcher: Arc<dyn JsonFetcher>, policy: RetryPolicy) -> Self {
        Self { fetcher, policy }
    }
}

#[async_trait]
impl Provider for Okatsu {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn resolve(&self, video_url: &str) -> Result<ProviderResult, ProviderError> {
        fetch_result(
            NAME,
            self.fetcher.as_ref(),
            &self.policy,
            ENDPOINT,
            &[("url", video_url)],
            Response::into_result,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::providers::testing::ScriptedFetcher;
    use serde_json::json;

    async fn resolve(body: Value) -> Result<ProviderResult, ProviderError> {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![Ok(body)]));
        Okatsu::new(fetcher, RetryPolicy::default())
            .resolve("https://youtu.be/abcdefghijk")
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_shape() {
        let result = resolve(json!({
            "status": true,
            "creator": "someone",
            "url": "https://youtu.be/abcdefghijk",
            "result": { "status": 200, "title": "Okatsu Title", "mp4": "https://cdn/ok.mp4" }
        }))
        .await
        .unwrap();

        assert_eq!(result.download_url, "https://cdn/ok.mp4");
        assert_eq!(result.title.as_deref(), Some("Okatsu Title"));
        assert_eq!(result.thumbnail, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_false_status_fails() {
        let err = resolve(json!({
            "result": { "status": false, "mp4": "https://cdn/ok.mp4" }
        }))
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Okatsu returned no download");
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_mp4_fails() {
        let err = resolve(json!({ "result": { "status": true, "title": "x" } }))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NoDownload { provider: "Okatsu" }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_string_title_is_ignored() {
        let result = resolve(json!({
            "result": { "status": 200, "title": true, "mp4": "https://cdn/ok.mp4" }
        }))
        .await
        .unwrap();
        assert_eq!(result.download_url, "https://cdn/ok.mp4");
        assert_eq!(result.title, None);
    }
}
