use super::{fetch_result, lenient_string, JsonFetcher, Provider, ProviderError};
use crate::media::retry::RetryPolicy;
use crate::media::types::ProviderResult;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const NAME: &str = "Yupra";
const ENDPOINT: &str = "https://api.yupra.my.id/api/downloader/ytmp4";

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    success: bool,
    data: Option<Data>,
}

#[derive(Debug, Deserialize)]
struct Data {
    #[serde(default, deserialize_with = "lenient_string")]
    download_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    thumbnail: Option<String>,
}

impl Response {
    fn into_result(self) -> Option<ProviderResult> {
        if !self.success {
            return None;
        }
        let data = self.data?;
        let download_url = data.download_url.filter(|u| !u.is_empty())?;
        Some(ProviderResult::new(download_url, data.title, data.thumbnail))
    }
}

pub struct Yupra {
    fetcher: Arc<dyn JsonFetcher>,
    policy: RetryPolicy,
}

impl Yupra {
    pub fn new(fetcher: Arc<dyn JsonFetcher>, policy: RetryPolicy) -> Self {
        Self { fetcher, policy }
    }
}

#[async_trait]
impl Provider for Yupra {
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

    #[tokio::test(start_paused = true)]
    async fn test_nested_data_shape() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![Ok(json!({
            "success": true,
            "data": {
                "download_url": "https://cdn/yupra.mp4",
                "title": "Some Video",
                "thumbnail": "https://img/yupra.jpg"
            }
        }))]));

        let result = Yupra::new(fetcher.clone(), RetryPolicy::default())
            .resolve("https://youtu.be/abcdefghijk")
            .await
            .unwrap();

        assert_eq!(result.download_url, "https://cdn/yupra.mp4");
        assert_eq!(result.title.as_deref(), Some("Some Video"));
        assert_eq!(result.thumbnail.as_deref(), Some("https://img/yupra.jpg"));

        let url = fetcher.requests.lock().unwrap()[0].clone();
        assert_eq!(url.path(), "/api/downloader/ytmp4");
        assert_eq!(url.query_pairs().count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_top_level_url_is_not_accepted() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![Ok(json!({
            "success": true,
            "download_url": "https://cdn/wrong-level.mp4"
        }))]));

        let err = Yupra::new(fetcher, RetryPolicy::default())
            .resolve("https://youtu.be/abcdefghijk")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Yupra returned no download");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_download_url_fails() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![Ok(json!({
            "success": true,
            "data": { "download_url": "" }
        }))]));

        let err = Yupra::new(fetcher, RetryPolicy::default())
            .resolve("https://youtu.be/abcdefghijk")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NoDownload { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_string_metadata_is_ignored() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![Ok(json!({
            "success": true,
            "data": {
                "download_url": "https://cdn/ok.mp4",
                "title": 12345,
                "thumbnail": null
            }
        }))]));

        let result = Yupra::new(fetcher, RetryPolicy::default())
            .resolve("https://youtu.be/abcdefghijk")
            .await
            .unwrap();
        assert_eq!(result.download_url, "https://cdn/ok.mp4");
        assert_eq!(result.title, None);
        assert_eq!(result.thumbnail, None);
    }
}
