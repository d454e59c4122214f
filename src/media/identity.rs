use super::error::VideoError;
use super::types::{SearchHit, VideoIdentity};
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

/// Short, watch, `/v/`, embed, shorts and playlist links, capturing the
/// 11-character video id.
pub static LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:https?://)?(?:youtu\.be/|(?:www\.|m\.)?youtube\.com/(?:watch\?v=|v/|embed/|shorts/|playlist\?list=)?)([a-zA-Z0-9_-]{11})",
    )
    .unwrap()
});

// Only short and watch links carry an id the thumbnail CDN is keyed by.
static THUMBNAIL_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:youtu\.be/|v=)([a-zA-Z0-9_-]{11})").unwrap());

/// Full-text video search used when the query is not a link.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// Ranked hits for `query`, best first. May be empty.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, VideoError>;

    /// Whether the backing search tool can be used at all
    async fn is_available(&self) -> bool {
        true
    }
}

pub fn is_link(query: &str) -> bool {
    query.starts_with("http://") || query.starts_with("https://")
}

pub fn extract_video_id(url: &str) -> Option<&str> {
    LINK_REGEX
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub(crate) fn thumbnail_video_id(url: &str) -> Option<&str> {
    THUMBNAIL_ID_REGEX
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub struct LinkResolver {
    search: Arc<dyn VideoSearch>,
}

impl LinkResolver {
    pub fn new(search: Arc<dyn VideoSearch>) -> Self {
        Self { search }
    }

    pub async fn search_available(&self) -> bool {
        self.search.is_available().await
    }

    pub async fn resolve(&self, query: &str) -> Result<VideoIdentity, VideoError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(VideoError::EmptyQuery);
        }

        let hit = if is_link(query) {
            debug!("Query is a direct link: {}", query);
            SearchHit {
                url: query.to_string(),
                title: None,
                thumbnail: None,
            }
        } else {
            info!("Searching for: {}", query);
            self.search
                .search(query)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| VideoError::NoSearchResults(query.to_string()))?
        };

        let video_id = extract_video_id(&hit.url)
            .ok_or_else(|| VideoError::InvalidLink(hit.url.clone()))?
            .to_string();

        debug!("Resolved {} (id {})", hit.url, video_id);
        Ok(VideoIdentity::new(hit.url, video_id, hit.title, hit.thumbnail))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Returns a fixed hit list and records the queries it was asked.
    #[derive(Default)]
    pub struct StaticSearch {
        pub hits: Vec<SearchHit>,
        pub queries: Mutex<Vec<String>>,
    }

    impl StaticSearch {
        pub fn new(hits: Vec<SearchHit>) -> Self {
            Self {
                hits,
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.queries.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl VideoSearch for StaticSearch {
        async fn search(&self, query: &str) -> Result<Vec<SearchHit>, VideoError> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(self.hits.clone())
        }
    }

    pub fn hit(url: &str, title: &str) -> SearchHit {
        SearchHit {
            url: url.to_string(),
            title: Some(title.to_string()),
            thumbnail: Some(format!("{url}/thumb.jpg")),
        }
    }
}
