use super::identity::thumbnail_video_id;
use super::providers::ProviderError;

/// One ranked hit returned by the search collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub url: String,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
}

/// The video a request is about. The canonical URL is fixed once the
/// identity has been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoIdentity {
    canonical_url: String,
    video_id: String,
    title: Option<String>,
    thumbnail: Option<String>,
}

impl VideoIdentity {
    pub(crate) fn new(
        canonical_url: String,
        video_id: String,
        title: Option<String>,
        thumbnail: Option<String>,
    ) -> Self {
        Self {
            canonical_url,
            video_id,
            title: non_empty(title),
            thumbnail: non_empty(thumbnail),
        }
    }

    pub fn canonical_url(&self) -> &str {
        &self.canonical_url
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }

    /// Thumbnail to show while the download is being resolved: the search
    /// thumbnail, else the CDN still for short and watch links.
    pub fn preview_thumbnail(&self) -> Option<String> {
        self.thumbnail.clone().or_else(|| {
            thumbnail_video_id(&self.canonical_url)
                .map(|id| format!("https://i.ytimg.com/vi/{id}/sddefault.jpg"))
        })
    }
}

/// A direct media link produced by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResult {
    pub download_url: String,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
}

impl ProviderResult {
    pub fn new(download_url: String, title: Option<String>, thumbnail: Option<String>) -> Self {
        Self {
            download_url,
            title: non_empty(title),
            thumbnail: non_empty(thumbnail),
        }
    }

    pub fn has_download(&self) -> bool {
        !self.download_url.trim().is_empty()
    }
}

#[derive(Debug)]
pub struct ProviderFailure {
    pub provider: &'static str,
    pub error: ProviderError,
}

#[derive(Debug)]
pub enum ResolutionOutcome {
    Success {
        result: ProviderResult,
        provider: &'static str,
    },
    AllProvidersFailed(Vec<ProviderFailure>),
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
