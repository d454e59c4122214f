use super::types::ProviderFailure;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("Empty query")]
    EmptyQuery,

    #[error("No videos found for {0:?}")]
    NoSearchResults(String),

    #[error("Not a supported video link: {0}")]
    InvalidLink(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("All download sources failed: {}", summarize(.0))]
    AllProvidersFailed(Vec<ProviderFailure>),
}

fn summarize(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.provider, f.error))
        .collect::<Vec<_>>()
        .join(". ")
}

impl VideoError {
    /// Failures captured from individual providers, if any.
    pub fn provider_failures(&self) -> &[ProviderFailure] {
        match self {
            Self::AllProvidersFailed(failures) => failures,
            _ => &[],
        }
    }
}
