mod error;
mod identity;
mod providers;
mod retry;
mod search;
mod types;

pub use error::VideoError;
pub use identity::{extract_video_id, LinkResolver, VideoSearch};
pub use providers::{
    default_chain, FetchError, HttpFetcher, JsonFetcher, Provider, ProviderError,
    DEFAULT_USER_AGENT,
};
pub use retry::RetryPolicy;
pub use search::YtDlpSearch;
pub use types::{
    ProviderFailure, ProviderResult, ResolutionOutcome, SearchHit, VideoIdentity,
};

#[cfg(test)]
pub(crate) use identity::testing as search_testing;
#[cfg(test)]
pub(crate) use providers::testing as provider_testing;

use std::sync::Arc;
use tracing::{info, warn};

/// Walks the provider chain in priority order until one yields a download.
pub struct MediaResolver {
    providers: Vec<Box<dyn Provider>>,
}

impl MediaResolver {
    pub fn new(fetcher: Arc<dyn JsonFetcher>, policy: RetryPolicy) -> Self {
        let providers = default_chain(fetcher, policy);
        info!(
            "Media resolver initialized with providers: {}",
            providers
                .iter()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(" -> ")
        );
        Self { providers }
    }

    pub fn with_providers(providers: Vec<Box<dyn Provider>>) -> Self {
        Self { providers }
    }

    pub async fn resolve_download(&self, identity: &VideoIdentity) -> ResolutionOutcome {
        let url = identity.canonical_url();
        info!("Resolving download for URL: {}", url);

        let mut failures = Vec::new();

        for provider in &self.providers {
            match provider.resolve(url).await {
                Ok(result) if result.has_download() => {
                    info!("Successfully resolved with {}", provider.name());
                    return ResolutionOutcome::Success {
                        result,
                        provider: provider.name(),
                    };
                }
                Ok(_) => {
                    warn!("{} returned no download URL, trying next provider", provider.name());
                    failures.push(ProviderFailure {
                        provider: provider.name(),
                        error: ProviderError::NoDownload {
                            provider: provider.name(),
                        },
                    });
                }
                Err(e) => {
                    warn!("{} failed: {}", provider.name(), e);
                    failures.push(ProviderFailure {
                        provider: provider.name(),
                        error: e,
                    });
                }
            }
        }

        ResolutionOutcome::AllProvidersFailed(failures)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub enum Behavior {
        Succeed(&'static str),
        EmptyUrl,
        Fail(u16),
        NoDownload,
    }

    /// Provider with canned behavior that counts its invocations.
    pub struct FakeProvider {
        pub name: &'static str,
        pub behavior: Behavior,
        pub calls: Arc<AtomicUsize>,
    }

    impl FakeProvider {
        pub fn boxed(name: &'static str, behavior: Behavior) -> (Box<dyn Provider>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let provider = Self {
                name,
                behavior,
                calls: calls.clone(),
            };
            (Box::new(provider), calls)
        }
    }

    #[async_trait]
    impl Provider for FakeProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn resolve(&self, _video_url: &str) -> Result<ProviderResult, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Succeed(url) => Ok(ProviderResult::new(
                    url.to_string(),
                    Some(format!("{} title", self.name)),
                    None,
                )),
                Behavior::EmptyUrl => Ok(ProviderResult::new(String::new(), None, None)),
                Behavior::Fail(code) => Err(ProviderError::Fetch {
                    provider: self.name,
                    source: FetchError::Status(*code),
                }),
                Behavior::NoDownload => Err(ProviderError::NoDownload { provider: self.name }),
            }
        }
    }
}
