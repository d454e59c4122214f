pub mod console;
pub mod discord;
pub mod reply;

use crate::config::Config;
use crate::media::{
    HttpFetcher, LinkResolver, MediaResolver, ResolutionOutcome, VideoError, VideoSearch,
    YtDlpSearch,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// A payload delivered back to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundMessage {
    Text {
        text: String,
    },
    Image {
        url: String,
        caption: String,
    },
    Video {
        url: String,
        mimetype: String,
        filename: String,
        caption: String,
    },
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Where replies for one request go.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<()>;
}

/// The `video` command: query in, exactly one terminal reply out.
pub struct VideoCommand {
    resolver: LinkResolver,
    media: MediaResolver,
}

impl VideoCommand {
    pub fn new(resolver: LinkResolver, media: MediaResolver) -> Self {
        Self { resolver, media }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.http.timeout(), &config.http.user_agent)
            .context("Failed to initialize provider HTTP client")?;
        let search: Arc<dyn VideoSearch> = Arc::new(YtDlpSearch::new(
            config.search.ytdlp_path.clone(),
            config.search.max_results,
        ));

        Ok(Self::new(
            LinkResolver::new(search),
            MediaResolver::new(Arc::new(fetcher), config.retry.policy()),
        ))
    }

    pub async fn search_available(&self) -> bool {
        self.resolver.search_available().await
    }

    pub async fn handle(&self, query: &str, sink: &dyn MessageSink) -> Result<()> {
        let query = query.trim();
        let reply = match self.run(query, sink).await {
            Ok(message) => message,
            Err(e) => {
                error!("Video command failed for {:?}: {}", query, e);
                OutboundMessage::text(reply::error_reply(&e))
            }
        };

        sink.send(reply).await.context("Failed to send reply")
    }

    async fn run(&self, query: &str, sink: &dyn MessageSink) -> Result<OutboundMessage, VideoError> {
        if query.is_empty() {
            return Err(VideoError::EmptyQuery);
        }

        let identity = self.resolver.resolve(query).await?;

        if let Some(preview) = reply::preview_message(&identity, query) {
            if let Err(e) = sink.send(preview).await {
                warn!("Failed to send preview: {}", e);
            }
        }

        match self.media.resolve_download(&identity).await {
            ResolutionOutcome::Success { result, provider } => {
                info!("Sending {} from {}", result.download_url, provider);
                Ok(reply::video_reply(&result, identity.title(), query))
            }
            ResolutionOutcome::AllProvidersFailed(failures) => {
                Err(VideoError::AllProvidersFailed(failures))
            }
        }
    }
}

/// Argument text of a `<prefix>video ...` chat message.
pub fn split_command<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = text.trim_start().strip_prefix(prefix)?;
    let (command, args) = match rest.split_once(char::is_whitespace) {
        Some((command, args)) => (command, args),
        None => (rest, ""),
    };
    command
        .eq_ignore_ascii_case("video")
        .then(|| args.trim())
}

pub async fn run(config: Config) -> Result<()> {
    discord::run(config).await
}

pub async fn resolve_once(config: Config, query: &str) -> Result<()> {
    let command = VideoCommand::from_config(&config)?;
    command.handle(query, &console::ConsoleSink).await
}
