use super::{split_command, MessageSink, OutboundMessage, VideoCommand};
use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};
use twilight_gateway::{Event, EventTypeFlags, Intents, Shard, ShardId, StreamExt};
use twilight_http::Client as HttpClient;
use twilight_model::{
    application::{
        command::CommandType,
        interaction::{
            application_command::{CommandData, CommandOptionValue},
            Interaction, InteractionData, InteractionType,
        },
    },
    channel::message::MessageFlags,
    gateway::payload::incoming::MessageCreate,
    http::{
        attachment::Attachment,
        interaction::{InteractionResponse, InteractionResponseType},
    },
    id::{
        marker::{ApplicationMarker, ChannelMarker},
        Id,
    },
};
use twilight_util::builder::{
    command::{CommandBuilder, StringBuilder},
    InteractionResponseDataBuilder,
};

// Discord upload limit for most servers
const MAX_ATTACHMENT_BYTES: u64 = 25_000_000;

pub struct DiscordBot {
    http: Arc<HttpClient>,
    shard: Shard,
    command: Arc<VideoCommand>,
    media_client: reqwest::Client,
    prefix: String,
    application_id: Id<ApplicationMarker>,
}

impl DiscordBot {
    pub async fn new(token: String, config: &Config) -> Result<Self> {
        let http = Arc::new(HttpClient::new(token.clone()));

        let intents = Intents::GUILD_MESSAGES | Intents::DIRECT_MESSAGES | Intents::MESSAGE_CONTENT;
        let shard = Shard::new(ShardId::ONE, token, intents);

        let command =
            VideoCommand::from_config(config).context("Failed to initialize video command")?;

        if !command.search_available().await {
            warn!("Search is unavailable; only direct links will work");
        }

        let media_client = reqwest::Client::builder()
            .timeout(config.http.timeout())
            .build()
            .context("Failed to create media HTTP client")?;

        let application_id = {
            let response = http.current_user_application().await?;
            response.model().await?.id
        };

        let bot = Self {
            http,
            shard,
            command: Arc::new(command),
            media_client,
            prefix: config.discord.command_prefix.clone(),
            application_id,
        };

        bot.register_commands().await?;

        Ok(bot)
    }

    async fn register_commands(&self) -> Result<()> {
        info!("Registering Discord slash commands...");

        let video_command = CommandBuilder::new(
            "video".to_string(),
            "Find a video and post it here".to_string(),
            CommandType::ChatInput,
        )
        .option(StringBuilder::new("query", "Video link or search terms").required(true))
        .build();

        self.http
            .interaction(self.application_id)
            .create_global_command()
            .chat_input(&video_command.name, &video_command.description)
            .command_options(&video_command.options)
            .await?;

        info!("Successfully registered /video slash command");
        Ok(())
    }

    pub async fn run(mut self) -> Result<()> {
        info!("Discord bot starting...");

        loop {
            let event = match self.shard.next_event(EventTypeFlags::all()).await {
                Some(Ok(event)) => event,
                Some(Err(source)) => {
                    error!(?source, "Error receiving event");
                    continue;
                }
                None => {
                    info!("Shard stream ended");
                    return Ok(());
                }
            };

            match event {
                Event::MessageCreate(msg) => self.handle_message(&msg),
                Event::InteractionCreate(interaction) => {
                    if let Err(e) = self.handle_interaction(&interaction).await {
                        error!("Failed to handle interaction: {}", e);
                    }
                }
                Event::Ready(_) => {
                    info!("Discord bot is ready!");
                }
                _ => {}
            }
        }
    }

    fn handle_message(&self, msg: &MessageCreate) {
        if msg.author.bot {
            return;
        }

        if let Some(query) = split_command(&msg.content, &self.prefix) {
            info!("Video command from {}: {:?}", msg.author.name, query);
            self.spawn_command(msg.channel_id, query.to_string());
        }
    }

    #[allow(clippy::single_match)]
    async fn handle_interaction(&self, interaction: &Interaction) -> Result<()> {
        match interaction.kind {
            InteractionType::ApplicationCommand => {
                if let Some(InteractionData::ApplicationCommand(data)) = &interaction.data {
                    match data.name.as_str() {
                        "video" => {
                            self.handle_video_command(interaction, data).await?;
                        }
                        _ => {
                            info!("Unknown command: {}", data.name);
                        }
                    }
                }
            }
            _ => {}
        }

        Ok(())
    }

    async fn handle_video_command(
        &self,
        interaction: &Interaction,
        data: &CommandData,
    ) -> Result<()> {
        let query = data
            .options
            .iter()
            .find(|opt| opt.name == "query")
            .and_then(|opt| match &opt.value {
                CommandOptionValue::String(s) => Some(s.clone()),
                _ => None,
            })
            .unwrap_or_default();

        let Some(channel_id) = interaction.channel.as_ref().map(|c| c.id) else {
            error!("No channel information in interaction");
            self.respond_to_interaction(interaction, "❌ Cannot determine channel for upload")
                .await?;
            return Ok(());
        };

        self.respond_to_interaction(interaction, "Looking for your video...")
            .await?;

        self.spawn_command(channel_id, query);
        Ok(())
    }

    fn spawn_command(&self, channel_id: Id<ChannelMarker>, query: String) {
        let sink = ChannelSink {
            http: self.http.clone(),
            media_client: self.media_client.clone(),
            channel_id,
        };
        let command = self.command.clone();

        tokio::spawn(async move {
            if let Err(e) = command.handle(&query, &sink).await {
                error!("Failed to reply in channel {}: {}", channel_id, e);
            }
        });
    }

    async fn respond_to_interaction(&self, interaction: &Interaction, content: &str) -> Result<()> {
        let response = InteractionResponse {
            kind: InteractionResponseType::ChannelMessageWithSource,
            data: Some(
                InteractionResponseDataBuilder::new()
                    .content(content)
                    .flags(MessageFlags::EPHEMERAL)
                    .build(),
            ),
        };

        self.http
            .interaction(self.application_id)
            .create_response(interaction.id, &interaction.token, &response)
            .await?;

        Ok(())
    }
}

/// Delivers replies for one request into a Discord channel.
pub struct ChannelSink {
    http: Arc<HttpClient>,
    media_client: reqwest::Client,
    channel_id: Id<ChannelMarker>,
}

impl ChannelSink {
    async fn post(&self, content: &str) -> Result<()> {
        self.http
            .create_message(self.channel_id)
            .content(content)
            .await?;
        Ok(())
    }

    async fn fetch_media(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .media_client
            .get(url)
            .send()
            .await
            .context("Failed to fetch media URL")?
            .error_for_status()
            .context("Media host returned an error")?;

        if let Some(len) = response.content_length() {
            if len > MAX_ATTACHMENT_BYTES {
                anyhow::bail!("File too large ({:.1}MB)", len as f64 / 1_000_000.0);
            }
        }

        let data = response
            .bytes()
            .await
            .context("Failed to read media data")?
            .to_vec();

        if data.len() as u64 > MAX_ATTACHMENT_BYTES {
            anyhow::bail!("File too large ({:.1}MB)", data.len() as f64 / 1_000_000.0);
        }

        Ok(data)
    }
}

#[async_trait]
impl MessageSink for ChannelSink {
    async fn send(&self, message: OutboundMessage) -> Result<()> {
        match message {
            OutboundMessage::Text { text } => self.post(&text).await,
            OutboundMessage::Image { url, caption } => self.post(&link_message(&caption, &url)).await,
            OutboundMessage::Video {
                url,
                filename,
                caption,
                ..
            } => match self.fetch_media(&url).await {
                Ok(data) => {
                    let attachment = Attachment::from_bytes(filename, data, 0);
                    self.http
                        .create_message(self.channel_id)
                        .content(&caption)
                        .attachments(&[attachment])
                        .await?;
                    Ok(())
                }
                Err(e) => {
                    warn!("Posting link instead of upload: {}", e);
                    self.post(&link_message(&caption, &url)).await
                }
            },
        }
    }
}

fn link_message(caption: &str, url: &str) -> String {
    format!("{}\n{}", caption, url)
}

pub async fn run(config: Config) -> Result<()> {
    let token = config
        .get_discord_token()
        .context("DISCORD_TOKEN environment variable or [discord] token is required")?;

    let bot = DiscordBot::new(token, &config).await?;
    bot.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_message() {
        assert_eq!(
            link_message("*Lofi Radio*\nDownloading...", "https://img/t.jpg"),
            "*Lofi Radio*\nDownloading...\nhttps://img/t.jpg"
        );
    }
}
