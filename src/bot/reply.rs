use super::OutboundMessage;
use crate::media::{ProviderResult, VideoError, VideoIdentity};
use crate::utils::media_filename;

pub const EMPTY_QUERY: &str = "What video do you want to download?";
pub const NO_RESULTS: &str = "No videos found!";
pub const INVALID_LINK: &str = "This is not a valid YouTube link!";
pub const BLOCKED: &str =
    "❌ Download blocked. The content may be unavailable in your region or due to legal restrictions.";
pub const LEGAL_451: &str =
    "❌ Content unavailable (451). This may be due to legal restrictions or regional blocking.";
pub const ALL_SOURCES_FAILED: &str =
    "❌ All download sources failed. The content may be unavailable or blocked.";
pub const GENERIC_FAILURE: &str = "❌ Failed to download video.";

const BLOCK_MARKERS: [&str; 3] = ["blocked", "legal", "region"];
const VIDEO_MIMETYPE: &str = "video/mp4";
const VIDEO_EXT: &str = "mp4";
const FOOTER: &str = "> _Downloaded by ytgrab_";

pub fn video_reply(
    result: &ProviderResult,
    resolved_title: Option<&str>,
    query: &str,
) -> OutboundMessage {
    let title = result.title.as_deref().or(resolved_title).unwrap_or(query);

    OutboundMessage::Video {
        url: result.download_url.clone(),
        mimetype: VIDEO_MIMETYPE.to_string(),
        filename: media_filename(title, VIDEO_EXT),
        caption: format!("*{}*\n\n{}", title, FOOTER),
    }
}

/// Early "downloading" notice, sent only when there is a thumbnail to show.
pub fn preview_message(identity: &VideoIdentity, query: &str) -> Option<OutboundMessage> {
    Some(OutboundMessage::Image {
        url: identity.preview_thumbnail()?,
        caption: format!("*{}*\nDownloading...", identity.title().unwrap_or(query)),
    })
}

/// Picks the user-facing text for a failed request.
pub fn error_reply(error: &VideoError) -> String {
    match error {
        VideoError::EmptyQuery => return EMPTY_QUERY.to_string(),
        VideoError::NoSearchResults(_) => return NO_RESULTS.to_string(),
        VideoError::InvalidLink(_) => return INVALID_LINK.to_string(),
        _ => {}
    }

    let failures = error.provider_failures();

    // only text the providers sent back counts, never transport errors that
    // may quote the user's link
    if failures
        .iter()
        .filter_map(|f| f.error.reported_message())
        .any(has_block_marker)
    {
        return BLOCKED.to_string();
    }

    if failures.iter().any(|f| f.error.status() == Some(451)) {
        return LEGAL_451.to_string();
    }

    if matches!(error, VideoError::AllProvidersFailed(_)) {
        return ALL_SOURCES_FAILED.to_string();
    }

    let message = error.to_string();
    if message.is_empty() {
        GENERIC_FAILURE.to_string()
    } else {
        format!("❌ Download failed: {}", message)
    }
}

fn has_block_marker(message: &str) -> bool {
    let message = message.to_lowercase();
    BLOCK_MARKERS.iter().any(|m| message.contains(m))
}
