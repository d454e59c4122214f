use super::{error::VideoError, identity::VideoSearch, types::SearchHit};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Searches through `yt-dlp`'s `ytsearchN:` pseudo-URL in flat-playlist mode,
/// so no media is touched.
pub struct YtDlpSearch {
    binary: String,
    max_results: u32,
}

impl YtDlpSearch {
    pub fn new(binary: impl Into<String>, max_results: u32) -> Self {
        Self {
            binary: binary.into(),
            max_results: max_results.max(1),
        }
    }

    pub async fn test_availability(&self) -> bool {
        match Command::new(&self.binary).arg("--version").output().await {
            Ok(output) => {
                if output.status.success() {
                    let version = String::from_utf8_lossy(&output.stdout);
                    info!("✅ yt-dlp is available, version: {}", version.trim());
                    true
                } else {
                    warn!("❌ yt-dlp command failed");
                    false
                }
            }
            Err(e) => {
                warn!("❌ yt-dlp not found: {} (search queries will fail)", e);
                false
            }
        }
    }
}

#[async_trait]
impl VideoSearch for YtDlpSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, VideoError> {
        debug!("Searching with yt-dlp for: {}", query);

        let output = tokio::time::timeout(
            Duration::from_secs(30),
            Command::new(&self.binary)
                .arg("--flat-playlist")
                .arg("--dump-json")
                .arg("--no-warnings")
                .arg(format!("ytsearch{}:{}", self.max_results, query))
                .output(),
        )
        .await
        .map_err(|_| VideoError::Search("search timed out".to_string()))?
        .map_err(|e| VideoError::Search(format!("failed to run yt-dlp: {e}")))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(VideoError::Search(error.trim().to_string()));
        }

        let hits = parse_search_output(&String::from_utf8_lossy(&output.stdout));
        debug!("yt-dlp returned {} hits", hits.len());
        Ok(hits)
    }

    async fn is_available(&self) -> bool {
        self.test_availability().await
    }
}

/// Parses `--dump-json` output: one JSON object per line, in rank order.
pub fn parse_search_output(stdout: &str) -> Vec<SearchHit> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<Value>(line) {
            Ok(json) => hit_from_json(&json),
            Err(e) => {
                debug!("Skipping unparsable search line: {}", e);
                None
            }
        })
        .collect()
}

fn hit_from_json(json: &Value) -> Option<SearchHit> {
    let url = json["url"]
        .as_str()
        .or(json["webpage_url"].as_str())
        .map(|s| s.to_string())
        .or_else(|| {
            json["id"]
                .as_str()
                .map(|id| format!("https://www.youtube.com/watch?v={id}"))
        })?;

    let thumbnail = json["thumbnail"].as_str().map(|s| s.to_string()).or_else(|| {
        json["thumbnails"]
            .as_array()
            .and_then(|thumbs| thumbs.iter().rev().find_map(|t| t["url"].as_str()))
            .map(|s| s.to_string())
    });

    Some(SearchHit {
        url,
        title: json["title"].as_str().map(|s| s.to_string()),
        thumbnail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_playlist_lines() {
        let stdout = concat!(
            r#"{"id":"abcdefghijk","url":"https://www.youtube.com/watch?v=abcdefghijk","title":"Lofi Radio","thumbnails":[{"url":"https://i.ytimg.com/small.jpg"},{"url":"https://i.ytimg.com/big.jpg"}]}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"id":"bbbbbbbbbbb","title":"Second","thumbnail":"https://img/b.jpg"}"#,
            "\n",
        );

        let hits = parse_search_output(stdout);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://www.youtube.com/watch?v=abcdefghijk");
        assert_eq!(hits[0].title.as_deref(), Some("Lofi Radio"));
        assert_eq!(hits[0].thumbnail.as_deref(), Some("https://i.ytimg.com/big.jpg"));
        assert_eq!(hits[1].url, "https://www.youtube.com/watch?v=bbbbbbbbbbb");
        assert_eq!(hits[1].thumbnail.as_deref(), Some("https://img/b.jpg"));
    }

    #[test]
    fn test_entry_without_location_is_skipped() {
        assert!(parse_search_output(r#"{"title":"orphan"}"#).is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires yt-dlp and network access
    async fn test_live_search() {
        let search = YtDlpSearch::new("yt-dlp", 1);
        let hits = search.search("lofi hip hop radio").await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}
