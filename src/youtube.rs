//! Cooking video lookup through the YouTube Data API.

use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::YoutubeConfig;

const API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const FOOD_CATEGORY: &str = "26";
const MIN_VIEWS: u64 = 1000;

static COOKING_PATTERN: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum YoutubeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("YouTube API error ({0})")]
    Api(u16),
}

/// Best single match for a recipe title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookingVideo {
    pub video_id: String,
    pub title: String,
    pub view_count: Option<String>,
    pub channel_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub thumbnail: Option<Thumbnail>,
    pub channel_title: String,
    pub description: String,
    pub view_count: u64,
    pub like_count: u64,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// First search hit whose title or description looks like a cooking video.
    async fn find_cooking_video(&self, query: &str) -> Result<Option<CookingVideo>, YoutubeError>;
    /// Popular, embeddable videos for a query, most viewed first.
    async fn search_videos(&self, query: &str, max: usize) -> Result<Vec<VideoSummary>, YoutubeError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoDetails>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoDetails {
    id: String,
    #[serde(default)]
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
    #[serde(default)]
    status: Option<VideoStatus>,
    #[serde(default)]
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatus {
    #[serde(default)]
    embeddable: bool,
    #[serde(default)]
    privacy_status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentDetails {
    duration: Option<String>,
    region_restriction: Option<serde_json::Value>,
}

pub fn is_cooking_video(title: &str, description: &str) -> bool {
    COOKING_PATTERN
        .get_or_init(|| Regex::new(r"(?i)recipe|cooking|how to make|prepare|kitchen").unwrap())
        .is_match(&format!("{} {}", title, description))
}

fn parse_count(count: &Option<String>) -> u64 {
    count.as_deref().and_then(|c| c.parse().ok()).unwrap_or(0)
}

/// Keep public, embeddable, unrestricted videos with real audiences.
fn select_videos(details: Vec<VideoDetails>, max: usize) -> Vec<VideoSummary> {
    let mut videos: Vec<VideoSummary> = details
        .into_iter()
        .filter(|v| {
            v.status
                .as_ref()
                .map(|s| s.embeddable && s.privacy_status == "public")
                .unwrap_or(false)
        })
        .filter(|v| {
            v.content_details
                .as_ref()
                .map(|c| c.region_restriction.is_none())
                .unwrap_or(true)
        })
        .filter(|v| parse_count(&v.statistics.view_count) > MIN_VIEWS)
        .map(|v| VideoSummary {
            view_count: parse_count(&v.statistics.view_count),
            like_count: parse_count(&v.statistics.like_count),
            duration: v.content_details.and_then(|c| c.duration),
            thumbnail: v.snippet.thumbnails.medium,
            title: v.snippet.title,
            channel_title: v.snippet.channel_title,
            description: v.snippet.description,
            id: v.id,
        })
        .collect();

    videos.sort_by(|a, b| b.view_count.cmp(&a.view_count));
    videos.truncate(max);
    videos
}

pub struct YoutubeClient {
    api_key: String,
    client: Client,
}

impl YoutubeClient {
    pub fn from_config(config: &YoutubeConfig) -> Result<Option<Self>, YoutubeError> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;
        Ok(Some(Self { api_key, client }))
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, YoutubeError> {
        let response = self
            .client
            .get(format!("{}/{}", API_BASE_URL, endpoint))
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(YoutubeError::Api(status.as_u16()));
        }
        Ok(response.json().await?)
    }

    async fn video_details(&self, ids: &str, parts: &str) -> Result<Vec<VideoDetails>, YoutubeError> {
        let response: VideosResponse = self.get("videos", &[("part", parts), ("id", ids)]).await?;
        Ok(response.items)
    }
}

#[async_trait]
impl VideoSearch for YoutubeClient {
    async fn find_cooking_video(&self, query: &str) -> Result<Option<CookingVideo>, YoutubeError> {
        let q = format!("{} recipe cooking", query);
        let search: SearchResponse = self
            .get(
                "search",
                &[
                    ("part", "snippet"),
                    ("maxResults", "1"),
                    ("q", q.as_str()),
                    ("type", "video"),
                    ("videoCategoryId", FOOD_CATEGORY),
                    ("relevanceLanguage", "en"),
                    ("order", "relevance"),
                    ("videoDuration", "medium"),
                ],
            )
            .await?;

        let Some(item) = search.items.into_iter().next() else {
            return Ok(None);
        };
        let Some(video_id) = item.id.video_id else {
            return Ok(None);
        };

        let details = self.video_details(&video_id, "snippet,statistics").await?;
        let Some(info) = details.into_iter().next() else {
            return Ok(None);
        };

        if !is_cooking_video(&info.snippet.title, &info.snippet.description) {
            debug!(video_id = %video_id, "Search hit is not a cooking video");
            return Ok(None);
        }

        Ok(Some(CookingVideo {
            video_id,
            title: item.snippet.title,
            view_count: info.statistics.view_count,
            channel_title: item.snippet.channel_title,
        }))
    }

    async fn search_videos(&self, query: &str, max: usize) -> Result<Vec<VideoSummary>, YoutubeError> {
        let fetch = (max * 2).clamp(1, 50).to_string();
        let search: SearchResponse = self
            .get(
                "search",
                &[
                    ("part", "snippet"),
                    ("q", query),
                    ("type", "video"),
                    ("maxResults", fetch.as_str()),
                    ("relevanceLanguage", "en"),
                    ("videoCategoryId", FOOD_CATEGORY),
                    ("videoEmbeddable", "true"),
                    ("videoSyndicated", "true"),
                    ("videoDefinition", "high"),
                    ("regionCode", "US"),
                    ("safeSearch", "none"),
                    ("order", "viewCount"),
                ],
            )
            .await?;

        let ids: Vec<String> = search
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let details = self
            .video_details(&ids.join(","), "snippet,statistics,status,contentDetails")
            .await?;
        Ok(select_videos(details, max))
    }
}

impl fmt::Debug for YoutubeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YoutubeClient")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
