use serde::Deserialize;

use super::duration::parse_iso8601_seconds;

/// A remote track as served by the API.
///
/// Playlist items arrive in this shape directly; search results are
/// converted from [`SearchItem`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Track {
    #[serde(rename = "video_id", alias = "videoId")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "thumbnail", default)]
    pub thumbnail_url: String,
    #[serde(rename = "channel_title", alias = "channelTitle", default)]
    pub channel_title: Option<String>,
    #[serde(rename = "duration", default)]
    pub duration_iso8601: Option<String>,
}

impl Track {
    /// Duration in whole seconds; 0 when unknown or malformed.
    pub fn duration_seconds(&self) -> u64 {
        self.duration_iso8601
            .as_deref()
            .map(parse_iso8601_seconds)
            .unwrap_or(0)
    }
}

/// A user playlist with its items in server order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Playlist {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<Track>,
}

impl Playlist {
    /// Sum of item durations in seconds.
    pub fn total_seconds(&self) -> u64 {
        self.items.iter().map(Track::duration_seconds).sum()
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub items: Vec<Track>,
    pub has_more: bool,
    pub total_results: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchItem {
    pub id: SearchItemId,
    pub snippet: Snippet,
    #[serde(default)]
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchItemId {
    #[serde(rename = "videoId")]
    pub video_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Snippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel_title: Option<String>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Thumbnails {
    #[serde(default)]
    pub default: Option<Thumbnail>,
    #[serde(default)]
    pub medium: Option<Thumbnail>,
    #[serde(default)]
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Thumbnail {
    pub url: String,
}

impl From<SearchItem> for Track {
    fn from(item: SearchItem) -> Self {
        let thumbs = item.snippet.thumbnails;
        let thumbnail_url = thumbs
            .high
            .or(thumbs.medium)
            .or(thumbs.default)
            .map(|t| t.url)
            .unwrap_or_default();

        Track {
            id: item.id.video_id,
            title: item.snippet.title,
            thumbnail_url,
            channel_title: item.snippet.channel_title.filter(|c| !c.trim().is_empty()),
            duration_iso8601: item.duration,
        }
    }
}
