//! Request and response bodies, named after the server's JSON.

use serde::{Deserialize, Serialize};

use crate::track::{Playlist, SearchItem, Track};

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginReply {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateReply {
    #[serde(default)]
    pub valid: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReply {
    #[serde(default)]
    pub(crate) items: Vec<SearchItem>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub total_results: u64,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistsReply {
    #[serde(default)]
    pub playlists: Vec<Playlist>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreatePlaylistRequest<'a> {
    pub name: &'a str,
    pub items: [AppendItem; 0],
}

#[derive(Debug, Serialize)]
pub(crate) struct AppendRequest {
    pub id: i64,
    pub items: Vec<AppendItem>,
}

/// One entry of a playlist append, in the shape the server stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendItem {
    pub video_id: String,
    pub title: String,
    pub thumbnail: String,
    pub channel_title: String,
}

impl From<&Track> for AppendItem {
    fn from(track: &Track) -> Self {
        AppendItem {
            video_id: track.id.clone(),
            title: crate::track::decode_html_entities(&track.title),
            thumbnail: track.thumbnail_url.clone(),
            channel_title: track.channel_title.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeleteItemsRequest<'a> {
    pub playlist_id: i64,
    pub video_ids: &'a [String],
}
