use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::ServerSettings;
use crate::track::{Playlist, SearchPage, Track};

use super::error::{ApiError, DataError};
use super::models::{
    AppendItem, AppendRequest, CreatePlaylistRequest, DeleteItemsRequest, LoginReply,
    LoginRequest, PlaylistsReply, SearchReply, ValidateReply,
};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(settings: &ServerSettings) -> Result<Self, ApiError> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()?;
        Ok(Self::with_client(http, &settings.base_url))
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn stream_url(&self, track_id: &str) -> String {
        stream_url(&self.base_url, track_id)
    }

    /// `POST /api/login`. Returns the issued token.
    #[instrument(skip(self, password), err(Display))]
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let res = self
            .http
            .post(self.endpoint("/api/login"))
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let status = res.status();
        // The server answers rejections with `{error}`; tolerate non-JSON bodies.
        let reply: LoginReply = res.json().await.unwrap_or_default();
        match reply.token {
            Some(token) if status.is_success() && !token.is_empty() => Ok(token),
            _ => Err(ApiError::Rejected(
                reply
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| "Login failed.".to_string()),
            )),
        }
    }

    /// `GET /api/validate`. A non-success status reads as an invalid token;
    /// only transport failures surface as errors.
    #[instrument(skip_all, err(Display))]
    pub async fn validate(&self, token: &str) -> Result<bool, ApiError> {
        let res = self
            .authorized(self.http.get(self.endpoint("/api/validate")), token)
            .send()
            .await?;
        if !res.status().is_success() {
            debug!(status = %res.status(), "validate rejected token");
            return Ok(false);
        }
        let reply: ValidateReply = decode(res).await?;
        Ok(reply.valid)
    }

    /// `GET /api/search`. Pages are 1-based.
    #[instrument(skip(self, token), err(Display))]
    pub async fn search(
        &self,
        token: &str,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<SearchPage, DataError> {
        let req = self.http.get(self.endpoint("/api/search")).query(&[
            ("page", page.to_string()),
            ("pageSize", page_size.to_string()),
            ("query", query.to_string()),
        ]);
        let res = send(self.authorized(req, token))
            .await
            .map_err(DataError::failed("search"))?;
        let reply: SearchReply = decode(res).await.map_err(DataError::failed("search"))?;

        Ok(SearchPage {
            items: reply.items.into_iter().map(Track::from).collect(),
            has_more: reply.has_more,
            total_results: reply.total_results,
        })
    }

    /// `GET /api/playList`.
    #[instrument(skip_all, err(Display))]
    pub async fn playlists(&self, token: &str) -> Result<Vec<Playlist>, DataError> {
        let res = send(self.authorized(self.http.get(self.endpoint("/api/playList")), token))
            .await
            .map_err(DataError::failed("load playlists"))?;
        let reply: PlaylistsReply = decode(res)
            .await
            .map_err(DataError::failed("load playlists"))?;
        Ok(reply.playlists)
    }

    /// `POST /api/playList` with an empty item list.
    #[instrument(skip(self, token), err(Display))]
    pub async fn create_playlist(&self, token: &str, name: &str) -> Result<(), DataError> {
        let req = self
            .http
            .post(self.endpoint("/api/playList"))
            .json(&CreatePlaylistRequest { name, items: [] });
        send(self.authorized(req, token))
            .await
            .map_err(DataError::failed("create the playlist"))?;
        Ok(())
    }

    /// `POST /api/playList` appending `track` to playlist `playlist_id`.
    #[instrument(skip(self, token, track), fields(track = %track.id), err(Display))]
    pub async fn append_to_playlist(
        &self,
        token: &str,
        playlist_id: i64,
        track: &Track,
    ) -> Result<(), DataError> {
        let body = AppendRequest {
            id: playlist_id,
            items: vec![AppendItem::from(track)],
        };
        let req = self.http.post(self.endpoint("/api/playList")).json(&body);
        send(self.authorized(req, token))
            .await
            .map_err(DataError::failed("add to the playlist"))?;
        Ok(())
    }

    /// `DELETE /api/playList/item`.
    #[instrument(skip(self, token), err(Display))]
    pub async fn delete_playlist_items(
        &self,
        token: &str,
        playlist_id: i64,
        video_ids: &[String],
    ) -> Result<(), DataError> {
        let req = self
            .http
            .delete(self.endpoint("/api/playList/item"))
            .json(&DeleteItemsRequest {
                playlist_id,
                video_ids,
            });
        send(self.authorized(req, token))
            .await
            .map_err(DataError::failed("delete the selected tracks"))?;
        Ok(())
    }

    /// Fetch the full body at `url` with the bearer header.
    #[instrument(skip(self, token), err(Display))]
    pub async fn fetch_bytes(&self, url: &str, token: &str) -> Result<Bytes, ApiError> {
        let res = send(self.authorized(self.http.get(url), token)).await?;
        let body = res.bytes().await?;
        debug!(len = body.len(), "fetched stream");
        Ok(body)
    }

    fn authorized(&self, req: RequestBuilder, token: &str) -> RequestBuilder {
        req.bearer_auth(token)
    }
}

/// URL of the audio bytes for `track_id`. Authorization travels in the
/// header, never in the query.
pub fn stream_url(base_url: &str, track_id: &str) -> String {
    let base = format!("{}/api/play", base_url.trim_end_matches('/'));
    match Url::parse_with_params(&base, [("id", track_id)]) {
        Ok(url) => url.into(),
        Err(_) => format!("{base}?id={track_id}"),
    }
}

async fn send(req: RequestBuilder) -> Result<Response, ApiError> {
    let res = req.send().await?;
    let status = res.status();
    if status.is_success() {
        Ok(res)
    } else {
        if status == StatusCode::UNAUTHORIZED {
            warn!("server rejected the bearer token");
        }
        Err(ApiError::Status {
            status: status.as_u16(),
        })
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ApiError> {
    let raw = res.bytes().await?;
    serde_json::from_slice(&raw).map_err(|e| ApiError::Decode(e.to_string()))
}
