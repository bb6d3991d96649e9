use super::MusicService;
use crate::config::Config;
use crate::models::{CurrentUser, Page, Playlist, PlaylistItem};
use crate::token::{basic_auth_header, StoredToken, TokenResponse, TokenStore};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::json;
use std::time::Duration;

/// The Web API accepts at most this many URIs per add/replace request.
pub const MAX_ITEMS_PER_WRITE: usize = 100;

const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Refresh when the token expires within this many seconds.
const EXPIRY_MARGIN_SECS: i64 = 30;

/// Spotify client backed by the Spotify Web API.
/// The OAuth token is read from the token file and refreshed tokens are
/// written back to it.
pub struct SpotifyClient {
    client: Client,
    client_id: String,
    client_secret: String,
    api_base: String,
    auth_base: String,
    store: TokenStore,
    token: tokio::sync::Mutex<Option<StoredToken>>,
}

impl SpotifyClient {
    pub fn new(cfg: &Config) -> Self {
        Self {
            client: Client::new(),
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            auth_base: cfg.auth_base.trim_end_matches('/').to_string(),
            store: TokenStore::new(cfg.token_path.clone()),
            token: tokio::sync::Mutex::new(None),
        }
    }

    /// Bearer header value, refreshing the token first if it is near expiry
    /// or `force` is set.
    async fn bearer(&self, force: bool) -> Result<String> {
        let mut lock = self.token.lock().await;
        if lock.is_none() {
            *lock = self.store.load()?;
        }
        let cur = lock.as_ref().ok_or_else(|| {
            anyhow!(
                "no stored token at {}; run the `auth` command first",
                self.store.path().display()
            )
        })?;
        if force || cur.expires_within(EXPIRY_MARGIN_SECS) {
            debug!("Spotify token is near expiry or rejected, refreshing");
            let refreshed = self.refresh_token(cur).await?;
            *lock = Some(refreshed);
        }
        let st = lock.as_ref().ok_or_else(|| anyhow!("no token loaded"))?;
        Ok(format!("Bearer {}", st.access_token))
    }

    async fn refresh_token(&self, cur: &StoredToken) -> Result<StoredToken> {
        let refresh_token = cur
            .refresh_token
            .clone()
            .ok_or_else(|| anyhow!("no refresh token"))?;
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ];
        let url = format!("{}/api/token", self.auth_base);
        let resp = self
            .client
            .post(&url)
            .header(AUTHORIZATION, basic_auth_header(&self.client_id, &self.client_secret))
            .form(&params)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Failed to refresh token: {} - {}", status, body));
        }
        let tr: TokenResponse = resp.json().await?;
        let st = tr.into_stored(Some(refresh_token));
        self.store.save(&st)?;
        Ok(st)
    }

    /// Send a request built by `build`, refreshing the token once on 401 and
    /// backing off on 429 as the `Retry-After` header asks.
    async fn send<F>(&self, what: &str, build: F) -> Result<Response>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let mut refreshed = false;
        let mut rate_limited: u32 = 0;
        loop {
            let bearer = self.bearer(false).await?;
            let resp = build(&bearer).send().await?;
            let status = resp.status();

            if status == StatusCode::UNAUTHORIZED && !refreshed {
                warn!("Got 401 on {}; attempting token refresh", what);
                self.bearer(true).await?;
                refreshed = true;
                continue;
            }

            if status == StatusCode::TOO_MANY_REQUESTS && rate_limited < MAX_RATE_LIMIT_RETRIES {
                rate_limited += 1;
                let retry_after = resp
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(2);
                warn!("{} rate limited; retrying in {}s", what, retry_after + 1);
                tokio::time::sleep(Duration::from_secs(retry_after + 1)).await;
                continue;
            }

            if !status.is_success() {
                let txt = resp.text().await.unwrap_or_default();
                return Err(anyhow!("{} failed: {} => {}", what, status, txt));
            }
            return Ok(resp);
        }
    }

    fn playlist_tracks_url(&self, playlist_id: &str) -> String {
        format!(
            "{}/playlists/{}/tracks",
            self.api_base,
            urlencoding::encode(playlist_id)
        )
    }

    async fn write_items(&self, method: reqwest::Method, playlist_id: &str, uris: &[String]) -> Result<()> {
        let url = self.playlist_tracks_url(playlist_id);
        let body = json!({ "uris": uris });
        let what = if method == reqwest::Method::PUT {
            "replace tracks"
        } else {
            "add tracks"
        };
        self.send(what, |bearer| {
            self.client
                .request(method.clone(), &url)
                .header(AUTHORIZATION, bearer)
                .header(CONTENT_TYPE, "application/json")
                .json(&body)
        })
        .await?;
        Ok(())
    }
}

/// Accepts bare ids or full `spotify:track:` URIs.
pub fn track_uri(id: &str) -> String {
    if id.starts_with("spotify:") {
        id.to_string()
    } else {
        format!("spotify:track:{}", id)
    }
}

#[async_trait]
impl MusicService for SpotifyClient {
    fn name(&self) -> &str {
        "spotify"
    }

    async fn current_user(&self) -> Result<CurrentUser> {
        let url = format!("{}/me", self.api_base);
        let resp = self
            .send("fetch /me", |bearer| {
                self.client.get(&url).header(AUTHORIZATION, bearer)
            })
            .await?;
        let user: CurrentUser = resp.json().await?;
        Ok(user)
    }

    async fn current_user_playlists(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Page<Option<Playlist>>> {
        let url = format!("{}/me/playlists", self.api_base);
        let query = [("offset", offset.to_string()), ("limit", limit.to_string())];
        let resp = self
            .send("list playlists", |bearer| {
                self.client
                    .get(&url)
                    .header(AUTHORIZATION, bearer)
                    .query(&query)
            })
            .await?;
        // null entries stay in the page so its length still reflects the listing
        let page: Page<Option<Playlist>> = resp.json().await?;
        Ok(page)
    }

    async fn playlist_tracks(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Page<PlaylistItem>> {
        let url = self.playlist_tracks_url(playlist_id);
        let query = [
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
            ("fields", "items(track(id)),next".to_string()),
            ("additional_types", "track".to_string()),
        ];
        let resp = self
            .send("list playlist tracks", |bearer| {
                self.client
                    .get(&url)
                    .header(AUTHORIZATION, bearer)
                    .query(&query)
            })
            .await?;
        let page: Page<Option<PlaylistItem>> = resp.json().await?;
        Ok(Page {
            items: page.items.into_iter().flatten().collect(),
            next: page.next,
        })
    }

    async fn user_playlist_create(&self, user_id: &str, name: &str, public: bool) -> Result<Playlist> {
        let url = format!(
            "{}/users/{}/playlists",
            self.api_base,
            urlencoding::encode(user_id)
        );
        let body = json!({
            "name": name,
            "public": public,
            "description": ""
        });
        let resp = self
            .send("create playlist", |bearer| {
                self.client
                    .post(&url)
                    .header(AUTHORIZATION, bearer)
                    .header(CONTENT_TYPE, "application/json")
                    .json(&body)
            })
            .await?;
        let created: Playlist = resp.json().await?;
        Ok(created)
    }

    async fn playlist_add_items(&self, playlist_id: &str, track_ids: &[String]) -> Result<()> {
        let uris: Vec<String> = track_ids.iter().map(|id| track_uri(id)).collect();
        for chunk in uris.chunks(MAX_ITEMS_PER_WRITE) {
            self.write_items(reqwest::Method::POST, playlist_id, chunk).await?;
        }
        Ok(())
    }

    async fn playlist_replace_items(&self, playlist_id: &str, track_ids: &[String]) -> Result<()> {
        let uris: Vec<String> = track_ids.iter().map(|id| track_uri(id)).collect();
        // PUT replaces with the first chunk (or clears); the rest is appended.
        let split = uris.len().min(MAX_ITEMS_PER_WRITE);
        let (first, rest) = uris.split_at(split);
        self.write_items(reqwest::Method::PUT, playlist_id, first).await?;
        for chunk in rest.chunks(MAX_ITEMS_PER_WRITE) {
            self.write_items(reqwest::Method::POST, playlist_id, chunk).await?;
        }
        Ok(())
    }
}
