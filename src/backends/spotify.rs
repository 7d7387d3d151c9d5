//! Spotify Web API playlist adapter (client-credentials flow).

use std::sync::Mutex;
use std::time::{Duration, Instant};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, info};
use serde::Deserialize;

use crate::backends::{BackendError, BackendTrack, PlaylistBackendAdapter};
use crate::config::StreamingConfig;
use crate::http_failure::{classify_io_failure, classify_ureq_failure};

const BACKEND_NAME: &str = "Spotify";
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);
const MAX_PAGES: usize = 200;
const PLAYLIST_ITEM_FIELDS: &str =
    "items(track(id,name,type,artists(name),album(name,images),external_urls)),next";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemsPage {
    #[serde(default)]
    items: Option<Vec<PlaylistItem>>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    #[serde(default)]
    track: Option<TrackObject>,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    artists: Option<Vec<NamedObject>>,
    #[serde(default)]
    album: Option<AlbumObject>,
    #[serde(default)]
    external_urls: Option<ExternalUrls>,
}

#[derive(Debug, Deserialize)]
struct NamedObject {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlbumObject {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    images: Option<Vec<ImageObject>>,
}

#[derive(Debug, Deserialize)]
struct ImageObject {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExternalUrls {
    #[serde(default)]
    spotify: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Spotify playlist adapter backed by `ureq`.
pub struct SpotifyAdapter {
    http_client: ureq::Agent,
    client_id: String,
    client_secret: String,
    token_url: String,
    api_base_url: String,
    page_size: u32,
    request_timeout: Duration,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyAdapter {
    /// Creates a new adapter. Fails when either credential is empty.
    pub fn new(config: &StreamingConfig, client_secret: String) -> Result<Self, BackendError> {
        if config.client_id.trim().is_empty() {
            return Err(BackendError::MissingCredentials(
                "streaming.client_id is empty".to_string(),
            ));
        }
        if client_secret.trim().is_empty() {
            return Err(BackendError::MissingCredentials(
                "client secret is empty".to_string(),
            ));
        }
        let request_timeout = Duration::from_millis(config.request_timeout_ms);
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(config.connect_timeout_ms))
            .timeout_read(request_timeout)
            .timeout_write(request_timeout)
            .build();
        Ok(Self {
            http_client,
            client_id: config.client_id.trim().to_string(),
            client_secret: client_secret.trim().to_string(),
            token_url: config.token_url.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            request_timeout,
            token: Mutex::new(None),
        })
    }

    fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
        format!(
            "Basic {}",
            STANDARD.encode(format!("{client_id}:{client_secret}"))
        )
    }

    fn http_error(operation: &'static str, error: ureq::Error) -> BackendError {
        BackendError::Http {
            kind: classify_ureq_failure(&error),
            operation,
            message: error.to_string(),
        }
    }

    fn read_json<T: serde::de::DeserializeOwned>(
        operation: &'static str,
        response: ureq::Response,
    ) -> Result<T, BackendError> {
        response.into_json::<T>().map_err(|error| {
            if error.kind() == std::io::ErrorKind::InvalidData {
                BackendError::Decode {
                    operation,
                    message: error.to_string(),
                }
            } else {
                BackendError::Http {
                    kind: classify_io_failure(&error),
                    operation,
                    message: error.to_string(),
                }
            }
        })
    }

    fn request_token(&self) -> Result<CachedToken, BackendError> {
        let response = self
            .http_client
            .post(&self.token_url)
            .set(
                "Authorization",
                &Self::basic_auth_header(&self.client_id, &self.client_secret),
            )
            .timeout(self.request_timeout)
            .send_form(&[("grant_type", "client_credentials")])
            .map_err(|error| Self::http_error("token request", error))?;
        let token: TokenResponse = Self::read_json("token request", response)?;
        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(3600));
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN),
        })
    }

    fn cached_access_token(&self) -> Option<String> {
        let cached = self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        cached
            .as_ref()
            .filter(|token| Instant::now() < token.expires_at)
            .map(|token| token.access_token.clone())
    }

    /// Returns the cached token or fetches a new one with `request`.
    /// The token lock is not held while `request` runs.
    fn access_token_with<F>(&self, request: F) -> Result<String, BackendError>
    where
        F: FnOnce() -> Result<CachedToken, BackendError>,
    {
        if let Some(access_token) = self.cached_access_token() {
            return Ok(access_token);
        }
        debug!("Playlist[{BACKEND_NAME}]: requesting client-credentials token");
        let fresh = request()?;
        let access_token = fresh.access_token.clone();
        *self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(fresh);
        Ok(access_token)
    }

    fn access_token(&self) -> Result<String, BackendError> {
        self.access_token_with(|| self.request_token())
    }

    fn first_page_url(&self, playlist_id: &str) -> String {
        format!(
            "{}/playlists/{}/tracks?limit={}&fields={}",
            self.api_base_url,
            urlencoding::encode(playlist_id),
            self.page_size,
            urlencoding::encode(PLAYLIST_ITEM_FIELDS)
        )
    }

    fn fetch_page(&self, url: &str) -> Result<PlaylistItemsPage, BackendError> {
        let token = self.access_token()?;
        let response = self
            .http_client
            .get(url)
            .set("Authorization", &format!("Bearer {token}"))
            .set("Accept", "application/json")
            .timeout(self.request_timeout)
            .call()
            .map_err(|error| Self::http_error("playlist items", error))?;
        Self::read_json("playlist items", response)
    }

    fn pick_cover(images: &[ImageObject]) -> String {
        // Index 1 is the medium-size rendition when the API returns the usual three.
        images
            .get(1)
            .or_else(|| images.first())
            .and_then(|image| image.url.clone())
            .unwrap_or_default()
    }

    fn parse_item(item: PlaylistItem) -> Option<BackendTrack> {
        let track = item.track?;
        if track.kind.as_deref().is_some_and(|kind| kind != "track") {
            return None;
        }
        let title = track
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())?;
        let album = track.album?;
        let album_name = album
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())?;
        let artist = track
            .artists
            .unwrap_or_default()
            .into_iter()
            .find_map(|artist| artist.name.filter(|name| !name.trim().is_empty()))
            .unwrap_or_else(|| "Unknown Artist".to_string());
        let cover_url = Self::pick_cover(&album.images.unwrap_or_default());
        Some(BackendTrack {
            item_id: track.id.unwrap_or_default(),
            title,
            artist,
            album: album_name,
            cover_url,
            external_url: track
                .external_urls
                .and_then(|urls| urls.spotify)
                .unwrap_or_default(),
        })
    }

    fn parse_page(page: PlaylistItemsPage) -> (Vec<BackendTrack>, Option<String>) {
        let tracks = page
            .items
            .unwrap_or_default()
            .into_iter()
            .filter_map(Self::parse_item)
            .collect();
        let next = page.next.filter(|next| !next.trim().is_empty());
        (tracks, next)
    }

    fn collect_pages<F>(first_url: String, mut fetch: F) -> Result<Vec<BackendTrack>, BackendError>
    where
        F: FnMut(&str) -> Result<PlaylistItemsPage, BackendError>,
    {
        let mut tracks = Vec::new();
        let mut next_url = Some(first_url);
        let mut pages = 0usize;
        while let Some(url) = next_url.take() {
            if pages >= MAX_PAGES {
                info!("Playlist[{BACKEND_NAME}]: stopping after {MAX_PAGES} pages");
                break;
            }
            let (page_tracks, next) = Self::parse_page(fetch(&url)?);
            pages += 1;
            tracks.extend(page_tracks);
            next_url = next;
        }
        Ok(tracks)
    }
}

impl PlaylistBackendAdapter for SpotifyAdapter {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn fetch_playlist_tracks(&self, playlist_id: &str) -> Result<Vec<BackendTrack>, BackendError> {
        let first_url = self.first_page_url(playlist_id);
        Self::collect_pages(first_url, |url| self.fetch_page(url))
    }
}
