//! Wire shapes of the Spotify Web API and their flattening into domain types.
//!
//! Nested objects the dashboard can live without (images, external URLs, followers)
//! are optional here so a sparse payload maps to `None` instead of failing to decode.

use crate::domain::library::{Artist, RecentTrack, Track, UserProfile};
use crate::domain::token::TokenGrant;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct PagingRecord<T> {
    #[serde(default)]
    pub(crate) items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageRecord {
    url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExternalUrlsRecord {
    spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FollowersRecord {
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SimpleArtistRecord {
    name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlbumRecord {
    name: Option<String>,
    images: Option<Vec<ImageRecord>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackRecord {
    id: Option<String>,
    name: String,
    artists: Option<Vec<SimpleArtistRecord>>,
    album: Option<AlbumRecord>,
    popularity: Option<u32>,
    duration_ms: u64,
    external_urls: Option<ExternalUrlsRecord>,
    preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArtistRecord {
    id: Option<String>,
    name: String,
    genres: Option<Vec<String>>,
    popularity: Option<u32>,
    followers: Option<FollowersRecord>,
    images: Option<Vec<ImageRecord>>,
    external_urls: Option<ExternalUrlsRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserRecord {
    id: String,
    display_name: Option<String>,
    followers: Option<FollowersRecord>,
    images: Option<Vec<ImageRecord>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlayHistoryRecord {
    played_at: String,
    track: TrackRecord,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendationsRecord {
    pub(crate) tracks: Vec<TrackRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenreSeedsRecord {
    pub(crate) genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponseRecord {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
    scope: Option<String>,
}

fn first_image(images: Option<Vec<ImageRecord>>) -> Option<String> {
    images?.into_iter().next().map(|image| image.url)
}

fn spotify_url(urls: Option<ExternalUrlsRecord>) -> Option<String> {
    urls.and_then(|urls| urls.spotify)
}

fn follower_count(followers: Option<FollowersRecord>) -> u64 {
    followers.and_then(|f| f.total).unwrap_or_default()
}

fn join_artists(artists: &[SimpleArtistRecord]) -> String {
    artists.iter().map(|artist| artist.name.as_str()).collect::<Vec<_>>().join(", ")
}

impl From<TrackRecord> for Track {
    fn from(record: TrackRecord) -> Self {
        let (album, image) = match record.album {
            Some(album) => (album.name.unwrap_or_default(), first_image(album.images)),
            None => (String::new(), None),
        };

        Self {
            id: record.id.unwrap_or_default(),
            name: record.name,
            artist: join_artists(record.artists.as_deref().unwrap_or_default()),
            album,
            popularity: record.popularity.unwrap_or_default(),
            duration_ms: record.duration_ms,
            image,
            external_url: spotify_url(record.external_urls),
            preview_url: record.preview_url,
        }
    }
}

impl From<ArtistRecord> for Artist {
    fn from(record: ArtistRecord) -> Self {
        Self {
            id: record.id.unwrap_or_default(),
            name: record.name,
            genres: record.genres.unwrap_or_default(),
            popularity: record.popularity.unwrap_or_default(),
            followers: follower_count(record.followers),
            image: first_image(record.images),
            external_url: spotify_url(record.external_urls),
        }
    }
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.display_name,
            followers: follower_count(record.followers),
            image: first_image(record.images),
        }
    }
}

impl From<PlayHistoryRecord> for RecentTrack {
    fn from(record: PlayHistoryRecord) -> Self {
        Self { played_at: record.played_at, track: record.track.into() }
    }
}

impl From<TokenResponseRecord> for TokenGrant {
    fn from(record: TokenResponseRecord) -> Self {
        Self {
            access_token: record.access_token,
            refresh_token: record.refresh_token,
            expires_in: record.expires_in,
            scope: record.scope,
        }
    }
}

/// Pulls a human-readable message out of an error body.
///
/// The Web API answers `{"error": {"status": 404, "message": "..."}}` while the accounts
/// service answers `{"error": "invalid_grant", "error_description": "..."}`.
pub(crate) fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let error = value.get("error")?;

    if let Some(message) = error.get("message").and_then(serde_json::Value::as_str) {
        return Some(message.to_string());
    }

    let code = error.as_str()?;
    match value.get("error_description").and_then(serde_json::Value::as_str) {
        Some(description) => Some(format!("{code}: {description}")),
        None => Some(code.to_string()),
    }
}

/// Returns the OAuth error code (`invalid_grant`, `invalid_client`, ...) of a token endpoint error body.
pub(crate) fn oauth_error_code(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}
