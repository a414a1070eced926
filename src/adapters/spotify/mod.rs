use crate::config::SpotifyConfig;
use crate::domain::library::{Artist, Limit, RecentTrack, SeedSet, TimeRange, Track, UserProfile};
use crate::domain::token::TokenGrant;
use crate::services::platform::{MusicPlatform, PlatformError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

mod records;

use records::{
    ArtistRecord, GenreSeedsRecord, PagingRecord, PlayHistoryRecord, RecommendationsRecord, TokenResponseRecord,
    TrackRecord, UserRecord,
};

/// Spotify Web API and accounts-service client.
///
/// One instance is shared by all requests; the underlying `reqwest::Client` pools connections.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    config: SpotifyConfig,
}

impl SpotifyClient {
    /// Creates a client with the configured request timeout.
    ///
    /// # Errors
    /// Returns `PlatformError::Network` if the HTTP client cannot be constructed (e.g. TLS backend failure).
    pub fn new(config: SpotifyConfig) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    fn token_url(&self) -> String {
        format!("{}/api/token", self.config.accounts_url.trim_end_matches('/'))
    }

    #[tracing::instrument(skip(self, access_token, query), fields(http.response.status_code = tracing::field::Empty))]
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<T, PlatformError> {
        let response = self.http.get(self.api_url(path)).bearer_auth(access_token).query(query).send().await?;
        let status = response.status();
        tracing::Span::current().record("http.response.status_code", status.as_u16());

        let body = response.bytes().await?;
        parse_body(status, &body)
    }

    /// Calls the token endpoint with client credentials. Never served from any cache:
    /// authorization codes are single-use.
    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenGrant, PlatformError> {
        let (client_id, client_secret) = self.config.credentials().ok_or(PlatformError::NotConfigured)?;

        let response =
            self.http.post(self.token_url()).basic_auth(client_id, Some(client_secret)).form(form).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status == StatusCode::BAD_REQUEST && records::oauth_error_code(&body).as_deref() == Some("invalid_grant") {
            return Err(PlatformError::Unauthorized);
        }

        let record: TokenResponseRecord = parse_body(status, &body)?;
        Ok(record.into())
    }
}

fn parse_body<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, PlatformError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(PlatformError::Unauthorized);
    }

    if !status.is_success() {
        let message = records::error_message(body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
        return Err(PlatformError::Status { status: status.as_u16(), message });
    }

    serde_json::from_slice(body).map_err(|e| PlatformError::Malformed(e.to_string()))
}

#[async_trait]
impl MusicPlatform for SpotifyClient {
    #[tracing::instrument(skip_all, err(level = "warn"))]
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, PlatformError> {
        self.request_token(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ])
        .await
    }

    #[tracing::instrument(skip_all, err(level = "warn"))]
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, PlatformError> {
        self.request_token(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)]).await
    }

    async fn current_user(&self, access_token: &str) -> Result<UserProfile, PlatformError> {
        let record: UserRecord = self.get("me", access_token, &[]).await?;
        Ok(record.into())
    }

    async fn top_tracks(
        &self,
        access_token: &str,
        time_range: TimeRange,
        limit: Limit,
    ) -> Result<Vec<Track>, PlatformError> {
        let query = [("time_range", time_range.to_string()), ("limit", limit.get().to_string())];
        let page: PagingRecord<TrackRecord> = self.get("me/top/tracks", access_token, &query).await?;
        Ok(page.items.into_iter().map(Into::into).collect())
    }

    async fn top_artists(
        &self,
        access_token: &str,
        time_range: TimeRange,
        limit: Limit,
    ) -> Result<Vec<Artist>, PlatformError> {
        let query = [("time_range", time_range.to_string()), ("limit", limit.get().to_string())];
        let page: PagingRecord<ArtistRecord> = self.get("me/top/artists", access_token, &query).await?;
        Ok(page.items.into_iter().map(Into::into).collect())
    }

    async fn recently_played(&self, access_token: &str, limit: Limit) -> Result<Vec<RecentTrack>, PlatformError> {
        let query = [("limit", limit.get().to_string())];
        let page: PagingRecord<PlayHistoryRecord> =
            self.get("me/player/recently-played", access_token, &query).await?;
        Ok(page.items.into_iter().map(Into::into).collect())
    }

    async fn recommendations(
        &self,
        access_token: &str,
        seeds: &SeedSet,
        limit: Limit,
    ) -> Result<Vec<Track>, PlatformError> {
        let mut query = vec![("limit", limit.get().to_string())];
        let kinds = [("seed_tracks", &seeds.tracks), ("seed_artists", &seeds.artists), ("seed_genres", &seeds.genres)];
        for (key, values) in kinds {
            if !values.is_empty() {
                query.push((key, values.join(",")));
            }
        }

        let record: RecommendationsRecord = self.get("recommendations", access_token, &query).await?;
        Ok(record.tracks.into_iter().map(Into::into).collect())
    }

    async fn genre_seeds(&self, access_token: &str) -> Result<Vec<String>, PlatformError> {
        let record: GenreSeedsRecord =
            self.get("recommendations/available-genre-seeds", access_token, &[]).await?;
        Ok(record.genres)
    }
}
