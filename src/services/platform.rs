use crate::domain::library::{Artist, Limit, RecentTrack, SeedSet, TimeRange, Track, UserProfile};
use crate::domain::token::TokenGrant;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlatformError {
    /// The access token was rejected, or the refresh token/code is no longer valid.
    #[error("Spotify rejected the credentials")]
    Unauthorized,
    #[error("Spotify client credentials are not configured")]
    NotConfigured,
    #[error("Spotify responded with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Spotify request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Unexpected Spotify response: {0}")]
    Malformed(String),
}

/// Capabilities of the music platform used by the relay.
#[async_trait]
pub trait MusicPlatform: Send + Sync + std::fmt::Debug {
    /// Exchanges a single-use authorization code at the token endpoint.
    ///
    /// # Errors
    /// Returns `PlatformError::Unauthorized` if the code was rejected.
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, PlatformError>;

    /// Obtains a new access token.
    ///
    /// # Errors
    /// Returns `PlatformError::Unauthorized` if the refresh token was revoked or expired.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, PlatformError>;

    async fn current_user(&self, access_token: &str) -> Result<UserProfile, PlatformError>;

    async fn top_tracks(
        &self,
        access_token: &str,
        time_range: TimeRange,
        limit: Limit,
    ) -> Result<Vec<Track>, PlatformError>;

    async fn top_artists(
        &self,
        access_token: &str,
        time_range: TimeRange,
        limit: Limit,
    ) -> Result<Vec<Artist>, PlatformError>;

    async fn recently_played(&self, access_token: &str, limit: Limit) -> Result<Vec<RecentTrack>, PlatformError>;

    async fn recommendations(
        &self,
        access_token: &str,
        seeds: &SeedSet,
        limit: Limit,
    ) -> Result<Vec<Track>, PlatformError>;

    async fn genre_seeds(&self, access_token: &str) -> Result<Vec<String>, PlatformError>;
}
