use crate::domain::library::{Artist, Limit, MAX_SEEDS, RecentTrack, SeedSet, TimeRange, Track, UserProfile};
use crate::error::{AppError, Result};
use crate::services::platform::{MusicPlatform, PlatformError};
use std::sync::Arc;

const NO_SEEDS_HINT: &str = "No recommendation seeds available. Listen to more music on Spotify first, then try again";

/// Listening-history lookups tried, in order, when a recommendation request carries no seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeedSource {
    TopTracks(TimeRange),
    TopArtists(TimeRange),
}

const SEED_CASCADE: [SeedSource; 3] = [
    SeedSource::TopTracks(TimeRange::ShortTerm),
    SeedSource::TopTracks(TimeRange::MediumTerm),
    SeedSource::TopArtists(TimeRange::MediumTerm),
];

/// Read-only views of a user's library. Callers pass an access token obtained from the token service.
#[derive(Clone, Debug)]
pub struct LibraryService {
    platform: Arc<dyn MusicPlatform>,
}

impl LibraryService {
    #[must_use]
    pub fn new(platform: Arc<dyn MusicPlatform>) -> Self {
        Self { platform }
    }

    pub async fn profile(&self, access_token: &str) -> Result<UserProfile> {
        Ok(self.platform.current_user(access_token).await?)
    }

    #[tracing::instrument(skip(self, access_token), err(level = "warn"))]
    pub async fn top_tracks(&self, access_token: &str, time_range: TimeRange, limit: Limit) -> Result<Vec<Track>> {
        Ok(self.platform.top_tracks(access_token, time_range, limit).await?)
    }

    #[tracing::instrument(skip(self, access_token), err(level = "warn"))]
    pub async fn top_artists(&self, access_token: &str, time_range: TimeRange, limit: Limit) -> Result<Vec<Artist>> {
        Ok(self.platform.top_artists(access_token, time_range, limit).await?)
    }

    #[tracing::instrument(skip(self, access_token), err(level = "warn"))]
    pub async fn recent_tracks(&self, access_token: &str, limit: Limit) -> Result<Vec<RecentTrack>> {
        Ok(self.platform.recently_played(access_token, limit).await?)
    }

    pub async fn genre_seeds(&self, access_token: &str) -> Result<Vec<String>> {
        Ok(self.platform.genre_seeds(access_token).await?)
    }

    /// Fetches recommendations, resolving seeds from the listening history when the caller supplied none.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if no seed could be resolved at all.
    #[tracing::instrument(skip(self, access_token, requested), err(level = "warn"))]
    pub async fn recommendations(&self, access_token: &str, requested: SeedSet, limit: Limit) -> Result<Vec<Track>> {
        let seeds = self.resolve_seeds(access_token, requested).await?;
        if seeds.is_empty() {
            return Err(AppError::Validation(NO_SEEDS_HINT.to_string()));
        }

        tracing::debug!(
            tracks = seeds.tracks.len(),
            artists = seeds.artists.len(),
            genres = seeds.genres.len(),
            "Requesting recommendations"
        );
        Ok(self.platform.recommendations(access_token, &seeds, limit).await?)
    }

    /// Caller seeds win. Otherwise the first history lookup that yields anything is used,
    /// and the fixed genre list is the last resort.
    ///
    /// # Errors
    /// Returns `AppError::Unauthenticated` if the platform rejects the token during a lookup.
    pub async fn resolve_seeds(&self, access_token: &str, requested: SeedSet) -> Result<SeedSet> {
        if !requested.is_empty() {
            return Ok(requested);
        }

        for source in SEED_CASCADE {
            match self.seeds_from(access_token, source).await {
                Ok(seeds) if !seeds.is_empty() => {
                    tracing::debug!(source = ?source, "Resolved seeds from listening history");
                    return Ok(seeds);
                }
                Ok(_) => {}
                Err(PlatformError::Unauthorized) => return Err(AppError::Unauthenticated),
                Err(e) => tracing::warn!(error = %e, source = ?source, "Seed lookup failed, trying next source"),
            }
        }

        tracing::debug!("Falling back to default genres");
        Ok(SeedSet::fallback())
    }

    async fn seeds_from(&self, access_token: &str, source: SeedSource) -> std::result::Result<SeedSet, PlatformError> {
        let limit = Limit::new(u8::try_from(MAX_SEEDS).unwrap_or(u8::MAX));
        match source {
            SeedSource::TopTracks(range) => {
                let tracks = self.platform.top_tracks(access_token, range, limit).await?;
                Ok(SeedSet::with_tracks(tracks.into_iter().map(|t| t.id).collect()))
            }
            SeedSource::TopArtists(range) => {
                let artists = self.platform.top_artists(access_token, range, limit).await?;
                Ok(SeedSet::with_artists(artists.into_iter().map(|a| a.id).collect()))
            }
        }
    }
}
