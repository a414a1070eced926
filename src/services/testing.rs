use crate::domain::library::{Artist, Limit, RecentTrack, SeedSet, TimeRange, Track, UserProfile};
use crate::domain::token::TokenGrant;
use crate::services::platform::{MusicPlatform, PlatformError};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) fn track(id: &str) -> Track {
    Track { id: id.to_string(), name: format!("Track {id}"), ..Track::default() }
}

pub(crate) fn artist(id: &str) -> Artist {
    Artist { id: id.to_string(), name: format!("Artist {id}"), ..Artist::default() }
}

/// In-memory platform with scripted listening history that records every call.
#[derive(Debug, Default)]
pub(crate) struct FakePlatform {
    pub(crate) short_term_tracks: Vec<Track>,
    pub(crate) medium_term_tracks: Vec<Track>,
    pub(crate) medium_term_artists: Vec<Artist>,
    pub(crate) reject_refresh: bool,
    pub(crate) fail_refresh: bool,
    pub(crate) rotate_refresh_token: bool,
    pub(crate) reject_code: bool,
    pub(crate) omit_refresh_token: bool,
    pub(crate) fail_history: bool,
    pub(crate) refresh_calls: AtomicUsize,
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) last_seeds: Mutex<Option<SeedSet>>,
}

impl FakePlatform {
    pub(crate) fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn last_seeds(&self) -> Option<SeedSet> {
        self.last_seeds.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn history_failure(&self) -> Result<(), PlatformError> {
        if self.fail_history {
            return Err(PlatformError::Status { status: 502, message: "bad gateway".into() });
        }
        Ok(())
    }
}

#[async_trait]
impl MusicPlatform for FakePlatform {
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, PlatformError> {
        self.record(format!("exchange_code:{code}"));
        if self.reject_code {
            return Err(PlatformError::Unauthorized);
        }
        Ok(TokenGrant {
            access_token: format!("access-for-{code}"),
            refresh_token: (!self.omit_refresh_token).then(|| format!("refresh-for-{code}")),
            expires_in: 3600,
            scope: Some("user-top-read".into()),
        })
    }

    async fn refresh_token(&self, _refresh_token: &str) -> Result<TokenGrant, PlatformError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.record("refresh_token".into());
        if self.reject_refresh {
            return Err(PlatformError::Unauthorized);
        }
        if self.fail_refresh {
            return Err(PlatformError::Status { status: 503, message: "unavailable".into() });
        }
        Ok(TokenGrant {
            access_token: "refreshed-access".into(),
            refresh_token: self.rotate_refresh_token.then(|| "rotated-refresh".to_string()),
            expires_in: 3600,
            scope: None,
        })
    }

    async fn current_user(&self, _access_token: &str) -> Result<UserProfile, PlatformError> {
        self.record("current_user".into());
        Ok(UserProfile { id: "listener".into(), name: Some("Listener".into()), followers: 3, image: None })
    }

    async fn top_tracks(
        &self,
        _access_token: &str,
        time_range: TimeRange,
        limit: Limit,
    ) -> Result<Vec<Track>, PlatformError> {
        self.record(format!("top_tracks:{time_range}:{}", limit.get()));
        self.history_failure()?;
        let tracks = match time_range {
            TimeRange::ShortTerm => &self.short_term_tracks,
            TimeRange::MediumTerm | TimeRange::LongTerm => &self.medium_term_tracks,
        };
        Ok(tracks.iter().take(usize::from(limit.get())).cloned().collect())
    }

    async fn top_artists(
        &self,
        _access_token: &str,
        time_range: TimeRange,
        limit: Limit,
    ) -> Result<Vec<Artist>, PlatformError> {
        self.record(format!("top_artists:{time_range}:{}", limit.get()));
        self.history_failure()?;
        Ok(self.medium_term_artists.iter().take(usize::from(limit.get())).cloned().collect())
    }

    async fn recently_played(&self, _access_token: &str, limit: Limit) -> Result<Vec<RecentTrack>, PlatformError> {
        self.record(format!("recently_played:{}", limit.get()));
        Ok(vec![RecentTrack { played_at: "2024-01-01T00:00:00Z".into(), track: track("recent") }])
    }

    async fn recommendations(
        &self,
        _access_token: &str,
        seeds: &SeedSet,
        limit: Limit,
    ) -> Result<Vec<Track>, PlatformError> {
        self.record(format!("recommendations:{}", limit.get()));
        *self.last_seeds.lock().unwrap() = Some(seeds.clone());
        Ok(vec![track("recommended")])
    }

    async fn genre_seeds(&self, _access_token: &str) -> Result<Vec<String>, PlatformError> {
        self.record("genre_seeds".into());
        Ok(vec!["pop".into(), "rock".into()])
    }
}
