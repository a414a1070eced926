use crate::domain::session::Session;
use crate::domain::token::TokenRecord;
use crate::services::platform::{MusicPlatform, PlatformError};
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::sync::Arc;
use time::OffsetDateTime;

#[derive(Clone, Debug)]
struct Metrics {
    refresh_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("spotify-relay");
        Self {
            refresh_total: meter
                .u64_counter("token_refresh_total")
                .with_description("Total number of access token refresh attempts")
                .build(),
        }
    }
}

/// Hands out usable access tokens, refreshing the session's record when it is about to expire.
#[derive(Clone, Debug)]
pub struct TokenService {
    platform: Arc<dyn MusicPlatform>,
    metrics: Metrics,
}

impl TokenService {
    #[must_use]
    pub fn new(platform: Arc<dyn MusicPlatform>) -> Self {
        Self { platform, metrics: Metrics::new() }
    }

    /// Returns a fresh token for the session, or `None` if the session holds no token.
    ///
    /// A stale token is refreshed once and the renewed record replaces it in `session`.
    ///
    /// # Errors
    /// Propagates the platform error if the refresh fails. When the platform rejects the
    /// refresh token outright the session is cleared, since it can never be renewed.
    #[tracing::instrument(skip_all, err(level = "warn"))]
    pub async fn get_valid_token(&self, session: &mut Session) -> Result<Option<TokenRecord>, PlatformError> {
        let Some(current) = session.token() else {
            return Ok(None);
        };

        if current.is_fresh_at(OffsetDateTime::now_utc()) {
            return Ok(Some(current.clone()));
        }

        let current = current.clone();
        match self.platform.refresh_token(&current.refresh_token).await {
            Ok(grant) => {
                let renewed = current.renewed(grant, OffsetDateTime::now_utc());
                session.set_token(renewed.clone());
                self.metrics.refresh_total.add(1, &[KeyValue::new("outcome", "ok")]);
                tracing::info!(expires_at = renewed.expires_at, "Access token refreshed");
                Ok(Some(renewed))
            }
            Err(e) => {
                self.metrics.refresh_total.add(1, &[KeyValue::new("outcome", "error")]);
                if matches!(e, PlatformError::Unauthorized) {
                    session.clear();
                }
                Err(e)
            }
        }
    }
}
