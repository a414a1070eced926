use crate::config::{SPOTIFY_SCOPES, SpotifyConfig};
use crate::domain::session::Session;
use crate::domain::token::TokenRecord;
use crate::error::{AppError, Result};
use crate::services::platform::MusicPlatform;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::sync::Arc;
use time::OffsetDateTime;
use url::{Url, form_urlencoded};

#[derive(Clone, Debug)]
struct Metrics {
    callback_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("spotify-relay");
        Self {
            callback_total: meter
                .u64_counter("auth_callback_total")
                .with_description("Total number of OAuth callbacks handled, by outcome")
                .build(),
        }
    }
}

/// Result of an OAuth callback, reported to the browser as a query parameter on the app URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Authenticated,
    /// The platform redirected back with an `error` parameter (e.g. the user declined).
    Denied(String),
    MissingCode,
    ExchangeFailed,
}

impl CallbackOutcome {
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Authenticated => "success",
            Self::Denied(_) => "denied",
            Self::MissingCode => "no_code",
            Self::ExchangeFailed => "callback_error",
        }
    }

    /// Builds the redirect target. Only coarse tags reach the browser, never exchange error detail.
    #[must_use]
    pub fn redirect_location(&self, app_url: &str) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        match self {
            Self::Authenticated => query.append_pair("success", "true"),
            Self::Denied(error) => query.append_pair("error", error),
            Self::MissingCode | Self::ExchangeFailed => query.append_pair("error", self.tag()),
        };

        let separator = if app_url.contains('?') { '&' } else { '?' };
        format!("{app_url}{separator}{}", query.finish())
    }
}

/// Drives the authorization-code flow and owns the token a session starts out with.
#[derive(Clone, Debug)]
pub struct AuthService {
    config: SpotifyConfig,
    platform: Arc<dyn MusicPlatform>,
    metrics: Metrics,
}

impl AuthService {
    #[must_use]
    pub fn new(config: SpotifyConfig, platform: Arc<dyn MusicPlatform>) -> Self {
        Self { config, platform, metrics: Metrics::new() }
    }

    /// Builds the platform's authorize URL for the fixed scope set.
    ///
    /// # Errors
    /// Returns `AppError::Configuration` if the client credentials are missing or the
    /// accounts URL is not a valid base URL.
    pub fn authorize_url(&self) -> Result<String> {
        let Some((client_id, _)) = self.config.credentials() else {
            return Err(AppError::Configuration(
                "Spotify credentials not configured: set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET".to_string(),
            ));
        };

        let endpoint = format!("{}/authorize", self.config.accounts_url.trim_end_matches('/'));
        let url = Url::parse_with_params(
            &endpoint,
            [
                ("client_id", client_id),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", SPOTIFY_SCOPES),
            ],
        )
        .map_err(|e| AppError::Configuration(format!("Invalid Spotify accounts URL: {e}")))?;

        Ok(url.into())
    }

    /// Completes the flow for the parameters the platform redirected back with.
    ///
    /// Whatever the outcome, the token previously held by `session` is discarded first.
    #[tracing::instrument(skip_all, fields(outcome = tracing::field::Empty))]
    pub async fn handle_callback(
        &self,
        session: &mut Session,
        code: Option<&str>,
        error: Option<&str>,
    ) -> CallbackOutcome {
        session.clear();

        let error = error.filter(|e| !e.is_empty());
        let outcome = match (error, code.filter(|c| !c.is_empty())) {
            (Some(error), _) => {
                tracing::warn!(error = %error, "Authorization was not granted");
                CallbackOutcome::Denied(error.to_string())
            }
            (None, None) => {
                tracing::warn!("Callback arrived without an authorization code");
                CallbackOutcome::MissingCode
            }
            (None, Some(code)) => self.exchange(session, code).await,
        };

        tracing::Span::current().record("outcome", outcome.tag());
        self.metrics.callback_total.add(1, &[KeyValue::new("outcome", outcome.tag())]);
        outcome
    }

    async fn exchange(&self, session: &mut Session, code: &str) -> CallbackOutcome {
        let grant = match self.platform.exchange_code(code).await {
            Ok(grant) => grant,
            Err(e) => {
                tracing::warn!(error = %e, "Authorization code exchange failed");
                return CallbackOutcome::ExchangeFailed;
            }
        };

        let Some(record) = TokenRecord::from_grant(grant, OffsetDateTime::now_utc()) else {
            tracing::warn!("Token endpoint did not return a refresh token");
            return CallbackOutcome::ExchangeFailed;
        };

        session.set_token(record);
        tracing::info!("Authenticated with Spotify");
        CallbackOutcome::Authenticated
    }

    /// Reports whether the session holds a token. Never refreshes.
    #[must_use]
    pub const fn auth_status(&self, session: &Session) -> bool {
        session.is_authenticated()
    }

    pub fn logout(&self, session: &mut Session) {
        session.clear();
        tracing::info!("Session signed out");
    }
}
