use clap::{Args, Parser, ValueEnum};

/// OAuth scopes requested at login: top items, recently played, library, private playlists.
pub const SPOTIFY_SCOPES: &str = "user-top-read user-read-recently-played user-library-read playlist-read-private";

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub spotify: SpotifyConfig,

    #[command(flatten)]
    pub session: SessionConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "RELAY_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "RELAY_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Where the browser is sent after the OAuth callback (the dashboard root)
    #[arg(long, env = "RELAY_APP_URL", default_value = "/")]
    pub app_url: String,

    /// Comma-separated list of origins allowed to call the API with credentials
    #[arg(long, env = "RELAY_CORS_ORIGINS", default_value = "http://127.0.0.1:5173", value_delimiter = ',')]
    pub cors_origins: Vec<String>,
}

#[derive(Clone, Debug, Args)]
pub struct SpotifyConfig {
    /// Spotify application client id
    #[arg(long, env = "SPOTIFY_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Spotify application client secret
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Redirect URI registered with the Spotify application
    #[arg(long, env = "SPOTIFY_REDIRECT_URI", default_value = "http://127.0.0.1:5000/callback/")]
    pub redirect_uri: String,

    /// Base URL of the Spotify accounts service (authorize and token endpoints)
    #[arg(long, env = "SPOTIFY_ACCOUNTS_URL", default_value = "https://accounts.spotify.com")]
    pub accounts_url: String,

    /// Base URL of the Spotify Web API
    #[arg(long, env = "SPOTIFY_API_URL", default_value = "https://api.spotify.com/v1")]
    pub api_url: String,

    /// Timeout for a single upstream request
    #[arg(long, env = "SPOTIFY_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,
}

impl SpotifyConfig {
    /// Returns the client id and secret when both are set and non-empty.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let id = self.client_id.as_deref().filter(|s| !s.is_empty())?;
        let secret = self.client_secret.as_deref().filter(|s| !s.is_empty())?;
        Some((id, secret))
    }
}

#[derive(Clone, Debug, Args)]
pub struct SessionConfig {
    /// Secret used to sign session cookies
    #[arg(long, env = "RELAY_SESSION_SECRET", hide_env_values = true)]
    pub session_secret: String,

    /// Name of the session cookie
    #[arg(long, env = "RELAY_SESSION_COOKIE", default_value = "relay_session")]
    pub cookie_name: String,

    /// Session lifetime in seconds, counted from login
    #[arg(long, env = "RELAY_SESSION_TTL_SECS", default_value_t = 604_800)]
    pub session_ttl_secs: u64,

    /// Mark the session cookie `Secure` (required when served over HTTPS)
    #[arg(long, env = "RELAY_SESSION_SECURE_COOKIE", default_value_t = false)]
    pub secure_cookie: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "RELAY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP/HTTP collector endpoint; traces and metrics are only exported when set
    #[arg(long, env = "RELAY_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
