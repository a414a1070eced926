#![allow(dead_code)]

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use spotify_relay::AppBuilder;
use spotify_relay::config::{
    Config, LogFormat, ServerConfig, SessionConfig, SpotifyConfig, TelemetryConfig,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("spotify_relay=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

pub fn get_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            app_url: "http://127.0.0.1:5173/".to_string(),
            cors_origins: vec!["http://127.0.0.1:5173".to_string()],
        },
        spotify: SpotifyConfig {
            client_id: Some("test-client".to_string()),
            client_secret: Some("test-secret".to_string()),
            redirect_uri: "http://127.0.0.1:5000/callback/".to_string(),
            accounts_url: "http://127.0.0.1:9".to_string(),
            api_url: "http://127.0.0.1:9/v1".to_string(),
            request_timeout_secs: 5,
        },
        session: SessionConfig {
            session_secret: "test_secret".to_string(),
            cookie_name: "relay_session".to_string(),
            session_ttl_secs: 3600,
            secure_cookie: false,
        },
        telemetry: TelemetryConfig { log_format: LogFormat::Text, otlp_endpoint: None },
    }
}

pub fn track_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Track {id}"),
        "artists": [{"name": "Alice"}, {"name": "Bob"}],
        "album": {"name": "Album", "images": [{"url": format!("https://img/{id}")}]},
        "popularity": 42,
        "duration_ms": 180_000,
        "external_urls": {"spotify": format!("https://open.spotify.com/track/{id}")},
        "preview_url": null
    })
}

pub fn artist_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Artist {id}"),
        "genres": ["indie"],
        "popularity": 60,
        "followers": {"total": 100},
        "images": [],
        "external_urls": {"spotify": format!("https://open.spotify.com/artist/{id}")}
    })
}

/// Canned behaviour of the fake Spotify service.
#[derive(Debug, Clone)]
pub struct Upstream {
    pub expires_in: i64,
    pub reject_refresh: bool,
    pub short_term_tracks: Vec<Value>,
    pub medium_term_tracks: Vec<Value>,
    pub medium_term_artists: Vec<Value>,
}

impl Default for Upstream {
    fn default() -> Self {
        Self {
            expires_in: 3600,
            reject_refresh: false,
            short_term_tracks: Vec::new(),
            medium_term_tracks: Vec::new(),
            medium_term_artists: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct MockState {
    upstream: Upstream,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockState {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": {"status": 401, "message": "Invalid access token"}})))
        .into_response()
}

async fn token(
    State(state): State<MockState>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if !headers.contains_key(header::AUTHORIZATION) {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_client"}))).into_response();
    }

    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") => {
            let code = form.get("code").cloned().unwrap_or_default();
            state.record(format!("exchange:{code}"));
            if code == "bad-code" {
                return (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_grant"}))).into_response();
            }
            Json(json!({
                "access_token": format!("access-{code}"),
                "token_type": "Bearer",
                "expires_in": state.upstream.expires_in,
                "refresh_token": format!("refresh-{code}"),
                "scope": "user-top-read"
            }))
            .into_response()
        }
        Some("refresh_token") => {
            let refresh = form.get("refresh_token").cloned().unwrap_or_default();
            state.record(format!("refresh:{refresh}"));
            if state.upstream.reject_refresh {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "invalid_grant", "error_description": "Refresh token revoked"})),
                )
                    .into_response();
            }
            Json(json!({"access_token": "refreshed-access", "token_type": "Bearer", "expires_in": 3600}))
                .into_response()
        }
        _ => (StatusCode::BAD_REQUEST, Json(json!({"error": "unsupported_grant_type"}))).into_response(),
    }
}

async fn me(State(state): State<MockState>, headers: HeaderMap) -> Response {
    let Some(token) = bearer(&headers) else { return unauthorized() };
    state.record(format!("me:{token}"));
    Json(json!({
        "id": "listener",
        "display_name": "Listener",
        "followers": {"total": 7},
        "images": [{"url": "https://img/me"}]
    }))
    .into_response()
}

async fn top_tracks(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    let range = query.get("time_range").cloned().unwrap_or_default();
    let limit = query.get("limit").cloned().unwrap_or_default();
    state.record(format!("top_tracks:{range}:{limit}"));

    let items = match range.as_str() {
        "short_term" => state.upstream.short_term_tracks.clone(),
        "medium_term" => state.upstream.medium_term_tracks.clone(),
        _ => Vec::new(),
    };
    Json(json!({"items": items})).into_response()
}

async fn top_artists(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    let range = query.get("time_range").cloned().unwrap_or_default();
    let limit = query.get("limit").cloned().unwrap_or_default();
    state.record(format!("top_artists:{range}:{limit}"));

    let items = if range == "medium_term" { state.upstream.medium_term_artists.clone() } else { Vec::new() };
    Json(json!({"items": items})).into_response()
}

async fn recently_played(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    state.record("recently_played".to_string());
    Json(json!({"items": [{"played_at": "2024-05-01T10:00:00.000Z", "track": track_json("r1")}]})).into_response()
}

async fn recommendations(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    let mut keys: Vec<String> =
        query.iter().filter(|(k, _)| k.starts_with("seed_")).map(|(k, v)| format!("{k}={v}")).collect();
    keys.sort();
    state.record(format!("recommendations:{}", keys.join("&")));

    let mut track = track_json("rec1");
    track["preview_url"] = json!("https://p.scdn.co/rec1");
    Json(json!({"tracks": [track], "seeds": []})).into_response()
}

async fn genre_seeds(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if bearer(&headers).is_none() {
        return unauthorized();
    }
    state.record("genre_seeds".to_string());
    Json(json!({"genres": ["acoustic", "pop"]})).into_response()
}

/// A running relay wired to a fake Spotify service on a second local port.
pub struct TestApp {
    pub server_url: String,
    pub upstream_url: String,
    pub config: Config,
    pub client: reqwest::Client,
    calls: Arc<Mutex<Vec<String>>>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(Upstream::default(), get_test_config()).await
    }

    pub async fn spawn_with_upstream(upstream: Upstream) -> Self {
        Self::spawn_with(upstream, get_test_config()).await
    }

    pub async fn spawn_with(upstream: Upstream, mut config: Config) -> Self {
        setup_tracing();

        let calls = Arc::new(Mutex::new(Vec::new()));
        let mock = Router::new()
            .route("/api/token", post(token))
            .route("/v1/me", get(me))
            .route("/v1/me/top/tracks", get(top_tracks))
            .route("/v1/me/top/artists", get(top_artists))
            .route("/v1/me/player/recently-played", get(recently_played))
            .route("/v1/recommendations", get(recommendations))
            .route("/v1/recommendations/available-genre-seeds", get(genre_seeds))
            .with_state(MockState { upstream, calls: Arc::clone(&calls) });

        let upstream_listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let upstream_url = format!("http://{}", upstream_listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(upstream_listener, mock).await.unwrap();
        });

        config.spotify.accounts_url = upstream_url.clone();
        config.spotify.api_url = format!("{upstream_url}/v1");

        let router = AppBuilder::new(config.clone()).build().unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none()).build().unwrap();

        Self { server_url, upstream_url, config, client, calls }
    }

    /// Upstream calls seen so far, e.g. `top_tracks:short_term:5`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Runs the callback with `code` and returns the `name=value` session cookie pair.
    pub async fn login(&self, code: &str) -> String {
        let resp = self.client.get(format!("{}/callback/?code={code}", self.server_url)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
        session_cookie(&resp).expect("callback did not set a session cookie")
    }

    pub async fn get_with_cookie(&self, path: &str, cookie: &str) -> reqwest::Response {
        self.client.get(format!("{}{path}", self.server_url)).header(header::COOKIE, cookie).send().await.unwrap()
    }
}

/// Extracts the `name=value` pair of the session cookie set by a response, if any.
pub fn session_cookie(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("relay_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}
