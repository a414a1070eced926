use crate::api::middleware::{MakeRequestUuidOrHeader, REQUEST_ID_HEADER, SessionCookies};
use crate::config::Config;
use crate::services::auth_service::AuthService;
use crate::services::library_service::LibraryService;
use crate::services::token_service::TokenService;
use crate::storage::SessionStore;
use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Method, Request, header};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod debug;
pub mod health;
pub mod library;
pub mod middleware;
pub mod schemas;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub cookies: SessionCookies,
    pub auth_service: AuthService,
    pub token_service: TokenService,
    pub library_service: LibraryService,
}

#[derive(Debug)]
pub struct ServiceContainer {
    pub sessions: SessionStore,
    pub auth_service: AuthService,
    pub token_service: TokenService,
    pub library_service: LibraryService,
}

/// Configures and returns the application router.
pub fn app_router(config: Config, services: ServiceContainer) -> Router {
    let cors = cors_layer(&config.server.cors_origins);
    let state = AppState {
        cookies: SessionCookies::new(&config.session),
        config,
        sessions: services.sessions,
        auth_service: services.auth_service,
        token_service: services.token_service,
        library_service: services.library_service,
    };

    let auth_routes = Router::new()
        .route("/login", get(auth::login))
        .route("/api/callback", get(auth::callback))
        .route("/callback", get(auth::callback))
        .route("/callback/", get(auth::callback))
        .route("/api/auth-status", get(auth::auth_status))
        .route("/api/logout", post(auth::logout));

    let library_routes = Router::new()
        .route("/api/user", get(library::user))
        .route("/api/top-tracks", get(library::top_tracks))
        .route("/api/top-artists", get(library::top_artists))
        .route("/api/recent-tracks", get(library::recent_tracks))
        .route("/api/recommendations", get(library::recommendations))
        .route("/api/genre-seeds", get(library::genre_seeds));

    Router::new()
        .route("/", get(debug::index))
        .route("/debug", get(debug::debug_info))
        .route("/livez", get(health::livez))
        .merge(auth_routes)
        .merge(library_routes)
        .layer(cors)
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER)))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .map(|id| id.header_value().to_str().unwrap_or_default())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                        let status = response.status();
                        tracing::Span::current().record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER), MakeRequestUuidOrHeader))
        .with_state(state)
}

/// Credentialed CORS needs explicit origins; entries that are not valid header values are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
