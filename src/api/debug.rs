use crate::api::AppState;
use crate::api::schemas::diagnostics::DebugInfo;
use crate::config::SPOTIFY_SCOPES;
use axum::{
    Json,
    extract::State,
    response::Html,
};

/// Landing page for a human checking the relay by hand.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let credentials = if state.config.spotify.credentials().is_some() { "Configured" } else { "Missing" };

    Html(format!(
        "<!doctype html>\n\
         <html>\n\
         <head><title>Spotify Relay</title></head>\n\
         <body>\n\
         <h1>Spotify Relay</h1>\n\
         <p><strong>Status:</strong> Running</p>\n\
         <p><strong>Credentials:</strong> {credentials}</p>\n\
         <p><a href=\"/login\">Login with Spotify</a></p>\n\
         </body>\n\
         </html>\n"
    ))
}

pub async fn debug_info(State(state): State<AppState>) -> Json<DebugInfo> {
    let spotify = &state.config.spotify;
    let is_set = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());

    Json(DebugInfo {
        spotify_client_id_set: is_set(&spotify.client_id),
        spotify_client_secret_set: is_set(&spotify.client_secret),
        redirect_uri: spotify.redirect_uri.clone(),
        scopes: SPOTIFY_SCOPES.to_string(),
    })
}
