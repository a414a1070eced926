use crate::api::AppState;
use crate::api::middleware::CurrentSession;
use crate::api::schemas::auth::{AuthStatus, CallbackParams};
use crate::domain::session::Session;
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

/// 302 rather than axum's `Redirect::to`, which answers 303.
fn found(location: &str, set_cookie: Option<HeaderValue>) -> Result<Response> {
    let location = HeaderValue::from_str(location)
        .map_err(|e| AppError::Configuration(format!("Invalid redirect location: {e}")))?;

    let mut response = (StatusCode::FOUND, [(header::LOCATION, location)]).into_response();
    if let Some(cookie) = set_cookie {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

pub async fn login(State(state): State<AppState>) -> Result<Response> {
    let url = state.auth_service.authorize_url()?;
    found(&url, None)
}

/// Completes the authorization-code flow. A successful login always gets a new session id.
pub async fn callback(
    State(state): State<AppState>,
    current: CurrentSession,
    Query(params): Query<CallbackParams>,
) -> Result<Response> {
    if let Some(id) = &current.id {
        state.sessions.remove(id);
    }

    let mut session = Session::default();
    let outcome = state
        .auth_service
        .handle_callback(&mut session, params.code.as_deref(), params.error.as_deref())
        .await;

    let set_cookie = if session.is_authenticated() {
        let (id, expires_at) = state.sessions.create();
        state.sessions.save(&id, session);
        state.cookies.issue(&id, expires_at)?
    } else {
        state.cookies.expired()
    };

    found(&outcome.redirect_location(&state.config.server.app_url), Some(set_cookie))
}

pub async fn auth_status(State(state): State<AppState>, current: CurrentSession) -> Json<AuthStatus> {
    Json(AuthStatus { authenticated: state.auth_service.auth_status(&current.session) })
}

pub async fn logout(State(state): State<AppState>, mut current: CurrentSession) -> impl IntoResponse {
    state.auth_service.logout(&mut current.session);
    if let Some(id) = &current.id {
        state.sessions.remove(id);
    }

    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, state.cookies.expired())])
}
