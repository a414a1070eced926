use crate::api::AppState;
use crate::config::SessionConfig;
use crate::domain::session::{Session, SessionId};
use crate::error::{AppError, Result};
use crate::storage::SessionStore;
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, Request, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use time::OffsetDateTime;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sid: String,
    exp: u64,
}

/// Issues and verifies the signed session cookie. The cookie only carries the session id;
/// tokens never leave the server.
#[derive(Clone)]
pub struct SessionCookies {
    name: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    secure: bool,
}

impl std::fmt::Debug for SessionCookies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCookies").field("name", &self.name).field("secure", &self.secure).finish_non_exhaustive()
    }
}

impl SessionCookies {
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            encoding_key: EncodingKey::from_secret(config.session_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.session_secret.as_bytes()),
            secure: config.secure_cookie,
        }
    }

    /// Builds the `Set-Cookie` value binding the browser to `id` until `expires_at`.
    ///
    /// # Errors
    /// Returns `AppError::Configuration` if the cookie cannot be signed.
    pub fn issue(&self, id: &SessionId, expires_at: OffsetDateTime) -> Result<HeaderValue> {
        let exp = u64::try_from(expires_at.unix_timestamp()).unwrap_or_default();
        let claims = SessionClaims { sid: id.as_str().to_string(), exp };
        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Configuration(format!("Failed to sign session cookie: {e}")))?;

        let max_age = (expires_at - OffsetDateTime::now_utc()).whole_seconds().max(0);
        let cookie = format!(
            "{}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}{}",
            self.name,
            self.secure_attr()
        );
        HeaderValue::from_str(&cookie).map_err(|e| AppError::Configuration(format!("Invalid session cookie: {e}")))
    }

    /// Builds a `Set-Cookie` value that makes the browser drop the cookie.
    #[must_use]
    pub fn expired(&self) -> HeaderValue {
        let cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}", self.name, self.secure_attr());
        HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("relay_session=; Path=/; Max-Age=0"))
    }

    /// Returns the session id from the request's cookie if it carries a valid, unexpired signature.
    #[must_use]
    pub fn session_id(&self, headers: &HeaderMap) -> Option<SessionId> {
        let token = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find_map(|(name, value)| (name == self.name).then_some(value))?;

        match decode::<SessionClaims>(token, &self.decoding_key, &Validation::default()) {
            Ok(data) => Some(SessionId::from(data.claims.sid)),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session cookie");
                None
            }
        }
    }

    const fn secure_attr(&self) -> &'static str {
        if self.secure { "; Secure" } else { "" }
    }
}

/// The caller's session, loaded from the store. Requests without a valid cookie get an
/// empty, unsaved session.
#[derive(Debug)]
pub struct CurrentSession {
    pub id: Option<SessionId>,
    pub session: Session,
}

impl CurrentSession {
    /// Writes the session back to the store, if it is backed by one.
    pub fn commit(&self, store: &SessionStore) {
        if let Some(id) = &self.id {
            store.save(id, self.session.clone());
        }
    }
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> std::result::Result<Self, Self::Rejection> {
        let loaded = state
            .cookies
            .session_id(&parts.headers)
            .and_then(|id| state.sessions.load(&id).map(|session| (id, session)));

        Ok(match loaded {
            Some((id, session)) => Self { id: Some(id), session },
            None => Self { id: None, session: Session::default() },
        })
    }
}

/// Keeps a client-supplied request id when present, otherwise generates a UUID v4.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestUuidOrHeader;

impl MakeRequestId for MakeRequestUuidOrHeader {
    fn make_request_id<B>(&mut self, request: &Request<B>) -> Option<RequestId> {
        if let Some(existing) = request.headers().get(REQUEST_ID_HEADER) {
            if !existing.is_empty() && existing.len() <= 128 {
                return Some(RequestId::new(existing.clone()));
            }
        }

        let id = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(id))
    }
}
