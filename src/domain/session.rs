use crate::domain::token::TokenRecord;
use base64::Engine;
use rand::{RngCore, rngs::OsRng};
use std::fmt;

/// Opaque server-side session key. Only ever travels inside the signed cookie.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a cryptographically secure id (32 bytes -> Base64).
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// Session ids are bearer credentials; keep them out of logs.
impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionId(..)")
    }
}

/// Per-browser state. Holds at most one token record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<TokenRecord>,
}

impl Session {
    #[must_use]
    pub const fn token(&self) -> Option<&TokenRecord> {
        self.token.as_ref()
    }

    pub fn set_token(&mut self, token: TokenRecord) {
        self.token = Some(token);
    }

    pub fn clear(&mut self) {
        self.token = None;
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
