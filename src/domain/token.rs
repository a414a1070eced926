use time::OffsetDateTime;

/// A stored token is only handed out while at least this many seconds remain before it expires.
pub const FRESHNESS_MARGIN_SECS: i64 = 60;

/// Token pair returned by the platform's token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    pub scope: Option<String>,
}

/// The access/refresh pair held in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry as unix seconds. Authoritative; `expires_in` is never kept around.
    pub expires_at: i64,
    pub scope: Option<String>,
}

impl TokenRecord {
    /// Builds the record for a freshly exchanged authorization code.
    ///
    /// Returns `None` when the platform did not hand out a refresh token, since such a
    /// session could never be renewed.
    #[must_use]
    pub fn from_grant(grant: TokenGrant, now: OffsetDateTime) -> Option<Self> {
        let refresh_token = grant.refresh_token?;
        Some(Self {
            access_token: grant.access_token,
            refresh_token,
            expires_at: now.unix_timestamp() + grant.expires_in,
            scope: grant.scope,
        })
    }

    /// Applies a refresh grant. The platform may omit the refresh token or scope,
    /// in which case the previous values carry over.
    #[must_use]
    pub fn renewed(&self, grant: TokenGrant, now: OffsetDateTime) -> Self {
        Self {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token.unwrap_or_else(|| self.refresh_token.clone()),
            expires_at: now.unix_timestamp() + grant.expires_in,
            scope: grant.scope.or_else(|| self.scope.clone()),
        }
    }

    #[must_use]
    pub const fn is_fresh_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at - now.unix_timestamp() >= FRESHNESS_MARGIN_SECS
    }
}
