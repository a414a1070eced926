use crate::domain::session::{Session, SessionId};
use dashmap::DashMap;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};

#[derive(Debug, Clone)]
struct Entry {
    session: Session,
    expires_at: OffsetDateTime,
}

/// Server-side session state keyed by the id carried in the session cookie.
///
/// Entries expire a fixed TTL after creation. Expired entries are dropped when they
/// are looked up and swept whenever a new session is created.
#[derive(Debug, Clone)]
pub struct SessionStore {
    entries: Arc<DashMap<SessionId, Entry>>,
    ttl: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl_secs: u64) -> Self {
        let ttl = Duration::seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX));
        Self { entries: Arc::new(DashMap::new()), ttl }
    }

    /// Creates an empty session and returns its id along with its expiry.
    pub fn create(&self) -> (SessionId, OffsetDateTime) {
        let now = OffsetDateTime::now_utc();
        let swept = self.purge_expired(now);
        if swept > 0 {
            tracing::debug!(swept, "Dropped expired sessions");
        }

        let id = SessionId::generate();
        let expires_at = now + self.ttl;
        self.entries.insert(id.clone(), Entry { session: Session::default(), expires_at });
        (id, expires_at)
    }

    /// Returns a copy of the session, or `None` if it does not exist or has expired.
    #[must_use]
    pub fn load(&self, id: &SessionId) -> Option<Session> {
        let now = OffsetDateTime::now_utc();
        let entry = self.entries.get(id)?;
        if entry.expires_at > now {
            return Some(entry.session.clone());
        }
        drop(entry);
        self.entries.remove_if(id, |_, e| e.expires_at <= now);
        None
    }

    /// Writes the session back. Returns `false` if the id is unknown or expired,
    /// in which case nothing is stored.
    pub fn save(&self, id: &SessionId, session: Session) -> bool {
        let now = OffsetDateTime::now_utc();
        match self.entries.get_mut(id) {
            Some(mut entry) if entry.expires_at > now => {
                entry.session = session;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&self, id: &SessionId) {
        self.entries.remove(id);
    }

    /// Removes every entry expired at `now` and returns how many were dropped.
    fn purge_expired(&self, now: OffsetDateTime) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.entries.len())
    }
}
