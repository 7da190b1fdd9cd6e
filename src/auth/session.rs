//! Bearer-token sessions kept in memory

use std::sync::Arc;
use std::time::Duration as StdDuration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::memory::normalize_email;

const BEARER_PREFIX: &str = "Bearer ";

/// A signed-in account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSession {
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Token to session map with expiry
///
/// Sessions do not survive a restart.
pub struct SessionManager {
    sessions: Arc<DashMap<String, AuthSession>>,
    ttl: Duration,
}

impl SessionManager {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Periodically drop expired sessions
    pub fn spawn_cleanup(&self, every: StdDuration) -> JoinHandle<()> {
        let sessions = self.sessions.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(every).await;
                Self::cleanup_expired_sessions(&sessions, Utc::now());
            }
        })
    }

    fn new_token() -> String {
        let mut bytes = Vec::with_capacity(32);
        bytes.extend_from_slice(Uuid::new_v4().as_bytes());
        bytes.extend_from_slice(Uuid::new_v4().as_bytes());
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Start a session for `email` and return its token
    pub fn create(&self, email: &str) -> String {
        let now = Utc::now();
        let token = Self::new_token();
        self.sessions.insert(
            token.clone(),
            AuthSession {
                email: normalize_email(email),
                created_at: now,
                expires_at: now + self.ttl,
            },
        );
        token
    }

    /// Email for a live token; accepts a raw token or an `Authorization` value
    pub fn validate(&self, token: &str) -> Option<String> {
        let token = strip_bearer(token);
        if token.is_empty() {
            return None;
        }

        let session = self.sessions.get(token).map(|s| s.clone())?;
        if session.is_expired(Utc::now()) {
            self.sessions.remove(token);
            tracing::debug!("Session expired for {}", session.email);
            return None;
        }
        Some(session.email)
    }

    pub fn delete(&self, token: &str) -> bool {
        self.sessions.remove(strip_bearer(token)).is_some()
    }

    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn cleanup_expired_sessions(sessions: &DashMap<String, AuthSession>, now: DateTime<Utc>) {
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        let removed = before.saturating_sub(sessions.len());
        if removed > 0 {
            tracing::info!("Cleaned up {} expired sessions", removed);
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(Duration::days(7))
    }
}

fn strip_bearer(token: &str) -> &str {
    let token = token.trim();
    token.strip_prefix(BEARER_PREFIX).unwrap_or(token).trim()
}
