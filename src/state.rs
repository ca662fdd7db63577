use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::extract::FromRef;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    config::Config,
    error::AppError,
    models::{
        question::Catalog,
        session::{AdminCredential, AdminSession},
    },
    store::ResponseStore,
};

#[derive(Debug, Clone, Copy)]
struct SessionEntry {
    session: AdminSession,
    /// `None` when the lifetime does not fit in an `Instant`.
    expires_at: Option<Instant>,
}

impl SessionEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| deadline > now)
    }
}

/// Admin session states keyed by session id.
///
/// Only `LoggedIn` sessions are kept, each for `ttl` after its last `set`;
/// a missing or expired entry reads as `LoggedOut`.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            ttl,
        }
    }

    pub async fn get(&self, session_id: Uuid) -> AdminSession {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .get(&session_id)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.session)
            .unwrap_or_default()
    }

    /// Records the new state of a session, dropping it once logged out.
    /// Expired entries are pruned on every call.
    pub async fn set(&self, session_id: Uuid, session: AdminSession) {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, entry| entry.is_live(now));
        if session.is_authenticated() {
            let entry = SessionEntry {
                session,
                expires_at: now.checked_add(self.ttl),
            };
            sessions.insert(session_id, entry);
        } else {
            sessions.remove(&session_id);
        }
    }

    pub async fn active_count(&self) -> usize {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ResponseStore>,
    pub catalog: Arc<Catalog>,
    pub config: Config,
    pub admin: Arc<AdminCredential>,
    pub sessions: SessionRegistry,
}

impl AppState {
    /// Builds the state for the standard catalog, hashing the admin password.
    pub fn new(store: Arc<dyn ResponseStore>, config: Config) -> Result<Self, AppError> {
        let admin = AdminCredential::from_plaintext(&config.admin_password)?;
        let sessions = SessionRegistry::new(Duration::from_secs(config.jwt_expiration));
        Ok(Self {
            store,
            catalog: Arc::new(Catalog::standard()),
            config,
            admin: Arc::new(admin),
            sessions,
        })
    }
}

impl FromRef<AppState> for Arc<dyn ResponseStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<Catalog> {
    fn from_ref(state: &AppState) -> Self {
        state.catalog.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_sessions_read_as_logged_out() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        assert_eq!(registry.get(Uuid::new_v4()).await, AdminSession::LoggedOut);
    }

    #[tokio::test]
    async fn logging_out_drops_the_entry() {
        let registry = SessionRegistry::new(Duration::from_secs(60));
        let id = Uuid::new_v4();

        registry.set(id, AdminSession::LoggedIn).await;
        assert_eq!(registry.get(id).await, AdminSession::LoggedIn);
        assert_eq!(registry.active_count().await, 1);

        registry.set(id, AdminSession::LoggedIn.logout()).await;
        assert_eq!(registry.get(id).await, AdminSession::LoggedOut);
        assert_eq!(registry.active_count().await, 0);
    }

    #[tokio::test]
    async fn expired_sessions_read_as_logged_out_and_are_pruned() {
        let registry = SessionRegistry::new(Duration::ZERO);
        let stale = Uuid::new_v4();

        registry.set(stale, AdminSession::LoggedIn).await;
        assert_eq!(registry.get(stale).await, AdminSession::LoggedOut);
        assert_eq!(registry.active_count().await, 0);

        registry.set(Uuid::new_v4(), AdminSession::LoggedOut).await;
        assert!(registry.sessions.read().await.is_empty());
    }
}
