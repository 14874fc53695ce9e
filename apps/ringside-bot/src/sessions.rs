use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ringside_shared::WizardSession;
use teloxide::types::UserId;
use tokio::sync::RwLock;

/// Per-user wizard progress. Idle sessions are not stored at all.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The user's session, or a fresh idle one.
    async fn load(&self, user: UserId) -> WizardSession;

    /// Stores the session; an idle session clears the entry.
    async fn save(&self, user: UserId, session: WizardSession);
}

/// Volatile store: everything is lost on restart.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<UserId, WizardSession>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, user: UserId) -> WizardSession {
        let sessions = self.sessions.read().await;
        sessions.get(&user).cloned().unwrap_or_default()
    }

    async fn save(&self, user: UserId, session: WizardSession) {
        let mut sessions = self.sessions.write().await;
        if session.is_active() {
            sessions.insert(user, session);
        } else {
            sessions.remove(&user);
        }
    }
}
