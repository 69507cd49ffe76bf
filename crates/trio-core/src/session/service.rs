//! In-memory session service
//!
//! Sessions live for the lifetime of the process; nothing is persisted.

use super::SessionContext;
use crate::{Result, TrioError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Identity of one interactive session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl SessionKey {
    /// Build a key; every part must be non-empty
    pub fn new(app_name: &str, user_id: &str, session_id: &str) -> Result<Self> {
        for (label, value) in [
            ("app name", app_name),
            ("user id", user_id),
            ("session id", session_id),
        ] {
            if value.trim().is_empty() {
                return Err(TrioError::invalid_input(format!("Session {} must not be empty", label)));
            }
        }

        Ok(Self {
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
        })
    }

    /// Key with a freshly generated session id
    pub fn generate(app_name: &str, user_id: &str) -> Result<Self> {
        Self::new(app_name, user_id, &Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.app_name, self.user_id, self.session_id)
    }
}

/// One session: its identity and its artifact store
#[derive(Debug)]
pub struct Session {
    key: SessionKey,
    context: SessionContext,
}

impl Session {
    fn new(key: SessionKey) -> Self {
        Self {
            key,
            context: SessionContext::new(),
        }
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }
}

/// Process-lifetime registry of sessions
#[derive(Debug, Default)]
pub struct SessionService {
    sessions: RwLock<HashMap<SessionKey, Arc<Session>>>,
}

impl SessionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session; an existing session with the same key is returned as is
    pub fn create_session(&self, key: SessionKey) -> Arc<Session> {
        let mut sessions = self.sessions.write();
        sessions
            .entry(key.clone())
            .or_insert_with(|| {
                tracing::info!(session = %key, "Session created");
                Arc::new(Session::new(key))
            })
            .clone()
    }

    /// Look up a session
    pub fn get_session(&self, key: &SessionKey) -> Option<Arc<Session>> {
        self.sessions.read().get(key).cloned()
    }

    /// Look up a session, creating it on first use
    pub fn get_or_create(&self, key: &SessionKey) -> Arc<Session> {
        if let Some(session) = self.get_session(key) {
            return session;
        }
        self.create_session(key.clone())
    }

    /// Look up a session or fail with `NotFound`
    pub fn require_session(&self, key: &SessionKey) -> Result<Arc<Session>> {
        self.get_session(key)
            .ok_or_else(|| TrioError::not_found(format!("session {}", key)))
    }

    /// Drop a session and its artifacts
    pub fn remove_session(&self, key: &SessionKey) -> bool {
        self.sessions.write().remove(key).is_some()
    }

    /// Keys of every live session
    pub fn list(&self) -> Vec<SessionKey> {
        self.sessions.read().keys().cloned().collect()
    }
}
