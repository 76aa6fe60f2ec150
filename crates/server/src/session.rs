//! Server-side login sessions
//!
//! Each session owns its conversation state and its responder history.
//! The chat part sits behind its own async mutex, so two requests of the
//! same session are handled one after the other while different sessions
//! run independently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clinic_core::{ConversationState, Identity, Responder};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Per-session chat data, locked for the duration of a turn
pub struct ChatSession {
    pub state: ConversationState,
    pub responder: Box<dyn Responder>,
}

/// A logged-in user
pub struct Session {
    pub token: Uuid,
    pub identity: Identity,
    pub chat: Mutex<ChatSession>,
}

struct Entry {
    session: Arc<Session>,
    last_seen: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant, idle_timeout: Duration) -> bool {
        now.duration_since(self.last_seen) > idle_timeout
    }
}

/// All live sessions, keyed by token.
///
/// A session unused for longer than `idle_timeout` is treated as logged out.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            idle_timeout,
        }
    }

    /// Open a session with an idle conversation, dropping expired ones first
    pub async fn create(&self, identity: Identity, responder: Box<dyn Responder>) -> Arc<Session> {
        let session = Arc::new(Session {
            token: Uuid::new_v4(),
            identity,
            chat: Mutex::new(ChatSession {
                state: ConversationState::default(),
                responder,
            }),
        });

        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(now, self.idle_timeout));
        if sessions.len() < before {
            tracing::debug!(evicted = before - sessions.len(), "Expired sessions removed");
        }

        sessions.insert(
            session.token,
            Entry {
                session: session.clone(),
                last_seen: now,
            },
        );
        session
    }

    /// Look up a live session and mark it as used
    pub async fn get(&self, token: &Uuid) -> Option<Arc<Session>> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(token)?;

        if !entry.is_expired(now, self.idle_timeout) {
            entry.last_seen = now;
            return Some(entry.session.clone());
        }

        sessions.remove(token);
        tracing::info!("Session expired after inactivity");
        None
    }

    /// Close a session; returns false if it did not exist
    pub async fn remove(&self, token: &Uuid) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }
}
