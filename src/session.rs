//! Per-user conversation state.
//!
//! A session remembers the chat transcript, the outline waiting for
//! approval and the files generated so far. Each session sits behind its own
//! async mutex so one user's turns run one at a time. Generated files are also
//! indexed store-wide so downloads never wait on a session's turn.

use crate::models::{ChatEntry, DeckFile, Outline};
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

pub const GREETING: &str = "Hello! What topic would you like a presentation on?";

const CONFIRMATION_WORDS: [&str; 4] = ["yes", "y", "looks good", "ok"];

/// Whether `text` approves the pending outline.
pub fn is_confirmation(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    CONFIRMATION_WORDS.contains(&normalized.as_str())
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub messages: Vec<ChatEntry>,
    pub pending_outline: Option<Outline>,
    pub files: Vec<DeckFile>,
    pub last_active: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: vec![ChatEntry::assistant(GREETING)],
            pending_outline: None,
            files: Vec::new(),
            last_active: Instant::now(),
        }
    }

    pub fn has_outline(&self) -> bool {
        self.pending_outline.is_some()
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
    files: RwLock<HashMap<Uuid, DeckFile>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new conversation; returns a snapshot including the greeting.
    pub async fn create(&self) -> Session {
        let session = Session::new();
        let snapshot = session.clone();
        self.sessions
            .write()
            .await
            .insert(session.id, Arc::new(Mutex::new(session)));
        tracing::debug!("Created session {}", snapshot.id);
        snapshot
    }

    /// Handle to the live session. Lock it to read or change state.
    pub async fn get(&self, id: Uuid) -> Result<SharedSession> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(Error::SessionNotFound(id))
    }

    pub async fn snapshot(&self, id: Uuid) -> Result<Session> {
        let session = self.get(id).await?;
        let guard = session.lock().await;
        Ok(guard.clone())
    }

    /// Drop the session and its file index entries, returning its final state.
    pub async fn remove(&self, id: Uuid) -> Result<Session> {
        let session = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or(Error::SessionNotFound(id))?;
        let guard = session.lock().await;

        let mut files = self.files.write().await;
        for file in &guard.files {
            files.remove(&file.id);
        }
        Ok(guard.clone())
    }

    /// Attach a generated file to `session` and make it downloadable.
    pub async fn register_file(&self, session: &mut Session, file: DeckFile) {
        self.files.write().await.insert(file.id, file.clone());
        session.files.push(file);
    }

    pub async fn find_file(&self, file_id: Uuid) -> Result<DeckFile> {
        self.files
            .read()
            .await
            .get(&file_id)
            .cloned()
            .ok_or(Error::FileNotFound(file_id))
    }

    /// Sessions with no activity for at least `ttl`.
    ///
    /// A session whose mutex is held is mid-turn and never counts as idle.
    pub async fn idle_sessions(&self, ttl: Duration) -> Vec<Uuid> {
        self.sessions
            .read()
            .await
            .iter()
            .filter_map(|(id, session)| {
                let guard = session.try_lock().ok()?;
                (guard.last_active.elapsed() >= ttl).then_some(*id)
            })
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
