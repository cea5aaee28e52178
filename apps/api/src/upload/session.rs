//! In-progress flag: at most one submission in flight per session.
//!
//! The flag is owned by a `SubmissionGuard` and cleared when the guard drops,
//! so every exit path of a submission releases it.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct InFlightSessions {
    active: Arc<Mutex<HashSet<String>>>,
}

impl InFlightSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `session_id` as processing. Returns `None` if it already is.
    pub fn begin(&self, session_id: impl Into<String>) -> Option<SubmissionGuard> {
        let session_id = session_id.into();
        let mut active = self.active.lock().ok()?;
        if !active.insert(session_id.clone()) {
            debug!("Session {session_id} already has a submission in flight");
            return None;
        }
        Some(SubmissionGuard {
            sessions: self.clone(),
            session_id,
        })
    }

    #[allow(dead_code)]
    pub fn is_processing(&self, session_id: &str) -> bool {
        self.active
            .lock()
            .map(|active| active.contains(session_id))
            .unwrap_or(false)
    }
}

/// Clears the session's processing flag on drop.
#[derive(Debug)]
pub struct SubmissionGuard {
    sessions: InFlightSessions,
    session_id: String,
}

impl SubmissionGuard {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        if let Ok(mut active) = self.sessions.active.lock() {
            active.remove(&self.session_id);
        }
    }
}
