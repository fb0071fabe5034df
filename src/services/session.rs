use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::availability::AvailabilityWindow;
use crate::services::booking::BookingSubmitter;
use crate::services::clock::Clock;
use crate::services::flow::BookingFlowController;

/// One live widget instance: its flow state machine, its submitter, and
/// the provider it is booking against.
pub struct WidgetSession {
    pub provider_id: String,
    pub controller: BookingFlowController,
    pub submitter: Arc<BookingSubmitter>,
    /// Gates the availability refresh: one fetch in flight per session.
    pub loading: bool,
}

/// In-memory store of widget sessions keyed by an opaque token.
///
/// The mutex is only ever held for synchronous state mutation; network
/// calls happen between lock acquisitions, with the per-session
/// `loading`/`submitting` flags carrying the single-flight discipline
/// across the await.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, WidgetSession>>,
    clock: Arc<dyn Clock>,
    slot_minutes: u32,
}

impl SessionStore {
    pub fn new(clock: Arc<dyn Clock>, slot_minutes: u32) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            clock,
            slot_minutes,
        }
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Create a session around a freshly fetched window set and return
    /// its token. The window set is held read-only for the session's
    /// lifetime unless explicitly refreshed.
    pub fn create(
        &self,
        provider_id: &str,
        windows: Vec<AvailabilityWindow>,
        submitter: Arc<BookingSubmitter>,
    ) -> String {
        let token = Uuid::new_v4().to_string();
        let controller =
            BookingFlowController::new(windows, self.slot_minutes, Arc::clone(&self.clock));

        let session = WidgetSession {
            provider_id: provider_id.to_string(),
            controller,
            submitter,
            loading: false,
        };

        let mut sessions = self.sessions.lock().unwrap();
        sessions.insert(token.clone(), session);
        info!(
            "Created widget session {} for provider {} ({} total)",
            token,
            provider_id,
            sessions.len()
        );
        token
    }

    /// Run a closure against one session under the lock. Returns `None`
    /// for unknown tokens.
    pub fn with_session<R>(
        &self,
        token: &str,
        f: impl FnOnce(&mut WidgetSession) -> R,
    ) -> Option<R> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(token) {
            Some(session) => Some(f(session)),
            None => {
                debug!("Unknown widget session token: {}", token);
                None
            }
        }
    }

    pub fn remove(&self, token: &str) -> bool {
        let mut sessions = self.sessions.lock().unwrap();
        let removed = sessions.remove(token).is_some();
        if removed {
            info!("Removed widget session {}", token);
        } else {
            warn!("Attempted to remove unknown session {}", token);
        }
        removed
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}
