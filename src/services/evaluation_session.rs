use std::sync::{Arc, RwLock};

use tracing::debug;
use uuid::Uuid;

use crate::models::session::{EvaluationRecord, SessionPhase, SessionStatusDto};

/// Handed out by [`EvaluationSession::begin`]; only the most recent ticket
/// may resolve the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
    request_id: Uuid,
}

impl RequestTicket {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}

#[derive(Debug)]
struct SessionState {
    generation: u64,
    phase: SessionPhase,
    pending: Option<Uuid>,
    record: Option<Arc<EvaluationRecord>>,
    error: Option<String>,
}

/// Transient view state for the results panel: the latest resolved snapshot
/// or the reason there is none.
#[derive(Debug)]
pub struct EvaluationSession {
    state: RwLock<SessionState>,
}

impl Default for EvaluationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationSession {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SessionState {
                generation: 0,
                phase: SessionPhase::Idle,
                pending: None,
                record: None,
                error: None,
            }),
        }
    }

    /// Starts a new request. The previous snapshot is discarded and any
    /// ticket issued earlier becomes stale.
    pub fn begin(&self) -> RequestTicket {
        let mut state = self.state.write().expect("session lock poisoned");
        state.generation += 1;
        state.phase = SessionPhase::Loading;
        state.record = None;
        state.error = None;

        let ticket = RequestTicket {
            generation: state.generation,
            request_id: Uuid::new_v4(),
        };
        state.pending = Some(ticket.request_id);

        debug!(
            target: "app::session",
            generation = ticket.generation,
            request_id = %ticket.request_id,
            "evaluation request started"
        );
        ticket
    }

    /// Publishes `record` if `ticket` is still current. Returns `false` when
    /// the response arrived for a superseded request.
    pub fn complete(&self, ticket: &RequestTicket, record: EvaluationRecord) -> bool {
        let mut state = self.state.write().expect("session lock poisoned");
        if state.generation != ticket.generation {
            debug!(
                target: "app::session",
                stale_generation = ticket.generation,
                current_generation = state.generation,
                request_id = %ticket.request_id,
                "discarding stale evaluation response"
            );
            return false;
        }

        state.phase = SessionPhase::Ready;
        state.pending = None;
        state.record = Some(Arc::new(record));
        state.error = None;
        true
    }

    pub fn fail(&self, ticket: &RequestTicket, message: impl Into<String>) -> bool {
        let mut state = self.state.write().expect("session lock poisoned");
        if state.generation != ticket.generation {
            debug!(
                target: "app::session",
                stale_generation = ticket.generation,
                current_generation = state.generation,
                request_id = %ticket.request_id,
                "discarding stale evaluation failure"
            );
            return false;
        }

        state.phase = SessionPhase::Failed;
        state.pending = None;
        state.record = None;
        state.error = Some(message.into());
        true
    }

    /// Clears the results panel and invalidates any in-flight request.
    pub fn reset(&self) {
        let mut state = self.state.write().expect("session lock poisoned");
        state.generation += 1;
        state.phase = SessionPhase::Idle;
        state.pending = None;
        state.record = None;
        state.error = None;
        debug!(target: "app::session", generation = state.generation, "session reset");
    }

    pub fn current(&self) -> Option<Arc<EvaluationRecord>> {
        let state = self.state.read().expect("session lock poisoned");
        state.record.as_ref().map(Arc::clone)
    }

    pub fn status(&self) -> SessionStatusDto {
        let state = self.state.read().expect("session lock poisoned");
        SessionStatusDto {
            phase: state.phase,
            has_result: state.record.is_some(),
            pending_request_id: state.pending.map(|id| id.to_string()),
            error: state.error.clone(),
        }
    }
}
