//! Request-scoped context
//!
//! Every incoming query gets its own [`RequestContext`]. It carries the
//! identifiers that tie log lines together and is dropped once the response
//! has been returned; nothing in it outlives the request.

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Per-request identity and timing
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    session_id: Option<String>,
    received_at: DateTime<Utc>,
    started: Instant,
}

impl RequestContext {
    /// Create a context for a fresh request
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            session_id: None,
            received_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Attach the id of the conversation this request belongs to
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Wall-clock time the request arrived
    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Time spent on the request so far
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Tracing span covering the whole request
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "request",
            request_id = %self.request_id,
            session_id = self.session_id.as_deref().unwrap_or("-"),
        )
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
