use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::config::SessionSettings;
use crate::core::error::ChatError;

/// Where the single active exchange stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// Request sent, nothing received yet.
    AwaitingFirstToken,
    /// At least one increment has been applied.
    Streaming,
    /// The exchange failed; held only long enough to surface the reason.
    Error(String),
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    /// A request is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SessionState::AwaitingFirstToken | SessionState::Streaming
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingFirstToken => "awaiting",
            SessionState::Streaming => "streaming",
            SessionState::Error(_) => "error",
        }
    }

    fn allows(&self, next: &SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, AwaitingFirstToken)
                | (AwaitingFirstToken, Streaming)
                | (AwaitingFirstToken | Streaming, Idle)
                | (AwaitingFirstToken | Streaming, Error(_))
                | (Error(_), Idle)
        )
    }
}

pub struct SessionContext {
    state: SessionState,
    pub model: String,
    pub system_prompt: String,
    pub stream_cancel_token: Option<CancellationToken>,
    pub current_stream_id: u64,
    pub last_error: Option<ChatError>,
}

impl SessionContext {
    pub fn new(model: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            state: SessionState::Idle,
            model: model.into(),
            system_prompt: system_prompt.into(),
            stream_cancel_token: None,
            current_stream_id: 0,
            last_error: None,
        }
    }

    pub fn from_settings(settings: &SessionSettings) -> Self {
        Self::new(settings.model.clone(), settings.system_prompt.clone())
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Move to `next` if the state machine allows it. Returns whether the
    /// transition happened.
    pub fn transition(&mut self, next: SessionState) -> bool {
        if self.state == next {
            return true;
        }
        if !self.state.allows(&next) {
            warn!(
                from = self.state.label(),
                to = next.label(),
                "ignoring invalid session transition"
            );
            return false;
        }
        debug!(
            stream_id = self.current_stream_id,
            from = self.state.label(),
            to = next.label(),
            "session transition"
        );
        self.state = next;
        true
    }

    /// Start a new exchange: allocate its stream id and cancellation token.
    pub fn begin_request(&mut self) -> (u64, CancellationToken) {
        if let Some(stale) = self.stream_cancel_token.take() {
            stale.cancel();
        }
        self.current_stream_id = self.current_stream_id.wrapping_add(1);
        let token = CancellationToken::new();
        self.stream_cancel_token = Some(token.clone());
        (self.current_stream_id, token)
    }

    /// Cancel the running exchange. Its id is retired so any events still in
    /// flight are dropped.
    pub fn cancel_stream(&mut self) {
        if let Some(token) = self.stream_cancel_token.take() {
            token.cancel();
        }
        self.current_stream_id = self.current_stream_id.wrapping_add(1);
    }

    pub fn finish_stream(&mut self) {
        self.stream_cancel_token = None;
    }

    /// Events tagged with `stream_id` still belong to the running exchange.
    pub fn is_current_stream(&self, stream_id: u64) -> bool {
        self.state.is_busy() && stream_id == self.current_stream_id
    }
}
