use tracing::{debug, info, warn};

use super::{
    session::{SessionContext, SessionState},
    ui_state::UiState,
};
use crate::core::chat_stream::ChannelRequest;
use crate::core::error::{ChatError, RejectReason};
use crate::core::message::ChatMessage;
use crate::core::message_log::MessageLog;

/// Drives one exchange at a time through the session state machine,
/// keeping the log and the view in step.
pub struct ConversationController<'a> {
    session: &'a mut SessionContext,
    log: &'a mut MessageLog,
    ui: &'a mut UiState,
}

impl<'a> ConversationController<'a> {
    pub fn new(
        session: &'a mut SessionContext,
        log: &'a mut MessageLog,
        ui: &'a mut UiState,
    ) -> Self {
        Self { session, log, ui }
    }

    /// Accept `text` as the next user message and prepare the request for it.
    ///
    /// Rejected submissions leave the log, the state and the draft untouched.
    pub fn submit(&mut self, text: &str) -> Result<ChannelRequest, ChatError> {
        let prompt = text.trim();
        if prompt.is_empty() {
            return Err(ChatError::InputRejected(RejectReason::Empty));
        }
        if !self.session.state().is_idle() {
            return Err(ChatError::InputRejected(RejectReason::RequestInFlight));
        }

        // History excludes the message being sent; the channel appends it.
        let history = self.log.snapshot_for_request(&self.session.system_prompt);

        self.log.append(ChatMessage::user(prompt));
        self.log.append(ChatMessage::placeholder());
        self.log
            .begin_streaming_slot()
            .map_err(|err| ChatError::request_failed(err.to_string()))?;

        self.ui.input.clear();
        self.ui.clear_status();
        self.ui.begin_streaming();
        self.session.last_error = None;

        let (stream_id, cancel_token) = self.session.begin_request();
        self.session.transition(SessionState::AwaitingFirstToken);
        info!(stream_id, chars = prompt.len(), "submitted message");

        Ok(ChannelRequest {
            stream_id,
            history,
            prompt: prompt.to_string(),
            cancel_token,
        })
    }

    /// Apply one increment to the reply slot and keep the newest text in view.
    pub fn append_chunk(&mut self, content: &str) {
        if matches!(self.session.state(), SessionState::AwaitingFirstToken) {
            self.session.transition(SessionState::Streaming);
        }
        if let Err(err) = self.log.append_to_last(content) {
            warn!(%err, "dropping response chunk");
            return;
        }
        self.ui.scroll_to_bottom();
    }

    pub fn complete(&mut self) {
        if !self.session.state().is_busy() {
            return;
        }
        self.log.close_streaming_slot();
        self.session.finish_stream();
        self.session.transition(SessionState::Idle);
        self.ui.end_streaming();
        debug!(
            stream_id = self.session.current_stream_id,
            "response complete"
        );
    }

    /// Terminal failure: keep whatever arrived, mark it failed, surface the
    /// reason and return to idle.
    pub fn fail(&mut self, error: ChatError) {
        if !self.session.state().is_busy() {
            return;
        }
        let reason = error.reason().to_string();

        let slot_is_empty = self.log.last().is_some_and(|last| last.content.is_empty());
        if slot_is_empty {
            if let Err(err) = self.log.replace_last(reason.clone()) {
                warn!(%err, "could not record failure reason");
            }
        }
        self.log.mark_last_failed();
        self.session.finish_stream();

        self.session.transition(SessionState::Error(reason.clone()));
        self.ui.set_status(format!("Error: {reason}"));
        self.session.last_error = Some(error);
        self.session.transition(SessionState::Idle);

        self.ui.end_streaming();
        self.ui.scroll_to_bottom();
    }

    /// Abandon the running exchange. No further increments are applied.
    pub fn cancel(&mut self) -> bool {
        if !self.session.state().is_busy() {
            return false;
        }
        self.session.cancel_stream();
        if !self.log.remove_last_if_empty() {
            self.log.close_streaming_slot();
        }
        self.session.transition(SessionState::Idle);
        self.ui.end_streaming();
        self.ui.set_status("Response cancelled");
        info!("response cancelled");
        true
    }
}
