use tracing::debug;

use super::{App, AppAction, AppActionContext, AppCommand};
use crate::core::error::ChatError;

pub(super) fn handle_streaming_action(
    app: &mut App,
    action: AppAction,
    _ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::SubmitMessage { message } => spawn_stream_for_message(app, message),
        AppAction::AppendResponseChunk { content, stream_id } => {
            if !app.is_current_stream(stream_id) {
                debug!(stream_id, "dropping chunk from stale stream");
                return None;
            }
            app.conversation().append_chunk(&content);
            None
        }
        AppAction::StreamErrored { error, stream_id } => {
            if !app.is_current_stream(stream_id) {
                return None;
            }
            app.conversation().fail(error);
            None
        }
        AppAction::StreamCompleted { stream_id } => {
            if !app.is_current_stream(stream_id) {
                return None;
            }
            app.conversation().complete();
            None
        }
        AppAction::CancelStreaming => {
            app.conversation().cancel();
            None
        }
        AppAction::Tick => {
            if !app.state().is_busy() {
                return None;
            }
            app.ui.advance_indicator();
            Some(AppCommand::Redraw)
        }
        _ => unreachable!("non-streaming action routed to streaming handler"),
    }
}

fn spawn_stream_for_message(app: &mut App, message: String) -> Option<AppCommand> {
    match app.conversation().submit(&message) {
        Ok(request) => Some(AppCommand::SpawnStream(request)),
        Err(ChatError::InputRejected(reason)) => {
            debug!(?reason, "submission rejected");
            None
        }
        Err(error) => {
            app.ui.set_status(format!("Error: {}", error.reason()));
            None
        }
    }
}
