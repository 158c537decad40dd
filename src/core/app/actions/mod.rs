mod input;
mod streaming;

use tokio::sync::mpsc;

use super::App;
use crate::core::chat_stream::ChannelRequest;
use crate::core::error::ChatError;

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    SubmitMessage { message: String },
    AppendResponseChunk { content: String, stream_id: u64 },
    StreamErrored { error: ChatError, stream_id: u64 },
    StreamCompleted { stream_id: u64 },
    CancelStreaming,
    Tick,
    InsertIntoInput { text: String },
    ClearInput,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    ScrollToTop,
    ScrollToBottom,
    Quit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AppActionContext {
    pub term_width: u16,
    pub term_height: u16,
}

pub struct AppActionEnvelope {
    pub action: AppAction,
    pub context: AppActionContext,
}

#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppActionEnvelope>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppActionEnvelope>) -> Self {
        Self { tx }
    }

    pub fn dispatch(&self, action: AppAction, ctx: AppActionContext) {
        self.dispatch_many([action], ctx);
    }

    pub fn dispatch_many<I>(&self, actions: I, ctx: AppActionContext)
    where
        I: IntoIterator<Item = AppAction>,
    {
        for action in actions.into_iter() {
            let _ = self.tx.send(AppActionEnvelope {
                action,
                context: ctx,
            });
        }
    }
}

/// Side effects requested by the reducer, carried out by the event loop.
#[derive(Debug)]
pub enum AppCommand {
    SpawnStream(ChannelRequest),
    Redraw,
}

pub fn apply_actions(
    app: &mut App,
    envelopes: impl IntoIterator<Item = AppActionEnvelope>,
) -> Vec<AppCommand> {
    let mut commands = Vec::new();
    for envelope in envelopes {
        if let Some(cmd) = apply_action(app, envelope.action, envelope.context) {
            commands.push(cmd);
        }
    }
    commands
}

pub fn apply_action(app: &mut App, action: AppAction, ctx: AppActionContext) -> Option<AppCommand> {
    match action {
        AppAction::SubmitMessage { .. }
        | AppAction::AppendResponseChunk { .. }
        | AppAction::StreamErrored { .. }
        | AppAction::StreamCompleted { .. }
        | AppAction::CancelStreaming
        | AppAction::Tick => streaming::handle_streaming_action(app, action, ctx),

        AppAction::InsertIntoInput { .. }
        | AppAction::ClearInput
        | AppAction::ScrollUp
        | AppAction::ScrollDown
        | AppAction::PageUp
        | AppAction::PageDown
        | AppAction::ScrollToTop
        | AppAction::ScrollToBottom
        | AppAction::Quit => input::handle_input_action(app, action, ctx),
    }
}
