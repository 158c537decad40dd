use std::{error::Error, time::Duration};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use ratatui::prelude::Size;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::keybindings::{route_key, KeyResult};
use super::lifecycle::{restore_terminal, setup_terminal, ChatTerminal};
use crate::core::app::{
    apply_actions, App, AppAction, AppActionContext, AppActionDispatcher, AppActionEnvelope,
    AppCommand,
};
use crate::core::chat_stream::{
    ChannelSettings, HttpChannel, ResponseChannel, StreamMessage, StreamReceiver,
};
use crate::core::config::SessionSettings;
use crate::ui::renderer::ui;

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        continue;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

pub(crate) fn sanitize_pasted_text(text: &str) -> String {
    let without_crlf = text.replace("\r\n", "\n");
    let without_cr = without_crlf.replace('\r', "\n");
    let expanded_tabs = without_cr.replace('\t', "    ");
    expanded_tabs
        .chars()
        .filter(|&c| c == '\n' || !c.is_control())
        .collect()
}

/// Routes one terminal event. Returns whether the screen needs a redraw.
fn handle_ui_event(
    app: &mut App,
    event: UiEvent,
    dispatcher: &AppActionDispatcher,
    ctx: AppActionContext,
) -> bool {
    let UiEvent::Crossterm(event) = event;
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => match route_key(app, &key) {
            KeyResult::Dispatch(action) => {
                dispatcher.dispatch(action, ctx);
                true
            }
            KeyResult::Handled => true,
            KeyResult::NotHandled => false,
        },
        Event::Paste(text) => {
            let sanitized_text = sanitize_pasted_text(&text);
            if sanitized_text.is_empty() {
                return false;
            }
            dispatcher.dispatch(
                AppAction::InsertIntoInput {
                    text: sanitized_text,
                },
                ctx,
            );
            true
        }
        Event::Resize(width, height) => {
            app.ui.last_term_size = Size { width, height };
            true
        }
        _ => false,
    }
}

/// Folds a burst of stream events into reducer actions.
///
/// Consecutive chunks of the current stream are joined into one append so a
/// fast producer costs one transcript update per loop turn. Events from any
/// other stream are dropped.
fn coalesce_stream_updates(
    updates: impl IntoIterator<Item = (StreamMessage, u64)>,
    current_stream_id: u64,
) -> Vec<AppAction> {
    let mut coalesced_chunks = String::new();
    let mut followup_actions = Vec::new();

    for (message, msg_stream_id) in updates {
        if msg_stream_id != current_stream_id {
            debug!(msg_stream_id, current_stream_id, "discarding stale stream event");
            continue;
        }

        match message {
            StreamMessage::Chunk(content) => {
                if followup_actions.is_empty() {
                    coalesced_chunks.push_str(&content);
                } else {
                    followup_actions.push(AppAction::AppendResponseChunk {
                        content,
                        stream_id: msg_stream_id,
                    });
                }
            }
            StreamMessage::Error(error) => followup_actions.push(AppAction::StreamErrored {
                error,
                stream_id: msg_stream_id,
            }),
            StreamMessage::End => followup_actions.push(AppAction::StreamCompleted {
                stream_id: msg_stream_id,
            }),
        }
    }

    let mut actions = Vec::with_capacity(1 + followup_actions.len());
    if !coalesced_chunks.is_empty() {
        actions.push(AppAction::AppendResponseChunk {
            content: coalesced_chunks,
            stream_id: current_stream_id,
        });
    }
    actions.extend(followup_actions);
    actions
}

/// Drains everything waiting on the stream channel, starting with `first`.
fn process_stream_updates(
    dispatcher: &AppActionDispatcher,
    first: (StreamMessage, u64),
    rx: &mut StreamReceiver,
    current_stream_id: u64,
    ctx: AppActionContext,
) -> bool {
    let pending = std::iter::once(first).chain(std::iter::from_fn(|| rx.try_recv().ok()));
    let actions = coalesce_stream_updates(pending, current_stream_id);
    if actions.is_empty() {
        return false;
    }
    dispatcher.dispatch_many(actions, ctx);
    true
}

/// Applies queued actions and runs the commands they produce. Returns whether
/// anything visible changed.
fn drain_action_queue(
    app: &mut App,
    channel: &dyn ResponseChannel,
    action_rx: &mut mpsc::UnboundedReceiver<AppActionEnvelope>,
) -> bool {
    let mut pending = Vec::new();
    while let Ok(envelope) = action_rx.try_recv() {
        pending.push(envelope);
    }

    if pending.is_empty() {
        return false;
    }

    let mut redraw = pending
        .iter()
        .any(|envelope| envelope.action != AppAction::Tick);

    let commands = apply_actions(app, pending);
    for cmd in commands {
        match cmd {
            AppCommand::SpawnStream(request) => {
                channel.open(request);
                redraw = true;
            }
            AppCommand::Redraw => redraw = true,
        }
    }
    redraw
}

fn action_context(size: Size) -> AppActionContext {
    AppActionContext {
        term_width: size.width,
        term_height: size.height,
    }
}

pub async fn run_chat(settings: SessionSettings) -> Result<(), Box<dyn Error>> {
    let client = reqwest::Client::builder()
        .timeout(settings.request_timeout)
        .build()?;
    let (stream_tx, stream_rx) = mpsc::unbounded_channel();
    let channel = HttpChannel::new(
        client,
        ChannelSettings {
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            stream: settings.stream,
        },
        stream_tx,
    );

    let mut app = App::new(&settings);
    info!(model = %settings.model, base_url = %settings.base_url, stream = settings.stream, "starting chat session");

    let mut terminal = setup_terminal()?;
    let (event_tx, event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    let result = main_loop(
        &mut terminal,
        &mut app,
        &channel,
        stream_rx,
        event_rx,
        settings.tick_interval,
    )
    .await;

    event_reader_handle.abort();
    if app.state().is_busy() {
        app.conversation().cancel();
    }
    restore_terminal(&mut terminal)?;
    info!("chat session closed");
    result
}

async fn main_loop(
    terminal: &mut ChatTerminal,
    app: &mut App,
    channel: &dyn ResponseChannel,
    mut stream_rx: StreamReceiver,
    mut event_rx: mpsc::UnboundedReceiver<UiEvent>,
    tick_interval: Duration,
) -> Result<(), Box<dyn Error>> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppActionEnvelope>();
    let dispatcher = AppActionDispatcher::new(action_tx);

    let mut tick = tokio::time::interval(tick_interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    app.ui.last_term_size = terminal.size()?;
    let mut request_redraw = true;

    loop {
        if app.ui.exit_requested {
            return Ok(());
        }

        if request_redraw {
            terminal.draw(|f| ui(f, app))?;
            request_redraw = false;
        }

        let ctx = action_context(app.ui.last_term_size);
        tokio::select! {
            Some(event) = event_rx.recv() => {
                request_redraw |= handle_ui_event(app, event, &dispatcher, ctx);
                while let Ok(event) = event_rx.try_recv() {
                    request_redraw |= handle_ui_event(app, event, &dispatcher, ctx);
                }
            }
            Some(update) = stream_rx.recv() => {
                let current_stream_id = app.session.current_stream_id;
                request_redraw |=
                    process_stream_updates(&dispatcher, update, &mut stream_rx, current_stream_id, ctx);
            }
            _ = tick.tick() => {
                dispatcher.dispatch(AppAction::Tick, ctx);
            }
        }

        request_redraw |= drain_action_queue(app, channel, &mut action_rx);
    }
}
