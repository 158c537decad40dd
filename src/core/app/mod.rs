use ratatui::text::Line;

use crate::core::config::SessionSettings;
use crate::core::message_log::MessageLog;
#[cfg(any(test, feature = "bench"))]
use crate::ui::theme::Theme;

pub mod actions;
pub mod conversation;
pub mod input;
pub mod session;
pub mod ui_state;

pub use actions::{
    apply_action, apply_actions, AppAction, AppActionContext, AppActionDispatcher,
    AppActionEnvelope, AppCommand,
};
pub use conversation::ConversationController;
pub use input::InputController;
pub use session::{SessionContext, SessionState};
pub use ui_state::UiState;

/// The whole client state. Owned by the event loop and only ever touched
/// from it.
pub struct App {
    pub session: SessionContext,
    pub log: MessageLog,
    pub ui: UiState,
}

impl App {
    pub fn new(settings: &SessionSettings) -> Self {
        Self {
            session: SessionContext::from_settings(settings),
            log: MessageLog::new(),
            ui: UiState::from_settings(settings),
        }
    }

    pub fn conversation(&mut self) -> ConversationController<'_> {
        ConversationController::new(&mut self.session, &mut self.log, &mut self.ui)
    }

    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn is_current_stream(&self, stream_id: u64) -> bool {
        self.session.is_current_stream(stream_id)
    }

    pub fn request_exit(&mut self) {
        self.ui.exit_requested = true;
    }

    pub fn clear_input(&mut self) {
        self.ui.input.clear();
    }

    pub fn insert_into_input(&mut self, text: &str) {
        self.ui.input.insert_str(text);
    }

    /// Indicator frame to draw, if the reply has not started yet.
    pub fn working_indicator_frame(&self) -> Option<usize> {
        matches!(self.session.state(), SessionState::AwaitingFirstToken)
            .then_some(self.ui.indicator_frame)
    }

    /// Transcript rows for `width`, re-rendered only when something they
    /// depend on changed.
    pub fn transcript_lines(&mut self, width: u16) -> &[Line<'static>] {
        let frame = self.working_indicator_frame();
        self.ui.transcript_cache.lines(
            &self.log,
            width,
            &self.ui.theme,
            self.ui.markdown_enabled,
            frame,
        )
    }

    #[cfg(any(test, feature = "bench"))]
    pub fn new_test_app(theme: Theme, markdown_enabled: bool) -> Self {
        use crate::core::app::input::InputController;
        use crate::core::constants::{DEFAULT_INPUT_CHAR_LIMIT, MAX_INPUT_ROWS};

        let input = InputController::new(DEFAULT_INPUT_CHAR_LIMIT, MAX_INPUT_ROWS, &theme);
        Self {
            session: SessionContext::new("test-model", "test preamble"),
            log: MessageLog::new(),
            ui: UiState::new_basic(theme, markdown_enabled, input),
        }
    }

    #[cfg(feature = "bench")]
    pub fn new_bench(theme: Theme, markdown_enabled: bool) -> Self {
        Self::new_test_app(theme, markdown_enabled)
    }
}
