use std::time::Instant;

use ratatui::layout::Size;

use crate::core::app::input::InputController;
use crate::core::config::SessionSettings;
use crate::ui::theme::Theme;
use crate::ui::transcript::TranscriptCache;

/// View-side state: everything that affects what is drawn but not what is
/// sent.
pub struct UiState {
    pub input: InputController,
    pub theme: Theme,
    pub markdown_enabled: bool,
    pub scroll_offset: u16,
    /// Largest offset the last frame allowed; scrolling past it re-pins.
    pub max_scroll_offset: u16,
    pub auto_scroll: bool,
    pub is_streaming: bool,
    /// Working indicator frame, advanced by the tick while a reply is pending.
    pub indicator_frame: usize,
    pub pulse_start: Instant,
    pub transcript_cache: TranscriptCache,
    pub status: Option<String>,
    pub exit_requested: bool,
    pub last_term_size: Size,
}

impl UiState {
    pub(crate) fn new_basic(theme: Theme, markdown_enabled: bool, input: InputController) -> Self {
        Self {
            input,
            theme,
            markdown_enabled,
            scroll_offset: 0,
            max_scroll_offset: 0,
            auto_scroll: true,
            is_streaming: false,
            indicator_frame: 0,
            pulse_start: Instant::now(),
            transcript_cache: TranscriptCache::new(),
            status: None,
            exit_requested: false,
            last_term_size: Size::default(),
        }
    }

    pub(crate) fn from_settings(settings: &SessionSettings) -> Self {
        let theme = Theme::from_name(&settings.theme);
        let input = InputController::new(
            settings.input_char_limit,
            settings.max_input_rows,
            &theme,
        );
        Self::new_basic(theme, settings.markdown, input)
    }

    pub fn begin_streaming(&mut self) {
        self.is_streaming = true;
        self.indicator_frame = 0;
        self.pulse_start = Instant::now();
        self.auto_scroll = true;
    }

    pub fn end_streaming(&mut self) {
        self.is_streaming = false;
    }

    pub fn advance_indicator(&mut self) {
        self.indicator_frame = self.indicator_frame.wrapping_add(1);
    }

    pub fn set_status<S: Into<String>>(&mut self, status: S) {
        self.status = Some(status.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.auto_scroll = true;
        self.scroll_offset = self.max_scroll_offset;
    }

    pub fn scroll_to_top(&mut self) {
        self.auto_scroll = false;
        self.scroll_offset = 0;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.auto_scroll = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self
            .scroll_offset
            .saturating_add(lines)
            .min(self.max_scroll_offset);
        if self.scroll_offset >= self.max_scroll_offset {
            self.auto_scroll = true;
        }
    }

    /// Record the bounds of the latest frame and return the offset to draw at.
    pub fn settle_scroll(&mut self, total_lines: usize, viewport_height: u16) -> u16 {
        let total = u16::try_from(total_lines).unwrap_or(u16::MAX);
        self.max_scroll_offset = total.saturating_sub(viewport_height);
        self.scroll_offset = if self.auto_scroll {
            self.max_scroll_offset
        } else {
            self.scroll_offset.min(self.max_scroll_offset)
        };
        self.scroll_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ui() -> UiState {
        UiState::new_basic(Theme::default(), true, InputController::default())
    }

    #[test]
    fn settle_scroll_pins_to_bottom_when_following() {
        let mut ui = ui();
        assert_eq!(ui.settle_scroll(50, 20), 30);
        assert_eq!(ui.settle_scroll(55, 20), 35);
        assert_eq!(ui.settle_scroll(5, 20), 0);
    }

    #[test]
    fn scrolling_up_stops_following_until_bottom_reached() {
        let mut ui = ui();
        ui.settle_scroll(50, 20);
        ui.scroll_up(10);
        assert!(!ui.auto_scroll);
        assert_eq!(ui.settle_scroll(60, 20), 20);

        ui.scroll_down(100);
        assert!(ui.auto_scroll);
        assert_eq!(ui.scroll_offset, 40);
    }

    #[test]
    fn top_and_bottom_jumps() {
        let mut ui = ui();
        ui.settle_scroll(50, 20);
        ui.scroll_to_top();
        assert_eq!(ui.settle_scroll(50, 20), 0);
        ui.scroll_to_bottom();
        assert_eq!(ui.settle_scroll(50, 20), 30);
    }

    #[test]
    fn begin_streaming_resets_indicator_and_follows() {
        let mut ui = ui();
        ui.advance_indicator();
        ui.auto_scroll = false;
        ui.begin_streaming();
        assert_eq!(ui.indicator_frame, 0);
        assert!(ui.auto_scroll);
        assert!(ui.is_streaming);
        ui.end_streaming();
        assert!(!ui.is_streaming);
    }
}
