use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_textarea::{Input as TAInput, Key, TextArea};

use crate::core::constants::{DEFAULT_INPUT_CHAR_LIMIT, MAX_INPUT_ROWS};
use crate::ui::theme::Theme;

pub const INPUT_PLACEHOLDER: &str = "Type your message here...";

/// Owns the draft being composed. The draft is only ever cleared by an
/// accepted submission or an explicit clear.
pub struct InputController {
    textarea: TextArea<'static>,
    char_limit: usize,
    max_rows: u16,
}

impl InputController {
    pub fn new(char_limit: usize, max_rows: u16, theme: &Theme) -> Self {
        let mut controller = Self {
            textarea: TextArea::default(),
            char_limit,
            max_rows: max_rows.max(1),
        };
        controller.configure(theme);
        controller
    }

    pub fn configure(&mut self, theme: &Theme) {
        self.textarea.set_placeholder_text(INPUT_PLACEHOLDER);
        self.textarea
            .set_placeholder_style(theme.input_placeholder_style);
        self.textarea
            .set_style(theme.input_text_style.bg(theme.background_color));
        self.textarea.set_cursor_style(theme.input_cursor_style);
        self.textarea
            .set_cursor_line_style(theme.input_cursor_line_style);
    }

    pub fn value(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.textarea.lines().iter().all(|line| line.is_empty())
    }

    pub fn char_count(&self) -> usize {
        let lines = self.textarea.lines();
        let chars: usize = lines.iter().map(|line| line.chars().count()).sum();
        chars + lines.len().saturating_sub(1)
    }

    pub fn char_limit(&self) -> usize {
        self.char_limit
    }

    fn remaining(&self) -> usize {
        self.char_limit.saturating_sub(self.char_count())
    }

    pub fn clear(&mut self) {
        if self.is_empty() && self.textarea.lines().len() == 1 {
            return;
        }
        self.textarea.select_all();
        self.textarea.cut();
    }

    /// Insert text at the cursor, truncated to the remaining capacity.
    /// Returns whether anything was inserted.
    pub fn insert_str(&mut self, text: &str) -> bool {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let allowed: String = normalized.chars().take(self.remaining()).collect();
        if allowed.is_empty() {
            return false;
        }
        self.textarea.insert_str(allowed)
    }

    pub fn insert_newline(&mut self) -> bool {
        if self.remaining() == 0 {
            return false;
        }
        self.textarea.insert_newline();
        true
    }

    /// Feed an editing key to the textarea. Keys that would grow the draft
    /// past the character limit are dropped.
    pub fn apply_key(&mut self, key: KeyEvent) -> bool {
        let input = TAInput::from(key);
        let grows = matches!(input.key, Key::Char(_) | Key::Tab | Key::Enter)
            && !input.ctrl
            && !input.alt;
        if grows && self.remaining() == 0 {
            return false;
        }
        self.textarea.input(input)
    }

    /// Rows the input area needs, between one and the configured maximum.
    pub fn visible_rows(&self) -> u16 {
        let rows = u16::try_from(self.textarea.lines().len()).unwrap_or(u16::MAX);
        rows.clamp(1, self.max_rows)
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }
}

impl Default for InputController {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_CHAR_LIMIT, MAX_INPUT_ROWS, &Theme::default())
    }
}

/// Whether a key event only edits the draft (as opposed to a command).
pub fn is_editing_key(key: &KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(
            key.code,
            KeyCode::Char('a' | 'e' | 'h' | 'k' | 'u' | 'w') | KeyCode::Left | KeyCode::Right
        );
    }
    matches!(
        key.code,
        KeyCode::Char(_)
            | KeyCode::Backspace
            | KeyCode::Delete
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Up
            | KeyCode::Down
            | KeyCode::Home
            | KeyCode::End
            | KeyCode::Tab
    )
}
