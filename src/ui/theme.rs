use ratatui::style::{Color, Modifier, Style};

use crate::core::message::Role;

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,
    // Role labels and the column they are indented by
    pub user_label: &'static str,
    pub assistant_label: &'static str,
    pub system_label: &'static str,
    pub label_width: u16,
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_prefix_style: Style,
    pub assistant_text_style: Style,
    pub system_text_style: Style,
    pub error_text_style: Style,

    // Markdown
    pub md_heading_style: Style,
    pub md_code_style: Style,
    pub md_quote_style: Style,
    pub md_link_style: Style,
    pub md_rule_style: Style,

    // Chrome
    pub title_style: Style,
    pub streaming_indicator_style: Style,
    pub status_style: Style,
    pub help_style: Style,
    pub input_border_style: Style,

    // Input area
    pub input_text_style: Style,
    pub input_placeholder_style: Style,
    pub input_cursor_style: Style,
    pub input_cursor_line_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            background_color: Color::Reset,
            user_label: "You:",
            assistant_label: "AI:",
            system_label: "System:",
            label_width: 6,
            user_prefix_style: Style::default()
                .fg(Color::Indexed(5))
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default(),
            assistant_prefix_style: Style::default()
                .fg(Color::Indexed(2))
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::White),
            system_text_style: Style::default().fg(Color::DarkGray),
            error_text_style: Style::default().fg(Color::LightRed),

            md_heading_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            md_code_style: Style::default().fg(Color::Yellow),
            md_quote_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            md_link_style: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::UNDERLINED),
            md_rule_style: Style::default().fg(Color::DarkGray),

            title_style: Style::default().fg(Color::Gray),
            streaming_indicator_style: Style::default().fg(Color::Indexed(2)),
            status_style: Style::default().fg(Color::LightRed),
            help_style: Style::default().fg(Color::Indexed(241)),
            input_border_style: Style::default().fg(Color::Indexed(5)),

            input_text_style: Style::default().fg(Color::White),
            input_placeholder_style: Style::default().fg(Color::DarkGray),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            input_cursor_line_style: Style::default(),
        }
    }

    pub fn light() -> Self {
        Theme {
            background_color: Color::Reset,
            user_label: "You:",
            assistant_label: "AI:",
            system_label: "System:",
            label_width: 6,
            user_prefix_style: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Black),
            assistant_prefix_style: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::Black),
            system_text_style: Style::default().fg(Color::Gray),
            error_text_style: Style::default().fg(Color::Red),

            md_heading_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            md_code_style: Style::default().fg(Color::Magenta),
            md_quote_style: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            md_link_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            md_rule_style: Style::default().fg(Color::Gray),

            title_style: Style::default().fg(Color::DarkGray),
            streaming_indicator_style: Style::default().fg(Color::Green),
            status_style: Style::default().fg(Color::Red),
            help_style: Style::default().fg(Color::Gray),
            input_border_style: Style::default().fg(Color::Magenta),

            input_text_style: Style::default().fg(Color::Black),
            input_placeholder_style: Style::default().fg(Color::Gray),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            input_cursor_line_style: Style::default(),
        }
    }

    /// Unknown names fall back to the dark theme.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark_default(),
        }
    }

    pub fn label(&self, role: Role) -> &'static str {
        match role {
            Role::User => self.user_label,
            Role::Assistant => self.assistant_label,
            Role::System => self.system_label,
        }
    }

    pub fn prefix_style(&self, role: Role) -> Style {
        match role {
            Role::User => self.user_prefix_style,
            Role::Assistant => self.assistant_prefix_style,
            Role::System => self.system_text_style,
        }
    }

    pub fn text_style(&self, role: Role) -> Style {
        match role {
            Role::User => self.user_text_style,
            Role::Assistant => self.assistant_text_style,
            Role::System => self.system_text_style,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_is_case_insensitive_with_dark_fallback() {
        assert_eq!(Theme::from_name("LIGHT"), Theme::light());
        assert_eq!(Theme::from_name("dark"), Theme::dark_default());
        assert_eq!(Theme::from_name("solarized"), Theme::dark_default());
    }

    #[test]
    fn roles_get_distinct_prefix_colors() {
        let theme = Theme::dark_default();
        assert_ne!(
            theme.prefix_style(Role::User).fg,
            theme.prefix_style(Role::Assistant).fg
        );
    }
}
