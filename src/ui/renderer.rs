use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::app::{App, SessionState};
use crate::core::constants::INDICATOR_SPACE;
use crate::ui::layout::ChatLayout;

pub const HELP_TEXT: &str =
    "Press Enter or Ctrl+S to send message · Alt+Enter for new line · Esc to cancel · Ctrl+C to quit";

pub fn ui(f: &mut Frame, app: &mut App) {
    let layout = ChatLayout::compute(f.area(), app.ui.input.visible_rows());
    let theme = app.ui.theme.clone();

    if theme.background_color != ratatui::style::Color::Reset {
        f.render_widget(
            Block::default().style(Style::default().bg(theme.background_color)),
            f.area(),
        );
    }

    f.render_widget(
        Paragraph::new(title_line(app)).style(theme.title_style),
        layout.title,
    );

    // Rows are pre-wrapped by the transcript renderer; only scroll here.
    let width = layout.transcript.width;
    let total_lines = app.transcript_lines(width).len();
    let scroll_offset = app.ui.settle_scroll(total_lines, layout.transcript.height);
    let lines = app.transcript_lines(width).to_vec();
    f.render_widget(
        Paragraph::new(lines).scroll((scroll_offset, 0)),
        layout.transcript,
    );

    let status = match &app.ui.status {
        Some(status) => Line::from(Span::styled(status.clone(), theme.status_style)),
        None => Line::from(Span::styled(HELP_TEXT, theme.help_style)),
    };
    f.render_widget(Paragraph::new(status), layout.status);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.input_border_style);
    let inner = input_block.inner(layout.input);
    f.render_widget(input_block, layout.input);

    let textarea_area = if app.ui.is_streaming {
        let indicator = Rect {
            x: inner.x + inner.width.saturating_sub(INDICATOR_SPACE),
            width: INDICATOR_SPACE.min(inner.width),
            height: 1.min(inner.height),
            ..inner
        };
        f.render_widget(
            Paragraph::new(format!(" {} ", pulse_symbol(app)))
                .style(theme.streaming_indicator_style),
            indicator,
        );
        Rect {
            width: inner.width.saturating_sub(INDICATOR_SPACE),
            ..inner
        }
    } else {
        inner
    };
    f.render_widget(app.ui.input.textarea(), textarea_area);
}

fn title_line(app: &App) -> Line<'static> {
    let mut title = format!(
        "Parlance v{} · {}",
        env!("CARGO_PKG_VERSION"),
        app.session.model
    );
    match app.state() {
        SessionState::AwaitingFirstToken => title.push_str(" · waiting for reply"),
        SessionState::Streaming => title.push_str(" · streaming"),
        SessionState::Idle | SessionState::Error(_) => {}
    }
    Line::from(title)
}

/// Three-step pulse cycling twice a second while a reply is in flight.
fn pulse_symbol(app: &App) -> &'static str {
    let elapsed = app.ui.pulse_start.elapsed().as_millis() as f32 / 1000.0;
    let pulse_phase = (elapsed * 2.0) % 2.0;
    let pulse_intensity = if pulse_phase < 1.0 {
        pulse_phase
    } else {
        2.0 - pulse_phase
    };

    if pulse_intensity < 0.33 {
        "○"
    } else if pulse_intensity < 0.66 {
        "◐"
    } else {
        "●"
    }
}
