//! Transcript rendering: the message log as labelled, wrapped rows.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::core::message::{ChatMessage, Role};
use crate::core::message_log::MessageLog;
use crate::ui::markdown::{render_markdown, render_plain};
use crate::ui::theme::Theme;

/// Frames of the working indicator shown while a reply has not started.
pub const WORKING_FRAMES: [&str; 4] = ["Thinking", "Thinking.", "Thinking..", "Thinking..."];

pub fn working_frame(frame: usize) -> &'static str {
    WORKING_FRAMES[frame % WORKING_FRAMES.len()]
}

/// Render every message as a label row followed by its body, indented by the
/// theme's label width and wrapped to the remaining columns.
///
/// `pending` replaces the body of a trailing, empty assistant reply so a
/// reply in progress never shows as blank. Output depends only on the
/// arguments.
pub fn render_transcript(
    messages: &[ChatMessage],
    width: u16,
    theme: &Theme,
    markdown: bool,
    pending: Option<&str>,
) -> Vec<Line<'static>> {
    let label_width = usize::from(theme.label_width);
    let body_width = usize::from(width).saturating_sub(label_width).max(1);
    let indent = " ".repeat(label_width);
    let mut lines = Vec::new();

    for (index, message) in messages.iter().enumerate() {
        if index > 0 {
            lines.push(Line::default());
        }

        let mut label = vec![Span::styled(
            theme.label(message.role),
            theme.prefix_style(message.role),
        )];
        if message.failed {
            label.push(Span::styled(" (failed)", theme.error_text_style));
        }
        lines.push(Line::from(label));

        let is_pending_slot = index + 1 == messages.len()
            && message.is_assistant()
            && !message.failed
            && message.content.is_empty();

        let body = match pending {
            Some(indicator) if is_pending_slot => vec![Line::from(Span::styled(
                indicator.to_string(),
                theme.streaming_indicator_style,
            ))],
            _ => render_body(message, body_width, theme, markdown),
        };

        for row in body {
            let mut spans = Vec::with_capacity(row.spans.len() + 1);
            spans.push(Span::raw(indent.clone()));
            spans.extend(row.spans);
            lines.push(Line::from(spans));
        }
    }

    lines
}

fn render_body(message: &ChatMessage, width: usize, theme: &Theme, markdown: bool) -> Vec<Line<'static>> {
    let style = body_style(message, theme);
    // System notes are ours, never markdown from the model.
    if markdown && message.role != Role::System {
        render_markdown(&message.content, style, theme, width)
    } else {
        render_plain(&message.content, style, width)
    }
}

fn body_style(message: &ChatMessage, theme: &Theme) -> Style {
    if message.failed {
        theme.error_text_style
    } else {
        theme.text_style(message.role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    revision: u64,
    width: u16,
    frame: Option<usize>,
    markdown: bool,
}

/// Rendered transcript kept until the log, width, indicator frame or
/// markdown flag changes.
#[derive(Debug, Default)]
pub struct TranscriptCache {
    key: Option<CacheKey>,
    lines: Vec<Line<'static>>,
}

impl TranscriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `frame` is the working indicator frame, or `None` when no indicator
    /// should be shown.
    pub fn lines(
        &mut self,
        log: &MessageLog,
        width: u16,
        theme: &Theme,
        markdown: bool,
        frame: Option<usize>,
    ) -> &[Line<'static>] {
        let key = CacheKey {
            revision: log.revision(),
            width,
            frame,
            markdown,
        };
        if self.key != Some(key) {
            self.lines = render_transcript(
                log.messages(),
                width,
                theme,
                markdown,
                frame.map(working_frame),
            );
            self.key = Some(key);
        }
        &self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[Line<'static>]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    fn exchange() -> Vec<ChatMessage> {
        vec![
            ChatMessage::user("hi there"),
            ChatMessage::assistant("Hello! How can I **help**?"),
        ]
    }

    #[test]
    fn labels_lead_and_bodies_are_indented() {
        let theme = Theme::dark_default();
        let lines = render_transcript(&exchange(), 40, &theme, true, None);
        assert_eq!(
            texts(&lines),
            vec!["You:", "      hi there", "", "AI:", "      Hello! How can I help?"]
        );
        assert_eq!(lines[0].spans[0].style, theme.user_prefix_style);
        assert_eq!(lines[3].spans[0].style, theme.assistant_prefix_style);
    }

    #[test]
    fn rendering_is_idempotent() {
        let theme = Theme::dark_default();
        let messages = exchange();
        for width in [10u16, 33, 80] {
            let first = render_transcript(&messages, width, &theme, true, None);
            let second = render_transcript(&messages, width, &theme, true, None);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn bodies_fit_the_viewport() {
        let theme = Theme::dark_default();
        let messages = vec![ChatMessage::assistant(
            "a fairly long reply that certainly has to wrap over several rows",
        )];
        for line in render_transcript(&messages, 24, &theme, true, None) {
            assert!(line.width() <= 24);
        }
    }

    #[test]
    fn empty_content_renders_only_the_label() {
        let theme = Theme::dark_default();
        let messages = vec![ChatMessage::user("q"), ChatMessage::placeholder()];
        let lines = render_transcript(&messages, 40, &theme, true, None);
        assert_eq!(texts(&lines), vec!["You:", "      q", "", "AI:"]);
    }

    #[test]
    fn pending_indicator_fills_empty_reply_slot() {
        let theme = Theme::dark_default();
        let messages = vec![ChatMessage::user("q"), ChatMessage::placeholder()];
        let lines = render_transcript(&messages, 40, &theme, true, Some("Thinking.."));
        assert_eq!(texts(&lines).last().map(String::as_str), Some("      Thinking.."));

        // Only the trailing empty reply is replaced.
        let done = exchange();
        let lines = render_transcript(&done, 40, &theme, true, Some("Thinking.."));
        assert!(!texts(&lines).iter().any(|l| l.contains("Thinking")));
    }

    #[test]
    fn failed_replies_are_marked() {
        let theme = Theme::dark_default();
        let mut failed = ChatMessage::assistant("partial");
        failed.failed = true;
        let lines = render_transcript(&[failed], 40, &theme, true, Some("Thinking"));
        assert_eq!(texts(&lines), vec!["AI: (failed)", "      partial"]);
        assert_eq!(lines[0].spans[1].style, theme.error_text_style);
        assert!(lines[1]
            .spans
            .iter()
            .any(|span| span.content == "partial" && span.style == theme.error_text_style));
    }

    #[test]
    fn plain_mode_shows_raw_markdown() {
        let theme = Theme::dark_default();
        let lines = render_transcript(&exchange(), 40, &theme, false, None);
        assert_eq!(texts(&lines)[4], "      Hello! How can I **help**?");
    }

    #[test]
    fn cache_rerenders_only_when_key_changes() {
        let theme = Theme::dark_default();
        let mut log = MessageLog::new();
        log.append(ChatMessage::user("hi"));
        log.append(ChatMessage::placeholder());
        log.begin_streaming_slot().expect("slot");

        let mut cache = TranscriptCache::new();
        let first = cache.lines(&log, 40, &theme, true, Some(0)).to_vec();
        assert_eq!(cache.lines(&log, 40, &theme, true, Some(0)), first.as_slice());

        let next_frame = cache.lines(&log, 40, &theme, true, Some(1)).to_vec();
        assert_ne!(next_frame, first);

        log.append_to_last("Hello").expect("append");
        let streamed = texts(cache.lines(&log, 40, &theme, true, None));
        assert_eq!(streamed.last().map(String::as_str), Some("      Hello"));
    }

    #[test]
    fn working_frames_cycle() {
        assert_eq!(working_frame(0), "Thinking");
        assert_eq!(working_frame(5), "Thinking.");
    }
}
