//! Markdown to styled terminal lines.
//!
//! Covers the subset chat replies actually use: paragraphs, headings,
//! emphasis, inline and block code, quotes, lists, links, rules and breaks.
//! Output rows are already wrapped to the requested width.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::ui::markdown_wrap::{hard_wrap, wrap_spans};
use crate::ui::theme::Theme;

const TAB_WIDTH: usize = 4;

#[derive(Clone, Copy, Debug)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

/// Render `content` as markdown wrapped to `width` columns.
pub fn render_markdown(content: &str, base: Style, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    let parser = Parser::new_ext(content, options);

    let mut renderer = MarkdownRenderer::new(theme, base, width);
    for event in parser {
        renderer.handle(event);
    }
    renderer.finish()
}

/// Render `content` verbatim, wrapping each source line independently.
pub fn render_plain(content: &str, style: Style, width: usize) -> Vec<Line<'static>> {
    if content.is_empty() {
        return Vec::new();
    }
    content
        .split('\n')
        .flat_map(|line| wrap_spans(&[Span::styled(detab(line), style)], width))
        .map(Line::from)
        .collect()
}

struct MarkdownRenderer<'t> {
    theme: &'t Theme,
    width: usize,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<ListKind>,
    // Display width of each open list level's marker, for hanging indents.
    marker_widths: Vec<usize>,
    pending_marker: Option<String>,
    quote_depth: usize,
    code_block: Option<String>,
    link_targets: Vec<(String, usize)>,
}

impl<'t> MarkdownRenderer<'t> {
    fn new(theme: &'t Theme, base: Style, width: usize) -> Self {
        Self {
            theme,
            width: width.max(1),
            lines: Vec::new(),
            spans: Vec::new(),
            style_stack: vec![base],
            list_stack: Vec::new(),
            marker_widths: Vec::new(),
            pending_marker: None,
            quote_depth: 0,
            code_block: None,
            link_targets: Vec::new(),
        }
    }

    fn current_style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or_default()
    }

    fn push_modifier(&mut self, modifier: Modifier) {
        let style = self.current_style().add_modifier(modifier);
        self.style_stack.push(style);
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some(buffer) = self.code_block.as_mut() {
                    buffer.push_str(&text);
                } else {
                    let style = self.current_style();
                    self.spans.push(Span::styled(detab(&text), style));
                }
            }
            Event::Code(code) => {
                self.spans
                    .push(Span::styled(detab(&code), self.theme.md_code_style));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                let style = self.current_style();
                for (idx, part) in html.split('\n').enumerate() {
                    if idx > 0 {
                        self.flush_line();
                    }
                    if !part.is_empty() {
                        self.spans.push(Span::styled(part.to_string(), style));
                    }
                }
            }
            Event::SoftBreak | Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.flush_line();
                self.blank_line();
                let rule = "─".repeat(self.width.saturating_sub(self.prefix_width()).max(1));
                let prefix = self.continuation_prefix();
                self.lines.push(Line::from(vec![
                    Span::styled(prefix, self.theme.md_quote_style),
                    Span::styled(rule, self.theme.md_rule_style),
                ]));
                self.blank_line();
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                let style = self.current_style();
                self.spans.push(Span::styled(marker.to_string(), style));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.pending_marker.is_none() {
                    self.blank_line();
                }
            }
            Tag::Heading { level, .. } => {
                self.flush_line();
                self.blank_line();
                let style = self.theme.md_heading_style;
                self.spans.push(Span::styled(
                    format!("{} ", "#".repeat(level as usize)),
                    style,
                ));
                self.style_stack.push(style);
            }
            Tag::BlockQuote(_) => {
                self.flush_line();
                self.blank_line();
                self.quote_depth += 1;
                let style = self.current_style().patch(self.theme.md_quote_style);
                self.style_stack.push(style);
            }
            Tag::List(start) => {
                self.flush_line();
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
                self.list_stack.push(match start {
                    Some(n) => ListKind::Ordered(n),
                    None => ListKind::Unordered,
                });
                self.marker_widths.push(0);
            }
            Tag::Item => {
                self.flush_line();
                let marker = match self.list_stack.last_mut() {
                    Some(ListKind::Ordered(n)) => {
                        let current = *n;
                        *n += 1;
                        format!("{current}. ")
                    }
                    _ => "• ".to_string(),
                };
                if let Some(width) = self.marker_widths.last_mut() {
                    *width = UnicodeWidthStr::width(marker.as_str());
                }
                self.pending_marker = Some(marker);
            }
            Tag::CodeBlock(kind) => {
                self.flush_line();
                self.blank_line();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        let prefix = self.continuation_prefix();
                        self.lines.push(Line::from(vec![
                            Span::styled(prefix, self.theme.md_quote_style),
                            Span::styled(lang.to_string(), self.theme.md_rule_style),
                        ]));
                    }
                }
                self.code_block = Some(String::new());
            }
            Tag::Emphasis => self.push_modifier(Modifier::ITALIC),
            Tag::Strong => self.push_modifier(Modifier::BOLD),
            Tag::Strikethrough => self.push_modifier(Modifier::CROSSED_OUT),
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                let start = self.spans.len();
                self.link_targets.push((dest_url.to_string(), start));
                let style = self.current_style().patch(self.theme.md_link_style);
                self.style_stack.push(style);
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.flush_line(),
            TagEnd::Heading(_) => {
                self.flush_line();
                self.pop_style();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.pop_style();
                self.blank_line();
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.list_stack.pop();
                self.marker_widths.pop();
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Item => {
                self.flush_line();
                self.pending_marker = None;
            }
            TagEnd::CodeBlock => {
                let code = self.code_block.take().unwrap_or_default();
                self.emit_code_block(&code);
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link | TagEnd::Image => {
                self.pop_style();
                if let Some((url, start)) = self.link_targets.pop() {
                    let text: String = self.spans[start.min(self.spans.len())..]
                        .iter()
                        .map(|span| span.content.as_ref())
                        .collect();
                    if !url.is_empty() && text != url {
                        self.spans
                            .push(Span::styled(format!(" ({url})"), self.theme.md_link_style));
                    }
                }
            }
            _ => {}
        }
    }

    fn emit_code_block(&mut self, code: &str) {
        let prefix = self.continuation_prefix();
        let available = self.width.saturating_sub(UnicodeWidthStr::width(prefix.as_str()));
        let code = code.strip_suffix('\n').unwrap_or(code);
        for source_line in code.split('\n') {
            for row in hard_wrap(&detab(source_line), available) {
                self.lines.push(Line::from(vec![
                    Span::styled(prefix.clone(), self.theme.md_quote_style),
                    Span::styled(row, self.theme.md_code_style),
                ]));
            }
        }
    }

    fn quote_prefix(&self) -> String {
        "│ ".repeat(self.quote_depth)
    }

    fn continuation_prefix(&self) -> String {
        let indent: usize = self.marker_widths.iter().sum();
        format!("{}{}", self.quote_prefix(), " ".repeat(indent))
    }

    fn prefix_width(&self) -> usize {
        UnicodeWidthStr::width(self.continuation_prefix().as_str())
    }

    fn flush_line(&mut self) {
        if self.spans.is_empty() && self.pending_marker.is_none() {
            return;
        }
        let spans = std::mem::take(&mut self.spans);
        let rest_prefix = self.continuation_prefix();
        let first_prefix = match self.pending_marker.take() {
            Some(marker) => {
                let outer: usize = self
                    .marker_widths
                    .iter()
                    .take(self.marker_widths.len().saturating_sub(1))
                    .sum();
                format!("{}{}{}", self.quote_prefix(), " ".repeat(outer), marker)
            }
            None => rest_prefix.clone(),
        };
        let available = self
            .width
            .saturating_sub(UnicodeWidthStr::width(rest_prefix.as_str()))
            .max(1);

        for (idx, row) in wrap_spans(&spans, available).into_iter().enumerate() {
            let prefix = if idx == 0 {
                first_prefix.clone()
            } else {
                rest_prefix.clone()
            };
            let mut line_spans = Vec::with_capacity(row.len() + 1);
            if !prefix.is_empty() {
                line_spans.push(Span::styled(prefix, self.theme.md_quote_style));
            }
            line_spans.extend(row);
            self.lines.push(Line::from(line_spans));
        }
    }

    /// Separate blocks by a single empty row, never leading or doubled.
    fn blank_line(&mut self) {
        if self
            .lines
            .last()
            .is_some_and(|line| !line_is_blank(line))
        {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if let Some(code) = self.code_block.take() {
            self.emit_code_block(&code);
        }
        self.flush_line();
        while self.lines.last().is_some_and(line_is_blank) {
            self.lines.pop();
        }
        self.lines
    }
}

fn line_is_blank(line: &Line<'_>) -> bool {
    line.spans.iter().all(|span| span.content.is_empty())
}

fn detab(text: &str) -> String {
    if text.contains('\t') {
        text.replace('\t', &" ".repeat(TAB_WIDTH))
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[Line<'static>]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    fn render(content: &str, width: usize) -> Vec<String> {
        let theme = Theme::dark_default();
        texts(&render_markdown(content, Style::default(), &theme, width))
    }

    #[test]
    fn paragraphs_are_separated_by_one_blank_row() {
        assert_eq!(render("first\n\nsecond", 40), vec!["first", "", "second"]);
    }

    #[test]
    fn headings_keep_their_level_marker() {
        let lines = render("## Title\n\nbody", 40);
        assert_eq!(lines, vec!["## Title", "", "body"]);
    }

    #[test]
    fn lists_get_markers_and_hanging_indent() {
        let lines = render("- alpha beta gamma\n- delta", 10);
        assert_eq!(lines, vec!["• alpha", "  beta", "  gamma", "• delta"]);

        let ordered = render("3. one\n4. two", 20);
        assert_eq!(ordered, vec!["3. one", "4. two"]);
    }

    #[test]
    fn code_blocks_keep_indentation_and_style() {
        let theme = Theme::dark_default();
        let lines = render_markdown("```\n  fn main() {}\n```", Style::default(), &theme, 40);
        assert_eq!(texts(&lines), vec!["  fn main() {}"]);
        let code_span = lines[0]
            .spans
            .iter()
            .find(|span| !span.content.is_empty())
            .expect("code span");
        assert_eq!(code_span.style, theme.md_code_style);
    }

    #[test]
    fn fenced_language_is_labelled() {
        assert_eq!(render("```rust\nlet x = 1;\n```", 40), vec!["rust", "let x = 1;"]);
    }

    #[test]
    fn links_show_their_target() {
        assert_eq!(
            render("see [docs](https://example.com)", 60),
            vec!["see docs (https://example.com)"]
        );
        assert_eq!(
            render("<https://example.com>", 60),
            vec!["https://example.com"]
        );
    }

    #[test]
    fn quotes_are_prefixed() {
        assert_eq!(render("> quoted", 40), vec!["│ quoted"]);
    }

    #[test]
    fn emphasis_adds_modifiers() {
        let theme = Theme::dark_default();
        let lines = render_markdown("**bold** and *it*", Style::default(), &theme, 40);
        let bold = lines[0]
            .spans
            .iter()
            .find(|span| span.content == "bold")
            .expect("bold span");
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn soft_breaks_start_new_rows() {
        assert_eq!(render("one\ntwo", 40), vec!["one", "two"]);
    }

    #[test]
    fn no_row_exceeds_width() {
        let content = "# Heading that is long\n\nSome *emphasised* text with `code` and a \
                       [link](https://example.com/a/very/long/path) inside.\n\n\
                       - item one is long enough to wrap\n  - nested item also wraps around\n\n\
                       > a quote that needs wrapping too\n\n```\nlet value = compute(1, 2, 3);\n```";
        let theme = Theme::dark_default();
        for width in [8usize, 13, 21, 34] {
            for line in render_markdown(content, Style::default(), &theme, width) {
                assert!(line.width() <= width, "{:?} wider than {width}", line.to_string());
            }
        }
    }

    #[test]
    fn empty_content_renders_nothing() {
        assert!(render("", 20).is_empty());
    }

    #[test]
    fn plain_rendering_preserves_source_lines() {
        let lines = render_plain("a *b*\n\nc", Style::default(), 20);
        assert_eq!(texts(&lines), vec!["a *b*", "", "c"]);
    }
}
