use ratatui::text::Span;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Wrap styled spans to `max_width` columns, breaking at whitespace where
/// possible and hard-breaking tokens wider than a full row.
///
/// Whitespace at a wrap point is dropped. No produced row is wider than
/// `max_width`, and at least one (possibly empty) row is always returned.
pub(crate) fn wrap_spans(spans: &[Span<'static>], max_width: usize) -> Vec<Vec<Span<'static>>> {
    let max_width = max_width.max(1);
    let mut wrapper = Wrapper {
        max_width,
        rows: Vec::new(),
        current: Vec::new(),
        current_width: 0,
        continuation: false,
    };

    for span in spans {
        for token in split_tokens(&span.content) {
            wrapper.push_token(token, span.style);
        }
    }

    wrapper.finish()
}

/// Hard-wrap a single line by display width, keeping all whitespace.
/// Used for code blocks where word boundaries carry no meaning.
pub(crate) fn hard_wrap(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut width = 0usize;
    for ch in text.chars() {
        let cw = ch.width().unwrap_or(0);
        if width + cw > max_width && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            width = 0;
        }
        current.push(ch);
        width += cw;
    }
    rows.push(current);
    rows
}

struct Wrapper {
    max_width: usize,
    rows: Vec<Vec<Span<'static>>>,
    current: Vec<Span<'static>>,
    current_width: usize,
    // The current row was opened by a wrap rather than by the caller.
    continuation: bool,
}

impl Wrapper {
    fn push_token(&mut self, token: &str, style: ratatui::style::Style) {
        let token_width = UnicodeWidthStr::width(token);
        let is_space = token.chars().all(char::is_whitespace);

        if is_space {
            if self.continuation && self.current_width == 0 {
                return;
            }
            if self.current_width + token_width > self.max_width {
                self.break_row();
                return;
            }
            self.push_piece(token, token_width, style);
            return;
        }

        if self.current_width + token_width <= self.max_width {
            self.push_piece(token, token_width, style);
            return;
        }

        if token_width <= self.max_width {
            self.break_row();
            self.push_piece(token, token_width, style);
            return;
        }

        // Token wider than a full row: fill what's left, then keep breaking.
        let mut piece = String::new();
        let mut piece_width = 0usize;
        for ch in token.chars() {
            let cw = ch.width().unwrap_or(0);
            let used = self.current_width + piece_width;
            if used > 0 && used + cw > self.max_width {
                if !piece.is_empty() {
                    let taken = std::mem::take(&mut piece);
                    self.push_piece(&taken, piece_width, style);
                    piece_width = 0;
                }
                self.break_row();
            }
            piece.push(ch);
            piece_width += cw;
        }
        if !piece.is_empty() {
            self.push_piece(&piece, piece_width, style);
        }
    }

    fn push_piece(&mut self, text: &str, width: usize, style: ratatui::style::Style) {
        match self.current.last_mut() {
            Some(last) if last.style == style => last.content.to_mut().push_str(text),
            _ => self.current.push(Span::styled(text.to_string(), style)),
        }
        self.current_width += width;
    }

    fn break_row(&mut self) {
        trim_trailing_whitespace(&mut self.current);
        self.rows.push(std::mem::take(&mut self.current));
        self.current_width = 0;
        self.continuation = true;
    }

    fn finish(mut self) -> Vec<Vec<Span<'static>>> {
        if !self.current.is_empty() || self.rows.is_empty() {
            self.rows.push(self.current);
        }
        self.rows
    }
}

fn trim_trailing_whitespace(row: &mut Vec<Span<'static>>) {
    while let Some(last) = row.last_mut() {
        let trimmed_len = last.content.trim_end().len();
        if trimmed_len == 0 {
            row.pop();
            continue;
        }
        last.content.to_mut().truncate(trimmed_len);
        break;
    }
}

/// Split into alternating runs of whitespace and non-whitespace.
fn split_tokens(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let is_space = first.is_whitespace();
        let end = rest
            .char_indices()
            .find(|(_, ch)| ch.is_whitespace() != is_space)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        let (token, tail) = rest.split_at(end);
        rest = tail;
        Some(token)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::{Color, Style};

    fn row_texts(rows: &[Vec<Span<'static>>]) -> Vec<String> {
        rows.iter()
            .map(|row| row.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn wrap_splits_at_spaces() {
        let spans = vec![Span::raw("word boundary test")];
        let wrapped = wrap_spans(&spans, 9);
        assert_eq!(row_texts(&wrapped), vec!["word", "boundary", "test"]);
    }

    #[test]
    fn long_tokens_are_hard_broken() {
        let spans = vec![Span::raw("abcdefghij")];
        let wrapped = wrap_spans(&spans, 4);
        assert_eq!(row_texts(&wrapped), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn rows_never_exceed_width_with_wide_chars() {
        let spans = vec![Span::raw("日本語のテキストです hello")];
        for width in 1..12 {
            for row in wrap_spans(&spans, width) {
                let row_width: usize = row.iter().map(|s| s.width()).sum();
                assert!(row_width <= width.max(2), "row {row_width} > {width}");
            }
        }
    }

    #[test]
    fn styles_survive_wrapping() {
        let bold = Style::default().fg(Color::Red);
        let spans = vec![Span::raw("plain "), Span::styled("styled words", bold)];
        let wrapped = wrap_spans(&spans, 12);
        assert_eq!(row_texts(&wrapped), vec!["plain styled", "words"]);
        assert_eq!(wrapped[1][0].style, bold);
    }

    #[test]
    fn empty_input_yields_one_empty_row() {
        assert_eq!(wrap_spans(&[], 10), vec![Vec::<Span<'static>>::new()]);
    }

    #[test]
    fn hard_wrap_keeps_indentation() {
        assert_eq!(hard_wrap("    let x = 1;", 8), vec!["    let ", "x = 1;"]);
        assert_eq!(hard_wrap("", 8), vec![String::new()]);
    }
}
