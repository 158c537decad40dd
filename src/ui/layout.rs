use ratatui::layout::{Constraint, Direction, Layout, Rect};

const TITLE_ROWS: u16 = 1;
const STATUS_ROWS: u16 = 1;
const INPUT_BORDER_ROWS: u16 = 2;

/// Screen regions of the chat view, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLayout {
    pub title: Rect,
    pub transcript: Rect,
    pub status: Rect,
    pub input: Rect,
}

impl ChatLayout {
    pub fn compute(area: Rect, input_rows: u16) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TITLE_ROWS),
                Constraint::Min(0),
                Constraint::Length(STATUS_ROWS),
                Constraint::Length(input_rows + INPUT_BORDER_ROWS),
            ])
            .split(area);

        Self {
            title: chunks[0],
            transcript: chunks[1],
            status: chunks[2],
            input: chunks[3],
        }
    }
}

/// Rows left for the transcript on a terminal `term_height` rows tall.
pub fn transcript_height(term_height: u16, input_rows: u16) -> u16 {
    term_height.saturating_sub(TITLE_ROWS + STATUS_ROWS + input_rows + INPUT_BORDER_ROWS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_stack_without_gaps() {
        let layout = ChatLayout::compute(Rect::new(0, 0, 80, 24), 2);
        assert_eq!(layout.title.height, 1);
        assert_eq!(layout.input.height, 4);
        assert_eq!(layout.status.height, 1);
        assert_eq!(layout.transcript.height, transcript_height(24, 2));
        assert_eq!(layout.transcript.y, 1);
        assert_eq!(layout.input.y + layout.input.height, 24);
    }

    #[test]
    fn tiny_terminals_leave_no_transcript() {
        assert_eq!(transcript_height(5, 5), 0);
    }
}
