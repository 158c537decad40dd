use super::{App, AppAction, AppActionContext, AppCommand};
use crate::ui::layout::transcript_height;

pub(super) fn handle_input_action(
    app: &mut App,
    action: AppAction,
    ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::InsertIntoInput { text } => {
            if !text.is_empty() {
                app.insert_into_input(&text);
            }
            None
        }
        AppAction::ClearInput => {
            app.clear_input();
            None
        }
        AppAction::ScrollUp => {
            app.ui.scroll_up(1);
            None
        }
        AppAction::ScrollDown => {
            app.ui.scroll_down(1);
            None
        }
        AppAction::PageUp => {
            app.ui.scroll_up(page_size(app, ctx));
            None
        }
        AppAction::PageDown => {
            app.ui.scroll_down(page_size(app, ctx));
            None
        }
        AppAction::ScrollToTop => {
            app.ui.scroll_to_top();
            None
        }
        AppAction::ScrollToBottom => {
            app.ui.scroll_to_bottom();
            None
        }
        AppAction::Quit => {
            if app.state().is_busy() {
                app.conversation().cancel();
            }
            app.request_exit();
            None
        }
        _ => unreachable!("non-input action routed to input handler"),
    }
}

fn page_size(app: &App, ctx: AppActionContext) -> u16 {
    let term_height = if ctx.term_height > 0 {
        ctx.term_height
    } else {
        app.ui.last_term_size.height
    };
    transcript_height(term_height, app.ui.input.visible_rows()).max(1)
}
