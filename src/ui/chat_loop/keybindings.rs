//! Key routing for the chat view.
//!
//! Commands become [`AppAction`]s for the reducer; editing keys go straight
//! to the input controller since they never touch session state.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::app::input::is_editing_key;
use crate::core::app::{App, AppAction};

/// What the loop should do with a key after routing.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyResult {
    /// Send the action through the dispatcher.
    Dispatch(AppAction),
    /// The draft was edited in place.
    Handled,
    /// Nothing bound to this key.
    NotHandled,
}

pub fn route_key(app: &mut App, key: &KeyEvent) -> KeyResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    match key.code {
        KeyCode::Char('c') if ctrl => KeyResult::Dispatch(AppAction::Quit),
        KeyCode::Char('s') if ctrl => submit(app),
        KeyCode::Char('l') if ctrl => KeyResult::Dispatch(AppAction::ClearInput),
        KeyCode::Enter if alt || shift => {
            app.ui.input.insert_newline();
            KeyResult::Handled
        }
        KeyCode::Enter => submit(app),
        KeyCode::Esc => KeyResult::Dispatch(AppAction::CancelStreaming),
        KeyCode::PageUp => KeyResult::Dispatch(AppAction::PageUp),
        KeyCode::PageDown => KeyResult::Dispatch(AppAction::PageDown),
        KeyCode::Up if ctrl => KeyResult::Dispatch(AppAction::ScrollUp),
        KeyCode::Down if ctrl => KeyResult::Dispatch(AppAction::ScrollDown),
        KeyCode::Home if ctrl => KeyResult::Dispatch(AppAction::ScrollToTop),
        KeyCode::End if ctrl => KeyResult::Dispatch(AppAction::ScrollToBottom),
        _ if is_editing_key(key) => {
            app.ui.input.apply_key(*key);
            KeyResult::Handled
        }
        _ => KeyResult::NotHandled,
    }
}

fn submit(app: &App) -> KeyResult {
    KeyResult::Dispatch(AppAction::SubmitMessage {
        message: app.ui.input.value(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::create_test_app;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn enter_and_ctrl_s_submit_the_draft() {
        let mut app = create_test_app();
        app.ui.input.insert_str("hello");

        for event in [
            key(KeyCode::Enter, KeyModifiers::NONE),
            key(KeyCode::Char('s'), KeyModifiers::CONTROL),
        ] {
            assert_eq!(
                route_key(&mut app, &event),
                KeyResult::Dispatch(AppAction::SubmitMessage {
                    message: "hello".into()
                })
            );
        }
        // Submission itself is the reducer's job; the draft is untouched here.
        assert_eq!(app.ui.input.value(), "hello");
    }

    #[test]
    fn alt_enter_inserts_newline() {
        let mut app = create_test_app();
        app.ui.input.insert_str("one");
        assert_eq!(
            route_key(&mut app, &key(KeyCode::Enter, KeyModifiers::ALT)),
            KeyResult::Handled
        );
        app.ui.input.insert_str("two");
        assert_eq!(app.ui.input.value(), "one\ntwo");
    }

    #[test]
    fn control_keys_map_to_actions() {
        let mut app = create_test_app();
        let cases = [
            (key(KeyCode::Char('c'), KeyModifiers::CONTROL), AppAction::Quit),
            (key(KeyCode::Char('l'), KeyModifiers::CONTROL), AppAction::ClearInput),
            (key(KeyCode::Esc, KeyModifiers::NONE), AppAction::CancelStreaming),
            (key(KeyCode::PageUp, KeyModifiers::NONE), AppAction::PageUp),
            (key(KeyCode::PageDown, KeyModifiers::NONE), AppAction::PageDown),
            (key(KeyCode::Up, KeyModifiers::CONTROL), AppAction::ScrollUp),
            (key(KeyCode::Down, KeyModifiers::CONTROL), AppAction::ScrollDown),
            (key(KeyCode::Home, KeyModifiers::CONTROL), AppAction::ScrollToTop),
            (key(KeyCode::End, KeyModifiers::CONTROL), AppAction::ScrollToBottom),
        ];
        for (event, action) in cases {
            assert_eq!(route_key(&mut app, &event), KeyResult::Dispatch(action));
        }
    }

    #[test]
    fn printable_keys_edit_the_draft() {
        let mut app = create_test_app();
        for ch in "ok".chars() {
            assert_eq!(
                route_key(&mut app, &key(KeyCode::Char(ch), KeyModifiers::NONE)),
                KeyResult::Handled
            );
        }
        assert_eq!(app.ui.input.value(), "ok");
    }

    #[test]
    fn unbound_keys_are_not_handled() {
        let mut app = create_test_app();
        assert_eq!(
            route_key(&mut app, &key(KeyCode::F(5), KeyModifiers::NONE)),
            KeyResult::NotHandled
        );
    }
}
