//! Main chat event loop.
//!
//! Terminal input, stream events, and the indicator tick all become
//! [`crate::core::app::AppAction`]s applied to a single owned `App`.

mod event_loop;
mod keybindings;
mod lifecycle;

pub use event_loop::run_chat;
