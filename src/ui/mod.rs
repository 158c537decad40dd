//! Terminal UI layer for interactive chat sessions.
//!
//! The UI module owns rendering, layout, keyboard handling, and loop control
//! for the text user interface.
//!
//! Key submodules include:
//! - [`chat_loop`]: the main interaction loop that turns terminal input and
//!   stream events into [`crate::core::app::AppAction`]s.
//! - [`renderer`], [`layout`], and [`transcript`]: view composition and frame output.
//! - [`markdown`]: reply formatting.
//! - [`theme`]: color and label policy.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns the session state machine and backend coordination.

pub mod chat_loop;
pub mod layout;
pub mod markdown;
mod markdown_wrap;
pub mod renderer;
pub mod theme;
pub mod transcript;
