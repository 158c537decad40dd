//! Parlance is a full-screen terminal chat client for OpenAI-compatible APIs.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the session state machine, the message log, configuration,
//!   and the response channel that talks to the service.
//! - [`ui`] renders the terminal interface and runs the interactive event loop
//!   that drives user input and display updates.
//! - [`api`] defines the chat completion payloads sent and received.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which resolves settings and hands off to
//! [`ui::chat_loop`] for interactive sessions.

pub mod api;
pub mod cli;
pub mod core;
pub mod logging;
pub mod ui;
pub mod utils;
