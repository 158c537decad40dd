//! Shared constants used across the application

use std::time::Duration;

/// System preamble sent ahead of every request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are ChatGPT, a large language model trained by OpenAI. Follow the user's instructions carefully. Respond using markdown.";

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Requests that take longer than this fail with a timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Interval of the redraw tick that animates the working indicator.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(200);

pub const DEFAULT_INPUT_CHAR_LIMIT: usize = 500;

/// Rows the input area may grow to before it starts scrolling.
pub const MAX_INPUT_ROWS: u16 = 5;

/// Space reserved for the activity indicator + margin in the input area.
pub const INDICATOR_SPACE: u16 = 4;
