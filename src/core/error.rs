//! Error taxonomy for chat exchanges.

use std::error::Error as StdError;
use std::fmt;

/// Why a submission was refused before any request was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The draft was empty or whitespace only.
    Empty,
    /// A request is already in flight for this session.
    RequestInFlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// Submission refused locally. Never shown to the user as an error.
    InputRejected(RejectReason),

    /// Network or service failure, including timeouts.
    RequestFailed(String),

    /// The service answered with something we could not interpret.
    MalformedResponse(String),
}

impl ChatError {
    pub fn request_failed(reason: impl Into<String>) -> Self {
        ChatError::RequestFailed(reason.into())
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        ChatError::MalformedResponse(reason.into())
    }

    /// Reason text recorded for the user.
    pub fn reason(&self) -> &str {
        match self {
            ChatError::InputRejected(RejectReason::Empty) => "empty message",
            ChatError::InputRejected(RejectReason::RequestInFlight) => {
                "a response is still in progress"
            }
            ChatError::RequestFailed(reason) | ChatError::MalformedResponse(reason) => reason,
        }
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::InputRejected(_) => write!(f, "Input rejected: {}", self.reason()),
            ChatError::RequestFailed(reason) => write!(f, "Request failed: {reason}"),
            ChatError::MalformedResponse(reason) => write!(f, "Malformed response: {reason}"),
        }
    }
}

impl StdError for ChatError {}

/// Invalid operation on the message log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogError {
    /// No reply is currently streaming into the log.
    NoStreamingSlot,
    /// The streaming slot is not an assistant entry.
    NotAssistant,
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::NoStreamingSlot => write!(f, "no reply is streaming into the log"),
            LogError::NotAssistant => write!(f, "the last log entry is not an assistant reply"),
        }
    }
}

impl StdError for LogError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_expose_their_reason() {
        assert_eq!(ChatError::request_failed("timeout").reason(), "timeout");
        assert_eq!(ChatError::malformed("bad json").reason(), "bad json");
    }

    #[test]
    fn display_prefixes_the_kind() {
        assert_eq!(
            ChatError::request_failed("timeout").to_string(),
            "Request failed: timeout"
        );
    }
}
