#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    pub fn is_assistant(self) -> bool {
        self == Role::Assistant
    }
}

/// One entry of the conversation transcript.
///
/// Entries are immutable once appended, except for the in-progress assistant
/// reply which the message log updates while a response streams in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Set when the exchange that produced this reply failed.
    pub failed: bool,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            failed: false,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Empty assistant entry that reserves the transcript slot for a pending reply.
    pub fn placeholder() -> Self {
        Self::assistant(String::new())
    }

    pub fn is_assistant(&self) -> bool {
        self.role.is_assistant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_use_wire_names() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
        assert_eq!(Role::System.as_str(), "system");
    }

    #[test]
    fn placeholder_is_empty_assistant() {
        let placeholder = ChatMessage::placeholder();
        assert!(placeholder.is_assistant());
        assert!(placeholder.content.is_empty());
        assert!(!placeholder.failed);
    }
}
