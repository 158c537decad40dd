//! Ordered transcript of the conversation.
//!
//! Entries are only ever appended. The one exception is the assistant reply
//! that is currently streaming: its index is held as the streaming slot, and
//! only that entry may be rewritten until the slot is closed. Every mutation
//! bumps [`MessageLog::revision`] so cached renderings can tell when they are
//! stale.

use crate::api;
use crate::core::error::LogError;
use crate::core::message::{ChatMessage, Role};

#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<ChatMessage>,
    streaming_slot: Option<usize>,
    revision: u64,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.bump();
    }

    /// Opens the last entry as the streaming slot.
    pub fn begin_streaming_slot(&mut self) -> Result<(), LogError> {
        let last = self.messages.len().checked_sub(1).ok_or(LogError::NoStreamingSlot)?;
        if !self.messages[last].is_assistant() {
            return Err(LogError::NotAssistant);
        }
        self.streaming_slot = Some(last);
        Ok(())
    }

    pub fn close_streaming_slot(&mut self) {
        self.streaming_slot = None;
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming_slot.is_some()
    }

    /// Replaces the content of the streaming reply wholesale.
    pub fn replace_last(&mut self, content: impl Into<String>) -> Result<(), LogError> {
        let slot = self.writable_slot()?;
        self.messages[slot].content = content.into();
        self.bump();
        Ok(())
    }

    /// Appends a chunk to the streaming reply in place.
    pub fn append_to_last(&mut self, chunk: &str) -> Result<(), LogError> {
        let slot = self.writable_slot()?;
        self.messages[slot].content.push_str(chunk);
        self.bump();
        Ok(())
    }

    /// Flags the last assistant reply as failed and closes the streaming slot.
    pub fn mark_last_failed(&mut self) -> bool {
        self.streaming_slot = None;
        match self.messages.last_mut() {
            Some(last) if last.is_assistant() => {
                last.failed = true;
                self.bump();
                true
            }
            _ => false,
        }
    }

    /// Drops a trailing assistant entry that never received content.
    pub fn remove_last_if_empty(&mut self) -> bool {
        let removable = self
            .messages
            .last()
            .is_some_and(|last| last.is_assistant() && last.content.is_empty());
        if removable {
            self.messages.pop();
            self.streaming_slot = None;
            self.bump();
        }
        removable
    }

    /// Builds the message list sent with the next request.
    ///
    /// The system preamble leads; every prior entry follows with its role
    /// flattened to `user`. Failed replies are left out.
    pub fn snapshot_for_request(&self, preamble: &str) -> Vec<api::ChatMessage> {
        let mut snapshot = Vec::with_capacity(self.messages.len() + 1);
        snapshot.push(api::ChatMessage::new(Role::System.as_str(), preamble));
        snapshot.extend(
            self.messages
                .iter()
                .filter(|message| !message.failed)
                .map(|message| api::ChatMessage::new(Role::User.as_str(), message.content.clone())),
        );
        snapshot
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn streaming_slot(&self) -> Option<usize> {
        self.streaming_slot
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn writable_slot(&self) -> Result<usize, LogError> {
        let slot = self.streaming_slot.ok_or(LogError::NoStreamingSlot)?;
        if slot + 1 != self.messages.len() {
            return Err(LogError::NoStreamingSlot);
        }
        if !self.messages[slot].is_assistant() {
            return Err(LogError::NotAssistant);
        }
        Ok(slot)
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streaming_log() -> MessageLog {
        let mut log = MessageLog::new();
        log.append(ChatMessage::user("hi"));
        log.append(ChatMessage::placeholder());
        log.begin_streaming_slot().expect("slot");
        log
    }

    #[test]
    fn replace_last_requires_open_slot() {
        let mut log = MessageLog::new();
        log.append(ChatMessage::assistant("done"));
        assert_eq!(log.replace_last("x"), Err(LogError::NoStreamingSlot));
    }

    #[test]
    fn streaming_slot_must_be_assistant() {
        let mut log = MessageLog::new();
        log.append(ChatMessage::user("hi"));
        assert_eq!(log.begin_streaming_slot(), Err(LogError::NotAssistant));
    }

    #[test]
    fn replace_and_append_agree_on_final_content() {
        let chunks = ["Hel", "lo", " world"];

        let mut replaced = streaming_log();
        let mut accumulated = String::new();
        for chunk in chunks {
            accumulated.push_str(chunk);
            replaced.replace_last(accumulated.clone()).expect("replace");
        }

        let mut appended = streaming_log();
        for chunk in chunks {
            appended.append_to_last(chunk).expect("append");
        }

        assert_eq!(replaced.last().unwrap().content, "Hello world");
        assert_eq!(appended.last().unwrap().content, "Hello world");
    }

    #[test]
    fn closed_slot_rejects_further_writes() {
        let mut log = streaming_log();
        log.replace_last("partial").expect("replace");
        log.close_streaming_slot();
        assert!(log.append_to_last("more").is_err());
        assert_eq!(log.last().unwrap().content, "partial");
    }

    #[test]
    fn every_mutation_bumps_revision() {
        let mut log = MessageLog::new();
        let start = log.revision();
        log.append(ChatMessage::user("a"));
        log.append(ChatMessage::placeholder());
        log.begin_streaming_slot().expect("slot");
        log.append_to_last("b").expect("append");
        assert_eq!(log.revision(), start + 3);
    }

    #[test]
    fn snapshot_flattens_roles_behind_preamble() {
        let mut log = MessageLog::new();
        log.append(ChatMessage::user("question"));
        log.append(ChatMessage::assistant("answer"));

        let snapshot = log.snapshot_for_request("be brief");
        let roles: Vec<_> = snapshot.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["system", "user", "user"]);
        assert_eq!(snapshot[0].content, "be brief");
        assert_eq!(snapshot[2].content, "answer");
    }

    #[test]
    fn snapshot_skips_failed_replies() {
        let mut log = streaming_log();
        log.replace_last("half").expect("replace");
        assert!(log.mark_last_failed());

        let snapshot = log.snapshot_for_request("p");
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1].content, "hi");
    }

    #[test]
    fn remove_last_if_empty_only_drops_blank_assistant() {
        let mut log = streaming_log();
        assert!(log.remove_last_if_empty());
        assert_eq!(log.len(), 1);
        assert!(!log.is_streaming());
        assert!(!log.remove_last_if_empty());
    }
}
