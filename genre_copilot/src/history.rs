//! Conversation history management.
//!
//! Decides which transcript turns accompany the system prompt on each
//! completion request.

use genre_core::{ChatMessage, Role};

/// Turns sent to the model per request, counting the new user message.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// A sliding window over conversation history.
#[derive(Debug, Clone, Copy)]
pub struct HistoryWindow {
    max_turns: usize,
}

impl HistoryWindow {
    /// A window of at least one turn, so the new message always fits.
    #[must_use]
    pub fn new(max_turns: usize) -> Self {
        Self {
            max_turns: max_turns.max(1),
        }
    }

    #[must_use]
    pub const fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Build messages for the completion request.
    ///
    /// The system prompt comes first, followed by the most recent
    /// `max_turns` entries of `history + [new_message]` in original order.
    #[must_use]
    pub fn build_llm_messages(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        new_message: &str,
    ) -> Vec<ChatMessage> {
        let keep = self.max_turns - 1;
        let start = history.len().saturating_sub(keep);

        let mut messages = Vec::with_capacity(history.len() - start + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend(history[start..].iter().cloned());
        messages.push(ChatMessage::user(new_message));
        messages
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

/// Statistics about conversation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStats {
    pub total_messages: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    pub total_characters: usize,
    pub estimated_tokens: usize,
}

impl HistoryStats {
    #[must_use]
    pub fn of(history: &[ChatMessage]) -> Self {
        let total_chars: usize = history.iter().map(|m| m.content.len()).sum();
        Self {
            total_messages: history.len(),
            user_messages: history.iter().filter(|m| m.role == Role::User).count(),
            assistant_messages: history
                .iter()
                .filter(|m| m.role == Role::Assistant)
                .count(),
            total_characters: total_chars,
            estimated_tokens: total_chars / 4, // Rough estimate: 4 chars per token
        }
    }
}
