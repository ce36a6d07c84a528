use shared::domain::{ConversationTurn, TurnRole};

use crate::{rules::GREETING, ResponseResolver};

/// Turns of one caller session, kept in memory only.
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Starts with the assistant greeting.
    pub fn new() -> Self {
        Self {
            turns: vec![ConversationTurn::assistant(GREETING)],
        }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Records `input` and its reply. Blank input adds no turns.
    pub async fn ask(&mut self, resolver: &ResponseResolver, input: &str) -> Option<&ConversationTurn> {
        if input.trim().is_empty() {
            return None;
        }

        // Both turns land together so a dropped future leaves no orphan.
        let reply = resolver.resolve(input).await;
        self.turns.push(ConversationTurn::user(input));
        self.turns.push(ConversationTurn::assistant(reply));
        self.turns.last()
    }

    pub fn user_turns(&self) -> usize {
        self.turns
            .iter()
            .filter(|turn| turn.role == TurnRole::User)
            .count()
    }
}
