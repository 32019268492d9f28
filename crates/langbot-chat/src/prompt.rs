//! Prompt rendering — one flat transcript string per turn.

use langbot_core::config::schema::DEFAULT_SYSTEM_PROMPT;
use langbot_core::types::Turn;

/// Renders the instruction preamble, prior turns, and the new message.
///
/// ```text
/// You are LangBot, a helpful AI assistant.
///
/// User: Hello
/// Assistant: Hi! How can I help?
/// User: What did I just say?
/// Assistant:
/// ```
#[derive(Clone, Debug)]
pub struct PromptBuilder {
    preamble: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

impl PromptBuilder {
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
        }
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// Render the prompt for `message` given `history` (oldest first).
    pub fn render(&self, history: &[Turn], message: &str) -> String {
        let mut prompt = String::with_capacity(
            self.preamble.len()
                + message.len()
                + history
                    .iter()
                    .map(|t| t.user.len() + t.assistant.len() + 20)
                    .sum::<usize>()
                + 32,
        );

        prompt.push_str(&self.preamble);
        prompt.push_str("\n\n");
        for turn in history {
            prompt.push_str("User: ");
            prompt.push_str(&turn.user);
            prompt.push_str("\nAssistant: ");
            prompt.push_str(&turn.assistant);
            prompt.push('\n');
        }
        prompt.push_str("User: ");
        prompt.push_str(message);
        prompt.push_str("\nAssistant:");
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_without_history() {
        let prompt = PromptBuilder::default().render(&[], "Hi");
        assert_eq!(
            prompt,
            "You are LangBot, a helpful AI assistant.\n\nUser: Hi\nAssistant:"
        );
    }

    #[test]
    fn test_render_history_oldest_first() {
        let history = vec![
            Turn::new("Hello", "Hi! How can I help?"),
            Turn::new("Tell me a joke", "Why did the crab never share?"),
        ];
        let prompt = PromptBuilder::default().render(&history, "What did I just say?");

        assert_eq!(
            prompt,
            "You are LangBot, a helpful AI assistant.\n\n\
             User: Hello\n\
             Assistant: Hi! How can I help?\n\
             User: Tell me a joke\n\
             Assistant: Why did the crab never share?\n\
             User: What did I just say?\n\
             Assistant:"
        );
    }

    #[test]
    fn test_custom_preamble() {
        let builder = PromptBuilder::new("Answer in French.");
        assert_eq!(builder.preamble(), "Answer in French.");
        assert!(builder.render(&[], "Hi").starts_with("Answer in French.\n\n"));
    }

    #[test]
    fn test_multiline_message_kept_verbatim() {
        let prompt = PromptBuilder::default().render(&[], "line one\nline two");
        assert!(prompt.ends_with("User: line one\nline two\nAssistant:"));
    }
}
