//! Intent classification over the keyword table.
//!
//! Intents are tried in table order and the first match wins:
//! - **exit** matches only when an exit word is a whole token, so "know"
//!   never triggers on "no" and "goodbyes" never triggers on "goodbye";
//! - every other intent matches when any of its phrases is a substring of
//!   the normalized input.
//!
//! Unmatched or empty input classifies as `Unknown`. Classification is pure.

use crate::nl::keywords::KeywordTable;
use crate::nl::normalize::{self, has_token};
use crate::types::IntentId;

#[derive(Debug, Clone)]
pub struct IntentClassifier {
    table: KeywordTable<IntentId>,
}

impl IntentClassifier {
    pub fn new(table: KeywordTable<IntentId>) -> Self {
        IntentClassifier { table }
    }

    /// Normalize `input` and classify it.
    pub fn classify(&self, input: &str) -> IntentId {
        self.classify_normalized(&normalize::normalize(input))
    }

    /// Classify an already-normalized input.
    pub fn classify_normalized(&self, normalized: &str) -> IntentId {
        self.first_of(normalized, self.table.keys())
    }

    /// Classify, considering only `allowed` intents (still in table order).
    pub fn classify_among(&self, normalized: &str, allowed: &[IntentId]) -> IntentId {
        self.first_of(normalized, self.table.keys().filter(|k| allowed.contains(k)))
    }

    /// True if `normalized` contains an exit word as a whole token.
    pub fn is_exit(&self, normalized: &str) -> bool {
        has_token(normalized, self.table.phrases(IntentId::Exit))
    }

    /// True if `intent` matches `normalized` under its own rule.
    pub fn matches(&self, intent: IntentId, normalized: &str) -> bool {
        match intent {
            IntentId::Unknown => false,
            IntentId::Exit => self.is_exit(normalized),
            other => self.table.matches(other, normalized),
        }
    }

    pub fn phrases(&self, intent: IntentId) -> &[String] {
        self.table.phrases(intent)
    }

    fn first_of(&self, normalized: &str, keys: impl Iterator<Item = IntentId>) -> IntentId {
        if normalized.is_empty() {
            return IntentId::Unknown;
        }
        keys.into_iter()
            .find(|k| self.matches(*k, normalized))
            .unwrap_or(IntentId::Unknown)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nl::vocab::Lexicon;

    fn classifier() -> IntentClassifier {
        IntentClassifier::new(Lexicon::embedded().unwrap().intents)
    }

    // --- exit ---

    #[test]
    fn test_exit_bye() {
        assert_eq!(classifier().classify("ok bye"), IntentId::Exit);
    }

    #[test]
    fn test_exit_with_punctuation() {
        assert_eq!(classifier().classify("Goodbye!"), IntentId::Exit);
        assert_eq!(classifier().classify("quit."), IntentId::Exit);
    }

    #[test]
    fn test_know_is_not_exit() {
        assert_ne!(classifier().classify("I don't know what to do"), IntentId::Exit);
    }

    #[test]
    fn test_snow_is_not_exit() {
        assert_ne!(classifier().classify("snow day"), IntentId::Exit);
    }

    #[test]
    fn test_exit_word_inside_longer_word() {
        let c = classifier();
        assert!(!c.is_exit("byebye"));
        assert!(!c.is_exit("exiting the building"));
        assert!(!c.is_exit("quite a lot"));
    }

    // --- substring intents ---

    #[test]
    fn test_create_task() {
        assert_eq!(classifier().classify("Remind me to update my router"), IntentId::CreateTask);
    }

    #[test]
    fn test_view_tasks() {
        assert_eq!(classifier().classify("show my tasks"), IntentId::ViewTasks);
    }

    #[test]
    fn test_complete_task() {
        assert_eq!(classifier().classify("mark as done backup files"), IntentId::CompleteTask);
    }

    #[test]
    fn test_start_quiz() {
        assert_eq!(classifier().classify("let's take a quiz"), IntentId::StartQuiz);
    }

    #[test]
    fn test_chat_logs() {
        assert_eq!(classifier().classify("show chat logs"), IntentId::ViewChatLogs);
    }

    #[test]
    fn test_activity_log() {
        assert_eq!(classifier().classify("what have you done for me"), IntentId::ViewActivityLog);
    }

    #[test]
    fn test_tips() {
        assert_eq!(classifier().classify("any advice?"), IntentId::GetTips);
    }

    #[test]
    fn test_discuss_topic() {
        assert_eq!(classifier().classify("phishing"), IntentId::DiscussTopic);
    }

    #[test]
    fn test_help() {
        assert_eq!(classifier().classify("what can you do"), IntentId::Help);
    }

    #[test]
    fn test_table_order_breaks_ties() {
        // Both create_task ("should") and discuss_topic ("vpn") match;
        // create_task is declared first.
        assert_eq!(classifier().classify("i should get a vpn"), IntentId::CreateTask);
    }

    // --- unknown ---

    #[test]
    fn test_empty_is_unknown() {
        let c = classifier();
        assert_eq!(c.classify(""), IntentId::Unknown);
        assert_eq!(c.classify("   \t "), IntentId::Unknown);
    }

    #[test]
    fn test_gibberish_is_unknown() {
        assert_eq!(classifier().classify("purple elephants dancing"), IntentId::Unknown);
    }

    // --- restricted ---

    #[test]
    fn test_classify_among_ignores_other_intents() {
        let c = classifier();
        let n = "i should view tasks";
        assert_eq!(c.classify_normalized(n), IntentId::CreateTask);
        assert_eq!(c.classify_among(n, &IntentId::MANAGEMENT), IntentId::ViewTasks);
        assert_eq!(c.classify_among("tell me about vpn", &IntentId::MANAGEMENT), IntentId::Unknown);
    }
}
