//! Dialogue context: the single active topic and follow-up resolution.
//!
//! The context is a two-state machine:
//!
//! ```text
//!   NoActiveTopic --set_topic(t)--> ActiveTopic(t)
//!   ActiveTopic(a) --set_topic(t)--> ActiveTopic(t)     (overwrite, never push)
//!   any --clear_topic()--> NoActiveTopic
//! ```
//!
//! While a topic is active, vague follow-ups ("tell me more", "how do I do
//! that", "give me an example") are resolved against that topic's detail
//! table. Topic-switch detection is the engine's job and runs before
//! [`DialogueContext::resolve_follow_up`].

use crate::nl::keywords::KeywordTable;
use crate::nl::normalize::{self, has_token};
use crate::nl::vocab::Lexicon;
use crate::types::{Aspect, TopicId};

/// Outcome of resolving a follow-up utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUpResult {
    /// Called without an active topic. The caller should have checked.
    NoActiveTopicToFollowUp,
    /// The user asked for a tip on the active topic.
    TipRequest(TopicId),
    /// A detail answer for one aspect of the active topic.
    Detail {
        topic: TopicId,
        aspect: Aspect,
        text: String,
    },
    /// No aspect matched; `message` asks the user to be more specific.
    Unresolved { topic: TopicId, message: String },
}

#[derive(Debug, Clone)]
pub struct DialogueContext {
    active: Option<TopicId>,
    /// Number of follow-ups resolved against the current topic.
    follow_ups: usize,
    cues: KeywordTable<Aspect>,
    /// Indexed by `TopicId` declaration order.
    details: Vec<Vec<(Aspect, String)>>,
    tip_words: Vec<String>,
    unresolved: Vec<String>,
}

impl DialogueContext {
    pub fn new(lex: &Lexicon) -> Self {
        DialogueContext {
            active: None,
            follow_ups: 0,
            cues: lex.follow_up.clone(),
            details: TopicId::ALL
                .iter()
                .map(|t| lex.content(*t).details.clone())
                .collect(),
            tip_words: lex.tip_words.clone(),
            unresolved: TopicId::ALL.iter().map(|t| lex.unresolved_message(*t)).collect(),
        }
    }

    pub fn active(&self) -> Option<TopicId> {
        self.active
    }

    pub fn follow_ups(&self) -> usize {
        self.follow_ups
    }

    /// Make `topic` the active topic, replacing any previous one.
    pub fn set_topic(&mut self, topic: TopicId) {
        if self.active != Some(topic) {
            log::debug!("context: {:?} -> {}", self.active, topic);
            self.follow_ups = 0;
        }
        self.active = Some(topic);
    }

    pub fn clear_topic(&mut self) {
        if let Some(prev) = self.active.take() {
            log::debug!("context: {} cleared", prev);
        }
        self.follow_ups = 0;
    }

    /// True if the input asks for a tip ("tip" or "tips" as a whole word).
    pub fn is_tip_request(&self, input: &str) -> bool {
        has_token(&normalize::normalize(input), &self.tip_words)
    }

    /// Resolve `input` against the active topic.
    ///
    /// Tip requests win over detail aspects. Aspects are tried in the order
    /// the topic declares them; an aspect matches on any of its cue phrases
    /// or on its own keyword.
    pub fn resolve_follow_up(&mut self, input: &str) -> FollowUpResult {
        let Some(topic) = self.active else {
            return FollowUpResult::NoActiveTopicToFollowUp;
        };
        let normalized = normalize::normalize(input);

        if has_token(&normalized, &self.tip_words) {
            return FollowUpResult::TipRequest(topic);
        }

        let hit = self.details[topic as usize].iter().find(|(aspect, _)| {
            self.cues.matches(*aspect, &normalized) || normalized.contains(aspect.as_str())
        });
        match hit {
            Some((aspect, text)) => {
                self.follow_ups += 1;
                FollowUpResult::Detail { topic, aspect: *aspect, text: text.clone() }
            }
            None => FollowUpResult::Unresolved {
                topic,
                message: self.unresolved[topic as usize].clone(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> DialogueContext {
        DialogueContext::new(&Lexicon::embedded().unwrap())
    }

    fn aspect_of(result: FollowUpResult) -> Option<Aspect> {
        match result {
            FollowUpResult::Detail { aspect, .. } => Some(aspect),
            _ => None,
        }
    }

    #[test]
    fn test_starts_empty() {
        let mut ctx = context();
        assert_eq!(ctx.active(), None);
        assert_eq!(ctx.resolve_follow_up("tell me more"), FollowUpResult::NoActiveTopicToFollowUp);
    }

    #[test]
    fn test_set_topic_overwrites() {
        let mut ctx = context();
        ctx.set_topic(TopicId::Vpn);
        ctx.set_topic(TopicId::Malware);
        assert_eq!(ctx.active(), Some(TopicId::Malware));
        ctx.clear_topic();
        assert_eq!(ctx.active(), None, "no stack: clearing leaves nothing behind");
    }

    #[test]
    fn test_clear_then_follow_up() {
        let mut ctx = context();
        ctx.set_topic(TopicId::Phishing);
        ctx.clear_topic();
        for input in ["tell me more", "give me a tip", "how do i avoid it", ""] {
            assert_eq!(ctx.resolve_follow_up(input), FollowUpResult::NoActiveTopicToFollowUp);
        }
    }

    #[test]
    fn test_tip_request() {
        let mut ctx = context();
        ctx.set_topic(TopicId::Password);
        assert_eq!(ctx.resolve_follow_up("Any tips?"), FollowUpResult::TipRequest(TopicId::Password));
    }

    #[test]
    fn test_tip_is_whole_word() {
        let mut ctx = context();
        ctx.set_topic(TopicId::Password);
        assert_ne!(
            ctx.resolve_follow_up("can i use multiple devices"),
            FollowUpResult::TipRequest(TopicId::Password)
        );
    }

    #[test]
    fn test_more() {
        let mut ctx = context();
        ctx.set_topic(TopicId::Malware);
        assert_eq!(aspect_of(ctx.resolve_follow_up("Tell me more")), Some(Aspect::More));
    }

    #[test]
    fn test_how() {
        let mut ctx = context();
        ctx.set_topic(TopicId::Encryption);
        assert_eq!(aspect_of(ctx.resolve_follow_up("how can i set it up")), Some(Aspect::How));
    }

    #[test]
    fn test_avoid() {
        let mut ctx = context();
        ctx.set_topic(TopicId::Phishing);
        assert_eq!(aspect_of(ctx.resolve_follow_up("what should I watch out for to prevent it")), Some(Aspect::Avoid));
    }

    #[test]
    fn test_example() {
        let mut ctx = context();
        ctx.set_topic(TopicId::Phishing);
        assert_eq!(aspect_of(ctx.resolve_follow_up("can you give an example")), Some(Aspect::Example));
    }

    #[test]
    fn test_declared_order_wins() {
        // "show me" is an example cue and also contains "how"; example is
        // declared before how.
        let mut ctx = context();
        ctx.set_topic(TopicId::Firewall);
        assert_eq!(aspect_of(ctx.resolve_follow_up("show me")), Some(Aspect::Example));
    }

    #[test]
    fn test_detail_text_belongs_to_topic() {
        let lex = Lexicon::embedded().unwrap();
        let mut ctx = DialogueContext::new(&lex);
        ctx.set_topic(TopicId::Vpn);
        match ctx.resolve_follow_up("more details please") {
            FollowUpResult::Detail { topic, aspect, text } => {
                assert_eq!(topic, TopicId::Vpn);
                let expected = &lex.content(TopicId::Vpn).details;
                assert!(expected.iter().any(|(a, t)| *a == aspect && *t == text));
            }
            other => panic!("expected detail, got {:?}", other),
        }
        assert_eq!(ctx.follow_ups(), 1);
    }

    #[test]
    fn test_unresolved() {
        let mut ctx = context();
        ctx.set_topic(TopicId::DataBreach);
        match ctx.resolve_follow_up("hmm okay") {
            FollowUpResult::Unresolved { topic, message } => {
                assert_eq!(topic, TopicId::DataBreach);
                assert!(message.contains("data breaches"), "got: {}", message);
            }
            other => panic!("expected unresolved, got {:?}", other),
        }
        assert_eq!(ctx.active(), Some(TopicId::DataBreach), "unresolved keeps the topic");
    }
}
