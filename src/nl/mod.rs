//! Dialogue core.
//!
//! A deterministic keyword pipeline that turns one line of user input into a
//! [`Directive`] for the presentation layer:
//!
//! 1. **Normalization**: case fold, whitespace collapse (`normalize`)
//! 2. **Exit / help**: whole-token exit words, help phrases (`intent`)
//! 3. **Command gate**: explicit task leads (`slots`) and task, quiz and
//!    journal commands (`intent`)
//! 4. **Topic switch**: a topic other than the active one (`keywords`)
//! 5. **Tips**: per-topic rotation (`tips`)
//! 6. **Follow-up**: aspects of the active topic (`dialogue`)
//! 7. **Fallback**: full intent classification (`intent`, `slots`)
//!
//! [`DialogueEngine`] owns all mutable state (the active topic and the tip
//! pools), so independent sessions never share anything.

pub mod normalize;
pub mod keywords;
pub mod vocab;
pub mod intent;
pub mod slots;
pub mod when;
pub mod dialogue;
pub mod tips;
pub mod sentiment;

use rand::rngs::StdRng;
use rand::Rng;

use crate::types::{IntentId, Result, TopicId};
use dialogue::{DialogueContext, FollowUpResult};
use intent::IntentClassifier;
use sentiment::{Sentiment, SentimentDetector};
use slots::SlotExtractor;
use tips::{TipDraw, TipRotator};
use vocab::Lexicon;

// ---------------------------------------------------------------------------
// Directive: the output of the dialogue core
// ---------------------------------------------------------------------------

/// What the presentation layer should do with one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Show the overview for a topic (now the active topic).
    TopicInfoRequest(TopicId),
    /// Show a tip (or the pool-refreshed notice).
    TipText(String),
    /// Show a follow-up answer about the active topic.
    FollowUpText(String),
    UnknownInput,
    ExitRequested,
    HelpRequested,
    /// Create a task. `time_expression` is unresolved text, if any.
    TaskSlots {
        name: String,
        time_expression: Option<String>,
    },
    /// A task lead phrase with nothing usable after it.
    TaskNameMissing,
    /// A tip request with no topic to draw from.
    TipNeedsTopic,
    /// A task, quiz or journal command for the shell.
    Command(IntentId),
    /// The user named a favourite topic (now also the active topic).
    FavouriteTopic(TopicId),
}

/// One processed input: the directive plus metadata for the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub directive: Directive,
    pub intent: IntentId,
    /// Active topic after the turn.
    pub topic: Option<TopicId>,
    pub sentiment: Option<Sentiment>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct DialogueEngine<R: Rng = StdRng> {
    lexicon: Lexicon,
    classifier: IntentClassifier,
    slots: SlotExtractor,
    context: DialogueContext,
    tips: TipRotator<R>,
    moods: SentimentDetector,
    turns: usize,
}

impl DialogueEngine<StdRng> {
    /// Engine over the embedded vocabulary with an entropy-seeded tip order.
    pub fn new() -> Result<Self> {
        let lex = Lexicon::embedded()?;
        let tips = TipRotator::new(&lex);
        DialogueEngine::with_parts(lex, tips)
    }

    /// Engine over `lex`; a `seed` makes tip order reproducible.
    pub fn from_lexicon(lex: Lexicon, seed: Option<u64>) -> Result<Self> {
        let tips = match seed {
            Some(s) => TipRotator::seeded(&lex, s),
            None => TipRotator::new(&lex),
        };
        DialogueEngine::with_parts(lex, tips)
    }
}

impl<R: Rng> DialogueEngine<R> {
    pub fn with_parts(lexicon: Lexicon, tips: TipRotator<R>) -> Result<Self> {
        Ok(DialogueEngine {
            classifier: IntentClassifier::new(lexicon.intents.clone()),
            slots: SlotExtractor::from_lexicon(&lexicon)?,
            context: DialogueContext::new(&lexicon),
            moods: SentimentDetector::new(lexicon.moods.clone()),
            lexicon,
            tips,
            turns: 0,
        })
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn context(&self) -> &DialogueContext {
        &self.context
    }

    pub fn active_topic(&self) -> Option<TopicId> {
        self.context.active()
    }

    pub fn clear_topic(&mut self) {
        self.context.clear_topic();
    }

    pub fn slots(&self) -> &SlotExtractor {
        &self.slots
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn moods(&self) -> &SentimentDetector {
        &self.moods
    }

    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Draw a tip for `topic` directly.
    pub fn next_tip(&mut self, topic: TopicId) -> TipDraw {
        self.tips.next_tip(topic)
    }

    /// Process one line of input. Total: never fails, never panics.
    pub fn process(&mut self, input: &str) -> Turn {
        self.turns += 1;
        let normalized = normalize::normalize(input);
        let sentiment = self.moods.detect(&normalized);
        let (directive, intent) = self.route(input, &normalized);
        log::debug!(
            "turn {}: {:?} -> {:?} (topic {:?})",
            self.turns,
            normalized,
            directive,
            self.context.active()
        );
        Turn { directive, intent, topic: self.context.active(), sentiment }
    }

    fn route(&mut self, input: &str, normalized: &str) -> (Directive, IntentId) {
        // An empty line ends the current topic.
        if normalized.is_empty() {
            self.context.clear_topic();
            return (Directive::UnknownInput, IntentId::Unknown);
        }
        if self.classifier.is_exit(normalized) {
            return (Directive::ExitRequested, IntentId::Exit);
        }
        if self.classifier.matches(IntentId::Help, normalized) {
            return (Directive::HelpRequested, IntentId::Help);
        }

        // Command gate: explicit task requests and management commands leave
        // the current topic behind.
        if self.slots.has_explicit_lead(input) {
            log::debug!("route: explicit task lead");
            self.context.clear_topic();
            return (self.task_directive(input), IntentId::CreateTask);
        }
        let command = self.classifier.classify_among(normalized, &IntentId::MANAGEMENT);
        if command != IntentId::Unknown {
            log::debug!("route: command {}", command);
            self.context.clear_topic();
            return (Directive::Command(command), command);
        }

        if let Some(topic) = self.favourite_topic(normalized) {
            log::debug!("route: favourite topic {}", topic);
            self.context.set_topic(topic);
            return (Directive::FavouriteTopic(topic), IntentId::DiscussTopic);
        }

        let wants_tip = self.context.is_tip_request(normalized);

        // Topic switch takes precedence over follow-up resolution.
        let mentioned = match self.context.active() {
            Some(active) => self.lexicon.topics.first_match_excluding(normalized, active),
            None => self.lexicon.topics.first_match(normalized),
        };
        if let Some(topic) = mentioned {
            log::debug!("route: topic {}", topic);
            self.context.set_topic(topic);
            if wants_tip {
                return (self.tip_directive(topic), IntentId::GetTips);
            }
            return (Directive::TopicInfoRequest(topic), IntentId::DiscussTopic);
        }

        let Some(active) = self.context.active() else {
            if wants_tip {
                return (Directive::TipNeedsTopic, IntentId::GetTips);
            }
            return self.fallback(input, normalized, None);
        };

        match self.context.resolve_follow_up(normalized) {
            FollowUpResult::TipRequest(topic) => (self.tip_directive(topic), IntentId::GetTips),
            FollowUpResult::Detail { text, .. } => (Directive::FollowUpText(text), IntentId::DiscussTopic),
            FollowUpResult::Unresolved { message, .. } => {
                // Naming the active topic again re-shows its overview.
                if self.lexicon.topics.matches(active, normalized) {
                    return (Directive::TopicInfoRequest(active), IntentId::DiscussTopic);
                }
                self.fallback(input, normalized, Some(message))
            }
            FollowUpResult::NoActiveTopicToFollowUp => self.fallback(input, normalized, None),
        }
    }

    /// Full classification, used when nothing earlier claimed the input.
    fn fallback(
        &mut self,
        input: &str,
        normalized: &str,
        unresolved: Option<String>,
    ) -> (Directive, IntentId) {
        let intent = self.classifier.classify_normalized(normalized);
        log::debug!("route: fallback {}", intent);
        let directive = match intent {
            // A question about the active topic is not a task, even with a
            // weak lead in it ("what should i do about it").
            IntentId::CreateTask
                if self.slots.has_lead(input) && !(unresolved.is_some() && is_question(normalized)) =>
            {
                self.context.clear_topic();
                self.task_directive(input)
            }
            IntentId::GetTips if self.asks_for_tips(normalized) => match self.context.active() {
                Some(topic) => self.tip_directive(topic),
                None => Directive::TipNeedsTopic,
            },
            IntentId::Exit => Directive::ExitRequested,
            IntentId::Help => Directive::HelpRequested,
            other if IntentId::MANAGEMENT.contains(&other) => Directive::Command(other),
            _ => match unresolved {
                Some(message) => Directive::FollowUpText(message),
                None => Directive::UnknownInput,
            },
        };
        let intent = match directive {
            Directive::UnknownInput => IntentId::Unknown,
            Directive::FollowUpText(_) => IntentId::DiscussTopic,
            _ => intent,
        };
        (directive, intent)
    }

    /// The topic named after a favourite-topic phrase, if any.
    fn favourite_topic(&self, normalized: &str) -> Option<TopicId> {
        let rest = self.lexicon.favourite_leads.iter().find_map(|lead| {
            let at = normalized.find(lead.as_str())?;
            Some(&normalized[at + lead.len()..])
        })?;
        self.lexicon.topics.first_match(rest)
    }

    /// `tip`/`tips` count only as whole words; other tip phrases
    /// ("advice", "best practices") match as substrings.
    fn asks_for_tips(&self, normalized: &str) -> bool {
        self.context.is_tip_request(normalized)
            || self
                .classifier
                .phrases(IntentId::GetTips)
                .iter()
                .filter(|p| !self.lexicon.tip_words.contains(*p))
                .any(|p| normalized.contains(p.as_str()))
    }

    fn task_directive(&self, input: &str) -> Directive {
        let extracted = self.slots.extract(input);
        match extracted.task_name {
            Some(name) => Directive::TaskSlots { name, time_expression: extracted.time_expression },
            None => Directive::TaskNameMissing,
        }
    }

    fn tip_directive(&mut self, topic: TopicId) -> Directive {
        Directive::TipText(self.tips.next_tip(topic).text().to_string())
    }
}

const QUESTION_WORDS: [&str; 10] = ["what", "how", "why", "when", "where", "which", "who", "can", "could", "should"];

fn is_question(normalized: &str) -> bool {
    normalized.ends_with('?')
        || normalize::tokenize(normalized).first().is_some_and(|w| QUESTION_WORDS.contains(w))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
