//! Dialogue vocabulary loader.
//!
//! All static dialogue data lives in two YAML files:
//!
//! - `nl_vocab.yaml`: intent phrases, task lead phrases, filler words,
//!   follow-up cues, tip words, the unresolved-follow-up message and mood cues;
//! - `topics.yaml`: per-topic keywords, overview text, follow-up details
//!   and tips.
//!
//! Both use the disk-first + `include_str!` fallback pattern: a file in the
//! configured vocabulary directory wins, a missing file silently falls back
//! to the embedded copy, and a file that fails to parse falls back with a
//! warning.

use serde::Deserialize;
use std::path::Path;

use crate::nl::keywords::KeywordTable;
use crate::nl::sentiment::Sentiment;
use crate::types::{Aspect, EngineError, IntentId, Result, TopicId};

// ---------------------------------------------------------------------------
// Embedded fallback
// ---------------------------------------------------------------------------

const EMBEDDED_VOCAB: &str = include_str!("../../data/nl/nl_vocab.yaml");
const EMBEDDED_TOPICS: &str = include_str!("../../data/nl/topics.yaml");

pub const VOCAB_FILE: &str = "nl_vocab.yaml";
pub const TOPICS_FILE: &str = "topics.yaml";

// ---------------------------------------------------------------------------
// YAML schema types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct VocabYaml {
    intents: Vec<IntentEntry>,
    task_leads: TaskLeadsYaml,
    task_fillers: Vec<String>,
    follow_up: FollowUpYaml,
    tip_words: Vec<String>,
    unresolved: String,
    #[serde(default)]
    favourite_leads: Vec<String>,
    #[serde(default)]
    sentiments: Vec<MoodEntry>,
}

#[derive(Debug, Deserialize)]
struct IntentEntry {
    intent: IntentId,
    phrases: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TaskLeadsYaml {
    explicit: Vec<String>,
    implicit: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FollowUpYaml {
    more: Vec<String>,
    how: Vec<String>,
    avoid: Vec<String>,
    example: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TopicsYaml {
    topics: Vec<TopicEntry>,
}

#[derive(Debug, Deserialize)]
struct TopicEntry {
    topic: TopicId,
    title: String,
    keywords: Vec<String>,
    info: String,
    #[serde(default)]
    details: Vec<DetailEntry>,
    tips: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DetailEntry {
    aspect: Aspect,
    text: String,
}

/// Cue words and empathy replies for one mood.
#[derive(Debug, Clone, Deserialize)]
pub struct MoodEntry {
    pub mood: Sentiment,
    pub cues: Vec<String>,
    pub replies: Vec<String>,
}

// ---------------------------------------------------------------------------
// Runtime vocabulary
// ---------------------------------------------------------------------------

/// Everything the dialogue core knows about one topic.
#[derive(Debug, Clone)]
pub struct TopicContent {
    pub topic: TopicId,
    pub title: String,
    pub info: String,
    /// Follow-up answers, in the order they are tried.
    pub details: Vec<(Aspect, String)>,
    pub tips: Vec<String>,
}

/// Loaded and validated dialogue vocabulary.
#[derive(Debug, Clone)]
pub struct Lexicon {
    pub intents: KeywordTable<IntentId>,
    pub topics: KeywordTable<TopicId>,
    pub follow_up: KeywordTable<Aspect>,
    /// Task lead phrases that always mean "create a task".
    pub explicit_leads: Vec<String>,
    /// Weaker lead phrases, honoured only when nothing else claims the input.
    pub implicit_leads: Vec<String>,
    pub task_fillers: Vec<String>,
    pub tip_words: Vec<String>,
    /// Message template for an unresolved follow-up; `{topic}` is replaced.
    pub unresolved: String,
    /// Phrases introducing the user's favourite topic ("my favourite topic is").
    pub favourite_leads: Vec<String>,
    pub moods: Vec<MoodEntry>,
    /// Indexed by `TopicId` declaration order.
    content: Vec<TopicContent>,
}

impl Lexicon {
    /// Load from `dir` if given, falling back to the embedded data per file.
    pub fn load(dir: Option<&Path>) -> Result<Lexicon> {
        let vocab = read_or_embedded(dir, VOCAB_FILE, EMBEDDED_VOCAB);
        let topics = read_or_embedded(dir, TOPICS_FILE, EMBEDDED_TOPICS);

        match Lexicon::parse(&vocab, &topics) {
            Ok(lex) => Ok(lex),
            Err(e) if dir.is_some() => {
                log::warn!("failed to load vocabulary from disk ({}), using embedded", e);
                Lexicon::embedded()
            }
            Err(e) => Err(e),
        }
    }

    /// The vocabulary compiled into the binary.
    pub fn embedded() -> Result<Lexicon> {
        Lexicon::parse(EMBEDDED_VOCAB, EMBEDDED_TOPICS)
    }

    /// Parse and validate both YAML documents.
    pub fn parse(vocab_yaml: &str, topics_yaml: &str) -> Result<Lexicon> {
        let raw: VocabYaml = serde_yaml::from_str(vocab_yaml)?;
        let raw_topics: TopicsYaml = serde_yaml::from_str(topics_yaml)?;
        if raw.task_leads.explicit.iter().all(|p| p.trim().is_empty()) {
            return Err(EngineError::Vocab("no explicit task lead phrases".into()));
        }

        let intents = KeywordTable::new(
            "intent",
            raw.intents.into_iter().map(|e| (e.intent, e.phrases)).collect(),
        )?;
        for required in [IntentId::Exit, IntentId::Help] {
            if intents.phrases(required).is_empty() {
                return Err(EngineError::Vocab(format!("intent '{}' has no phrases", required)));
            }
        }
        if !intents.phrases(IntentId::Unknown).is_empty() {
            return Err(EngineError::Vocab("intent 'unknown' must not have phrases".into()));
        }

        let follow_up = KeywordTable::new(
            "follow-up",
            vec![
                (Aspect::More, raw.follow_up.more),
                (Aspect::How, raw.follow_up.how),
                (Aspect::Avoid, raw.follow_up.avoid),
                (Aspect::Example, raw.follow_up.example),
            ],
        )?;

        let mut keyword_entries = Vec::with_capacity(raw_topics.topics.len());
        let mut content: Vec<Option<TopicContent>> = vec![None; TopicId::ALL.len()];
        for entry in raw_topics.topics {
            if entry.tips.is_empty() {
                return Err(EngineError::Vocab(format!("topic '{}' has no tips", entry.topic)));
            }
            keyword_entries.push((entry.topic, entry.keywords));
            content[entry.topic as usize] = Some(TopicContent {
                topic: entry.topic,
                title: entry.title,
                info: entry.info,
                details: entry.details.into_iter().map(|d| (d.aspect, d.text)).collect(),
                tips: entry.tips,
            });
        }
        // Duplicate topics are caught here, before the content check.
        let topics = KeywordTable::new("topic", keyword_entries)?;

        let content = content
            .into_iter()
            .zip(TopicId::ALL)
            .map(|(c, topic)| {
                c.ok_or_else(|| EngineError::Vocab(format!("topic '{}' has no content", topic)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Lexicon {
            intents,
            topics,
            follow_up,
            explicit_leads: lowercase_all(raw.task_leads.explicit),
            implicit_leads: lowercase_all(raw.task_leads.implicit),
            task_fillers: lowercase_all(raw.task_fillers),
            tip_words: lowercase_all(raw.tip_words),
            unresolved: raw.unresolved,
            favourite_leads: lowercase_all(raw.favourite_leads),
            moods: raw.sentiments,
            content,
        })
    }

    /// Content for `topic`. Every topic is present after validation.
    pub fn content(&self, topic: TopicId) -> &TopicContent {
        &self.content[topic as usize]
    }

    /// Exit words, matched as whole tokens.
    pub fn exit_words(&self) -> &[String] {
        self.intents.phrases(IntentId::Exit)
    }

    /// The unresolved-follow-up message for `topic`.
    pub fn unresolved_message(&self, topic: TopicId) -> String {
        self.unresolved.replace("{topic}", topic.label())
    }
}

fn lowercase_all(list: Vec<String>) -> Vec<String> {
    list.into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn read_or_embedded(dir: Option<&Path>, file: &str, embedded: &str) -> String {
    dir.map(|d| d.join(file))
        .and_then(|path| match std::fs::read_to_string(&path) {
            Ok(text) => {
                log::debug!("loaded {} from {}", file, path.display());
                Some(text)
            }
            Err(_) => None,
        })
        .unwrap_or_else(|| embedded.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
