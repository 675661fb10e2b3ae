//! Mood detection.
//!
//! A small cue-word scan: the first mood (in vocabulary order) with a cue
//! contained in the normalized input is attached to the turn, and the shell
//! prints one of that mood's empathy replies ahead of the answer.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::nl::vocab::MoodEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Worried,
    Frustrated,
    Curious,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sentiment::Worried => "worried",
            Sentiment::Frustrated => "frustrated",
            Sentiment::Curious => "curious",
        };
        f.write_str(s)
    }
}

/// Detects moods and picks empathy replies.
#[derive(Debug, Clone)]
pub struct SentimentDetector {
    moods: Vec<MoodEntry>,
}

impl SentimentDetector {
    pub fn new(moods: Vec<MoodEntry>) -> Self {
        let moods = moods
            .into_iter()
            .map(|m| MoodEntry {
                cues: m.cues.into_iter().map(|c| c.to_lowercase()).collect(),
                ..m
            })
            .collect();
        SentimentDetector { moods }
    }

    pub fn detect(&self, normalized: &str) -> Option<Sentiment> {
        self.moods
            .iter()
            .find(|m| m.cues.iter().any(|c| normalized.contains(c.as_str())))
            .map(|m| m.mood)
    }

    /// A random reply for `mood`, or `None` if the mood has no replies.
    pub fn reply<R: Rng>(&self, mood: Sentiment, rng: &mut R) -> Option<&str> {
        self.moods
            .iter()
            .find(|m| m.mood == mood)
            .and_then(|m| m.replies.choose(rng))
            .map(String::as_str)
    }
}
