//! Per-topic tip rotation.
//!
//! Each topic has an immutable `original` list and a `remaining` list that
//! starts as a copy of it. A draw removes one entry at a uniformly random
//! index, so `remaining` is always a subsequence of `original` without
//! repeats. Drawing from an empty pool refills it and reports
//! [`TipDraw::Refreshed`] instead of a tip; the next draw starts a new cycle.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::nl::vocab::Lexicon;
use crate::types::TopicId;

/// Text shown when a pool has been refilled.
pub const REFRESHED_MESSAGE: &str = "No more tips available. Tips have been refreshed.";

/// Result of one draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TipDraw {
    Tip(String),
    /// The pool was exhausted and has been refilled; no tip this call.
    Refreshed,
    /// The topic has no tips at all.
    Unavailable,
}

impl TipDraw {
    /// Display text for the draw.
    pub fn text(&self) -> &str {
        match self {
            TipDraw::Tip(t) => t,
            TipDraw::Refreshed => REFRESHED_MESSAGE,
            TipDraw::Unavailable => "I don't have any tips on that topic yet.",
        }
    }
}

#[derive(Debug, Clone)]
struct TipPool {
    original: Vec<String>,
    remaining: Vec<String>,
}

/// Serves non-repeating tips per topic.
#[derive(Debug)]
pub struct TipRotator<R: Rng = StdRng> {
    /// Indexed by `TopicId` declaration order.
    pools: Vec<TipPool>,
    rng: R,
}

impl TipRotator<StdRng> {
    /// Rotator seeded from OS entropy.
    pub fn new(lex: &Lexicon) -> Self {
        TipRotator::with_rng(lex, StdRng::from_entropy())
    }

    /// Rotator with a fixed seed, for reproducible sessions and tests.
    pub fn seeded(lex: &Lexicon, seed: u64) -> Self {
        TipRotator::with_rng(lex, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> TipRotator<R> {
    pub fn with_rng(lex: &Lexicon, rng: R) -> Self {
        let pools = TopicId::ALL
            .iter()
            .map(|t| {
                let original = lex.content(*t).tips.clone();
                TipPool { remaining: original.clone(), original }
            })
            .collect();
        TipRotator { pools, rng }
    }

    /// Draw the next tip for `topic`.
    pub fn next_tip(&mut self, topic: TopicId) -> TipDraw {
        let pool = &mut self.pools[topic as usize];
        if pool.original.is_empty() {
            return TipDraw::Unavailable;
        }
        if pool.remaining.is_empty() {
            pool.remaining = pool.original.clone();
            log::debug!("tips: {} pool refreshed", topic);
            return TipDraw::Refreshed;
        }
        let idx = self.rng.gen_range(0..pool.remaining.len());
        TipDraw::Tip(pool.remaining.remove(idx))
    }

    /// Tips left in the current cycle for `topic`.
    pub fn remaining(&self, topic: TopicId) -> usize {
        self.pools[topic as usize].remaining.len()
    }

    /// Size of the full pool for `topic`.
    pub fn pool_size(&self, topic: TopicId) -> usize {
        self.pools[topic as usize].original.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn rotator(seed: u64) -> (Lexicon, TipRotator) {
        let lex = Lexicon::embedded().unwrap();
        let rot = TipRotator::seeded(&lex, seed);
        (lex, rot)
    }

    fn draw_cycle(rot: &mut TipRotator, topic: TopicId) -> Vec<String> {
        (0..rot.pool_size(topic))
            .map(|_| match rot.next_tip(topic) {
                TipDraw::Tip(t) => t,
                other => panic!("expected a tip, got {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_full_cycle_has_no_repeats() {
        let (lex, mut rot) = rotator(1);
        let tips = draw_cycle(&mut rot, TopicId::Password);
        let unique: HashSet<&String> = tips.iter().collect();
        assert_eq!(unique.len(), tips.len());
        let original: HashSet<&String> = lex.content(TopicId::Password).tips.iter().collect();
        assert_eq!(unique, original);
    }

    #[test]
    fn test_refresh_after_exhaustion() {
        let (_, mut rot) = rotator(2);
        draw_cycle(&mut rot, TopicId::Vpn);
        assert_eq!(rot.remaining(TopicId::Vpn), 0);
        assert_eq!(rot.next_tip(TopicId::Vpn), TipDraw::Refreshed);
        assert_eq!(rot.remaining(TopicId::Vpn), rot.pool_size(TopicId::Vpn));
        let second = draw_cycle(&mut rot, TopicId::Vpn);
        let unique: HashSet<&String> = second.iter().collect();
        assert_eq!(unique.len(), second.len(), "second cycle repeats a tip");
    }

    #[test]
    fn test_pools_are_independent() {
        let (_, mut rot) = rotator(3);
        draw_cycle(&mut rot, TopicId::Malware);
        assert!(matches!(rot.next_tip(TopicId::Firewall), TipDraw::Tip(_)));
        assert_eq!(rot.remaining(TopicId::Malware), 0);
    }

    #[test]
    fn test_same_seed_same_order() {
        let (_, mut a) = rotator(42);
        let (_, mut b) = rotator(42);
        assert_eq!(draw_cycle(&mut a, TopicId::Phishing), draw_cycle(&mut b, TopicId::Phishing));
    }

    #[test]
    fn test_refreshed_text() {
        assert_eq!(TipDraw::Refreshed.text(), REFRESHED_MESSAGE);
        assert_eq!(TipDraw::Tip("x".into()).text(), "x");
    }
}
