//! Slot extraction for task creation.
//!
//! Two slots are pulled from loosely worded sentences:
//! - **task name**: the text after the first matching lead phrase
//!   ("remind me to", "add task", ... then the weaker "need to", "should"),
//!   up to a " in " time clause, with trailing filler words and punctuation
//!   stripped. Case is preserved ("enable 2FA").
//! - **time expression**: the first match of an ordered list of time
//!   patterns, returned verbatim (lowercased). Resolving it to an instant
//!   is `when::resolve_due`'s job.

use regex::Regex;
use std::sync::OnceLock;

use crate::nl::vocab::Lexicon;
use crate::types::Result;

/// Structured result of one extraction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedSlots {
    pub task_name: Option<String>,
    pub time_expression: Option<String>,
}

// ---------------------------------------------------------------------------
// Time patterns
// ---------------------------------------------------------------------------

/// Ordered: the first pattern that matches anywhere wins.
const TIME_PATTERNS: [&str; 10] = [
    r"\b\d{1,2}:\d{2}(?:\s*[ap]m\b)?",
    r"\b\d{1,2}\s*[ap]m\b",
    r"\btomorrow\b",
    r"\btoday\b",
    r"\bnext week\b",
    r"\bin \d+\s*(?:minutes?|mins?|hours?|days?|weeks?)\b",
    r"\b\d+\s*(?:minutes?|mins?|hours?|days?|weeks?)\s*from now\b",
    r"\bthis (?:morning|afternoon|evening)\b",
    r"\btonight\b",
    r"\b(?:morning|afternoon|evening|night)\b",
];

fn time_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        TIME_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("time pattern must compile"))
            .collect()
    })
}

/// The time patterns anchored at the end, case-insensitive, for cutting a
/// trailing time off a task name without lowercasing it.
fn trailing_time_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        TIME_PATTERNS
            .iter()
            .map(|p| Regex::new(&format!(r"(?i)(?:{})$", p)).expect("time pattern must compile"))
            .collect()
    })
}

fn time_clause() -> &'static Regex {
    static CLAUSE: OnceLock<Regex> = OnceLock::new();
    CLAUSE.get_or_init(|| Regex::new(r"(?i)\s+in\s+").expect("time clause pattern must compile"))
}

/// Return the first time expression found in `input`, lowercased and trimmed.
pub fn extract_time_expression(input: &str) -> Option<String> {
    let lowered = input.to_lowercase();
    time_patterns()
        .iter()
        .find_map(|re| re.find(&lowered))
        .map(|m| m.as_str().trim().to_string())
}

/// Words left dangling once a trailing time expression is removed.
const TIME_CONNECTORS: [&str; 4] = ["at", "by", "on", "this"];

const TRAILING_PUNCTUATION: [char; 6] = ['.', '!', '?', ',', ';', ':'];

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SlotExtractor {
    explicit: Vec<Regex>,
    implicit: Vec<Regex>,
    fillers: Vec<Regex>,
}

impl SlotExtractor {
    /// Compile lead phrases (in priority order) and trailing fillers.
    pub fn new(explicit: &[String], implicit: &[String], fillers: &[String]) -> Result<Self> {
        let lead = |p: &String| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(p)));
        let filler = |f: &String| Regex::new(&format!(r"(?i)(?:^|\s){}$", regex::escape(f)));
        Ok(SlotExtractor {
            explicit: explicit.iter().map(lead).collect::<std::result::Result<_, _>>()?,
            implicit: implicit.iter().map(lead).collect::<std::result::Result<_, _>>()?,
            fillers: fillers.iter().map(filler).collect::<std::result::Result<_, _>>()?,
        })
    }

    pub fn from_lexicon(lex: &Lexicon) -> Result<Self> {
        SlotExtractor::new(&lex.explicit_leads, &lex.implicit_leads, &lex.task_fillers)
    }

    /// True if `input` contains an explicit task lead phrase.
    pub fn has_explicit_lead(&self, input: &str) -> bool {
        self.explicit.iter().any(|re| re.is_match(input))
    }

    /// True if `input` contains any task lead phrase.
    pub fn has_lead(&self, input: &str) -> bool {
        self.has_explicit_lead(input) || self.implicit.iter().any(|re| re.is_match(input))
    }

    /// Extract both slots.
    pub fn extract(&self, input: &str) -> ExtractedSlots {
        ExtractedSlots {
            task_name: self.extract_task_name(input),
            time_expression: extract_time_expression(input),
        }
    }

    /// The task name after the highest-priority lead phrase, if any.
    pub fn extract_task_name(&self, input: &str) -> Option<String> {
        let input = input.trim();
        let lead_end = self
            .explicit
            .iter()
            .chain(self.implicit.iter())
            .find_map(|re| re.find(input))
            .map(|m| m.end())?;

        let rest = &input[lead_end..];
        let rest = match time_clause().find(rest) {
            Some(m) => &rest[..m.start()],
            None => rest,
        };
        self.clean(rest)
    }

    fn clean(&self, raw: &str) -> Option<String> {
        let mut name = raw
            .trim()
            .trim_start_matches(|c: char| c == ':' || c == '-' || c == ',')
            .trim_start()
            .to_string();
        if name.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("to ")) {
            name = name[3..].trim_start().to_string();
        }

        loop {
            let before = name.clone();

            name = name.trim_end_matches(TRAILING_PUNCTUATION).trim_end().to_string();
            for re in &self.fillers {
                if let Some(m) = re.find(&name) {
                    name.truncate(m.start());
                }
            }
            self.strip_trailing_time(&mut name);
            name = name.trim().to_string();

            if name == before {
                break;
            }
        }

        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Drop a time expression (and its connector word) ending the name.
    fn strip_trailing_time(&self, name: &mut String) {
        let Some(start) = trailing_time_patterns().iter().find_map(|re| re.find(name.as_str())).map(|m| m.start())
        else {
            return;
        };
        name.truncate(start);
        let trimmed = name.trim_end();
        let cut = TIME_CONNECTORS.iter().find_map(|connector| {
            let at = trimmed.len().checked_sub(connector.len())?;
            let word = trimmed.get(at..)?;
            let bounded = at == 0 || trimmed[..at].ends_with(' ');
            (bounded && word.eq_ignore_ascii_case(connector)).then_some(at)
        });
        if let Some(at) = cut {
            name.truncate(at);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
