//! Terminal UI primitives: colors, icons, and reply formatting.
//!
//! Raw ANSI escape codes, no terminal crate. Respects the `NO_COLOR`
//! environment variable (https://no-color.org/) and `TERM=dumb`.

use std::sync::OnceLock;

use crate::session::{Reply, ReplyLine, Tone};

// ---------------------------------------------------------------------------
// Color support detection
// ---------------------------------------------------------------------------

/// Returns `true` if color output is enabled.
pub fn color_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| {
        if std::env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if let Ok(term) = std::env::var("TERM") {
            if term == "dumb" {
                return false;
            }
        }
        true
    })
}

// ---------------------------------------------------------------------------
// ANSI escape helpers
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const ITALIC: &str = "\x1b[3m";

const FG_RED: &str = "\x1b[31m";
const FG_GREEN: &str = "\x1b[32m";
const FG_YELLOW: &str = "\x1b[33m";
const FG_MAGENTA: &str = "\x1b[35m";
const FG_CYAN: &str = "\x1b[36m";
const FG_WHITE: &str = "\x1b[37m";

fn styled(codes: &[&str], text: &str) -> String {
    if !color_enabled() || codes.is_empty() {
        return text.to_string();
    }
    let prefix: String = codes.iter().copied().collect();
    format!("{}{}{}", prefix, text, RESET)
}

pub fn bold(text: &str) -> String { styled(&[BOLD], text) }
pub fn dim(text: &str) -> String { styled(&[DIM], text) }
pub fn italic(text: &str) -> String { styled(&[ITALIC], text) }

pub fn red(text: &str) -> String { styled(&[FG_RED], text) }
pub fn green(text: &str) -> String { styled(&[FG_GREEN], text) }
pub fn yellow(text: &str) -> String { styled(&[FG_YELLOW], text) }
pub fn magenta(text: &str) -> String { styled(&[FG_MAGENTA], text) }
pub fn cyan(text: &str) -> String { styled(&[FG_CYAN], text) }

pub fn bold_red(text: &str) -> String { styled(&[BOLD, FG_RED], text) }
pub fn bold_green(text: &str) -> String { styled(&[BOLD, FG_GREEN], text) }
pub fn bold_yellow(text: &str) -> String { styled(&[BOLD, FG_YELLOW], text) }
pub fn bold_magenta(text: &str) -> String { styled(&[BOLD, FG_MAGENTA], text) }
pub fn bold_cyan(text: &str) -> String { styled(&[BOLD, FG_CYAN], text) }
pub fn bold_white(text: &str) -> String { styled(&[BOLD, FG_WHITE], text) }

// ---------------------------------------------------------------------------
// Icons
// ---------------------------------------------------------------------------

pub mod icon {
    pub const OK: &str = "✓";
    pub const FAIL: &str = "✗";
    pub const WARN: &str = "△";
    pub const INFO: &str = "◆";
    pub const TIP: &str = "◇";
    pub const HEART: &str = "♥";
    pub const BULLET: &str = "▸";
    pub const SECTION: &str = "▰";
    pub const PROMPT: &str = "›";
}

// ---------------------------------------------------------------------------
// Formatting primitives
// ---------------------------------------------------------------------------

/// Compact banner.
///
/// ```text
/// ▰ CYBERAWARE v0.1.0 - Cybersecurity Awareness Assistant
/// ```
pub fn banner(name: &str, version: &str, subtitle: &str) -> String {
    if subtitle.is_empty() {
        format!("{} {} {}", bold_cyan(icon::SECTION), bold_white(name), dim(version))
    } else {
        format!(
            "{} {} {} {} {}",
            bold_cyan(icon::SECTION),
            bold_white(name),
            dim(version),
            dim("-"),
            dim(subtitle),
        )
    }
}

/// Section header with a horizontal rule.
pub fn section(title: &str) -> String {
    let rule_len = 48usize.saturating_sub(title.chars().count() + 6);
    format!("{} {} {}", dim("──"), bold_white(title), dim(&"─".repeat(rule_len)))
}

pub fn bullet(text: &str) -> String {
    format!("  {} {}", dim(icon::BULLET), text)
}

pub fn error(msg: &str) -> String {
    format!("{} {}", bold_red(icon::FAIL), red(msg))
}

pub fn warning(msg: &str) -> String {
    format!("{} {}", bold_yellow(icon::WARN), yellow(msg))
}

pub fn info(msg: &str) -> String {
    format!("{} {}", bold_cyan(icon::INFO), cyan(msg))
}

pub fn success(msg: &str) -> String {
    format!("{} {}", bold_green(icon::OK), green(msg))
}

pub fn tip(msg: &str) -> String {
    format!("{} {}", bold_magenta(icon::TIP), msg)
}

pub fn empathy(msg: &str) -> String {
    format!("{} {}", magenta(icon::HEART), italic(msg))
}

pub fn rule() -> String {
    dim(&"─".repeat(52))
}

/// Compact prompt string for the REPL.
pub fn prompt() -> String {
    if color_enabled() {
        format!("{}{}{} ", BOLD, FG_CYAN, icon::PROMPT)
    } else {
        format!("{} ", icon::PROMPT)
    }
}

/// Reset code (for use after prompt where we don't want to reset inline).
pub fn reset() -> &'static str {
    if color_enabled() { RESET } else { "" }
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

pub fn render_line(line: &ReplyLine) -> String {
    match line.tone {
        Tone::Plain => line.text.clone(),
        Tone::Title => bold(&line.text),
        Tone::Tip => tip(&line.text),
        Tone::Success => success(&line.text),
        Tone::Warning => warning(&line.text),
        Tone::Empathy => empathy(&line.text),
        Tone::Item => bullet(&line.text),
    }
}

/// A whole reply, one rendered line per reply line.
pub fn render(reply: &Reply) -> String {
    reply.lines.iter().map(render_line).collect::<Vec<_>>().join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
