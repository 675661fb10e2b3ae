// ---------------------------------------------------------------------------
// line_editor: rustyline wrapper for the chat REPL
// ---------------------------------------------------------------------------
//
// Readline-style editing for the conversation prompt:
//   - Up/Down arrow: history cycling
//   - Ctrl-A / Ctrl-E: beginning / end of line
//   - Ctrl-D: EOF (leave the chat)
//   - Ctrl-C: interrupt (re-prompt)
//
// History is persisted to ~/.cyberaware_history (max 500 entries) unless
// disabled in settings.

use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor, EditMode};
use std::path::PathBuf;

use crate::types::{EngineError, Result};

const MAX_HISTORY: usize = 500;

/// History file name (stored in the user's home directory).
const HISTORY_FILE: &str = ".cyberaware_history";

/// Result of a single line read.
pub enum ReadResult {
    Line(String),
    /// Ctrl-C.
    Interrupted,
    /// Ctrl-D or stdin closed.
    Eof,
}

pub struct LineEditor {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
}

impl LineEditor {
    /// Emacs-mode editor. With `history`, loads `~/.cyberaware_history`;
    /// a missing or unreadable file starts empty.
    pub fn new(history: bool) -> Result<Self> {
        let config = Config::builder()
            .edit_mode(EditMode::Emacs)
            .max_history_size(MAX_HISTORY)
            .map_err(readline_error)?
            .auto_add_history(false)
            .build();

        let mut editor = DefaultEditor::with_config(config).map_err(readline_error)?;

        let history_path = if history { dirs_home().map(|home| home.join(HISTORY_FILE)) } else { None };
        if let Some(ref path) = history_path {
            if let Err(e) = editor.load_history(path) {
                log::debug!("no history loaded from {}: {}", path.display(), e);
            }
        }

        Ok(LineEditor { editor, history_path })
    }

    /// Read a line with the given prompt (ANSI codes allowed).
    pub fn read_line(&mut self, prompt: &str) -> ReadResult {
        match self.editor.readline(prompt) {
            Ok(line) => ReadResult::Line(line),
            Err(ReadlineError::Interrupted) => ReadResult::Interrupted,
            Err(ReadlineError::Eof) => ReadResult::Eof,
            Err(e) => {
                log::warn!("line editor: {}", e);
                ReadResult::Eof
            }
        }
    }

    /// Remember a line and persist history.
    pub fn add_history(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        let _ = self.editor.add_history_entry(line);
        self.save_history();
    }

    pub fn save_history(&mut self) {
        if let Some(ref path) = self.history_path {
            if let Err(e) = self.editor.save_history(path) {
                log::debug!("could not save history to {}: {}", path.display(), e);
            }
        }
    }
}

fn readline_error(e: ReadlineError) -> EngineError {
    EngineError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
