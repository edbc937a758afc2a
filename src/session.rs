//! Cross-invocation state: the bounded history of submitted expressions and
//! the in-progress draft used to prefill the next prompt.
//!
//! A `Session` is plain data owned by the caller and passed to the
//! [`Executor`](crate::engine::Executor) by `&mut`. Sharing one session
//! between concurrent runs is undefined; hosts run one pipeline at a time.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;

pub const DEFAULT_HISTORY_LIMIT: usize = 24;

const HISTORY_FILE: &str = "history";
const DRAFT_FILE: &str = "draft";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    draft: String,
    history: VecDeque<String>,
    limit: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl Session {
    pub fn new(limit: usize) -> Self {
        Self {
            draft: String::new(),
            history: VecDeque::new(),
            limit,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn reset_draft(&mut self) {
        self.draft.clear();
    }

    /// Add `command` to the draft as a new pipeline stage.
    ///
    /// `""` becomes `"rev "`, and `"rev "` becomes `"rev  | dupl "`; the
    /// trailing space leaves the cursor ready for arguments.
    pub fn compose(&mut self, command: &str) -> &str {
        if self.draft.len() > 1 {
            self.draft.push_str(" | ");
        }
        self.draft.push_str(command);
        self.draft.push(' ');
        &self.draft
    }

    /// Oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    pub fn history_entry(&self, index: usize) -> Option<&str> {
        self.history.get(index).map(String::as_str)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Append an expression, evicting the oldest entries past the limit.
    pub fn push_history(&mut self, expression: &str) {
        if self.limit == 0 {
            return;
        }
        self.history.push_back(expression.to_string());
        while self.history.len() > self.limit {
            self.history.pop_front();
        }
    }

    /// Read `history` and `draft` from `dir`. Missing files are empty.
    pub fn load(dir: &Path, limit: usize) -> io::Result<Self> {
        let mut session = Self::new(limit);
        if let Some(text) = read_optional(&dir.join(HISTORY_FILE))? {
            for line in text.lines().filter(|l| !l.trim().is_empty()) {
                session.push_history(line);
            }
        }
        if let Some(draft) = read_optional(&dir.join(DRAFT_FILE))? {
            session.draft = draft;
        }
        Ok(session)
    }

    /// Write `history` (one expression per line) and `draft` into `dir`,
    /// creating it if needed.
    pub fn save(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)?;
        let mut history = String::new();
        for entry in &self.history {
            // Expressions are single-line; fold any stray newline into a space.
            history.push_str(&entry.replace('\n', " "));
            history.push('\n');
        }
        fs::write(dir.join(HISTORY_FILE), history)?;
        fs::write(dir.join(DRAFT_FILE), &self.draft)?;
        log::debug!("session: saved {} history entries to {}", self.history.len(), dir.display());
        Ok(())
    }
}

fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
