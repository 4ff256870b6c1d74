//! # Session Undo Stacks
//!
//! Tracks the last few edits per browser session so an operator can
//! step back through their own changes.
//!
//! ## Design
//!
//! - Each applied edit records the lines it replaced
//! - Undo pops the most recent entry and splices those lines back
//! - Stacks are bounded; the oldest entry is dropped when full
//! - Undoing is itself an edit and flows through the history chain
//!
//! ## Example
//!
//! ```rust,ignore
//! let store = MemoryUndoStore::new();
//! store.push("session-1", entry);
//!
//! if let Some(entry) = store.pop("session-1") {
//!     // splice entry.original_lines back into the page
//! }
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Default maximum number of undo levels kept per session
pub const MAX_UNDO_LEVELS: usize = 20;

/// One reversible edit: the lines a replacement overwrote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoEntry {
    /// Page the edit touched, relative to the site root
    pub rel_path: String,

    /// First line of the replaced span (0-based)
    pub span_start: usize,

    /// Number of lines the edit occupies after applying
    pub span_len: usize,

    /// The lines as they were before the edit
    pub original_lines: Vec<String>,
}

/// Bounded LIFO stack of undo entries
#[derive(Debug)]
pub struct UndoStack {
    /// Applied edits (most recent last)
    entries: Vec<UndoEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create a stack with the default level cap
    pub fn new() -> Self {
        Self::with_max_levels(MAX_UNDO_LEVELS)
    }

    /// Create a stack with a custom level cap
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_levels,
        }
    }

    /// Push an entry, dropping the oldest when over the cap
    pub fn push(&mut self, entry: UndoEntry) {
        self.entries.push(entry);

        if self.max_levels > 0 && self.entries.len() > self.max_levels {
            self.entries.remove(0);
        }
    }

    /// Pop the most recent entry
    pub fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop()
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Get the number of undo levels available
    pub fn depth(&self) -> usize {
        self.entries.len()
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Keyed undo storage, one stack per session
pub trait SessionUndoStore: Send + Sync {
    /// Record an applied edit for a session
    fn push(&self, session: &str, entry: UndoEntry);

    /// Take the session's most recent entry
    fn pop(&self, session: &str) -> Option<UndoEntry>;

    /// Drop a session's stack entirely
    fn evict(&self, session: &str);

    /// Number of entries held for a session
    fn depth(&self, session: &str) -> usize;
}

/// In-memory session store
#[derive(Debug, Default)]
pub struct MemoryUndoStore {
    stacks: Mutex<HashMap<String, UndoStack>>,
}

impl MemoryUndoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionUndoStore for MemoryUndoStore {
    fn push(&self, session: &str, entry: UndoEntry) {
        let mut stacks = self.stacks.lock().unwrap();
        stacks.entry(session.to_string()).or_default().push(entry);
    }

    fn pop(&self, session: &str) -> Option<UndoEntry> {
        let mut stacks = self.stacks.lock().unwrap();
        stacks.get_mut(session).and_then(UndoStack::pop)
    }

    fn evict(&self, session: &str) {
        let mut stacks = self.stacks.lock().unwrap();
        stacks.remove(session);
    }

    fn depth(&self, session: &str) -> usize {
        let stacks = self.stacks.lock().unwrap();
        stacks.get(session).map(UndoStack::depth).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str) -> UndoEntry {
        UndoEntry {
            rel_path: "index.html".to_string(),
            span_start: 3,
            span_len: 1,
            original_lines: vec![format!("<li>{}</li>", text)],
        }
    }

    #[test]
    fn test_stack_is_lifo() {
        let mut stack = UndoStack::new();
        stack.push(entry("a"));
        stack.push(entry("b"));

        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.pop().unwrap().original_lines[0], "<li>b</li>");
        assert_eq!(stack.pop().unwrap().original_lines[0], "<li>a</li>");
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut stack = UndoStack::with_max_levels(2);
        for i in 0..3 {
            stack.push(entry(&i.to_string()));
        }

        // Oldest entry dropped, newest two retained
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.pop().unwrap().original_lines[0], "<li>2</li>");
        assert_eq!(stack.pop().unwrap().original_lines[0], "<li>1</li>");
    }

    #[test]
    fn test_store_keeps_sessions_apart() {
        let store = MemoryUndoStore::new();
        store.push("alice", entry("a"));
        store.push("bob", entry("b"));

        assert_eq!(store.depth("alice"), 1);
        assert_eq!(store.pop("bob").unwrap().original_lines[0], "<li>b</li>");
        assert_eq!(store.depth("bob"), 0);
        assert_eq!(store.depth("alice"), 1);
    }

    #[test]
    fn test_evict_clears_session() {
        let store = MemoryUndoStore::new();
        store.push("alice", entry("a"));
        store.evict("alice");

        assert!(store.pop("alice").is_none());
    }

    #[test]
    fn test_default_cap_is_twenty() {
        let store = MemoryUndoStore::new();
        for i in 0..25 {
            store.push("alice", entry(&i.to_string()));
        }

        assert_eq!(store.depth("alice"), MAX_UNDO_LEVELS);
    }
}
