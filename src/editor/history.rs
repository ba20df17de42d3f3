//! Bounded undo/redo history of drawing snapshots.
//!
//! The history is a list of immutable snapshots with a pointer at the
//! currently visible one. Editing never mutates a stored snapshot: the
//! session clones the current structure, edits the clone and commits it
//! as a new entry, so undo is a pointer move and nothing else.

use crate::constants::MAX_HISTORY;
use crate::types::Structure;

/// One history entry: a structure snapshot plus its rendered SVG.
///
/// `structure` is `None` for the blank canvas the editor starts with
/// (and returns to after a clear).
#[derive(Debug, Clone, Default)]
struct Entry {
    structure: Option<Structure>,
    svg: String,
}

/// The undo/redo history. Holds at most [`MAX_HISTORY`] snapshots;
/// committing beyond that silently drops the oldest one.
#[derive(Debug)]
pub struct History {
    entries: Vec<Entry>,
    pointer: usize,
}

impl History {
    /// Creates a history holding a single blank snapshot.
    pub fn new() -> Self {
        Self {
            entries: vec![Entry::default()],
            pointer: 0,
        }
    }

    /// Commits a new snapshot after the current one.
    ///
    /// Any entries past the pointer (an undone branch) are discarded
    /// first, so redo is no longer possible after a fresh edit.
    pub fn commit(&mut self, structure: Option<Structure>) {
        self.entries.truncate(self.pointer + 1);
        self.entries.push(Entry {
            structure,
            svg: String::new(),
        });
        if self.entries.len() > MAX_HISTORY {
            self.entries.remove(0);
        }
        self.pointer = self.entries.len() - 1;
    }

    /// The structure of the currently visible snapshot.
    pub fn current_structure(&self) -> Option<&Structure> {
        self.entries[self.pointer].structure.as_ref()
    }

    /// The rendered SVG of the currently visible snapshot.
    pub fn current_svg(&self) -> &str {
        &self.entries[self.pointer].svg
    }

    /// Stores the rendered SVG for the currently visible snapshot.
    pub fn set_current_svg(&mut self, svg: String) {
        self.entries[self.pointer].svg = svg;
    }

    /// Moves one snapshot back. Returns `false` when already at the
    /// oldest entry.
    pub fn undo(&mut self) -> bool {
        if self.pointer == 0 {
            return false;
        }
        self.pointer -= 1;
        true
    }

    /// Moves one snapshot forward. Returns `false` when already at the
    /// newest entry.
    pub fn redo(&mut self) -> bool {
        if self.pointer + 1 >= self.entries.len() {
            return false;
        }
        self.pointer += 1;
        true
    }

    /// Number of stored snapshots, the blank one included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when only the initial blank snapshot exists.
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 1 && self.entries[0].structure.is_none()
    }
}

impl Default for History {
    fn default() -> Self {
        History::new()
    }
}
