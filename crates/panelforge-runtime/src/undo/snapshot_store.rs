#![forbid(unsafe_code)]

//! Bounded timeline of shared page snapshots.
//!
//! All snapshots sit in one vector; `head` counts how many of them are
//! applied. Everything before `head` can be stepped back through, everything
//! after it is the redo branch. The snapshot at `head - 1` is current.
//!
//! ```text
//!   entries: [ base | move | resize | style ]
//!                             ^head = 3
//!   undo  -> head = 2, current = move
//!   redo  -> head = 4, current = style
//!   push  -> truncate to head, append, head = len
//! ```
//!
//! Entries are handed out as `Arc` clones: a restore borrows the stored page
//! rather than copying it, and the stored page stays frozen.

use std::fmt;
use std::sync::Arc;

/// Depth limit for a page's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// How many applied snapshots one page keeps, its current state included.
    /// Zero behaves like one.
    pub max_depth: usize,
}

impl SnapshotConfig {
    /// Depth used when an editor config leaves it unset.
    pub const DEFAULT_MAX_DEPTH: usize = 100;

    #[must_use]
    pub const fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    const fn retained(self) -> usize {
        if self.max_depth == 0 { 1 } else { self.max_depth }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_DEPTH)
    }
}

/// Linear undo/redo timeline.
///
/// `head <= entries.len()` always holds, and the applied prefix never grows
/// beyond the configured depth.
pub struct SnapshotStore<T> {
    entries: Vec<Arc<T>>,
    head: usize,
    config: SnapshotConfig,
}

impl<T> fmt::Debug for SnapshotStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("applied", &self.head)
            .field("pending_redo", &(self.entries.len() - self.head))
            .field("max_depth", &self.config.max_depth)
            .finish()
    }
}

impl<T> SnapshotStore<T> {
    #[must_use]
    pub fn new(config: SnapshotConfig) -> Self {
        Self {
            entries: Vec::new(),
            head: 0,
            config,
        }
    }

    /// Record `state` as current. Any redo branch is discarded.
    ///
    /// Returns the number of oldest snapshots dropped to stay within depth.
    pub fn push(&mut self, state: Arc<T>) -> usize {
        self.entries.truncate(self.head);
        self.entries.push(state);
        let evicted = self.entries.len().saturating_sub(self.config.retained());
        if evicted > 0 {
            self.entries.drain(..evicted);
        }
        self.head = self.entries.len();
        evicted
    }

    /// Move one step back and return the snapshot that became current.
    ///
    /// The oldest applied snapshot is the floor; it is never undone.
    pub fn undo(&mut self) -> Option<Arc<T>> {
        if !self.can_undo() {
            return None;
        }
        self.head -= 1;
        self.current().cloned()
    }

    /// Re-apply the next snapshot of the redo branch.
    pub fn redo(&mut self) -> Option<Arc<T>> {
        if !self.can_redo() {
            return None;
        }
        self.head += 1;
        self.current().cloned()
    }

    #[must_use]
    pub fn current(&self) -> Option<&Arc<T>> {
        self.head.checked_sub(1).and_then(|at| self.entries.get(at))
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.head > 1
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.head < self.entries.len()
    }

    /// Applied snapshots, current included.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.head
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.entries.len() - self.head
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head == 0
    }

    #[must_use]
    pub const fn config(&self) -> SnapshotConfig {
        self.config
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.head = 0;
    }
}
