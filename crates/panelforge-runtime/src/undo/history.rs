#![forbid(unsafe_code)]

//! Per-page undo/redo history of committed panel lists.
//!
//! Each page has its own [`SnapshotStore`]; entries from every page share one
//! global sequence counter, so the order of commits across pages is total.
//! A page's history starts with a baseline entry recorded when the page is
//! created or loaded. Undo restores whole panel lists, which makes the
//! inverse law trivial: redo hands back the very same `Arc` that undo
//! moved aside.

use std::fmt;
use std::sync::Arc;

use panelforge_layout::{PageId, Panel};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::snapshot_store::{SnapshotConfig, SnapshotStore};

/// What produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitKind {
    Baseline,
    Drag,
    Resize,
    Nudge,
    Geometry,
    AddPanel,
    DuplicatePanel,
    DeletePanel,
    Template,
    Style,
    Content,
    ZOrder,
}

impl fmt::Display for CommitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Baseline => "baseline",
            Self::Drag => "drag",
            Self::Resize => "resize",
            Self::Nudge => "nudge",
            Self::Geometry => "set geometry",
            Self::AddPanel => "add panel",
            Self::DuplicatePanel => "duplicate panel",
            Self::DeletePanel => "delete panel",
            Self::Template => "apply template",
            Self::Style => "panel style",
            Self::Content => "panel content",
            Self::ZOrder => "z-order",
        };
        f.write_str(label)
    }
}

/// Immutable snapshot of one page's panel list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub sequence: u64,
    pub page: PageId,
    pub kind: CommitKind,
    pub panels: Arc<Vec<Panel>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Entries kept per page, baseline included.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: SnapshotConfig::default().max_depth,
        }
    }
}

#[derive(Debug)]
pub struct HistoryManager {
    pages: FxHashMap<PageId, SnapshotStore<HistoryEntry>>,
    config: HistoryConfig,
    last_sequence: u64,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl HistoryManager {
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            pages: FxHashMap::default(),
            config,
            last_sequence: 0,
        }
    }

    #[must_use]
    pub const fn config(&self) -> HistoryConfig {
        self.config
    }

    /// Sequence number of the most recent entry on any page (0 before any).
    #[must_use]
    pub const fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    /// Drop whatever history `page` had and start over from `panels`.
    pub fn reset(&mut self, page: PageId, panels: Vec<Panel>) -> u64 {
        self.store_mut(page).clear();
        self.push(page, CommitKind::Baseline, panels)
    }

    /// Record a committed state; returns its sequence number.
    pub fn push(&mut self, page: PageId, kind: CommitKind, panels: Vec<Panel>) -> u64 {
        self.last_sequence = self.last_sequence.saturating_add(1);
        let entry = HistoryEntry {
            sequence: self.last_sequence,
            page,
            kind,
            panels: Arc::new(panels),
        };
        let evicted = self.store_mut(page).push(Arc::new(entry));
        if evicted > 0 {
            tracing::debug!(page = %page, evicted, "history depth limit reached");
        }
        self.last_sequence
    }

    /// Step `page` back; returns the entry whose panels must be restored.
    pub fn undo(&mut self, page: PageId) -> Option<Arc<HistoryEntry>> {
        self.pages.get_mut(&page)?.undo()
    }

    /// Step `page` forward; returns the entry whose panels must be restored.
    pub fn redo(&mut self, page: PageId) -> Option<Arc<HistoryEntry>> {
        self.pages.get_mut(&page)?.redo()
    }

    #[must_use]
    pub fn current(&self, page: PageId) -> Option<&Arc<HistoryEntry>> {
        self.pages.get(&page)?.current()
    }

    #[must_use]
    pub fn can_undo(&self, page: PageId) -> bool {
        self.pages.get(&page).is_some_and(SnapshotStore::can_undo)
    }

    #[must_use]
    pub fn can_redo(&self, page: PageId) -> bool {
        self.pages.get(&page).is_some_and(SnapshotStore::can_redo)
    }

    #[must_use]
    pub fn undo_depth(&self, page: PageId) -> usize {
        self.pages.get(&page).map_or(0, SnapshotStore::undo_depth)
    }

    #[must_use]
    pub fn redo_depth(&self, page: PageId) -> usize {
        self.pages.get(&page).map_or(0, SnapshotStore::redo_depth)
    }

    /// Forget a deleted page's history.
    pub fn forget(&mut self, page: PageId) {
        self.pages.remove(&page);
    }

    fn store_mut(&mut self, page: PageId) -> &mut SnapshotStore<HistoryEntry> {
        let depth = self.config.max_depth;
        self.pages
            .entry(page)
            .or_insert_with(|| SnapshotStore::new(SnapshotConfig::new(depth)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelforge_layout::{PanelId, Rect};

    fn page(raw: u64) -> PageId {
        PageId::new(raw).unwrap()
    }

    fn panels(x: i32) -> Vec<Panel> {
        vec![Panel::new(
            PanelId::MIN,
            page(1),
            Rect::new(x, 0, 100, 100),
        )]
    }

    fn x_of(entry: &HistoryEntry) -> i32 {
        entry.panels[0].rect.x
    }

    #[test]
    fn undo_and_redo_restore_neighbours() {
        let mut history = HistoryManager::default();
        history.reset(page(1), panels(0));
        history.push(page(1), CommitKind::Drag, panels(10));
        history.push(page(1), CommitKind::Drag, panels(20));

        assert_eq!(history.undo(page(1)).map(|e| x_of(&e)), Some(10));
        assert_eq!(history.undo(page(1)).map(|e| x_of(&e)), Some(0));
        assert!(history.undo(page(1)).is_none());
        assert_eq!(history.redo(page(1)).map(|e| x_of(&e)), Some(10));
        assert_eq!(history.redo(page(1)).map(|e| x_of(&e)), Some(20));
        assert!(history.redo(page(1)).is_none());
    }

    #[test]
    fn redo_without_undo_is_noop() {
        let mut history = HistoryManager::default();
        history.reset(page(1), panels(0));
        history.push(page(1), CommitKind::AddPanel, panels(5));
        assert!(!history.can_redo(page(1)));
        assert!(history.redo(page(1)).is_none());
        assert_eq!(history.current(page(1)).map(|e| x_of(e)), Some(5));
    }

    #[test]
    fn sequences_are_global() {
        let mut history = HistoryManager::default();
        let a = history.reset(page(1), panels(0));
        let b = history.reset(page(2), panels(0));
        let c = history.push(page(1), CommitKind::Nudge, panels(1));
        assert!(a < b && b < c);
        assert_eq!(history.last_sequence(), c);
        assert_eq!(history.current(page(2)).map(|e| e.sequence), Some(b));
    }

    #[test]
    fn pages_are_independent() {
        let mut history = HistoryManager::default();
        history.reset(page(1), panels(0));
        history.reset(page(2), panels(0));
        history.push(page(2), CommitKind::Drag, panels(50));
        assert!(!history.can_undo(page(1)));
        assert!(history.can_undo(page(2)));
        history.forget(page(2));
        assert!(history.undo(page(2)).is_none());
        assert_eq!(history.undo_depth(page(2)), 0);
    }

    #[test]
    fn depth_cap_applies_per_page() {
        let mut history = HistoryManager::new(HistoryConfig { max_depth: 3 });
        history.reset(page(1), panels(0));
        for x in 1..=5 {
            history.push(page(1), CommitKind::Drag, panels(x));
        }
        assert_eq!(history.undo_depth(page(1)), 3);
        assert_eq!(history.undo(page(1)).map(|e| x_of(&e)), Some(4));
        assert_eq!(history.undo(page(1)).map(|e| x_of(&e)), Some(3));
        assert!(history.undo(page(1)).is_none());
    }

    #[test]
    fn entries_are_not_aliases_of_live_panels() {
        let mut history = HistoryManager::default();
        let mut live = panels(0);
        history.reset(page(1), live.clone());
        live[0].rect.x = 99;
        assert_eq!(history.current(page(1)).map(|e| x_of(e)), Some(0));
    }
}
