#![forbid(unsafe_code)]

//! Undo/redo for committed page edits.
//!
//! # Architecture
//!
//! ```text
//!  commit(page, kind) ─► HistoryManager ─► SnapshotStore (per page)
//!                              │              undo: [baseline .. current]
//!                              │              redo: [undone ..]
//!  undo(page) ◄────────────────┘ returns Arc<HistoryEntry> to restore
//! ```
//!
//! Entries are whole panel lists rather than reversible commands: every
//! committed mutation (drag, resize, add, delete, duplicate, template,
//! property edits, z-order, nudge) produces one entry, and restoring an entry
//! replaces the page's panel list in one step.
//!
//! # Module Structure
//!
//! - [`snapshot_store`]: generic bounded `Arc` snapshot stack
//! - [`history`]: per-page history keyed by [`PageId`](panelforge_layout::PageId)

pub mod history;
pub mod snapshot_store;

pub use history::{CommitKind, HistoryConfig, HistoryEntry, HistoryManager};
pub use snapshot_store::{SnapshotConfig, SnapshotStore};
