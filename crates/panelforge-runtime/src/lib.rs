#![forbid(unsafe_code)]

//! Panelforge Runtime
//!
//! Interactive editing on top of `panelforge-layout`.
//!
//! # Key Components
//!
//! - [`Editor`] - Editing session that owns the repository and routes input
//! - [`InteractionMachine`] - Drag/resize/nudge gesture state machine
//! - [`HistoryManager`] - Per-page undo/redo of committed panel lists
//! - [`EditorConfig`] - TOML/JSON configuration for page, snap and history
//! - [`LayoutObserver`] - Change notifications for hosts
//!
//! # Role in panelforge
//! `panelforge-runtime` is the orchestrator. Hosts feed it
//! [`InputEvent`](panelforge_core::event::InputEvent)s and page/panel
//! commands; it keeps live gesture geometry out of the repository until a
//! gesture ends, then commits exactly one history entry per mutation.

pub mod config;
pub mod editor;
pub mod interaction;
pub mod undo;

pub use config::{ConfigError, EditorConfig};
pub use editor::{Editor, LayoutObserver};
pub use interaction::{
    CancelReason, GestureKind, InteractionEffect, InteractionMachine, InteractionState,
    InteractionTransition, NUDGE_SHIFT_MULTIPLIER, NoopReason, resize_from_handle,
};
pub use undo::{CommitKind, HistoryConfig, HistoryEntry, HistoryManager};
