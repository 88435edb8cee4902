#![forbid(unsafe_code)]

//! Core: page-unit geometry and the canonical input vocabulary.
//!
//! # Role in panelforge
//! `panelforge-core` is the leaf of the workspace. It owns the rectangle
//! model and the pure clamping/overlap/percentage functions every other crate
//! builds on, plus the [`event::InputEvent`] type hosts translate pointer and
//! keyboard input into.
//!
//! # How it fits in the system
//! `panelforge-layout` builds pages, panels and placement on top of
//! [`geometry`]; `panelforge-runtime` feeds [`event::InputEvent`] values into
//! its interaction machine.

pub mod event;
pub mod geometry;

pub use event::{InputEvent, Key, Modifiers};
pub use geometry::{
    Corner, DEFAULT_GUTTER, MIN_PANEL_SIZE, PercentRect, Point, Rect, Size, clamp, clamp_anchored,
    from_percent, overlaps, to_percent,
};
