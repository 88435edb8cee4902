#![forbid(unsafe_code)]

//! Canonical editor input events.
//!
//! Hosts (a DOM adapter, a canvas shell, a replay script) translate their raw
//! input into [`InputEvent`] values in page units before handing them to the
//! interaction machine.
//!
//! # Design Notes
//!
//! - Pointer positions are already mapped into page units (see
//!   [`Point::from_f64`](crate::geometry::Point::from_f64)).
//! - `Modifiers` use bitflags for easy combination.
//! - `PointerLeave` carries no position: the last known pointer position is
//!   what gets committed.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Canonical input event for the page canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    /// Primary pointer pressed on the canvas.
    PointerDown {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Pointer moved (button state is implied by the active gesture).
    PointerMove { position: Point },
    /// Primary pointer released.
    PointerUp { position: Point },
    /// Pointer left the canvas.
    PointerLeave,
    /// A key was pressed while the canvas had focus.
    Key {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Host-initiated cancellation (focus loss, pointer capture lost).
    Cancel,
}

impl InputEvent {
    /// Pointer down without modifiers.
    #[must_use]
    pub const fn pointer_down(x: i32, y: i32) -> Self {
        Self::PointerDown {
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    #[must_use]
    pub const fn pointer_move(x: i32, y: i32) -> Self {
        Self::PointerMove {
            position: Point::new(x, y),
        }
    }

    #[must_use]
    pub const fn pointer_up(x: i32, y: i32) -> Self {
        Self::PointerUp {
            position: Point::new(x, y),
        }
    }

    /// Key press without modifiers.
    #[must_use]
    pub const fn key(key: Key) -> Self {
        Self::Key {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// Pointer position carried by the event, if any.
    #[must_use]
    pub const fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { position, .. }
            | Self::PointerMove { position }
            | Self::PointerUp { position } => Some(*position),
            Self::PointerLeave | Self::Key { .. } | Self::Cancel => None,
        }
    }
}

/// Keys the layout engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Delete,
    /// Anything else; ignored by the engine.
    Other,
}

impl Key {
    /// Unit direction `(dx, dy)` for arrow keys.
    #[must_use]
    pub const fn arrow_direction(self) -> Option<(i32, i32)> {
        match self {
            Self::ArrowUp => Some((0, -1)),
            Self::ArrowDown => Some((0, 1)),
            Self::ArrowLeft => Some((-1, 0)),
            Self::ArrowRight => Some((1, 0)),
            _ => None,
        }
    }
}

bitflags! {
    /// Modifier keys held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}
