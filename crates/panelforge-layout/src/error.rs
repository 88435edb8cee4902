#![forbid(unsafe_code)]

//! Error taxonomy for page/panel operations.
//!
//! Only [`LayoutError::LastPage`] is a policy violation meant for the end
//! user. Everything else is recovered locally by callers: geometry is clamped,
//! stale identifiers degrade to logged no-ops, and history underflow is a
//! normal boundary condition.

use std::fmt;

use panelforge_core::geometry::{Rect, Size};

use crate::page::{PageId, PanelId};
use crate::snapshot::PAGE_SCHEMA_VERSION;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A rectangle could not satisfy the size/bounds invariants as given.
    InvalidGeometry { rect: Rect, page: Size },
    /// A panel identifier that no longer exists.
    PanelNotFound { panel: PanelId },
    /// A page identifier that no longer exists.
    PageNotFound { page: PageId },
    /// A page index outside `0..len`.
    PageIndexOutOfRange { index: usize, len: usize },
    /// Attempt to delete the only remaining page.
    LastPage,
    /// Undo/redo with nothing to restore.
    HistoryUnderflow,
    /// Template lookup by an unknown identifier.
    UnknownTemplate { id: String },
    /// Snapshot written by an incompatible schema.
    UnsupportedSchema { found: u16 },
    /// A loaded snapshot reuses a panel identifier.
    DuplicatePanelId { panel: PanelId },
    /// A loaded snapshot reuses a page identifier.
    DuplicatePageId { page: PageId },
    /// A loaded project has no pages.
    EmptyProject,
}

impl LayoutError {
    /// Whether this error must be shown to the end user.
    ///
    /// Everything else is reduced to a clamp or a no-op by the engine.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(self, Self::LastPage)
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGeometry { rect, page } => write!(
                f,
                "rectangle ({}, {}, {}x{}) does not fit page {}x{}",
                rect.x, rect.y, rect.width, rect.height, page.width, page.height
            ),
            Self::PanelNotFound { panel } => write!(f, "panel {panel} not found"),
            Self::PageNotFound { page } => write!(f, "page {page} not found"),
            Self::PageIndexOutOfRange { index, len } => {
                write!(f, "page index {index} out of range (page count {len})")
            }
            Self::LastPage => write!(f, "cannot delete the last remaining page"),
            Self::HistoryUnderflow => write!(f, "nothing to undo or redo"),
            Self::UnknownTemplate { id } => write!(f, "unknown layout template {id:?}"),
            Self::UnsupportedSchema { found } => write!(
                f,
                "unsupported page schema version {found} (expected {PAGE_SCHEMA_VERSION})"
            ),
            Self::DuplicatePanelId { panel } => write!(f, "duplicate panel id {panel}"),
            Self::DuplicatePageId { page } => write!(f, "duplicate page id {page}"),
            Self::EmptyProject => write!(f, "project snapshot contains no pages"),
        }
    }
}

impl std::error::Error for LayoutError {}
