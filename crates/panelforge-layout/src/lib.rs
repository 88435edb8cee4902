#![forbid(unsafe_code)]

//! Page/panel model, placement, templates and persistence.
//!
//! # Role in panelforge
//! `panelforge-layout` owns the project data. [`Repository`] is the aggregate
//! root: it holds every [`Page`], mints identifiers, and applies committed
//! mutations (add/duplicate/delete panel, geometry writes, template apply,
//! history restores). Every write re-clamps geometry, so stored rectangles
//! always satisfy the minimum-size and page-bounds invariants.
//!
//! # How it fits in the system
//! `panelforge-runtime` drives the repository from its interaction machine
//! and history manager. Hosts render through [`render::render_page`] and
//! persist through [`snapshot::ProjectSnapshot`].

pub mod error;
pub mod hit;
pub mod page;
pub mod placement;
pub mod render;
pub mod repository;
pub mod snapshot;
pub mod template;

pub use panelforge_core::geometry::{
    Corner, PercentRect, Point, Rect, Size, clamp, clamp_anchored, overlaps,
};

pub use error::LayoutError;
pub use hit::{DEFAULT_HANDLE_SIZE, HitTarget, handle_rect, hit_test};
pub use page::{
    BorderStyle, ContentKind, ContentRef, Page, PageId, Panel, PanelId, PanelShape, PanelStyle,
    StrokePattern, Timestamp,
};
pub use placement::{
    DEFAULT_PLACEMENT_ORIGIN, Placement, PlacementStrategy, RowMajorPlacement, SnapRules,
    find_free_space, snap,
};
pub use render::{DisplayList, LiveRect, PageView, PanelView, RenderCommand, RenderSurface, render_page};
pub use repository::{
    AddedPanel, DEFAULT_DUPLICATE_OFFSET, DEFAULT_PAGE_SIZE, DEFAULT_PANEL_SIZE, LayoutRules,
    Repository, ZOrderMove,
};
pub use snapshot::{
    ClampedPanel, PAGE_SCHEMA_VERSION, PageSnapshot, PanelSnapshot, ProjectSnapshot,
    RestoreMode, RestoreReport,
};
pub use template::{TEMPLATE_REFERENCE_SIZE, Template, TemplateCatalog, TemplateStyle};
