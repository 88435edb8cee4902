#![forbid(unsafe_code)]

//! Persisted page and project schema (v1).
//!
//! # Schema Versioning Policy
//!
//! - Additive fields carry `#[serde(default)]` and need no version bump.
//! - Breaking changes require incrementing [`PAGE_SCHEMA_VERSION`].
//! - Loaders reject unknown versions with [`LayoutError::UnsupportedSchema`].
//!
//! Loading re-establishes geometry invariants: in [`RestoreMode::Clamp`]
//! out-of-range rectangles are clamped and listed in the [`RestoreReport`];
//! in [`RestoreMode::Strict`] the first one is an error.

use panelforge_core::geometry::{Rect, Size};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::page::{ContentRef, Page, PageId, Panel, PanelId, PanelStyle, Timestamp};
use crate::repository::{IdCounters, LayoutRules, Repository};

/// Current page/project schema version.
pub const PAGE_SCHEMA_VERSION: u16 = 1;

fn default_schema_version() -> u16 {
    PAGE_SCHEMA_VERSION
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSnapshot {
    pub id: PanelId,
    pub rect: Rect,
    #[serde(default)]
    pub style: PanelStyle,
    #[serde(default)]
    pub content: Vec<ContentRef>,
}

impl PanelSnapshot {
    #[must_use]
    pub fn capture(panel: &Panel) -> Self {
        Self {
            id: panel.id,
            rect: panel.rect,
            style: panel.style.clone(),
            content: panel.content.clone(),
        }
    }
}

/// One page, panels in z-order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    pub id: PageId,
    #[serde(default)]
    pub number: u32,
    pub size: Size,
    #[serde(default)]
    pub background: Option<ContentRef>,
    #[serde(default)]
    pub modified_at: Timestamp,
    #[serde(default)]
    pub panels: Vec<PanelSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u16,
    /// Next identifiers to mint; loaders never go below what the pages use.
    #[serde(default)]
    pub next_page_id: u64,
    #[serde(default)]
    pub next_panel_id: u64,
    pub pages: Vec<PageSnapshot>,
}

/// How loaders treat rectangles that violate size/bounds invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestoreMode {
    #[default]
    Clamp,
    Strict,
}

/// A rectangle that was changed while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampedPanel {
    pub page: PageId,
    pub panel: PanelId,
    pub stored: Rect,
    pub restored: Rect,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub clamped: Vec<ClampedPanel>,
}

impl RestoreReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.clamped.is_empty()
    }
}

fn check_schema(found: u16) -> Result<(), LayoutError> {
    if found == PAGE_SCHEMA_VERSION {
        Ok(())
    } else {
        Err(LayoutError::UnsupportedSchema { found })
    }
}

impl PageSnapshot {
    #[must_use]
    pub fn capture(page: &Page) -> Self {
        Self {
            schema_version: PAGE_SCHEMA_VERSION,
            id: page.id(),
            number: page.number(),
            size: page.size(),
            background: page.background().cloned(),
            modified_at: page.modified_at(),
            panels: page.panels().iter().map(PanelSnapshot::capture).collect(),
        }
    }

    /// Schema and identifier checks that do not depend on geometry rules.
    pub fn validate(&self) -> Result<(), LayoutError> {
        check_schema(self.schema_version)?;
        let mut seen = FxHashSet::default();
        for panel in &self.panels {
            if !seen.insert(panel.id) {
                return Err(LayoutError::DuplicatePanelId { panel: panel.id });
            }
        }
        Ok(())
    }

    /// Build a live page, clamping (or rejecting) geometry per `mode`.
    pub fn into_page(
        self,
        min_size: i32,
        mode: RestoreMode,
        report: &mut RestoreReport,
    ) -> Result<Page, LayoutError> {
        self.validate()?;
        let mut page = Page::new(self.id, self.number, self.size);
        page.set_background(self.background);

        for stored in self.panels {
            let restored = page.clamp_rect(stored.rect, min_size);
            if restored != stored.rect {
                if mode == RestoreMode::Strict {
                    return Err(LayoutError::InvalidGeometry {
                        rect: stored.rect,
                        page: page.size(),
                    });
                }
                tracing::warn!(
                    page = %self.id,
                    panel = %stored.id,
                    stored_rect = ?stored.rect,
                    restored_rect = ?restored,
                    "clamped panel geometry while loading"
                );
                report.clamped.push(ClampedPanel {
                    page: self.id,
                    panel: stored.id,
                    stored: stored.rect,
                    restored,
                });
            }
            let mut panel = Panel::new(stored.id, self.id, restored);
            panel.style = stored.style;
            panel.content = stored.content;
            page.push_panel(panel, min_size);
        }

        page.set_modified_at(self.modified_at);
        Ok(page)
    }

    /// Deterministic FNV-1a hash of page geometry and z-order.
    ///
    /// Ignores style, content and timestamps, so two snapshots hash equal
    /// exactly when their layouts are interchangeable.
    #[must_use]
    pub fn layout_hash(&self) -> u64 {
        const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0001_0000_01b3;

        fn mix_bytes(hash: &mut u64, bytes: &[u8]) {
            for byte in bytes {
                *hash ^= u64::from(*byte);
                *hash = hash.wrapping_mul(PRIME);
            }
        }

        fn mix_rect(hash: &mut u64, rect: Rect) {
            for value in [rect.x, rect.y, rect.width, rect.height] {
                mix_bytes(hash, &value.to_le_bytes());
            }
        }

        let mut hash = OFFSET_BASIS;
        mix_bytes(&mut hash, &self.schema_version.to_le_bytes());
        mix_bytes(&mut hash, &self.id.get().to_le_bytes());
        mix_bytes(&mut hash, &self.size.width.to_le_bytes());
        mix_bytes(&mut hash, &self.size.height.to_le_bytes());
        mix_bytes(&mut hash, &(self.panels.len() as u64).to_le_bytes());
        for panel in &self.panels {
            mix_bytes(&mut hash, &panel.id.get().to_le_bytes());
            mix_rect(&mut hash, panel.rect);
        }
        hash
    }
}

impl ProjectSnapshot {
    #[must_use]
    pub fn capture(repository: &Repository) -> Self {
        let ids = repository.id_counters();
        Self {
            schema_version: PAGE_SCHEMA_VERSION,
            next_page_id: ids.next_page,
            next_panel_id: ids.next_panel,
            pages: repository.pages().iter().map(PageSnapshot::capture).collect(),
        }
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        check_schema(self.schema_version)?;
        if self.pages.is_empty() {
            return Err(LayoutError::EmptyProject);
        }
        let mut pages = FxHashSet::default();
        let mut panels = FxHashSet::default();
        for page in &self.pages {
            page.validate()?;
            if !pages.insert(page.id) {
                return Err(LayoutError::DuplicatePageId { page: page.id });
            }
            for panel in &page.panels {
                if !panels.insert(panel.id) {
                    return Err(LayoutError::DuplicatePanelId { panel: panel.id });
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn layout_hash(&self) -> u64 {
        self.pages.iter().fold(0xcbf2_9ce4_8422_2325_u64, |acc, page| {
            (acc ^ page.layout_hash()).wrapping_mul(0x0000_0001_0000_01b3)
        })
    }
}

impl Repository {
    #[must_use]
    pub fn to_snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot::capture(self)
    }

    /// Rebuild a project. Page numbers are reassigned from list order.
    pub fn from_snapshot(
        snapshot: ProjectSnapshot,
        rules: LayoutRules,
        mode: RestoreMode,
    ) -> Result<(Self, RestoreReport), LayoutError> {
        snapshot.validate()?;
        let mut report = RestoreReport::default();
        let pages = snapshot
            .pages
            .into_iter()
            .map(|page| page.into_page(rules.min_size, mode, &mut report))
            .collect::<Result<Vec<_>, _>>()?;
        let ids = IdCounters {
            next_page: snapshot.next_page_id,
            next_panel: snapshot.next_panel_id,
        };
        let repository = Self::from_parts(pages, ids, rules)?;
        tracing::info!(
            pages = repository.page_count(),
            clamped = report.clamped.len(),
            "project loaded"
        );
        Ok((repository, report))
    }

    /// Load one page into the project, replacing the page with the same id
    /// or appending it.
    pub fn load_page(
        &mut self,
        snapshot: PageSnapshot,
        mode: RestoreMode,
    ) -> Result<(PageId, RestoreReport), LayoutError> {
        let mut report = RestoreReport::default();
        let page = snapshot.into_page(self.rules().min_size, mode, &mut report)?;
        let id = self.install_page(page)?;
        tracing::debug!(page = %id, clamped = report.clamped.len(), "page loaded");
        Ok((id, report))
    }

    #[must_use]
    pub fn page_snapshot(&self, id: PageId) -> Option<PageSnapshot> {
        self.page_by_id(id).map(PageSnapshot::capture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{ContentKind, StrokePattern};

    fn sample() -> Repository {
        let mut repo = Repository::new(LayoutRules::default());
        let page = repo.page(0).unwrap().id();
        let a = repo.add_panel(page).unwrap().id;
        repo.add_panel(page).unwrap();
        repo.set_panel_content(a, vec![ContentRef::new(ContentKind::Dialogue, "dlg-7")])
            .unwrap();
        let mut style = PanelStyle::default();
        style.border.pattern = StrokePattern::Dashed;
        repo.update_panel_style(a, style).unwrap();
        repo.add_page();
        repo
    }

    #[test]
    fn project_survives_json() {
        let repo = sample();
        let snapshot = repo.to_snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: ProjectSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);

        let (loaded, report) =
            Repository::from_snapshot(parsed, LayoutRules::default(), RestoreMode::Clamp).unwrap();
        assert!(report.is_clean());
        assert_eq!(loaded.to_snapshot(), snapshot);
    }

    #[test]
    fn loaded_project_never_reuses_ids() {
        let repo = sample();
        let mut snapshot = repo.to_snapshot();
        snapshot.next_panel_id = 0;
        snapshot.next_page_id = 0;
        let (mut loaded, _) =
            Repository::from_snapshot(snapshot, LayoutRules::default(), RestoreMode::Clamp).unwrap();
        let page = loaded.page(0).unwrap().id();
        let fresh = loaded.add_panel(page).unwrap().id;
        assert_eq!(fresh.get(), 3);
        assert_eq!(loaded.add_page().get(), 3);
    }

    #[test]
    fn unknown_schema_is_rejected() {
        let mut snapshot = sample().to_snapshot();
        snapshot.schema_version = 99;
        assert_eq!(
            Repository::from_snapshot(snapshot, LayoutRules::default(), RestoreMode::Clamp).err(),
            Some(LayoutError::UnsupportedSchema { found: 99 })
        );
    }

    #[test]
    fn out_of_range_geometry_is_clamped_and_reported() {
        let mut snapshot = sample().to_snapshot();
        snapshot.pages[0].panels[0].rect = Rect::new(700, -20, 10, 300);
        let (loaded, report) =
            Repository::from_snapshot(snapshot.clone(), LayoutRules::default(), RestoreMode::Clamp)
                .unwrap();
        assert_eq!(report.clamped.len(), 1);
        assert_eq!(report.clamped[0].restored, Rect::new(700, 0, 50, 300));
        assert_eq!(loaded.page(0).unwrap().panels()[0].rect, Rect::new(700, 0, 50, 300));

        assert_eq!(
            Repository::from_snapshot(snapshot, LayoutRules::default(), RestoreMode::Strict).err(),
            Some(LayoutError::InvalidGeometry {
                rect: Rect::new(700, -20, 10, 300),
                page: Size::new(800, 1000),
            })
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut snapshot = sample().to_snapshot();
        let dup = snapshot.pages[0].panels[0].clone();
        snapshot.pages[1].panels.push(dup.clone());
        assert_eq!(
            snapshot.validate(),
            Err(LayoutError::DuplicatePanelId { panel: dup.id })
        );

        let mut snapshot = sample().to_snapshot();
        snapshot.pages[1].id = snapshot.pages[0].id;
        assert_eq!(
            snapshot.validate(),
            Err(LayoutError::DuplicatePageId {
                page: snapshot.pages[0].id
            })
        );
    }

    #[test]
    fn empty_project_is_rejected() {
        let snapshot = ProjectSnapshot {
            schema_version: PAGE_SCHEMA_VERSION,
            next_page_id: 1,
            next_panel_id: 1,
            pages: Vec::new(),
        };
        assert_eq!(snapshot.validate(), Err(LayoutError::EmptyProject));
    }

    #[test]
    fn load_page_replaces_existing() {
        let mut repo = sample();
        let page = repo.page(0).unwrap().id();
        let mut snapshot = repo.page_snapshot(page).unwrap();
        snapshot.panels.truncate(1);
        let (id, report) = repo.load_page(snapshot, RestoreMode::Clamp).unwrap();
        assert_eq!(id, page);
        assert!(report.is_clean());
        assert_eq!(repo.page_count(), 2);
        assert_eq!(repo.page_by_id(page).unwrap().panels().len(), 1);
    }

    #[test]
    fn layout_hash_tracks_geometry_only() {
        let repo = sample();
        let page = repo.page(0).unwrap().id();
        let base = repo.page_snapshot(page).unwrap();

        let mut restyled = base.clone();
        restyled.panels[0].style.fill = "#ff0000".to_owned();
        restyled.modified_at = Timestamp::from_millis(1);
        assert_eq!(base.layout_hash(), restyled.layout_hash());

        let mut moved = base.clone();
        moved.panels[0].rect = moved.panels[0].rect.translated(1, 0);
        assert_ne!(base.layout_hash(), moved.layout_hash());

        let mut reordered = base.clone();
        reordered.panels.swap(0, 1);
        assert_ne!(base.layout_hash(), reordered.layout_hash());
    }
}
