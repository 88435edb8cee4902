#![forbid(unsafe_code)]

//! Editor session: repository, history, interaction machine and observers
//! wired together.
//!
//! [`Editor`] is the single entry point hosts talk to. Every committed
//! mutation goes through [`Editor::commit`], which records exactly one
//! history entry for the page and notifies observers; live gesture updates
//! only request a re-render.
//!
//! Stale identifiers (a panel deleted by another view, an old page id) are
//! logged with `tracing::warn!` and reported as a no-op (`false` / `None`).
//! Only [`LayoutError::LastPage`] and catalog/snapshot errors reach callers.

use std::fmt;

use panelforge_core::event::InputEvent;
use panelforge_core::geometry::Rect;
use panelforge_layout::{
    AddedPanel, ContentRef, LayoutError, Page, PageId, PageSnapshot, Panel, PanelId, PanelStyle,
    ProjectSnapshot, RenderSurface, Repository, RestoreMode, RestoreReport, TemplateCatalog,
    ZOrderMove, render_page,
};

use crate::config::EditorConfig;
use crate::interaction::{GestureKind, InteractionEffect, InteractionMachine, InteractionTransition};
use crate::undo::{CommitKind, HistoryManager};

/// Receives change notifications from an [`Editor`].
pub trait LayoutObserver {
    /// A page's committed panel list changed (commit, undo, redo, load).
    fn geometry_changed(&mut self, page: PageId, panels: &[Panel]);

    /// Live state changed; the page should be redrawn.
    fn render_requested(&mut self, _page: PageId) {}
}

pub struct Editor {
    repository: Repository,
    history: HistoryManager,
    machine: InteractionMachine,
    catalog: TemplateCatalog,
    active_page: PageId,
    observers: Vec<Box<dyn LayoutObserver>>,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("pages", &self.repository.page_count())
            .field("active_page", &self.active_page)
            .field("state", &self.machine.state())
            .field("selected", &self.machine.selected())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl Editor {
    /// A session over a fresh one-page project.
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_repository(Repository::new(config.layout_rules()), config)
    }

    /// Load a saved project; every page starts with a baseline history entry.
    pub fn from_snapshot(
        snapshot: ProjectSnapshot,
        config: &EditorConfig,
        mode: RestoreMode,
    ) -> Result<(Self, RestoreReport), LayoutError> {
        let (repository, report) = Repository::from_snapshot(snapshot, config.layout_rules(), mode)?;
        Ok((Self::with_repository(repository, config), report))
    }

    fn with_repository(repository: Repository, config: &EditorConfig) -> Self {
        let mut history = HistoryManager::new(config.history_config());
        for page in repository.pages() {
            history.reset(page.id(), page.panels().to_vec());
        }
        let active_page = repository.first_page().id();
        Self {
            repository,
            history,
            machine: InteractionMachine::new(config.interaction.nudge_step),
            catalog: TemplateCatalog::builtin(),
            active_page,
            observers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: TemplateCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn LayoutObserver>) {
        self.observers.push(observer);
    }

    // ====================================================================
    // Queries
    // ====================================================================

    #[must_use]
    pub const fn repository(&self) -> &Repository {
        &self.repository
    }

    #[must_use]
    pub const fn history(&self) -> &HistoryManager {
        &self.history
    }

    #[must_use]
    pub const fn machine(&self) -> &InteractionMachine {
        &self.machine
    }

    #[must_use]
    pub const fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn active_page_id(&self) -> PageId {
        self.active_page
    }

    /// The page pointer and keyboard input are routed to.
    #[must_use]
    pub fn active_page(&self) -> &Page {
        self.repository
            .page_by_id(self.active_page)
            .unwrap_or_else(|| self.repository.first_page())
    }

    #[must_use]
    pub const fn selected(&self) -> Option<PanelId> {
        self.machine.selected()
    }

    #[must_use]
    pub fn to_snapshot(&self) -> ProjectSnapshot {
        self.repository.to_snapshot()
    }

    /// Draw the active page, including live gesture geometry.
    pub fn render<S: RenderSurface + ?Sized>(&self, surface: &mut S) {
        render_page(
            self.active_page(),
            self.machine.selected(),
            self.machine.live_rect(),
            self.repository.rules().handle_size,
            surface,
        );
    }

    // ====================================================================
    // Interaction
    // ====================================================================

    /// Route pointer/keyboard input to the interaction machine and apply the
    /// resulting effect.
    pub fn handle_event(&mut self, event: &InputEvent) -> InteractionTransition {
        let _span = tracing::debug_span!("editor.handle_event", page = %self.active_page).entered();
        let page = self
            .repository
            .page_by_id(self.active_page)
            .unwrap_or_else(|| self.repository.first_page());
        let transition = self.machine.handle(page, self.repository.rules(), event);
        self.apply_effect(transition.effect);
        transition
    }

    /// Commit any active gesture. Call before crossing an async boundary.
    pub fn settle(&mut self) -> Option<InteractionTransition> {
        let transition = self.machine.settle()?;
        self.apply_effect(transition.effect);
        Some(transition)
    }

    /// Abort any active gesture, keeping the committed geometry.
    pub fn cancel(&mut self) -> Option<InteractionTransition> {
        let transition = self.machine.cancel()?;
        self.apply_effect(transition.effect);
        Some(transition)
    }

    /// Select a panel on the active page (or clear with `None`).
    pub fn select(&mut self, panel: Option<PanelId>) -> bool {
        if let Some(id) = panel {
            if !self.active_page().contains_panel(id) {
                tracing::warn!(panel = %id, "cannot select panel outside the active page");
                return false;
            }
        }
        let changed = self.machine.select(panel);
        if changed {
            self.request_render(self.active_page);
        }
        changed
    }

    /// Switch the page input is routed to; settles any active gesture first.
    pub fn set_active_page(&mut self, page: PageId) -> bool {
        if self.repository.page_by_id(page).is_none() {
            tracing::warn!(page = %page, "cannot activate unknown page");
            return false;
        }
        self.settle();
        if page != self.active_page {
            self.machine.select(None);
            self.active_page = page;
            self.request_render(page);
        }
        true
    }

    fn apply_effect(&mut self, effect: InteractionEffect) {
        match effect {
            InteractionEffect::Committed {
                page,
                panel,
                gesture,
                to,
                ..
            } => {
                let kind = match gesture {
                    GestureKind::Drag => CommitKind::Drag,
                    GestureKind::Resize => CommitKind::Resize,
                };
                self.commit_rect(page, panel, to, kind);
            }
            InteractionEffect::Nudged { page, panel, to, .. } => {
                self.commit_rect(page, panel, to, CommitKind::Nudge);
            }
            InteractionEffect::DeleteRequested { panel, .. } => {
                self.delete_panel(panel);
            }
            InteractionEffect::SelectionCleared
            | InteractionEffect::DragStarted { .. }
            | InteractionEffect::ResizeStarted { .. }
            | InteractionEffect::LiveUpdated { .. }
            | InteractionEffect::Released { .. }
            | InteractionEffect::Canceled { .. } => self.request_render(self.active_page),
            InteractionEffect::Noop { .. } => {}
        }
    }

    fn commit_rect(&mut self, page: PageId, panel: PanelId, rect: Rect, kind: CommitKind) {
        let result = self.repository.set_panel_rect(panel, rect);
        if recover("commit geometry", result).is_some() {
            self.commit(page, kind);
        }
    }

    // ====================================================================
    // Pages
    // ====================================================================

    pub fn add_page(&mut self) -> PageId {
        let page = self.repository.add_page();
        self.history.reset(page, Vec::new());
        page
    }

    /// Delete a page. Fails with [`LayoutError::LastPage`] on the only page.
    pub fn delete_page(&mut self, page: PageId) -> Result<(), LayoutError> {
        if self.machine.state().page() == Some(page) {
            self.cancel();
        }
        let removed = self.repository.delete_page(page)?;
        for panel in removed.panels() {
            self.machine.forget_panel(panel.id);
        }
        self.history.forget(page);
        if self.active_page == page {
            self.active_page = self.repository.first_page().id();
            self.request_render(self.active_page);
        }
        Ok(())
    }

    pub fn move_page(&mut self, from: usize, to: usize) -> Result<(), LayoutError> {
        self.repository.move_page(from, to)
    }

    pub fn set_background(&mut self, page: PageId, background: Option<ContentRef>) -> bool {
        let result = self.repository.set_background(page, background);
        let done = recover("set background", result).is_some();
        if done {
            self.request_render(page);
        }
        done
    }

    /// Replace a page with a loaded snapshot and restart its history.
    pub fn load_page(
        &mut self,
        snapshot: PageSnapshot,
        mode: RestoreMode,
    ) -> Result<(PageId, RestoreReport), LayoutError> {
        self.settle();
        let (page, report) = self.repository.load_page(snapshot, mode)?;
        let panels = self.panels_of(page);
        self.history.reset(page, panels);
        self.drop_stale_selection();
        self.notify_geometry(page);
        Ok((page, report))
    }

    // ====================================================================
    // Panels
    // ====================================================================

    /// Add a default-sized panel in the first free slot.
    pub fn add_panel(&mut self, page: PageId) -> Option<AddedPanel> {
        self.settle();
        let result = self.repository.add_panel(page);
        let added = recover("add panel", result)?;
        self.commit(page, CommitKind::AddPanel);
        Some(added)
    }

    pub fn duplicate_panel(&mut self, panel: PanelId) -> Option<PanelId> {
        self.settle();
        let result = self.repository.duplicate_panel(panel);
        let copy = recover("duplicate panel", result)?;
        let page = self.repository.page_of(copy)?;
        self.commit(page, CommitKind::DuplicatePanel);
        Some(copy)
    }

    /// Delete a panel, clearing the selection if it pointed at it.
    pub fn delete_panel(&mut self, panel: PanelId) -> bool {
        let page = self.repository.page_of(panel);
        self.machine.forget_panel(panel);
        let result = self.repository.delete_panel(panel);
        if recover("delete panel", result).is_none() {
            return false;
        }
        if let Some(page) = page {
            self.commit(page, CommitKind::DeletePanel);
        }
        true
    }

    /// Programmatic geometry edit; clamped like any other write.
    pub fn set_panel_rect(&mut self, panel: PanelId, rect: Rect) -> Option<Rect> {
        self.settle();
        let page = self.repository.page_of(panel);
        let result = self.repository.set_panel_rect(panel, rect);
        let stored = recover("set panel geometry", result)?;
        self.commit(page?, CommitKind::Geometry);
        Some(stored)
    }

    pub fn update_panel_style(&mut self, panel: PanelId, style: PanelStyle) -> bool {
        let page = self.repository.page_of(panel);
        let result = self.repository.update_panel_style(panel, style);
        self.commit_property("update panel style", result, page, CommitKind::Style)
    }

    pub fn set_panel_content(&mut self, panel: PanelId, content: Vec<ContentRef>) -> bool {
        let page = self.repository.page_of(panel);
        let result = self.repository.set_panel_content(panel, content);
        self.commit_property("set panel content", result, page, CommitKind::Content)
    }

    fn commit_property(
        &mut self,
        operation: &'static str,
        result: Result<(), LayoutError>,
        page: Option<PageId>,
        kind: CommitKind,
    ) -> bool {
        match (recover(operation, result), page) {
            (Some(()), Some(page)) => {
                self.commit(page, kind);
                true
            }
            _ => false,
        }
    }

    pub fn bring_forward(&mut self, panel: PanelId) -> bool {
        self.reorder(panel, ZOrderMove::Forward)
    }

    pub fn send_backward(&mut self, panel: PanelId) -> bool {
        self.reorder(panel, ZOrderMove::Backward)
    }

    pub fn bring_to_front(&mut self, panel: PanelId) -> bool {
        self.reorder(panel, ZOrderMove::ToFront)
    }

    pub fn send_to_back(&mut self, panel: PanelId) -> bool {
        self.reorder(panel, ZOrderMove::ToBack)
    }

    /// Reorder a panel; `true` only when the order actually changed.
    pub fn reorder(&mut self, panel: PanelId, step: ZOrderMove) -> bool {
        let page = self.repository.page_of(panel);
        let result = self.repository.reorder_panel(panel, step);
        match (recover("reorder panel", result), page) {
            (Some(true), Some(page)) => {
                self.commit(page, CommitKind::ZOrder);
                true
            }
            _ => false,
        }
    }

    /// Replace every panel on `page` with the named template's layout.
    ///
    /// Destructive; confirmation is the caller's job. An unknown template id
    /// leaves the page untouched and records nothing.
    pub fn apply_template(
        &mut self,
        page: PageId,
        template_id: &str,
    ) -> Result<Vec<PanelId>, LayoutError> {
        let template = self.catalog.require(template_id)?.clone();
        self.repository.require_page(page)?;
        if self.machine.state().page() == Some(page) {
            self.cancel();
        }
        let created = self.repository.apply_template(page, &template)?;
        self.drop_stale_selection();
        self.commit(page, CommitKind::Template);
        Ok(created)
    }

    // ====================================================================
    // History
    // ====================================================================

    /// Undo the last commit on the active page. `false` when there is nothing
    /// to undo or a gesture is in progress.
    pub fn undo(&mut self) -> bool {
        self.undo_page(self.active_page)
    }

    pub fn redo(&mut self) -> bool {
        self.redo_page(self.active_page)
    }

    pub fn undo_page(&mut self, page: PageId) -> bool {
        if self.machine.is_active() {
            tracing::debug!(page = %page, "undo refused during an active gesture");
            return false;
        }
        let Some(entry) = self.history.undo(page) else {
            return false;
        };
        self.restore(page, entry.panels.as_ref().clone())
    }

    pub fn redo_page(&mut self, page: PageId) -> bool {
        if self.machine.is_active() {
            tracing::debug!(page = %page, "redo refused during an active gesture");
            return false;
        }
        let Some(entry) = self.history.redo(page) else {
            return false;
        };
        self.restore(page, entry.panels.as_ref().clone())
    }

    fn restore(&mut self, page: PageId, panels: Vec<Panel>) -> bool {
        let result = self.repository.restore_panels(page, panels);
        if recover("restore history entry", result).is_none() {
            return false;
        }
        self.drop_stale_selection();
        self.notify_geometry(page);
        true
    }

    // ====================================================================
    // Internals
    // ====================================================================

    /// Record the page's current panels as one history entry and notify.
    fn commit(&mut self, page: PageId, kind: CommitKind) {
        let panels = self.panels_of(page);
        let sequence = self.history.push(page, kind, panels);
        tracing::debug!(page = %page, %kind, sequence, "committed");
        self.notify_geometry(page);
    }

    fn panels_of(&self, page: PageId) -> Vec<Panel> {
        self.repository
            .page_by_id(page)
            .map(|page| page.panels().to_vec())
            .unwrap_or_default()
    }

    fn drop_stale_selection(&mut self) {
        if let Some(selected) = self.machine.selected() {
            if self.repository.page_of(selected).is_none() {
                self.machine.forget_panel(selected);
            }
        }
    }

    fn notify_geometry(&mut self, page: PageId) {
        let Some(panels) = self.repository.page_by_id(page).map(Page::panels) else {
            return;
        };
        for observer in &mut self.observers {
            observer.geometry_changed(page, panels);
        }
    }

    fn request_render(&mut self, page: PageId) {
        for observer in &mut self.observers {
            observer.render_requested(page);
        }
    }
}

/// Turn a stale-id failure into a logged no-op.
fn recover<T>(operation: &'static str, result: Result<T, LayoutError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(operation, %error, "edit ignored");
            None
        }
    }
}
