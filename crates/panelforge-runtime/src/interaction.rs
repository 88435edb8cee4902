#![forbid(unsafe_code)]

//! Drag/resize/nudge state machine for the page canvas.
//!
//! ```text
//! Idle ──down on body──► Dragging ──up/leave──► Idle (commit if moved)
//!   │                        └────Escape/cancel──► Idle (restore)
//!   └──down on handle──► Resizing ──up/leave──► Idle (commit if resized)
//!                            └────Escape/cancel──► Idle (restore)
//! ```
//!
//! The machine owns gesture state and the selection; it never writes to the
//! repository. Live geometry stays inside the machine until a gesture ends,
//! and the resulting [`InteractionEffect`] tells the caller what to commit.
//! With snapping on, a drag snaps only the panel origin and a resize snaps
//! all four fields.
//!
//! Every call returns an [`InteractionTransition`] so hosts and tests can
//! audit exactly what happened, including ignored input.

use panelforge_core::event::{InputEvent, Key, Modifiers};
use panelforge_core::geometry::{Corner, Point, Rect, clamp, clamp_anchored};
use panelforge_layout::{HitTarget, LayoutRules, LiveRect, Page, PageId, PanelId, hit_test};
use serde::{Deserialize, Serialize};

/// Nudge multiplier while shift is held.
pub const NUDGE_SHIFT_MULTIPLIER: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InteractionState {
    Idle,
    Dragging {
        page: PageId,
        panel: PanelId,
        /// Pointer position minus panel origin at pointer-down.
        grab_offset: Point,
        origin_rect: Rect,
        live: Rect,
    },
    Resizing {
        page: PageId,
        panel: PanelId,
        handle: Corner,
        anchor_rect: Rect,
        pointer_origin: Point,
        live: Rect,
    },
}

impl InteractionState {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Panel under the active gesture.
    #[must_use]
    pub const fn panel(&self) -> Option<PanelId> {
        match self {
            Self::Idle => None,
            Self::Dragging { panel, .. } | Self::Resizing { panel, .. } => Some(*panel),
        }
    }

    #[must_use]
    pub const fn page(&self) -> Option<PageId> {
        match self {
            Self::Idle => None,
            Self::Dragging { page, .. } | Self::Resizing { page, .. } => Some(*page),
        }
    }

    /// `(pre-gesture rect, live rect)` of the active gesture.
    const fn rects(&self) -> Option<(Rect, Rect)> {
        match self {
            Self::Idle => None,
            Self::Dragging {
                origin_rect, live, ..
            } => Some((*origin_rect, *live)),
            Self::Resizing {
                anchor_rect, live, ..
            } => Some((*anchor_rect, *live)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    Drag,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// Escape pressed mid-gesture.
    Escape,
    /// Host cancel event or [`InteractionMachine::cancel`].
    Programmatic,
    /// The panel disappeared mid-gesture.
    PanelRemoved,
}

/// Why an input was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoopReason {
    IdleWithoutGesture,
    GestureInProgress,
    EmptyCanvas,
    NoSelection,
    Unchanged,
    UnhandledKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum InteractionEffect {
    SelectionCleared,
    DragStarted {
        panel: PanelId,
        grab_offset: Point,
    },
    ResizeStarted {
        panel: PanelId,
        handle: Corner,
    },
    /// Live geometry changed; re-render, do not commit.
    LiveUpdated { panel: PanelId, rect: Rect },
    /// Gesture ended with changed geometry; commit `to`.
    Committed {
        page: PageId,
        panel: PanelId,
        gesture: GestureKind,
        from: Rect,
        to: Rect,
    },
    /// Gesture ended without changing anything.
    Released { panel: PanelId },
    Canceled {
        panel: PanelId,
        restored: Rect,
        reason: CancelReason,
    },
    /// Keyboard nudge; commit `to`.
    Nudged {
        page: PageId,
        panel: PanelId,
        from: Rect,
        to: Rect,
    },
    /// Delete key on a selected panel; the caller decides.
    DeleteRequested { page: PageId, panel: PanelId },
    Noop { reason: NoopReason },
}

impl InteractionEffect {
    /// Whether the caller has to write geometry to the repository.
    #[must_use]
    pub const fn needs_commit(&self) -> bool {
        matches!(self, Self::Committed { .. } | Self::Nudged { .. })
    }
}

/// One machine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionTransition {
    pub sequence: u64,
    pub from: InteractionState,
    pub to: InteractionState,
    pub effect: InteractionEffect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionMachine {
    state: InteractionState,
    selected: Option<PanelId>,
    nudge_step: i32,
    sequence: u64,
}

impl Default for InteractionMachine {
    fn default() -> Self {
        Self::new(1)
    }
}

impl InteractionMachine {
    /// `nudge_step` is the arrow-key step when snapping is off.
    #[must_use]
    pub fn new(nudge_step: i32) -> Self {
        Self {
            state: InteractionState::Idle,
            selected: None,
            nudge_step: nudge_step.max(1),
            sequence: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> InteractionState {
        self.state
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.state.is_active()
    }

    #[must_use]
    pub const fn selected(&self) -> Option<PanelId> {
        self.selected
    }

    /// Geometry to draw instead of the committed rectangle, if any.
    #[must_use]
    pub fn live_rect(&self) -> Option<LiveRect> {
        let panel = self.state.panel()?;
        let (_, rect) = self.state.rects()?;
        Some(LiveRect { panel, rect })
    }

    /// Programmatic selection; ignored during a gesture.
    pub fn select(&mut self, panel: Option<PanelId>) -> bool {
        if self.is_active() {
            return false;
        }
        self.selected = panel;
        true
    }

    /// Drop every reference to a panel that no longer exists.
    pub fn forget_panel(&mut self, panel: PanelId) -> Option<InteractionTransition> {
        if self.selected == Some(panel) {
            self.selected = None;
        }
        if self.state.panel() == Some(panel) {
            return self.cancel_with(CancelReason::PanelRemoved);
        }
        None
    }

    /// Abort the active gesture, restoring the pre-gesture rectangle.
    pub fn cancel(&mut self) -> Option<InteractionTransition> {
        self.cancel_with(CancelReason::Programmatic)
    }

    /// End the active gesture as if the pointer had been released where it
    /// last was.
    pub fn settle(&mut self) -> Option<InteractionTransition> {
        if !self.is_active() {
            return None;
        }
        let from = self.state;
        let effect = self.finish();
        Some(self.transition(from, effect))
    }

    /// Apply one input event against the page under the pointer.
    pub fn handle(
        &mut self,
        page: &Page,
        rules: &LayoutRules,
        event: &InputEvent,
    ) -> InteractionTransition {
        let from = self.state;
        let effect = match (self.state, *event) {
            (InteractionState::Idle, InputEvent::PointerDown { position, .. }) => {
                self.pointer_down(page, rules, position)
            }
            (_, InputEvent::PointerDown { .. }) => InteractionEffect::Noop {
                reason: NoopReason::GestureInProgress,
            },
            (InteractionState::Idle, InputEvent::Key { key, modifiers }) => {
                self.idle_key(page, rules, key, modifiers)
            }
            (InteractionState::Idle, _) => InteractionEffect::Noop {
                reason: NoopReason::IdleWithoutGesture,
            },
            (_, InputEvent::PointerMove { position }) => self.pointer_move(page, rules, position),
            (_, InputEvent::PointerUp { position }) => {
                match self.pointer_move(page, rules, position) {
                    canceled @ InteractionEffect::Canceled { .. } => canceled,
                    _ => self.finish(),
                }
            }
            (_, InputEvent::PointerLeave) => self.finish(),
            (_, InputEvent::Key { key: Key::Escape, .. }) => self.abort(CancelReason::Escape),
            (_, InputEvent::Key { .. }) => InteractionEffect::Noop {
                reason: NoopReason::GestureInProgress,
            },
            (_, InputEvent::Cancel) => self.abort(CancelReason::Programmatic),
        };
        self.transition(from, effect)
    }

    // ====================================================================
    // Steps
    // ====================================================================

    fn pointer_down(&mut self, page: &Page, rules: &LayoutRules, position: Point) -> InteractionEffect {
        match hit_test(page, self.selected, position, rules.handle_size) {
            HitTarget::Canvas => {
                if self.selected.take().is_some() {
                    InteractionEffect::SelectionCleared
                } else {
                    InteractionEffect::Noop {
                        reason: NoopReason::EmptyCanvas,
                    }
                }
            }
            HitTarget::Body { panel } => {
                let Some(rect) = page.panel(panel).map(|p| p.rect) else {
                    return InteractionEffect::Noop {
                        reason: NoopReason::EmptyCanvas,
                    };
                };
                let (dx, dy) = position.delta_from(rect.origin());
                let grab_offset = Point::new(dx, dy);
                self.selected = Some(panel);
                self.state = InteractionState::Dragging {
                    page: page.id(),
                    panel,
                    grab_offset,
                    origin_rect: rect,
                    live: rect,
                };
                InteractionEffect::DragStarted { panel, grab_offset }
            }
            HitTarget::Handle { panel, corner } => {
                let Some(rect) = page.panel(panel).map(|p| p.rect) else {
                    return InteractionEffect::Noop {
                        reason: NoopReason::EmptyCanvas,
                    };
                };
                self.state = InteractionState::Resizing {
                    page: page.id(),
                    panel,
                    handle: corner,
                    anchor_rect: rect,
                    pointer_origin: position,
                    live: rect,
                };
                InteractionEffect::ResizeStarted {
                    panel,
                    handle: corner,
                }
            }
        }
    }

    fn pointer_move(&mut self, page: &Page, rules: &LayoutRules, position: Point) -> InteractionEffect {
        let Some(panel) = self.state.panel() else {
            return InteractionEffect::Noop {
                reason: NoopReason::IdleWithoutGesture,
            };
        };
        if !page.contains_panel(panel) {
            tracing::warn!(panel = %panel, "panel vanished mid-gesture; cancelling");
            return self.abort(CancelReason::PanelRemoved);
        }

        let next = match self.state {
            InteractionState::Idle => {
                return InteractionEffect::Noop {
                    reason: NoopReason::IdleWithoutGesture,
                };
            }
            InteractionState::Dragging {
                grab_offset,
                origin_rect,
                ..
            } => {
                let origin = position.offset(-grab_offset.x, -grab_offset.y);
                let moved =
                    Rect::from_origin_size(rules.snap.snap_point(origin), origin_rect.size());
                clamp(moved, page.size(), rules.min_size)
            }
            InteractionState::Resizing {
                handle,
                anchor_rect,
                pointer_origin,
                ..
            } => {
                let (dx, dy) = position.delta_from(pointer_origin);
                let resized = resize_from_handle(anchor_rect, handle, dx, dy);
                clamp_anchored(
                    rules.snap.snap_rect(resized),
                    handle.opposite(),
                    page.size(),
                    rules.min_size,
                )
            }
        };

        match &mut self.state {
            InteractionState::Dragging { live, .. } | InteractionState::Resizing { live, .. } => {
                if *live == next {
                    return InteractionEffect::Noop {
                        reason: NoopReason::Unchanged,
                    };
                }
                *live = next;
            }
            InteractionState::Idle => {}
        }
        InteractionEffect::LiveUpdated { panel, rect: next }
    }

    /// Leave the gesture, committing only if geometry changed.
    fn finish(&mut self) -> InteractionEffect {
        let state = std::mem::replace(&mut self.state, InteractionState::Idle);
        let gesture = match state {
            InteractionState::Idle => {
                return InteractionEffect::Noop {
                    reason: NoopReason::IdleWithoutGesture,
                };
            }
            InteractionState::Dragging { .. } => GestureKind::Drag,
            InteractionState::Resizing { .. } => GestureKind::Resize,
        };
        let (Some(page), Some(panel), Some((from, to))) = (state.page(), state.panel(), state.rects())
        else {
            return InteractionEffect::Noop {
                reason: NoopReason::IdleWithoutGesture,
            };
        };
        if from == to {
            InteractionEffect::Released { panel }
        } else {
            InteractionEffect::Committed {
                page,
                panel,
                gesture,
                from,
                to,
            }
        }
    }

    fn idle_key(
        &mut self,
        page: &Page,
        rules: &LayoutRules,
        key: Key,
        modifiers: Modifiers,
    ) -> InteractionEffect {
        if key == Key::Escape && self.selected.take().is_some() {
            return InteractionEffect::SelectionCleared;
        }
        if !matches!(key, Key::Delete) && key.arrow_direction().is_none() {
            return InteractionEffect::Noop {
                reason: NoopReason::UnhandledKey,
            };
        }
        let Some(panel) = self.selected else {
            return InteractionEffect::Noop {
                reason: NoopReason::NoSelection,
            };
        };
        let Some(current) = page.panel(panel).map(|p| p.rect) else {
            tracing::warn!(panel = %panel, "selected panel is gone; clearing selection");
            self.selected = None;
            return InteractionEffect::SelectionCleared;
        };

        if key == Key::Delete {
            return InteractionEffect::DeleteRequested {
                page: page.id(),
                panel,
            };
        }

        let Some((ux, uy)) = key.arrow_direction() else {
            return InteractionEffect::Noop {
                reason: NoopReason::UnhandledKey,
            };
        };
        let mut step = rules.snap.nudge_step(self.nudge_step);
        if modifiers.contains(Modifiers::SHIFT) {
            step = step.saturating_mul(NUDGE_SHIFT_MULTIPLIER);
        }
        let moved = current.translated(ux.saturating_mul(step), uy.saturating_mul(step));
        let to = clamp(moved, page.size(), rules.min_size);
        if to == current {
            return InteractionEffect::Noop {
                reason: NoopReason::Unchanged,
            };
        }
        InteractionEffect::Nudged {
            page: page.id(),
            panel,
            from: current,
            to,
        }
    }

    fn cancel_with(&mut self, reason: CancelReason) -> Option<InteractionTransition> {
        if !self.is_active() {
            return None;
        }
        let from = self.state;
        let effect = self.abort(reason);
        Some(self.transition(from, effect))
    }

    /// Drop the active gesture; the committed rectangle was never touched.
    fn abort(&mut self, reason: CancelReason) -> InteractionEffect {
        let state = std::mem::replace(&mut self.state, InteractionState::Idle);
        match (state.panel(), state.rects()) {
            (Some(panel), Some((restored, _))) => InteractionEffect::Canceled {
                panel,
                restored,
                reason,
            },
            _ => InteractionEffect::Noop {
                reason: NoopReason::IdleWithoutGesture,
            },
        }
    }

    fn transition(&mut self, from: InteractionState, effect: InteractionEffect) -> InteractionTransition {
        self.sequence = self.sequence.saturating_add(1);
        InteractionTransition {
            sequence: self.sequence,
            from,
            to: self.state,
            effect,
        }
    }
}

/// Rectangle implied by dragging `handle` of `rect` by `(dx, dy)`; the
/// opposite corner stays put. May be inverted or undersized; callers clamp.
#[must_use]
pub fn resize_from_handle(rect: Rect, handle: Corner, dx: i32, dy: i32) -> Rect {
    let (x, width) = if handle.is_left() {
        (rect.x.saturating_add(dx), rect.width.saturating_sub(dx))
    } else {
        (rect.x, rect.width.saturating_add(dx))
    };
    let (y, height) = if handle.is_top() {
        (rect.y.saturating_add(dy), rect.height.saturating_sub(dy))
    } else {
        (rect.y, rect.height.saturating_add(dy))
    };
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelforge_layout::{Repository, SnapRules};

    fn setup() -> (Repository, PageId, PanelId) {
        let mut repo = Repository::new(LayoutRules::default());
        let page = repo.page(0).unwrap().id();
        let panel = repo.add_panel(page).unwrap().id;
        (repo, page, panel)
    }

    fn run(
        machine: &mut InteractionMachine,
        repo: &Repository,
        page: PageId,
        event: InputEvent,
    ) -> InteractionTransition {
        machine.handle(repo.page_by_id(page).unwrap(), repo.rules(), &event)
    }

    #[test]
    fn drag_clamps_to_page_and_commits_on_release() {
        let (repo, page, panel) = setup();
        let mut m = InteractionMachine::default();

        let t = run(&mut m, &repo, page, InputEvent::pointer_down(60, 60));
        assert_eq!(
            t.effect,
            InteractionEffect::DragStarted {
                panel,
                grab_offset: Point::new(10, 10)
            }
        );
        assert_eq!(m.selected(), Some(panel));

        let t = run(&mut m, &repo, page, InputEvent::pointer_move(1060, 1060));
        assert_eq!(
            t.effect,
            InteractionEffect::LiveUpdated {
                panel,
                rect: Rect::new(600, 850, 200, 150)
            }
        );
        // Committed geometry is untouched while the gesture is live.
        assert_eq!(repo.require_panel(panel).unwrap().rect, Rect::new(50, 50, 200, 150));

        let t = run(&mut m, &repo, page, InputEvent::pointer_up(1060, 1060));
        assert_eq!(
            t.effect,
            InteractionEffect::Committed {
                page,
                panel,
                gesture: GestureKind::Drag,
                from: Rect::new(50, 50, 200, 150),
                to: Rect::new(600, 850, 200, 150),
            }
        );
        assert_eq!(t.to, InteractionState::Idle);
        assert!(m.live_rect().is_none());
    }

    #[test]
    fn click_without_motion_releases_without_commit() {
        let (repo, page, panel) = setup();
        let mut m = InteractionMachine::default();
        run(&mut m, &repo, page, InputEvent::pointer_down(100, 100));
        let t = run(&mut m, &repo, page, InputEvent::pointer_up(100, 100));
        assert_eq!(t.effect, InteractionEffect::Released { panel });
        assert!(!t.effect.needs_commit());
    }

    #[test]
    fn canvas_click_clears_selection() {
        let (repo, page, panel) = setup();
        let mut m = InteractionMachine::default();
        m.select(Some(panel));
        let t = run(&mut m, &repo, page, InputEvent::pointer_down(700, 900));
        assert_eq!(t.effect, InteractionEffect::SelectionCleared);
        assert_eq!(m.selected(), None);
        let t = run(&mut m, &repo, page, InputEvent::pointer_down(700, 900));
        assert_eq!(
            t.effect,
            InteractionEffect::Noop {
                reason: NoopReason::EmptyCanvas
            }
        );
    }

    #[test]
    fn resize_from_each_corner_keeps_anchor() {
        let rect = Rect::new(100, 100, 200, 200);
        assert_eq!(
            resize_from_handle(rect, Corner::TopLeft, 30, 40),
            Rect::new(130, 140, 170, 160)
        );
        assert_eq!(
            resize_from_handle(rect, Corner::TopRight, 30, 40),
            Rect::new(100, 140, 230, 160)
        );
        assert_eq!(
            resize_from_handle(rect, Corner::BottomLeft, 30, 40),
            Rect::new(130, 100, 170, 240)
        );
        assert_eq!(
            resize_from_handle(rect, Corner::BottomRight, 30, 40),
            Rect::new(100, 100, 230, 240)
        );
    }

    #[test]
    fn resize_respects_min_size_and_anchor() {
        let (repo, page, panel) = setup();
        let mut m = InteractionMachine::default();
        m.select(Some(panel));
        // Top-left handle of (50, 50, 200, 150).
        let t = run(&mut m, &repo, page, InputEvent::pointer_down(50, 50));
        assert_eq!(
            t.effect,
            InteractionEffect::ResizeStarted {
                panel,
                handle: Corner::TopLeft
            }
        );
        let t = run(&mut m, &repo, page, InputEvent::pointer_move(400, 400));
        assert_eq!(
            t.effect,
            InteractionEffect::LiveUpdated {
                panel,
                rect: Rect::new(200, 150, 50, 50)
            }
        );
        let t = run(&mut m, &repo, page, InputEvent::pointer_up(400, 400));
        assert!(matches!(
            t.effect,
            InteractionEffect::Committed { gesture: GestureKind::Resize, to, .. }
                if to == Rect::new(200, 150, 50, 50)
        ));
    }

    #[test]
    fn escape_cancels_and_restores() {
        let (repo, page, panel) = setup();
        let mut m = InteractionMachine::default();
        run(&mut m, &repo, page, InputEvent::pointer_down(60, 60));
        run(&mut m, &repo, page, InputEvent::pointer_move(300, 300));
        let t = run(&mut m, &repo, page, InputEvent::key(Key::Escape));
        assert_eq!(
            t.effect,
            InteractionEffect::Canceled {
                panel,
                restored: Rect::new(50, 50, 200, 150),
                reason: CancelReason::Escape,
            }
        );
        assert!(!m.is_active());
        assert_eq!(m.selected(), Some(panel));
    }

    #[test]
    fn pointer_leave_commits_dirty_gesture() {
        let (repo, page, _) = setup();
        let mut m = InteractionMachine::default();
        run(&mut m, &repo, page, InputEvent::pointer_down(60, 60));
        run(&mut m, &repo, page, InputEvent::pointer_move(110, 60));
        let t = run(&mut m, &repo, page, InputEvent::PointerLeave);
        assert!(matches!(
            t.effect,
            InteractionEffect::Committed { to, .. } if to == Rect::new(100, 50, 200, 150)
        ));
    }

    #[test]
    fn snapping_applies_during_drag() {
        let (repo, page, panel) = setup();
        let mut rules = *repo.rules();
        rules.snap = SnapRules::grid(25);
        let mut m = InteractionMachine::default();
        let page_ref = repo.page_by_id(page).unwrap();
        m.handle(page_ref, &rules, &InputEvent::pointer_down(60, 60));
        let t = m.handle(page_ref, &rules, &InputEvent::pointer_move(123, 77));
        assert_eq!(
            t.effect,
            InteractionEffect::LiveUpdated {
                panel,
                rect: Rect::new(125, 75, 200, 150)
            }
        );
    }

    #[test]
    fn snapped_drag_keeps_off_grid_size() {
        let (mut repo, page, panel) = setup();
        repo.set_panel_rect(panel, Rect::new(50, 50, 210, 160)).unwrap();
        let mut rules = *repo.rules();
        rules.snap = SnapRules::grid(25);
        let mut m = InteractionMachine::default();
        let page_ref = repo.page_by_id(page).unwrap();
        m.handle(page_ref, &rules, &InputEvent::pointer_down(60, 60));
        let t = m.handle(page_ref, &rules, &InputEvent::pointer_move(123, 77));
        assert_eq!(
            t.effect,
            InteractionEffect::LiveUpdated {
                panel,
                rect: Rect::new(125, 75, 210, 160)
            }
        );
    }

    #[test]
    fn snapped_drag_to_extreme_pointer_stays_on_page() {
        let (repo, page, panel) = setup();
        let mut rules = *repo.rules();
        rules.snap = SnapRules::grid(10);
        let mut m = InteractionMachine::default();
        let page_ref = repo.page_by_id(page).unwrap();
        m.handle(page_ref, &rules, &InputEvent::pointer_down(60, 60));
        for position in [
            Point::from_f64(-1e12, -1e12),
            Point::from_f64(1e12, 1e12),
            Point::new(i32::MIN, i32::MAX),
        ] {
            let t = m.handle(page_ref, &rules, &InputEvent::PointerMove { position });
            let InteractionEffect::LiveUpdated { rect, .. } = t.effect else {
                panic!("expected a live update, got {:?}", t.effect);
            };
            assert!(rect.is_within(page_ref.size()));
            assert_eq!(rect.size(), Rect::new(0, 0, 200, 150).size());
        }
        let up = m.handle(
            page_ref,
            &rules,
            &InputEvent::PointerUp { position: Point::from_f64(-1e12, -1e12) },
        );
        assert!(matches!(
            up.effect,
            InteractionEffect::Committed { panel: p, to, .. } if p == panel && to == Rect::new(0, 0, 200, 150)
        ));
    }

    #[test]
    fn arrow_nudges_selected_panel() {
        let (repo, page, panel) = setup();
        let mut m = InteractionMachine::new(1);
        let t = run(&mut m, &repo, page, InputEvent::key(Key::ArrowRight));
        assert_eq!(
            t.effect,
            InteractionEffect::Noop {
                reason: NoopReason::NoSelection
            }
        );
        m.select(Some(panel));
        let t = run(&mut m, &repo, page, InputEvent::key(Key::ArrowRight));
        assert!(matches!(
            t.effect,
            InteractionEffect::Nudged { to, .. } if to == Rect::new(51, 50, 200, 150)
        ));
        let t = run(
            &mut m,
            &repo,
            page,
            InputEvent::Key {
                key: Key::ArrowUp,
                modifiers: Modifiers::SHIFT,
            },
        );
        assert!(matches!(
            t.effect,
            InteractionEffect::Nudged { to, .. } if to == Rect::new(50, 40, 200, 150)
        ));
    }

    #[test]
    fn keys_during_gesture_are_ignored() {
        let (repo, page, _) = setup();
        let mut m = InteractionMachine::default();
        run(&mut m, &repo, page, InputEvent::pointer_down(60, 60));
        let t = run(&mut m, &repo, page, InputEvent::key(Key::ArrowLeft));
        assert_eq!(
            t.effect,
            InteractionEffect::Noop {
                reason: NoopReason::GestureInProgress
            }
        );
        assert!(m.is_active());
    }

    #[test]
    fn vanished_panel_cancels_gesture() {
        let (mut repo, page, panel) = setup();
        let mut m = InteractionMachine::default();
        run(&mut m, &repo, page, InputEvent::pointer_down(60, 60));
        repo.delete_panel(panel).unwrap();
        let t = run(&mut m, &repo, page, InputEvent::pointer_move(200, 200));
        assert!(matches!(
            t.effect,
            InteractionEffect::Canceled {
                reason: CancelReason::PanelRemoved,
                ..
            }
        ));
        assert!(!m.is_active());
    }

    #[test]
    fn settle_commits_live_gesture() {
        let (repo, page, _) = setup();
        let mut m = InteractionMachine::default();
        assert!(m.settle().is_none());
        run(&mut m, &repo, page, InputEvent::pointer_down(60, 60));
        run(&mut m, &repo, page, InputEvent::pointer_move(70, 60));
        let t = m.settle().unwrap();
        assert!(t.effect.needs_commit());
        assert!(!m.is_active());
    }

    #[test]
    fn sequences_increase() {
        let (repo, page, _) = setup();
        let mut m = InteractionMachine::default();
        let a = run(&mut m, &repo, page, InputEvent::pointer_move(1, 1));
        let b = run(&mut m, &repo, page, InputEvent::pointer_down(60, 60));
        assert!(b.sequence > a.sequence);
    }
}
