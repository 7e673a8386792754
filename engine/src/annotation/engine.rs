//! Pointer-driven state machine that drafts, moves and resizes drawings.

use shared::{Candle, ChartPoint, Drawing, DrawingId, PixelPoint};
use std::collections::HashSet;
use std::sync::Arc;

use super::constraints::resize;
use super::draft::Draft;
use super::hit_test::{hit_test, Handle, Hit};
use super::history::History;
use super::orders::OrderSource;
use super::tool::ActiveTool;
use crate::chart::{CoordinateConverter, PanController, RenderSurface, ViewRanges};
use crate::config::{DrawingStyles, EngineSettings, InteractionSettings};
use crate::data::{WorkspacePersistence, WorkspaceSnapshot};
use crate::error::EngineResult;
use crate::store::{Store, Workspace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Pins a trendline draft to its start price.
    pub shift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: PixelPoint,
    pub button: PointerButton,
    pub modifiers: Modifiers,
    pub pointer_id: u32,
}

impl PointerEvent {
    /// A primary-button event for pointer 1 at `(x, y)`.
    pub fn primary(x: f64, y: f64) -> Self {
        Self {
            position: PixelPoint::new(x, y),
            button: PointerButton::Primary,
            modifiers: Modifiers::default(),
            pointer_id: 1,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }
}

/// Coarse view of the current gesture, for callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    Idle,
    Drafting,
    Moving,
    Resizing,
    Panning,
}

#[derive(Debug, Clone)]
enum InteractionState {
    Idle,
    Drafting(Draft),
    Moving {
        id: DrawingId,
        origin: ChartPoint,
        snapshot: Drawing,
    },
    Resizing {
        id: DrawingId,
        handle: Handle,
        origin: ChartPoint,
        snapshot: Drawing,
    },
    Panning,
}

pub struct AnnotationEngine {
    settings: InteractionSettings,
    styles: DrawingStyles,
    workspace: Store<Workspace>,
    orders: Arc<dyn OrderSource>,
    persistence: Option<Arc<dyn WorkspacePersistence>>,
    history: History,
    state: InteractionState,
    pan: PanController,
    captured: Option<u32>,
}

fn chart_point(surface: &dyn RenderSurface, candles: &[Candle], position: PixelPoint) -> Option<ChartPoint> {
    CoordinateConverter::new(surface, candles).to_chart(position)
}

impl AnnotationEngine {
    pub fn new(settings: &EngineSettings, workspace: Store<Workspace>, orders: Arc<dyn OrderSource>) -> Self {
        Self {
            settings: settings.interaction.clone(),
            styles: settings.styles.clone(),
            workspace,
            orders,
            persistence: None,
            history: History::new(settings.interaction.history_limit),
            state: InteractionState::Idle,
            pan: PanController::new(),
            captured: None,
        }
    }

    pub fn with_persistence(mut self, persistence: Arc<dyn WorkspacePersistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn workspace(&self) -> &Store<Workspace> {
        &self.workspace
    }

    pub fn drawings(&self) -> Vec<Drawing> {
        self.workspace.get().drawings.clone()
    }

    pub fn selected(&self) -> Option<DrawingId> {
        self.workspace.get().selected
    }

    pub fn active_tool(&self) -> ActiveTool {
        self.workspace.get().active_tool
    }

    pub fn mode(&self) -> InteractionMode {
        match self.state {
            InteractionState::Idle => InteractionMode::Idle,
            InteractionState::Drafting(_) => InteractionMode::Drafting,
            InteractionState::Moving { .. } => InteractionMode::Moving,
            InteractionState::Resizing { .. } => InteractionMode::Resizing,
            InteractionState::Panning => InteractionMode::Panning,
        }
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            InteractionState::Drafting(draft) => Some(draft),
            _ => None,
        }
    }

    /// The drawing the current draft would commit to, for live rendering.
    pub fn preview(&self) -> Option<Drawing> {
        self.draft()
            .map(|draft| draft.to_drawing(&self.styles, self.settings.min_position_span_secs))
    }

    /// Drawings referenced by a live order; the renderer marks these.
    pub fn locked_drawing_ids(&self) -> HashSet<DrawingId> {
        self.orders.locked_drawings()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn pan_baseline(&self) -> Option<ViewRanges> {
        self.pan.baseline()
    }

    pub fn pointer_down(&mut self, surface: &mut dyn RenderSurface, candles: &[Candle], event: PointerEvent) {
        if !matches!(self.state, InteractionState::Idle) {
            tracing::debug!(mode = ?self.mode(), "Pointer down ignored: gesture already in progress");
            return;
        }
        if event.button != PointerButton::Primary {
            return;
        }

        let workspace = self.workspace.get();
        if let Some(kind) = workspace.active_tool.draft_kind() {
            let Some(start) = chart_point(&*surface, candles, event.position) else {
                tracing::debug!("Draft not started: pointer outside the chart");
                return;
            };
            self.state = InteractionState::Drafting(Draft::new(kind, start));
            self.capture(surface, event.pointer_id);
            return;
        }

        let locked = self.orders.locked_drawings();
        let (hit, origin) = {
            let converter = CoordinateConverter::new(&*surface, candles);
            (
                hit_test(&workspace.drawings, &locked, &converter, event.position, &self.settings),
                converter.to_chart(event.position),
            )
        };

        match (hit, origin) {
            (Some(hit), Some(origin)) => {
                let id = hit.id();
                let Some(snapshot) = workspace.drawing(id).cloned() else {
                    return;
                };
                self.history.checkpoint(&workspace.drawings);
                self.workspace.modify(|ws| ws.selected = Some(id));
                self.state = match hit {
                    Hit::Handle { handle, .. } => {
                        tracing::debug!(%id, ?handle, "Resize started");
                        InteractionState::Resizing { id, handle, origin, snapshot }
                    }
                    Hit::Body { .. } => {
                        tracing::debug!(%id, "Move started");
                        InteractionState::Moving { id, origin, snapshot }
                    }
                };
            }
            (Some(_), None) => {
                tracing::debug!("Hit ignored: pointer position has no chart coordinate");
                return;
            }
            (None, _) => {
                if workspace.selected.is_some() {
                    self.workspace.modify(|ws| ws.selected = None);
                }
                if !self.pan.start(&*surface, event.position) {
                    return;
                }
                self.state = InteractionState::Panning;
            }
        }
        self.capture(surface, event.pointer_id);
    }

    pub fn pointer_move(&mut self, surface: &mut dyn RenderSurface, candles: &[Candle], event: PointerEvent) {
        match &mut self.state {
            InteractionState::Idle => {}
            InteractionState::Drafting(draft) => {
                if let Some(point) = chart_point(&*surface, candles, event.position) {
                    draft.update_end(point, event.modifiers.shift);
                }
            }
            InteractionState::Moving { id, origin, snapshot } => {
                let Some(current) = chart_point(&*surface, candles, event.position) else {
                    return;
                };
                let moved = snapshot.translated(current.time - origin.time, current.price - origin.price);
                let id = *id;
                self.workspace.modify(|ws| {
                    if !ws.replace_drawing(moved) {
                        tracing::debug!(%id, "Moved drawing vanished mid-gesture");
                    }
                });
            }
            InteractionState::Resizing { id, handle, origin, snapshot } => {
                let converter = CoordinateConverter::new(&*surface, candles);
                let Some(pointer) = converter.to_chart(event.position) else {
                    return;
                };
                let Some(current) = self.workspace.get().drawing(*id).cloned() else {
                    return;
                };
                let next = resize(
                    &current,
                    snapshot,
                    *handle,
                    pointer.time - origin.time,
                    pointer.price - origin.price,
                    &converter,
                    &self.settings,
                );
                if next != current {
                    self.workspace.modify(|ws| {
                        ws.replace_drawing(next);
                    });
                }
            }
            InteractionState::Panning => {
                self.pan.update(surface, event.position);
            }
        }
    }

    pub fn pointer_up(&mut self, surface: &mut dyn RenderSurface, candles: &[Candle], event: PointerEvent) {
        match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::Idle => {}
            InteractionState::Drafting(mut draft) => {
                if let Some(point) = chart_point(&*surface, candles, event.position) {
                    draft.update_end(point, event.modifiers.shift);
                }
                self.commit_draft(draft);
            }
            InteractionState::Moving { id, snapshot, .. } | InteractionState::Resizing { id, snapshot, .. } => {
                self.finish_gesture(id, &snapshot);
            }
            InteractionState::Panning => {
                self.pan.end(&*surface);
            }
        }
        self.release(surface, event.pointer_id);
    }

    /// The pointer left the chart: drafts are dropped, other gestures finish as on pointer-up.
    pub fn pointer_leave(&mut self, surface: &mut dyn RenderSurface, event: PointerEvent) {
        match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::Idle => {}
            InteractionState::Drafting(_) => {
                tracing::debug!("Draft cancelled: pointer left the chart");
            }
            InteractionState::Moving { id, snapshot, .. } | InteractionState::Resizing { id, snapshot, .. } => {
                self.finish_gesture(id, &snapshot);
            }
            InteractionState::Panning => {
                self.pan.end(&*surface);
            }
        }
        self.release(surface, event.pointer_id);
    }

    fn capture(&mut self, surface: &mut dyn RenderSurface, pointer_id: u32) {
        surface.capture_pointer(pointer_id);
        self.captured = Some(pointer_id);
    }

    fn release(&mut self, surface: &mut dyn RenderSurface, pointer_id: u32) {
        if self.captured == Some(pointer_id) {
            surface.release_pointer(pointer_id);
            self.captured = None;
        }
    }

    fn commit_draft(&mut self, draft: Draft) {
        if !draft.has_movement() {
            tracing::debug!(kind = ?draft.kind, "Draft discarded: no movement");
            return;
        }
        let drawing = draft.to_drawing(&self.styles, self.settings.min_position_span_secs);
        let id = drawing.id();
        let kind = drawing.kind_name();

        self.history.checkpoint(&self.workspace.get().drawings);
        self.workspace.modify(|ws| {
            ws.drawings.push(drawing);
            ws.selected = Some(id);
        });
        tracing::debug!(%id, kind, "Drawing committed");
        self.persist();
    }

    fn finish_gesture(&mut self, id: DrawingId, snapshot: &Drawing) {
        let unchanged = self.workspace.get().drawing(id) == Some(snapshot);
        if unchanged {
            self.history.discard_last();
        } else {
            tracing::debug!(%id, "Gesture finished");
            self.persist();
        }
    }

    /// Aborts whatever gesture is running, restoring a dragged drawing.
    fn abort_gesture(&mut self) {
        match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::Moving { snapshot, .. } | InteractionState::Resizing { snapshot, .. } => {
                self.workspace.modify(|ws| {
                    ws.replace_drawing(snapshot);
                });
                self.history.discard_last();
            }
            InteractionState::Panning => self.pan.abort(),
            InteractionState::Drafting(_) | InteractionState::Idle => {}
        }
    }

    pub fn set_tool(&mut self, tool: ActiveTool) {
        self.abort_gesture();
        self.workspace.modify(|ws| {
            ws.active_tool = tool;
            if tool != ActiveTool::Select {
                ws.selected = None;
            }
        });
    }

    pub fn cancel(&mut self) {
        self.abort_gesture();
        self.workspace.modify(|ws| ws.selected = None);
    }

    /// Selects `id`, or clears the selection with `None`. Locked or unknown drawings are refused.
    pub fn select(&mut self, id: Option<DrawingId>) -> bool {
        if let Some(id) = id {
            if self.workspace.get().drawing(id).is_none() {
                return false;
            }
            if self.orders.locked_drawings().contains(&id) {
                tracing::debug!(%id, "Selection refused: drawing is locked by a live order");
                return false;
            }
        }
        self.workspace.modify(|ws| ws.selected = id);
        true
    }

    /// Deletes the selection unless a live order still references it.
    pub fn delete_selected(&mut self) -> bool {
        let workspace = self.workspace.get();
        let Some(id) = workspace.selected_drawing().map(Drawing::id) else {
            return false;
        };
        if self.orders.locked_drawings().contains(&id) {
            tracing::debug!(%id, "Delete refused: drawing is locked by a live order");
            return false;
        }
        self.history.checkpoint(&workspace.drawings);
        self.workspace.modify(|ws| {
            ws.drawings.retain(|d| d.id() != id);
            ws.selected = None;
        });
        tracing::debug!(%id, "Drawing deleted");
        self.persist();
        true
    }

    /// Copies the selection under a new id, nudged up by a fraction of its price.
    pub fn duplicate_selected(&mut self) -> Option<DrawingId> {
        let workspace = self.workspace.get();
        let original = workspace.selected_drawing()?;
        let offset = original.reference_price().abs() * self.settings.duplicate_price_fraction;
        let copy = original.with_new_id().translated(0, offset);
        let id = copy.id();

        self.history.checkpoint(&workspace.drawings);
        self.workspace.modify(|ws| {
            ws.drawings.push(copy);
            ws.selected = Some(id);
        });
        tracing::debug!(%id, from = %original.id(), "Drawing duplicated");
        self.persist();
        Some(id)
    }

    pub fn set_trendline_extension(&mut self, id: DrawingId, extend_left: bool, extend_right: bool) -> bool {
        let workspace = self.workspace.get();
        let Some(Drawing::Trendline(line)) = workspace.drawing(id) else {
            return false;
        };
        if self.orders.locked_drawings().contains(&id) {
            tracing::debug!(%id, "Extension change refused: drawing is locked by a live order");
            return false;
        }
        if line.extend_left == extend_left && line.extend_right == extend_right {
            return true;
        }
        let mut updated = line.clone();
        updated.extend_left = extend_left;
        updated.extend_right = extend_right;

        self.history.checkpoint(&workspace.drawings);
        self.workspace.modify(|ws| {
            ws.replace_drawing(Drawing::Trendline(updated));
        });
        self.persist();
        true
    }

    pub fn undo(&mut self) -> bool {
        self.step_history(true)
    }

    pub fn redo(&mut self) -> bool {
        self.step_history(false)
    }

    fn step_history(&mut self, backwards: bool) -> bool {
        if !matches!(self.state, InteractionState::Idle) {
            tracing::debug!(mode = ?self.mode(), "History step ignored during a gesture");
            return false;
        }
        let current = self.workspace.get().drawings.clone();
        let restored = if backwards { self.history.undo(&current) } else { self.history.redo(&current) };
        let Some(drawings) = restored else {
            return false;
        };
        self.workspace.modify(|ws| {
            ws.drawings = drawings;
            if let Some(id) = ws.selected {
                if ws.drawing(id).is_none() {
                    ws.selected = None;
                }
            }
        });
        self.persist();
        true
    }

    pub fn set_playback_cursor(&mut self, cursor: Option<usize>) {
        self.workspace.modify(|ws| ws.playback_cursor = cursor);
    }

    /// Saves the current workspace, then swaps in the one stored for `dataset_id`.
    pub fn load_dataset(&mut self, dataset_id: &str) -> EngineResult<()> {
        self.abort_gesture();
        self.persist();

        let snapshot = match &self.persistence {
            Some(persistence) => persistence.load(dataset_id)?.unwrap_or_default(),
            None => WorkspaceSnapshot::default(),
        };
        self.history.clear();
        let count = snapshot.drawings.len();
        self.workspace.modify(|ws| {
            ws.dataset_id = Some(dataset_id.to_string());
            ws.drawings = snapshot.drawings;
            ws.selected = None;
            ws.playback_cursor = snapshot.playback_cursor;
        });
        tracing::info!(dataset = dataset_id, drawings = count, "Workspace switched");
        Ok(())
    }

    fn persist(&self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        let workspace = self.workspace.get();
        let Some(dataset_id) = workspace.dataset_id.as_deref() else {
            return;
        };
        let snapshot = WorkspaceSnapshot {
            drawings: workspace.drawings.clone(),
            playback_cursor: workspace.playback_cursor,
        };
        if let Err(e) = persistence.save(dataset_id, &snapshot) {
            tracing::warn!(dataset = dataset_id, error = %e, "Failed to save workspace");
        }
    }
}
