//! Paint Session
//!
//! Ties a canvas to its undo history, replay log and brush. Every
//! user-visible operation goes through here:
//! 1. The action is validated against the canvas
//! 2. It is applied
//! 3. It is recorded in the history and (unless replaying) the replay log
//!
//! Undo and redo are recorded in the replay log too, so playback
//! reproduces the session exactly.

use std::sync::Arc;

use crate::action::{CellEdit, PaintAction};
use crate::brush::Brush;
use crate::canvas::{Canvas, Frame, ACCUMULATE_LAYERS_PER_CATALOG_ENTRY};
use crate::color::Rgb;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::history::UndoManager;
use crate::layer::{global_catalog, LayerCatalog};
use crate::replay::{ReplayLog, ReplayStep};

/// One editing session over one canvas.
#[derive(Debug, Clone)]
pub struct PaintSession {
    canvas: Canvas,
    history: UndoManager,
    replay: ReplayLog,
    brush: Brush,
    background: Rgb,
}

impl PaintSession {
    /// Start a session on the process-wide catalog
    pub fn new(config: &SessionConfig) -> Result<Self> {
        Self::with_catalog(config, global_catalog())
    }

    /// Start a session on a specific catalog
    pub fn with_catalog(config: &SessionConfig, catalog: Arc<LayerCatalog>) -> Result<Self> {
        config.validate()?;

        let accumulate_capacity = config
            .accumulate_capacity
            .unwrap_or(ACCUMULATE_LAYERS_PER_CATALOG_ENTRY * catalog.len());
        let canvas = Canvas::build(
            config.policy,
            config.width,
            config.height,
            catalog,
            accumulate_capacity,
        )?;

        Ok(Self {
            canvas,
            history: UndoManager::new(config.history_capacity),
            replay: ReplayLog::new(config.replay_capacity),
            brush: Brush::new(config.brush_size)?,
            background: config.background,
        })
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn history(&self) -> &UndoManager {
        &self.history
    }

    pub fn replay_log(&self) -> &ReplayLog {
        &self.replay
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn brush_mut(&mut self) -> &mut Brush {
        &mut self.brush
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    /// Validate, apply and record an action.
    ///
    /// Edits that change nothing are dropped; a draw action left with no
    /// edits is not recorded and `None` is returned.
    pub fn perform(&mut self, action: PaintAction) -> Result<Option<Arc<PaintAction>>> {
        action.validate(&self.canvas)?;

        let action = action.commit(&mut self.canvas);
        if !action.is_special() && action.edits().is_empty() {
            log::debug!("Action {} changed nothing", action.id());
            return Ok(None);
        }

        let action = Arc::new(action);
        self.record(&action);
        Ok(Some(action))
    }

    /// Paint `layer` with the brush centred on a cell.
    ///
    /// Only edits that changed a cell are recorded. Returns `None` if the
    /// stroke changed nothing.
    pub fn paint(
        &mut self,
        layer: &str,
        column: usize,
        row: usize,
    ) -> Result<Option<Arc<PaintAction>>> {
        self.stroke(layer, column, row, false)
    }

    /// Erase `layer` with the brush centred on a cell.
    pub fn erase(
        &mut self,
        layer: &str,
        column: usize,
        row: usize,
    ) -> Result<Option<Arc<PaintAction>>> {
        self.stroke(layer, column, row, true)
    }

    fn stroke(
        &mut self,
        layer: &str,
        column: usize,
        row: usize,
        is_erase: bool,
    ) -> Result<Option<Arc<PaintAction>>> {
        self.canvas.check_cell(column, row)?;
        let layer = self.canvas.catalog().require(layer)?.clone();

        let edits = self
            .brush
            .footprint(column, row, self.canvas.width(), self.canvas.height())
            .into_iter()
            .map(|(x, y)| {
                if is_erase {
                    CellEdit::erase(x, y, layer.clone())
                } else {
                    CellEdit::add(x, y, layer.clone())
                }
            })
            .collect();

        self.perform(PaintAction::draw(edits))
    }

    /// Trigger the canvas-wide special effect
    pub fn special(&mut self) -> Arc<PaintAction> {
        let action = Arc::new(PaintAction::special().commit(&mut self.canvas));
        self.record(&action);
        action
    }

    fn record(&mut self, action: &Arc<PaintAction>) {
        log::debug!("Performed: {}", action);
        self.history.record(Arc::clone(action));
        self.replay.record(Arc::clone(action), false);
    }

    /// Undo the most recent action
    pub fn undo(&mut self) -> Option<Arc<PaintAction>> {
        let action = self.history.undo(&mut self.canvas)?;
        self.replay.record(Arc::clone(&action), true);
        Some(action)
    }

    /// Redo the most recently undone action
    pub fn redo(&mut self) -> Option<Arc<PaintAction>> {
        let action = self.history.redo(&mut self.canvas)?;
        self.replay.record(Arc::clone(&action), false);
        Some(action)
    }

    /// Swap in a blank canvas and begin playing the log back onto it.
    ///
    /// The undo history refers to the old canvas and is cleared.
    pub fn start_replay(&mut self) {
        self.canvas = self.canvas.blank_like();
        self.history.clear();
        self.replay.begin_replay();
    }

    /// Play the next logged entry
    pub fn step_replay(&mut self) -> ReplayStep {
        self.replay.step(&mut self.canvas)
    }

    pub fn is_replaying(&self) -> bool {
        self.replay.is_replaying()
    }

    /// Play a copy of the log to completion onto `canvas`, leaving this
    /// session untouched. Returns how many entries were played.
    pub fn play_back_onto(&self, canvas: &mut Canvas) -> usize {
        let mut log = self.replay.clone();
        log.begin_replay();
        log.play_to_end(canvas)
    }

    /// Forget all undo/redo history
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Empty the replay log
    pub fn clear_replay(&mut self) {
        self.replay.reset();
    }

    /// Resolve every cell against the session background
    pub fn render(&self, timestamp: u64) -> Frame {
        self.canvas.render(self.background, timestamp)
    }
}
