//! Paint Actions
//!
//! A [`PaintAction`] records one user operation: either a batch of cell
//! edits or a canvas-wide special effect. Actions are immutable once built
//! and are shared (via `Arc`) between the undo history and the replay log.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::canvas::{Canvas, SpecialRecord};
use crate::error::Result;
use crate::layer::Layer;
use crate::store::{CellStore, LayerStore};

/// One add or erase of a layer at one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEdit {
    pub column: usize,
    pub row: usize,
    pub layer: Layer,
    pub is_erase: bool,
    displaced: Option<Layer>,
}

impl CellEdit {
    /// An edit that adds `layer` at a cell
    pub fn add(column: usize, row: usize, layer: Layer) -> Self {
        Self {
            column,
            row,
            layer,
            is_erase: false,
            displaced: None,
        }
    }

    /// An edit that erases `layer` at a cell
    pub fn erase(column: usize, row: usize, layer: Layer) -> Self {
        Self {
            column,
            row,
            layer,
            is_erase: true,
            displaced: None,
        }
    }

    /// The layer this edit pushed out of its cell when first applied
    pub fn displaced(&self) -> Option<&Layer> {
        self.displaced.as_ref()
    }

    /// First application: remember what the edit pushes out.
    fn commit(&mut self, canvas: &mut Canvas) -> bool {
        let store = canvas.store_at_mut(self.column, self.row);
        let displaced = store.displaced_by(&self.layer, self.is_erase);
        let changed = self.reapply_to(store);
        if changed {
            self.displaced = displaced;
        }
        changed
    }

    fn reapply(&self, canvas: &mut Canvas) -> bool {
        self.reapply_to(canvas.store_at_mut(self.column, self.row))
    }

    fn reapply_to(&self, store: &mut CellStore) -> bool {
        if self.is_erase {
            store.erase(&self.layer)
        } else {
            store.add(&self.layer)
        }
    }

    fn revert(&self, canvas: &mut Canvas) {
        let store = canvas.store_at_mut(self.column, self.row);
        if self.is_erase {
            store.restore(self.displaced.as_ref().unwrap_or(&self.layer));
        } else {
            store.retract(&self.layer, self.displaced.as_ref());
        }
    }
}

/// An immutable, replayable and undoable record of one operation.
#[derive(Debug, Clone)]
pub struct PaintAction {
    id: Uuid,
    recorded_at: DateTime<Utc>,
    edits: Vec<CellEdit>,
    is_special: bool,
    special_record: SpecialRecord,
}

impl PaintAction {
    /// A draw/erase action made of ordered cell edits
    pub fn draw(edits: Vec<CellEdit>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            edits,
            is_special: false,
            special_record: SpecialRecord::default(),
        }
    }

    /// A canvas-wide special action.
    ///
    /// On a sequence canvas this action can only be undone once it carries
    /// the record of what it removed; see [`PaintAction::commit`].
    pub fn special() -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            edits: Vec::new(),
            is_special: true,
            special_record: SpecialRecord::default(),
        }
    }

    /// Attach what the special effect removed when it was first applied
    pub fn with_special_record(mut self, record: SpecialRecord) -> Self {
        self.special_record = record;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn edits(&self) -> &[CellEdit] {
        &self.edits
    }

    pub fn is_special(&self) -> bool {
        self.is_special
    }

    pub fn special_record(&self) -> &SpecialRecord {
        &self.special_record
    }

    /// Check every edit's address and layer against a canvas
    pub fn validate(&self, canvas: &Canvas) -> Result<()> {
        for edit in &self.edits {
            canvas.check_cell(edit.column, edit.row)?;
            canvas.check_layer(&edit.layer)?;
        }
        Ok(())
    }

    /// Apply a freshly built action for the first time.
    ///
    /// Edits that change nothing are dropped, and each remaining edit
    /// remembers what it displaced so [`PaintAction::undo_apply`] is exact.
    /// A special action records what the effect removed.
    pub fn commit(mut self, canvas: &mut Canvas) -> Self {
        if self.is_special {
            self.special_record = canvas.trigger_special();
            return self;
        }

        let total = self.edits.len();
        self.edits.retain_mut(|edit| edit.commit(canvas));
        log::trace!("Committed {} ({} of {} edits changed)", self.id, self.edits.len(), total);
        self
    }

    /// Apply the action forward.
    ///
    /// Panics if an edit addresses a cell outside the canvas.
    pub fn redo_apply(&self, canvas: &mut Canvas) {
        if self.is_special {
            let removed = canvas.trigger_special();
            log::trace!("Special {} removed {} layers", self.id, removed.len());
            return;
        }

        let changed = self.edits.iter().filter(|edit| edit.reapply(canvas)).count();
        log::trace!("Applied {} ({} of {} edits changed)", self.id, changed, self.edits.len());
    }

    /// Apply the exact inverse of [`PaintAction::redo_apply`].
    ///
    /// Edits are reverted in reverse order, each putting back what it
    /// displaced. Exact only for an action built by [`PaintAction::commit`]
    /// and undone against the state it left behind.
    pub fn undo_apply(&self, canvas: &mut Canvas) {
        if self.is_special {
            canvas.revert_special(&self.special_record);
            return;
        }

        for edit in self.edits.iter().rev() {
            edit.revert(canvas);
        }
        log::trace!("Reverted {} ({} edits)", self.id, self.edits.len());
    }

    /// Short human-readable summary
    pub fn description(&self) -> String {
        if self.is_special {
            return "special".to_string();
        }
        let erases = self.edits.iter().filter(|e| e.is_erase).count();
        let adds = self.edits.len() - erases;
        match (adds, erases) {
            (0, 0) => "empty".to_string(),
            (n, 0) => format!("paint {} in {} cells", self.edits[0].layer, n),
            (0, n) => format!("erase {} in {} cells", self.edits[0].layer, n),
            (a, e) => format!("{} adds, {} erases", a, e),
        }
    }
}

impl fmt::Display for PaintAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.id)
    }
}
