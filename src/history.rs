//! Undo/Redo System
//!
//! Linear undo/redo over shared [`PaintAction`]s. Both stacks are bounded;
//! when a stack is full the incoming action is dropped and the stack keeps
//! its existing (older) entries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::action::PaintAction;
use crate::bounded::BoundedStack;
use crate::canvas::Canvas;

/// Default maximum depth of each history stack.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10_000;

/// Manages undo/redo operations for a canvas.
///
/// The undo manager maintains:
/// - An undo stack of applied actions
/// - A redo stack of undone actions, cleared whenever a new action is recorded
#[derive(Debug, Clone)]
pub struct UndoManager {
    /// Stack of actions that can be undone.
    undo_stack: BoundedStack<Arc<PaintAction>>,

    /// Stack of actions that can be redone.
    redo_stack: BoundedStack<Arc<PaintAction>>,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl UndoManager {
    /// Create a new undo manager; each stack holds at most `capacity` actions.
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: BoundedStack::new(capacity),
            redo_stack: BoundedStack::new(capacity),
        }
    }

    /// Record an action that has just been applied.
    ///
    /// Always clears the redo stack, since the history has diverged. If the
    /// undo stack is full the action is dropped and `false` is returned.
    pub fn record(&mut self, action: Arc<PaintAction>) -> bool {
        self.redo_stack.clear();

        match self.undo_stack.push(action) {
            Ok(()) => true,
            Err(dropped) => {
                log::warn!(
                    "Undo stack full ({}), dropping action {}",
                    self.undo_stack.capacity(),
                    dropped.id()
                );
                false
            }
        }
    }

    /// Undo the most recent action on `canvas`.
    ///
    /// Returns the undone action, or `None` if there was nothing to undo.
    /// If the redo stack is full the undo still happens but cannot be redone.
    pub fn undo(&mut self, canvas: &mut Canvas) -> Option<Arc<PaintAction>> {
        let action = self.undo_stack.pop()?;
        action.undo_apply(canvas);
        log::debug!("Undone: {}", action);

        if let Err(dropped) = self.redo_stack.push(Arc::clone(&action)) {
            log::warn!("Redo stack full, action {} cannot be redone", dropped.id());
        }
        Some(action)
    }

    /// Redo the most recently undone action on `canvas`.
    ///
    /// Returns the redone action, or `None` if there was nothing to redo.
    pub fn redo(&mut self, canvas: &mut Canvas) -> Option<Arc<PaintAction>> {
        let action = self.redo_stack.pop()?;
        action.redo_apply(canvas);
        log::debug!("Redone: {}", action);

        if let Err(dropped) = self.undo_stack.push(Arc::clone(&action)) {
            log::warn!("Undo stack full, action {} cannot be undone", dropped.id());
        }
        Some(action)
    }

    /// Get the number of actions that can be undone.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of actions that can be redone.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Maximum depth of each stack
    pub fn capacity(&self) -> usize {
        self.undo_stack.capacity()
    }

    /// Check if there are actions that can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if there are actions that can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the most recent action that can be undone (if any).
    pub fn peek_undo(&self) -> Option<&Arc<PaintAction>> {
        self.undo_stack.peek()
    }

    /// Get the oldest action still on the undo stack (if any).
    pub fn oldest_undo(&self) -> Option<&Arc<PaintAction>> {
        self.undo_stack.bottom()
    }

    /// Clear all undo/redo history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Get a summary of the undo stack for display.
    pub fn undo_stack_summary(&self) -> Vec<(Uuid, DateTime<Utc>, String)> {
        self.undo_stack
            .iter_top_down() // Most recent first
            .map(|a| (a.id(), a.recorded_at(), a.description()))
            .collect()
    }

    /// Get a summary of the redo stack for display.
    pub fn redo_stack_summary(&self) -> Vec<(Uuid, DateTime<Utc>, String)> {
        self.redo_stack
            .iter_top_down() // Most recently undone first
            .map(|a| (a.id(), a.recorded_at(), a.description()))
            .collect()
    }
}
