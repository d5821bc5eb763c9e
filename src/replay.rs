//! Replay Log
//!
//! Records every applied action (and whether it was applied as an undo) in
//! order, so the session can be played back deterministically onto a fresh
//! canvas. Recording stops for good once playback has begun.

use std::fmt;
use std::sync::Arc;

use crate::action::PaintAction;
use crate::bounded::BoundedQueue;
use crate::canvas::Canvas;

/// Default maximum number of recorded entries.
pub const DEFAULT_REPLAY_CAPACITY: usize = 10_000;

/// One recorded step of a session.
#[derive(Debug, Clone)]
pub struct ReplayEntry {
    pub action: Arc<PaintAction>,
    /// `true` if the action was undone at this point rather than applied
    pub is_undo: bool,
}

/// Outcome of one playback step.
#[derive(Debug, Clone)]
pub enum ReplayStep {
    /// An entry was played
    Continued(ReplayEntry),
    /// The log is empty; playback mode has ended
    Finished,
}

impl ReplayStep {
    pub fn is_finished(&self) -> bool {
        matches!(self, ReplayStep::Finished)
    }
}

impl fmt::Display for ReplayStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayStep::Continued(entry) if entry.is_undo => write!(f, "undo {}", entry.action),
            ReplayStep::Continued(entry) => write!(f, "apply {}", entry.action),
            ReplayStep::Finished => write!(f, "finished"),
        }
    }
}

/// Bounded FIFO of recorded actions with a recording/replaying mode.
#[derive(Debug, Clone)]
pub struct ReplayLog {
    queue: BoundedQueue<ReplayEntry>,
    replaying: bool,
}

impl Default for ReplayLog {
    fn default() -> Self {
        Self::new(DEFAULT_REPLAY_CAPACITY)
    }
}

impl ReplayLog {
    /// Create an empty log in recording mode
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: BoundedQueue::new(capacity),
            replaying: false,
        }
    }

    /// Append an entry.
    ///
    /// Ignored while replaying; dropped if the log is full. Returns whether
    /// the entry was stored.
    pub fn record(&mut self, action: Arc<PaintAction>, is_undo: bool) -> bool {
        if self.replaying {
            return false;
        }

        match self.queue.push_back(ReplayEntry { action, is_undo }) {
            Ok(()) => true,
            Err(dropped) => {
                log::warn!(
                    "Replay log full ({}), dropping action {}",
                    self.queue.capacity(),
                    dropped.action.id()
                );
                false
            }
        }
    }

    /// Stop recording and start playback. Queued entries are untouched.
    pub fn begin_replay(&mut self) {
        log::debug!("Starting replay of {} entries", self.queue.len());
        self.replaying = true;
    }

    /// Play the oldest entry onto `canvas`.
    ///
    /// When no entries remain, replay mode ends and [`ReplayStep::Finished`]
    /// is returned.
    pub fn step(&mut self, canvas: &mut Canvas) -> ReplayStep {
        let Some(entry) = self.queue.pop_front() else {
            if self.replaying {
                log::debug!("Replay finished");
            }
            self.replaying = false;
            return ReplayStep::Finished;
        };

        if entry.is_undo {
            entry.action.undo_apply(canvas);
        } else {
            entry.action.redo_apply(canvas);
        }
        ReplayStep::Continued(entry)
    }

    /// Play every remaining entry onto `canvas`. Returns how many were played.
    pub fn play_to_end(&mut self, canvas: &mut Canvas) -> usize {
        let mut played = 0;
        while !self.step(canvas).is_finished() {
            played += 1;
        }
        played
    }

    /// Empty the log, whether or not it is replaying
    pub fn reset(&mut self) {
        self.queue.clear();
    }

    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Iterate over queued entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &ReplayEntry> {
        self.queue.iter()
    }
}
