//! Layerpaint - Layer-Composition Canvas
//!
//! A rectangular grid of cells, each holding a stack of named color
//! transforms ("layers") combined under one composition policy:
//! - Overwrite: at most one layer per cell, special toggles inversion
//! - Accumulate: bounded ordered list, special reverses it
//! - Sequence: set over the catalog, special removes the median layer
//!
//! Every edit is an action that can be undone, redone and replayed onto a
//! fresh canvas with identical results.

pub mod action;
pub mod bounded;
pub mod brush;
pub mod canvas;
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod history;
pub mod layer;
pub mod replay;
pub mod session;
pub mod store;

pub use action::{CellEdit, PaintAction};
pub use canvas::{Canvas, Frame, SpecialRecord};
pub use color::Rgb;
pub use config::SessionConfig;
pub use error::{PaintError, Result};
pub use history::UndoManager;
pub use layer::{global_catalog, install_catalog, Layer, LayerCatalog};
pub use replay::{ReplayLog, ReplayStep};
pub use session::PaintSession;
pub use store::{CellStore, CompositionPolicy, LayerStore};
