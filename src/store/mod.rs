//! Cell Stores
//!
//! Every grid cell owns one store holding its layer state under a
//! composition policy:
//! - Overwrite: at most one layer, special toggles channel inversion
//! - Accumulate: ordered stack of layers, special reverses the order
//! - Sequence: one applied flag per catalog layer, special un-applies the
//!   median-named layer
//!
//! All three implement [`LayerStore`]. [`CellStore`] is the closed set of
//! variants a canvas stores per cell.

mod accumulate;
mod overwrite;
mod sequence;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::layer::{Layer, LayerCatalog};

pub use accumulate::AccumulateStore;
pub use overwrite::OverwriteStore;
pub use sequence::SequenceStore;

/// Capability shared by every composition policy.
pub trait LayerStore {
    /// Add a layer. Returns whether the store changed.
    fn add(&mut self, layer: &Layer) -> bool;

    /// Erase a layer. Returns whether the store changed.
    ///
    /// Overwrite and Accumulate stores ignore the argument.
    fn erase(&mut self, layer: &Layer) -> bool;

    /// The layer a successful `add` (or `erase`, when `is_erase`) of `layer`
    /// would push out of the store, if any.
    fn displaced_by(&self, layer: &Layer, is_erase: bool) -> Option<Layer>;

    /// Reverse a successful `add` of `layer`, putting back what it displaced.
    fn retract(&mut self, layer: &Layer, displaced: Option<&Layer>);

    /// Reverse a successful `erase` that removed `removed`.
    fn restore(&mut self, removed: &Layer);

    /// Resolve the final color of the cell. Pure: never mutates the store.
    fn resolve(&self, background: Rgb, timestamp: u64, x: usize, y: usize) -> Rgb;

    /// Apply the policy's special effect.
    ///
    /// Returns the layer the effect removed, if it removed one. Only the
    /// sequence policy removes layers; its effect is not self-inverse.
    fn special(&mut self) -> Option<Layer>;

    /// Layers currently contributing to the color, in application order
    fn layers(&self) -> Vec<Layer>;

    /// Check if no layer contributes to the color
    fn is_empty(&self) -> bool {
        self.layers().is_empty()
    }
}

/// Composition policy selected once per canvas.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum CompositionPolicy {
    /// One layer at a time; special inverts the color
    #[default]
    #[serde(alias = "set")]
    #[value(alias = "set")]
    Overwrite,

    /// Layers stack in insertion order; special reverses the stack
    #[serde(alias = "add")]
    #[value(alias = "add")]
    Accumulate,

    /// Catalog layers toggle on and off; special drops the median name
    Sequence,
}

impl CompositionPolicy {
    /// Whether applying the special effect twice restores the original state
    pub fn special_is_involution(&self) -> bool {
        !matches!(self, CompositionPolicy::Sequence)
    }
}

impl fmt::Display for CompositionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositionPolicy::Overwrite => write!(f, "overwrite"),
            CompositionPolicy::Accumulate => write!(f, "accumulate"),
            CompositionPolicy::Sequence => write!(f, "sequence"),
        }
    }
}

/// One cell's store, tagged by policy.
#[derive(Debug, Clone, PartialEq)]
pub enum CellStore {
    Overwrite(OverwriteStore),
    Accumulate(AccumulateStore),
    Sequence(SequenceStore),
}

impl CellStore {
    /// Create an empty store for the given policy
    pub fn new(
        policy: CompositionPolicy,
        catalog: &Arc<LayerCatalog>,
        accumulate_capacity: usize,
    ) -> Self {
        match policy {
            CompositionPolicy::Overwrite => CellStore::Overwrite(OverwriteStore::new()),
            CompositionPolicy::Accumulate => {
                CellStore::Accumulate(AccumulateStore::with_capacity(accumulate_capacity))
            }
            CompositionPolicy::Sequence => {
                CellStore::Sequence(SequenceStore::new(Arc::clone(catalog)))
            }
        }
    }

    /// The policy this store implements
    pub fn policy(&self) -> CompositionPolicy {
        match self {
            CellStore::Overwrite(_) => CompositionPolicy::Overwrite,
            CellStore::Accumulate(_) => CompositionPolicy::Accumulate,
            CellStore::Sequence(_) => CompositionPolicy::Sequence,
        }
    }

    fn inner(&self) -> &dyn LayerStore {
        match self {
            CellStore::Overwrite(store) => store,
            CellStore::Accumulate(store) => store,
            CellStore::Sequence(store) => store,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn LayerStore {
        match self {
            CellStore::Overwrite(store) => store,
            CellStore::Accumulate(store) => store,
            CellStore::Sequence(store) => store,
        }
    }

    /// Append this store's logical state to a byte buffer (used for fingerprints)
    pub(crate) fn write_state(&self, out: &mut Vec<u8>) {
        out.push(self.policy() as u8);
        if let CellStore::Overwrite(store) = self {
            out.push(u8::from(store.is_inverted()));
        }
        for layer in self.layers() {
            out.extend_from_slice(layer.name().as_bytes());
            out.push(0);
        }
        out.push(0xff);
    }
}

impl LayerStore for CellStore {
    fn add(&mut self, layer: &Layer) -> bool {
        self.inner_mut().add(layer)
    }

    fn erase(&mut self, layer: &Layer) -> bool {
        self.inner_mut().erase(layer)
    }

    fn displaced_by(&self, layer: &Layer, is_erase: bool) -> Option<Layer> {
        self.inner().displaced_by(layer, is_erase)
    }

    fn retract(&mut self, layer: &Layer, displaced: Option<&Layer>) {
        self.inner_mut().retract(layer, displaced)
    }

    fn restore(&mut self, removed: &Layer) {
        self.inner_mut().restore(removed)
    }

    fn resolve(&self, background: Rgb, timestamp: u64, x: usize, y: usize) -> Rgb {
        self.inner().resolve(background, timestamp, x, y)
    }

    fn special(&mut self) -> Option<Layer> {
        self.inner_mut().special()
    }

    fn layers(&self) -> Vec<Layer> {
        self.inner().layers()
    }
}
