//! Sequence store: every catalog layer is either applied or not.
//!
//! Application order is catalog order, never insertion order.

use std::sync::Arc;

use super::LayerStore;
use crate::color::Rgb;
use crate::layer::{Layer, LayerCatalog};

/// Per-catalog-layer applied flags.
#[derive(Debug, Clone)]
pub struct SequenceStore {
    catalog: Arc<LayerCatalog>,
    applied: Vec<bool>,
}

impl SequenceStore {
    /// Create a store with every catalog layer un-applied
    pub fn new(catalog: Arc<LayerCatalog>) -> Self {
        let applied = vec![false; catalog.len()];
        Self { catalog, applied }
    }

    /// Whether the named layer is currently applied
    pub fn is_applied(&self, name: &str) -> bool {
        self.catalog
            .index_of(name)
            .is_some_and(|index| self.applied[index])
    }

    /// Number of applied layers
    pub fn applied_count(&self) -> usize {
        self.applied.iter().filter(|&&on| on).count()
    }

    fn set_flag(&mut self, layer: &Layer, value: bool) -> bool {
        // Empty flag table: nothing can ever be applied.
        if self.applied.is_empty() {
            return false;
        }
        match self.catalog.index_of(layer.name()) {
            Some(index) if self.applied[index] != value => {
                self.applied[index] = value;
                true
            }
            _ => false,
        }
    }

    /// Applied layers sorted by name
    fn applied_by_name(&self) -> Vec<&Layer> {
        let mut names: Vec<&Layer> = self
            .catalog
            .iter()
            .zip(&self.applied)
            .filter_map(|(layer, &on)| on.then_some(layer))
            .collect();
        names.sort_unstable();
        names
    }
}

impl PartialEq for SequenceStore {
    fn eq(&self, other: &Self) -> bool {
        self.applied == other.applied
            && self.catalog.iter().eq(other.catalog.iter())
    }
}

impl LayerStore for SequenceStore {
    fn add(&mut self, layer: &Layer) -> bool {
        self.set_flag(layer, true)
    }

    fn erase(&mut self, layer: &Layer) -> bool {
        self.set_flag(layer, false)
    }

    // Flags never push another layer out.
    fn displaced_by(&self, _layer: &Layer, _is_erase: bool) -> Option<Layer> {
        None
    }

    fn retract(&mut self, layer: &Layer, _displaced: Option<&Layer>) {
        self.set_flag(layer, false);
    }

    fn restore(&mut self, removed: &Layer) {
        self.set_flag(removed, true);
    }

    fn resolve(&self, background: Rgb, timestamp: u64, x: usize, y: usize) -> Rgb {
        self.catalog
            .iter()
            .zip(&self.applied)
            .filter(|(_, on)| **on)
            .fold(background, |color, (layer, _)| {
                layer.apply(color, timestamp, x, y)
            })
    }

    /// Un-apply the median-named applied layer.
    ///
    /// With an even count the lower of the two middle names is chosen.
    fn special(&mut self) -> Option<Layer> {
        let sorted = self.applied_by_name();
        if sorted.is_empty() {
            return None;
        }
        let median = if sorted.len() % 2 == 1 {
            sorted.len() / 2
        } else {
            sorted.len() / 2 - 1
        };
        let removed = sorted[median].clone();

        self.set_flag(&removed, false);
        Some(removed)
    }

    fn layers(&self) -> Vec<Layer> {
        self.catalog
            .iter()
            .zip(&self.applied)
            .filter_map(|(layer, &on)| on.then(|| layer.clone()))
            .collect()
    }
}
