//! Overwrite store: holds at most one layer.

use super::LayerStore;
use crate::color::Rgb;
use crate::layer::Layer;

/// Single-layer store with an inversion toggle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverwriteStore {
    layer: Option<Layer>,
    inverted: bool,
}

impl OverwriteStore {
    /// Create an empty, non-inverted store
    pub fn new() -> Self {
        Self::default()
    }

    /// The layer currently held
    pub fn layer(&self) -> Option<&Layer> {
        self.layer.as_ref()
    }

    /// Whether the special (inversion) toggle is on
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }
}

impl LayerStore for OverwriteStore {
    fn add(&mut self, layer: &Layer) -> bool {
        if self.layer.as_ref() == Some(layer) {
            return false;
        }
        self.layer = Some(layer.clone());
        true
    }

    fn erase(&mut self, _layer: &Layer) -> bool {
        self.layer.take().is_some()
    }

    fn displaced_by(&self, _layer: &Layer, _is_erase: bool) -> Option<Layer> {
        self.layer.clone()
    }

    fn retract(&mut self, _layer: &Layer, displaced: Option<&Layer>) {
        self.layer = displaced.cloned();
    }

    fn restore(&mut self, removed: &Layer) {
        self.layer = Some(removed.clone());
    }

    fn resolve(&self, background: Rgb, timestamp: u64, x: usize, y: usize) -> Rgb {
        let color = match &self.layer {
            Some(layer) => layer.apply(background, timestamp, x, y),
            None => background,
        };
        // Inversion always follows the layer transform.
        if self.inverted {
            color.inverted()
        } else {
            color
        }
    }

    fn special(&mut self) -> Option<Layer> {
        self.inverted = !self.inverted;
        None
    }

    fn layers(&self) -> Vec<Layer> {
        self.layer.iter().cloned().collect()
    }
}
