//! Accumulate store: layers apply oldest first.

use std::collections::VecDeque;

use super::LayerStore;
use crate::color::Rgb;
use crate::layer::Layer;

/// Ordered, capacity-limited stack of layers.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulateStore {
    layers: VecDeque<Layer>,
    capacity: usize,
}

impl AccumulateStore {
    /// Create an empty store holding at most `capacity` layers
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            layers: VecDeque::new(),
            capacity,
        }
    }

    /// Maximum number of layers the store accepts
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of layers currently stacked
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Check if the store is at capacity
    pub fn is_full(&self) -> bool {
        self.layers.len() >= self.capacity
    }
}

impl LayerStore for AccumulateStore {
    fn add(&mut self, layer: &Layer) -> bool {
        if self.is_full() {
            return false;
        }
        self.layers.push_back(layer.clone());
        true
    }

    fn erase(&mut self, _layer: &Layer) -> bool {
        self.layers.pop_front().is_some()
    }

    fn displaced_by(&self, _layer: &Layer, is_erase: bool) -> Option<Layer> {
        if is_erase {
            self.layers.front().cloned()
        } else {
            None
        }
    }

    fn retract(&mut self, layer: &Layer, _displaced: Option<&Layer>) {
        // Newer additions may have fallen out of history without being undone.
        if let Some(index) = self.layers.iter().rposition(|l| l == layer) {
            self.layers.remove(index);
        }
    }

    fn restore(&mut self, removed: &Layer) {
        self.layers.push_front(removed.clone());
    }

    fn resolve(&self, background: Rgb, timestamp: u64, x: usize, y: usize) -> Rgb {
        self.layers
            .iter()
            .fold(background, |color, layer| layer.apply(color, timestamp, x, y))
    }

    fn special(&mut self) -> Option<Layer> {
        self.layers.make_contiguous().reverse();
        None
    }

    fn layers(&self) -> Vec<Layer> {
        self.layers.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerCatalog;

    fn layer(name: &str) -> Layer {
        LayerCatalog::builtin().require(name).unwrap().clone()
    }

    fn fold(names: &[&str], start: Rgb) -> Rgb {
        names
            .iter()
            .fold(start, |c, name| layer(name).apply(c, 3, 1, 2))
    }

    #[test]
    fn test_resolve_folds_oldest_first() {
        let mut store = AccumulateStore::with_capacity(10);
        for name in ["red", "lighten", "invert"] {
            assert!(store.add(&layer(name)));
        }

        let start = Rgb::new(40, 80, 120);
        assert_eq!(
            store.resolve(start, 3, 1, 2),
            fold(&["red", "lighten", "invert"], start)
        );
        assert_ne!(
            store.resolve(start, 3, 1, 2),
            fold(&["invert", "lighten", "red"], start)
        );
    }

    #[test]
    fn test_special_reverses_order() {
        let mut store = AccumulateStore::with_capacity(10);
        for name in ["red", "lighten", "invert"] {
            store.add(&layer(name));
        }
        assert!(store.special().is_none());

        let start = Rgb::new(40, 80, 120);
        assert_eq!(
            store.resolve(start, 3, 1, 2),
            fold(&["invert", "lighten", "red"], start)
        );
        assert_eq!(store.layers()[0], layer("invert"));
    }

    #[test]
    fn test_special_on_empty_is_noop() {
        let mut store = AccumulateStore::with_capacity(4);
        store.special();
        assert!(store.is_empty());
    }

    #[test]
    fn test_erase_removes_oldest() {
        let mut store = AccumulateStore::with_capacity(10);
        store.add(&layer("red"));
        store.add(&layer("black"));

        assert!(store.erase(&layer("black")));
        assert_eq!(store.layers(), vec![layer("black")]);
        assert!(store.erase(&layer("red")));
        assert!(!store.erase(&layer("red")));
    }

    #[test]
    fn test_duplicates_allowed() {
        let mut store = AccumulateStore::with_capacity(10);
        assert!(store.add(&layer("lighten")));
        assert!(store.add(&layer("lighten")));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_add_at_capacity_is_rejected() {
        let mut store = AccumulateStore::with_capacity(2);
        assert!(store.add(&layer("red")));
        assert!(store.add(&layer("invert")));
        let before = store.clone();

        assert!(!store.add(&layer("black")));
        assert_eq!(store, before);
    }

    #[test]
    fn test_retract_and_restore_are_exact() {
        let mut store = AccumulateStore::with_capacity(10);
        store.add(&layer("red"));
        store.add(&layer("invert"));
        let before = store.clone();

        store.add(&layer("red"));
        store.retract(&layer("red"), None);
        assert_eq!(store, before);

        let removed = store.displaced_by(&layer("invert"), true).unwrap();
        assert_eq!(removed, layer("red"));
        store.erase(&layer("invert"));
        store.restore(&removed);
        assert_eq!(store, before);
    }

    #[test]
    fn test_retract_skips_newer_layers() {
        let mut store = AccumulateStore::with_capacity(10);
        for name in ["red", "invert", "darken"] {
            store.add(&layer(name));
        }

        store.retract(&layer("invert"), None);
        let names: Vec<String> = store.layers().iter().map(|l| l.name().to_string()).collect();
        assert_eq!(names, vec!["red", "darken"]);
    }
}
