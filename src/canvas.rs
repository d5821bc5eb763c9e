//! Canvas
//!
//! A fixed-size grid of cell stores sharing one composition policy and one
//! layer catalog. Cells are stored row-major and addressed by
//! `(column, row)`; no cell is added or removed after construction.
//!
//! Addressing a cell outside the grid through [`Canvas::store_at`] or
//! [`Canvas::store_at_mut`] is a caller bug and panics. Use
//! [`Canvas::check_cell`] or [`Canvas::get`] at input boundaries.

use std::sync::Arc;

use rayon::prelude::*;
use sha2::{Digest, Sha256};

use crate::color::Rgb;
use crate::error::{PaintError, Result};
use crate::layer::{global_catalog, Layer, LayerCatalog};
use crate::store::{CellStore, CompositionPolicy, LayerStore};

/// Default accumulate-store capacity per catalog layer.
pub const ACCUMULATE_LAYERS_PER_CATALOG_ENTRY: usize = 100;

/// A layer removed from one cell by a special effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialRemoval {
    pub column: usize,
    pub row: usize,
    pub layer: Layer,
}

/// Everything a canvas-wide special effect removed, in row-major order.
///
/// Empty for policies whose special effect removes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialRecord {
    removals: Vec<SpecialRemoval>,
}

impl SpecialRecord {
    pub fn removals(&self) -> &[SpecialRemoval] {
        &self.removals
    }

    pub fn len(&self) -> usize {
        self.removals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removals.is_empty()
    }
}

/// Resolved colors of every cell, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Frame {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Color of one cell
    pub fn pixel(&self, column: usize, row: usize) -> Option<Rgb> {
        if column >= self.width || row >= self.height {
            return None;
        }
        self.pixels.get(row * self.width + column).copied()
    }

    /// Iterate over rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Rgb]> {
        self.pixels.chunks(self.width)
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }
}

/// 2-D grid of cell stores.
#[derive(Debug, Clone)]
pub struct Canvas {
    policy: CompositionPolicy,
    width: usize,
    height: usize,
    accumulate_capacity: usize,
    catalog: Arc<LayerCatalog>,
    cells: Vec<CellStore>,
}

impl Canvas {
    /// Create a canvas backed by the process-wide catalog
    pub fn new(policy: CompositionPolicy, width: usize, height: usize) -> Result<Self> {
        Self::with_catalog(policy, width, height, global_catalog())
    }

    /// Create a canvas backed by a specific catalog
    pub fn with_catalog(
        policy: CompositionPolicy,
        width: usize,
        height: usize,
        catalog: Arc<LayerCatalog>,
    ) -> Result<Self> {
        let capacity = ACCUMULATE_LAYERS_PER_CATALOG_ENTRY * catalog.len();
        Self::build(policy, width, height, catalog, capacity)
    }

    /// Create a canvas with every construction parameter explicit
    pub fn build(
        policy: CompositionPolicy,
        width: usize,
        height: usize,
        catalog: Arc<LayerCatalog>,
        accumulate_capacity: usize,
    ) -> Result<Self> {
        let count = match width.checked_mul(height) {
            Some(count) if count > 0 => count,
            _ => return Err(PaintError::InvalidDimensions { width, height }),
        };

        let cells = (0..count)
            .map(|_| CellStore::new(policy, &catalog, accumulate_capacity))
            .collect();

        log::debug!("Created {} canvas {}x{}", policy, width, height);

        Ok(Self {
            policy,
            width,
            height,
            accumulate_capacity,
            catalog,
            cells,
        })
    }

    /// A blank canvas with the same policy, size and catalog
    pub fn blank_like(&self) -> Self {
        let cells = (0..self.cells.len())
            .map(|_| CellStore::new(self.policy, &self.catalog, self.accumulate_capacity))
            .collect();

        Self {
            policy: self.policy,
            width: self.width,
            height: self.height,
            accumulate_capacity: self.accumulate_capacity,
            catalog: Arc::clone(&self.catalog),
            cells,
        }
    }

    pub fn policy(&self) -> CompositionPolicy {
        self.policy
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn catalog(&self) -> &Arc<LayerCatalog> {
        &self.catalog
    }

    /// Check if an address lies inside the grid
    pub fn contains(&self, column: usize, row: usize) -> bool {
        column < self.width && row < self.height
    }

    /// Validate an address, failing with [`PaintError::CellOutOfBounds`]
    pub fn check_cell(&self, column: usize, row: usize) -> Result<()> {
        if self.contains(column, row) {
            Ok(())
        } else {
            Err(PaintError::CellOutOfBounds {
                column,
                row,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Validate that a layer belongs to this canvas's catalog
    pub fn check_layer(&self, layer: &Layer) -> Result<()> {
        if self.catalog.contains(layer) {
            Ok(())
        } else {
            Err(PaintError::UnknownLayer {
                name: layer.name().to_string(),
            })
        }
    }

    fn index(&self, column: usize, row: usize) -> usize {
        assert!(
            self.contains(column, row),
            "cell ({}, {}) is outside the {}x{} canvas",
            column,
            row,
            self.width,
            self.height
        );
        row * self.width + column
    }

    /// The store at an address. Panics if the address is out of bounds.
    pub fn store_at(&self, column: usize, row: usize) -> &CellStore {
        let index = self.index(column, row);
        &self.cells[index]
    }

    /// Mutable store at an address. Panics if the address is out of bounds.
    pub fn store_at_mut(&mut self, column: usize, row: usize) -> &mut CellStore {
        let index = self.index(column, row);
        &mut self.cells[index]
    }

    /// The store at an address, if it exists
    pub fn get(&self, column: usize, row: usize) -> Option<&CellStore> {
        if self.contains(column, row) {
            self.cells.get(row * self.width + column)
        } else {
            None
        }
    }

    /// Run every cell's special effect.
    ///
    /// Cells are independent, so the broadcast runs in parallel; the
    /// returned record is still in row-major order.
    pub fn trigger_special(&mut self) -> SpecialRecord {
        let width = self.width;
        let removals: Vec<SpecialRemoval> = self
            .cells
            .par_iter_mut()
            .enumerate()
            .filter_map(|(index, cell)| {
                cell.special().map(|layer| SpecialRemoval {
                    column: index % width,
                    row: index / width,
                    layer,
                })
            })
            .collect();

        log::trace!("Special effect removed {} layers", removals.len());
        SpecialRecord { removals }
    }

    /// Undo a special effect previously returned by [`Canvas::trigger_special`].
    ///
    /// Involutive policies re-trigger the effect; the sequence policy
    /// re-applies exactly the recorded layers.
    pub fn revert_special(&mut self, record: &SpecialRecord) {
        if self.policy.special_is_involution() {
            self.trigger_special();
            return;
        }

        if record.is_empty() {
            log::debug!("No special record to revert on a {} canvas", self.policy);
        }
        for removal in record.removals() {
            self.store_at_mut(removal.column, removal.row).add(&removal.layer);
        }
    }

    /// Resolve the color of one cell
    pub fn color_at(&self, column: usize, row: usize, background: Rgb, timestamp: u64) -> Rgb {
        self.store_at(column, row)
            .resolve(background, timestamp, column, row)
    }

    /// Resolve every cell into a frame
    pub fn render(&self, background: Rgb, timestamp: u64) -> Frame {
        let width = self.width;
        let pixels = self
            .cells
            .par_iter()
            .enumerate()
            .map(|(index, cell)| cell.resolve(background, timestamp, index % width, index / width))
            .collect();

        Frame {
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    /// SHA-256 of the canvas's logical state (policy, size and every cell)
    pub fn fingerprint(&self) -> String {
        let mut state = Vec::with_capacity(self.cells.len() * 8);
        state.push(self.policy as u8);
        state.extend_from_slice(&(self.width as u64).to_le_bytes());
        state.extend_from_slice(&(self.height as u64).to_le_bytes());
        for cell in &self.cells {
            cell.write_state(&mut state);
        }
        format!("{:x}", Sha256::digest(&state))
    }
}

impl PartialEq for Canvas {
    fn eq(&self, other: &Self) -> bool {
        self.policy == other.policy
            && self.width == other.width
            && self.height == other.height
            && self.cells == other.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(policy: CompositionPolicy) -> Canvas {
        Canvas::with_catalog(policy, 4, 3, Arc::new(LayerCatalog::builtin())).unwrap()
    }

    fn layer(canvas: &Canvas, name: &str) -> Layer {
        canvas.catalog().require(name).unwrap().clone()
    }

    #[test]
    fn test_dimensions() {
        let canvas = canvas(CompositionPolicy::Overwrite);
        assert_eq!((canvas.width(), canvas.height()), (4, 3));
        assert!(canvas.contains(3, 2));
        assert!(!canvas.contains(4, 0));
        assert!(canvas.get(0, 3).is_none());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let result = Canvas::new(CompositionPolicy::Sequence, 0, 5);
        assert!(matches!(
            result,
            Err(PaintError::InvalidDimensions { width: 0, height: 5 })
        ));
    }

    #[test]
    fn test_overflowing_dimensions_rejected() {
        let result = Canvas::with_catalog(
            CompositionPolicy::Overwrite,
            usize::MAX,
            2,
            Arc::new(LayerCatalog::builtin()),
        );
        assert!(matches!(
            result,
            Err(PaintError::InvalidDimensions { height: 2, .. })
        ));
    }

    #[test]
    fn test_check_cell() {
        let canvas = canvas(CompositionPolicy::Accumulate);
        assert!(canvas.check_cell(1, 1).is_ok());
        assert_eq!(
            canvas.check_cell(1, 9).unwrap_err().error_code(),
            "CELL_OUT_OF_BOUNDS"
        );
    }

    #[test]
    #[should_panic(expected = "outside the 4x3 canvas")]
    fn test_store_at_out_of_bounds_panics() {
        let canvas = canvas(CompositionPolicy::Overwrite);
        let _ = canvas.store_at(0, 3);
    }

    #[test]
    fn test_check_layer_rejects_foreign_layer() {
        let canvas = canvas(CompositionPolicy::Overwrite);
        let foreign = Layer::new("glitter", |c: Rgb, _, _, _| c);
        assert!(canvas.check_layer(&layer(&canvas, "red")).is_ok());
        assert!(canvas.check_layer(&foreign).is_err());
    }

    #[test]
    fn test_accumulate_capacity_scales_with_catalog() {
        let canvas = canvas(CompositionPolicy::Accumulate);
        match canvas.store_at(0, 0) {
            CellStore::Accumulate(store) => assert_eq!(store.capacity(), 700),
            other => panic!("unexpected store {:?}", other),
        }
    }

    #[test]
    fn test_render_passes_coordinates() {
        let mut canvas = canvas(CompositionPolicy::Overwrite);
        let rainbow = layer(&canvas, "rainbow");
        canvas.store_at_mut(2, 1).add(&rainbow);

        let frame = canvas.render(Rgb::BLACK, 0);
        assert_eq!(frame.pixel(2, 1), Some(rainbow.apply(Rgb::BLACK, 0, 2, 1)));
        assert_eq!(frame.pixel(0, 0), Some(Rgb::BLACK));
        assert_eq!(frame.rows().count(), 3);
        assert_eq!(canvas.color_at(2, 1, Rgb::BLACK, 0), frame.pixel(2, 1).unwrap());
    }

    #[test]
    fn test_special_broadcast_overwrite() {
        let mut canvas = canvas(CompositionPolicy::Overwrite);
        let record = canvas.trigger_special();
        assert!(record.is_empty());

        let frame = canvas.render(Rgb::BLACK, 0);
        assert!(frame.pixels().iter().all(|&p| p == Rgb::WHITE));

        canvas.revert_special(&record);
        assert_eq!(canvas, canvas.blank_like());
    }

    #[test]
    fn test_special_record_sequence() {
        let mut canvas = canvas(CompositionPolicy::Sequence);
        let red = layer(&canvas, "red");
        canvas.store_at_mut(1, 0).add(&red);
        canvas.store_at_mut(3, 2).add(&red);
        let before = canvas.clone();

        let record = canvas.trigger_special();
        assert_eq!(record.len(), 2);
        assert_eq!(record.removals()[0].column, 1);
        assert_eq!(record.removals()[1].row, 2);
        assert!(canvas.store_at(1, 0).is_empty());

        canvas.revert_special(&record);
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_fingerprint_tracks_state() {
        let mut canvas = canvas(CompositionPolicy::Accumulate);
        let blank = canvas.fingerprint();
        assert_eq!(blank, canvas.blank_like().fingerprint());
        assert_eq!(blank.len(), 64);

        let red = layer(&canvas, "red");
        canvas.store_at_mut(0, 0).add(&red);
        assert_ne!(canvas.fingerprint(), blank);
    }

    #[test]
    fn test_fingerprint_depends_on_order() {
        let mut a = canvas(CompositionPolicy::Accumulate);
        let mut b = a.clone();
        let (red, invert) = (layer(&a, "red"), layer(&a, "invert"));

        a.store_at_mut(0, 0).add(&red);
        a.store_at_mut(0, 0).add(&invert);
        b.store_at_mut(0, 0).add(&invert);
        b.store_at_mut(0, 0).add(&red);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
