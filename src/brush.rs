//! Brush size bookkeeping and stroke footprints.

use crate::error::{PaintError, Result};

/// Diamond-shaped brush measured in Manhattan distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brush {
    size: usize,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            size: Self::DEFAULT_SIZE,
        }
    }
}

impl Brush {
    pub const DEFAULT_SIZE: usize = 2;
    pub const MIN_SIZE: usize = 0;
    pub const MAX_SIZE: usize = 5;

    /// Create a brush of a given size
    pub fn new(size: usize) -> Result<Self> {
        if size > Self::MAX_SIZE {
            return Err(PaintError::InvalidConfig {
                reason: format!("brush size {} exceeds maximum {}", size, Self::MAX_SIZE),
            });
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Grow by one, saturating at [`Brush::MAX_SIZE`]. Returns the new size.
    pub fn increase(&mut self) -> usize {
        if self.size < Self::MAX_SIZE {
            self.size += 1;
        }
        self.size
    }

    /// Shrink by one, saturating at [`Brush::MIN_SIZE`]. Returns the new size.
    pub fn decrease(&mut self) -> usize {
        if self.size > Self::MIN_SIZE {
            self.size -= 1;
        }
        self.size
    }

    /// In-bounds cells within `size` Manhattan distance of the centre,
    /// row-major.
    pub fn footprint(
        &self,
        column: usize,
        row: usize,
        width: usize,
        height: usize,
    ) -> Vec<(usize, usize)> {
        let rows = row.saturating_sub(self.size)..=(row + self.size).min(height.saturating_sub(1));
        let mut cells = Vec::new();

        for y in rows {
            let reach = self.size - y.abs_diff(row);
            let first = column.saturating_sub(reach);
            let last = (column + reach).min(width.saturating_sub(1));
            cells.extend((first..=last).map(|x| (x, y)));
        }
        cells
    }
}
