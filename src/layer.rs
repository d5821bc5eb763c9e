//! Layers and the layer catalog
//!
//! A [`Layer`] is a named, stateless color transform. Two layers are the
//! same layer when their names match; the transform is never compared.
//!
//! The [`LayerCatalog`] is the fixed, ordered list of every layer a canvas
//! may hold. Catalog order is the application order of sequence stores, so
//! it must not change once a canvas has been built from it. The
//! process-wide catalog is installed at most once and is read-only after.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use crate::color::Rgb;
use crate::error::{PaintError, Result};

/// Signature of a layer's color transform: `(color, timestamp, x, y) -> color`.
pub type TransformFn = dyn Fn(Rgb, u64, usize, usize) -> Rgb + Send + Sync;

/// A named, immutable color transform.
#[derive(Clone)]
pub struct Layer {
    name: Arc<str>,
    transform: Arc<TransformFn>,
}

impl Layer {
    /// Create a layer from a name and a pure transform
    pub fn new<F>(name: impl Into<Arc<str>>, transform: F) -> Self
    where
        F: Fn(Rgb, u64, usize, usize) -> Rgb + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            transform: Arc::new(transform),
        }
    }

    /// The layer's unique name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the transform on `color` at the given time and position
    pub fn apply(&self, color: Rgb, timestamp: u64, x: usize, y: usize) -> Rgb {
        (self.transform)(color, timestamp, x, y)
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Layer").field(&self.name()).finish()
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Layer {}

impl Hash for Layer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Layer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Layer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

/// Fixed, ordered list of every available layer.
#[derive(Debug, Clone)]
pub struct LayerCatalog {
    layers: Vec<Layer>,
}

impl LayerCatalog {
    /// Build a catalog, rejecting duplicate names
    pub fn new(layers: Vec<Layer>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(layers.len());
        for layer in &layers {
            if !seen.insert(layer.name()) {
                return Err(PaintError::DuplicateLayer {
                    name: layer.name().to_string(),
                });
            }
        }
        Ok(Self { layers })
    }

    /// The built-in catalog, sorted by name
    pub fn builtin() -> Self {
        Self {
            layers: builtin_layers(),
        }
    }

    /// Number of layers in the catalog
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Check if the catalog has no layers
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Get the layer at a catalog index
    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Catalog index of the layer with this name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name() == name)
    }

    /// Look a layer up by name
    pub fn by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name() == name)
    }

    /// Look a layer up by name, failing with [`PaintError::UnknownLayer`]
    pub fn require(&self, name: &str) -> Result<&Layer> {
        self.by_name(name).ok_or_else(|| PaintError::UnknownLayer {
            name: name.to_string(),
        })
    }

    /// Check catalog membership (by name)
    pub fn contains(&self, layer: &Layer) -> bool {
        self.index_of(layer.name()).is_some()
    }

    /// Iterate over layers in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }
}

impl Default for LayerCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

static GLOBAL_CATALOG: OnceLock<Arc<LayerCatalog>> = OnceLock::new();

/// Install the process-wide catalog.
///
/// Must run before the first canvas is built from the global catalog; a
/// second install (or an install after [`global_catalog`] was first read)
/// fails with [`PaintError::CatalogAlreadyInstalled`].
pub fn install_catalog(catalog: LayerCatalog) -> Result<Arc<LayerCatalog>> {
    let catalog = Arc::new(catalog);
    GLOBAL_CATALOG
        .set(Arc::clone(&catalog))
        .map_err(|_| PaintError::CatalogAlreadyInstalled)?;
    log::debug!("Installed layer catalog with {} layers", catalog.len());
    Ok(catalog)
}

/// The process-wide catalog, initialised with [`LayerCatalog::builtin`] if
/// nothing was installed.
pub fn global_catalog() -> Arc<LayerCatalog> {
    Arc::clone(GLOBAL_CATALOG.get_or_init(|| Arc::new(LayerCatalog::builtin())))
}

const RAINBOW: [Rgb; 6] = [
    Rgb::new(255, 0, 0),
    Rgb::new(255, 165, 0),
    Rgb::new(255, 255, 0),
    Rgb::new(0, 128, 0),
    Rgb::new(0, 0, 255),
    Rgb::new(128, 0, 128),
];

fn builtin_layers() -> Vec<Layer> {
    vec![
        Layer::new("black", |_, _, _, _| Rgb::BLACK),
        Layer::new("darken", |c: Rgb, _, _, _| {
            c.map(|v| (u16::from(v) * 2 / 3) as u8)
        }),
        Layer::new("greyscale", |c: Rgb, _, _, _| {
            let sum = u16::from(c.r) + u16::from(c.g) + u16::from(c.b);
            let grey = (sum / 3) as u8;
            Rgb::new(grey, grey, grey)
        }),
        Layer::new("invert", |c: Rgb, _, _, _| c.inverted()),
        Layer::new("lighten", |c: Rgb, _, _, _| c.map(|v| v + (255 - v) / 3)),
        Layer::new("rainbow", |_, timestamp: u64, x: usize, y: usize| {
            let phase = (x as u64)
                .wrapping_add(y as u64)
                .wrapping_add(timestamp)
                % RAINBOW.len() as u64;
            RAINBOW[phase as usize]
        }),
        Layer::new("red", |c: Rgb, _, _, _| Rgb::new(255, c.g / 2, c.b / 2)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_equality_by_name() {
        let a = Layer::new("x", |c, _, _, _| c);
        let b = Layer::new("x", |_, _, _, _| Rgb::WHITE);
        let c = Layer::new("y", |c, _, _, _| c);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
    }

    #[test]
    fn test_builtin_catalog_sorted() {
        let catalog = LayerCatalog::builtin();
        let names: Vec<&str> = catalog.iter().map(Layer::name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert_eq!(catalog.index_of("invert"), Some(3));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = LayerCatalog::new(vec![
            Layer::new("a", |c, _, _, _| c),
            Layer::new("a", |c, _, _, _| c),
        ]);
        assert!(matches!(result, Err(PaintError::DuplicateLayer { name }) if name == "a"));
    }

    #[test]
    fn test_require_unknown() {
        let catalog = LayerCatalog::builtin();
        assert!(catalog.require("lighten").is_ok());
        assert_eq!(
            catalog.require("sparkle").unwrap_err().error_code(),
            "UNKNOWN_LAYER"
        );
    }

    #[test]
    fn test_builtin_transforms() {
        let catalog = LayerCatalog::builtin();
        let start = Rgb::new(90, 150, 30);
        let apply = |name: &str| catalog.require(name).unwrap().apply(start, 0, 0, 0);

        assert_eq!(apply("black"), Rgb::BLACK);
        assert_eq!(apply("darken"), Rgb::new(60, 100, 20));
        assert_eq!(apply("greyscale"), Rgb::new(90, 90, 90));
        assert_eq!(apply("invert"), Rgb::new(165, 105, 225));
        assert_eq!(apply("lighten"), Rgb::new(145, 185, 105));
        assert_eq!(apply("red"), Rgb::new(255, 75, 15));
    }

    #[test]
    fn test_rainbow_depends_on_position_and_time() {
        let catalog = LayerCatalog::builtin();
        let rainbow = catalog.require("rainbow").unwrap();
        assert_eq!(rainbow.apply(Rgb::BLACK, 0, 0, 0), Rgb::new(255, 0, 0));
        assert_eq!(rainbow.apply(Rgb::BLACK, 0, 1, 1), Rgb::new(255, 255, 0));
        assert_eq!(rainbow.apply(Rgb::BLACK, 4, 1, 1), rainbow.apply(Rgb::BLACK, 0, 0, 0));
    }

    #[test]
    fn test_global_catalog_is_shared() {
        let a = global_catalog();
        let b = global_catalog();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(matches!(
            install_catalog(LayerCatalog::builtin()),
            Err(PaintError::CatalogAlreadyInstalled)
        ));
    }
}
