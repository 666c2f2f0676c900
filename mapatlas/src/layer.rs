//! Renderable layers and the same-cell compositor.
//!
//! Three things can produce a tile image:
//!
//! - [`Tile`] - decoded input pixels for one region
//! - [`View`] - a synthetic layer that upsamples one quadrant of a coarser
//!   stack
//! - [`Stack`] - the composite of every layer sharing one region
//!
//! ```text
//!   Stack (scale n)  ──composite──►  128×128
//!        ▲                              │ crop quadrant 64×64
//!        │ Weak                         ▼ nearest ×2
//!   View (scale n-1) ───────────────►  128×128
//! ```
//!
//! Stacks live behind [`SharedStack`] so a node and the views derived from
//! it can both reach it. Views only hold a `Weak` handle; the tree owns
//! every stack.

use std::sync::{Arc, Weak};

use image::imageops::{self, FilterType};
use image::RgbaImage;
use parking_lot::RwLock;

use crate::bounds::{Bounds, Direction, TILE_SIZE};
use crate::error::{AtlasError, AtlasResult};
use crate::palette;

/// A stack shared between its tree node and the views derived from it.
pub type SharedStack = Arc<RwLock<Stack>>;

/// Anything that covers a region and can produce a tile image for it.
pub trait Render {
    /// Region this renderable covers.
    fn bounds(&self) -> Bounds;

    /// Produce the 128×128 image for [`Render::bounds`].
    fn image(&self) -> AtlasResult<RgbaImage>;
}

/// Decoded input pixels anchored at a region.
#[derive(Debug, Clone)]
pub struct Tile {
    bounds: Bounds,
    pixels: RgbaImage,
}

impl Tile {
    /// Create a tile from an RGBA raster.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::InvalidTileSize`] unless the raster is 128×128.
    pub fn new(bounds: Bounds, pixels: RgbaImage) -> AtlasResult<Self> {
        if pixels.dimensions() != (TILE_SIZE, TILE_SIZE) {
            return Err(AtlasError::InvalidTileSize {
                width: pixels.width(),
                height: pixels.height(),
            });
        }
        Ok(Self { bounds, pixels })
    }

    /// Create a tile from raw map color indices (one byte per pixel,
    /// row-major).
    pub fn from_indices(bounds: Bounds, indices: &[u8]) -> AtlasResult<Self> {
        let pixels = palette::image_from_indices(indices)?;
        Ok(Self { bounds, pixels })
    }

    /// Borrow the tile's pixels.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl Render for Tile {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn image(&self) -> AtlasResult<RgbaImage> {
        Ok(self.pixels.clone())
    }
}

/// Synthetic layer that fills a quadrant from its parent's composite.
///
/// The image is recomputed from the parent on every call.
#[derive(Debug, Clone)]
pub struct View {
    bounds: Bounds,
    direction: Direction,
    parent: Weak<RwLock<Stack>>,
}

impl View {
    /// Derive a view of `parent`'s quadrant in `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::LeafSubdivision`] if the parent is at scale 0.
    pub fn new(parent: &SharedStack, direction: Direction) -> AtlasResult<Self> {
        let bounds = parent.read().bounds().sub_bounds(direction)?;
        Ok(Self {
            bounds,
            direction,
            parent: Arc::downgrade(parent),
        })
    }

    /// Quadrant of the parent this view covers.
    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl Render for View {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn image(&self) -> AtlasResult<RgbaImage> {
        let parent = self
            .parent
            .upgrade()
            .ok_or(AtlasError::DetachedView(self.bounds))?;
        let composite = parent.read().image()?;

        let half = TILE_SIZE / 2;
        let (col, row) = self.direction.pixel_offset(half);
        let quadrant = imageops::crop_imm(&composite, col, row, half, half).to_image();

        Ok(imageops::resize(
            &quadrant,
            TILE_SIZE,
            TILE_SIZE,
            FilterType::Nearest,
        ))
    }
}

/// A member of a [`Stack`].
#[derive(Debug, Clone)]
pub enum Layer {
    /// Decoded input.
    Tile(Tile),
    /// Upsampled from a coarser stack.
    View(View),
}

impl Layer {
    /// Whether this layer was synthesized during interpolation.
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Layer::View(_))
    }
}

impl Render for Layer {
    fn bounds(&self) -> Bounds {
        match self {
            Layer::Tile(tile) => tile.bounds(),
            Layer::View(view) => view.bounds(),
        }
    }

    fn image(&self) -> AtlasResult<RgbaImage> {
        match self {
            Layer::Tile(tile) => tile.image(),
            Layer::View(view) => view.image(),
        }
    }
}

impl From<Tile> for Layer {
    fn from(tile: Tile) -> Self {
        Layer::Tile(tile)
    }
}

impl From<View> for Layer {
    fn from(view: View) -> Self {
        Layer::View(view)
    }
}

/// Ordered layers that all cover the same region.
///
/// Compositing reverses insertion order before blending back to front, so
/// the first layer added ends up on top.
#[derive(Debug, Clone)]
pub struct Stack {
    bounds: Bounds,
    layers: Vec<Layer>,
}

impl Stack {
    /// Create an empty stack for `bounds`.
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            layers: Vec::new(),
        }
    }

    /// Create an empty stack ready to be shared with views.
    pub fn shared(bounds: Bounds) -> SharedStack {
        Arc::new(RwLock::new(Self::new(bounds)))
    }

    /// Append a layer.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::StackMismatch`] if the layer covers a
    /// different region.
    pub fn add(&mut self, layer: impl Into<Layer>) -> AtlasResult<()> {
        let layer = layer.into();
        if layer.bounds() != self.bounds {
            return Err(AtlasError::StackMismatch {
                stack: self.bounds,
                layer: layer.bounds(),
            });
        }
        self.layers.push(layer);
        Ok(())
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the stack has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers in insertion order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// Number of layers that came from decoded input.
    pub fn tile_count(&self) -> usize {
        self.layers.iter().filter(|l| !l.is_synthetic()).count()
    }
}

impl Render for Stack {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn image(&self) -> AtlasResult<RgbaImage> {
        let mut canvas = RgbaImage::new(TILE_SIZE, TILE_SIZE);
        for layer in self.layers.iter().rev() {
            let image = layer.image()?;
            imageops::overlay(&mut canvas, &image, 0, 0);
        }
        Ok(canvas)
    }
}
