//! MapAtlas - multi-resolution tile pyramids from sparse map tiles
//!
//! This library takes a sparse set of 128×128 map tiles, each anchored at a
//! world position and one of five scales, and builds a complete tile
//! pyramid from them. Cells that no tile covers are filled by upsampling a
//! coarser ancestor; tiles landing on the same cell are composited.
//!
//! # Pipeline
//!
//! ```text
//! decoded tiles ──► Atlas::insert ──► Atlas::interpolate_all ──► export_pyramid
//!                   (megaregion        (views fill every           (depth/x/z.png)
//!                    quadtrees)         cell to scale 0)
//! ```
//!
//! # Example
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use mapatlas::{Atlas, Bounds, Tile};
//!
//! let bounds = Bounds::new(0, 0, 4)?;
//! let pixels = RgbaImage::from_pixel(128, 128, Rgba([64, 64, 255, 255]));
//!
//! let mut atlas = Atlas::new();
//! atlas.insert(Tile::new(bounds, pixels)?)?;
//! atlas.interpolate_all()?;
//!
//! // 256 finest-scale cells below a single megaregion tile
//! assert_eq!(atlas.stacks_by_scale()[&0].len(), 256);
//! # Ok::<(), mapatlas::AtlasError>(())
//! ```

pub mod atlas;
pub mod bounds;
pub mod config;
pub mod error;
pub mod export;
pub mod layer;
pub mod palette;
pub mod tree;

pub use atlas::{Atlas, MegaregionKey};
pub use bounds::{Bounds, Direction, MAX_COORD, MAX_SCALE, SIDE_LEN, TILE_SIZE};
pub use error::{AtlasError, AtlasResult};
pub use layer::{Layer, Render, SharedStack, Stack, Tile, View};
pub use tree::MapNode;
