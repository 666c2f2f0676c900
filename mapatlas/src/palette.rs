//! Map color palette.
//!
//! Map items store one byte per pixel. The byte selects a base color
//! (`index / 4`) and a shade (`index % 4`); each shade scales the base RGB
//! by a fixed multiplier. Base color 0 is air and renders fully transparent,
//! as does any index past the end of the table.

use image::{Rgba, RgbaImage};

use crate::bounds::TILE_SIZE;
use crate::error::{AtlasError, AtlasResult};

/// Shade multipliers applied to base colors, in index order.
pub const SHADE_MULTIPLIERS: [u32; 4] = [180, 220, 255, 135];

/// Fully transparent pixel used for air and unknown indices.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// A named base color. `rgb` is `None` for air.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseColor {
    pub id: u8,
    pub name: &'static str,
    pub rgb: Option<[u8; 3]>,
}

const fn base(id: u8, name: &'static str, r: u8, g: u8, b: u8) -> BaseColor {
    BaseColor {
        id,
        name,
        rgb: Some([r, g, b]),
    }
}

/// Base colors, indexed by id.
pub const BASE_COLORS: [BaseColor; 52] = [
    BaseColor {
        id: 0,
        name: "AIR",
        rgb: None,
    },
    base(1, "GRASS", 127, 178, 56),
    base(2, "SAND", 247, 233, 163),
    base(3, "CLOTH", 199, 199, 199),
    base(4, "TNT", 255, 0, 0),
    base(5, "ICE", 160, 160, 255),
    base(6, "IRON", 167, 167, 167),
    base(7, "FOLIAGE", 0, 124, 0),
    base(8, "SNOW", 255, 255, 255),
    base(9, "CLAY", 164, 168, 184),
    base(10, "DIRT", 151, 109, 77),
    base(11, "STONE", 112, 112, 112),
    base(12, "WATER", 64, 64, 255),
    base(13, "WOOD", 143, 119, 72),
    base(14, "QUARTZ", 255, 252, 245),
    base(15, "ADOBE", 216, 127, 51),
    base(16, "MAGENTA", 178, 76, 216),
    base(17, "LIGHT_BLUE", 102, 153, 216),
    base(18, "YELLOW", 229, 229, 51),
    base(19, "LIME", 127, 204, 25),
    base(20, "PINK", 242, 127, 165),
    base(21, "GRAY", 76, 76, 76),
    base(22, "SILVER", 153, 153, 153),
    base(23, "CYAN", 76, 127, 153),
    base(24, "PURPLE", 127, 63, 178),
    base(25, "BLUE", 51, 76, 178),
    base(26, "BROWN", 102, 76, 51),
    base(27, "GREEN", 102, 127, 51),
    base(28, "RED", 153, 51, 51),
    base(29, "BLACK", 25, 25, 25),
    base(30, "GOLD", 250, 238, 77),
    base(31, "DIAMOND", 92, 219, 213),
    base(32, "LAPIS", 74, 128, 255),
    base(33, "EMERALD", 0, 217, 58),
    base(34, "OBSIDIAN", 129, 86, 49),
    base(35, "NETHERRACK", 112, 2, 0),
    base(36, "WHITE_STAINED_HARDENED_CLAY", 209, 177, 161),
    base(37, "ORANGE_STAINED_HARDENED_CLAY", 159, 82, 36),
    base(38, "MAGENTA_STAINED_HARDENED_CLAY", 149, 87, 108),
    base(39, "LIGHT_BLUE_STAINED_HARDENED_CLAY", 112, 108, 138),
    base(40, "YELLOW_STAINED_HARDENED_CLAY", 186, 133, 36),
    base(41, "LIME_STAINED_HARDENED_CLAY", 103, 117, 53),
    base(42, "PINK_STAINED_HARDENED_CLAY", 160, 77, 78),
    base(43, "GRAY_STAINED_HARDENED_CLAY", 57, 41, 35),
    base(44, "SILVER_STAINED_HARDENED_CLAY", 135, 107, 98),
    base(45, "CYAN_STAINED_HARDENED_CLAY", 87, 92, 92),
    base(46, "PURPLE_STAINED_HARDENED_CLAY", 122, 73, 88),
    base(47, "BLUE_STAINED_HARDENED_CLAY", 76, 62, 92),
    base(48, "BROWN_STAINED_HARDENED_CLAY", 76, 50, 35),
    base(49, "GREEN_STAINED_HARDENED_CLAY", 76, 82, 42),
    base(50, "RED_STAINED_HARDENED_CLAY", 142, 60, 46),
    base(51, "BLACK_STAINED_HARDENED_CLAY", 37, 22, 16),
];

impl BaseColor {
    /// Look up a base color by id.
    pub fn by_id(id: u8) -> Option<&'static BaseColor> {
        BASE_COLORS.get(id as usize)
    }

    /// Look up a base color by name, ignoring case.
    pub fn by_name(name: &str) -> Option<&'static BaseColor> {
        BASE_COLORS
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// This color at the given shade (0-3).
    pub fn shaded(&self, shade: usize) -> Rgba<u8> {
        match (self.rgb, SHADE_MULTIPLIERS.get(shade)) {
            (Some(rgb), Some(&m)) => {
                let scale = |c: u8| (c as u32 * m / 255) as u8;
                Rgba([scale(rgb[0]), scale(rgb[1]), scale(rgb[2]), 255])
            }
            _ => TRANSPARENT,
        }
    }
}

/// RGBA value for a raw map color index.
pub fn rgba(index: u8) -> Rgba<u8> {
    let index = index as usize;
    match BASE_COLORS.get(index / SHADE_MULTIPLIERS.len()) {
        Some(color) => color.shaded(index % SHADE_MULTIPLIERS.len()),
        None => TRANSPARENT,
    }
}

/// Build a tile raster from row-major color indices.
///
/// # Errors
///
/// Returns [`AtlasError::InvalidIndexCount`] unless `indices` holds exactly
/// 128×128 bytes.
pub fn image_from_indices(indices: &[u8]) -> AtlasResult<RgbaImage> {
    let expected = (TILE_SIZE * TILE_SIZE) as usize;
    if indices.len() != expected {
        return Err(AtlasError::InvalidIndexCount { len: indices.len() });
    }
    Ok(RgbaImage::from_fn(TILE_SIZE, TILE_SIZE, |col, row| {
        rgba(indices[(row * TILE_SIZE + col) as usize])
    }))
}
