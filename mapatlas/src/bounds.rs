//! Square world regions and their quadrant arithmetic.
//!
//! A [`Bounds`] is a square of world space described by its center and a
//! discrete scale. Scale 0 is the finest level (128 blocks per side) and
//! each level doubles the side length up to [`MAX_SCALE`] (2048 blocks),
//! which is the size of a megaregion.
//!
//! Regions are half-open: a bounds centered at `(x, z)` with side `s`
//! covers `[x - s/2, x + s/2) × [z - s/2, z + s/2)`.
//!
//! # Pyramid grid
//!
//! Megaregions are centered on multiples of 2048. Every finer level is the
//! recursive quadrant subdivision of that grid, so [`Bounds::sub_bounds`]
//! and [`Bounds::containing_bounds`] always agree on which cells exist.

use std::fmt;

use crate::error::{AtlasError, AtlasResult};

/// Coarsest supported scale (megaregion level).
pub const MAX_SCALE: u8 = 4;

/// Number of discrete scales.
pub const SCALE_COUNT: usize = MAX_SCALE as usize + 1;

/// Width and height of every tile raster in pixels.
pub const TILE_SIZE: u32 = 128;

/// Side length in world units for each scale.
pub const SIDE_LEN: [i32; SCALE_COUNT] = [128, 256, 512, 1024, 2048];

/// Centers must be aligned to this many world units.
const COORD_ALIGN: i32 = 8;

/// Largest accepted center magnitude on either axis. Keeps the megaregion
/// around any accepted center inside `i32`.
pub const MAX_COORD: i32 = 1 << 30;

/// Offset of the pyramid grid origin from world zero.
const GRID_ORIGIN: i32 = -SIDE_LEN[MAX_SCALE as usize] / 2;

/// One of the four quadrants a region divides into.
///
/// The discriminant is the child slot index inside a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Toward negative x and negative z.
    NorthWest = 0,
    /// Toward negative x and positive z.
    NorthEast = 1,
    /// Toward positive x and negative z.
    SouthWest = 2,
    /// Toward positive x and positive z.
    SouthEast = 3,
}

impl Direction {
    /// All directions in slot order.
    pub const ALL: [Direction; 4] = [
        Direction::NorthWest,
        Direction::NorthEast,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    /// Child slot index for this direction.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Unit offsets `(dx, dz)` toward this quadrant.
    #[inline]
    pub fn signs(self) -> (i32, i32) {
        match self {
            Direction::NorthWest => (-1, -1),
            Direction::NorthEast => (-1, 1),
            Direction::SouthWest => (1, -1),
            Direction::SouthEast => (1, 1),
        }
    }

    /// Pixel offset `(column, row)` of this quadrant inside a raster whose
    /// quadrants are `half` pixels wide. World x runs along columns and
    /// world z along rows.
    #[inline]
    pub fn pixel_offset(self, half: u32) -> (u32, u32) {
        let (dx, dz) = self.signs();
        let col = if dx > 0 { half } else { 0 };
        let row = if dz > 0 { half } else { 0 };
        (col, row)
    }

    /// Short label used in logs.
    pub fn code(self) -> &'static str {
        match self {
            Direction::NorthWest => "nw",
            Direction::NorthEast => "ne",
            Direction::SouthWest => "sw",
            Direction::SouthEast => "se",
        }
    }
}

/// An immutable square region of world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    x: i32,
    z: i32,
    scale: u8,
}

impl Bounds {
    /// Create a bounds centered at `(x, z)`.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::InvalidCoordinate`] if either coordinate is not
    /// a multiple of 8 or lies beyond [`MAX_COORD`], or
    /// [`AtlasError::InvalidScale`] if `scale > 4`.
    pub fn new(x: i32, z: i32, scale: u8) -> AtlasResult<Self> {
        if scale > MAX_SCALE {
            return Err(AtlasError::InvalidScale(scale));
        }
        let in_range = |c: i32| c.unsigned_abs() <= MAX_COORD as u32;
        if x % COORD_ALIGN != 0 || z % COORD_ALIGN != 0 || !in_range(x) || !in_range(z) {
            return Err(AtlasError::InvalidCoordinate { x, z });
        }
        Ok(Self { x, z, scale })
    }

    /// Construct without validation. Callers derive the values from an
    /// already valid bounds.
    #[inline]
    const fn derived(x: i32, z: i32, scale: u8) -> Self {
        Self { x, z, scale }
    }

    /// Center x coordinate.
    #[inline]
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Center z coordinate.
    #[inline]
    pub fn z(&self) -> i32 {
        self.z
    }

    /// Resolution level.
    #[inline]
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Side length of this region in world units.
    #[inline]
    pub fn side(&self) -> i32 {
        Self::side_at(self.scale)
    }

    /// Side length of a region at the given scale.
    ///
    /// # Panics
    ///
    /// Panics if `scale > MAX_SCALE`.
    #[inline]
    pub fn side_at(scale: u8) -> i32 {
        SIDE_LEN[scale as usize]
    }

    /// Half-open rectangle as `(left, top, right, bottom)`, where left/right
    /// are x extents and top/bottom are z extents.
    pub fn rect(&self) -> (i32, i32, i32, i32) {
        let half = self.side() / 2;
        let left = self.x - half;
        let top = self.z - half;
        (left, top, left + self.side(), top + self.side())
    }

    /// Grid coordinates of this center when the world is divided into cells
    /// of the given scale.
    ///
    /// # Panics
    ///
    /// Panics if `scale > MAX_SCALE`.
    pub fn coords_at(&self, scale: u8) -> (i32, i32) {
        let side = Self::side_at(scale);
        let cell = |c: i32| (c + side / 2).div_euclid(side);
        (cell(self.x), cell(self.z))
    }

    /// The quadrant one scale finer in the given direction.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::LeafSubdivision`] at scale 0.
    pub fn sub_bounds(&self, direction: Direction) -> AtlasResult<Bounds> {
        if self.scale == 0 {
            return Err(AtlasError::LeafSubdivision(*self));
        }
        let offset = self.side() / 4;
        let (dx, dz) = direction.signs();
        Ok(Self::derived(
            self.x + dx * offset,
            self.z + dz * offset,
            self.scale - 1,
        ))
    }

    /// Which quadrant of `larger` this bounds falls in.
    ///
    /// A coordinate less than or equal to the reference center belongs to
    /// the negative half.
    pub fn direction_from(&self, larger: &Bounds) -> Direction {
        let south = self.x > larger.x;
        let east = self.z > larger.z;
        match (south, east) {
            (false, false) => Direction::NorthWest,
            (false, true) => Direction::NorthEast,
            (true, false) => Direction::SouthWest,
            (true, true) => Direction::SouthEast,
        }
    }

    /// Whether `other` is at the same or a finer scale and its center lies
    /// inside this region.
    pub fn contains(&self, other: &Bounds) -> bool {
        let (left, top, right, bottom) = self.rect();
        self.scale >= other.scale
            && (left..right).contains(&other.x)
            && (top..bottom).contains(&other.z)
    }

    /// The pyramid cell at `scale` that contains this bounds.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::InvalidScale`] if `scale` is finer than this
    /// bounds or coarser than [`MAX_SCALE`].
    pub fn containing_bounds(&self, scale: u8) -> AtlasResult<Bounds> {
        if scale > MAX_SCALE || scale < self.scale {
            return Err(AtlasError::InvalidScale(scale));
        }
        let side = Self::side_at(scale);
        let snap = |c: i32| GRID_ORIGIN + (c - GRID_ORIGIN).div_euclid(side) * side + side / 2;
        Ok(Self::derived(snap(self.x), snap(self.z), scale))
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bounds({}, {}, scale {})", self.x, self.z, self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(x: i32, z: i32, scale: u8) -> Bounds {
        Bounds::new(x, z, scale).unwrap()
    }

    #[test]
    fn test_side_lengths() {
        let sides: Vec<i32> = (0..=MAX_SCALE).map(Bounds::side_at).collect();
        assert_eq!(sides, vec![128, 256, 512, 1024, 2048]);
        assert_eq!(sides, SIDE_LEN.to_vec());
    }

    #[test]
    fn test_new_rejects_unaligned_coordinates() {
        let result = Bounds::new(4, 0, 0);
        assert!(matches!(
            result,
            Err(AtlasError::InvalidCoordinate { x: 4, z: 0 })
        ));
        assert!(Bounds::new(0, -12, 2).is_err());
    }

    #[test]
    fn test_new_rejects_coordinates_past_limit() {
        assert!(matches!(
            Bounds::new(i32::MAX - 7, 0, 4),
            Err(AtlasError::InvalidCoordinate { .. })
        ));
        assert!(Bounds::new(0, i32::MIN, 0).is_err());
        assert!(Bounds::new(MAX_COORD + 8, 0, 2).is_err());
    }

    #[test]
    fn test_arithmetic_at_coordinate_limit() {
        let edge = b(MAX_COORD, -MAX_COORD, 0);
        assert_eq!(edge.coords_at(MAX_SCALE), (1 << 19, -(1 << 19)));

        let root = edge.containing_bounds(MAX_SCALE).unwrap();
        assert_eq!(root, b(MAX_COORD, -MAX_COORD, MAX_SCALE));
        assert!(root.contains(&edge));
        assert_eq!(
            root.rect(),
            (MAX_COORD - 1024, -MAX_COORD - 1024, MAX_COORD + 1024, -MAX_COORD + 1024)
        );
    }

    #[test]
    #[should_panic]
    fn test_side_at_past_max_scale_panics() {
        Bounds::side_at(MAX_SCALE + 1);
    }

    #[test]
    fn test_new_rejects_out_of_range_scale() {
        assert!(matches!(
            Bounds::new(0, 0, 5),
            Err(AtlasError::InvalidScale(5))
        ));
    }

    #[test]
    fn test_rect() {
        assert_eq!(b(0, 0, 4).rect(), (-1024, -1024, 1024, 1024));
        assert_eq!(b(64, -64, 0).rect(), (0, -128, 128, 0));
    }

    #[test]
    fn test_coords_at_origin_megaregion() {
        assert_eq!(b(0, 0, 4).coords_at(4), (0, 0));
    }

    #[test]
    fn test_coords_at_floors_negative_coordinates() {
        // -1032 + 1024 = -8, which floors to cell -1
        assert_eq!(b(-1032, 1024, 0).coords_at(4), (-1, 1));
        assert_eq!(b(-64, 64, 0).coords_at(0), (0, 1));
    }

    #[test]
    fn test_sub_bounds_offsets() {
        let root = b(0, 0, 4);
        assert_eq!(root.sub_bounds(Direction::NorthWest).unwrap(), b(-512, -512, 3));
        assert_eq!(root.sub_bounds(Direction::NorthEast).unwrap(), b(-512, 512, 3));
        assert_eq!(root.sub_bounds(Direction::SouthWest).unwrap(), b(512, -512, 3));
        assert_eq!(root.sub_bounds(Direction::SouthEast).unwrap(), b(512, 512, 3));
    }

    #[test]
    fn test_sub_bounds_on_leaf_fails() {
        let leaf = b(64, 64, 0);
        assert_eq!(
            leaf.sub_bounds(Direction::SouthEast),
            Err(AtlasError::LeafSubdivision(leaf))
        );
    }

    #[test]
    fn test_direction_from_tie_goes_to_lower_half() {
        let reference = b(0, 0, 4);
        assert_eq!(b(0, 0, 2).direction_from(&reference), Direction::NorthWest);
        assert_eq!(b(0, 8, 2).direction_from(&reference), Direction::NorthEast);
        assert_eq!(b(8, 0, 2).direction_from(&reference), Direction::SouthWest);
    }

    #[test]
    fn test_direction_from_several_levels_down() {
        let root = b(0, 0, 4);
        let leaf = b(960, -960, 0);
        assert_eq!(leaf.direction_from(&root), Direction::SouthWest);
    }

    #[test]
    fn test_contains_is_half_open() {
        let region = b(0, 0, 1);
        assert!(region.contains(&b(-128, -128, 0)));
        assert!(!region.contains(&b(128, 0, 0)));
        assert!(!region.contains(&b(0, 128, 0)));
    }

    #[test]
    fn test_contains_requires_coarser_or_equal_scale() {
        assert!(!b(64, 64, 0).contains(&b(0, 0, 1)));
        assert!(b(0, 0, 1).contains(&b(0, 0, 1)));
    }

    #[test]
    fn test_containing_bounds_megaregion() {
        let leaf = b(1088, -64, 0);
        assert_eq!(leaf.containing_bounds(4).unwrap(), b(2048, 0, 4));
    }

    #[test]
    fn test_containing_bounds_matches_subdivision() {
        let root = b(0, 0, 4);
        let child = root.sub_bounds(Direction::SouthEast).unwrap();
        let grandchild = child.sub_bounds(Direction::NorthWest).unwrap();
        assert_eq!(grandchild.containing_bounds(3).unwrap(), child);
        assert_eq!(grandchild.containing_bounds(4).unwrap(), root);
        assert_eq!(grandchild.containing_bounds(2).unwrap(), grandchild);
    }

    #[test]
    fn test_containing_bounds_rejects_finer_scale() {
        assert!(matches!(
            b(0, 0, 3).containing_bounds(1),
            Err(AtlasError::InvalidScale(1))
        ));
    }

    #[test]
    fn test_pixel_offsets() {
        assert_eq!(Direction::NorthWest.pixel_offset(64), (0, 0));
        assert_eq!(Direction::NorthEast.pixel_offset(64), (0, 64));
        assert_eq!(Direction::SouthWest.pixel_offset(64), (64, 0));
        assert_eq!(Direction::SouthEast.pixel_offset(64), (64, 64));
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_bounds(min_scale: u8) -> impl Strategy<Value = Bounds> {
            (-4096i32..4096, -4096i32..4096, min_scale..=MAX_SCALE)
                .prop_map(|(x, z, scale)| Bounds::new(x * 8, z * 8, scale).unwrap())
        }

        fn any_direction() -> impl Strategy<Value = Direction> {
            prop::sample::select(Direction::ALL.to_vec())
        }

        proptest! {
            #[test]
            fn test_sub_bounds_partition_parent(parent in any_bounds(1)) {
                let (left, top, right, bottom) = parent.rect();
                let children: Vec<Bounds> = Direction::ALL
                    .iter()
                    .map(|d| parent.sub_bounds(*d).unwrap())
                    .collect();

                let mut area: i64 = 0;
                for (i, child) in children.iter().enumerate() {
                    prop_assert_eq!(child.scale(), parent.scale() - 1);

                    let (l, t, r, bt) = child.rect();
                    prop_assert!(l >= left && r <= right && t >= top && bt <= bottom);
                    area += (r - l) as i64 * (bt - t) as i64;

                    for other in &children[i + 1..] {
                        let (ol, ot, or, ob) = other.rect();
                        let overlaps = l < or && ol < r && t < ob && ot < bt;
                        prop_assert!(!overlaps, "{} overlaps {}", child, other);
                    }
                }
                prop_assert_eq!(area, parent.side() as i64 * parent.side() as i64);
            }

            #[test]
            fn test_direction_from_inverts_sub_bounds(
                parent in any_bounds(1),
                direction in any_direction()
            ) {
                let child = parent.sub_bounds(direction)?;
                prop_assert_eq!(child.direction_from(&parent), direction);
            }

            #[test]
            fn test_containing_bounds_contains_self(
                bounds in any_bounds(0),
                extra in 0u8..=MAX_SCALE
            ) {
                let scale = (bounds.scale() + extra).min(MAX_SCALE);
                let ancestor = bounds.containing_bounds(scale)?;
                prop_assert!(ancestor.contains(&bounds), "{} !⊇ {}", ancestor, bounds);
            }
        }
    }
}
