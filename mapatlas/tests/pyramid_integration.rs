//! Integration tests for pyramid construction.
//!
//! These tests drive the public API end to end:
//! - tile insertion across megaregions
//! - interpolation down to scale 0
//! - compositing of real detail over interpolated content
//! - PNG export layout
//!
//! Run with: `cargo test --test pyramid_integration`

use std::collections::HashSet;

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

use mapatlas::export::{export_pyramid, ExportConfig, TilePath};
use mapatlas::palette;
use mapatlas::{Atlas, Bounds, Direction, Render, Tile, MAX_SCALE, SIDE_LEN, TILE_SIZE};

// ============================================================================
// Helper Functions
// ============================================================================

const SAND: Rgba<u8> = Rgba([247, 233, 163, 255]);
const WATER: Rgba<u8> = Rgba([64, 64, 255, 255]);

/// Create a single-color tile.
fn uniform_tile(x: i32, z: i32, scale: u8, color: Rgba<u8>) -> Tile {
    let bounds = Bounds::new(x, z, scale).unwrap();
    Tile::new(bounds, RgbaImage::from_pixel(TILE_SIZE, TILE_SIZE, color)).unwrap()
}

/// Composite image of the cell with the given bounds.
fn cell_image(atlas: &Atlas, bounds: Bounds) -> RgbaImage {
    let root = atlas
        .root(bounds.coords_at(MAX_SCALE))
        .expect("megaregion should exist");
    let node = root
        .iter()
        .find(|n| n.bounds() == bounds)
        .expect("cell should exist");
    let image = node.stack().read().image().unwrap();
    image
}

// ============================================================================
// Integration Tests
// ============================================================================

#[test]
fn test_side_lengths_per_scale() {
    assert_eq!(SIDE_LEN, [128, 256, 512, 1024, 2048]);
    for scale in 0..=MAX_SCALE {
        assert_eq!(Bounds::new(0, 0, scale).unwrap().side(), SIDE_LEN[scale as usize]);
    }
}

/// A single uniform megaregion tile fills every cell with the same color.
#[test]
fn test_uniform_megaregion_fills_pyramid() {
    let mut atlas = Atlas::new();
    let tile = uniform_tile(0, 0, 4, SAND);
    assert_eq!(tile.bounds().coords_at(4), (0, 0));

    atlas.insert(tile).unwrap();
    atlas.interpolate_all().unwrap();

    let root = atlas.root((0, 0)).unwrap();
    let leaves: Vec<_> = root.iter().filter(|n| n.bounds().scale() == 0).collect();
    assert_eq!(leaves.len(), 256);

    for node in root.iter() {
        let stack = node.stack().read();
        assert!(!stack.is_empty(), "{} is empty", node.bounds());
        let image = stack.image().unwrap();
        assert!(
            image.pixels().all(|p| *p == SAND),
            "{} is not uniform",
            node.bounds()
        );
    }
}

#[test]
fn test_stacks_by_scale_counts_and_uniqueness() {
    let mut atlas = Atlas::new();
    atlas.insert(uniform_tile(0, 0, 4, SAND)).unwrap();
    atlas.insert(uniform_tile(-2048, 4096, 4, WATER)).unwrap();
    atlas.interpolate_all().unwrap();

    let by_scale = atlas.stacks_by_scale();
    assert_eq!(by_scale.len(), 5);
    for (scale, stacks) in &by_scale {
        let cells_per_megaregion = 4usize.pow((MAX_SCALE - scale) as u32);
        assert_eq!(stacks.len(), 2 * cells_per_megaregion);

        let unique: HashSet<Bounds> = stacks.iter().map(|s| s.read().bounds()).collect();
        assert_eq!(unique.len(), stacks.len(), "duplicate cells at scale {}", scale);
    }
}

/// Real detail inserted below a coarse tile shows through in its own cell
/// and in everything interpolated beneath it.
#[test]
fn test_real_detail_wins_over_interpolation() {
    let root_bounds = Bounds::new(0, 0, 4).unwrap();
    let detail_bounds = root_bounds
        .sub_bounds(Direction::SouthEast)
        .and_then(|b| b.sub_bounds(Direction::NorthWest))
        .unwrap();

    let mut atlas = Atlas::new();
    atlas.insert(uniform_tile(0, 0, 4, SAND)).unwrap();
    atlas
        .insert(uniform_tile(detail_bounds.x(), detail_bounds.z(), 2, WATER))
        .unwrap();
    atlas.interpolate_all().unwrap();

    // The detail cell itself and one of its leaves
    assert!(cell_image(&atlas, detail_bounds)
        .pixels()
        .all(|p| *p == WATER));
    let leaf = detail_bounds
        .sub_bounds(Direction::NorthEast)
        .and_then(|b| b.sub_bounds(Direction::SouthWest))
        .unwrap();
    assert!(cell_image(&atlas, leaf).pixels().all(|p| *p == WATER));

    // A sibling of the detail cell still comes from the megaregion tile
    let sibling = root_bounds
        .sub_bounds(Direction::SouthEast)
        .and_then(|b| b.sub_bounds(Direction::SouthEast))
        .unwrap();
    assert!(cell_image(&atlas, sibling).pixels().all(|p| *p == SAND));

    // The parent of the detail cell is not changed by it
    let parent = root_bounds.sub_bounds(Direction::SouthEast).unwrap();
    assert!(cell_image(&atlas, parent).pixels().all(|p| *p == SAND));
}

/// Two tiles on one cell: the first inserted is drawn on top, the second
/// shows only through its transparent pixels.
#[test]
fn test_same_cell_compositing() {
    let mut indices = vec![12 * 4 + 2; (TILE_SIZE * TILE_SIZE) as usize];
    // Punch an air row into the first tile
    for col in 0..TILE_SIZE as usize {
        indices[col] = 0;
    }
    let bounds = Bounds::new(64, 64, 0).unwrap();

    let mut atlas = Atlas::new();
    atlas.insert(Tile::from_indices(bounds, &indices).unwrap()).unwrap();
    atlas.insert(uniform_tile(64, 64, 0, SAND)).unwrap();

    let image = cell_image(&atlas, bounds);
    assert_eq!(*image.get_pixel(17, 0), SAND);
    assert_eq!(*image.get_pixel(17, 1), palette::rgba(50));
    assert_eq!(palette::rgba(50), WATER);
}

#[test]
fn test_sparse_leaf_leaves_rest_of_megaregion_transparent() {
    let mut atlas = Atlas::new();
    atlas.insert(uniform_tile(64, 64, 0, WATER)).unwrap();
    atlas.interpolate_all().unwrap();

    let root = atlas.root((0, 0)).unwrap();
    assert_eq!(root.iter().count(), 341);

    let transparent = Rgba([0, 0, 0, 0]);
    let far_leaf = Bounds::new(-960, -960, 0).unwrap();
    assert!(cell_image(&atlas, far_leaf)
        .pixels()
        .all(|p| *p == transparent));
    assert!(cell_image(&atlas, Bounds::new(64, 64, 0).unwrap())
        .pixels()
        .all(|p| *p == WATER));
}

#[test]
fn test_export_layout() {
    let dir = TempDir::new().unwrap();
    let mut atlas = Atlas::new();
    atlas.insert(uniform_tile(2048, -2048, 4, SAND)).unwrap();
    atlas.interpolate_all().unwrap();

    let summary = export_pyramid(&atlas, dir.path(), &ExportConfig::default(), |_| {}).unwrap();
    assert_eq!(summary.total(), 341);

    // Megaregion at depth 0 is named by its scale-4 grid cell
    let top = TilePath::for_bounds(&Bounds::new(2048, -2048, 4).unwrap());
    assert_eq!(top.to_string(), "0/1/-1");
    assert!(dir.path().join(top.relative_path()).is_file());

    for depth in 0..=MAX_SCALE {
        let depth_dir = dir.path().join(depth.to_string());
        let files: usize = std::fs::read_dir(&depth_dir)
            .unwrap()
            .map(|entry| std::fs::read_dir(entry.unwrap().path()).unwrap().count())
            .sum();
        assert_eq!(files, 4usize.pow(depth as u32), "depth {}", depth);
    }
}
