//! Top-level registry of megaregion trees.
//!
//! An [`Atlas`] partitions the world into 2048×2048 megaregions and keeps
//! one independent [`MapNode`] root per occupied megaregion. It is the entry
//! point for the three passes of a conversion job:
//!
//! 1. [`Atlas::insert`] every decoded tile
//! 2. [`Atlas::interpolate_all`] once
//! 3. [`Atlas::stacks_by_scale`] (or [`crate::export`]) to read the pyramid

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::bounds::MAX_SCALE;
use crate::error::AtlasResult;
use crate::layer::{Render, SharedStack, Tile};
use crate::tree::MapNode;

/// Megaregion grid coordinates, `Bounds::coords_at(MAX_SCALE)`.
pub type MegaregionKey = (i32, i32);

/// Collection of megaregion trees for one conversion job.
#[derive(Debug, Default)]
pub struct Atlas {
    roots: HashMap<MegaregionKey, MapNode>,
}

impl Atlas {
    /// Create an empty atlas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a decoded tile, creating its megaregion root if needed.
    pub fn insert(&mut self, tile: Tile) -> AtlasResult<()> {
        let bounds = tile.bounds();
        let key = bounds.coords_at(MAX_SCALE);

        let root = match self.roots.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let root_bounds = bounds.containing_bounds(MAX_SCALE)?;
                debug!(
                    key_x = key.0,
                    key_z = key.1,
                    root = %root_bounds,
                    "New megaregion"
                );
                entry.insert(MapNode::new(root_bounds))
            }
        };
        root.insert(tile)
    }

    /// Insert every tile, stopping at the first failure.
    pub fn extend<I>(&mut self, tiles: I) -> AtlasResult<()>
    where
        I: IntoIterator<Item = Tile>,
    {
        for tile in tiles {
            self.insert(tile)?;
        }
        Ok(())
    }

    /// Densify every megaregion down to scale 0.
    ///
    /// Megaregions share no state, so they are filled in parallel.
    pub fn interpolate_all(&mut self) -> AtlasResult<()> {
        info!(megaregions = self.roots.len(), "Interpolating atlas");
        self.roots
            .par_iter_mut()
            .try_for_each(|(_, root)| root.interpolate())
    }

    /// Number of occupied megaregions.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether no tile has been inserted.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Root of the megaregion with the given key.
    pub fn root(&self, key: MegaregionKey) -> Option<&MapNode> {
        self.roots.get(&key)
    }

    /// Every node of every megaregion, depth first per megaregion.
    pub fn nodes(&self) -> impl Iterator<Item = &MapNode> {
        self.roots.values().flat_map(MapNode::iter)
    }

    /// Every non-empty stack, grouped by scale.
    pub fn stacks_by_scale(&self) -> BTreeMap<u8, Vec<SharedStack>> {
        let mut by_scale: BTreeMap<u8, Vec<SharedStack>> = BTreeMap::new();
        for node in self.nodes() {
            if node.stack().read().is_empty() {
                continue;
            }
            by_scale
                .entry(node.bounds().scale())
                .or_default()
                .push(node.stack().clone());
        }
        by_scale
    }

    /// Smallest megaregion key on each axis.
    pub fn top_left(&self) -> Option<MegaregionKey> {
        let min_x = self.roots.keys().map(|k| k.0).min()?;
        let min_z = self.roots.keys().map(|k| k.1).min()?;
        Some((min_x, min_z))
    }

    /// Span of megaregion keys on each axis.
    pub fn dimension(&self) -> Option<(i32, i32)> {
        let (min_x, min_z) = self.top_left()?;
        let max_x = self.roots.keys().map(|k| k.0).max()?;
        let max_z = self.roots.keys().map(|k| k.1).max()?;
        Some((max_x - min_x, max_z - min_z))
    }
}
