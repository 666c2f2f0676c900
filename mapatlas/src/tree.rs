//! Recursive quadtree indexing stacks by region and scale.
//!
//! Every [`MapNode`] owns the stack for its own region plus up to four
//! children, one per [`Direction`]. Children are created on first need.
//! Scale-0 nodes are leaves and never get children.

use tracing::trace;

use crate::bounds::{Bounds, Direction};
use crate::error::{AtlasError, AtlasResult};
use crate::layer::{Render, SharedStack, Stack, Tile, View};

/// One cell of the pyramid.
#[derive(Debug)]
pub struct MapNode {
    bounds: Bounds,
    stack: SharedStack,
    children: [Option<Box<MapNode>>; 4],
}

impl MapNode {
    /// Create an empty node covering `bounds`.
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            stack: Stack::shared(bounds),
            children: Default::default(),
        }
    }

    /// Region covered by this node.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The node's stack.
    pub fn stack(&self) -> &SharedStack {
        &self.stack
    }

    /// Child in the given quadrant, if it has been created.
    pub fn child(&self, direction: Direction) -> Option<&MapNode> {
        self.children[direction.index()].as_deref()
    }

    /// Existing children in slot order.
    pub fn children(&self) -> impl Iterator<Item = &MapNode> {
        self.children.iter().filter_map(|c| c.as_deref())
    }

    /// Route a tile to the node matching its bounds, creating intermediate
    /// nodes as needed.
    ///
    /// # Errors
    ///
    /// Returns [`AtlasError::Misplaced`] if the tile is neither this node's
    /// region nor inside it.
    pub fn insert(&mut self, tile: Tile) -> AtlasResult<()> {
        let target = tile.bounds();
        if target == self.bounds {
            return self.stack.write().add(tile);
        }
        if self.bounds.scale() <= target.scale() || !self.bounds.contains(&target) {
            return Err(AtlasError::Misplaced {
                node: self.bounds,
                tile: target,
            });
        }

        let direction = target.direction_from(&self.bounds);
        self.child_or_create(direction)?.insert(tile)
    }

    /// Fill every cell below this node down to scale 0.
    ///
    /// Each child receives a [`View`] of this node's stack in addition to
    /// whatever it already holds. Must run after all tiles are inserted:
    /// views only see stacks that exist when they are created.
    pub fn interpolate(&mut self) -> AtlasResult<()> {
        if self.bounds.scale() == 0 {
            return Ok(());
        }

        for direction in Direction::ALL {
            let view = View::new(&self.stack, direction)?;
            let child = self.child_or_create(direction)?;
            child.stack.write().add(view)?;
            child.interpolate()?;
        }
        Ok(())
    }

    /// Depth-first iterator over this node and all descendants.
    pub fn iter(&self) -> Nodes<'_> {
        Nodes {
            pending: vec![self],
        }
    }

    fn child_or_create(&mut self, direction: Direction) -> AtlasResult<&mut MapNode> {
        let bounds = self.bounds.sub_bounds(direction)?;
        let parent = self.bounds;
        let child = self.children[direction.index()].get_or_insert_with(|| {
            trace!(
                parent = %parent,
                direction = direction.code(),
                "Creating child node"
            );
            Box::new(MapNode::new(bounds))
        });
        Ok(child.as_mut())
    }
}

/// Depth-first traversal of a subtree. See [`MapNode::iter`].
pub struct Nodes<'a> {
    pending: Vec<&'a MapNode>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a MapNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.pending.pop()?;
        self.pending.extend(node.children());
        Some(node)
    }
}
