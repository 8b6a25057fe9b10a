//! Quadtree node storage.
//!
//! Nodes live in a flat arena owned by the tree and reference their children
//! by arena index, never by pointer. A node is either a branch holding up to
//! four child indices or a leaf holding the world-space heights of its four
//! corners; the two payloads are an explicit tagged union.

use smallvec::SmallVec;

/// Index of a node within the tree's arena.
pub type NodeIndex = u32;

/// Per-node payload.
///
/// Quadrants are ordered TL, TR, BL, BR throughout the crate:
///
/// ```text
///     +----+----+      x ->
///     | TL | TR |    y
///     +----+----+    |
///     | BL | BR |    v
///     +----+----+
/// ```
///
/// A branch child is `None` exactly when its region would start beyond the
/// raster bounds. Leaf corner heights are world-space, sampled at the
/// footprint corners clamped to the raster edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeKind {
  Branch { children: [Option<NodeIndex>; 4] },
  Leaf { corner_heights: [f32; 4] },
}

/// One square region of the raster at one tree depth.
///
/// `level` counts from 0 at the top of the tree; leaves sit at
/// `lod_level_count - 1`. Height extrema stay quantized; they are converted
/// to world space on demand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
  /// Raster-space origin.
  pub x: u16,
  pub y: u16,
  /// Edge length in raster units, a power of two.
  pub size: u16,
  /// Tree depth, 0 at the top.
  pub level: u8,
  /// Quantized height extrema over the raster footprint.
  pub min_z: u16,
  pub max_z: u16,
  pub kind: NodeKind,
}

impl Node {
  #[inline]
  pub fn is_leaf(&self) -> bool {
    matches!(self.kind, NodeKind::Leaf { .. })
  }

  /// Child indices that exist, in TL, TR, BL, BR order. Empty for leaves.
  pub fn present_children(&self) -> SmallVec<[NodeIndex; 4]> {
    match self.kind {
      NodeKind::Branch { children } => children.iter().filter_map(|child| *child).collect(),
      NodeKind::Leaf { .. } => SmallVec::new(),
    }
  }
}
