//! QuadTree - construction over a heightmap raster and per-node world bounds.
//!
//! The tree is built once per heightmap. Every level tiles the raster
//! completely: nodes whose footprint would start beyond the raster edge are
//! skipped, so edge nodes can have fewer than four children and the top level
//! is a dense `top_node_count_x * top_node_count_y` grid rather than a single
//! root. All nodes live in one pre-order arena allocated up front.

use glam::Vec3;

use crate::heightmap::HeightmapSource;

use super::bounds::Aabb;
use super::config::{CreateResult, MapDimensions, QuadTreeConfig, MAX_LOD_LEVELS};
use super::node::{Node, NodeIndex, NodeKind};

/// Quadtree over a heightmap raster.
///
/// Holds the node arena, the top-level node grid and the world-space metrics
/// derived from the map dimensions. Immutable after construction; selection
/// and queries borrow it freely.
#[derive(Clone, Debug)]
pub struct QuadTree {
  config: QuadTreeConfig,
  raster_size_x: usize,
  raster_size_y: usize,

  /// Pre-order arena: every node precedes its children.
  nodes: Vec<Node>,
  /// Row-major grid of top-level node indices.
  top_nodes: Vec<NodeIndex>,
  top_node_count_x: usize,
  top_node_count_y: usize,
  top_node_size: usize,

  leaf_node_world_size_x: f32,
  leaf_node_world_size_y: f32,
  /// World-space node diagonal per LOD level, 0 = leaf level.
  lod_level_node_diag_sizes: [f32; MAX_LOD_LEVELS],
}

impl QuadTree {
  /// Build a quadtree over `heightmap`.
  ///
  /// The configuration is validated against the raster size first; on error
  /// nothing is allocated. Construction samples every raster cell once
  /// through [`HeightmapSource::area_min_max`], so its cost is dominated by
  /// the leaf-level min/max scans.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "quadtree::create"))]
  pub fn create<H: HeightmapSource + ?Sized>(
    config: QuadTreeConfig,
    heightmap: &H,
  ) -> CreateResult<QuadTree> {
    let raster_size_x = heightmap.size_x();
    let raster_size_y = heightmap.size_y();
    config.validate(raster_size_x, raster_size_y)?;

    let top_node_size = config.top_node_size();

    // Every level tiles the raster with ceil(raster_size / node_size) nodes
    // per axis, which sizes the arena exactly.
    let mut total_node_count = 0usize;
    let mut node_size = config.leaf_node_size as usize;
    for _ in 0..config.lod_level_count {
      total_node_count +=
        ((raster_size_x - 1) / node_size + 1) * ((raster_size_y - 1) / node_size + 1);
      node_size *= 2;
    }

    let top_node_count_x = (raster_size_x - 1) / top_node_size + 1;
    let top_node_count_y = (raster_size_y - 1) / top_node_size + 1;

    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("arena_build").entered();

    let mut nodes = Vec::with_capacity(total_node_count);
    let mut top_nodes = Vec::with_capacity(top_node_count_x * top_node_count_y);
    for y in 0..top_node_count_y {
      for x in 0..top_node_count_x {
        let index = build_node(
          &mut nodes,
          heightmap,
          &config,
          x * top_node_size,
          y * top_node_size,
          top_node_size,
          0,
        );
        top_nodes.push(index);
      }
    }
    debug_assert_eq!(
      nodes.len(),
      total_node_count,
      "arena fill must match the per-level node count"
    );

    let dims = config.map_dims;
    let leaf_node_world_size_x =
      config.leaf_node_size as f32 * dims.size_x / raster_size_x as f32;
    let leaf_node_world_size_y =
      config.leaf_node_size as f32 * dims.size_y / raster_size_y as f32;
    let mut lod_level_node_diag_sizes = [0.0f32; MAX_LOD_LEVELS];
    lod_level_node_diag_sizes[0] = leaf_node_world_size_x.hypot(leaf_node_world_size_y);
    for level in 1..config.lod_level_count {
      lod_level_node_diag_sizes[level] = 2.0 * lod_level_node_diag_sizes[level - 1];
    }

    Ok(QuadTree {
      config,
      raster_size_x,
      raster_size_y,
      nodes,
      top_nodes,
      top_node_count_x,
      top_node_count_y,
      top_node_size,
      leaf_node_world_size_x,
      leaf_node_world_size_y,
      lod_level_node_diag_sizes,
    })
  }

  #[inline]
  pub fn config(&self) -> &QuadTreeConfig {
    &self.config
  }

  #[inline]
  pub fn map_dims(&self) -> &MapDimensions {
    &self.config.map_dims
  }

  #[inline]
  pub fn lod_level_count(&self) -> usize {
    self.config.lod_level_count
  }

  #[inline]
  pub fn raster_size_x(&self) -> usize {
    self.raster_size_x
  }

  #[inline]
  pub fn raster_size_y(&self) -> usize {
    self.raster_size_y
  }

  #[inline]
  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  /// All nodes in pre-order: every node precedes its children.
  #[inline]
  pub fn nodes(&self) -> &[Node] {
    &self.nodes
  }

  #[inline]
  pub fn node(&self, index: NodeIndex) -> &Node {
    &self.nodes[index as usize]
  }

  /// Top-level node indices, row-major over the top grid.
  #[inline]
  pub fn top_nodes(&self) -> &[NodeIndex] {
    &self.top_nodes
  }

  #[inline]
  pub fn top_node_count_x(&self) -> usize {
    self.top_node_count_x
  }

  #[inline]
  pub fn top_node_count_y(&self) -> usize {
    self.top_node_count_y
  }

  /// Raster edge length of a top-level node.
  #[inline]
  pub fn top_node_size(&self) -> usize {
    self.top_node_size
  }

  /// World-space X extent of a leaf node footprint.
  #[inline]
  pub fn leaf_node_world_size_x(&self) -> f32 {
    self.leaf_node_world_size_x
  }

  /// World-space Y extent of a leaf node footprint.
  #[inline]
  pub fn leaf_node_world_size_y(&self) -> f32 {
    self.leaf_node_world_size_y
  }

  /// World-space ground-plane diagonal of a node at `lod_level`, where level
  /// 0 is the leaf level. Doubles with every coarser level.
  #[inline]
  pub fn node_diagonal_size(&self, lod_level: usize) -> f32 {
    debug_assert!(lod_level < self.config.lod_level_count);
    self.lod_level_node_diag_sizes[lod_level]
  }

  /// World-space bounding box of a node.
  ///
  /// Raster coordinate `i` maps to world `min + i / (raster_size - 1) * size`
  /// so that the last sample row lands exactly on the map edge. Nodes whose
  /// footprint sticks out past the raster keep the unclamped mapping and
  /// overhang the map; their height range still only covers real samples.
  pub fn node_world_aabb(&self, index: NodeIndex) -> Aabb {
    let node = &self.nodes[index as usize];
    let dims = &self.config.map_dims;
    let scale_x = dims.size_x / (self.raster_size_x - 1) as f32;
    let scale_y = dims.size_y / (self.raster_size_y - 1) as f32;
    let min = Vec3::new(
      dims.min_x + node.x as f32 * scale_x,
      dims.min_y + node.y as f32 * scale_y,
      dims.world_z(node.min_z),
    );
    let max = Vec3::new(
      dims.min_x + (node.x as u32 + node.size as u32) as f32 * scale_x,
      dims.min_y + (node.y as u32 + node.size as u32) as f32 * scale_y,
      dims.world_z(node.max_z),
    );
    Aabb::new(min, max)
  }
}

/// Build the subtree rooted at `(x, y)` with the given raster edge length,
/// returning its arena index. The node slot is pushed before recursing so the
/// arena stays in pre-order.
fn build_node<H: HeightmapSource + ?Sized>(
  nodes: &mut Vec<Node>,
  heightmap: &H,
  config: &QuadTreeConfig,
  x: usize,
  y: usize,
  size: usize,
  level: usize,
) -> NodeIndex {
  debug_assert!(x <= u16::MAX as usize && y <= u16::MAX as usize);
  debug_assert!(size <= u16::MAX as usize, "node size must fit raster coordinates");
  debug_assert!(level < config.lod_level_count);

  let index = nodes.len() as NodeIndex;
  nodes.push(Node {
    x: x as u16,
    y: y as u16,
    size: size as u16,
    level: level as u8,
    min_z: 0,
    max_z: 0,
    kind: NodeKind::Leaf {
      corner_heights: [0.0; 4],
    },
  });

  let raster_size_x = heightmap.size_x();
  let raster_size_y = heightmap.size_y();

  if size == config.leaf_node_size as usize {
    // The min/max window includes the far row and column shared with the
    // neighboring leaves, clamped at the raster edge.
    let limit_x = raster_size_x.min(x + size + 1);
    let limit_y = raster_size_y.min(y + size + 1);
    let (min_z, max_z) = heightmap.area_min_max(x, y, limit_x - x, limit_y - y);

    let far_x = (x + size).min(raster_size_x - 1);
    let far_y = (y + size).min(raster_size_y - 1);
    let dims = &config.map_dims;
    let corner_heights = [
      dims.world_z(heightmap.height_at(x, y)),
      dims.world_z(heightmap.height_at(far_x, y)),
      dims.world_z(heightmap.height_at(x, far_y)),
      dims.world_z(heightmap.height_at(far_x, far_y)),
    ];

    let node = &mut nodes[index as usize];
    node.min_z = min_z;
    node.max_z = max_z;
    node.kind = NodeKind::Leaf { corner_heights };
  } else {
    let sub_size = size / 2;
    let mut children = [None; 4];

    // The top-left child always exists; the other quadrants only when their
    // origin still falls inside the raster.
    let tl = build_node(nodes, heightmap, config, x, y, sub_size, level + 1);
    let mut min_z = nodes[tl as usize].min_z;
    let mut max_z = nodes[tl as usize].max_z;
    children[0] = Some(tl);

    if x + sub_size < raster_size_x {
      let tr = build_node(nodes, heightmap, config, x + sub_size, y, sub_size, level + 1);
      min_z = min_z.min(nodes[tr as usize].min_z);
      max_z = max_z.max(nodes[tr as usize].max_z);
      children[1] = Some(tr);
    }
    if y + sub_size < raster_size_y {
      let bl = build_node(nodes, heightmap, config, x, y + sub_size, sub_size, level + 1);
      min_z = min_z.min(nodes[bl as usize].min_z);
      max_z = max_z.max(nodes[bl as usize].max_z);
      children[2] = Some(bl);
    }
    if x + sub_size < raster_size_x && y + sub_size < raster_size_y {
      let br = build_node(
        nodes,
        heightmap,
        config,
        x + sub_size,
        y + sub_size,
        sub_size,
        level + 1,
      );
      min_z = min_z.min(nodes[br as usize].min_z);
      max_z = max_z.max(nodes[br as usize].max_z);
      children[3] = Some(br);
    }

    let node = &mut nodes[index as usize];
    node.min_z = min_z;
    node.max_z = max_z;
    node.kind = NodeKind::Branch { children };
  }

  index
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
