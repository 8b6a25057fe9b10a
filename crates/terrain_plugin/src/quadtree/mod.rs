//! Quadtree for continuous distance-dependent terrain LOD.
//!
//! A heightmap raster is tiled by square nodes at every LOD level; the tree
//! is built once and then queried per frame. Selection walks top nodes down,
//! keeping a node when the observer sits inside its level's distance band,
//! and descending where the next band (and the frustum) allow. Selected
//! nodes carry per-quadrant flags so the result tiles the visible terrain
//! exactly once across mixed levels.
//!
//! # Level Conventions
//!
//! Tree levels count down from the top: level 0 is the coarsest, leaves sit
//! at `lod_level_count - 1`. Selection LOD levels run the other way: 0 is
//! the most detailed selected level. Node footprints double per level:
//!
//! ```text
//! node size = leaf_node_size * 2^(lod_level_count - 1 - tree_level)
//! ```
//!
//! # Module Structure
//!
//! - [`config`]: `QuadTreeConfig`, `MapDimensions` - construction parameters
//!   and raster-to-world mapping
//! - [`bounds`]: `Aabb` - world-space boxes, plane and sphere tests
//! - [`frustum`]: `Frustum` - culling planes extracted from a camera matrix
//! - [`node`]: `Node` - arena-indexed tree nodes
//! - [`tree`]: `QuadTree` - construction over a [`crate::heightmap`] source
//! - [`selection`]: `LodSelection` - the per-frame render set
//! - `queries`: area min/max height and ray intersection on `QuadTree`

pub mod bounds;
pub mod config;
pub mod frustum;
pub mod node;
mod queries;
pub mod selection;
pub mod tree;

// Re-exports
pub use bounds::{Aabb, Containment};
pub use config::{
  CreateError, CreateResult, MapDimensions, QuadTreeConfig, MAX_LOD_LEVELS, MAX_RASTER_SIZE,
};
pub use frustum::Frustum;
pub use node::{Node, NodeIndex, NodeKind};
pub use selection::{
  LodSelection, SelectedNode, SelectionParams, DEFAULT_MAX_SELECTION_COUNT,
  DEFAULT_MORPH_START_RATIO,
};
pub use tree::QuadTree;
