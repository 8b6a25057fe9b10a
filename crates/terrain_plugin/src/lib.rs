//! terrain_plugin - Framework/engine independent heightmap terrain LOD
//!
//! This crate implements continuous distance-dependent level of detail for
//! heightmap terrain. A quadtree is built once over a 16-bit height raster;
//! every frame a cheap tree walk picks the set of nodes to render for the
//! current observer, with per-quadrant flags and morph constants so mixed
//! detail levels tile the terrain without cracks or popping.
//!
//! # Features
//!
//! - **Quadtree construction**: pre-order node arena over any
//!   [`HeightmapSource`], with per-node height ranges for tight bounds
//! - **LOD selection**: distance-band driven walk with frustum culling,
//!   reusable selection buffers and front-to-back sorting
//! - **Morph constants**: per-level vertex shader constants for smooth
//!   transitions between detail levels
//! - **Terrain queries**: area min/max height and ray intersection against
//!   the leaf triangulation
//!
//! # Example
//!
//! ```ignore
//! use glam::Vec3;
//! use terrain_plugin::{
//!     Frustum, LodSelection, MapDimensions, QuadTree, QuadTreeConfig, RasterHeightmap,
//!     SelectionParams,
//! };
//!
//! let heightmap = RasterHeightmap::new(1024, 1024, samples);
//! let config = QuadTreeConfig {
//!     leaf_node_size: 8,
//!     lod_level_count: 7,
//!     map_dims: MapDimensions {
//!         min_x: 0.0, min_y: 0.0, min_z: 0.0,
//!         size_x: 4096.0, size_y: 4096.0, size_z: 800.0,
//!     },
//! };
//! let tree = QuadTree::create(config, &heightmap)?;
//!
//! // every frame
//! let frustum = Frustum::from_view_projection(view_proj);
//! let params = SelectionParams::new(camera_pos, frustum, 2000.0, 2.0);
//! let mut selection = LodSelection::new();
//! tree.lod_select(&params, &mut selection);
//!
//! for node in selection.selection() {
//!     // render node at node.lod_level, skipping quadrants with cleared flags
//! }
//! ```

// Heightmap input abstraction
pub mod heightmap;
pub use heightmap::{HeightmapSource, RasterHeightmap};

// Quadtree, LOD selection and terrain queries
pub mod quadtree;
pub use quadtree::{
  CreateError, CreateResult, Frustum, LodSelection, MapDimensions, QuadTree, QuadTreeConfig,
  SelectedNode, SelectionParams,
};
