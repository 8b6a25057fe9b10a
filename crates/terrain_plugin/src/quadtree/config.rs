//! QuadTreeConfig - construction parameters and world coordinate mapping.

use thiserror::Error;

/// Maximum quadtree depth. Visibility range and morph tables are fixed-size
/// arrays of this length.
pub const MAX_LOD_LEVELS: usize = 16;

/// Raster coordinates are stored in 16 bits, which caps the heightmap size.
pub const MAX_RASTER_SIZE: usize = 65535;

/// World-space box covered by the heightmap raster.
///
/// X/Y span the ground plane, Z is height. Quantized 16-bit height samples
/// map linearly onto `[min_z, min_z + size_z]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapDimensions {
  pub min_x: f32,
  pub min_y: f32,
  pub min_z: f32,
  pub size_x: f32,
  pub size_y: f32,
  pub size_z: f32,
}

impl MapDimensions {
  #[inline]
  pub fn max_x(&self) -> f32 {
    self.min_x + self.size_x
  }

  #[inline]
  pub fn max_y(&self) -> f32 {
    self.min_y + self.size_y
  }

  #[inline]
  pub fn max_z(&self) -> f32 {
    self.min_z + self.size_z
  }

  /// Convert a quantized height sample to world space.
  #[inline]
  pub fn world_z(&self, height: u16) -> f32 {
    self.min_z + height as f32 * self.size_z / 65535.0
  }
}

/// Error returned when construction parameters cannot produce a valid tree.
///
/// Validation runs before any allocation, so a failed create leaves nothing
/// behind.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CreateError {
  #[error("heightmap raster {size_x}x{size_y} needs at least 2 samples per axis")]
  RasterTooSmall { size_x: usize, size_y: usize },
  #[error("heightmap raster {size_x}x{size_y} exceeds {} samples per axis", MAX_RASTER_SIZE)]
  RasterTooLarge { size_x: usize, size_y: usize },
  #[error("lod level count {0} is outside 1..={}", MAX_LOD_LEVELS)]
  InvalidLodLevelCount(usize),
  #[error("leaf node size {0} is not a power of two of at least 2")]
  InvalidLeafNodeSize(u16),
  #[error("top node size {0} exceeds {} raster units", MAX_RASTER_SIZE)]
  TopNodeTooLarge(usize),
}

pub type CreateResult<T> = Result<T, CreateError>;

/// Configuration for quadtree construction.
#[derive(Clone, Copy, Debug)]
pub struct QuadTreeConfig {
  /// Edge length, in raster units, of the most detailed (leaf) node.
  /// Must be a power of two, at least 2.
  pub leaf_node_size: u16,

  /// Tree depth. Level 0 is the coarsest (top) level, `lod_level_count - 1`
  /// the leaf level.
  pub lod_level_count: usize,

  /// World-space box the raster maps onto.
  pub map_dims: MapDimensions,
}

impl QuadTreeConfig {
  /// Raster edge length of a top-level node.
  #[inline]
  pub fn top_node_size(&self) -> usize {
    (self.leaf_node_size as usize) << (self.lod_level_count - 1)
  }

  /// Check the configuration against a heightmap of the given raster size.
  pub fn validate(&self, raster_size_x: usize, raster_size_y: usize) -> CreateResult<()> {
    if raster_size_x < 2 || raster_size_y < 2 {
      return Err(CreateError::RasterTooSmall {
        size_x: raster_size_x,
        size_y: raster_size_y,
      });
    }
    if raster_size_x > MAX_RASTER_SIZE || raster_size_y > MAX_RASTER_SIZE {
      return Err(CreateError::RasterTooLarge {
        size_x: raster_size_x,
        size_y: raster_size_y,
      });
    }
    if self.lod_level_count == 0 || self.lod_level_count > MAX_LOD_LEVELS {
      return Err(CreateError::InvalidLodLevelCount(self.lod_level_count));
    }
    if self.leaf_node_size < 2 || !self.leaf_node_size.is_power_of_two() {
      return Err(CreateError::InvalidLeafNodeSize(self.leaf_node_size));
    }
    // Node sizes are stored in 16 bits too, which bounds leaf size and level
    // count jointly.
    if self.top_node_size() > MAX_RASTER_SIZE {
      return Err(CreateError::TopNodeTooLarge(self.top_node_size()));
    }
    Ok(())
  }
}

impl Default for QuadTreeConfig {
  fn default() -> Self {
    Self {
      leaf_node_size: 8,
      lod_level_count: 7,
      map_dims: MapDimensions {
        min_x: 0.0,
        min_y: 0.0,
        min_z: 0.0,
        size_x: 1.0,
        size_y: 1.0,
        size_z: 1.0,
      },
    }
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
