//! Heightmap source abstraction consumed by quadtree construction.
//!
//! Heights are quantized to 16 bits: raw sample 0 maps to the bottom of the
//! world-space height range and 65535 to the top (see
//! [`MapDimensions::world_z`](crate::quadtree::MapDimensions::world_z)).
//! The quadtree only reads the source during construction; afterwards all
//! queries run against data cached in the tree.

/// Raster heightmap sampled during quadtree construction.
///
/// Implementations provide single-sample access plus a min/max reduction over
/// a sub-rectangle. The reduction is called once per leaf node, so sources
/// backed by mip chains or tiled storage can answer it faster than a plain
/// per-sample loop.
pub trait HeightmapSource: Send + Sync {
  /// Raster width in samples.
  fn size_x(&self) -> usize;

  /// Raster height in samples.
  fn size_y(&self) -> usize;

  /// Quantized height sample at `(x, y)`. Coordinates must lie within the
  /// raster.
  fn height_at(&self, x: usize, y: usize) -> u16;

  /// Min/max over the `size_x * size_y` window with top-left corner at
  /// `(x, y)`. The window must lie within the raster.
  fn area_min_max(&self, x: usize, y: usize, size_x: usize, size_y: usize) -> (u16, u16);
}

impl HeightmapSource for Box<dyn HeightmapSource> {
  fn size_x(&self) -> usize {
    (**self).size_x()
  }

  fn size_y(&self) -> usize {
    (**self).size_y()
  }

  fn height_at(&self, x: usize, y: usize) -> u16 {
    (**self).height_at(x, y)
  }

  fn area_min_max(&self, x: usize, y: usize, size_x: usize, size_y: usize) -> (u16, u16) {
    (**self).area_min_max(x, y, size_x, size_y)
  }
}

/// Row-major in-memory heightmap.
///
/// The straightforward source for hosts that load raster data themselves;
/// also used by tests and benches.
#[derive(Clone, Debug)]
pub struct RasterHeightmap {
  size_x: usize,
  size_y: usize,
  data: Vec<u16>,
}

impl RasterHeightmap {
  /// Wrap row-major sample data.
  ///
  /// # Panics
  /// Panics if `data.len() != size_x * size_y`.
  pub fn new(size_x: usize, size_y: usize, data: Vec<u16>) -> Self {
    assert_eq!(
      data.len(),
      size_x * size_y,
      "heightmap data length must match raster dimensions"
    );
    Self {
      size_x,
      size_y,
      data,
    }
  }

  /// Constant-height raster.
  pub fn flat(size_x: usize, size_y: usize, height: u16) -> Self {
    Self {
      size_x,
      size_y,
      data: vec![height; size_x * size_y],
    }
  }
}

impl HeightmapSource for RasterHeightmap {
  fn size_x(&self) -> usize {
    self.size_x
  }

  fn size_y(&self) -> usize {
    self.size_y
  }

  fn height_at(&self, x: usize, y: usize) -> u16 {
    debug_assert!(x < self.size_x && y < self.size_y, "sample out of raster");
    self.data[y * self.size_x + x]
  }

  fn area_min_max(&self, x: usize, y: usize, size_x: usize, size_y: usize) -> (u16, u16) {
    debug_assert!(size_x > 0 && size_y > 0, "empty min/max window");
    debug_assert!(x + size_x <= self.size_x && y + size_y <= self.size_y);

    let mut min = u16::MAX;
    let mut max = u16::MIN;
    for row in y..y + size_y {
      let base = row * self.size_x;
      for sample in &self.data[base + x..base + x + size_x] {
        min = min.min(*sample);
        max = max.max(*sample);
      }
    }
    (min, max)
  }
}
