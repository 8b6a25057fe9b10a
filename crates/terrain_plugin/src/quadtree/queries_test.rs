use super::*;

use crate::heightmap::RasterHeightmap;
use crate::quadtree::config::{MapDimensions, QuadTreeConfig};

/// 9x9 raster over an 8x8 world box: one raster step is one world unit, and
/// size_z of 65535 makes raw heights equal world heights.
fn build(heightmap: RasterHeightmap) -> QuadTree {
  let config = QuadTreeConfig {
    leaf_node_size: 2,
    lod_level_count: 2,
    map_dims: MapDimensions {
      min_x: 0.0,
      min_y: 0.0,
      min_z: 0.0,
      size_x: 8.0,
      size_y: 8.0,
      size_z: 65535.0,
    },
  };
  QuadTree::create(config, &heightmap).unwrap()
}

/// Height ramp along x: raw height 100 per raster step.
fn ramp_tree() -> QuadTree {
  let data = (0..81).map(|i| ((i % 9) * 100) as u16).collect();
  build(RasterHeightmap::new(9, 9, data))
}

#[test]
fn test_area_query_full_map() {
  let tree = ramp_tree();
  assert_eq!(tree.area_min_max_height(0.0, 0.0, 8.0, 8.0), (0.0, 800.0));

  let flat = build(RasterHeightmap::flat(9, 9, 1000));
  assert_eq!(flat.area_min_max_height(1.0, 1.0, 3.0, 2.0), (1000.0, 1000.0));
}

#[test]
fn test_area_query_is_conservative_to_leaf_granularity() {
  let tree = ramp_tree();

  // [2, 5] also pulls in the leaves touching the region edges
  assert_eq!(tree.area_min_max_height(2.0, 0.0, 3.0, 8.0), (0.0, 600.0));
  assert_eq!(tree.area_min_max_height(0.0, 0.0, 1.8, 8.0), (0.0, 400.0));
  // the from edge only reaches back to the start of its own top cell, so the
  // leaf at raster x 2 stays out of this one
  assert_eq!(tree.area_min_max_height(4.0, 0.0, 3.9, 8.0), (400.0, 800.0));
}

#[test]
fn test_area_query_clamps_outside_regions() {
  let tree = ramp_tree();

  // entirely below the map minimum clamps to the first leaf column
  assert_eq!(tree.area_min_max_height(-100.0, -100.0, 50.0, 50.0), (0.0, 200.0));
  // entirely past the maximum clamps to the far corner sample
  assert_eq!(tree.area_min_max_height(100.0, 100.0, 5.0, 5.0), (800.0, 800.0));
}

#[test]
fn test_ray_straight_down_hits_surface() {
  let tree = build(RasterHeightmap::flat(9, 9, 1000));
  let hit = tree.intersect_ray(Vec3::new(3.0, 3.0, 2000.0), Vec3::NEG_Z, 1e6);
  assert_eq!(hit, Some(Vec3::new(3.0, 3.0, 1000.0)));

  // intersection is two-sided, a ray from underneath hits as well
  let hit = tree.intersect_ray(Vec3::new(3.0, 3.0, -500.0), Vec3::Z, 1e6);
  assert_eq!(hit, Some(Vec3::new(3.0, 3.0, 1000.0)));
}

#[test]
fn test_ray_miss_returns_none() {
  let tree = build(RasterHeightmap::flat(9, 9, 1000));
  let away = tree.intersect_ray(Vec3::new(3.0, 3.0, 2000.0), Vec3::Z, 1e6);
  assert_eq!(away, None, "pointing away from the surface");

  let above = tree.intersect_ray(Vec3::new(-5.0, 3.0, 5000.0), Vec3::X, 1e6);
  assert_eq!(above, None, "passes above the terrain");
}

#[test]
fn test_ray_respects_max_distance() {
  let tree = build(RasterHeightmap::flat(9, 9, 1000));
  let origin = Vec3::new(3.0, 3.0, 2000.0);
  assert_eq!(tree.intersect_ray(origin, Vec3::NEG_Z, 500.0), None);
  assert!(tree.intersect_ray(origin, Vec3::NEG_Z, 1500.0).is_some());

  // cutoff falling between the box entry and the surface hit
  let ramp = ramp_tree();
  let origin = Vec3::new(3.0, 3.0, 10000.0);
  assert_eq!(ramp.intersect_ray(origin, Vec3::NEG_Z, 9650.0), None);
  assert_eq!(
    ramp.intersect_ray(origin, Vec3::NEG_Z, 9700.0),
    Some(Vec3::new(3.0, 3.0, 300.0))
  );
}

#[test]
fn test_ray_hits_sloped_surface() {
  // surface is the plane z = world x
  let data = (0..81).map(|i| (i % 9) as u16).collect();
  let tree = build(RasterHeightmap::new(9, 9, data));

  let hit = tree.intersect_ray(Vec3::new(-5.0, 3.0, 2.5), Vec3::X, 100.0);
  assert_eq!(hit, Some(Vec3::new(2.5, 3.0, 2.5)), "horizontal ray into the slope");

  let hit = tree.intersect_ray(Vec3::new(3.0, 3.0, 100.0), Vec3::NEG_Z, 1000.0);
  assert_eq!(hit, Some(Vec3::new(3.0, 3.0, 3.0)));
}
