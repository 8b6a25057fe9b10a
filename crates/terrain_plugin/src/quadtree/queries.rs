//! Area and ray queries against a built tree.
//!
//! Both walk the node hierarchy instead of the raw raster: the area query
//! stops at the coarsest nodes inside the region, the ray query descends to
//! leaves and intersects the two triangles spanned by each leaf's corner
//! heights. Results therefore match the node granularity, not individual
//! raster cells.

use glam::Vec3;

use super::node::{NodeIndex, NodeKind};
use super::tree::QuadTree;

const TRIANGLE_EPSILON: f32 = 1e-6;

impl QuadTree {
  /// Minimum and maximum terrain height over a world-space rectangle.
  ///
  /// The rectangle is clamped to the map. Nodes only partially inside it
  /// still contribute their whole height range once the walk reaches a
  /// leaf, so the result is conservative by up to one leaf footprint at the
  /// borders.
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, name = "quadtree::area_min_max_height")
  )]
  pub fn area_min_max_height(
    &self,
    from_x: f32,
    from_y: f32,
    size_x: f32,
    size_y: f32,
  ) -> (f32, f32) {
    let dims = *self.map_dims();
    let raster_size_x = self.raster_size_x();
    let raster_size_y = self.raster_size_y();

    let bfx = (from_x - dims.min_x) / dims.size_x;
    let bfy = (from_y - dims.min_y) / dims.size_y;
    let btx = (from_x + size_x - dims.min_x) / dims.size_x;
    let bty = (from_y + size_y - dims.min_y) / dims.size_y;

    let raster_from_x =
      ((bfx * raster_size_x as f32) as i32).clamp(0, raster_size_x as i32 - 1) as usize;
    let raster_from_y =
      ((bfy * raster_size_y as f32) as i32).clamp(0, raster_size_y as i32 - 1) as usize;
    let raster_to_x =
      ((btx * raster_size_x as f32) as i32).clamp(0, raster_size_x as i32 - 1) as usize;
    let raster_to_y =
      ((bty * raster_size_y as f32) as i32).clamp(0, raster_size_y as i32 - 1) as usize;

    let mut min_z = f32::MAX;
    let mut max_z = f32::MIN;

    let base_from_x = raster_from_x / self.top_node_size();
    let base_from_y = raster_from_y / self.top_node_size();
    let base_to_x = raster_to_x / self.top_node_size();
    let base_to_y = raster_to_y / self.top_node_size();
    for base_y in base_from_y..=base_to_y {
      for base_x in base_from_x..=base_to_x {
        let top_node = self.top_nodes()[base_y * self.top_node_count_x() + base_x];
        area_min_max_walk(
          self,
          top_node,
          raster_from_x,
          raster_from_y,
          raster_to_x,
          raster_to_y,
          &mut min_z,
          &mut max_z,
        );
      }
    }
    (min_z, max_z)
  }

  /// Nearest intersection of a ray with the terrain within `max_distance`.
  ///
  /// Each leaf footprint is intersected as the two triangles over its
  /// corner heights, which matches the most detailed render tessellation
  /// rather than the raw raster. `direction` must be normalized so the
  /// returned point sits `distance` units along the ray.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "quadtree::intersect_ray"))]
  pub fn intersect_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
    debug_assert!(direction.is_normalized());

    let mut nearest: Option<f32> = None;
    for &top_node in self.top_nodes() {
      if let Some(dist) = intersect_ray_walk(self, top_node, origin, direction, max_distance) {
        if nearest.map_or(true, |n| dist < n) {
          nearest = Some(dist);
        }
      }
    }
    nearest.map(|dist| origin + direction * dist)
  }
}

fn area_min_max_walk(
  tree: &QuadTree,
  index: NodeIndex,
  from_x: usize,
  from_y: usize,
  to_x: usize,
  to_y: usize,
  min_z: &mut f32,
  max_z: &mut f32,
) {
  let node = tree.node(index);
  let x = node.x as usize;
  let y = node.y as usize;
  let size = node.size as usize;

  if to_x < x || to_y < y || from_x > x + size || from_y > y + size {
    return;
  }

  let fully_covered = from_x <= x && from_y <= y && to_x >= x + size && to_y >= y + size;
  if node.is_leaf() || fully_covered {
    let dims = tree.map_dims();
    *min_z = min_z.min(dims.world_z(node.min_z));
    *max_z = max_z.max(dims.world_z(node.max_z));
    return;
  }

  for child in node.present_children() {
    area_min_max_walk(tree, child, from_x, from_y, to_x, to_y, min_z, max_z);
  }
}

fn intersect_ray_walk(
  tree: &QuadTree,
  index: NodeIndex,
  origin: Vec3,
  direction: Vec3,
  max_distance: f32,
) -> Option<f32> {
  let node = tree.node(index);
  let aabb = tree.node_world_aabb(index);

  let entry = aabb.intersect_ray(origin, direction)?;
  if entry > max_distance {
    return None;
  }

  match node.kind {
    NodeKind::Leaf { corner_heights } => {
      let tl = Vec3::new(aabb.min.x, aabb.min.y, corner_heights[0]);
      let tr = Vec3::new(aabb.max.x, aabb.min.y, corner_heights[1]);
      let bl = Vec3::new(aabb.min.x, aabb.max.y, corner_heights[2]);
      let br = Vec3::new(aabb.max.x, aabb.max.y, corner_heights[3]);

      let mut nearest: Option<f32> = None;
      for [a, b, c] in [[tl, tr, bl], [tr, bl, br]] {
        if let Some(dist) = intersect_triangle(origin, direction, a, b, c) {
          if dist <= max_distance && nearest.map_or(true, |n| dist < n) {
            nearest = Some(dist);
          }
        }
      }
      nearest
    }
    NodeKind::Branch { .. } => {
      let mut nearest: Option<f32> = None;
      for child in node.present_children() {
        if let Some(dist) = intersect_ray_walk(tree, child, origin, direction, max_distance) {
          if nearest.map_or(true, |n| dist < n) {
            nearest = Some(dist);
          }
        }
      }
      nearest
    }
  }
}

/// Two-sided Moller-Trumbore ray/triangle intersection. Returns the distance
/// along the ray, or None for parallel rays, misses and hits behind the
/// origin.
fn intersect_triangle(origin: Vec3, direction: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
  let edge1 = b - a;
  let edge2 = c - a;
  let pvec = direction.cross(edge2);
  let det = edge1.dot(pvec);

  if det.abs() < TRIANGLE_EPSILON {
    return None;
  }
  let inv_det = 1.0 / det;

  let tvec = origin - a;
  let u = tvec.dot(pvec) * inv_det;
  if !(0.0..=1.0).contains(&u) {
    return None;
  }

  let qvec = tvec.cross(edge1);
  let v = direction.dot(qvec) * inv_det;
  if v < 0.0 || u + v > 1.0 {
    return None;
  }

  let t = edge2.dot(qvec) * inv_det;
  (t >= 0.0).then_some(t)
}

#[cfg(test)]
#[path = "queries_test.rs"]
mod queries_test;
