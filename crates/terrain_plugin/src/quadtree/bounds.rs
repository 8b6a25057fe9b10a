//! Axis-aligned bounding box used for culling, range and ray tests.

use glam::{Vec3, Vec4};

/// Result of testing a box against a set of bounding planes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Containment {
	/// Entirely behind at least one plane.
	Outside,
	/// Straddles at least one plane.
	Intersecting,
	/// In front of all planes.
	Inside,
}

/// Single-precision axis-aligned bounding box.
///
/// X/Y span the ground plane, Z is height, matching the raster-to-world
/// mapping of [`MapDimensions`](super::MapDimensions).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
	/// Minimum corner (inclusive).
	pub min: Vec3,
	/// Maximum corner (inclusive).
	pub max: Vec3,
}

impl Aabb {
	/// Create a new AABB from min and max corners.
	///
	/// # Panics
	/// Debug-asserts that min <= max on all axes.
	pub fn new(min: Vec3, max: Vec3) -> Self {
		debug_assert!(
			min.x <= max.x && min.y <= max.y && min.z <= max.z,
			"AABB min must be <= max on all axes"
		);
		Self { min, max }
	}

	/// Get the center of the AABB.
	#[inline]
	pub fn center(&self) -> Vec3 {
		(self.min + self.max) * 0.5
	}

	/// Get the size of the AABB (max - min).
	#[inline]
	pub fn size(&self) -> Vec3 {
		self.max - self.min
	}

	/// The 8 corner points, bottom face first.
	pub fn corners(&self) -> [Vec3; 8] {
		[
			Vec3::new(self.min.x, self.min.y, self.min.z),
			Vec3::new(self.min.x, self.max.y, self.min.z),
			Vec3::new(self.max.x, self.min.y, self.min.z),
			Vec3::new(self.max.x, self.max.y, self.min.z),
			Vec3::new(self.min.x, self.min.y, self.max.z),
			Vec3::new(self.min.x, self.max.y, self.max.z),
			Vec3::new(self.max.x, self.min.y, self.max.z),
			Vec3::new(self.max.x, self.max.y, self.max.z),
		]
	}

	/// Squared distance from `point` to the nearest point of the box.
	/// Zero when the point is inside.
	pub fn min_distance_sq(&self, point: Vec3) -> f32 {
		let mut dist = 0.0;

		for axis in 0..3 {
			let v = point[axis];
			if v < self.min[axis] {
				let d = v - self.min[axis];
				dist += d * d;
			} else if v > self.max[axis] {
				let d = v - self.max[axis];
				dist += d * d;
			}
		}

		dist
	}

	/// Squared distance from `point` to the farthest corner of the box.
	pub fn max_distance_sq(&self, point: Vec3) -> f32 {
		let mut dist = 0.0;

		for axis in 0..3 {
			let k = (point[axis] - self.min[axis])
				.abs()
				.max((point[axis] - self.max[axis]).abs());
			dist += k * k;
		}

		dist
	}

	/// Whether the box touches the sphere of squared radius `radius_sq`
	/// centered at `center`.
	#[inline]
	pub fn intersects_sphere_sq(&self, center: Vec3, radius_sq: f32) -> bool {
		self.min_distance_sq(center) <= radius_sq
	}

	/// Classify the box against 6 inward-facing planes (`dot(plane, (p, 1)) >= 0`
	/// means in front).
	///
	/// Tests the 8 corners plus the center with a small size-relative
	/// tolerance, after a cheap bounding-sphere rejection pass.
	pub fn test_planes(&self, planes: &[Vec4; 6]) -> Containment {
		let center = self.center();
		let mut size = self.size().length();

		// Bounding-sphere pass removes most fully-outside boxes early.
		for plane in planes {
			let center_dist = plane.dot(center.extend(1.0));
			if center_dist < -size / 2.0 {
				return Containment::Outside;
			}
		}

		let mut points = [Vec3::ZERO; 9];
		points[..8].copy_from_slice(&self.corners());
		points[8] = center;

		// Tolerance: points must be clearly behind a plane to count as out.
		size /= 6.0;

		let mut total_in = 0;
		for plane in planes {
			let mut in_count = 9;
			let mut all_in = true;

			for point in &points {
				let distance = plane.dot(point.extend(1.0));
				if distance < -size {
					all_in = false;
					in_count -= 1;
				}
			}

			// Every point behind this one plane: fully out.
			if in_count == 0 {
				return Containment::Outside;
			}

			if all_in {
				total_in += 1;
			}
		}

		if total_in == 6 {
			Containment::Inside
		} else {
			Containment::Intersecting
		}
	}

	/// Slab test. Returns the distance along the ray to the box entry point,
	/// which is negative when the origin is inside or past the box; `None`
	/// when the line misses entirely.
	pub fn intersect_ray(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
		const EPSILON: f32 = 1e-5;

		let mut tmin = f32::MIN;
		let mut tmax = f32::MAX;

		for axis in 0..3 {
			if direction[axis].abs() < EPSILON {
				// Parallel to the slab
				if origin[axis] < self.min[axis] || origin[axis] > self.max[axis] {
					return None;
				}
			} else {
				let ood = 1.0 / direction[axis];
				let mut t1 = (self.min[axis] - origin[axis]) * ood;
				let mut t2 = (self.max[axis] - origin[axis]) * ood;

				if t1 > t2 {
					std::mem::swap(&mut t1, &mut t2);
				}

				tmin = tmin.max(t1);
				tmax = tmax.min(t2);

				if tmin > tmax {
					return None;
				}
			}
		}

		Some(tmin)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn unit_box() -> Aabb {
		Aabb::new(Vec3::ZERO, Vec3::splat(10.0))
	}

	/// Planes that reject nothing.
	fn open_planes() -> [Vec4; 6] {
		[Vec4::W; 6]
	}

	#[test]
	fn test_new() {
		let aabb = Aabb::new(Vec3::new(-1.0, -2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
		assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -3.0));
		assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
		assert_eq!(aabb.center(), Vec3::ZERO);
		assert_eq!(aabb.size(), Vec3::new(2.0, 4.0, 6.0));
	}

	#[test]
	fn test_corners_cover_extremes() {
		let aabb = unit_box();
		let corners = aabb.corners();
		assert_eq!(corners.len(), 8);
		for corner in corners {
			for axis in 0..3 {
				assert!(corner[axis] == 0.0 || corner[axis] == 10.0);
			}
		}
		assert!(corners.contains(&Vec3::ZERO));
		assert!(corners.contains(&Vec3::splat(10.0)));
	}

	#[test]
	fn test_min_distance_sq() {
		let aabb = unit_box();

		// Inside
		assert_eq!(aabb.min_distance_sq(Vec3::splat(5.0)), 0.0);
		// On the boundary
		assert_eq!(aabb.min_distance_sq(Vec3::ZERO), 0.0);
		// Offset on one axis
		assert_eq!(aabb.min_distance_sq(Vec3::new(13.0, 5.0, 5.0)), 9.0);
		// Offset on all axes
		assert_eq!(aabb.min_distance_sq(Vec3::new(-1.0, 11.0, -2.0)), 6.0);
	}

	#[test]
	fn test_max_distance_sq() {
		let aabb = unit_box();

		// From a corner, the farthest point is the opposite corner
		assert_eq!(aabb.max_distance_sq(Vec3::ZERO), 300.0);
		// From the center
		assert_eq!(aabb.max_distance_sq(Vec3::splat(5.0)), 75.0);
	}

	#[test]
	fn test_intersects_sphere_sq() {
		let aabb = unit_box();
		let center = Vec3::new(13.0, 5.0, 5.0);

		assert!(aabb.intersects_sphere_sq(center, 16.0));
		assert!(aabb.intersects_sphere_sq(center, 9.0), "touching counts");
		assert!(!aabb.intersects_sphere_sq(center, 8.9));
	}

	#[test]
	fn test_planes_inside() {
		let aabb = unit_box();
		assert_eq!(aabb.test_planes(&open_planes()), Containment::Inside);

		// Half-space x >= -1 keeps the whole box in front
		let mut planes = open_planes();
		planes[0] = Vec4::new(1.0, 0.0, 0.0, 1.0);
		assert_eq!(aabb.test_planes(&planes), Containment::Inside);
	}

	#[test]
	fn test_planes_outside() {
		let aabb = unit_box();

		// Half-space x >= 100
		let mut planes = open_planes();
		planes[3] = Vec4::new(1.0, 0.0, 0.0, -100.0);
		assert_eq!(aabb.test_planes(&planes), Containment::Outside);
	}

	#[test]
	fn test_planes_intersecting() {
		// Wide box straddling the plane x >= 0
		let aabb = Aabb::new(Vec3::new(-10.0, -1.0, -1.0), Vec3::new(10.0, 1.0, 1.0));
		let mut planes = open_planes();
		planes[2] = Vec4::new(1.0, 0.0, 0.0, 0.0);
		assert_eq!(aabb.test_planes(&planes), Containment::Intersecting);
	}

	#[test]
	fn test_intersect_ray_hit() {
		let aabb = unit_box();
		let dist = aabb
			.intersect_ray(Vec3::new(5.0, 5.0, 20.0), Vec3::new(0.0, 0.0, -1.0))
			.expect("straight-down ray must hit");
		assert!((dist - 10.0).abs() < 1e-4, "entry at the top face, got {}", dist);
	}

	#[test]
	fn test_intersect_ray_miss() {
		let aabb = unit_box();
		assert_eq!(
			aabb.intersect_ray(Vec3::new(20.0, 5.0, 20.0), Vec3::new(0.0, 0.0, -1.0)),
			None
		);
	}

	#[test]
	fn test_intersect_ray_origin_inside() {
		let aabb = unit_box();
		let dist = aabb
			.intersect_ray(Vec3::splat(5.0), Vec3::new(1.0, 0.0, 0.0))
			.expect("ray from inside still reports the entry slab");
		assert!(dist < 0.0, "entry distance behind the origin, got {}", dist);
	}

	#[test]
	fn test_intersect_ray_parallel_outside() {
		let aabb = unit_box();
		assert_eq!(
			aabb.intersect_ray(Vec3::new(5.0, 5.0, 11.0), Vec3::new(1.0, 0.0, 0.0)),
			None
		);
	}
}
