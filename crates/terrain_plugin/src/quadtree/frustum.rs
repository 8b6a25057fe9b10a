//! View frustum for selection culling.

use glam::{Mat4, Vec3, Vec4};

/// Camera frustum: 6 inward-facing planes plus the 8 corner points.
///
/// Planes are normalized and satisfy `dot(plane, (p, 1)) >= 0` for points in
/// the visible volume. Only the planes drive selection culling; the corners
/// are carried for consumers that want the frustum extent (debug overlays,
/// shadow cascades).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
  /// Left, right, bottom, top, near, far.
  pub planes: [Vec4; 6],
  /// Near-plane corners first, then far-plane, each in (-x,-y), (x,-y),
  /// (-x,y), (x,y) order.
  pub corners: [Vec3; 8],
}

impl Frustum {
  /// Extract planes and corners from a combined view-projection matrix.
  ///
  /// Expects a 0..1 clip-space depth range (the `glam` `perspective_rh`
  /// family). Planes come from clip-space row combinations, corners from
  /// unprojecting the clip-space box through the inverse matrix.
  pub fn from_view_projection(view_proj: Mat4) -> Self {
    let r0 = view_proj.row(0);
    let r1 = view_proj.row(1);
    let r2 = view_proj.row(2);
    let r3 = view_proj.row(3);

    let mut planes = [
      r3 + r0, // left:   x >= -w
      r3 - r0, // right:  x <= w
      r3 + r1, // bottom: y >= -w
      r3 - r1, // top:    y <= w
      r2,      // near:   z >= 0
      r3 - r2, // far:    z <= w
    ];
    for plane in &mut planes {
      let len = plane.truncate().length();
      debug_assert!(len > 0.0, "degenerate view-projection matrix");
      *plane /= len;
    }

    let inv = view_proj.inverse();
    let mut corners = [Vec3::ZERO; 8];
    let mut i = 0;
    for &z in &[0.0, 1.0] {
      for &y in &[-1.0, 1.0] {
        for &x in &[-1.0, 1.0] {
          let point = inv * Vec4::new(x, y, z, 1.0);
          corners[i] = point.truncate() / point.w;
          i += 1;
        }
      }
    }

    Self { planes, corners }
  }

  /// A frustum that culls nothing; selection becomes purely
  /// distance-driven. The corner points are degenerate (all zero).
  pub fn unbounded() -> Self {
    Self {
      planes: [Vec4::W; 6],
      corners: [Vec3::ZERO; 8],
    }
  }
}
