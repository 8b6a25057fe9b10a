//! LOD selection - the per-frame walk that picks the set of nodes to render.
//!
//! Visibility distance is split into per-level bands: the band widths follow
//! a geometric series with `lod_distance_ratio`, the most detailed level gets
//! the smallest band. A node is recursed into while the observer is within
//! the next (finer) band of its area; children that fall out of their own
//! band leave the parent's quadrant flag set, so the parent renders that
//! quadrant at its coarser level. A selected node therefore carries four
//! quadrant flags and the selection as a whole tiles the visible raster
//! exactly once.
//!
//! Each level also gets a morph band at the far end of its visibility band,
//! where vertices blend toward the coarser level before the switch. The
//! shader constants for that blend come from [`LodSelection::morph_consts`].

use glam::Vec3;

use super::bounds::{Aabb, Containment};
use super::config::MAX_LOD_LEVELS;
use super::frustum::Frustum;
use super::node::{NodeIndex, NodeKind};
use super::tree::QuadTree;

/// Default capacity of a [`LodSelection`] buffer.
pub const DEFAULT_MAX_SELECTION_COUNT: usize = 4096;

/// Default fraction of a visibility band at which morphing toward the
/// coarser level begins.
pub const DEFAULT_MORPH_START_RATIO: f32 = 0.66;

/// One node picked by [`QuadTree::lod_select`].
#[derive(Clone, Copy, Debug)]
pub struct SelectedNode {
  /// Arena index of the selected node.
  pub node: NodeIndex,
  /// Raster-space footprint.
  pub x: u16,
  pub y: u16,
  pub size: u16,
  /// Selection LOD level, 0 = most detailed selected level.
  pub lod_level: usize,
  /// Quadrant flags in TL, TR, BL, BR order. A cleared flag means the
  /// quadrant is rendered by a more detailed selected node (or was culled)
  /// and must be skipped here.
  pub tl: bool,
  pub tr: bool,
  pub bl: bool,
  pub br: bool,
  /// World bounds of the node.
  pub aabb: Aabb,
  /// Distance from the camera, filled when `sort_by_distance` is set,
  /// otherwise 0.
  pub min_dist_to_camera: f32,
}

impl SelectedNode {
  /// True when all four quadrants render at this node's level.
  #[inline]
  pub fn is_full(&self) -> bool {
    self.tl && self.tr && self.bl && self.br
  }
}

/// Per-frame inputs to [`QuadTree::lod_select`].
#[derive(Clone, Copy, Debug)]
pub struct SelectionParams {
  /// Observer position driving the distance bands.
  pub observer_pos: Vec3,
  /// Frustum used for culling. [`Frustum::unbounded`] disables culling.
  pub frustum: Frustum,
  /// Distance at which the coarsest level disappears.
  pub visibility_distance: f32,
  /// Ratio between consecutive band widths; 2.0 doubles every coarser band.
  pub lod_distance_ratio: f32,
  /// Fraction of a band at which morphing toward the coarser level starts.
  pub morph_start_ratio: f32,
  /// Sort the selection front to back after the walk.
  pub sort_by_distance: bool,
  /// Deepest tree level to descend to; `None` walks down to the leaves.
  /// Selection LOD levels are counted up from the stop level.
  pub stop_at_level: Option<usize>,
}

impl SelectionParams {
  pub fn new(
    observer_pos: Vec3,
    frustum: Frustum,
    visibility_distance: f32,
    lod_distance_ratio: f32,
  ) -> Self {
    Self {
      observer_pos,
      frustum,
      visibility_distance,
      lod_distance_ratio,
      morph_start_ratio: DEFAULT_MORPH_START_RATIO,
      sort_by_distance: false,
      stop_at_level: None,
    }
  }
}

/// Reusable selection buffer plus the per-level tables derived on each
/// [`QuadTree::lod_select`] call.
///
/// Create once, pass in every frame; the buffer allocation is reused. The
/// accessors describe the most recent selection.
#[derive(Clone, Debug)]
pub struct LodSelection {
  buffer: Vec<SelectedNode>,
  max_selection_count: usize,

  observer_pos: Vec3,
  /// Far edge of each tree level's visibility band, indexed by tree level
  /// (0 = top, largest).
  visibility_ranges: [f32; MAX_LOD_LEVELS],
  /// Morph band bounds indexed by selection LOD level (0 = most detailed).
  morph_start: [f32; MAX_LOD_LEVELS],
  morph_end: [f32; MAX_LOD_LEVELS],
  stop_at_level: usize,
  lod_level_count: usize,
  min_selected_lod_level: usize,
  max_selected_lod_level: usize,
  vis_dist_too_small: bool,
  buffer_overflowed: bool,
}

impl LodSelection {
  /// Buffer with the default capacity.
  pub fn new() -> Self {
    Self::with_max_count(DEFAULT_MAX_SELECTION_COUNT)
  }

  /// Buffer that holds at most `max_selection_count` nodes.
  pub fn with_max_count(max_selection_count: usize) -> Self {
    Self {
      buffer: Vec::with_capacity(max_selection_count),
      max_selection_count,
      observer_pos: Vec3::ZERO,
      visibility_ranges: [0.0; MAX_LOD_LEVELS],
      morph_start: [0.0; MAX_LOD_LEVELS],
      morph_end: [0.0; MAX_LOD_LEVELS],
      stop_at_level: 0,
      lod_level_count: 0,
      min_selected_lod_level: MAX_LOD_LEVELS,
      max_selected_lod_level: 0,
      vis_dist_too_small: false,
      buffer_overflowed: false,
    }
  }

  /// Nodes picked by the last selection, in walk order, or front to back
  /// when distance sorting was requested.
  #[inline]
  pub fn selection(&self) -> &[SelectedNode] {
    &self.buffer
  }

  #[inline]
  pub fn max_selection_count(&self) -> usize {
    self.max_selection_count
  }

  /// Observer position of the last selection.
  #[inline]
  pub fn observer_pos(&self) -> Vec3 {
    self.observer_pos
  }

  /// Most detailed LOD level present in the last selection.
  /// `MAX_LOD_LEVELS` when the selection is empty.
  #[inline]
  pub fn min_selected_lod_level(&self) -> usize {
    self.min_selected_lod_level
  }

  /// Coarsest LOD level present in the last selection. 0 when the selection
  /// is empty.
  #[inline]
  pub fn max_selected_lod_level(&self) -> usize {
    self.max_selected_lod_level
  }

  /// True when the last selection hit node areas past their morph band,
  /// which shows up as LOD levels popping without a morph transition.
  /// Raising the visibility distance or the LOD level count clears it.
  #[inline]
  pub fn vis_dist_too_small(&self) -> bool {
    self.vis_dist_too_small
  }

  /// True when the last selection wanted more nodes than the buffer holds;
  /// the result is truncated and no longer tiles the visible area.
  #[inline]
  pub fn buffer_overflowed(&self) -> bool {
    self.buffer_overflowed
  }

  /// Far edge of the visibility band of `lod_level`, 0 = most detailed.
  /// Matches the morph end distance of that level.
  #[inline]
  pub fn visibility_range(&self, lod_level: usize) -> f32 {
    debug_assert!(lod_level < self.lod_level_count);
    self.visibility_ranges[self.lod_level_count - 1 - lod_level]
  }

  /// Morph constants for rendering nodes selected at `lod_level`, packed
  /// for the vertex shader:
  ///
  /// `[morph_start, 1 / (end - start), end / (end - start), 1 / (end - start)]`
  ///
  /// so `morph_amount = clamp(consts[2] - distance * consts[3], 0, 1)`.
  /// The end distance is pulled slightly toward the start to keep the blend
  /// from degenerating right at the band edge.
  pub fn morph_consts(&self, lod_level: usize) -> [f32; 4] {
    debug_assert!(lod_level < self.lod_level_count);
    let start = self.morph_start[lod_level];
    let mut end = self.morph_end[lod_level];

    const ERROR_FUDGE: f32 = 0.01;
    end = end + (start - end) * ERROR_FUDGE;
    let inv_span = 1.0 / (end - start);

    [start, inv_span, end * inv_span, inv_span]
  }
}

impl Default for LodSelection {
  fn default() -> Self {
    Self::new()
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LodSelectResult {
  Undefined,
  OutOfFrustum,
  OutOfRange,
  Selected,
}

impl QuadTree {
  /// Select the nodes to render for one frame.
  ///
  /// Resets `selection`, derives the per-level visibility and morph tables
  /// from `params`, then walks the tree from the top nodes down. See the
  /// module docs for how the bands drive the descent.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "quadtree::lod_select"))]
  pub fn lod_select(&self, params: &SelectionParams, selection: &mut LodSelection) {
    debug_assert!(params.visibility_distance > 0.0);
    debug_assert!(params.lod_distance_ratio > 0.0);
    debug_assert!(params.morph_start_ratio > 0.0 && params.morph_start_ratio < 1.0);

    let lod_level_count = self.lod_level_count();
    let stop_at_level = params.stop_at_level.unwrap_or(lod_level_count - 1);
    debug_assert!(stop_at_level < lod_level_count);

    selection.buffer.clear();
    selection.observer_pos = params.observer_pos;
    selection.stop_at_level = stop_at_level;
    selection.lod_level_count = lod_level_count;
    selection.min_selected_lod_level = MAX_LOD_LEVELS;
    selection.max_selected_lod_level = 0;
    selection.vis_dist_too_small = false;
    selection.buffer_overflowed = false;

    // Band widths form a geometric series in lod_distance_ratio summing to
    // the visibility distance; visibility_ranges[level] is the far edge of
    // the band of that tree level, so the top level reaches all the way out.
    let mut total = 0.0;
    let mut detail_balance = 1.0;
    for _ in 0..lod_level_count {
      total += detail_balance;
      detail_balance *= params.lod_distance_ratio;
    }
    let section = params.visibility_distance / total;

    let mut prev_pos = 0.0;
    let mut detail_balance = 1.0;
    for i in 0..lod_level_count {
      selection.visibility_ranges[lod_level_count - i - 1] = prev_pos + section * detail_balance;
      prev_pos = selection.visibility_ranges[lod_level_count - i - 1];
      detail_balance *= params.lod_distance_ratio;
    }

    let mut prev_pos = 0.0;
    for i in 0..lod_level_count {
      selection.morph_end[i] = selection.visibility_ranges[lod_level_count - i - 1];
      selection.morph_start[i] =
        prev_pos + (selection.morph_end[i] - prev_pos) * params.morph_start_ratio;
      prev_pos = selection.morph_start[i];
    }

    for &top_node in self.top_nodes() {
      select_node(self, top_node, false, params, selection);
    }

    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("selection_post_pass").entered();

    let mut min_lod = MAX_LOD_LEVELS;
    let mut max_lod = 0;
    for selected in selection.buffer.iter_mut() {
      selected.min_dist_to_camera = if params.sort_by_distance {
        selected.aabb.min_distance_sq(params.observer_pos).sqrt()
      } else {
        0.0
      };
      min_lod = min_lod.min(selected.lod_level);
      max_lod = max_lod.max(selected.lod_level);
    }
    selection.min_selected_lod_level = min_lod;
    selection.max_selected_lod_level = max_lod;

    if params.sort_by_distance {
      selection
        .buffer
        .sort_by(|a, b| a.min_dist_to_camera.partial_cmp(&b.min_dist_to_camera).unwrap());
    }
  }
}

/// Walk one node. Returns how the node ended up so the parent can decide
/// which quadrants it still has to cover itself.
fn select_node(
  tree: &QuadTree,
  index: NodeIndex,
  parent_completely_in_frustum: bool,
  params: &SelectionParams,
  sel: &mut LodSelection,
) -> LodSelectResult {
  let node = tree.node(index);
  let aabb = tree.node_world_aabb(index);
  let level = node.level as usize;

  let containment = if parent_completely_in_frustum {
    Containment::Inside
  } else {
    aabb.test_planes(&params.frustum.planes)
  };
  if containment == Containment::Outside {
    return LodSelectResult::OutOfFrustum;
  }

  let distance_limit = sel.visibility_ranges[level];
  if !aabb.intersects_sphere_sq(params.observer_pos, distance_limit * distance_limit) {
    return LodSelectResult::OutOfRange;
  }

  // Descend while the observer is inside the next level's band of our area.
  // Children that exist but come back OutOfRange keep their quadrant flag
  // set below, so this node covers them at its own level.
  let mut child_results = [LodSelectResult::Undefined; 4];
  if level != sel.stop_at_level {
    let next_distance_limit = sel.visibility_ranges[level + 1];
    if aabb.intersects_sphere_sq(params.observer_pos, next_distance_limit * next_distance_limit) {
      let completely_in_frustum = containment == Containment::Inside;
      if let NodeKind::Branch { children } = node.kind {
        for (quadrant, child) in children.iter().enumerate() {
          if let Some(child) = child {
            child_results[quadrant] =
              select_node(tree, *child, completely_in_frustum, params, sel);
          }
        }
      }
    }
  }

  let removed =
    child_results.map(|r| matches!(r, LodSelectResult::Selected | LodSelectResult::OutOfFrustum));
  let all_removed = removed[0] && removed[1] && removed[2] && removed[3];

  if !all_removed {
    if sel.buffer.len() < sel.max_selection_count {
      let lod_level = sel.stop_at_level - level;
      sel.buffer.push(SelectedNode {
        node: index,
        x: node.x,
        y: node.y,
        size: node.size,
        lod_level,
        tl: !removed[0],
        tr: !removed[1],
        bl: !removed[2],
        br: !removed[3],
        aabb,
        min_dist_to_camera: 0.0,
      });

      // Flag selections that reach past their morph band: those nodes pop
      // to the coarser level with no transition. Checked against the next
      // band since this node morphs out at this band's far edge.
      if !sel.vis_dist_too_small && level != 0 {
        let max_dist_from_cam = aabb.max_distance_sq(params.observer_pos).sqrt();
        if max_dist_from_cam > sel.morph_start[lod_level + 1] {
          sel.vis_dist_too_small = true;
        }
      }
      return LodSelectResult::Selected;
    }
    sel.buffer_overflowed = true;
  }

  // Either the children tile our whole area or the buffer is full. Report
  // Selected if anything under us was taken so ancestors keep their
  // quadrant bookkeeping straight.
  if child_results.iter().any(|&r| r == LodSelectResult::Selected) {
    LodSelectResult::Selected
  } else {
    LodSelectResult::OutOfFrustum
  }
}

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;
