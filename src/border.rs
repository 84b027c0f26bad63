// Neighbour availability & reference fill (spec.md §4.1, C1).
//
// Grounded on `fill_border_samples` in
// original_source/libde265/intrapred.cc: coarse picture/slice/tile checks
// folded into a single per-sample availability predicate together with the
// z-scan and constrained-intra-pred tests, since min-TB size (4 samples)
// means every sample in a 4-run shares one min-TB address and checking
// per-sample is equivalent to checking per-run.

use crate::consts::MAX_NT;
use crate::external::ImageAccess;
use crate::mode::PredMode;
use crate::params::{PictureParams, SequenceParams};

pub const BORDER_MAX_LEN: usize = 4 * MAX_NT + 1;

fn idx(i: i32) -> usize {
  (i + 2 * MAX_NT as i32) as usize
}

/// The `4nT+1` neighbour border around a transform block, indexed
/// symmetrically: `border[0]` is the top-left corner sample, negative
/// indices descend the left column, positive indices run along the top row.
#[derive(Clone)]
pub struct Border {
  data: [u8; BORDER_MAX_LEN],
}

impl Border {
  pub fn new() -> Self {
    Self { data: [0u8; BORDER_MAX_LEN] }
  }

  pub fn get(&self, i: i32) -> u8 {
    self.data[idx(i)]
  }

  pub fn set(&mut self, i: i32, value: u8) {
    self.data[idx(i)] = value;
  }
}

impl Default for Border {
  fn default() -> Self {
    Self::new()
  }
}

#[allow(clippy::too_many_arguments)]
fn is_available(
  img: &dyn ImageAccess,
  sps: &SequenceParams,
  pps: &PictureParams,
  log2_ctb: i32,
  log2_min_tb: i32,
  cur_slice: i32,
  cur_tile: i32,
  cur_zs: i32,
  nx_luma: i32,
  ny_luma: i32,
) -> bool {
  if nx_luma < 0 || ny_luma < 0 {
    return false;
  }
  if nx_luma >= sps.pic_width_in_luma_samples || ny_luma >= sps.pic_height_in_luma_samples {
    return false;
  }
  let ctb_x = nx_luma >> log2_ctb;
  let ctb_y = ny_luma >> log2_ctb;
  let slice = img.get_slice_addr_rs(ctb_x, ctb_y);
  let tile = pps.tile_id_at(ctb_x, ctb_y, sps.pic_width_in_ctbs_y);
  if slice != cur_slice || tile != cur_tile {
    return false;
  }

  let tb_x = nx_luma >> log2_min_tb;
  let tb_y = ny_luma >> log2_min_tb;
  let zs = pps.min_tb_addr_zs_at(tb_x, tb_y, sps.pic_width_in_tbs_y);
  if zs >= cur_zs {
    return false;
  }

  if pps.constrained_intra_pred_flag && img.get_pred_mode(nx_luma, ny_luma) != PredMode::Intra {
    return false;
  }

  true
}

/// Fills the border for a block at plane-local `(xb, yb)` of size `nt` on
/// plane `c_idx`. Availability is computed in luma coordinates; samples are
/// read back in the plane's own coordinate space.
pub fn fill_border_samples(img: &dyn ImageAccess, xb: i32, yb: i32, nt: i32, c_idx: usize) -> Border {
  log::trace!("fill_border_samples: block ({xb},{yb}) nT={nt} cIdx={c_idx}");
  let sps = img.sps();
  let pps = img.pps();
  let log2_ctb = sps.log2_ctb_size_y as i32;
  let log2_min_tb = sps.log2_min_trafo_size as i32;

  let scale = if c_idx == 0 { 1 } else { 2 };
  let x_bl = xb * scale;
  let y_bl = yb * scale;

  let cur_ctb_x = x_bl >> log2_ctb;
  let cur_ctb_y = y_bl >> log2_ctb;
  let cur_slice = img.get_slice_addr_rs(cur_ctb_x, cur_ctb_y);
  let cur_tile = pps.tile_id_at(cur_ctb_x, cur_ctb_y, sps.pic_width_in_ctbs_y);

  let cur_tb_x = x_bl >> log2_min_tb;
  let cur_tb_y = y_bl >> log2_min_tb;
  let cur_zs = pps.min_tb_addr_zs_at(cur_tb_x, cur_tb_y, sps.pic_width_in_tbs_y);

  fn record(i: i32, value: u8, raw: &mut [Option<u8>; BORDER_MAX_LEN], first_value: &mut Option<u8>) {
    raw[idx(i)] = Some(value);
    if first_value.is_none() {
      *first_value = Some(value);
    }
  }

  let mut raw: [Option<u8>; BORDER_MAX_LEN] = [None; BORDER_MAX_LEN];
  let mut first_value: Option<u8> = None;

  // Left column, bottom-up: border[-1] .. border[-2nT].
  for k in 1..=(2 * nt) {
    let nx_luma = x_bl - scale;
    let ny_luma = y_bl + (k - 1) * scale;
    if is_available(img, sps, pps, log2_ctb, log2_min_tb, cur_slice, cur_tile, cur_zs, nx_luma, ny_luma) {
      let value = img.get_image_plane_at_pos(c_idx, xb - 1, yb + k - 1);
      record(-k, value, &mut raw, &mut first_value);
    }
  }

  // Top-left corner: border[0].
  {
    let nx_luma = x_bl - scale;
    let ny_luma = y_bl - scale;
    if is_available(img, sps, pps, log2_ctb, log2_min_tb, cur_slice, cur_tile, cur_zs, nx_luma, ny_luma) {
      let value = img.get_image_plane_at_pos(c_idx, xb - 1, yb - 1);
      record(0, value, &mut raw, &mut first_value);
    }
  }

  // Top row, left-to-right: border[1] .. border[2nT].
  for k in 1..=(2 * nt) {
    let nx_luma = x_bl + (k - 1) * scale;
    let ny_luma = y_bl - scale;
    if is_available(img, sps, pps, log2_ctb, log2_min_tb, cur_slice, cur_tile, cur_zs, nx_luma, ny_luma) {
      let value = img.get_image_plane_at_pos(c_idx, xb + k - 1, yb - 1);
      record(k, value, &mut raw, &mut first_value);
    }
  }

  let mut border = Border::new();
  match first_value {
    None => {
      log::trace!("fill_border_samples: no neighbours available at ({xb},{yb}) nT={nt}, substituting neutral grey");
      let grey = 1u8 << (sps.bit_depth_luma - 1);
      for i in -2 * nt..=2 * nt {
        border.set(i, grey);
      }
    }
    Some(fv) => {
      if raw[idx(-2 * nt)].is_none() {
        raw[idx(-2 * nt)] = Some(fv);
      }
      let mut prev = raw[idx(-2 * nt)].unwrap();
      border.set(-2 * nt, prev);
      for i in (-2 * nt + 1)..=(2 * nt) {
        let value = raw[idx(i)].unwrap_or(prev);
        border.set(i, value);
        prev = value;
      }
    }
  }
  border
}
