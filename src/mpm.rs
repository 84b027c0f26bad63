// Most-probable-mode candidate list (spec.md §4.4, C4).
//
// Grounded on `fillIntraPredModeCandidates` in
// original_source/libde265/intrapred.cc. `mpm_rank` is a supplement
// (SPEC_FULL.md §3): it is not required by any operation spec.md names, but
// documents the index a real CABAC-coded `mpm_idx` syntax element would use.

use crate::external::ImageAccess;
use crate::mode::{IntraMode, PredMode};

/// Three *distinct* most-probable-mode candidates (I-MPM).
pub type MpmList = [IntraMode; 3];

#[allow(clippy::too_many_arguments)]
fn neighbour_mode(
  img: &dyn ImageAccess,
  x: i32,
  y: i32,
  pu_idx: i32,
  neighbour_available: bool,
) -> IntraMode {
  if !neighbour_available {
    return IntraMode::DC;
  }
  if img.get_pred_mode(x, y) != PredMode::Intra || img.get_pcm_flag(x, y) {
    return IntraMode::DC;
  }
  img.get_intra_pred_mode_at_index(pu_idx)
}

/// Derives `[candA, candB, third]` for a luma PU at `(x, y)` with PU index
/// `pu_idx`, given left/above neighbour availability.
pub fn fill_intra_pred_mode_candidates(
  img: &dyn ImageAccess,
  x: i32,
  y: i32,
  pu_idx: i32,
  available_a: bool,
  available_b: bool,
) -> MpmList {
  let sps = img.sps();

  let cand_a = neighbour_mode(img, x - 1, y, pu_idx - 1, available_a);

  let above_in_prev_ctb_row = {
    let ctb_row_start = (y >> sps.log2_ctb_size_y) << sps.log2_ctb_size_y;
    (y - 1) < ctb_row_start
  };
  let cand_b = if above_in_prev_ctb_row {
    IntraMode::DC
  } else {
    neighbour_mode(img, x, y - 1, pu_idx - sps.pic_width_in_min_pus, available_b)
  };

  if cand_a == cand_b {
    if cand_a.is_planar() || cand_a.is_dc() {
      [IntraMode::PLANAR, IntraMode::DC, IntraMode::ANGULAR_26]
    } else {
      let m = cand_a.value() as i32;
      let prev = 2 + (m - 2 - 1).rem_euclid(32);
      let next = 2 + (m - 2 + 1).rem_euclid(32);
      [cand_a, IntraMode::new(prev as u8), IntraMode::new(next as u8)]
    }
  } else {
    let third = if !cand_a.is_planar() && !cand_b.is_planar() {
      IntraMode::PLANAR
    } else if !cand_a.is_dc() && !cand_b.is_dc() {
      IntraMode::DC
    } else {
      IntraMode::ANGULAR_26
    };
    [cand_a, cand_b, third]
  }
}

/// Index of `mode` within `list`, or `None` if it is not one of the three
/// MPM candidates. Mirrors the index a real `mpm_idx` CABAC syntax element
/// would carry; not itself required by any spec.md operation.
pub fn mpm_rank(list: &MpmList, mode: IntraMode) -> Option<usize> {
  list.iter().position(|&m| m == mode)
}

/// Base rate contribution (in bits) for signalling `mode` given its MPM
/// list, per spec.md §4.4: `+1` for the first candidate, `+2` for the
/// second or third, `+5` if `mode` is not a candidate at all. This is the
/// fixed part only — the CABAC bin cost of `prev_intra_luma_pred_flag` is
/// added on top by callers (see `mode_search::mode_signalling_rate`).
pub fn mpm_rate(list: &MpmList, mode: IntraMode) -> f32 {
  match mpm_rank(list, mode) {
    Some(0) => 1.0,
    Some(_) => 2.0,
    None => 5.0,
  }
}
