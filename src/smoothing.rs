// Reference sample smoothing (spec.md §4.2, C2).
//
// Grounded on `intra_prediction_sample_filtering` /
// `fillIntraPredModeCandidates`'s strong-smoothing helper in
// original_source/libde265/intrapred.cc.

use crate::border::Border;
use crate::mode::IntraMode;
use crate::util::round2;

/// `d = min(|mode-26|, |mode-10|)`; smoothing is enabled above the
/// size-dependent threshold spec.md §4.2 gives for 8/16/32.
fn filtering_enabled(mode: IntraMode, nt: i32) -> bool {
  if mode.is_dc() {
    return false;
  }
  let m = mode.value() as i32;
  let d = (m - 26).abs().min((m - 10).abs());
  match nt {
    8 => d > 7,
    16 => d > 1,
    32 => d > 0,
    _ => false,
  }
}

/// Applies the 1-2-1 filter (or strong intra smoothing at nT==32) to
/// `border` in place. Gate: `cIdx==0 && mode!=DC && nT!=4`. No-op
/// otherwise, leaving the border bit-identical (I-Smoothing).
pub fn intra_prediction_sample_filtering(
  border: &mut Border,
  mode: IntraMode,
  nt: i32,
  c_idx: usize,
  bit_depth: u32,
  strong_intra_smoothing_enable_flag: bool,
) {
  if c_idx != 0 || nt == 4 {
    return;
  }
  if !filtering_enabled(mode, nt) {
    log::trace!("intra_prediction_sample_filtering: mode {mode} nT={nt} not filtered");
    return;
  }

  if nt == 32 && strong_intra_smoothing_enable_flag && strong_smoothing_applies(border, bit_depth) {
    log::trace!("intra_prediction_sample_filtering: mode {mode} nT={nt} using strong intra smoothing");
    apply_strong_smoothing(border, nt);
  } else {
    log::trace!("intra_prediction_sample_filtering: mode {mode} nT={nt} using bilinear filter");
    apply_bilinear_filter(border, nt);
  }
}

fn strong_smoothing_applies(border: &Border, bit_depth: u32) -> bool {
  let nt = 32;
  let threshold = 1i32 << (bit_depth - 5);
  let p0 = border.get(0) as i32;
  let top_ok = (p0 + border.get(2 * nt) as i32 - 2 * border.get(nt) as i32).abs() < threshold;
  let left_ok = (p0 + border.get(-2 * nt) as i32 - 2 * border.get(-nt) as i32).abs() < threshold;
  top_ok && left_ok
}

fn apply_strong_smoothing(border: &mut Border, nt: i32) {
  let p0 = border.get(0) as i32;
  let top_end = border.get(2 * nt) as i32;
  let left_end = border.get(-2 * nt) as i32;

  let mut filtered = border.clone();
  for i in 1..(2 * nt) {
    let top = p0 + ((i * (top_end - p0) + 32) >> 6);
    filtered.set(i, top as u8);
    let left = p0 + ((i * (left_end - p0) + 32) >> 6);
    filtered.set(-i, left as u8);
  }
  *border = filtered;
}

fn apply_bilinear_filter(border: &mut Border, nt: i32) {
  let mut filtered = border.clone();
  for i in (-2 * nt + 1)..(2 * nt) {
    let value = round2(border.get(i + 1) as i32 + 2 * border.get(i) as i32 + border.get(i - 1) as i32, 2);
    filtered.set(i, value as u8);
  }
  *border = filtered;
}
