// Prediction kernels (spec.md §4.3, C3): planar, DC, and angular, plus the
// `decode_intra_prediction` entry point that composes C1 -> C2 -> C3.
//
// Grounded on the `predict_*` family in original_source/libde265/intrapred.cc.
// Every shift/rounding constant here is normative (spec.md §9 "Bit-exactness
// is a correctness property") and intentionally left unsimplified.

use crate::array2d::Array2D;
use crate::border::{self, Border};
use crate::consts::{inv_angle, intra_pred_angle};
use crate::external::ImageAccessMut;
use crate::mode::IntraMode;
use crate::smoothing::intra_prediction_sample_filtering;
use crate::util::{clip8, floor_log2, round2};

pub fn planar(border: &Border, nt: i32) -> Array2D<u8> {
  let log2nt = floor_log2(nt as usize);
  let mut out = Array2D::zeroed(nt as usize, nt as usize);
  for y in 0..nt {
    for x in 0..nt {
      let pred = (nt - 1 - x) * border.get(-1 - y) as i32
        + (x + 1) * border.get(1 + nt) as i32
        + (nt - 1 - y) * border.get(1 + x) as i32
        + (y + 1) * border.get(-1 - nt) as i32
        + nt;
      out[y as usize][x as usize] = (pred >> (log2nt + 1)) as u8;
    }
  }
  out
}

pub fn dc(border: &Border, nt: i32, c_idx: usize) -> Array2D<u8> {
  let log2nt = floor_log2(nt as usize);
  let mut sum = nt;
  for i in 1..=nt {
    sum += border.get(i) as i32 + border.get(-i) as i32;
  }
  let dc_val = sum >> (log2nt + 1);

  let mut out = Array2D::zeroed(nt as usize, nt as usize);
  out.fill_with(|_, _| dc_val as u8);

  if c_idx == 0 && nt < 32 {
    out[0][0] = round2(border.get(-1) as i32 + 2 * dc_val + border.get(1) as i32, 2) as u8;
    for x in 1..nt {
      out[0][x as usize] = round2(border.get(x + 1) as i32 + 3 * dc_val, 2) as u8;
    }
    for y in 1..nt {
      out[y as usize][0] = round2(border.get(-y - 1) as i32 + 3 * dc_val, 2) as u8;
    }
  }
  out
}

/// Vertical-ish branch, modes >= 18: `ref[x] = border[x]`, projected
/// negative extension via `invAngle`.
fn predict_vertical(border: &Border, mode: IntraMode, nt: i32) -> Array2D<u8> {
  let angle = intra_pred_angle(mode);
  let min_index = if angle < 0 { (nt * angle) >> 5 } else { 0 };
  let offset = -min_index;
  let len = (2 * nt - min_index + 1) as usize;
  let mut reference = vec![0i32; len];

  for x in 0..=nt {
    reference[(offset + x) as usize] = border.get(x) as i32;
  }
  if angle < 0 {
    let inv = inv_angle(mode);
    for x in min_index..0 {
      let proj = -((x * inv + 128) >> 8);
      reference[(offset + x) as usize] = border.get(proj) as i32;
    }
  } else {
    for x in (nt + 1)..=(2 * nt) {
      reference[(offset + x) as usize] = border.get(x) as i32;
    }
  }
  let at = |i: i32| -> i32 { reference[(offset + i) as usize] };

  let mut out = Array2D::zeroed(nt as usize, nt as usize);
  for y in 0..nt {
    let i_idx = ((y + 1) * angle) >> 5;
    let i_fact = ((y + 1) * angle) & 31;
    for x in 0..nt {
      let value = if i_fact != 0 {
        ((32 - i_fact) * at(x + i_idx + 1) + i_fact * at(x + i_idx + 2) + 16) >> 5
      } else {
        at(x + i_idx + 1)
      };
      out[y as usize][x as usize] = value as u8;
    }
  }
  out
}

/// Horizontal-ish branch, modes <= 17 (mirror of `predict_vertical`):
/// `ref[x] = border[-x]`, projection reads `border[...]` directly (not
/// negated), and the roles of `x`/`y` swap.
fn predict_horizontal(border: &Border, mode: IntraMode, nt: i32) -> Array2D<u8> {
  let angle = intra_pred_angle(mode);
  let min_index = if angle < 0 { (nt * angle) >> 5 } else { 0 };
  let offset = -min_index;
  let len = (2 * nt - min_index + 1) as usize;
  let mut reference = vec![0i32; len];

  for x in 0..=nt {
    reference[(offset + x) as usize] = border.get(-x) as i32;
  }
  if angle < 0 {
    let inv = inv_angle(mode);
    for x in min_index..0 {
      let proj = (x * inv + 128) >> 8;
      reference[(offset + x) as usize] = border.get(proj) as i32;
    }
  } else {
    for x in (nt + 1)..=(2 * nt) {
      reference[(offset + x) as usize] = border.get(-x) as i32;
    }
  }
  let at = |i: i32| -> i32 { reference[(offset + i) as usize] };

  let mut out = Array2D::zeroed(nt as usize, nt as usize);
  for x in 0..nt {
    let i_idx = ((x + 1) * angle) >> 5;
    let i_fact = ((x + 1) * angle) & 31;
    for y in 0..nt {
      let value = if i_fact != 0 {
        ((32 - i_fact) * at(y + i_idx + 1) + i_fact * at(y + i_idx + 2) + 16) >> 5
      } else {
        at(y + i_idx + 1)
      };
      out[y as usize][x as usize] = value as u8;
    }
  }
  out
}

pub fn angular(border: &Border, mode: IntraMode, nt: i32, c_idx: usize) -> Array2D<u8> {
  assert!(mode.is_angular());
  let mut out = if mode.value() >= 18 { predict_vertical(border, mode, nt) } else { predict_horizontal(border, mode, nt) };

  if c_idx == 0 && nt < 32 {
    if mode == IntraMode::ANGULAR_26 {
      let p0 = border.get(0) as i32;
      let p1 = border.get(1) as i32;
      for y in 0..nt {
        out[y as usize][0] = clip8(p1 + ((border.get(-1 - y) as i32 - p0) >> 1));
      }
    } else if mode.value() == crate::consts::INTRA_ANGULAR_10 {
      let p0 = border.get(0) as i32;
      let pm1 = border.get(-1) as i32;
      for x in 0..nt {
        out[0][x as usize] = clip8(pm1 + ((border.get(1 + x) as i32 - p0) >> 1));
      }
    }
  }
  out
}

/// Composes C1 -> C2 -> C3 and writes the predicted block into `img` at
/// `(xb, yb)` on plane `c_idx`. The crate's single decoder-facing entry
/// point.
pub fn decode_intra_prediction(img: &mut dyn ImageAccessMut, xb: i32, yb: i32, nt: i32, c_idx: usize, mode: IntraMode) {
  let mut border_samples = border::fill_border_samples(&*img, xb, yb, nt, c_idx);

  let bit_depth = img.sps().bit_depth_luma;
  let strong_smoothing = img.sps().strong_intra_smoothing_enable_flag;
  intra_prediction_sample_filtering(&mut border_samples, mode, nt, c_idx, bit_depth, strong_smoothing);

  let predicted = if mode.is_planar() {
    planar(&border_samples, nt)
  } else if mode.is_dc() {
    dc(&border_samples, nt, c_idx)
  } else {
    angular(&border_samples, mode, nt, c_idx)
  };

  for y in 0..nt {
    for x in 0..nt {
      img.set_image_plane_at_pos(c_idx, xb + x, yb + y, predicted[y as usize][x as usize]);
    }
  }
}
