// Distortion metrics (spec.md §4.5, C5): SSD, SAD, and SATD over two 8-bit
// planes. Grounded on the residual-cost helpers in
// original_source/libde265/encoder/algo/tb-intrapredmode.cc (`SSD`, `SAD`
// computed directly on sample differences ahead of any transform).

use crate::accel::ReferenceAccel;
use crate::array2d::Array2D;
use crate::external::Accel;
use crate::util::floor_log2;

pub fn ssd(a: &Array2D<u8>, b: &Array2D<u8>) -> i64 {
  assert_eq!(a.rows(), b.rows());
  assert_eq!(a.cols(), b.cols());
  let mut sum: i64 = 0;
  for r in 0..a.rows() {
    for c in 0..a.cols() {
      let d = a[r][c] as i64 - b[r][c] as i64;
      sum += d * d;
    }
  }
  sum
}

pub fn sad(a: &Array2D<u8>, b: &Array2D<u8>) -> i64 {
  assert_eq!(a.rows(), b.rows());
  assert_eq!(a.cols(), b.cols());
  let mut sum: i64 = 0;
  for r in 0..a.rows() {
    for c in 0..a.cols() {
      sum += (a[r][c] as i64 - b[r][c] as i64).abs();
    }
  }
  sum
}

fn signed_diff(a: &Array2D<u8>, b: &Array2D<u8>) -> Array2D<i32> {
  assert_eq!(a.rows(), b.rows());
  assert_eq!(a.cols(), b.cols());
  let mut diff = Array2D::<i32>::zeroed(a.rows(), a.cols());
  diff.fill_with(|r, c| a[r][c] as i32 - b[r][c] as i32);
  diff
}

/// Sum of absolute transformed differences, using either forward DCT or
/// Hadamard kernels (spec.md §4.5). `a.rows()` must be a supported block
/// size (4/8/16/32) and square.
pub fn satd(a: &Array2D<u8>, b: &Array2D<u8>, accel: &dyn Accel, use_hadamard: bool) -> i64 {
  assert_eq!(a.rows(), a.cols());
  let diff = signed_diff(a, b);
  let log2_blk_size = floor_log2(a.rows());
  let transformed =
    if use_hadamard { accel.hadamard_transform(log2_blk_size, &diff) } else { accel.fwd_transform(log2_blk_size, &diff) };

  let mut sum: i64 = 0;
  for r in 0..transformed.rows() {
    for c in 0..transformed.cols() {
      sum += (transformed[r][c] as i64).abs();
    }
  }
  sum
}

pub fn default_accel() -> ReferenceAccel {
  ReferenceAccel
}

#[cfg(test)]
mod tests {
  use super::*;

  fn filled(n: usize, value: u8) -> Array2D<u8> {
    let mut arr = Array2D::<u8>::zeroed(n, n);
    arr.fill_with(|_, _| value);
    arr
  }

  #[test]
  fn ssd_of_identical_blocks_is_zero() {
    let a = filled(8, 100);
    let b = filled(8, 100);
    assert_eq!(ssd(&a, &b), 0);
  }

  #[test]
  fn sad_and_ssd_agree_on_single_pixel_difference() {
    let mut a = filled(4, 50);
    let b = filled(4, 50);
    a[0][0] = 53;
    assert_eq!(sad(&a, &b), 3);
    assert_eq!(ssd(&a, &b), 9);
  }

  #[test]
  fn satd_of_identical_blocks_is_zero() {
    let a = filled(8, 77);
    let b = filled(8, 77);
    let accel = default_accel();
    assert_eq!(satd(&a, &b, &accel, false), 0);
    assert_eq!(satd(&a, &b, &accel, true), 0);
  }
}
