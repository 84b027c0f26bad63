// Acceleration hooks (spec.md §6): size-indexed forward transform kernels
// used only by the SATD distortion metric (C5).
//
// Grounded on the butterfly style of nekotrix-tinyavif::txfm, but written as
// a single size-generic routine instead of one hand-unrolled stage list per
// size: the teacher only ever completed an 8-point DCT and left 4-point as
// `todo!()`, while this crate needs working 4/8/16/32-point kernels. Neither
// kernel needs to be bit-exact to any standard's fixed-point transform (C5's
// SATD is a search-time cost proxy, not a normative decode path), so a
// direct reference DCT-II and an iterative Hadamard butterfly are enough.

use crate::array2d::Array2D;
use crate::external::Accel;

/// Reference `Accel` implementation: a direct (non-fast) integer DCT-II and
/// an iterative Walsh-Hadamard transform, both size-generic over
/// `log2_blk_size` in `2..=5` (block sizes 4/8/16/32).
#[derive(Default)]
pub struct ReferenceAccel;

fn dct2_1d(input: &[i32]) -> Vec<i32> {
  let n = input.len();
  let mut output = vec![0i32; n];
  for (k, out_k) in output.iter_mut().enumerate() {
    let mut sum = 0.0f64;
    for (i, &sample) in input.iter().enumerate() {
      let angle = std::f64::consts::PI * (i as f64 + 0.5) * k as f64 / n as f64;
      sum += sample as f64 * angle.cos();
    }
    let scale = if k == 0 { (1.0 / n as f64).sqrt() } else { (2.0 / n as f64).sqrt() };
    *out_k = (sum * scale).round() as i32;
  }
  output
}

fn hadamard_1d(input: &[i32]) -> Vec<i32> {
  let n = input.len();
  let mut data = input.to_vec();
  let mut step = 1;
  while step < n {
    let mut i = 0;
    while i < n {
      for j in i..i + step {
        let a = data[j];
        let b = data[j + step];
        data[j] = a + b;
        data[j + step] = a - b;
      }
      i += step * 2;
    }
    step *= 2;
  }
  data
}

fn separable_transform(diff: &Array2D<i32>, kernel_1d: fn(&[i32]) -> Vec<i32>) -> Array2D<i32> {
  let rows = diff.rows();
  let cols = diff.cols();

  let mut row_transformed = Array2D::<i32>::zeroed(rows, cols);
  for r in 0..rows {
    let transformed = kernel_1d(&diff[r]);
    row_transformed[r].copy_from_slice(&transformed);
  }

  let transposed = row_transformed.transpose();
  let mut col_transformed = Array2D::<i32>::zeroed(transposed.rows(), transposed.cols());
  for r in 0..transposed.rows() {
    let transformed = kernel_1d(&transposed[r]);
    col_transformed[r].copy_from_slice(&transformed);
  }

  col_transformed.transpose()
}

impl Accel for ReferenceAccel {
  fn fwd_transform(&self, log2_blk_size: u32, diff: &Array2D<i32>) -> Array2D<i32> {
    let n = 1usize << log2_blk_size;
    assert_eq!(diff.rows(), n);
    assert_eq!(diff.cols(), n);
    separable_transform(diff, dct2_1d)
  }

  fn hadamard_transform(&self, log2_blk_size: u32, diff: &Array2D<i32>) -> Array2D<i32> {
    let n = 1usize << log2_blk_size;
    assert_eq!(diff.rows(), n);
    assert_eq!(diff.cols(), n);
    separable_transform(diff, hadamard_1d)
  }
}
