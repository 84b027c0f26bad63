// External collaborator interfaces (spec.md §6). These are traits rather
// than concrete types because the rest of the HEVC bitstream parser/decoder,
// the transform-tree optimiser and the CABAC engine are explicitly out of
// scope (spec.md §1) — this crate only specifies the shape a real decoder
// plugs into.
//
// One deliberate departure from the C signatures in
// original_source/libde265/encoder/algo/tb-intrapredmode.cc: the opaque
// `encoder_context*` ("ectx") that every `analyze` call threads through is
// dropped from `TbSplitAnalyser::analyze`. In idiomatic Rust a trait
// implementor simply closes over whatever state it needs instead of
// receiving it as an extra pass-through pointer on every call.

use crate::array2d::Array2D;
use crate::mode::{IntraMode, PredMode};
use crate::params::{PictureParams, SequenceParams};

/// Read access to the working reconstructed picture and its per-block
/// metadata, as consumed by border fill (C1) and MPM derivation (C4).
pub trait ImageAccess {
  fn get_image_plane_at_pos(&self, c_idx: usize, x: i32, y: i32) -> u8;
  fn get_image_stride(&self, c_idx: usize) -> usize;
  fn get_pred_mode(&self, x: i32, y: i32) -> PredMode;
  fn get_pcm_flag(&self, x: i32, y: i32) -> bool;
  fn get_slice_addr_rs(&self, ctb_x: i32, ctb_y: i32) -> i32;
  fn get_intra_pred_mode_at_index(&self, pu_idx: i32) -> IntraMode;
  fn sps(&self) -> &SequenceParams;
  fn pps(&self) -> &PictureParams;
}

/// Write access used by prediction synthesis (C3) and by mode search when
/// finalising the winning candidate's metadata.
pub trait ImageAccessMut: ImageAccess {
  fn set_image_plane_at_pos(&mut self, c_idx: usize, x: i32, y: i32, value: u8);
  fn set_intra_pred_mode(&mut self, x: i32, y: i32, log2_tb_size: u32, mode: IntraMode);
}

/// A single binary CABAC context, and the one coding operation spec.md §6
/// exposes over it. The table is cloned (not mutated in place) before each
/// mode trial, per spec.md §3's context-model-table invariant and §5's
/// "never mutated in place during a trial" rule.
pub trait CabacContextTable {
  fn clone_table(&self) -> Box<dyn CabacContextTable>;
  fn rd_bits_for_prev_intra_luma_pred_flag(&self, bin: u8) -> f32;
}

/// Partition mode of the current coding block. Only the two values the
/// mode-search gate in spec.md §4.6 distinguishes are needed here.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PartMode {
  TwoNxTwoN,
  NxN,
}

/// The subset of a coding block's state that intra mode search reads and
/// writes: its prediction mode, partition mode, and per-PU intra modes.
pub struct CodingBlock {
  pub pred_mode: PredMode,
  pub part_mode: PartMode,
  pub intra_pred_mode: [IntraMode; 4],
  pub chroma_mode: IntraMode,
}

impl CodingBlock {
  pub fn new_intra(part_mode: PartMode) -> Self {
    Self {
      pred_mode: PredMode::Intra,
      part_mode,
      intra_pred_mode: [IntraMode::DC; 4],
      chroma_mode: IntraMode::DC,
    }
  }
}

/// An encoded transform block, opaque to this crate beyond its RD
/// statistics and its ability to commit itself into the working picture.
pub trait EncTb {
  fn rate(&self) -> f32;
  fn distortion(&self) -> f32;
  #[allow(clippy::too_many_arguments)]
  fn reconstruct(
    &self,
    accel: &dyn Accel,
    img: &mut dyn ImageAccessMut,
    x0: i32,
    y0: i32,
    x_base: i32,
    y_base: i32,
    cb: &mut CodingBlock,
    blk_idx: usize,
  );
}

/// The transform-tree analyser: a black box that, given a trial intra mode
/// already written into `img`/`cb`, performs whatever transform/quantise
/// decision it wants and returns the resulting `rate`/`distortion`.
pub trait TbSplitAnalyser {
  #[allow(clippy::too_many_arguments)]
  fn analyze(
    &self,
    ctx_model: Box<dyn CabacContextTable>,
    input: &dyn ImageAccess,
    img: &mut dyn ImageAccessMut,
    parent: Option<&dyn EncTb>,
    cb: &mut CodingBlock,
    x0: i32,
    y0: i32,
    x_base: i32,
    y_base: i32,
    log2_tb_size: u32,
    blk_idx: usize,
    trafo_depth: u32,
    max_trafo_depth: u32,
    intra_split_flag: bool,
  ) -> Box<dyn EncTb>;
}

/// Size-indexed forward transform kernels (spec.md §6 "Acceleration
/// hooks"), used only by the SATD distortion metric (C5). `log2_blk_size`
/// ranges over 2..=5 (block sizes 4/8/16/32).
pub trait Accel {
  fn fwd_transform(&self, log2_blk_size: u32, diff: &Array2D<i32>) -> Array2D<i32>;
  fn hadamard_transform(&self, log2_blk_size: u32, diff: &Array2D<i32>) -> Array2D<i32>;
}
