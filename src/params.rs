// Sequence- and picture-level parameters (SPS/PPS, read-only per spec.md §3)
// plus the encoder's scalar search configuration (spec.md §6 "Scalar config").

use crate::consts::NUM_INTRA_MODES;
use crate::error::{Error, Result};

/// Sequence parameter set fields this crate reads. Read-only for the
/// lifetime of a sequence.
#[derive(Clone, Debug)]
pub struct SequenceParams {
  pub log2_ctb_size_y: u32,
  pub log2_min_trafo_size: u32,
  pub pic_width_in_ctbs_y: i32,
  pub pic_width_in_min_pus: i32,
  pub pic_width_in_tbs_y: i32,
  pub pic_width_in_luma_samples: i32,
  pub pic_height_in_luma_samples: i32,
  pub bit_depth_luma: u32,
  pub strong_intra_smoothing_enable_flag: bool,
}

/// Picture parameter set fields this crate reads.
#[derive(Clone, Debug)]
pub struct PictureParams {
  pub constrained_intra_pred_flag: bool,
  /// Tile id per CTB, indexed by raster-scan CTB address.
  pub tile_id_rs: Vec<i32>,
  /// z-scan address per min-TB, indexed by raster-scan min-TB address.
  pub min_tb_addr_zs: Vec<i32>,
}

impl PictureParams {
  pub fn tile_id_at(&self, ctb_x: i32, ctb_y: i32, pic_width_in_ctbs: i32) -> i32 {
    self.tile_id_rs[(ctb_x + ctb_y * pic_width_in_ctbs) as usize]
  }

  pub fn min_tb_addr_zs_at(&self, tb_x: i32, tb_y: i32, pic_width_in_tbs: i32) -> i32 {
    self.min_tb_addr_zs[(tb_x + tb_y * pic_width_in_tbs) as usize]
  }
}

/// Distortion proxy used by the cheap residual-metric mode-search paths
/// (`MinResidual`, the pre-filter stage of `FastBrute`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BitrateEstimMethod {
  Ssd,
  Sad,
  SatdDct,
  SatdHadamard,
}

/// Scalar search configuration (spec.md §6): the RD multiplier, the
/// enabled-mode mask, FastBrute's shortlist size, and the residual metric
/// used by MinResidual/FastBrute.
#[derive(Clone, Debug)]
pub struct SearchParams {
  pub lambda: f32,
  mode_enabled: [bool; NUM_INTRA_MODES],
  pub keep_n_best: usize,
  pub bitrate_estim_method: BitrateEstimMethod,
}

impl SearchParams {
  pub fn new(
    lambda: f32,
    mode_enabled: [bool; NUM_INTRA_MODES],
    keep_n_best: usize,
    bitrate_estim_method: BitrateEstimMethod,
  ) -> Result<Self> {
    if !mode_enabled.iter().any(|&e| e) {
      return Err(Error::NoModesEnabled);
    }
    if keep_n_best == 0 {
      return Err(Error::KeepNBestZero(keep_n_best));
    }
    Ok(Self { lambda, mode_enabled, keep_n_best, bitrate_estim_method })
  }

  /// All 35 modes enabled, lambda and keepNBest supplied by the caller.
  pub fn all_modes_enabled(lambda: f32, keep_n_best: usize, method: BitrateEstimMethod) -> Result<Self> {
    Self::new(lambda, [true; NUM_INTRA_MODES], keep_n_best, method)
  }

  pub fn is_mode_enabled(&self, mode: crate::mode::IntraMode) -> bool {
    self.mode_enabled[mode.value() as usize]
  }
}
