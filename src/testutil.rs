// Shared test fixture (SPEC_FULL.md §A4 / §8): a flat in-memory picture
// with one slice, one tile, and a trivial "transform-free" `EncTb` so
// mode-search tests can check real RD ordering without depending on an
// external transform coder.
//
// Grounded in style on h263-rs-yuv's test-only fixtures (plain structs
// built directly in `#[cfg(test)]`, no mocking framework).

use crate::array2d::Array2D;
use crate::distortion::ssd;
use crate::external::{Accel, CabacContextTable, CodingBlock, EncTb, ImageAccess, ImageAccessMut, TbSplitAnalyser};
use crate::mode::{IntraMode, PredMode};
use crate::params::{PictureParams, SequenceParams};

/// Initialises `env_logger` for the calling test, capturing the A2 `log`
/// call sites (border fill, smoothing decision, mode-search winner) so
/// `cargo test -- --nocapture` can surface them. Idempotent across tests.
pub fn init_test_logging() {
  let _ = env_logger::builder().is_test(true).filter_level(log::LevelFilter::Trace).try_init();
}

pub struct FlatImage {
  pub width: i32,
  pub height: i32,
  pub luma: Array2D<u8>,
  pub intra_modes: Vec<IntraMode>,
  pub sps: SequenceParams,
  pub pps: PictureParams,
}

impl FlatImage {
  pub fn new(width: i32, height: i32) -> Self {
    let log2_min_tb = 2;
    let pic_width_in_min_pus = width >> log2_min_tb;
    let pic_height_in_min_pus = height >> log2_min_tb;
    let pic_width_in_tbs = pic_width_in_min_pus;
    let pic_height_in_tbs = pic_height_in_min_pus;
    let pic_width_in_ctbs = (width + 63) / 64;
    let pic_height_in_ctbs = (height + 63) / 64;

    let mut min_tb_addr_zs = vec![0; (pic_width_in_tbs * pic_height_in_tbs) as usize];
    for y in 0..pic_height_in_tbs {
      for x in 0..pic_width_in_tbs {
        min_tb_addr_zs[(x + y * pic_width_in_tbs) as usize] = x + y * pic_width_in_tbs;
      }
    }

    let sps = SequenceParams {
      log2_ctb_size_y: 6,
      log2_min_trafo_size: log2_min_tb as u32,
      pic_width_in_ctbs_y: pic_width_in_ctbs,
      pic_width_in_min_pus,
      pic_width_in_tbs_y: pic_width_in_tbs,
      pic_width_in_luma_samples: width,
      pic_height_in_luma_samples: height,
      bit_depth_luma: 8,
      strong_intra_smoothing_enable_flag: true,
    };
    let pps = PictureParams {
      constrained_intra_pred_flag: false,
      tile_id_rs: vec![0; (pic_width_in_ctbs * pic_height_in_ctbs) as usize],
      min_tb_addr_zs,
    };

    Self {
      width,
      height,
      luma: Array2D::zeroed(height as usize, width as usize),
      intra_modes: vec![IntraMode::DC; (pic_width_in_min_pus * pic_height_in_min_pus) as usize],
      sps,
      pps,
    }
  }
}

impl ImageAccess for FlatImage {
  fn get_image_plane_at_pos(&self, _c_idx: usize, x: i32, y: i32) -> u8 {
    if x < 0 || y < 0 || x >= self.width || y >= self.height {
      return 128;
    }
    self.luma[y as usize][x as usize]
  }

  fn get_image_stride(&self, _c_idx: usize) -> usize {
    self.width as usize
  }

  fn get_pred_mode(&self, _x: i32, _y: i32) -> PredMode {
    PredMode::Intra
  }

  fn get_pcm_flag(&self, _x: i32, _y: i32) -> bool {
    false
  }

  fn get_slice_addr_rs(&self, _ctb_x: i32, _ctb_y: i32) -> i32 {
    0
  }

  fn get_intra_pred_mode_at_index(&self, pu_idx: i32) -> IntraMode {
    if pu_idx < 0 || pu_idx as usize >= self.intra_modes.len() {
      IntraMode::DC
    } else {
      self.intra_modes[pu_idx as usize]
    }
  }

  fn sps(&self) -> &SequenceParams {
    &self.sps
  }

  fn pps(&self) -> &PictureParams {
    &self.pps
  }
}

impl ImageAccessMut for FlatImage {
  fn set_image_plane_at_pos(&mut self, _c_idx: usize, x: i32, y: i32, value: u8) {
    if x >= 0 && y >= 0 && x < self.width && y < self.height {
      self.luma[y as usize][x as usize] = value;
    }
  }

  fn set_intra_pred_mode(&mut self, x: i32, y: i32, _log2_tb_size: u32, mode: IntraMode) {
    let min_tb = 1i32 << 2;
    let pu_idx = (x / min_tb) + (y / min_tb) * self.sps.pic_width_in_min_pus;
    if pu_idx >= 0 && (pu_idx as usize) < self.intra_modes.len() {
      self.intra_modes[pu_idx as usize] = mode;
    }
  }
}

/// A transform-free `EncTb`: its distortion is SSD or SAD against the
/// source block (no residual coding), and its rate is a small fixed
/// per-block overhead. `reconstruct` is a no-op since `decode_intra_prediction`
/// already wrote the prediction into the image.
pub struct TestEncTb {
  pub rate: f32,
  pub distortion: f32,
}

impl EncTb for TestEncTb {
  fn rate(&self) -> f32 {
    self.rate
  }

  fn distortion(&self) -> f32 {
    self.distortion
  }

  fn reconstruct(
    &self,
    _accel: &dyn Accel,
    _img: &mut dyn ImageAccessMut,
    _x0: i32,
    _y0: i32,
    _x_base: i32,
    _y_base: i32,
    _cb: &mut CodingBlock,
    _blk_idx: usize,
  ) {
  }
}

pub struct TestCabacContext;

impl CabacContextTable for TestCabacContext {
  fn clone_table(&self) -> Box<dyn CabacContextTable> {
    Box::new(TestCabacContext)
  }

  fn rd_bits_for_prev_intra_luma_pred_flag(&self, _bin: u8) -> f32 {
    1.0
  }
}

/// A source block against which candidate predictions are scored. Drives
/// `TbSplitAnalyser::analyze`'s distortion/rate without any real transform.
pub struct TestTbSplitAnalyser {
  pub source: Array2D<u8>,
  pub fixed_rate: f32,
}

impl TbSplitAnalyser for TestTbSplitAnalyser {
  #[allow(clippy::too_many_arguments)]
  fn analyze(
    &self,
    _ctx_model: Box<dyn CabacContextTable>,
    _input: &dyn ImageAccess,
    img: &mut dyn ImageAccessMut,
    _parent: Option<&dyn EncTb>,
    _cb: &mut CodingBlock,
    x0: i32,
    y0: i32,
    _x_base: i32,
    _y_base: i32,
    _log2_tb_size: u32,
    _blk_idx: usize,
    _trafo_depth: u32,
    _max_trafo_depth: u32,
    _intra_split_flag: bool,
  ) -> Box<dyn EncTb> {
    let nt = self.source.rows();
    let mut predicted = Array2D::<u8>::zeroed(nt, nt);
    for y in 0..nt {
      for x in 0..nt {
        predicted[y][x] = img.get_image_plane_at_pos(0, x0 + x as i32, y0 + y as i32);
      }
    }
    let distortion = ssd(&self.source, &predicted) as f32;
    Box::new(TestEncTb { rate: self.fixed_rate, distortion })
  }
}
