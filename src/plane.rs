// Image plane storage (spec.md §3 "Image plane").
//
// Grounded on nekotrix-tinyavif::frame::{Plane, Frame}, generalized from a
// fixed YUV 4:2:0 triple used only for reading a y4m file into the
// general-purpose raster this crate's `ImageAccess` trait is built around.

use crate::array2d::Array2D;
use crate::external::{ImageAccess, ImageAccessMut};
use crate::mode::{IntraMode, PredMode};
use crate::params::{PictureParams, SequenceParams};

/// A single 8-bit sample plane. The backing `Array2D` is always fully
/// packed (stride == width), which trivially satisfies the data model's
/// "stride >= width" invariant.
#[derive(Clone)]
pub struct Plane {
  pixels: Array2D<u8>,
}

impl Plane {
  pub fn new(width: usize, height: usize) -> Self {
    let mut pixels = Array2D::zeroed(height, width);
    pixels.fill_with(|_, _| 128u8);
    Self { pixels }
  }

  pub fn width(&self) -> usize {
    self.pixels.cols()
  }

  pub fn height(&self) -> usize {
    self.pixels.rows()
  }

  pub fn stride(&self) -> usize {
    self.pixels.cols()
  }

  pub fn pixels(&self) -> &Array2D<u8> {
    &self.pixels
  }

  pub fn pixels_mut(&mut self) -> &mut Array2D<u8> {
    &mut self.pixels
  }

  pub fn get(&self, x: i32, y: i32) -> u8 {
    self.pixels[y as usize][x as usize]
  }

  pub fn set(&mut self, x: i32, y: i32, value: u8) {
    self.pixels[y as usize][x as usize] = value;
  }

  pub fn in_bounds(&self, x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && (x as usize) < self.width() && (y as usize) < self.height()
  }
}

/// Three planes (Y, Cb, Cr); chroma planes are half-width/half-height, the
/// 4:2:0 case spec.md §3 says is the one implemented here.
///
/// `Picture` is the crate's own concrete `ImageAccess`/`ImageAccessMut`
/// implementor: a single-slice, single-tile, all-intra picture (inter
/// prediction and multi-slice/tile pictures are out of scope per spec.md
/// §1). A caller embedding this crate into a decoder with its own picture
/// buffer and slice/tile structure implements the traits directly instead.
#[derive(Clone)]
pub struct Picture {
  planes: [Plane; 3],
  sps: SequenceParams,
  pps: PictureParams,
  intra_modes: Vec<IntraMode>,
}

impl Picture {
  pub fn new(sps: SequenceParams) -> Self {
    let luma_width = sps.pic_width_in_luma_samples as usize;
    let luma_height = sps.pic_height_in_luma_samples as usize;
    let chroma_width = luma_width.div_ceil(2);
    let chroma_height = luma_height.div_ceil(2);

    let pic_width_in_ctbs = sps.pic_width_in_ctbs_y as usize;
    let pic_height_in_ctbs = luma_height.div_ceil(1usize << sps.log2_ctb_size_y);
    let pic_height_in_min_pus = luma_height >> sps.log2_min_trafo_size;
    let pic_width_in_min_pus = sps.pic_width_in_min_pus as usize;

    let min_tb_addr_zs = (0..(sps.pic_width_in_tbs_y as usize * (luma_height >> sps.log2_min_trafo_size)))
      .map(|i| i as i32)
      .collect();
    let pps = PictureParams { constrained_intra_pred_flag: false, tile_id_rs: vec![0; pic_width_in_ctbs * pic_height_in_ctbs], min_tb_addr_zs };

    Self {
      planes: [
        Plane::new(luma_width, luma_height),
        Plane::new(chroma_width, chroma_height),
        Plane::new(chroma_width, chroma_height),
      ],
      sps,
      pps,
      intra_modes: vec![IntraMode::DC; pic_width_in_min_pus * pic_height_in_min_pus],
    }
  }

  pub fn plane(&self, c_idx: usize) -> &Plane {
    &self.planes[c_idx]
  }

  pub fn plane_mut(&mut self, c_idx: usize) -> &mut Plane {
    &mut self.planes[c_idx]
  }

  pub fn y(&self) -> &Plane {
    &self.planes[0]
  }

  pub fn y_mut(&mut self) -> &mut Plane {
    &mut self.planes[0]
  }
}

impl ImageAccess for Picture {
  fn get_image_plane_at_pos(&self, c_idx: usize, x: i32, y: i32) -> u8 {
    self.planes[c_idx].get(x, y)
  }

  fn get_image_stride(&self, c_idx: usize) -> usize {
    self.planes[c_idx].stride()
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

impl ImageAccessMut for Picture {
  fn set_image_plane_at_pos(&mut self, c_idx: usize, x: i32, y: i32, value: u8) {
    self.planes[c_idx].set(x, y, value);
  }

  fn set_intra_pred_mode(&mut self, x: i32, y: i32, _log2_tb_size: u32, mode: IntraMode) {
    let min_tb = 1i32 << self.sps.log2_min_trafo_size;
    let pu_idx = (x / min_tb) + (y / min_tb) * self.sps.pic_width_in_min_pus;
    if pu_idx >= 0 && (pu_idx as usize) < self.intra_modes.len() {
      self.intra_modes[pu_idx as usize] = mode;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sps(width: i32, height: i32) -> SequenceParams {
    let log2_min_tb = 2;
    SequenceParams {
      log2_ctb_size_y: 6,
      log2_min_trafo_size: log2_min_tb,
      pic_width_in_ctbs_y: (width + 63) / 64,
      pic_width_in_min_pus: width >> log2_min_tb,
      pic_width_in_tbs_y: width >> log2_min_tb,
      pic_width_in_luma_samples: width,
      pic_height_in_luma_samples: height,
      bit_depth_luma: 8,
      strong_intra_smoothing_enable_flag: true,
    }
  }

  #[test]
  fn chroma_planes_are_half_size() {
    let pic = Picture::new(sps(64, 32));
    assert_eq!(pic.y().width(), 64);
    assert_eq!(pic.y().height(), 32);
    assert_eq!(pic.plane(1).width(), 32);
    assert_eq!(pic.plane(1).height(), 16);
  }

  #[test]
  fn new_plane_is_neutral_grey() {
    let plane = Plane::new(4, 4);
    assert_eq!(plane.get(0, 0), 128);
    assert_eq!(plane.get(3, 3), 128);
  }

  #[test]
  fn set_and_get_image_plane_round_trips() {
    let mut pic = Picture::new(sps(64, 64));
    pic.set_image_plane_at_pos(0, 10, 20, 200);
    assert_eq!(pic.get_image_plane_at_pos(0, 10, 20), 200);
  }

  #[test]
  fn set_intra_pred_mode_is_readable_back_by_pu_idx() {
    let mut pic = Picture::new(sps(64, 64));
    pic.set_intra_pred_mode(8, 4, 2, IntraMode::new(12));
    let pu_idx = (8 / 4) + (4 / 4) * pic.sps.pic_width_in_min_pus;
    assert_eq!(pic.get_intra_pred_mode_at_index(pu_idx), IntraMode::new(12));
  }
}
