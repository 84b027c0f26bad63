//! HEVC/H.265 intra-prediction core and encoder-side intra mode search.
//!
//! The public surface is organised the way the spec's module list reads:
//! neighbour/border handling (C1), reference sample smoothing (C2),
//! prediction kernels (C3), MPM derivation (C4), distortion metrics (C5),
//! and mode-search strategies (C6), all sitting on top of the external
//! collaborator traits in [`external`].

pub mod accel;
pub mod array2d;
pub mod border;
pub mod consts;
pub mod distortion;
pub mod error;
pub mod external;
pub mod mode;
pub mod mode_search;
pub mod mpm;
pub mod params;
pub mod plane;
pub mod predict;
pub mod smoothing;
pub mod util;

#[cfg(test)]
pub mod testutil;

pub use error::{Error, Result};
pub use external::{Accel, CabacContextTable, CodingBlock, EncTb, ImageAccess, ImageAccessMut, PartMode, TbSplitAnalyser};
pub use mode::{IntraMode, PredMode};
pub use mode_search::{should_search, BruteForce, FastBrute, MinResidual, TrialContext};
pub use params::{BitrateEstimMethod, PictureParams, SearchParams, SequenceParams};
pub use plane::{Picture, Plane};
pub use predict::decode_intra_prediction;
