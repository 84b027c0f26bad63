// Error taxonomy is intentionally minimal (see DESIGN.md / SPEC_FULL.md §7):
// programmer precondition violations inside the hot path stay `assert!` /
// `panic!`, since they indicate caller bugs rather than recoverable runtime
// conditions. `Error` exists only for the handful of configuration values
// that a caller can genuinely get wrong before any search runs.

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
  #[error("no intra modes are enabled in mPredMode_enabled; mode search would have nothing to try")]
  NoModesEnabled,

  #[error("keepNBest ({0}) must be nonzero for FastBrute")]
  KeepNBestZero(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
