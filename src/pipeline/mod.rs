//! Signal detection pipeline.
//!
//! Level extraction, volatility estimation, bias classification, sweep
//! detection, trade candidate construction and scoring. Everything here is
//! pure over candle windows; the scanner service owns fetching, caching and
//! scheduling.

pub mod atr;
pub mod bias;
pub mod builder;
pub mod levels;
pub mod scorer;
pub mod sweep;

pub use atr::average_true_range;
pub use bias::classify_bias;
pub use builder::{build_signal, pip_size, round_to_pip};
pub use levels::{extract_levels, SessionWindow, SESSIONS};
pub use scorer::score_signal;
pub use sweep::{detect_sweep, find_fvg};
