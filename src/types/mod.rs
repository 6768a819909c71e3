pub mod candle;
pub mod level;
pub mod scan;
pub mod signal;

pub use candle::*;
pub use level::*;
pub use scan::*;
pub use signal::*;
