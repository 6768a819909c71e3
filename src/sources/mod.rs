pub mod oanda;

pub use oanda::OandaClient;

use crate::types::{Candle, Granularity};

/// Source of OHLC candles for the pipeline.
///
/// The scanner is generic over this trait so tests can inject canned data
/// instead of a live upstream.
pub trait CandleSource: Send + Sync {
    /// Fetch the `count` most recent candles for an instrument at the given
    /// granularity, ordered oldest first. The last candle may still be
    /// forming.
    fn fetch_candles(
        &self,
        instrument: &str,
        granularity: Granularity,
        count: usize,
    ) -> impl std::future::Future<Output = anyhow::Result<Vec<Candle>>> + Send;
}
