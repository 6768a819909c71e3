//! Higher-timeframe bias classification.

use crate::types::{Candle, HtfBias};

const SMA_PERIOD: usize = 20;

/// Classify directional bias from a coarser candle window.
///
/// Compares the latest close to a 20-period SMA (2 points) and checks the
/// last 3 candles for strictly higher highs / higher lows (1 point each) or
/// strictly lower highs / lower lows (1 point each). Bull and bear points
/// accumulate in independent ledgers; a ledger reaching 3 decides the bias.
/// Under 20 candles the window is too short to judge and the bias is
/// Neutral. This is deliberately a coarse heuristic, not a trend indicator.
pub fn classify_bias(candles: &[Candle]) -> HtfBias {
    if candles.len() < SMA_PERIOD {
        return HtfBias::Neutral;
    }

    let sma: f64 = candles[candles.len() - SMA_PERIOD..]
        .iter()
        .map(|c| c.close)
        .sum::<f64>()
        / SMA_PERIOD as f64;

    // candles.len() >= 20, so the last-3 slice below always exists
    let latest = &candles[candles.len() - 1];
    let mut bull = 0u32;
    let mut bear = 0u32;

    if latest.close > sma {
        bull += 2;
    } else if latest.close < sma {
        bear += 2;
    }

    let last3 = &candles[candles.len() - 3..];
    let higher_highs = last3[1].high > last3[0].high && last3[2].high > last3[1].high;
    let higher_lows = last3[1].low > last3[0].low && last3[2].low > last3[1].low;
    let lower_highs = last3[1].high < last3[0].high && last3[2].high < last3[1].high;
    let lower_lows = last3[1].low < last3[0].low && last3[2].low < last3[1].low;

    if higher_highs {
        bull += 1;
    }
    if higher_lows {
        bull += 1;
    }
    if lower_highs {
        bear += 1;
    }
    if lower_lows {
        bear += 1;
    }

    if bull >= 3 {
        HtfBias::Bullish
    } else if bear >= 3 {
        HtfBias::Bearish
    } else {
        HtfBias::Neutral
    }
}
