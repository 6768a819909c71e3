//! Average True Range volatility estimate.

use crate::types::Candle;

/// Compute the ATR over the trailing `period` candles.
///
/// TR_i = max(high-low, |high-prev_close|, |low-prev_close|); the ATR is the
/// plain mean of the last `period` true ranges. Returns `None` when fewer
/// than `period + 1` candles are available; callers must treat that as
/// "volatility unknown" and suppress displacement and stop-sizing logic.
pub fn average_true_range(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period + 1 {
        return None;
    }

    let start = candles.len() - period;
    let mut sum = 0.0;
    for i in start..candles.len() {
        sum += true_range(&candles[i], &candles[i - 1]);
    }

    Some(sum / period as f64)
}

fn true_range(current: &Candle, previous: &Candle) -> f64 {
    let hl = current.high - current.low;
    let hc = (current.high - previous.close).abs();
    let lc = (current.low - previous.close).abs();
    hl.max(hc).max(lc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_candles(count: usize, range: f64) -> Vec<Candle> {
        (0..count)
            .map(|i| Candle {
                open_time: 1_700_000_000_000 + i as i64 * 900_000,
                open: 1.1000,
                high: 1.1000 + range / 2.0,
                low: 1.1000 - range / 2.0,
                close: 1.1000,
            })
            .collect()
    }

    #[test]
    fn test_atr_insufficient_data_is_none() {
        let candles = flat_candles(14, 0.0010);
        assert_eq!(average_true_range(&candles, 14), None);
        assert_eq!(average_true_range(&[], 14), None);
    }

    #[test]
    fn test_atr_exact_minimum_window() {
        let candles = flat_candles(15, 0.0010);
        let atr = average_true_range(&candles, 14).unwrap();
        assert!((atr - 0.0010).abs() < 1e-12);
    }

    #[test]
    fn test_atr_never_negative() {
        let candles = flat_candles(40, 0.0020);
        let atr = average_true_range(&candles, 14).unwrap();
        assert!(atr >= 0.0);
    }

    #[test]
    fn test_atr_uses_gap_to_previous_close() {
        // A gap between closes must widen the true range beyond high-low.
        let mut candles = flat_candles(15, 0.0010);
        let last = candles.len() - 1;
        candles[last].open = 1.1100;
        candles[last].high = 1.1105;
        candles[last].low = 1.1095;
        candles[last].close = 1.1100;

        let atr = average_true_range(&candles, 14).unwrap();
        // 13 ranges of 0.0010 plus one gap TR of |1.1105 - 1.1000| = 0.0105.
        let expected = (13.0 * 0.0010 + 0.0105) / 14.0;
        assert!((atr - expected).abs() < 1e-9);
    }

    #[test]
    fn test_atr_zero_period_is_none() {
        let candles = flat_candles(20, 0.0010);
        assert_eq!(average_true_range(&candles, 0), None);
    }
}
