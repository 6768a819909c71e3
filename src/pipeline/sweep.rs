//! Liquidity sweep detection.
//!
//! A sweep is a brief excursion through a reference level followed by a
//! reversal close back on the original side. Detection scans consecutive
//! candle pairs in the most recent part of the window and returns the
//! earliest confirming pair, not the best one.

use crate::types::{Candle, Direction, DisplacementStrength, FairValueGap, Level, LevelSide,
    SweepEvent};

/// How many trailing candles the pair scan examines.
const SWEEP_WINDOW: usize = 5;

/// Scan the last candles of `candles` for a sweep of `level`.
///
/// For a LOW-side level the pattern is: either candle of a consecutive pair
/// pierces below the level, and the later candle closes back above it with
/// a bullish body. HIGH-side is the mirror with a bearish confirmation.
/// `atr` feeds displacement classification only; when unknown, strength
/// degrades to None.
pub fn detect_sweep(candles: &[Candle], level: &Level, atr: Option<f64>) -> Option<SweepEvent> {
    if candles.len() < 2 {
        return None;
    }

    let start = candles.len().saturating_sub(SWEEP_WINDOW);
    let window = &candles[start..];

    for pair in window.windows(2) {
        let (first, second) = (&pair[0], &pair[1]);

        let confirmed = match level.side() {
            LevelSide::Low => {
                (first.low < level.price || second.low < level.price)
                    && second.close > level.price
                    && second.is_bullish()
            }
            LevelSide::High => {
                (first.high > level.price || second.high > level.price)
                    && second.close < level.price
                    && second.is_bearish()
            }
        };

        if !confirmed {
            continue;
        }

        let direction = match level.side() {
            LevelSide::Low => Direction::Long,
            LevelSide::High => Direction::Short,
        };
        let swept_extreme = match direction {
            Direction::Long => first.low.min(second.low),
            Direction::Short => first.high.max(second.high),
        };
        let (displacement, displacement_ratio) =
            DisplacementStrength::classify(second.body(), atr);

        return Some(SweepEvent {
            direction,
            breached_level: level.clone(),
            entry_price: second.close,
            swept_extreme,
            displacement,
            displacement_ratio,
            gap: find_fvg(candles, direction),
        });
    }

    None
}

/// Fair-value-gap check over the most recent 3 candles of the full window.
///
/// Compares the last candle against the one two back; the candle between
/// them is the displacement candle and is intentionally skipped. Bullish
/// imbalance: last low above the earlier high. Bearish: last high below the
/// earlier low.
pub fn find_fvg(candles: &[Candle], direction: Direction) -> Option<FairValueGap> {
    if candles.len() < 3 {
        return None;
    }
    let last = &candles[candles.len() - 1];
    let anchor = &candles[candles.len() - 3];

    match direction {
        Direction::Long if last.low > anchor.high => Some(FairValueGap {
            lower: anchor.high,
            upper: last.low,
        }),
        Direction::Short if last.high < anchor.low => Some(FairValueGap {
            lower: last.high,
            upper: anchor.low,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LevelKind;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            open_time: 0,
            open,
            high,
            low,
            close,
        }
    }

    fn quiet(mid: f64) -> Candle {
        candle(mid, mid + 0.0002, mid - 0.0002, mid)
    }

    fn pdl(price: f64) -> Level {
        Level::new(LevelKind::PrevDayLow, price, "Prev Day Low")
    }

    fn pdh(price: f64) -> Level {
        Level::new(LevelKind::PrevDayHigh, price, "Prev Day High")
    }

    #[test]
    fn test_long_sweep_of_prev_day_low() {
        // Pierce 1.1000 with a 1.0995 low, then a bullish close at 1.1010.
        let candles = vec![
            quiet(1.1012),
            quiet(1.1011),
            quiet(1.1010),
            candle(1.1008, 1.1009, 1.0995, 1.1002),
            candle(1.1002, 1.1012, 1.1000, 1.1010),
        ];
        let sweep = detect_sweep(&candles, &pdl(1.1000), Some(0.0010)).unwrap();
        assert_eq!(sweep.direction, Direction::Long);
        assert_eq!(sweep.entry_price, 1.1010);
        assert_eq!(sweep.swept_extreme, 1.0995);
        assert_eq!(sweep.breached_level.price, 1.1000);
    }

    #[test]
    fn test_short_sweep_of_prev_day_high() {
        let candles = vec![
            quiet(1.1040),
            quiet(1.1041),
            quiet(1.1042),
            candle(1.1044, 1.1055, 1.1043, 1.1048),
            candle(1.1048, 1.1050, 1.1038, 1.1040),
        ];
        let sweep = detect_sweep(&candles, &pdh(1.1050), Some(0.0010)).unwrap();
        assert_eq!(sweep.direction, Direction::Short);
        assert_eq!(sweep.entry_price, 1.1040);
        assert_eq!(sweep.swept_extreme, 1.1055);
    }

    #[test]
    fn test_no_sweep_without_reclaim_close() {
        // Pierces the level but keeps closing below it: no confirmation.
        let candles = vec![
            quiet(1.1010),
            quiet(1.1008),
            quiet(1.1005),
            candle(1.1003, 1.1004, 1.0995, 1.0997),
            candle(1.0997, 1.0999, 1.0994, 1.0996),
        ];
        assert!(detect_sweep(&candles, &pdl(1.1000), Some(0.0010)).is_none());
    }

    #[test]
    fn test_bearish_reclaim_is_not_confirmation() {
        // Closes back above the level but with a bearish body.
        let candles = vec![
            quiet(1.1010),
            quiet(1.1008),
            quiet(1.1005),
            candle(1.1003, 1.1004, 1.0995, 1.0997),
            candle(1.1012, 1.1013, 1.0999, 1.1005),
        ];
        assert!(detect_sweep(&candles, &pdl(1.1000), Some(0.0010)).is_none());
    }

    #[test]
    fn test_earliest_confirming_pair_wins() {
        // Two qualifying pairs in the window; the older one must be chosen.
        let candles = vec![
            candle(1.1005, 1.1006, 1.0995, 1.0998),
            candle(1.0998, 1.1010, 1.0997, 1.1008), // first confirmation
            quiet(1.1009),
            candle(1.1009, 1.1010, 1.0993, 1.0999),
            candle(1.0999, 1.1015, 1.0998, 1.1012), // later confirmation
        ];
        let sweep = detect_sweep(&candles, &pdl(1.1000), Some(0.0010)).unwrap();
        assert_eq!(sweep.entry_price, 1.1008);
        assert_eq!(sweep.swept_extreme, 1.0995);
    }

    #[test]
    fn test_sweep_outside_last_five_candles_ignored() {
        let mut candles = vec![
            candle(1.1005, 1.1006, 1.0995, 1.0998),
            candle(1.0998, 1.1010, 1.0997, 1.1008),
        ];
        // Five quiet candles push the sweep pair out of the window.
        candles.extend((0..5).map(|_| quiet(1.1009)));
        assert!(detect_sweep(&candles, &pdl(1.1000), Some(0.0010)).is_none());
    }

    #[test]
    fn test_displacement_degrades_without_atr() {
        let candles = vec![
            quiet(1.1010),
            quiet(1.1008),
            quiet(1.1005),
            candle(1.1003, 1.1004, 1.0995, 1.0997),
            candle(1.0997, 1.1030, 1.0996, 1.1028),
        ];
        let sweep = detect_sweep(&candles, &pdl(1.1000), None).unwrap();
        assert_eq!(sweep.displacement, DisplacementStrength::None);
        assert_eq!(sweep.displacement_ratio, 0.0);

        let strong = detect_sweep(&candles, &pdl(1.1000), Some(0.0010)).unwrap();
        assert_eq!(strong.displacement, DisplacementStrength::Strong);
        assert!(strong.displacement_ratio > 2.0);
    }

    #[test]
    fn test_bullish_fvg_skips_displacement_candle() {
        // Last low (1.1020) sits above the high two candles back (1.1010):
        // a bullish imbalance regardless of the middle candle's range.
        let candles = vec![
            quiet(1.1000),
            candle(1.1000, 1.1010, 1.0995, 1.1008),
            candle(1.1008, 1.1030, 1.1005, 1.1028),
            candle(1.1028, 1.1035, 1.1020, 1.1032),
        ];
        let gap = find_fvg(&candles, Direction::Long).unwrap();
        assert_eq!(gap.lower, 1.1010);
        assert_eq!(gap.upper, 1.1020);
        assert!(find_fvg(&candles, Direction::Short).is_none());
    }

    #[test]
    fn test_no_fvg_when_ranges_overlap() {
        let candles = vec![
            quiet(1.1000),
            candle(1.1000, 1.1025, 1.0995, 1.1020),
            candle(1.1020, 1.1030, 1.1005, 1.1028),
            candle(1.1028, 1.1035, 1.1018, 1.1032),
        ];
        assert!(find_fvg(&candles, Direction::Long).is_none());
    }
}
