//! Reference price level extraction.
//!
//! Produces previous-day highs/lows, session highs/lows and tolerance-based
//! equal-high/equal-low clusters from candle windows. Levels come back in
//! priority order (daily, then session, then equal clusters) so detection
//! can short-circuit on the per-instrument signal cap.

use chrono::{TimeZone, Timelike, Utc};

use crate::types::{Candle, Level, LevelKind};

/// A named trading session, defined by a half-open UTC hour window.
/// Wrapping windows (end <= start) are not supported.
#[derive(Debug, Clone, Copy)]
pub struct SessionWindow {
    pub name: &'static str,
    pub start_hour: u32,
    pub end_hour: u32,
}

/// Sessions checked for highs/lows, in scan order.
pub const SESSIONS: &[SessionWindow] = &[
    SessionWindow {
        name: "Asia",
        start_hour: 0,
        end_hour: 8,
    },
    SessionWindow {
        name: "London",
        start_hour: 7,
        end_hour: 16,
    },
    SessionWindow {
        name: "New York",
        start_hour: 12,
        end_hour: 21,
    },
];

/// How many of the most recent swing points per side feed the pairwise
/// equal-level pass. Bounded so the O(n^2) scan stays trivial.
const MAX_SWING_POINTS: usize = 10;

/// Extract all reference levels, priority-ordered.
pub fn extract_levels(
    analysis: &[Candle],
    daily: &[Candle],
    tolerance: f64,
    max_equal_levels: usize,
) -> Vec<Level> {
    let mut levels = Vec::new();

    if let Some((pdh, pdl)) = previous_day_levels(daily) {
        levels.push(pdh);
        levels.push(pdl);
    }

    for session in SESSIONS {
        if let Some((high, low)) = session_levels(analysis, session) {
            levels.push(high);
            levels.push(low);
        }
    }

    levels.extend(equal_levels(analysis, tolerance, max_equal_levels));

    levels
}

/// High/low of the second-to-last daily candle. The last daily candle may
/// still be forming and is excluded. Returns `None` under 2 daily candles.
pub fn previous_day_levels(daily: &[Candle]) -> Option<(Level, Level)> {
    if daily.len() < 2 {
        return None;
    }
    let prev = &daily[daily.len() - 2];
    Some((
        Level::new(LevelKind::PrevDayHigh, prev.high, "Prev Day High"),
        Level::new(LevelKind::PrevDayLow, prev.low, "Prev Day Low"),
    ))
}

/// Max high / min low over candles whose open time's UTC hour falls inside
/// the session window. `None` when no candle opens inside the window.
pub fn session_levels(candles: &[Candle], session: &SessionWindow) -> Option<(Level, Level)> {
    let mut high: Option<f64> = None;
    let mut low: Option<f64> = None;

    for candle in candles {
        let hour = Utc
            .timestamp_millis_opt(candle.open_time)
            .single()
            .map(|dt| dt.hour())?;
        if hour >= session.start_hour && hour < session.end_hour {
            high = Some(high.map_or(candle.high, |h: f64| h.max(candle.high)));
            low = Some(low.map_or(candle.low, |l: f64| l.min(candle.low)));
        }
    }

    match (high, low) {
        (Some(h), Some(l)) => Some((
            Level::new(
                LevelKind::SessionHigh,
                h,
                format!("{} Session High", session.name),
            ),
            Level::new(
                LevelKind::SessionLow,
                l,
                format!("{} Session Low", session.name),
            ),
        )),
        _ => None,
    }
}

/// Equal-high and equal-low clusters from local swing points.
pub fn equal_levels(candles: &[Candle], tolerance: f64, max_levels: usize) -> Vec<Level> {
    let highs = swing_points(candles, SwingSide::High);
    let lows = swing_points(candles, SwingSide::Low);

    let mut levels = Vec::new();
    for price in cluster_prices(&highs, tolerance, max_levels) {
        levels.push(Level::new(
            LevelKind::EqualHighs,
            price,
            format!("Equal Highs {:.5}", price),
        ));
    }
    for price in cluster_prices(&lows, tolerance, max_levels) {
        levels.push(Level::new(
            LevelKind::EqualLows,
            price,
            format!("Equal Lows {:.5}", price),
        ));
    }
    levels
}

#[derive(Clone, Copy, PartialEq)]
enum SwingSide {
    High,
    Low,
}

/// Local swing highs (lows): points strictly above (below) both neighbors
/// on each side within a +-2 candle window. Returns the most recent
/// `MAX_SWING_POINTS` prices, oldest first.
fn swing_points(candles: &[Candle], side: SwingSide) -> Vec<f64> {
    let mut points = Vec::new();
    if candles.len() < 5 {
        return points;
    }

    for i in 2..candles.len() - 2 {
        let is_swing = match side {
            SwingSide::High => {
                let h = candles[i].high;
                h > candles[i - 1].high
                    && h > candles[i - 2].high
                    && h > candles[i + 1].high
                    && h > candles[i + 2].high
            }
            SwingSide::Low => {
                let l = candles[i].low;
                l < candles[i - 1].low
                    && l < candles[i - 2].low
                    && l < candles[i + 1].low
                    && l < candles[i + 2].low
            }
        };
        if is_swing {
            let price = match side {
                SwingSide::High => candles[i].high,
                SwingSide::Low => candles[i].low,
            };
            points.push(price);
        }
    }

    if points.len() > MAX_SWING_POINTS {
        points.split_off(points.len() - MAX_SWING_POINTS)
    } else {
        points
    }
}

/// Pairwise cluster pass over a bounded swing-point set.
///
/// Any unordered pair whose relative difference (|a-b| / mean) is below
/// tolerance forms a cluster at the pair mean; cluster means that are
/// themselves within tolerance of an accepted cluster merge into it.
fn cluster_prices(points: &[f64], tolerance: f64, max_levels: usize) -> Vec<f64> {
    let mut accepted: Vec<f64> = Vec::new();

    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let (a, b) = (points[i], points[j]);
            let mean = (a + b) / 2.0;
            if mean <= 0.0 {
                continue;
            }
            if (a - b).abs() / mean < tolerance {
                let duplicate = accepted
                    .iter()
                    .any(|&c| (c - mean).abs() / ((c + mean) / 2.0) < tolerance);
                if !duplicate {
                    accepted.push(mean);
                }
            }
        }
    }

    accepted.truncate(max_levels);
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open_time: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            open_time,
            open,
            high,
            low,
            close,
        }
    }

    fn quiet_candle(open_time: i64, mid: f64) -> Candle {
        candle(open_time, mid, mid + 0.0002, mid - 0.0002, mid)
    }

    /// Millis timestamp at the given UTC hour of an arbitrary day.
    fn at_hour(hour: i64) -> i64 {
        // 2024-01-02 00:00:00 UTC
        1_704_153_600_000 + hour * 3_600_000
    }

    #[test]
    fn test_previous_day_levels_exclude_forming_candle() {
        let daily = vec![
            candle(0, 1.09, 1.10, 1.08, 1.095),
            candle(1, 1.095, 1.1050, 1.1000, 1.1020),
            // Last candle is in-progress and must be ignored.
            candle(2, 1.1020, 1.2000, 1.0000, 1.1100),
        ];
        let (pdh, pdl) = previous_day_levels(&daily).unwrap();
        assert_eq!(pdh.price, 1.1050);
        assert_eq!(pdl.price, 1.1000);
        assert_eq!(pdh.kind, LevelKind::PrevDayHigh);
        assert_eq!(pdl.priority, 1);
    }

    #[test]
    fn test_previous_day_levels_need_two_candles() {
        assert!(previous_day_levels(&[candle(0, 1.0, 1.1, 0.9, 1.0)]).is_none());
        assert!(previous_day_levels(&[]).is_none());
    }

    #[test]
    fn test_session_levels_half_open_window() {
        let session = SessionWindow {
            name: "London",
            start_hour: 7,
            end_hour: 16,
        };
        let candles = vec![
            candle(at_hour(6), 1.10, 1.30, 1.00, 1.10), // before the window
            candle(at_hour(7), 1.10, 1.12, 1.09, 1.11),
            candle(at_hour(15), 1.11, 1.13, 1.08, 1.10),
            candle(at_hour(16), 1.10, 1.40, 0.90, 1.10), // end hour excluded
        ];
        let (high, low) = session_levels(&candles, &session).unwrap();
        assert_eq!(high.price, 1.13);
        assert_eq!(low.price, 1.08);
        assert_eq!(high.label, "London Session High");
    }

    #[test]
    fn test_session_levels_none_when_no_candles_in_window() {
        let session = SessionWindow {
            name: "Asia",
            start_hour: 0,
            end_hour: 8,
        };
        let candles = vec![candle(at_hour(12), 1.10, 1.12, 1.09, 1.11)];
        assert!(session_levels(&candles, &session).is_none());
    }

    #[test]
    fn test_equal_highs_merge_into_one_cluster() {
        // Two swing highs at 1.2000 and 1.2001: relative diff well below
        // tolerance, so exactly one merged cluster must come out.
        let mut candles: Vec<Candle> = (0..20)
            .map(|i| quiet_candle(at_hour(i), 1.1900))
            .collect();
        candles[5] = candle(at_hour(5), 1.1900, 1.2000, 1.1898, 1.1902);
        candles[12] = candle(at_hour(12), 1.1900, 1.2001, 1.1898, 1.1902);

        let levels = equal_levels(&candles, 0.0005, 3);
        let highs: Vec<&Level> = levels
            .iter()
            .filter(|l| l.kind == LevelKind::EqualHighs)
            .collect();
        assert_eq!(highs.len(), 1);
        assert!((highs[0].price - 1.20005).abs() < 1e-9);
    }

    #[test]
    fn test_equal_levels_respect_cap() {
        let mut candles: Vec<Candle> = (0..40)
            .map(|i| quiet_candle(at_hour(i), 1.1900))
            .collect();
        // Three separated pairs of near-equal swing highs.
        for (offset, price) in [(4usize, 1.2000), (14, 1.2100), (24, 1.2200)] {
            candles[offset] = candle(at_hour(offset as i64), 1.19, price, 1.1898, 1.1902);
            candles[offset + 4] = candle(
                at_hour(offset as i64 + 4),
                1.19,
                price + 0.00001,
                1.1898,
                1.1902,
            );
        }

        let levels = equal_levels(&candles, 0.0005, 2);
        let highs = levels
            .iter()
            .filter(|l| l.kind == LevelKind::EqualHighs)
            .count();
        assert_eq!(highs, 2);
    }

    #[test]
    fn test_extract_levels_priority_order() {
        let daily = vec![
            candle(0, 1.09, 1.10, 1.08, 1.095),
            candle(1, 1.095, 1.1050, 1.1000, 1.1020),
            candle(2, 1.1020, 1.1100, 1.1010, 1.1080),
        ];
        let analysis: Vec<Candle> = (0..30)
            .map(|i| quiet_candle(at_hour(i % 24), 1.1020))
            .collect();

        let levels = extract_levels(&analysis, &daily, 0.0005, 3);
        assert!(!levels.is_empty());
        let priorities: Vec<u8> = levels.iter().map(|l| l.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort_unstable();
        assert_eq!(priorities, sorted, "levels must come out priority-ordered");
        assert_eq!(levels[0].kind, LevelKind::PrevDayHigh);
    }
}
