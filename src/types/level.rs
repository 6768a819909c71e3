use serde::{Deserialize, Serialize};

/// Which side of price a level sits on, and therefore which kind of sweep
/// it can produce (a LOW level is swept downward, a HIGH level upward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelSide {
    High,
    Low,
}

/// Kind of reference price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKind {
    PrevDayHigh,
    PrevDayLow,
    SessionHigh,
    SessionLow,
    EqualHighs,
    EqualLows,
}

impl LevelKind {
    pub fn side(&self) -> LevelSide {
        match self {
            LevelKind::PrevDayHigh | LevelKind::SessionHigh | LevelKind::EqualHighs => {
                LevelSide::High
            }
            LevelKind::PrevDayLow | LevelKind::SessionLow | LevelKind::EqualLows => LevelSide::Low,
        }
    }

    /// Detection priority: daily levels first, then session, then equal
    /// clusters.
    pub fn priority(&self) -> u8 {
        match self {
            LevelKind::PrevDayHigh | LevelKind::PrevDayLow => 1,
            LevelKind::SessionHigh | LevelKind::SessionLow => 2,
            LevelKind::EqualHighs | LevelKind::EqualLows => 3,
        }
    }
}

/// A reference price level derived from historical candles.
///
/// Levels are recomputed on every analysis call and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub kind: LevelKind,
    pub price: f64,
    /// Human-readable label, e.g. "Prev Day Low" or "London Session High".
    pub label: String,
    /// 1 = daily, 2 = session, 3 = equal cluster.
    pub priority: u8,
}

impl Level {
    pub fn new(kind: LevelKind, price: f64, label: impl Into<String>) -> Self {
        Self {
            kind,
            price,
            label: label.into(),
            priority: kind.priority(),
        }
    }

    pub fn side(&self) -> LevelSide {
        self.kind.side()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_priority_ordering() {
        assert_eq!(LevelKind::PrevDayHigh.priority(), 1);
        assert_eq!(LevelKind::SessionLow.priority(), 2);
        assert_eq!(LevelKind::EqualHighs.priority(), 3);
    }

    #[test]
    fn test_level_side() {
        assert_eq!(LevelKind::PrevDayLow.side(), LevelSide::Low);
        assert_eq!(LevelKind::EqualHighs.side(), LevelSide::High);
        let level = Level::new(LevelKind::SessionHigh, 1.25, "NY Session High");
        assert_eq!(level.side(), LevelSide::High);
        assert_eq!(level.priority, 2);
    }
}
