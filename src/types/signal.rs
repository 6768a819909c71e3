use serde::{Deserialize, Serialize};

use crate::types::{Granularity, Level};

/// Trade direction of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "long" | "buy" => Some(Self::Long),
            "short" | "sell" => Some(Self::Short),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }
}

/// Strength of the displacement candle relative to ATR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplacementStrength {
    None,
    Weak,
    Normal,
    Strong,
}

impl DisplacementStrength {
    /// Classify candle body size against ATR. Unknown ATR means strength
    /// cannot be judged and degrades to None.
    pub fn classify(body: f64, atr: Option<f64>) -> (Self, f64) {
        let atr = match atr {
            Some(a) if a > 0.0 => a,
            _ => return (Self::None, 0.0),
        };
        let ratio = body / atr;
        let strength = if ratio > 2.0 {
            Self::Strong
        } else if ratio > 1.5 {
            Self::Normal
        } else if ratio > 1.0 {
            Self::Weak
        } else {
            Self::None
        };
        (strength, ratio)
    }
}

/// Higher-timeframe directional bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HtfBias {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

/// Agreement between sweep direction and the higher-timeframe bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HtfConfluence {
    Aligned,
    Neutral,
    Against,
}

impl HtfConfluence {
    /// Aligned when the sweep direction agrees with a non-neutral bias,
    /// Against when it conflicts, Neutral when the bias itself is neutral.
    pub fn evaluate(direction: Direction, bias: HtfBias) -> Self {
        match (direction, bias) {
            (_, HtfBias::Neutral) => Self::Neutral,
            (Direction::Long, HtfBias::Bullish) | (Direction::Short, HtfBias::Bearish) => {
                Self::Aligned
            }
            _ => Self::Against,
        }
    }
}

/// Letter grade derived from the total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    D,
    C,
    B,
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Grade {
    /// Grade boundaries are closed above: exactly 90 grades A+, 89 grades A.
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 90 => Grade::APlus,
            s if s >= 80 => Grade::A,
            s if s >= 70 => Grade::B,
            s if s >= 60 => Grade::C,
            _ => Grade::D,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "A+" | "APLUS" => Some(Grade::APlus),
            "A" => Some(Grade::A),
            "B" => Some(Grade::B),
            "C" => Some(Grade::C),
            "D" => Some(Grade::D),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }
}

/// A 3-candle price imbalance (fair value gap).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairValueGap {
    /// Lower bound of the imbalance region.
    pub lower: f64,
    /// Upper bound of the imbalance region.
    pub upper: f64,
}

/// A detected level-breach-then-reversal pattern.
///
/// Produced and consumed within one instrument analysis; never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepEvent {
    pub direction: Direction,
    pub breached_level: Level,
    /// Close of the confirming candle.
    pub entry_price: f64,
    /// The extreme price of the sweep: lowest low of the pair for a LONG,
    /// highest high for a SHORT. Stops are sized beyond this.
    pub swept_extreme: f64,
    pub displacement: DisplacementStrength,
    /// Body size of the confirming candle divided by ATR (0 when unknown).
    pub displacement_ratio: f64,
    pub gap: Option<FairValueGap>,
}

/// Score detail for one grading criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionScore {
    pub name: String,
    pub points: i32,
    pub max: i32,
    pub reason: String,
}

/// Per-criterion audit trail for a signal's score.
///
/// The sum of criterion points (the news criterion may be negative) equals
/// the signal's total score. Used for explainability, not control flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub criteria: Vec<CriterionScore>,
    pub total: i32,
    pub grade: Grade,
}

/// A fully built, graded trade candidate.
///
/// Created fresh each scan and never mutated afterwards; the next scan's
/// signal for the same instrument supersedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub instrument: String,
    pub direction: Direction,
    /// Setup description, e.g. "Liquidity Sweep @ Prev Day Low".
    pub setup_label: String,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub tp1: f64,
    pub tp2: f64,
    pub runner: f64,
    pub reward_risk: f64,
    pub displacement: DisplacementStrength,
    pub has_gap: bool,
    pub htf_bias: HtfBias,
    pub htf_confluence: HtfConfluence,
    pub score: i32,
    pub grade: Grade,
    /// Priority of the swept level (1 = daily, 2 = session, 3 = equal).
    pub level_priority: u8,
    pub timeframe: Granularity,
    /// Unix timestamp (milliseconds) when the signal was built.
    pub timestamp: i64,
    pub breakdown: ScoreBreakdown,
}

impl Signal {
    /// Deduplication key: same instrument, direction and setup within the
    /// cooldown window are treated as one alert.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.instrument,
            self.direction.label(),
            self.setup_label
        )
    }
}
