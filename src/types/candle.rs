use serde::{Deserialize, Serialize};

/// One OHLC bucket for a single instrument and granularity.
///
/// Candle sequences are ordered oldest first; the last element is the most
/// recent (possibly still-forming) candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    /// Unix timestamp (milliseconds) of the bucket open.
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    /// Body size of the candle (absolute close-open distance).
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Whether the candle closed above its open.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Whether the candle closed below its open.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Candle granularity codes accepted by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Granularity {
    M5,
    #[default]
    M15,
    M30,
    H1,
    H4,
    D,
}

impl Granularity {
    /// Parse a granularity code. Case-insensitive.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "M5" => Some(Self::M5),
            "M15" => Some(Self::M15),
            "M30" => Some(Self::M30),
            "H1" => Some(Self::H1),
            "H4" => Some(Self::H4),
            "D" | "D1" => Some(Self::D),
            _ => None,
        }
    }

    /// Wire code used when requesting candles upstream.
    pub fn code(&self) -> &'static str {
        match self {
            Self::M5 => "M5",
            Self::M15 => "M15",
            Self::M30 => "M30",
            Self::H1 => "H1",
            Self::H4 => "H4",
            Self::D => "D",
        }
    }

    /// All granularity codes accepted at the API boundary.
    pub fn allowed() -> &'static [&'static str] {
        &["M5", "M15", "M30", "H1", "H4", "D"]
    }

    /// Coarser granularity used for higher-timeframe bias classification.
    pub fn htf(&self) -> Granularity {
        match self {
            Self::M5 => Self::H1,
            Self::M15 => Self::H4,
            Self::M30 => Self::H4,
            Self::H1 => Self::D,
            Self::H4 => Self::D,
            Self::D => Self::D,
        }
    }
}
