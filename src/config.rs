use std::env;

use serde::{Deserialize, Serialize};

use crate::types::{Direction, Grade, Granularity};

/// Default instrument universe scanned every cycle.
pub const DEFAULT_INSTRUMENTS: &[&str] = &[
    "EUR_USD", "GBP_USD", "USD_JPY", "AUD_USD", "USD_CAD", "NZD_USD", "USD_CHF", "EUR_GBP",
    "EUR_JPY", "GBP_JPY",
];

/// Per-scan pipeline configuration.
///
/// One parameterized pipeline replaces the forked per-variant analysis
/// functions of older scanners; every knob is an explicit field here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanConfig {
    /// Analysis candle granularity.
    pub timeframe: Granularity,
    /// Minimum reward:risk; candidates strictly below are discarded,
    /// equality is kept.
    pub min_rr: f64,
    /// Per-instrument signal cap; level iteration short-circuits once met.
    pub max_signals_per_instrument: usize,
    /// Required body/ATR ratio when `require_displacement` is set.
    pub displacement_multiple: f64,
    pub require_displacement: bool,
    pub require_fvg: bool,
    /// Only emit signals in this direction when set.
    pub direction_filter: Option<Direction>,
    /// Discard candidates whose sweep direction conflicts with a
    /// non-neutral higher-timeframe bias.
    pub require_htf_confluence: bool,
    /// Signals grading below this floor are dropped.
    pub min_grade: Grade,
    /// Manually set news bias; feeds the scorer, nothing else.
    pub news_bias: Option<Direction>,
    /// ATR lookback period.
    pub atr_period: usize,
    /// Relative price tolerance for equal-high/equal-low clustering.
    pub equal_level_tolerance: f64,
    /// Maximum equal-level clusters kept per side.
    pub max_equal_levels: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeframe: Granularity::M15,
            min_rr: 2.0,
            max_signals_per_instrument: 2,
            displacement_multiple: 1.5,
            require_displacement: false,
            require_fvg: false,
            direction_filter: None,
            require_htf_confluence: false,
            min_grade: Grade::C,
            news_bias: None,
            atr_period: 14,
            equal_level_tolerance: 0.0005,
            max_equal_levels: 3,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// OANDA-compatible candle API base URL.
    pub candle_api_url: String,
    /// OANDA API key.
    pub candle_api_key: Option<String>,
    /// Telegram bot token for signal alerts.
    pub telegram_bot_token: Option<String>,
    /// Seconds between scheduled scans.
    pub scan_interval_secs: u64,
    /// Instruments analyzed concurrently per batch.
    pub scan_batch_size: usize,
    /// Pause between batches (ms), for upstream rate limits.
    pub scan_batch_delay_ms: u64,
    /// Alert dedup cooldown (minutes) per (instrument, direction, setup).
    pub alert_cooldown_mins: i64,
    /// Freshness TTL of a cached scan result (seconds).
    pub result_cache_ttl_secs: i64,
    /// Pause between notification sends (ms).
    pub notify_delay_ms: u64,
    /// Number of analysis-timeframe candles fetched per instrument.
    pub analysis_candle_count: usize,
    /// Number of daily candles fetched per instrument.
    pub daily_candle_count: usize,
    /// Number of higher-timeframe candles fetched per instrument.
    pub htf_candle_count: usize,
    /// Instrument universe.
    pub instruments: Vec<String>,
    /// Default per-scan pipeline settings.
    pub scan_defaults: ScanConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let instruments = env::var("INSTRUMENTS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|i| i.trim().to_uppercase())
                    .filter(|i| !i.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_INSTRUMENTS.iter().map(|s| s.to_string()).collect());

        let scan_defaults = ScanConfig {
            timeframe: env::var("SCAN_TIMEFRAME")
                .ok()
                .and_then(|v| Granularity::from_str(&v))
                .unwrap_or_default(),
            min_rr: env::var("MIN_RR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2.0),
            min_grade: env::var("MIN_GRADE")
                .ok()
                .and_then(|v| Grade::from_str(&v))
                .unwrap_or(Grade::C),
            ..ScanConfig::default()
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            candle_api_url: env::var("OANDA_API_URL")
                .unwrap_or_else(|_| "https://api-fxpractice.oanda.com/v3".to_string()),
            candle_api_key: env::var("OANDA_API_KEY").ok(),
            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN").ok(),
            scan_interval_secs: env::var("SCAN_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            scan_batch_size: env::var("SCAN_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            scan_batch_delay_ms: env::var("SCAN_BATCH_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1500),
            alert_cooldown_mins: env::var("ALERT_COOLDOWN_MINS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            result_cache_ttl_secs: env::var("RESULT_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            notify_delay_ms: env::var("NOTIFY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(250),
            analysis_candle_count: env::var("ANALYSIS_CANDLE_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            daily_candle_count: env::var("DAILY_CANDLE_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            htf_candle_count: env::var("HTF_CANDLE_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            instruments,
            scan_defaults,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_config_defaults() {
        let cfg = ScanConfig::default();
        assert_eq!(cfg.timeframe, Granularity::M15);
        assert_eq!(cfg.min_rr, 2.0);
        assert_eq!(cfg.max_signals_per_instrument, 2);
        assert_eq!(cfg.displacement_multiple, 1.5);
        assert!(!cfg.require_displacement);
        assert!(!cfg.require_fvg);
        assert!(cfg.direction_filter.is_none());
        assert_eq!(cfg.min_grade, Grade::C);
        assert!(cfg.news_bias.is_none());
        assert_eq!(cfg.atr_period, 14);
    }

    #[test]
    fn test_default_universe_is_nonempty() {
        assert!(!DEFAULT_INSTRUMENTS.is_empty());
        assert!(DEFAULT_INSTRUMENTS.contains(&"EUR_USD"));
        assert!(DEFAULT_INSTRUMENTS.iter().all(|i| i.contains('_')));
    }

    #[test]
    fn test_scan_config_serializes_camel_case() {
        let json = serde_json::to_value(ScanConfig::default()).unwrap();
        assert!(json.get("minRr").is_some());
        assert!(json.get("maxSignalsPerInstrument").is_some());
        assert!(json.get("requireHtfConfluence").is_some());
    }
}
