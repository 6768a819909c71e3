//! Scan API endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::config::ScanConfig;
use crate::error::{AppError, Result};
use crate::pipeline;
use crate::sources::CandleSource;
use crate::types::{Direction, Grade, Granularity, HtfBias, Level, ScanResult, Signal};
use crate::AppState;

/// Query parameters accepted by the scan endpoints. All optional; anything
/// omitted falls back to the configured defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ScanQuery {
    pub timeframe: Option<String>,
    #[serde(rename = "minRR")]
    pub min_rr: Option<f64>,
    #[serde(rename = "minGrade")]
    pub min_grade: Option<String>,
    #[serde(rename = "directionFilter")]
    pub direction_filter: Option<String>,
    #[serde(rename = "requireHTFConfluence")]
    pub require_htf_confluence: Option<bool>,
    #[serde(rename = "requireFVG")]
    pub require_fvg: Option<bool>,
    #[serde(rename = "requireDisplacement")]
    pub require_displacement: Option<bool>,
    #[serde(rename = "newsBias")]
    pub news_bias: Option<String>,
}

/// Single-instrument analysis returned by `/levels/:instrument`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelsResponse {
    pub instrument: String,
    pub timeframe: String,
    pub levels: Vec<Level>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atr: Option<f64>,
    pub htf_bias: HtfBias,
    pub timestamp: i64,
}

/// Effective configuration exposed for inspection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub instruments: Vec<String>,
    pub scan_interval_secs: u64,
    pub scan_batch_size: usize,
    pub alert_cooldown_mins: i64,
    pub result_cache_ttl_secs: i64,
    pub allowed_timeframes: Vec<String>,
    pub scan_defaults: ScanConfig,
}

/// Create the scan router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/scan", get(get_scan))
        .route("/signals", get(get_signals))
        .route("/levels/:instrument", get(get_levels))
        .route("/config", get(get_config))
}

/// Resolve query overrides against the configured scan defaults.
/// Unknown enum values are rejected at the boundary, never passed on.
fn resolve_config(defaults: &ScanConfig, query: &ScanQuery) -> Result<ScanConfig> {
    let mut cfg = defaults.clone();

    if let Some(ref tf) = query.timeframe {
        cfg.timeframe = parse_timeframe(tf)?;
    }
    if let Some(min_rr) = query.min_rr {
        if !(min_rr.is_finite() && min_rr > 0.0) {
            return Err(AppError::BadRequest(format!(
                "Invalid minRR '{}': must be a positive number",
                min_rr
            )));
        }
        cfg.min_rr = min_rr;
    }
    if let Some(ref grade) = query.min_grade {
        cfg.min_grade = Grade::from_str(grade).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid minGrade '{}'. Allowed: A+, A, B, C, D",
                grade
            ))
        })?;
    }
    if let Some(ref dir) = query.direction_filter {
        cfg.direction_filter = Some(Direction::from_str(dir).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid directionFilter '{}'. Allowed: long, short",
                dir
            ))
        })?);
    }
    if let Some(ref bias) = query.news_bias {
        cfg.news_bias = Some(Direction::from_str(bias).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid newsBias '{}'. Allowed: long, short",
                bias
            ))
        })?);
    }
    if let Some(v) = query.require_htf_confluence {
        cfg.require_htf_confluence = v;
    }
    if let Some(v) = query.require_fvg {
        cfg.require_fvg = v;
    }
    if let Some(v) = query.require_displacement {
        cfg.require_displacement = v;
    }

    Ok(cfg)
}

fn parse_timeframe(s: &str) -> Result<Granularity> {
    Granularity::from_str(s).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Invalid timeframe '{}'. Allowed: {}",
            s,
            Granularity::allowed().join(", ")
        ))
    })
}

/// Latest-or-freshly-computed scan result.
async fn get_scan(
    State(state): State<AppState>,
    Query(query): Query<ScanQuery>,
) -> Result<Json<ScanResult>> {
    let cfg = resolve_config(&state.config.scan_defaults, &query)?;
    let result = state.scanner.latest_or_scan(&cfg).await;
    Ok(Json(result))
}

/// Cached signals only; never triggers a scan.
async fn get_signals(
    State(state): State<AppState>,
    Query(query): Query<ScanQuery>,
) -> Result<Json<Vec<Signal>>> {
    let timeframe = match query.timeframe {
        Some(ref tf) => parse_timeframe(tf)?,
        None => state.config.scan_defaults.timeframe,
    };
    Ok(Json(state.scanner.cached_signals(timeframe)))
}

/// Fresh single-instrument analysis: levels, ATR and HTF bias.
async fn get_levels(
    State(state): State<AppState>,
    Path(instrument): Path<String>,
    Query(query): Query<ScanQuery>,
) -> Result<Json<LevelsResponse>> {
    let instrument = instrument.to_uppercase();
    if !state.config.instruments.contains(&instrument) {
        return Err(AppError::BadRequest(format!(
            "Unknown instrument '{}'. Universe: {}",
            instrument,
            state.config.instruments.join(", ")
        )));
    }
    let cfg = resolve_config(&state.config.scan_defaults, &query)?;

    let analysis = state
        .candle_source
        .fetch_candles(&instrument, cfg.timeframe, state.config.analysis_candle_count)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;
    let daily = state
        .candle_source
        .fetch_candles(&instrument, Granularity::D, state.config.daily_candle_count)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;
    let htf = state
        .candle_source
        .fetch_candles(&instrument, cfg.timeframe.htf(), state.config.htf_candle_count)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    let levels = pipeline::extract_levels(
        &analysis,
        &daily,
        cfg.equal_level_tolerance,
        cfg.max_equal_levels,
    );
    let atr = pipeline::average_true_range(&analysis, cfg.atr_period);
    let htf_bias = pipeline::classify_bias(&htf);

    Ok(Json(LevelsResponse {
        instrument,
        timeframe: cfg.timeframe.code().to_string(),
        levels,
        atr,
        htf_bias,
        timestamp: chrono::Utc::now().timestamp_millis(),
    }))
}

/// Effective thresholds and universe.
async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        instruments: state.config.instruments.clone(),
        scan_interval_secs: state.config.scan_interval_secs,
        scan_batch_size: state.config.scan_batch_size,
        alert_cooldown_mins: state.config.alert_cooldown_mins,
        result_cache_ttl_secs: state.config.result_cache_ttl_secs,
        allowed_timeframes: Granularity::allowed()
            .iter()
            .map(|s| s.to_string())
            .collect(),
        scan_defaults: state.config.scan_defaults.clone(),
    })
}
