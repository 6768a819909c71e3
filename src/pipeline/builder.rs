//! Trade candidate construction.
//!
//! Turns a confirmed sweep plus levels, ATR and HTF bias into a concrete
//! trade plan: entry, stop, staged targets and reward:risk, then hands the
//! result to the scorer for grading.

use crate::config::ScanConfig;
use crate::pipeline::scorer;
use crate::types::{
    Direction, Granularity, HtfConfluence, Level, LevelKind, Signal, SweepEvent,
};

/// Fractions of the entry-to-target range for staged exits.
const TP1_FRACTION: f64 = 0.50;
const TP2_FRACTION: f64 = 0.75;

/// Target distance multiple of risk when no opposite daily level exists.
const FALLBACK_TARGET_RR: f64 = 3.0;

/// Tolerance for reward:risk comparisons against configured floors.
const RR_EPSILON: f64 = 1e-9;

/// Pip size for an instrument (JPY crosses quote in hundredths).
pub fn pip_size(instrument: &str) -> f64 {
    if instrument.contains("JPY") {
        0.01
    } else {
        0.0001
    }
}

/// Round a price to the instrument's pip grid.
pub fn round_to_pip(price: f64, pip: f64) -> f64 {
    (price / pip).round() * pip
}

/// Build a graded signal from a sweep event.
///
/// The stop sits half an ATR beyond the swept extreme; with the ATR unknown
/// the stop cannot be sized and no candidate is produced. The target is the
/// opposite-side previous-day level when available, else a 3:1 extrapolation
/// from the stop distance. Candidates strictly below the configured minimum
/// reward:risk are discarded (equality is kept), as are candidates whose
/// direction conflicts with a non-neutral bias when confluence is required.
pub fn build_signal(
    instrument: &str,
    sweep: &SweepEvent,
    levels: &[Level],
    atr: Option<f64>,
    bias: crate::types::HtfBias,
    cfg: &ScanConfig,
    timeframe: Granularity,
    timestamp: i64,
) -> Option<Signal> {
    let atr = atr?;
    let pip = pip_size(instrument);

    let entry = sweep.entry_price;
    let stop = match sweep.direction {
        Direction::Long => sweep.swept_extreme - atr / 2.0,
        Direction::Short => sweep.swept_extreme + atr / 2.0,
    };
    let stop = round_to_pip(stop, pip);

    let risk = (entry - stop).abs();
    if risk <= 0.0 {
        return None;
    }

    let opposite_daily = match sweep.direction {
        Direction::Long => levels.iter().find(|l| l.kind == LevelKind::PrevDayHigh),
        Direction::Short => levels.iter().find(|l| l.kind == LevelKind::PrevDayLow),
    };
    let target = match opposite_daily {
        Some(level) => level.price,
        None => match sweep.direction {
            Direction::Long => entry + FALLBACK_TARGET_RR * risk,
            Direction::Short => entry - FALLBACK_TARGET_RR * risk,
        },
    };

    let reward_risk = (target - entry).abs() / risk;
    // Strict filter with a float guard: equality with the floor is kept.
    if reward_risk + RR_EPSILON < cfg.min_rr {
        return None;
    }

    let htf_confluence = HtfConfluence::evaluate(sweep.direction, bias);
    if cfg.require_htf_confluence && htf_confluence == HtfConfluence::Against {
        return None;
    }

    let range = target - entry;
    let tp1 = round_to_pip(entry + range * TP1_FRACTION, pip);
    let tp2 = round_to_pip(entry + range * TP2_FRACTION, pip);
    let runner = round_to_pip(target, pip);

    let mut signal = Signal {
        instrument: instrument.to_string(),
        direction: sweep.direction,
        setup_label: format!("Liquidity Sweep @ {}", sweep.breached_level.label),
        entry_price: entry,
        stop_loss: stop,
        tp1,
        tp2,
        runner,
        reward_risk,
        displacement: sweep.displacement,
        has_gap: sweep.gap.is_some(),
        htf_bias: bias,
        htf_confluence,
        score: 0,
        grade: crate::types::Grade::D,
        level_priority: sweep.breached_level.priority,
        timeframe,
        timestamp,
        breakdown: crate::types::ScoreBreakdown {
            criteria: Vec::new(),
            total: 0,
            grade: crate::types::Grade::D,
        },
    };

    let breakdown = scorer::score_signal(&signal, cfg.news_bias);
    signal.score = breakdown.total;
    signal.grade = breakdown.grade;
    signal.breakdown = breakdown;

    Some(signal)
}
