//! Signal scoring and grading.
//!
//! Six additive criteria, each computed from the signal snapshot alone.
//! The scorer never re-reads live market state, so re-scoring an identical
//! signal reproduces the same score and grade.

use crate::types::{
    CriterionScore, Direction, DisplacementStrength, Grade, HtfConfluence, ScoreBreakdown, Signal,
};

/// Float guard for reward:risk threshold comparisons.
const RR_EPSILON: f64 = 1e-9;

/// Score a signal across all six criteria. `news_bias` is the manually set
/// directional lean; it is an explicit input, never ambient state.
pub fn score_signal(signal: &Signal, news_bias: Option<Direction>) -> ScoreBreakdown {
    let criteria = vec![
        level_quality(signal),
        displacement(signal),
        gap_presence(signal),
        htf_confluence(signal),
        reward_risk(signal),
        news_alignment(signal, news_bias),
    ];

    let total: i32 = criteria.iter().map(|c| c.points).sum();
    ScoreBreakdown {
        criteria,
        total,
        grade: Grade::from_score(total),
    }
}

/// Daily levels score highest, then session, then equal clusters; matched
/// on the setup label.
fn level_quality(signal: &Signal) -> CriterionScore {
    let (points, reason) = if signal.setup_label.contains("Prev Day") {
        (25, "daily level swept")
    } else if signal.setup_label.contains("Session") {
        (18, "session level swept")
    } else if signal.setup_label.contains("Equal") {
        (12, "equal-level cluster swept")
    } else {
        (0, "unrecognized level")
    };
    CriterionScore {
        name: "Level quality".to_string(),
        points,
        max: 25,
        reason: reason.to_string(),
    }
}

fn displacement(signal: &Signal) -> CriterionScore {
    let (points, reason) = match signal.displacement {
        DisplacementStrength::Strong => (25, "strong displacement"),
        DisplacementStrength::Normal => (18, "normal displacement"),
        DisplacementStrength::Weak => (8, "weak displacement"),
        DisplacementStrength::None => (0, "no displacement"),
    };
    CriterionScore {
        name: "Displacement".to_string(),
        points,
        max: 25,
        reason: reason.to_string(),
    }
}

fn gap_presence(signal: &Signal) -> CriterionScore {
    let (points, reason) = if signal.has_gap {
        (20, "fair value gap present")
    } else {
        (0, "no fair value gap")
    };
    CriterionScore {
        name: "Gap presence".to_string(),
        points,
        max: 20,
        reason: reason.to_string(),
    }
}

fn htf_confluence(signal: &Signal) -> CriterionScore {
    let (points, reason) = match signal.htf_confluence {
        HtfConfluence::Aligned => (15, "aligned with HTF bias"),
        HtfConfluence::Neutral => (8, "HTF bias neutral"),
        HtfConfluence::Against => (0, "against HTF bias"),
    };
    CriterionScore {
        name: "HTF confluence".to_string(),
        points,
        max: 15,
        reason: reason.to_string(),
    }
}

fn reward_risk(signal: &Signal) -> CriterionScore {
    let rr = signal.reward_risk + RR_EPSILON;
    let (points, reason) = if rr >= 4.0 {
        (15, "R:R at least 4")
    } else if rr >= 3.0 {
        (12, "R:R at least 3")
    } else if rr >= 2.5 {
        (8, "R:R at least 2.5")
    } else if rr >= 2.0 {
        (4, "R:R at least 2")
    } else {
        (0, "R:R below 2")
    };
    CriterionScore {
        name: "Reward:risk".to_string(),
        points,
        max: 15,
        reason: reason.to_string(),
    }
}

/// Manual news bias: +10 when aligned with the signal direction, -10 when
/// against, 0 when no bias is set. The only criterion that can go negative.
fn news_alignment(signal: &Signal, news_bias: Option<Direction>) -> CriterionScore {
    let (points, reason) = match news_bias {
        Some(bias) if bias == signal.direction => (10, "aligned with news bias"),
        Some(_) => (-10, "against news bias"),
        None => (0, "no news bias set"),
    };
    CriterionScore {
        name: "News bias".to_string(),
        points,
        max: 10,
        reason: reason.to_string(),
    }
}
