//! Wire-format checks for the JSON payloads served by the API.

use sweepscan::config::ScanConfig;
use sweepscan::types::{
    CriterionScore, Direction, DisplacementStrength, Grade, GradeCounts, Granularity, HtfBias,
    HtfConfluence, InstrumentResult, InstrumentStatus, ScanResult, ScoreBreakdown, Signal,
};

fn sample_signal() -> Signal {
    Signal {
        instrument: "EUR_USD".to_string(),
        direction: Direction::Long,
        setup_label: "Liquidity Sweep @ Prev Day Low".to_string(),
        entry_price: 1.1010,
        stop_loss: 1.0990,
        tp1: 1.1030,
        tp2: 1.1040,
        runner: 1.1050,
        reward_risk: 2.0,
        displacement: DisplacementStrength::Normal,
        has_gap: true,
        htf_bias: HtfBias::Bullish,
        htf_confluence: HtfConfluence::Aligned,
        score: 92,
        grade: Grade::APlus,
        level_priority: 1,
        timeframe: Granularity::M15,
        timestamp: 1_704_201_300_000,
        breakdown: ScoreBreakdown {
            criteria: vec![CriterionScore {
                name: "levelQuality".to_string(),
                points: 25,
                max: 25,
                reason: "previous-day level".to_string(),
            }],
            total: 92,
            grade: Grade::APlus,
        },
    }
}

#[test]
fn test_signal_serializes_camel_case() {
    let json = serde_json::to_value(sample_signal()).unwrap();
    assert_eq!(json["instrument"], "EUR_USD");
    assert_eq!(json["direction"], "long");
    assert_eq!(json["entryPrice"], 1.1010);
    assert_eq!(json["stopLoss"], 1.0990);
    assert_eq!(json["rewardRisk"], 2.0);
    assert_eq!(json["hasGap"], true);
    assert_eq!(json["htfBias"], "bullish");
    assert_eq!(json["htfConfluence"], "aligned");
    assert_eq!(json["displacement"], "normal");
    assert_eq!(json["levelPriority"], 1);
    assert_eq!(json["timeframe"], "M15");
}

#[test]
fn test_a_plus_grade_serializes_with_plus_sign() {
    assert_eq!(serde_json::to_value(Grade::APlus).unwrap(), "A+");
    assert_eq!(serde_json::to_value(Grade::B).unwrap(), "B");
    assert_eq!(
        serde_json::from_value::<Grade>(serde_json::json!("A+")).unwrap(),
        Grade::APlus
    );
}

#[test]
fn test_scan_result_shape() {
    let signal = sample_signal();
    let mut grade_counts = GradeCounts::default();
    grade_counts.record(signal.grade);

    let result = ScanResult {
        timestamp: 1_704_201_300_000,
        timeframe: "M15".to_string(),
        signals: vec![signal.clone()],
        signals_found: 1,
        grade_counts,
        results: vec![InstrumentResult {
            instrument: "EUR_USD".to_string(),
            status: InstrumentStatus::Accepted,
            signals: vec![signal],
            levels: Vec::new(),
            error: None,
        }],
        applied_config: ScanConfig::default(),
    };

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["signalsFound"], 1);
    assert_eq!(json["gradeCounts"]["aPlus"], 1);
    assert_eq!(json["results"][0]["status"], "accepted");
    // Absent errors are omitted from the payload entirely.
    assert!(json["results"][0].get("error").is_none());
    assert_eq!(json["appliedConfig"]["minRr"], 2.0);
    assert_eq!(json["appliedConfig"]["timeframe"], "M15");
}

#[test]
fn test_error_entry_includes_message() {
    let entry = InstrumentResult::error("GBP_JPY", "connection refused");
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"], "connection refused");
    assert_eq!(json["signals"].as_array().map(Vec::len), Some(0));
}

#[test]
fn test_scan_config_round_trips() {
    let cfg = ScanConfig {
        direction_filter: Some(Direction::Short),
        min_grade: Grade::B,
        ..ScanConfig::default()
    };
    let json = serde_json::to_string(&cfg).unwrap();
    let back: ScanConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, cfg);
}
