//! Unit tests for the insight heuristics.
//!
//! Random components are driven by a seeded `StdRng`, so assertions
//! stick to properties that hold for any draw.

use rand::rngs::StdRng;
use rand::SeedableRng;

use estimate_desk::analytics::{
    analyze_productivity, detect_anomalies, predict_completion_time, prioritize_work_queue,
    AnomalyKind, Priority, RiskLevel, Severity, Trend,
};
use estimate_desk::models::{Estimate, EstimateStatus, EstimateType, LooseNumber};

fn queued(id: i64, amount: Option<f64>, status: EstimateStatus) -> Estimate {
    Estimate {
        id,
        estimate_type: EstimateType::Initial,
        claim_number: format!("CLM-{id}"),
        client_name: "Acme".into(),
        task_number: format!("T-{id}"),
        date_received: Some("2024-05-06".into()),
        time_received: Some("09:00".into()),
        status,
        date_returned: None,
        time_returned: None,
        estimate_amount: amount.map(LooseNumber::Number),
        ai_predicted_days: None,
        client_billed: false,
    }
}

#[test]
fn prediction_scales_with_workload() {
    let mut rng = StdRng::seed_from_u64(1);

    assert_eq!(predict_completion_time(EstimateType::Initial, 0, &mut rng).days, 2);
    assert_eq!(predict_completion_time(EstimateType::Final, 4, &mut rng).days, 4);
    assert_eq!(predict_completion_time(EstimateType::Initial, 10, &mut rng).days, 4);
    assert_eq!(predict_completion_time(EstimateType::Final, 12, &mut rng).days, 10);
}

#[test]
fn prediction_confidence_stays_in_band() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..200 {
        let prediction = predict_completion_time(EstimateType::Final, 3, &mut rng);
        assert!((80..=95).contains(&prediction.confidence));
        assert!(prediction.reasoning.contains("3 items"));
        assert!(prediction.reasoning.contains("final"));
    }
}

#[test]
fn rising_output_is_low_risk_and_increasing() {
    let analysis = analyze_productivity(&[4, 5, 6, 7, 8]);
    assert_eq!(analysis.trend, Trend::Increasing);
    assert_eq!(analysis.risk_level, RiskLevel::Low);
    assert!((analysis.avg_daily - 6.0).abs() < f64::EPSILON);
    assert!(analysis.recommendation.starts_with("Great momentum"));
}

#[test]
fn flat_output_counts_as_decreasing() {
    let analysis = analyze_productivity(&[3, 4, 3]);
    assert_eq!(analysis.trend, Trend::Decreasing);
    assert_eq!(analysis.risk_level, RiskLevel::Medium);
    assert!((analysis.avg_daily - 3.3).abs() < 1e-9);
}

#[test]
fn empty_period_is_high_risk() {
    let analysis = analyze_productivity(&[]);
    assert_eq!(analysis.risk_level, RiskLevel::High);
    assert!(analysis.avg_daily.abs() < f64::EPSILON);
}

#[test]
fn large_amounts_are_always_high_priority_and_first() {
    let items = vec![
        queued(1, None, EstimateStatus::NotStarted),
        queued(2, Some(8_000.0), EstimateStatus::NotStarted),
        queued(3, Some(0.0), EstimateStatus::InProgress),
        queued(4, Some(12_500.0), EstimateStatus::NotStarted),
    ];

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let ranked = prioritize_work_queue(&items, &mut rng);

        assert_eq!(ranked.len(), 4);
        let high: Vec<i64> = ranked
            .iter()
            .take_while(|item| item.priority == Priority::High)
            .map(|item| item.estimate.id)
            .collect();
        assert!(high.contains(&2) && high.contains(&4), "seed {seed}: {high:?}");
        assert!(
            ranked.windows(2).all(|w| w[0].priority >= w[1].priority),
            "seed {seed}: not sorted"
        );
        for item in &ranked {
            let expected = if item.priority == Priority::High {
                "High value + Urgent deadline"
            } else {
                "Standard priority"
            };
            assert_eq!(item.reasoning, expected);
        }
    }
}

#[test]
fn equal_priorities_keep_queue_order() {
    let items: Vec<Estimate> = (1..=6)
        .map(|id| queued(id, Some(9_000.0), EstimateStatus::NotStarted))
        .collect();
    let mut rng = StdRng::seed_from_u64(3);

    let ids: Vec<i64> = prioritize_work_queue(&items, &mut rng)
        .iter()
        .map(|item| item.estimate.id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn high_amount_anomaly_is_a_warning() {
    let items = vec![
        queued(1, Some(10_000.0), EstimateStatus::NotStarted),
        queued(2, Some(10_000.01), EstimateStatus::NotStarted),
    ];
    let mut rng = StdRng::seed_from_u64(5);

    let anomalies = detect_anomalies(&items, &mut rng);
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].id, 2);
    assert_eq!(anomalies[0].kind, AnomalyKind::HighAmount);
    assert_eq!(anomalies[0].severity, Severity::Warning);
}

#[test]
fn only_in_progress_work_can_look_delayed() {
    let items = vec![
        queued(1, None, EstimateStatus::NotStarted),
        queued(2, None, EstimateStatus::InProgress),
        queued(3, None, EstimateStatus::Done),
    ];

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        for anomaly in detect_anomalies(&items, &mut rng) {
            assert_eq!(anomaly.id, 2);
            assert_eq!(anomaly.kind, AnomalyKind::Delayed);
            assert_eq!(anomaly.severity, Severity::High);
            let days: u32 = anomaly
                .message
                .trim_start_matches("Estimate has been in progress for ")
                .trim_end_matches(" days")
                .parse()
                .unwrap();
            assert!((6..10).contains(&days));
        }
    }
}
