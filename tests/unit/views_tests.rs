//! Unit tests for queues and reports derived from the estimate list.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;

use estimate_desk::analytics::{RiskLevel, Trend};
use estimate_desk::models::{Estimate, EstimateStatus, EstimateType, LooseNumber};
use estimate_desk::views::{self, reports::week_start};

fn est(id: i64, kind: EstimateType, status: EstimateStatus) -> Estimate {
    Estimate {
        id,
        estimate_type: kind,
        claim_number: format!("CLM-{id}"),
        client_name: "Acme".into(),
        task_number: format!("T-{id}"),
        date_received: Some("2024-05-01".into()),
        time_received: Some("09:00".into()),
        status,
        date_returned: None,
        time_returned: None,
        estimate_amount: None,
        ai_predicted_days: None,
        client_billed: false,
    }
}

fn done(id: i64, kind: EstimateType, returned: &str, amount: Option<LooseNumber>) -> Estimate {
    Estimate {
        date_returned: Some(returned.into()),
        time_returned: Some("15:00".into()),
        estimate_amount: amount,
        ..est(id, kind, EstimateStatus::Done)
    }
}

fn day(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

#[test]
fn work_queue_holds_everything_not_done() {
    let list = vec![
        est(1, EstimateType::Initial, EstimateStatus::NotStarted),
        done(2, EstimateType::Final, "2024-05-06", None),
        est(3, EstimateType::Final, EstimateStatus::InProgress),
    ];
    let ids: Vec<i64> = views::work_queue(&list).iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn billing_queue_only_holds_unbilled_done_finals() {
    let mut billed = done(4, EstimateType::Final, "2024-05-06", Some(LooseNumber::Number(500.0)));
    billed.client_billed = true;
    let list = vec![
        done(1, EstimateType::Final, "2024-05-06", Some(LooseNumber::Number(1200.0))),
        done(2, EstimateType::Initial, "2024-05-06", Some(LooseNumber::Number(300.0))),
        est(3, EstimateType::Final, EstimateStatus::InProgress),
        billed,
        done(5, EstimateType::Final, "2024-05-07", Some(LooseNumber::from("250.50"))),
        done(6, EstimateType::Final, "2024-05-07", Some(LooseNumber::from(""))),
    ];

    let queue = views::billing_queue(&list);
    let ids: Vec<i64> = queue.items.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 5, 6]);
    assert!((queue.total - 1450.5).abs() < f64::EPSILON);
}

#[test]
fn daily_summary_counts_by_type() {
    let list = vec![
        done(1, EstimateType::Initial, "2024-05-08", None),
        done(2, EstimateType::Final, "2024-05-08", None),
        done(3, EstimateType::Final, "2024-05-08", None),
        done(4, EstimateType::Final, "2024-05-07", None),
        est(5, EstimateType::Initial, EstimateStatus::InProgress),
    ];

    let summary = views::daily_summary(&list, day("2024-05-08"));

    assert_eq!(summary.total, 3);
    assert_eq!(summary.initial, 1);
    assert_eq!(summary.final_count, 2);
    assert!((summary.average - 4.0 / 30.0).abs() < 1e-9);
    assert_eq!(summary.message, "+2.9 above average");
}

#[test]
fn daily_summary_on_quiet_day_is_below_average() {
    let list = vec![done(1, EstimateType::Initial, "2024-05-08", None)];
    let summary = views::daily_summary(&list, day("2024-05-09"));
    assert_eq!(summary.total, 0);
    assert_eq!(summary.message, "-0.0 below average");
}

#[test]
fn week_starts_on_monday() {
    assert_eq!(week_start(day("2024-05-09")), day("2024-05-06"));
    assert_eq!(week_start(day("2024-05-06")), day("2024-05-06"));
    assert_eq!(week_start(day("2024-05-12")), day("2024-05-06"));
}

#[test]
fn weekly_report_buckets_days_and_revenue() {
    let list = vec![
        done(1, EstimateType::Final, "2024-05-06", Some(LooseNumber::Number(1000.0))),
        done(2, EstimateType::Initial, "2024-05-08", Some(LooseNumber::from("500"))),
        done(3, EstimateType::Final, "2024-05-12", None),
        done(4, EstimateType::Final, "2024-05-13", Some(LooseNumber::Number(9000.0))),
        est(5, EstimateType::Initial, EstimateStatus::NotStarted),
    ];

    let report = views::weekly_report(&list, day("2024-05-09"), 8.0, 2.0);

    assert_eq!(report.week_start, day("2024-05-06"));
    assert_eq!(report.week_end, day("2024-05-12"));
    let counts: Vec<usize> = report.days.iter().map(|d| d.count).collect();
    assert_eq!(counts, vec![1, 0, 1, 0, 0, 0, 1]);
    assert_eq!(report.days[0].weekday, "Mon");
    assert_eq!(report.total, 3);
    assert!((report.available_hours - 34.0).abs() < f64::EPSILON);
    assert!((report.productivity_rate - 8.8).abs() < 1e-9);
    assert!((report.revenue - 1500.0).abs() < f64::EPSILON);
    assert!((report.average_value - 500.0).abs() < f64::EPSILON);
    assert_eq!(report.analysis.trend, Trend::Decreasing);
    assert_eq!(report.analysis.risk_level, RiskLevel::High);
}

#[test]
fn weekly_report_without_hours_has_zero_rate() {
    let list = vec![done(1, EstimateType::Final, "2024-05-06", None)];
    let report = views::weekly_report(&list, day("2024-05-06"), 40.0, 0.0);
    assert!(report.productivity_rate.abs() < f64::EPSILON);
    assert!(report.average_value.abs() < f64::EPSILON);
}

#[test]
fn insights_report_today_and_queue() {
    let list = vec![
        done(1, EstimateType::Final, "2024-05-08", Some(LooseNumber::Number(15_000.0))),
        done(2, EstimateType::Final, "2024-05-08", None),
        done(3, EstimateType::Initial, "2024-05-08", None),
        est(4, EstimateType::Initial, EstimateStatus::NotStarted),
    ];

    let mut rng = StdRng::seed_from_u64(7);
    let insights = views::insights(&list, day("2024-05-08"), &mut rng);

    assert_eq!(insights.completed_today, 3);
    assert_eq!(insights.queue_size, 1);
    assert_eq!(insights.anomaly_count, 1);
    assert_eq!(insights.pace_message, "Great pace!");

    let slow = views::insights(&list, day("2024-05-09"), &mut rng);
    assert_eq!(slow.pace_message, "Consider focusing on completion.");
}
