use allowance_reconciler::*;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

struct Fixture {
    dir: PathBuf,
    events: PathBuf,
    backend: PathBuf,
    payments: PathBuf,
}

impl Fixture {
    fn create(name: &str, events_json: &str, backend_csv: &str, payments_csv: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "allowance_reconciler_it_{}_{}",
            std::process::id(),
            name
        ));
        std::fs::create_dir_all(&dir).unwrap();

        let events = dir.join("allowance_events.json");
        let backend = dir.join("allowance_backend_table.csv");
        let payments = dir.join("payment_schedule_backend_table.csv");

        File::create(&events)
            .unwrap()
            .write_all(events_json.as_bytes())
            .unwrap();
        File::create(&backend)
            .unwrap()
            .write_all(backend_csv.as_bytes())
            .unwrap();
        File::create(&payments)
            .unwrap()
            .write_all(payments_csv.as_bytes())
            .unwrap();

        Fixture {
            dir,
            events,
            backend,
            payments,
        }
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.dir).ok();
    }
}

fn event_json(user: &str, name: &str, ts: &str, frequency: &str, day: &str) -> String {
    format!(
        r#"{{
            "event": {{"name": "{name}", "timestamp": "{ts}"}},
            "user": {{"id": "{user}"}},
            "allowance": {{
                "amount": 25.0,
                "scheduled": {{"frequency": "{frequency}", "day": "{day}"}}
            }}
        }}"#
    )
}

#[test]
fn test_full_reconciliation_run() {
    let events_json = format!(
        "[{}]",
        [
            // user-ok has an older event that must lose to the newer one.
            event_json("user-ok", "allowance.scheduled", "2024-01-05 09:00:00", "weekly", "monday"),
            event_json("user-ok", "allowance.edited", "2024-01-10 08:00:00", "weekly", "wednesday"),
            event_json("user-logic", "allowance.edited", "2024-11-20 10:00:00", "weekly", "friday"),
            event_json("user-delay", "allowance.edited", "2024-11-20 10:00:00", "weekly", "friday"),
            event_json("user-disabled", "allowance.scheduled", "2024-02-01 12:00:00", "daily", ""),
            event_json("user-absent", "allowance.scheduled", "2024-11-30 00:00:00", "daily", ""),
        ]
        .join(",")
    );

    let backend_csv = "\
uuid,creation_date,frequency,day,next_payment_day,status,updated_at
user-ok,2023-11-02,weekly,wednesday,4,enabled,2024-11-27 09:00:00
user-logic,2023-11-02,monthly,first_day,1,enabled,2024-11-20 08:30:00
user-delay,2023-11-02,monthly,first_day,1,enabled,2024-11-01 08:30:00
user-disabled,2023-11-02,daily,,1,disabled,2024-11-01 08:30:00
user-absent,2023-11-02,daily,,1,enabled,
";

    let payments_csv = "\
user_id,payment_date
user-ok,4
user-ok,4
user-logic,1
user-delay,15
";

    let fixture = Fixture::create("full_run", &events_json, backend_csv, payments_csv);
    let report = reconcile_files(&fixture.events, &fixture.backend, &fixture.payments).unwrap();

    // Disabled filtering.
    assert_eq!(report.disabled.backend_rows, 5);
    assert_eq!(report.disabled.backend_disabled, 1);
    assert_eq!(report.disabled.disabled_users_in_events, 1);
    assert!(report.rows.iter().all(|r| r.user_id != "user-disabled"));
    assert_eq!(report.rows.len(), 4);

    // user-ok: latest event wins, everything lines up.
    let ok = report.rows.iter().find(|r| r.user_id == "user-ok").unwrap();
    assert_eq!(ok.event_day, "wednesday");
    assert_eq!(ok.expected_payment_day.as_deref(), Some("04"));
    assert_eq!(ok.day_from_updated_at.as_deref(), Some("04"));
    assert!(ok.is_fully_consistent());

    // user-logic: backend self-consistent, event disagrees, gap under a day.
    let logic = report
        .rows
        .iter()
        .find(|r| r.user_id == "user-logic")
        .unwrap();
    assert_eq!(logic.expected_payment_day.as_deref(), Some("06"));
    assert_eq!(logic.day_from_updated_at.as_deref(), Some("01"));
    assert!(logic.matches_updated_at);
    assert!(!logic.is_next_payment_day_correct);
    assert_eq!(
        logic.reason_of_discrepancy,
        Some(DiscrepancyReason::BackendLogicIssue)
    );

    // user-delay: same disagreement, but the backend lags by 19 days.
    let delay = report
        .rows
        .iter()
        .find(|r| r.user_id == "user-delay")
        .unwrap();
    assert_eq!(
        delay.reason_of_discrepancy,
        Some(DiscrepancyReason::TimestampDelayIssue)
    );

    // user-absent: no updated_at, so no backend-side opinion.
    let absent = report
        .rows
        .iter()
        .find(|r| r.user_id == "user-absent")
        .unwrap();
    assert_eq!(absent.day_from_updated_at, None);
    assert!(!absent.matches_updated_at);
    assert_eq!(absent.reason_of_discrepancy, None);

    // Consistent rows are excluded from the discrepancy set.
    assert_eq!(report.agreement.reconciled_rows, 4);
    assert_eq!(report.agreement.fully_consistent, 1);
    assert_eq!(report.discrepancies.len(), 3);

    // The duplicated payment user is reported.
    assert_eq!(
        report.duplicate_payment_users,
        vec![("user-ok".to_string(), 2)]
    );

    // Payment statuses: followed backend+projection, backend only, neither.
    let status_of = |user: &str| {
        report
            .payments
            .iter()
            .find(|p| p.user_id == user)
            .unwrap()
            .payment_date_status
    };
    assert_eq!(status_of("user-ok"), PaymentDateStatus::Correct);
    assert_eq!(status_of("user-logic"), PaymentDateStatus::BackendLogic);
    assert_eq!(status_of("user-delay"), PaymentDateStatus::Unknown);

    // Both reports render with the human-readable labels.
    let discrepancy_path = fixture.dir.join("discrepancies_in_payment_dates.csv");
    let payment_path = fixture.dir.join("payment_table_discrepancy.csv");
    write_discrepancy_report(&report.discrepancies, &discrepancy_path).unwrap();
    write_payment_report(&report.payments, &payment_path).unwrap();

    let discrepancies = std::fs::read_to_string(&discrepancy_path).unwrap();
    assert!(discrepancies.contains("backend logic issues"));
    assert!(discrepancies.contains("timestamp delay issue"));

    let payments = std::fs::read_to_string(&payment_path).unwrap();
    assert!(payments.contains("correct payment date"));
    assert!(payments.contains("unknown error"));
}

#[test]
fn test_reference_scenario_weekly_wednesday() {
    // Reference 2024-01-10 08:00:00 is itself a Wednesday: the next
    // weekly Wednesday occurrence is a full week out, 2024-01-17.
    let reference = parse_reference(Some("2024-01-10 08:00:00")).unwrap();
    let next = increment_once(reference, "weekly", "wednesday").unwrap();
    assert_eq!(next.as_deref(), Some("17"));
}

#[test]
fn test_projector_and_incrementer_share_one_step() {
    let reference = parse_reference(Some("2024-06-03 12:00:00")).unwrap();
    let horizon = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    for (frequency, day) in [
        ("daily", ""),
        ("weekly", "sunday"),
        ("biweekly", "monday"),
        ("monthly", "first_day"),
        ("monthly", "fifteenth_day"),
    ] {
        // A horizon already in the past forces exactly one projector step.
        let projected = project_occurrence(reference, frequency, day, horizon).unwrap();
        let incremented = increment_once(reference, frequency, day).unwrap();
        assert_eq!(projected, incremented, "{} {}", frequency, day);
    }
}

#[test]
fn test_unparseable_event_rule_does_not_abort_the_run() {
    let events_json = format!(
        "[{}]",
        event_json("user-1", "allowance.scheduled", "2024-01-10 08:00:00", "weekly", "funday")
    );
    let backend_csv = "\
uuid,creation_date,frequency,day,next_payment_day,status,updated_at
user-1,2023-11-02,weekly,wednesday,4,enabled,2024-11-27 09:00:00
";

    let fixture = Fixture::create("bad_rule", &events_json, backend_csv, "user_id,payment_date\n");
    let report = reconcile_files(&fixture.events, &fixture.backend, &fixture.payments).unwrap();

    // The bad event rule leaves no projection; the backend side still works.
    let row = &report.rows[0];
    assert_eq!(row.expected_payment_day, None);
    assert!(!row.is_next_payment_day_correct);
    assert_eq!(row.day_from_updated_at.as_deref(), Some("04"));
}
