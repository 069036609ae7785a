//! Generates a small synthetic data set, reconciles it, and prints the
//! summary plus both CSV reports into a scratch directory.

use allowance_reconciler::*;
use anyhow::Result;
use std::fs::File;
use std::io::Write;

fn main() -> Result<()> {
    let dir = std::env::temp_dir().join("allowance_reconciler_demo");
    std::fs::create_dir_all(&dir)?;

    let events_path = dir.join("allowance_events.json");
    File::create(&events_path)?.write_all(
        br#"[
  {
    "event": {"name": "allowance.scheduled", "timestamp": "2024-01-10 08:00:00"},
    "user": {"id": "4f2c"},
    "allowance": {"amount": 20.0, "scheduled": {"frequency": "weekly", "day": "wednesday"}}
  },
  {
    "event": {"name": "allowance.edited", "timestamp": "2024-11-20 10:00:00"},
    "user": {"id": "9a1b"},
    "allowance": {"amount": 50.0, "scheduled": {"frequency": "weekly", "day": "friday"}}
  }
]"#,
    )?;

    let backend_path = dir.join("allowance_backend_table.csv");
    File::create(&backend_path)?.write_all(
        b"uuid,creation_date,frequency,day,next_payment_day,status,updated_at\n\
          4f2c,2023-11-02,weekly,wednesday,4,enabled,2024-11-27 09:00:00\n\
          9a1b,2023-12-14,monthly,first_day,1,enabled,2024-11-20 08:30:00\n",
    )?;

    let payments_path = dir.join("payment_schedule_backend_table.csv");
    File::create(&payments_path)?
        .write_all(b"user_id,payment_date\n4f2c,4\n9a1b,1\n")?;

    let report = reconcile_files(&events_path, &backend_path, &payments_path)?;

    println!("Reconciled {} users", report.agreement.reconciled_rows);
    println!(
        "Fully consistent: {} ({:.2}%)",
        report.agreement.fully_consistent, report.agreement.fully_consistent_pct
    );
    for row in &report.discrepancies {
        println!(
            "  {}: backend says {}, events project {:?}, reason {:?}",
            row.user_id, row.next_payment_day, row.expected_payment_day, row.reason_of_discrepancy
        );
    }
    for payment in &report.payments {
        println!(
            "  {} paid on {} -> {}",
            payment.user_id, payment.payment_date, payment.payment_date_status
        );
    }

    write_discrepancy_report(&report.discrepancies, &dir.join("discrepancies_in_payment_dates.csv"))?;
    write_payment_report(&report.payments, &dir.join("payment_table_discrepancy.csv"))?;
    println!("Reports written under {}", dir.display());

    Ok(())
}
