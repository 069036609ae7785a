//! # Allowance Reconciler
//!
//! A library for reconciling recurring allowance schedules across three
//! record sources: the user-facing event log, the backend schedule table,
//! and the observed payment table.
//!
//! ## Core Concepts
//!
//! - **Recurrence Rule**: a validated frequency + anchor pair (daily,
//!   weekly/biweekly on a weekday, monthly on the 1st or 15th)
//! - **Occurrence Projector**: steps a schedule forward from a reference
//!   timestamp until it passes a horizon date, yielding the payment day
//!   the schedule settles on
//! - **Single-Step Incrementer**: the very next payment day after a
//!   reference timestamp, with no horizon
//! - **Discrepancy Classification**: a backend row that is consistent
//!   with its own update timestamp but not with the event log is either a
//!   scheduling logic bug (timestamps close together) or a propagation
//!   delay (backend lags by a day or more)
//!
//! ## Example
//!
//! ```rust,ignore
//! use allowance_reconciler::*;
//! use std::path::Path;
//!
//! let report = reconcile_files(
//!     Path::new("allowance_events.json"),
//!     Path::new("allowance_backend_table.csv"),
//!     Path::new("payment_schedule_backend_table.csv"),
//! )?;
//!
//! write_discrepancy_report(&report.discrepancies, Path::new("discrepancies_in_payment_dates.csv"))?;
//! write_payment_report(&report.payments, Path::new("payment_table_discrepancy.csv"))?;
//! ```

pub mod audit;
pub mod classifier;
pub mod error;
pub mod ingestion;
pub mod report;
pub mod rule;
pub mod schedule;
pub mod schema;
pub mod utils;

pub use audit::{
    AgreementSummary, AuditReport, DisabledSummary, PaymentAuditRow, ReconciledRow,
    ScheduleAuditor, run_audit,
};
pub use classifier::{classify_timestamp_gap, DiscrepancyReason, PaymentDateStatus};
pub use error::{Result, ScheduleError};
pub use ingestion::{load_backend_table, load_events, load_payment_table};
pub use report::{write_discrepancy_report, write_payment_report};
pub use rule::{MonthlyAnchor, RecurrenceRule};
pub use schedule::{
    default_horizon, increment_once, next_occurrence, project_occurrence, project_to_horizon,
};
pub use schema::{AllowanceEvent, BackendScheduleRow, PaymentScheduleRow};
pub use utils::{parse_backend_timestamp, parse_reference, two_digit_day, Reference};

use chrono::NaiveDate;
use log::info;
use std::path::Path;

/// Loads the three tables and runs the reconciliation against a chosen
/// horizon.
pub struct AllowanceReconciler {
    horizon: NaiveDate,
}

impl AllowanceReconciler {
    pub fn new(horizon: NaiveDate) -> Self {
        Self { horizon }
    }

    /// The horizon the original evaluation was pinned to (2024-12-03).
    pub fn with_default_horizon() -> Self {
        Self::new(default_horizon())
    }

    pub fn reconcile_files(
        &self,
        events_path: &Path,
        backend_path: &Path,
        payments_path: &Path,
    ) -> Result<AuditReport> {
        let events = ingestion::load_events(events_path)?;
        let backend = ingestion::load_backend_table(backend_path)?;
        let payments = ingestion::load_payment_table(payments_path)?;

        info!(
            "Reconciling {} events against {} backend rows and {} payments (horizon {})",
            events.len(),
            backend.len(),
            payments.len(),
            self.horizon
        );

        Ok(ScheduleAuditor::new(self.horizon).audit(&events, &backend, &payments))
    }
}

/// One-call entry point with the default horizon.
pub fn reconcile_files(
    events_path: &Path,
    backend_path: &Path,
    payments_path: &Path,
) -> Result<AuditReport> {
    AllowanceReconciler::with_default_horizon().reconcile_files(
        events_path,
        backend_path,
        payments_path,
    )
}
