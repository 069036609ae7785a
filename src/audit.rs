use crate::classifier::{classify_timestamp_gap, DiscrepancyReason, PaymentDateStatus};
use crate::schedule::{default_horizon, increment_once, project_occurrence};
use crate::schema::{AllowanceEvent, BackendScheduleRow, PaymentScheduleRow};
use crate::utils::{parse_backend_timestamp, parse_reference, Reference};
use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// One reconciled user: the latest event, the backend row it joined to,
/// and every derived comparison column.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciledRow {
    pub user_id: String,
    pub event_name: String,
    pub event_timestamp: String,
    pub allowance_amount: f64,
    pub event_frequency: String,
    pub event_day: String,
    pub backend_frequency: Option<String>,
    pub backend_day: Option<String>,
    /// Backend's stored day, zero-padded; "00" when the user has no
    /// backend row.
    pub next_payment_day: String,
    /// Day the event log projects the schedule to settle on.
    pub expected_payment_day: Option<String>,
    pub is_next_payment_day_correct: bool,
    /// Day recomputed from the backend's own `updated_at`.
    pub day_from_updated_at: Option<String>,
    pub matches_updated_at: bool,
    pub timestamp_gap_seconds: Option<i64>,
    pub reason_of_discrepancy: Option<DiscrepancyReason>,
}

impl ReconciledRow {
    /// A row is fully consistent when the backend agrees both with its own
    /// update timestamp and with the event projection.
    pub fn is_fully_consistent(&self) -> bool {
        self.matches_updated_at && self.is_next_payment_day_correct
    }
}

/// Observed payment compared against the two derivable days.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentAuditRow {
    pub user_id: String,
    pub payment_date: String,
    pub next_payment_day: String,
    pub expected_payment_day: Option<String>,
    pub payment_date_status: PaymentDateStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisabledSummary {
    pub backend_rows: usize,
    pub backend_disabled: usize,
    pub backend_disabled_pct: f64,
    pub disabled_users_in_events: usize,
    pub events_removed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgreementSummary {
    pub reconciled_rows: usize,
    pub fully_consistent: usize,
    pub fully_consistent_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub disabled: DisabledSummary,
    pub rows: Vec<ReconciledRow>,
    pub agreement: AgreementSummary,
    /// Rows that are not fully consistent, with the discrepancy reason
    /// filled in where the gap classifier applies.
    pub discrepancies: Vec<ReconciledRow>,
    /// Payment-table user_ids appearing more than once, with counts.
    pub duplicate_payment_users: Vec<(String, usize)>,
    pub payments: Vec<PaymentAuditRow>,
}

/// Runs the full reconciliation over the three loaded tables.
pub struct ScheduleAuditor {
    horizon: NaiveDate,
}

impl ScheduleAuditor {
    pub fn new(horizon: NaiveDate) -> Self {
        Self { horizon }
    }

    pub fn audit(
        &self,
        events: &[AllowanceEvent],
        backend: &[BackendScheduleRow],
        payments: &[PaymentScheduleRow],
    ) -> AuditReport {
        let backend_by_uuid: HashMap<&str, &BackendScheduleRow> = backend
            .iter()
            .map(|row| (row.uuid.as_str(), row))
            .collect();

        let disabled = self.disabled_summary(events, backend, &backend_by_uuid);

        let active_events: Vec<&AllowanceEvent> = events
            .iter()
            .filter(|e| {
                backend_by_uuid
                    .get(e.user_id())
                    .map(|row| !row.is_disabled())
                    .unwrap_or(true)
            })
            .collect();

        let latest = latest_event_per_user(&active_events);
        info!(
            "Reconciling {} users ({} active events)",
            latest.len(),
            active_events.len()
        );

        let mut rows = Vec::with_capacity(latest.len());
        for (user_id, (reference, event)) in &latest {
            rows.push(self.reconcile_user(user_id, *reference, event, &backend_by_uuid));
        }

        let fully_consistent = rows.iter().filter(|r| r.is_fully_consistent()).count();
        let agreement = AgreementSummary {
            reconciled_rows: rows.len(),
            fully_consistent,
            fully_consistent_pct: percentage(fully_consistent, rows.len()),
        };
        info!(
            "{}/{} rows fully consistent ({:.2}%)",
            agreement.fully_consistent, agreement.reconciled_rows, agreement.fully_consistent_pct
        );

        let discrepancies: Vec<ReconciledRow> = rows
            .iter()
            .filter(|r| !r.is_fully_consistent())
            .cloned()
            .collect();

        let duplicate_payment_users = duplicate_payment_users(payments);
        let payments = self.audit_payments(&rows, payments);

        AuditReport {
            disabled,
            rows,
            agreement,
            discrepancies,
            duplicate_payment_users,
            payments,
        }
    }

    fn disabled_summary(
        &self,
        events: &[AllowanceEvent],
        backend: &[BackendScheduleRow],
        backend_by_uuid: &HashMap<&str, &BackendScheduleRow>,
    ) -> DisabledSummary {
        let backend_disabled = backend.iter().filter(|row| row.is_disabled()).count();

        let mut disabled_users: Vec<&str> = events
            .iter()
            .map(|e| e.user_id())
            .filter(|id| {
                backend_by_uuid
                    .get(id)
                    .map(|row| row.is_disabled())
                    .unwrap_or(false)
            })
            .collect();
        disabled_users.sort_unstable();
        let events_removed = disabled_users.len();
        disabled_users.dedup();

        let summary = DisabledSummary {
            backend_rows: backend.len(),
            backend_disabled,
            backend_disabled_pct: percentage(backend_disabled, backend.len()),
            disabled_users_in_events: disabled_users.len(),
            events_removed,
        };
        info!(
            "{} of {} backend rows disabled ({:.2}%); {} disabled users in the event log ({} events removed)",
            summary.backend_disabled,
            summary.backend_rows,
            summary.backend_disabled_pct,
            summary.disabled_users_in_events,
            summary.events_removed
        );
        summary
    }

    fn reconcile_user(
        &self,
        user_id: &str,
        reference: Reference,
        event: &AllowanceEvent,
        backend_by_uuid: &HashMap<&str, &BackendScheduleRow>,
    ) -> ReconciledRow {
        let expected_payment_day =
            match project_occurrence(reference, event.frequency(), event.day(), self.horizon) {
                Ok(day) => day,
                Err(err) => {
                    warn!("Skipping event projection for {}: {}", user_id, err);
                    None
                }
            };

        let backend_row = backend_by_uuid.get(user_id).copied();
        // Users without a backend row keep the "00" placeholder so the
        // comparison columns stay well-formed.
        let next_payment_day = backend_row
            .map(|row| row.padded_next_payment_day())
            .unwrap_or_else(|| "00".to_string());

        let updated_at = backend_row
            .map(|row| parse_backend_timestamp(row.updated_at.as_deref()))
            .unwrap_or(Reference::Absent);

        let day_from_updated_at = match backend_row {
            Some(row) => match increment_once(updated_at, &row.frequency, &row.day) {
                Ok(day) => day,
                Err(err) => {
                    warn!("Skipping backend increment for {}: {}", user_id, err);
                    None
                }
            },
            None => None,
        };

        let is_next_payment_day_correct =
            expected_payment_day.as_deref() == Some(next_payment_day.as_str());
        let matches_updated_at =
            day_from_updated_at.as_deref() == Some(next_payment_day.as_str());

        let timestamp_gap_seconds = match (reference, updated_at) {
            (Reference::At(event_ts), Reference::At(backend_ts)) => {
                Some((event_ts - backend_ts).num_seconds())
            }
            _ => None,
        };

        // Only rows where the backend is self-consistent but disagrees
        // with the event log get a reason: that is the population where
        // "stale timestamp" and "wrong logic" can be told apart.
        let reason_of_discrepancy = if matches_updated_at && !is_next_payment_day_correct {
            match (reference, updated_at) {
                (Reference::At(event_ts), Reference::At(backend_ts)) => {
                    Some(classify_timestamp_gap(event_ts - backend_ts))
                }
                _ => None,
            }
        } else {
            None
        };

        debug!(
            "user {}: expected {:?}, backend {}, from updated_at {:?}",
            user_id, expected_payment_day, next_payment_day, day_from_updated_at
        );

        ReconciledRow {
            user_id: user_id.to_string(),
            event_name: event.event.name.clone(),
            event_timestamp: event.timestamp().to_string(),
            allowance_amount: event.allowance.amount,
            event_frequency: event.frequency().to_string(),
            event_day: event.day().to_string(),
            backend_frequency: backend_row.map(|row| row.frequency.clone()),
            backend_day: backend_row.map(|row| row.day.clone()),
            next_payment_day,
            expected_payment_day,
            is_next_payment_day_correct,
            day_from_updated_at,
            matches_updated_at,
            timestamp_gap_seconds,
            reason_of_discrepancy,
        }
    }

    fn audit_payments(
        &self,
        rows: &[ReconciledRow],
        payments: &[PaymentScheduleRow],
    ) -> Vec<PaymentAuditRow> {
        let by_user: BTreeMap<&str, &ReconciledRow> =
            rows.iter().map(|r| (r.user_id.as_str(), r)).collect();

        let mut audited = Vec::new();
        for payment in payments {
            let row = match by_user.get(payment.user_id.as_str()) {
                Some(row) => row,
                None => continue,
            };
            let payment_date = payment.padded_payment_date();
            let status = PaymentDateStatus::classify(
                &payment_date,
                &row.next_payment_day,
                row.expected_payment_day.as_deref(),
            );
            audited.push(PaymentAuditRow {
                user_id: payment.user_id.clone(),
                payment_date,
                next_payment_day: row.next_payment_day.clone(),
                expected_payment_day: row.expected_payment_day.clone(),
                payment_date_status: status,
            });
        }
        audited
    }
}

/// Convenience entry point using the original run's horizon.
pub fn run_audit(
    events: &[AllowanceEvent],
    backend: &[BackendScheduleRow],
    payments: &[PaymentScheduleRow],
) -> AuditReport {
    ScheduleAuditor::new(default_horizon()).audit(events, backend, payments)
}

/// Keeps the newest event per user. An event with an unparseable or
/// absent timestamp only wins if the user has no dated event at all.
fn latest_event_per_user<'a>(
    events: &[&'a AllowanceEvent],
) -> BTreeMap<String, (Reference, &'a AllowanceEvent)> {
    let mut latest: BTreeMap<String, (Reference, &'a AllowanceEvent)> = BTreeMap::new();
    for &event in events {
        let reference = match parse_reference(Some(event.timestamp())) {
            Ok(reference) => reference,
            Err(err) => {
                warn!("Event for {} has a bad timestamp: {}", event.user_id(), err);
                Reference::Absent
            }
        };
        let newer = match latest.get(event.user_id()) {
            Some((Reference::At(current), _)) => match reference {
                Reference::At(candidate) => candidate > *current,
                Reference::Absent => false,
            },
            Some((Reference::Absent, _)) => !reference.is_absent(),
            None => true,
        };
        if newer {
            latest.insert(event.user_id().to_string(), (reference, event));
        }
    }
    latest
}

fn duplicate_payment_users(payments: &[PaymentScheduleRow]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for payment in payments {
        *counts.entry(payment.user_id.as_str()).or_insert(0) += 1;
    }
    let duplicates: Vec<(String, usize)> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(user, count)| (user.to_string(), count))
        .collect();
    if !duplicates.is_empty() {
        info!("{} duplicate user_ids in the payment table", duplicates.len());
    }
    duplicates
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64) * 100.0
    }
}
