use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a backend row disagrees with the event log about the payment day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscrepancyReason {
    /// The backend and event timestamps are close together, so the wrong
    /// day cannot be explained by stale data: the scheduling logic itself
    /// produced it.
    #[serde(rename = "backend logic issues")]
    BackendLogicIssue,

    /// The backend state lags the event log by a day or more; the
    /// mismatch is explained by propagation delay.
    #[serde(rename = "timestamp delay issue")]
    TimestampDelayIssue,
}

impl fmt::Display for DiscrepancyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscrepancyReason::BackendLogicIssue => write!(f, "backend logic issues"),
            DiscrepancyReason::TimestampDelayIssue => write!(f, "timestamp delay issue"),
        }
    }
}

/// Classifies the signed gap between the event timestamp and the backend
/// `updated_at`. Total over any duration.
pub fn classify_timestamp_gap(gap: Duration) -> DiscrepancyReason {
    if gap.abs() < Duration::days(1) {
        DiscrepancyReason::BackendLogicIssue
    } else {
        DiscrepancyReason::TimestampDelayIssue
    }
}

/// Where an observed payment date stands relative to the two days the
/// system can derive: the backend's stored `next_payment_day` and the day
/// projected from the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentDateStatus {
    #[serde(rename = "correct payment date")]
    Correct,

    /// Payment followed the backend but the backend disagrees with the
    /// event projection.
    #[serde(rename = "backend error - logic")]
    BackendLogic,

    /// Payment followed the event projection but not the backend's stored
    /// day.
    #[serde(rename = "backend error - timestamp")]
    BackendTimestamp,

    /// Payment matches neither derived day.
    #[serde(rename = "unknown error")]
    Unknown,
}

impl PaymentDateStatus {
    /// Compares an observed payment day against the backend day and the
    /// event-projected day. All three sides are two-digit day strings; a
    /// missing projection never matches.
    pub fn classify(observed: &str, backend: &str, expected: Option<&str>) -> Self {
        let matches_backend = observed == backend;
        let matches_expected = expected.map(|e| observed == e).unwrap_or(false);
        match (matches_backend, matches_expected) {
            (true, false) => PaymentDateStatus::BackendLogic,
            (false, true) => PaymentDateStatus::BackendTimestamp,
            (false, false) => PaymentDateStatus::Unknown,
            (true, true) => PaymentDateStatus::Correct,
        }
    }
}

impl fmt::Display for PaymentDateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentDateStatus::Correct => write!(f, "correct payment date"),
            PaymentDateStatus::BackendLogic => write!(f, "backend error - logic"),
            PaymentDateStatus::BackendTimestamp => write!(f, "backend error - timestamp"),
            PaymentDateStatus::Unknown => write!(f, "unknown error"),
        }
    }
}
