use crate::error::{Result, ScheduleError};
use crate::rule::{MonthlyAnchor, RecurrenceRule};
use crate::utils::{
    fifteenth_of_month, fifteenth_of_next_month, first_of_next_month, two_digit_day, Reference,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// Horizon date the original evaluation run was pinned to. The projector
/// takes the horizon as a parameter; this is only a convenient default.
pub fn default_horizon() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 3).unwrap()
}

/// Advances a reference by exactly one recurrence step. Every branch
/// lands strictly after the reference, which bounds the projector loop.
///
/// Week-based rules resolve the anchor weekday against the Monday=0 ..
/// Sunday=6 index table: a reference already on the anchor weekday jumps
/// a full `7 * increment` days (the occurrence is never "today"), any
/// other weekday takes the gap plus `7 * (increment - 1)` days. Monthly
/// rules land on midnight of the anchored day with December rolling into
/// January of the next year.
pub fn next_occurrence(reference: NaiveDateTime, rule: RecurrenceRule) -> NaiveDateTime {
    match rule {
        RecurrenceRule::Daily => reference + Duration::days(1),
        RecurrenceRule::Weekly(anchor) | RecurrenceRule::Biweekly(anchor) => {
            let increment = rule.week_increment();
            let delta = (anchor.num_days_from_monday() as i64
                - reference.weekday().num_days_from_monday() as i64)
                .rem_euclid(7);
            let days = if delta == 0 {
                7 * increment
            } else {
                delta + 7 * (increment - 1)
            };
            reference + Duration::days(days)
        }
        RecurrenceRule::Monthly(MonthlyAnchor::FirstDay) => first_of_next_month(reference.date())
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        RecurrenceRule::Monthly(MonthlyAnchor::FifteenthDay) => {
            let date = reference.date();
            let next = if date.day() < 15 {
                fifteenth_of_month(date)
            } else {
                fifteenth_of_next_month(date)
            };
            next.and_hms_opt(0, 0, 0).unwrap()
        }
    }
}

/// Repeatedly advances the reference until the computed occurrence date
/// is strictly after `horizon`, returning the final landing date.
pub fn project_to_horizon(
    reference: NaiveDateTime,
    rule: RecurrenceRule,
    horizon: NaiveDate,
) -> Result<NaiveDate> {
    let mut current = reference;
    loop {
        let next = next_occurrence(current, rule);
        if next <= current {
            return Err(ScheduleError::NonAdvancingRule {
                from: current.to_string(),
                to: next.to_string(),
            });
        }
        current = next;
        if current.date() > horizon {
            break;
        }
    }

    // Residual guard carried over from the reference behavior: the loop
    // only exits past the horizon, so this cannot fire today. The step is
    // derived from the rule itself, never from loop-local state.
    if current.date() <= horizon {
        current = next_occurrence(current, rule);
    }

    Ok(current.date())
}

/// Projects the payment day a schedule observed at `reference` settles on
/// by `horizon`. Absent references yield `None`; the returned day is
/// always two zero-padded characters.
pub fn project_occurrence(
    reference: Reference,
    frequency: &str,
    day: &str,
    horizon: NaiveDate,
) -> Result<Option<String>> {
    let start = match reference {
        Reference::At(dt) => dt,
        Reference::Absent => return Ok(None),
    };
    let rule = RecurrenceRule::parse(frequency, day)?;
    let landed = project_to_horizon(start, rule, horizon)?;
    Ok(Some(two_digit_day(landed)))
}

/// Computes the very next payment day after `reference` — one step, no
/// horizon. Same normalization and arithmetic as the projector's inner
/// step, applied exactly once.
pub fn increment_once(reference: Reference, frequency: &str, day: &str) -> Result<Option<String>> {
    let start = match reference {
        Reference::At(dt) => dt,
        Reference::Absent => return Ok(None),
    };
    let rule = RecurrenceRule::parse(frequency, day)?;
    Ok(Some(two_digit_day(next_occurrence(start, rule).date())))
}
