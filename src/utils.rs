use crate::error::{Result, ScheduleError};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// A reference point resolved at the boundary: either a concrete
/// timestamp or "no data". Absent is a valid state, never an error, and
/// downstream code never re-checks the raw text forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    At(NaiveDateTime),
    Absent,
}

impl Reference {
    pub fn is_absent(&self) -> bool {
        matches!(self, Reference::Absent)
    }
}

impl From<NaiveDateTime> for Reference {
    fn from(value: NaiveDateTime) -> Self {
        Reference::At(value)
    }
}

/// Normalizes a textual reference timestamp.
///
/// Null, empty, and `NaT` markers resolve to [`Reference::Absent`]. Any
/// sub-second fraction is stripped, then the timestamped format
/// `%Y-%m-%d %H:%M:%S` is tried first, falling back to the date-only
/// `%d/%m/%Y` form. Text matching neither format is an error.
pub fn parse_reference(raw: Option<&str>) -> Result<Reference> {
    let text = match raw {
        Some(t) => t.trim(),
        None => return Ok(Reference::Absent),
    };
    if text.is_empty() || text == "NaT" {
        return Ok(Reference::Absent);
    }

    let head = text.split('.').next().unwrap_or(text);

    if let Ok(dt) = NaiveDateTime::parse_from_str(head, "%Y-%m-%d %H:%M:%S") {
        return Ok(Reference::At(dt));
    }
    if let Ok(date) = NaiveDate::parse_from_str(head, "%d/%m/%Y") {
        return Ok(Reference::At(date.and_hms_opt(0, 0, 0).unwrap()));
    }

    Err(ScheduleError::UnparseableTimestamp(text.to_string()))
}

/// Normalizes the backend `updated_at` column, which arrives either as a
/// timestamp string (possibly timezone-suffixed) or as unix seconds.
/// Unrecognized values coerce to [`Reference::Absent`] rather than
/// failing, matching how the backend export is cleaned: the row survives
/// with no opinion about its update time.
pub fn parse_backend_timestamp(raw: Option<&str>) -> Reference {
    let text = match raw {
        Some(t) => t.trim(),
        None => return Reference::Absent,
    };
    if text.is_empty() || text == "NaT" {
        return Reference::Absent;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Reference::At(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Reference::At(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
        return Reference::At(dt);
    }
    if let Ok(secs) = text.parse::<i64>() {
        if let Some(dt) = DateTime::from_timestamp(secs, 0) {
            return Reference::At(dt.naive_utc());
        }
    }

    Reference::Absent
}

/// Day-of-month as the two-character zero-padded form used for payment
/// day comparisons.
pub fn two_digit_day(date: NaiveDate) -> String {
    format!("{:02}", date.day())
}

pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let year = if date.month() == 12 {
        date.year() + 1
    } else {
        date.year()
    };
    let month = if date.month() == 12 {
        1
    } else {
        date.month() + 1
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

pub fn fifteenth_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 15).unwrap()
}

pub fn fifteenth_of_next_month(date: NaiveDate) -> NaiveDate {
    let year = if date.month() == 12 {
        date.year() + 1
    } else {
        date.year()
    };
    let month = if date.month() == 12 {
        1
    } else {
        date.month() + 1
    };
    NaiveDate::from_ymd_opt(year, month, 15).unwrap()
}
