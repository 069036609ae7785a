use crate::error::{Result, ScheduleError};
use chrono::Weekday;

/// Anchor variants for a monthly schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthlyAnchor {
    /// Payments land on the 1st of a month.
    FirstDay,
    /// Payments land on the 15th of a month.
    FifteenthDay,
}

/// A validated recurrence rule: frequency plus the anchor that is legal
/// for that frequency. Invalid combinations (e.g. monthly + "tuesday")
/// cannot be constructed; they are rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceRule {
    Daily,
    Weekly(Weekday),
    Biweekly(Weekday),
    Monthly(MonthlyAnchor),
}

impl RecurrenceRule {
    /// Builds a rule from the loose `frequency` / `day` text fields the
    /// backend and event tables carry. Distinguishes an unknown frequency
    /// from a day that is out of domain for an otherwise-valid frequency.
    pub fn parse(frequency: &str, day: &str) -> Result<Self> {
        match frequency.trim().to_lowercase().as_str() {
            // Daily schedules carry no meaningful anchor; the day field is ignored.
            "daily" => Ok(RecurrenceRule::Daily),
            "weekly" => Ok(RecurrenceRule::Weekly(parse_weekday("weekly", day)?)),
            "biweekly" => Ok(RecurrenceRule::Biweekly(parse_weekday("biweekly", day)?)),
            "monthly" => match day.trim().to_lowercase().as_str() {
                "first_day" => Ok(RecurrenceRule::Monthly(MonthlyAnchor::FirstDay)),
                "fifteenth_day" => Ok(RecurrenceRule::Monthly(MonthlyAnchor::FifteenthDay)),
                _ => Err(ScheduleError::InvalidAnchor {
                    frequency: "monthly",
                    day: day.to_string(),
                }),
            },
            _ => Err(ScheduleError::InvalidFrequency(frequency.to_string())),
        }
    }

    /// Number of weeks added per step for week-based frequencies.
    pub fn week_increment(&self) -> i64 {
        match self {
            RecurrenceRule::Biweekly(_) => 2,
            _ => 1,
        }
    }
}

/// Weekday anchors use Monday=0 .. Saturday=5, Sunday=6 indexing.
/// `Weekday::num_days_from_monday` produces exactly that table.
fn parse_weekday(frequency: &'static str, day: &str) -> Result<Weekday> {
    match day.trim().to_lowercase().as_str() {
        "monday" => Ok(Weekday::Mon),
        "tuesday" => Ok(Weekday::Tue),
        "wednesday" => Ok(Weekday::Wed),
        "thursday" => Ok(Weekday::Thu),
        "friday" => Ok(Weekday::Fri),
        "saturday" => Ok(Weekday::Sat),
        "sunday" => Ok(Weekday::Sun),
        _ => Err(ScheduleError::InvalidAnchor {
            frequency,
            day: day.to_string(),
        }),
    }
}
