use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One entry of the allowance event log (`allowance_events.json`). The
/// log is nested JSON; field access for the flat columns the pipeline
/// works with goes through the accessor methods.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AllowanceEvent {
    pub event: EventEnvelope,
    pub user: UserRef,
    pub allowance: AllowanceDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EventEnvelope {
    #[schemars(description = "Event type, e.g. 'allowance.scheduled' or 'allowance.edited'")]
    pub name: String,

    #[schemars(description = "When the user action happened, as 'YYYY-MM-DD HH:MM:SS'")]
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UserRef {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AllowanceDetails {
    #[schemars(description = "Allowance amount per occurrence")]
    pub amount: f64,

    pub scheduled: ScheduledAllowance,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScheduledAllowance {
    #[schemars(description = "Recurrence cadence: daily, weekly, biweekly or monthly")]
    pub frequency: String,

    #[schemars(
        description = "Anchor day: a weekday name for weekly/biweekly, 'first_day' or 'fifteenth_day' for monthly"
    )]
    pub day: String,
}

impl AllowanceEvent {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn timestamp(&self) -> &str {
        &self.event.timestamp
    }

    pub fn frequency(&self) -> &str {
        &self.allowance.scheduled.frequency
    }

    pub fn day(&self) -> &str {
        &self.allowance.scheduled.day
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AllowanceEvent)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// One row of `allowance_backend_table.csv`: the schedule configuration
/// the backend currently holds for a user.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BackendScheduleRow {
    pub uuid: String,

    pub creation_date: String,

    pub frequency: String,

    pub day: String,

    #[schemars(description = "Day of month the backend expects the next payment on")]
    pub next_payment_day: u32,

    #[schemars(description = "Schedule status; 'disabled' rows are excluded from reconciliation")]
    pub status: String,

    #[schemars(
        description = "Last backend update, as a timestamp string or unix seconds; may be empty"
    )]
    pub updated_at: Option<String>,
}

impl BackendScheduleRow {
    pub fn is_disabled(&self) -> bool {
        self.status == "disabled"
    }

    /// The stored day in the two-digit form used for comparisons.
    pub fn padded_next_payment_day(&self) -> String {
        format!("{:02}", self.next_payment_day)
    }
}

/// One row of `payment_schedule_backend_table.csv`: a payment date the
/// execution system actually observed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PaymentScheduleRow {
    pub user_id: String,

    #[schemars(description = "Observed day of month the payment executed on")]
    pub payment_date: u32,
}

impl PaymentScheduleRow {
    pub fn padded_payment_date(&self) -> String {
        format!("{:02}", self.payment_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_deserializes_from_nested_json() {
        let json = r#"{
            "event": {"name": "allowance.scheduled", "timestamp": "2024-01-10 08:00:00"},
            "user": {"id": "user-1"},
            "allowance": {
                "amount": 25.0,
                "scheduled": {"frequency": "weekly", "day": "wednesday"}
            }
        }"#;

        let event: AllowanceEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.user_id(), "user-1");
        assert_eq!(event.timestamp(), "2024-01-10 08:00:00");
        assert_eq!(event.frequency(), "weekly");
        assert_eq!(event.day(), "wednesday");
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = AllowanceEvent::schema_as_json().unwrap();
        assert!(schema_json.contains("frequency"));
        assert!(schema_json.contains("timestamp"));
    }

    #[test]
    fn test_backend_row_helpers() {
        let row = BackendScheduleRow {
            uuid: "user-1".to_string(),
            creation_date: "2023-11-02".to_string(),
            frequency: "monthly".to_string(),
            day: "first_day".to_string(),
            next_payment_day: 1,
            status: "enabled".to_string(),
            updated_at: Some("2024-05-01 10:30:00".to_string()),
        };
        assert!(!row.is_disabled());
        assert_eq!(row.padded_next_payment_day(), "01");
    }

    #[test]
    fn test_payment_row_padding() {
        let row = PaymentScheduleRow {
            user_id: "user-1".to_string(),
            payment_date: 7,
        };
        assert_eq!(row.padded_payment_date(), "07");
    }
}
