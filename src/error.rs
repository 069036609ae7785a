use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Unparseable timestamp: {0:?} matches neither '%Y-%m-%d %H:%M:%S' nor '%d/%m/%Y'")]
    UnparseableTimestamp(String),

    #[error("Invalid frequency: {0:?}")]
    InvalidFrequency(String),

    #[error("Invalid day {day:?} for {frequency} frequency")]
    InvalidAnchor { frequency: &'static str, day: String },

    #[error("Recurrence step from {from} did not advance past {to}")]
    NonAdvancingRule { from: String, to: String },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
