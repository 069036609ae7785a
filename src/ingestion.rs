use crate::error::Result;
use crate::schema::{AllowanceEvent, BackendScheduleRow, PaymentScheduleRow};
use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Loads the allowance event log (nested JSON array).
pub fn load_events(path: &Path) -> Result<Vec<AllowanceEvent>> {
    let file = File::open(path)?;
    let events: Vec<AllowanceEvent> = serde_json::from_reader(BufReader::new(file))?;
    info!("Loaded {} events from {}", events.len(), path.display());
    Ok(events)
}

/// Loads the backend schedule table (CSV with header row).
pub fn load_backend_table(path: &Path) -> Result<Vec<BackendScheduleRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: BackendScheduleRow = record?;
        rows.push(row);
    }
    info!(
        "Loaded {} backend schedule rows from {}",
        rows.len(),
        path.display()
    );
    Ok(rows)
}

/// Loads the observed payment table (CSV with header row).
pub fn load_payment_table(path: &Path) -> Result<Vec<PaymentScheduleRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: PaymentScheduleRow = record?;
        rows.push(row);
    }
    info!(
        "Loaded {} payment rows from {}",
        rows.len(),
        path.display()
    );
    Ok(rows)
}
