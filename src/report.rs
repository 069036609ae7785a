use crate::audit::{PaymentAuditRow, ReconciledRow};
use crate::error::Result;
use log::info;
use std::path::Path;

/// Writes the reconciled rows that were not fully consistent, one CSV
/// line per user, discrepancy reason included where one was assigned.
pub fn write_discrepancy_report(rows: &[ReconciledRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(
        "Wrote {} discrepancy rows to {}",
        rows.len(),
        path.display()
    );
    Ok(())
}

/// Writes the observed-payment comparison with its four-way status.
pub fn write_payment_report(rows: &[PaymentAuditRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("Wrote {} payment rows to {}", rows.len(), path.display());
    Ok(())
}
