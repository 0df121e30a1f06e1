use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::aggregate;
use crate::error::DashboardError;
use crate::models::AppointmentRecord;

/// Write the branch, peak-hour, and service tables as CSV files in the
/// output directory. Daily trend stays dashboard-only. Existing files of
/// the same names are overwritten.
pub fn export_csv_reports(records: &[AppointmentRecord], out_dir: &Path) -> anyhow::Result<()> {
    ensure_out_dir(out_dir)?;
    write_report(&out_dir.join("branch_summary.csv"), &aggregate::branch_summary(records))?;
    write_report(&out_dir.join("peak_hours.csv"), &aggregate::peak_hours(records))?;
    write_report(
        &out_dir.join("service_breakdown.csv"),
        &aggregate::service_breakdown(records),
    )?;
    println!("CSV reports exported to {}.", out_dir.display());
    Ok(())
}

pub fn ensure_out_dir(out_dir: &Path) -> Result<(), DashboardError> {
    fs::create_dir_all(out_dir).map_err(|source| DashboardError::OutputDir {
        path: out_dir.to_path_buf(),
        source,
    })
}

fn write_report<T: Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open {} for writing", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("failed to write a row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}
