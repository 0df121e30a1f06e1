use std::path::Path;

use crate::error::DashboardError;
use crate::models::AppointmentRecord;

const REQUIRED_COLUMNS: [&str; 6] = [
    "date",
    "branch",
    "hour",
    "appointments",
    "revenue",
    "service_type",
];

/// Read all appointment records from a CSV file. The header must carry
/// every required column; column order does not matter. The date column
/// is coerced to a calendar date, numeric columns to their types; any
/// malformed field fails the whole load.
pub fn load_records(path: &Path) -> Result<Vec<AppointmentRecord>, DashboardError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| DashboardError::DataLoad {
        path: path.to_path_buf(),
        source,
    })?;

    let headers = reader
        .headers()
        .map_err(|source| DashboardError::DataLoad {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(DashboardError::MissingColumn {
                column,
                path: path.to_path_buf(),
            });
        }
    }

    let mut records = Vec::new();
    for result in reader.deserialize::<AppointmentRecord>() {
        let record = result.map_err(|source| DashboardError::DataLoad {
            path: path.to_path_buf(),
            source,
        })?;
        records.push(record);
    }

    println!("Loaded {} records from {}.", records.len(), path.display());
    Ok(records)
}
