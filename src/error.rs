use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("failed to load data from {path}: {source}")]
    DataLoad {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("required column '{column}' missing from {path}")]
    MissingColumn { column: &'static str, path: PathBuf },
    #[error("cannot compute {metric}: dataset is empty")]
    EmptyDataset { metric: &'static str },
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
