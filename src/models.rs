use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the input file. Records have no identity beyond their
/// position and are never mutated after load.
#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentRecord {
    pub date: NaiveDate,
    pub branch: String,
    pub hour: u8,
    pub appointments: u64,
    pub revenue: f64,
    pub service_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BranchSummaryRow {
    pub branch: String,
    pub total_appointments: u64,
    pub total_revenue: f64,
    /// Mean revenue per record, not per calendar day.
    pub avg_daily_revenue: f64,
    /// None when the branch has zero appointments.
    pub revenue_per_appointment: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeakHourRow {
    pub hour: u8,
    pub avg_appointments: f64,
    pub avg_revenue: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceBreakdownRow {
    pub service_type: String,
    pub total_revenue: f64,
    pub total_appointments: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyTrendRow {
    pub date: NaiveDate,
    pub daily_revenue: f64,
    pub daily_appointments: u64,
}

/// Headline figures for the dashboard KPI panel.
#[derive(Debug, Clone)]
pub struct KpiSummary {
    pub total_revenue: f64,
    pub total_appointments: u64,
    pub best_branch: String,
    pub peak_hour: u8,
    pub branch_count: usize,
}
