use std::path::PathBuf;

use clap::Parser;

mod aggregate;
mod dashboard;
mod error;
mod export;
mod loader;
mod models;

use models::{BranchSummaryRow, PeakHourRow, ServiceBreakdownRow};

#[derive(Parser)]
#[command(name = "ops-dashboard")]
#[command(about = "Branch operations dashboard for appointment and revenue data", long_about = None)]
struct Cli {
    /// CSV file with appointment records
    #[arg(long, default_value = "data/sample_data.csv")]
    data: PathBuf,
    /// Directory for the exported reports and the dashboard image
    #[arg(long, default_value = "reports")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let records = loader::load_records(&cli.data)?;

    print_branch_summary(&aggregate::branch_summary(&records));
    print_peak_hours(&aggregate::peak_hours(&records));
    print_service_breakdown(&aggregate::service_breakdown(&records));

    export::export_csv_reports(&records, &cli.out_dir)?;
    dashboard::render_dashboard(&records, &cli.out_dir)?;

    Ok(())
}

fn print_branch_summary(rows: &[BranchSummaryRow]) {
    println!();
    println!("Branch Summary");
    println!(
        "{:<14} {:>14} {:>14} {:>18} {:>24}",
        "branch", "appointments", "revenue", "avg_daily_revenue", "revenue_per_appt"
    );
    for row in rows {
        let ratio = row
            .revenue_per_appointment
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<14} {:>14} {:>14.2} {:>18.2} {:>24}",
            row.branch, row.total_appointments, row.total_revenue, row.avg_daily_revenue, ratio
        );
    }
}

fn print_peak_hours(rows: &[PeakHourRow]) {
    println!();
    println!("Peak Hours");
    println!(
        "{:<6} {:>18} {:>14}",
        "hour", "avg_appointments", "avg_revenue"
    );
    for row in rows {
        println!(
            "{:<6} {:>18.2} {:>14.2}",
            row.hour, row.avg_appointments, row.avg_revenue
        );
    }
}

fn print_service_breakdown(rows: &[ServiceBreakdownRow]) {
    println!();
    println!("Service Breakdown");
    println!(
        "{:<14} {:>14} {:>14}",
        "service_type", "revenue", "appointments"
    );
    for row in rows {
        println!(
            "{:<14} {:>14.2} {:>14}",
            row.service_type, row.total_revenue, row.total_appointments
        );
    }
}
