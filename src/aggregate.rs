use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::DashboardError;
use crate::models::{
    AppointmentRecord, BranchSummaryRow, DailyTrendRow, KpiSummary, PeakHourRow,
    ServiceBreakdownRow,
};

#[derive(Debug, Default)]
struct GroupTotals {
    appointments: u64,
    revenue: f64,
    rows: usize,
}

impl GroupTotals {
    fn avg_appointments(&self) -> f64 {
        self.appointments as f64 / self.rows as f64
    }

    fn avg_revenue(&self) -> f64 {
        self.revenue / self.rows as f64
    }
}

/// Fold records into per-key totals. Every aggregate table is a view over
/// this one primitive with a different key selector; the map is ordered by
/// key, so hour and date tables come out already sorted.
fn group_totals<K, F>(records: &[AppointmentRecord], key: F) -> BTreeMap<K, GroupTotals>
where
    K: Ord,
    F: Fn(&AppointmentRecord) -> K,
{
    let mut groups: BTreeMap<K, GroupTotals> = BTreeMap::new();
    for record in records {
        let entry = groups.entry(key(record)).or_default();
        entry.appointments += record.appointments;
        entry.revenue += record.revenue;
        entry.rows += 1;
    }
    groups
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Totals and averages per branch, sorted by total revenue descending.
/// Ties fall back to the branch label so the order is deterministic.
pub fn branch_summary(records: &[AppointmentRecord]) -> Vec<BranchSummaryRow> {
    let mut rows: Vec<BranchSummaryRow> = group_totals(records, |r| r.branch.clone())
        .into_iter()
        .map(|(branch, totals)| BranchSummaryRow {
            branch,
            total_appointments: totals.appointments,
            total_revenue: round2(totals.revenue),
            avg_daily_revenue: round2(totals.avg_revenue()),
            revenue_per_appointment: if totals.appointments == 0 {
                None
            } else {
                Some(round2(totals.revenue / totals.appointments as f64))
            },
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_revenue
            .partial_cmp(&a.total_revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.branch.cmp(&b.branch))
    });
    rows
}

/// Average appointments and revenue per hour of day, ascending by hour.
/// Hours with no records are absent rather than zero-filled.
pub fn peak_hours(records: &[AppointmentRecord]) -> Vec<PeakHourRow> {
    group_totals(records, |r| r.hour)
        .into_iter()
        .map(|(hour, totals)| PeakHourRow {
            hour,
            avg_appointments: round2(totals.avg_appointments()),
            avg_revenue: round2(totals.avg_revenue()),
        })
        .collect()
}

/// Revenue contribution per service type, sorted by revenue descending.
pub fn service_breakdown(records: &[AppointmentRecord]) -> Vec<ServiceBreakdownRow> {
    let mut rows: Vec<ServiceBreakdownRow> = group_totals(records, |r| r.service_type.clone())
        .into_iter()
        .map(|(service_type, totals)| ServiceBreakdownRow {
            service_type,
            total_revenue: round2(totals.revenue),
            total_appointments: totals.appointments,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_revenue
            .partial_cmp(&a.total_revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.service_type.cmp(&b.service_type))
    });
    rows
}

/// Daily revenue and appointment totals, ascending by date.
pub fn daily_trend(records: &[AppointmentRecord]) -> Vec<DailyTrendRow> {
    group_totals(records, |r| r.date)
        .into_iter()
        .map(|(date, totals)| DailyTrendRow {
            date,
            daily_revenue: round2(totals.revenue),
            daily_appointments: totals.appointments,
        })
        .collect()
}

/// Headline figures for the KPI panel. The best-branch and peak-hour
/// extremes are undefined over zero rows, so an empty dataset is an error
/// here while the table aggregates simply return empty tables.
pub fn kpi_summary(records: &[AppointmentRecord]) -> Result<KpiSummary, DashboardError> {
    let branches = branch_summary(records);
    let best_branch = branches
        .first()
        .map(|row| row.branch.clone())
        .ok_or(DashboardError::EmptyDataset {
            metric: "best branch",
        })?;

    // Rows ascend by hour, so a strictly-greater reduce keeps the
    // earliest hour when averages tie.
    let peak_hour = peak_hours(records)
        .into_iter()
        .reduce(|best, row| {
            if row.avg_appointments > best.avg_appointments {
                row
            } else {
                best
            }
        })
        .map(|row| row.hour)
        .ok_or(DashboardError::EmptyDataset { metric: "peak hour" })?;

    Ok(KpiSummary {
        total_revenue: round2(records.iter().map(|r| r.revenue).sum()),
        total_appointments: records.iter().map(|r| r.appointments).sum(),
        best_branch,
        peak_hour,
        branch_count: branches.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        date: &str,
        branch: &str,
        hour: u8,
        appointments: u64,
        revenue: f64,
        service_type: &str,
    ) -> AppointmentRecord {
        AppointmentRecord {
            date: date.parse::<NaiveDate>().expect("valid date"),
            branch: branch.to_string(),
            hour,
            appointments,
            revenue,
            service_type: service_type.to_string(),
        }
    }

    fn sample_records() -> Vec<AppointmentRecord> {
        vec![
            record("2024-01-01", "A", 9, 2, 100.0, "X"),
            record("2024-01-01", "A", 9, 1, 50.0, "Y"),
            record("2024-01-02", "B", 14, 4, 200.0, "X"),
        ]
    }

    #[test]
    fn branch_summary_sorts_by_revenue_descending() {
        let rows = branch_summary(&sample_records());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].branch, "B");
        assert_eq!(rows[0].total_revenue, 200.0);
        assert_eq!(rows[0].total_appointments, 4);
        assert_eq!(rows[0].revenue_per_appointment, Some(50.0));
        assert_eq!(rows[1].branch, "A");
        assert_eq!(rows[1].total_revenue, 150.0);
        assert_eq!(rows[1].total_appointments, 3);
        assert_eq!(rows[1].revenue_per_appointment, Some(50.0));
    }

    #[test]
    fn branch_totals_preserve_the_input_sums() {
        let records = sample_records();
        let rows = branch_summary(&records);
        let revenue: f64 = rows.iter().map(|r| r.total_revenue).sum();
        let appointments: u64 = rows.iter().map(|r| r.total_appointments).sum();
        assert!((revenue - 350.0).abs() < 1e-9);
        assert_eq!(appointments, 7);
    }

    #[test]
    fn branch_average_is_per_record_not_per_day() {
        let rows = branch_summary(&sample_records());
        let branch_a = rows.iter().find(|r| r.branch == "A").unwrap();
        assert_eq!(branch_a.avg_daily_revenue, 75.0);
    }

    #[test]
    fn revenue_ties_break_on_branch_label() {
        let records = vec![
            record("2024-01-01", "Zeta", 9, 1, 100.0, "X"),
            record("2024-01-01", "Alpha", 9, 1, 100.0, "X"),
        ];
        let rows = branch_summary(&records);
        assert_eq!(rows[0].branch, "Alpha");
        assert_eq!(rows[1].branch, "Zeta");
    }

    #[test]
    fn zero_appointments_yields_no_ratio() {
        let records = vec![record("2024-01-01", "A", 9, 0, 40.0, "X")];
        let rows = branch_summary(&records);
        assert_eq!(rows[0].revenue_per_appointment, None);
    }

    #[test]
    fn peak_hours_averages_per_hour_and_skips_absent_hours() {
        let rows = peak_hours(&sample_records());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].hour, 9);
        assert_eq!(rows[0].avg_appointments, 1.5);
        assert_eq!(rows[0].avg_revenue, 75.0);
        assert_eq!(rows[1].hour, 14);
        assert_eq!(rows[1].avg_appointments, 4.0);
    }

    #[test]
    fn averages_round_to_two_decimals() {
        // Mean revenue is 10/3, which only terminates after rounding.
        let records = vec![
            record("2024-01-01", "A", 9, 1, 1.0, "X"),
            record("2024-01-02", "A", 9, 1, 1.0, "X"),
            record("2024-01-03", "A", 9, 1, 8.0, "X"),
        ];
        let rows = peak_hours(&records);
        assert_eq!(rows[0].avg_revenue, 3.33);
        assert_eq!(rows[0].avg_appointments, 1.0);
    }

    #[test]
    fn service_breakdown_sorts_by_revenue_descending() {
        let rows = service_breakdown(&sample_records());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].service_type, "X");
        assert_eq!(rows[0].total_revenue, 300.0);
        assert_eq!(rows[0].total_appointments, 6);
        assert_eq!(rows[1].service_type, "Y");
        assert_eq!(rows[1].total_revenue, 50.0);
    }

    #[test]
    fn daily_trend_is_ordered_by_date() {
        let records = vec![
            record("2024-01-03", "A", 9, 1, 30.0, "X"),
            record("2024-01-01", "A", 9, 1, 10.0, "X"),
            record("2024-01-02", "A", 9, 1, 20.0, "X"),
        ];
        let rows = daily_trend(&records);
        let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![
                "2024-01-01".parse().unwrap(),
                "2024-01-02".parse().unwrap(),
                "2024-01-03".parse().unwrap(),
            ]
        );
        assert_eq!(rows[2].daily_revenue, 30.0);
    }

    #[test]
    fn group_keys_cover_exactly_the_distinct_values() {
        let records = sample_records();
        let branches: Vec<String> = branch_summary(&records)
            .into_iter()
            .map(|r| r.branch)
            .collect();
        assert_eq!(branches.len(), 2);
        assert!(branches.contains(&"A".to_string()));
        assert!(branches.contains(&"B".to_string()));
        let hours: Vec<u8> = peak_hours(&records).into_iter().map(|r| r.hour).collect();
        assert_eq!(hours, vec![9, 14]);
    }

    #[test]
    fn kpi_summary_picks_extremes_by_definition() {
        let kpis = kpi_summary(&sample_records()).expect("kpis");
        assert_eq!(kpis.total_revenue, 350.0);
        assert_eq!(kpis.total_appointments, 7);
        assert_eq!(kpis.best_branch, "B");
        // Hour 14 averages 4.0 appointments against hour 9's 1.5, despite
        // hour 9 carrying more rows.
        assert_eq!(kpis.peak_hour, 14);
        assert_eq!(kpis.branch_count, 2);
    }

    #[test]
    fn peak_hour_tie_goes_to_the_earlier_hour() {
        let records = vec![
            record("2024-01-01", "A", 14, 2, 80.0, "X"),
            record("2024-01-01", "A", 9, 2, 60.0, "X"),
        ];
        let kpis = kpi_summary(&records).expect("kpis");
        assert_eq!(kpis.peak_hour, 9);
    }

    #[test]
    fn empty_dataset_gives_empty_tables_and_a_kpi_error() {
        let records: Vec<AppointmentRecord> = Vec::new();
        assert!(branch_summary(&records).is_empty());
        assert!(peak_hours(&records).is_empty());
        assert!(service_breakdown(&records).is_empty());
        assert!(daily_trend(&records).is_empty());
        let err = kpi_summary(&records).unwrap_err();
        assert!(matches!(err, DashboardError::EmptyDataset { .. }));
    }
}
