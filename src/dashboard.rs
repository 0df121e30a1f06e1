use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::aggregate;
use crate::export::ensure_out_dir;
use crate::models::{
    AppointmentRecord, BranchSummaryRow, DailyTrendRow, KpiSummary, PeakHourRow,
    ServiceBreakdownRow,
};

const BAR_BLUE: RGBColor = RGBColor(0x4a, 0x90, 0xd9);
const LINE_RED: RGBColor = RGBColor(0xe7, 0x4c, 0x3c);
const TREND_ORANGE: RGBColor = RGBColor(0xf3, 0x9c, 0x12);
const PIE_PALETTE: [RGBColor; 3] = [
    RGBColor(0x2e, 0xcc, 0x71),
    RGBColor(0x34, 0x98, 0xdb),
    RGBColor(0x9b, 0x59, 0xb6),
];

// Plotters errors are generic over the drawing backend, so they are
// flattened to a message here instead of carried as a source.
fn chart_err(err: impl std::fmt::Display) -> anyhow::Error {
    anyhow::anyhow!("chart rendering failed: {err}")
}

fn timestamped_file_name(now: NaiveDateTime) -> String {
    format!("dashboard_{}.png", now.format("%Y%m%d_%H%M%S"))
}

/// Render the five-panel dashboard image into the output directory.
/// The file name carries a generation timestamp so repeated runs never
/// overwrite earlier dashboards.
pub fn render_dashboard(records: &[AppointmentRecord], out_dir: &Path) -> anyhow::Result<PathBuf> {
    let branches = aggregate::branch_summary(records);
    let hours = aggregate::peak_hours(records);
    let services = aggregate::service_breakdown(records);
    let trend = aggregate::daily_trend(records);
    let kpis = aggregate::kpi_summary(records)?;

    ensure_out_dir(out_dir)?;
    let path = out_dir.join(timestamped_file_name(Local::now().naive_local()));

    // The backend borrows `path`; keep every drawing area inside this
    // scope so the borrow ends before the path is handed back.
    {
        let root = BitMapBackend::new(&path, (1600, 1000)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;
        let root = root
            .titled("Branch Operations Dashboard", ("sans-serif", 32))
            .map_err(chart_err)?;

        let (top, bottom) = root.split_vertically(460);
        let top_panels = top.split_evenly((1, 3));
        draw_branch_bars(&top_panels[0], &branches)?;
        draw_peak_hours(&top_panels[1], &hours)?;
        draw_service_pie(&top_panels[2], &services)?;

        let (trend_area, kpi_area) = bottom.split_horizontally(1060);
        draw_daily_trend(&trend_area, &trend)?;
        draw_kpi_table(&kpi_area, &kpis)?;

        root.present().map_err(chart_err)?;
    }

    println!("Dashboard saved to {}.", path.display());
    Ok(path)
}

fn draw_branch_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    rows: &[BranchSummaryRow],
) -> anyhow::Result<()> {
    let max_revenue = rows
        .iter()
        .map(|r| r.total_revenue)
        .fold(0.0f64, f64::max)
        .max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption("Total Revenue by Branch", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..rows.len().max(1) as f64, 0f64..max_revenue * 1.2)
        .map_err(chart_err)?;

    let labels: Vec<&str> = rows.iter().map(|r| r.branch.as_str()).collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(rows.len())
        .x_label_formatter(&|x| {
            labels
                .get(x.floor() as usize)
                .map(|s| s.to_string())
                .unwrap_or_default()
        })
        .y_desc("Revenue (GBP)")
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(rows.iter().enumerate().map(|(i, row)| {
            Rectangle::new(
                [(i as f64 + 0.2, 0.0), (i as f64 + 0.8, row.total_revenue)],
                BAR_BLUE.filled(),
            )
        }))
        .map_err(chart_err)?;

    // Value labels above each bar, like the exported CSV but eyeballable.
    chart
        .draw_series(rows.iter().enumerate().map(|(i, row)| {
            Text::new(
                format!("{:.0}", row.total_revenue),
                (i as f64 + 0.5, row.total_revenue + max_revenue * 0.04),
                ("sans-serif", 13).into_font(),
            )
        }))
        .map_err(chart_err)?;

    Ok(())
}

fn draw_peak_hours<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    rows: &[PeakHourRow],
) -> anyhow::Result<()> {
    let max_avg = rows
        .iter()
        .map(|r| r.avg_appointments)
        .fold(0.0f64, f64::max)
        .max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption("Peak Hours (Avg Appointments)", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0i32..24i32, 0f64..max_avg * 1.2)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("Hour of Day")
        .y_desc("Avg Appointments")
        .draw()
        .map_err(chart_err)?;

    let points: Vec<(i32, f64)> = rows
        .iter()
        .map(|r| (i32::from(r.hour), r.avg_appointments))
        .collect();

    chart
        .draw_series(AreaSeries::new(points.iter().copied(), 0.0, LINE_RED.mix(0.15)))
        .map_err(chart_err)?;
    chart
        .draw_series(LineSeries::new(points.iter().copied(), LINE_RED.stroke_width(2)))
        .map_err(chart_err)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|&(hour, avg)| Circle::new((hour, avg), 3, LINE_RED.filled())),
        )
        .map_err(chart_err)?;

    Ok(())
}

fn draw_service_pie<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    rows: &[ServiceBreakdownRow],
) -> anyhow::Result<()> {
    let area = area
        .titled("Revenue by Service Type", ("sans-serif", 20))
        .map_err(chart_err)?;

    let total: f64 = rows.iter().map(|r| r.total_revenue).sum();
    if total <= 0.0 {
        return Ok(());
    }

    let sizes: Vec<f64> = rows.iter().map(|r| r.total_revenue).collect();
    // Fixed palette, cycled when there are more services than colors.
    let colors: Vec<RGBColor> = (0..rows.len())
        .map(|i| PIE_PALETTE[i % PIE_PALETTE.len()])
        .collect();
    let labels: Vec<String> = rows
        .iter()
        .map(|r| format!("{} ({:.1}%)", r.service_type, r.total_revenue / total * 100.0))
        .collect();

    let (width, height) = area.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = f64::from(width.min(height)) * 0.32;
    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style(("sans-serif", 14).into_font());
    area.draw(&pie).map_err(chart_err)?;

    Ok(())
}

fn draw_daily_trend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    rows: &[DailyTrendRow],
) -> anyhow::Result<()> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    let last = rows.last().unwrap_or(first);
    let max_revenue = rows
        .iter()
        .map(|r| r.daily_revenue)
        .fold(0.0f64, f64::max)
        .max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption("Daily Revenue Trend", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            first.date..last.date + chrono::Duration::days(1),
            0f64..max_revenue * 1.2,
        )
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Revenue (GBP)")
        .x_label_formatter(&|date| date.format("%m-%d").to_string())
        .draw()
        .map_err(chart_err)?;

    let points: Vec<(chrono::NaiveDate, f64)> =
        rows.iter().map(|r| (r.date, r.daily_revenue)).collect();

    chart
        .draw_series(AreaSeries::new(
            points.iter().copied(),
            0.0,
            TREND_ORANGE.mix(0.15),
        ))
        .map_err(chart_err)?;
    chart
        .draw_series(LineSeries::new(
            points.iter().copied(),
            TREND_ORANGE.stroke_width(2),
        ))
        .map_err(chart_err)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|&(date, revenue)| Circle::new((date, revenue), 4, TREND_ORANGE.filled())),
        )
        .map_err(chart_err)?;

    Ok(())
}

fn draw_kpi_table<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    kpis: &KpiSummary,
) -> anyhow::Result<()> {
    let area = area
        .titled("KPI Summary", ("sans-serif", 20))
        .map_err(chart_err)?;

    let lines = [
        ("Total Revenue", format!("GBP {:.2}", kpis.total_revenue)),
        ("Total Appointments", kpis.total_appointments.to_string()),
        ("Best Branch", kpis.best_branch.clone()),
        ("Peak Hour", format!("{}:00", kpis.peak_hour)),
        ("Branches Tracked", kpis.branch_count.to_string()),
    ];

    let name_style = ("sans-serif", 17).into_font().color(&BLACK);
    let value_style = ("sans-serif", 17).into_font().color(&BAR_BLUE);
    for (i, (name, value)) in lines.iter().enumerate() {
        let y = 70 + i as i32 * 55;
        area.draw(&Text::new((*name).to_string(), (40, y), name_style.clone()))
            .map_err(chart_err)?;
        area.draw(&Text::new(value.clone(), (280, y), value_style.clone()))
            .map_err(chart_err)?;
    }

    Ok(())
}
