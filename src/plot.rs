//! Chart rendering
//!
//! Draws the two time-series line charts (extent, area) as PNG files: one
//! line per dataset styled from the configured styleset, an optional shaded
//! mean ± stddev band, and a legend either inside the plot (with the x axis
//! padded to make room) or in a panel split off the right edge.

use crate::config::DiagConfig;
use crate::errors::{IceTrendError, Result};
use crate::masked::Mv;
use crate::series::{stats_rows, SeriesTable, StatsArray};
use crate::style::{ensemble_base, LineStyle};
use log::info;
use ndarray::ArrayView2;
use plotters::element::DashedPathElement;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::path::PathBuf;

const CHART_SIZE: (u32, u32) = (1000, 620);
const LEGEND_PANEL_WIDTH: u32 = 260;

/// Paths of the two rendered charts
#[derive(Debug, Clone)]
pub struct PlotPaths {
    pub extent: PathBuf,
    pub area: PathBuf,
}

fn plot_err<E: std::fmt::Display>(e: E) -> IceTrendError {
    IceTrendError::PlotError(e.to_string())
}

/// Render the extent and area charts
///
/// Returns `Ok(None)` without producing any file when the year axis has fewer
/// than two values; a single point does not make a time series.
///
/// # Errors
///
/// Returns `PlotError` when the backend fails to draw or write a file.
pub fn render_charts(
    table: &SeriesTable,
    styles: &[LineStyle],
    extent_stats: Option<&StatsArray>,
    area_stats: Option<&StatsArray>,
    config: &DiagConfig,
) -> Result<Option<PlotPaths>> {
    if table.years.len() < 2 {
        info!(
            "Only {} year(s) on the time axis; skipping chart rendering",
            table.years.len()
        );
        return Ok(None);
    }

    let year_range = format!("{}-{}", table.years.start, table.years.end - 1);
    let extent_path = config.output_dir.join(format!(
        "extent_{}_{}_{}_{}.png",
        config.variable,
        config.region,
        config.month.label(),
        year_range
    ));
    let area_path = config.output_dir.join(format!(
        "area_{}_{}_{}_{}.png",
        config.variable,
        config.region,
        config.month.label(),
        year_range
    ));

    draw_chart(
        &extent_path,
        &format!("{} sea-ice extent", config.region),
        table,
        table.extent.view(),
        styles,
        extent_stats,
        config,
    )?;
    draw_chart(
        &area_path,
        &format!("{} sea-ice area", config.region),
        table,
        table.area.view(),
        styles,
        area_stats,
        config,
    )?;

    info!(
        "Wrote {} and {}",
        extent_path.display(),
        area_path.display()
    );
    Ok(Some(PlotPaths {
        extent: extent_path,
        area: area_path,
    }))
}

fn draw_chart(
    path: &std::path::Path,
    title: &str,
    table: &SeriesTable,
    values: ArrayView2<Mv>,
    styles: &[LineStyle],
    stats: Option<&StatsArray>,
    config: &DiagConfig,
) -> Result<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let outside_legend = config.draw_legend && config.legend_outside;
    let (chart_area, legend_area) = if outside_legend {
        let (left, right) = root.split_horizontally(CHART_SIZE.0 - LEGEND_PANEL_WIDTH);
        (left, Some(right))
    } else {
        (root.clone(), None)
    };

    let (x_min, x_max) = x_range(table, config);
    let (y_min, y_max) = y_range(values, stats);

    let mut chart = ChartBuilder::on(&chart_area)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("10^6 km^2")
        .x_label_formatter(&|v| format!("{:.0}", v))
        .draw()
        .map_err(plot_err)?;

    let years = table.years.years();

    // Shaded mean +/- stddev band underneath the lines
    if let Some(stats) = stats {
        let low = stats.row(stats_rows::LOW);
        let high = stats.row(stats_rows::HIGH);
        let mut polygon: Vec<(f64, f64)> = Vec::new();
        for (k, &year) in years.iter().enumerate() {
            if let Some(h) = high[k].value() {
                polygon.push((f64::from(year), h));
            }
        }
        for (k, &year) in years.iter().enumerate().rev() {
            if let Some(l) = low[k].value() {
                polygon.push((f64::from(year), l));
            }
        }
        if polygon.len() >= 3 {
            chart
                .draw_series(std::iter::once(Polygon::new(
                    polygon,
                    BLACK.mix(0.15).filled(),
                )))
                .map_err(plot_err)?;
        }
    }

    let mut seen_bases: Vec<String> = Vec::new();
    for (row, style) in styles.iter().enumerate() {
        let points: Vec<(f64, f64)> = years
            .iter()
            .enumerate()
            .filter_map(|(k, &year)| values[[row, k]].value().map(|v| (f64::from(year), v)))
            .collect();
        if points.is_empty() {
            continue;
        }

        let annotation = &table.annotations[row];
        let labeled = config.draw_legend && wants_label(annotation, config, &mut seen_bases);
        let shape: ShapeStyle = style.color.stroke_width(style.width);

        let series = if style.dashed {
            chart
                .draw_series(DashedLineSeries::new(points, 6, 4, shape))
                .map_err(plot_err)?
        } else {
            chart
                .draw_series(LineSeries::new(points, shape))
                .map_err(plot_err)?
        };
        if labeled && legend_area.is_none() {
            let color = style.color;
            series.label(annotation).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        }
    }

    // Multi-model mean drawn on top of the individual lines
    if let Some(stats) = stats {
        let mean = stats.row(stats_rows::MEAN);
        let points: Vec<(f64, f64)> = years
            .iter()
            .enumerate()
            .filter_map(|(k, &year)| mean[k].value().map(|v| (f64::from(year), v)))
            .collect();
        if !points.is_empty() {
            let series = chart
                .draw_series(LineSeries::new(points, BLACK.stroke_width(3)))
                .map_err(plot_err)?;
            if config.draw_legend && legend_area.is_none() {
                series.label("Multi-model mean").legend(|(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], BLACK.stroke_width(3))
                });
            }
        }
    }

    if config.draw_legend {
        if let Some(panel) = &legend_area {
            draw_legend_panel(panel, table, styles, stats.is_some(), config)?;
        } else {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(plot_err)?;
        }
    }

    root.present().map_err(plot_err)?;
    Ok(())
}

/// X axis with 5 % padding on the left and, when an in-plot legend needs the
/// room, 25 % on the right
fn x_range(table: &SeriesTable, config: &DiagConfig) -> (f64, f64) {
    let first = f64::from(table.years.start);
    let last = f64::from(table.years.end - 1);
    let span = (last - first).max(1.0);
    let right = if config.draw_legend && !config.legend_outside {
        0.25
    } else {
        0.05
    };
    (first - 0.05 * span, last + right * span)
}

fn y_range(values: ArrayView2<Mv>, stats: Option<&StatsArray>) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values.iter().chain(stats.iter().flat_map(|s| s.rows.iter())) {
        if let Some(x) = v.value() {
            lo = lo.min(x);
            hi = hi.max(x);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.1).max(0.1);
    ((lo - pad).max(0.0), hi + pad)
}

/// Whether this dataset's line gets a legend entry
///
/// With `ems_in_legend` off, only the first member of each ensemble keeps its
/// label so a ten-member ensemble does not flood the legend.
fn wants_label(annotation: &str, config: &DiagConfig, seen_bases: &mut Vec<String>) -> bool {
    if config.ems_in_legend {
        return true;
    }
    let name = annotation.split(" (").next().unwrap_or(annotation);
    let base = ensemble_base(name).to_string();
    if seen_bases.contains(&base) {
        false
    } else {
        seen_bases.push(base);
        true
    }
}

/// Hand-drawn legend in the panel beside the chart
fn draw_legend_panel<DB: DrawingBackend>(
    panel: &DrawingArea<DB, plotters::coord::Shift>,
    table: &SeriesTable,
    styles: &[LineStyle],
    with_mean: bool,
    config: &DiagConfig,
) -> Result<()> {
    panel.fill(&WHITE).map_err(|e| plot_err(e.to_string()))?;
    let font = ("sans-serif", 15).into_font();

    let mut y = 30_i32;
    let mut seen_bases: Vec<String> = Vec::new();
    for (row, style) in styles.iter().enumerate() {
        let annotation = &table.annotations[row];
        if !wants_label(annotation, config, &mut seen_bases) {
            continue;
        }
        let sample = style.color.stroke_width(style.width);
        if style.dashed {
            panel
                .draw(&DashedPathElement::new(vec![(10, y), (40, y)], 6, 4, sample))
                .map_err(|e| plot_err(e.to_string()))?;
        } else {
            panel
                .draw(&PathElement::new(vec![(10, y), (40, y)], sample))
                .map_err(|e| plot_err(e.to_string()))?;
        }
        panel
            .draw(&Text::new(annotation.clone(), (48, y - 7), font.clone()))
            .map_err(|e| plot_err(e.to_string()))?;
        y += 22;
    }
    if with_mean {
        panel
            .draw(&PathElement::new(
                vec![(10, y), (40, y)],
                BLACK.stroke_width(3),
            ))
            .map_err(|e| plot_err(e.to_string()))?;
        panel
            .draw(&Text::new("Multi-model mean", (48, y - 7), font))
            .map_err(|e| plot_err(e.to_string()))?;
    }
    Ok(())
}
