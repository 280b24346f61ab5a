//! The diagnostic pipeline
//!
//! Linear compute-then-plot flow: load each dataset, resolve its grid, fill
//! the polar hole if requested, reduce to yearly scalars, aggregate the
//! multi-dataset statistics, and render the two charts. The dataset loop is
//! strictly sequential; each iteration opens one file and owns its grid and
//! concentration arrays locally, so only one dataset's field is resident at
//! a time. Only the yearly scalars survive the iteration.

use crate::config::DiagConfig;
use crate::dataset::Dataset;
use crate::errors::{IceTrendError, Result};
use crate::grid::CellGrid;
use crate::plot::{render_charts, PlotPaths};
use crate::polar::fill_pole_hole;
use crate::series::{aggregate_stats, dataset_series, DatasetSeries, SeriesTable, YearAxis};
use crate::style::LineStyle;
use log::info;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Run the whole diagnostic over a set of input files
///
/// `config` must already be validated. Returns the chart paths, or `None`
/// when rendering was skipped for lack of a usable time axis.
///
/// # Errors
///
/// Fails fatally on unreadable inputs, undecodable time axes, unresolvable
/// grids, or rendering problems; no partial output is left behind.
pub fn run_diagnostic(
    files: &[PathBuf],
    aux_areas: &HashMap<String, PathBuf>,
    config: &DiagConfig,
) -> Result<Option<PlotPaths>> {
    if files.is_empty() {
        return Err(IceTrendError::ConfigError(
            "No input files given".to_string(),
        ));
    }

    info!("Processing {} input file(s)", files.len());

    let mut names: Vec<String> = Vec::with_capacity(files.len());
    let mut annotations: Vec<String> = Vec::with_capacity(files.len());
    let mut ranges: Vec<(i32, i32)> = Vec::with_capacity(files.len());
    let mut reduced: Vec<DatasetSeries> = Vec::with_capacity(files.len());

    for file in files {
        let ds = Dataset::from_file(file, &config.variable, aux_areas)?;
        let annotation = ds.annotation();
        let range = (ds.start_year, ds.end_year);
        let grid = CellGrid::resolve(&ds.coords, config.region)?;

        let mut concentration = ds.concentration;
        if config.fill_pole_hole {
            fill_pole_hole(&mut concentration, &grid.lat);
        }

        let series = dataset_series(
            &ds.times,
            &concentration,
            &grid,
            config.month,
            range.0,
            range.1,
        );
        names.push(ds.name);
        annotations.push(annotation);
        ranges.push(range);
        reduced.push(series);
        // grid and concentration drop here, before the next file is opened
    }

    let axis = YearAxis::spanning(ranges.iter().copied());
    info!(
        "Reduced {} dataset(s) over {}..{}",
        reduced.len(),
        axis.start,
        axis.end
    );

    let styles: Vec<LineStyle> = names
        .iter()
        .enumerate()
        .map(|(i, name)| config.styleset.style_for(name, i))
        .collect();

    let mut table = SeriesTable::new(axis, reduced.len());
    for (row, (annotation, series)) in annotations.into_iter().zip(&reduced).enumerate() {
        table.fill_row(row, annotation, series);
    }

    let (extent_stats, area_stats) = if config.multi_model_mean {
        let include: Vec<bool> = styles.iter().map(|s| s.avg_flag == 0).collect();
        (
            Some(aggregate_stats(&table.extent, &include)),
            Some(aggregate_stats(&table.area, &include)),
        )
    } else {
        (None, None)
    };

    fs::create_dir_all(&config.output_dir)?;
    render_charts(
        &table,
        &styles,
        extent_stats.as_ref(),
        area_stats.as_ref(),
        config,
    )
}
