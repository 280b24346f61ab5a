//! Defines command-line interface options using `clap` for the IceTrend application.

use crate::config::{DiagConfig, MonthSelector, Region};
use crate::style::StyleSet;
use clap::Parser;
use std::path::PathBuf;

/// A CLI diagnostic for sea-ice area and extent time series
#[derive(Parser, Debug)]
#[command(
    version,
    name = "IceTrend",
    about = "Computes and plots sea-ice area and extent time series from NetCDF concentration files"
)]
pub struct Args {
    /// NetCDF files with sea-ice concentration, one dataset each
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Concentration variable name (sic or siconc)
    #[arg(long, default_value = "sic")]
    pub variable: String,

    /// Hemisphere to evaluate: Arctic or Antarctic
    #[arg(short, long)]
    pub region: Region,

    /// Temporal aggregation: 'A' for the annual mean, or a month number 1-12
    #[arg(short, long, default_value = "A")]
    pub month: MonthSelector,

    /// Compute a multi-dataset mean with a stddev band
    #[arg(long, default_value_t = false)]
    pub multi_model_mean: bool,

    /// Patch the satellite blind spot around the North Pole (Arctic only)
    #[arg(long, default_value_t = false)]
    pub fill_pole_hole: bool,

    /// Auxiliary cell-area file for an irregular-grid dataset, formatted as <dataset>:<path>
    #[arg(long = "areas", value_parser = parse_areas_arg)]
    pub aux_areas: Vec<(String, PathBuf)>,

    /// Line style lookup table: default or cmip5
    #[arg(long, default_value = "default")]
    pub styleset: StyleSet,

    /// Suppress the dataset legend
    #[arg(long, default_value_t = false)]
    pub no_legend: bool,

    /// Draw the legend in a panel beside the plot instead of inside it
    #[arg(long, default_value_t = false)]
    pub legend_outside: bool,

    /// Collapse ensemble members to one legend entry per model
    #[arg(long, default_value_t = false)]
    pub collapse_ensembles: bool,

    /// Directory the chart files are written into
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,
}

impl Args {
    /// Fold the raw arguments into the immutable diagnostic configuration
    #[must_use]
    pub fn to_config(&self) -> DiagConfig {
        DiagConfig {
            variable: self.variable.clone(),
            region: self.region,
            month: self.month,
            multi_model_mean: self.multi_model_mean,
            fill_pole_hole: self.fill_pole_hole,
            draw_legend: !self.no_legend,
            legend_outside: self.legend_outside,
            ems_in_legend: !self.collapse_ensembles,
            styleset: self.styleset,
            output_dir: self.output_dir.clone(),
        }
    }
}

fn parse_areas_arg(s: &str) -> Result<(String, PathBuf), String> {
    match s.split_once(':') {
        Some((dataset, path)) if !dataset.is_empty() && !path.is_empty() => {
            Ok((dataset.to_string(), PathBuf::from(path)))
        }
        _ => Err("Invalid format: Expected '<dataset>:<path>'.".to_string()),
    }
}
