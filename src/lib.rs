//! IceTrend: sea-ice area and extent time series from NetCDF concentration fields
//!
//! A single-purpose scientific diagnostic: read gridded sea-ice-concentration
//! fields for multiple datasets, derive per-dataset yearly (or single-month)
//! extent and area scalars, optionally compute a multi-dataset mean with a
//! standard-deviation envelope, and render two line charts.
//!
//! ## Key Features
//!
//! - **Extent and area**: the WMO 15 % threshold for extent, concentration
//!   weighting for area, both in 10⁶ km²
//! - **Both grid kinds**: regular 1-D lat/lon axes or irregular meshes with
//!   auxiliary cell-area files
//! - **Polar hole filling**: patches the satellite blind spot around the
//!   North Pole
//! - **Explicit missing values**: arithmetic propagates "unset" instead of
//!   carrying a sentinel float
//! - **Multi-model statistics**: mean and sample-stddev band across a
//!   configured subset of datasets
//!
//! ## Module Organization
//!
//! - [`config`]: immutable diagnostic configuration and validation
//! - [`dataset`]: NetCDF loading and time-axis decoding
//! - [`grid`]: cell areas, hemisphere masking
//! - [`polar`]: Arctic polar-observation-hole filler
//! - [`series`]: extent/area computation and aggregate statistics
//! - [`style`]: per-dataset line styling
//! - [`plot`]: chart rendering
//! - [`pipeline`]: the compute-then-plot flow
//! - [`errors`]: centralized error handling
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use ice_trend::prelude::*;
//! use std::collections::HashMap;
//! use std::path::PathBuf;
//!
//! let config = DiagConfig {
//!     variable: "sic".to_string(),
//!     region: Region::Arctic,
//!     month: MonthSelector::Annual,
//!     multi_model_mean: true,
//!     fill_pole_hole: false,
//!     draw_legend: true,
//!     legend_outside: false,
//!     ems_in_legend: true,
//!     styleset: StyleSet::Default,
//!     output_dir: PathBuf::from("plots"),
//! }
//! .validated()
//! .unwrap();
//!
//! let files = vec![PathBuf::from("sic_model.nc")];
//! ice_trend::pipeline::run_diagnostic(&files, &HashMap::new(), &config).unwrap();
//! ```

// Core modules
pub mod config;
pub mod dataset;
pub mod errors;
pub mod grid;
pub mod masked;
pub mod pipeline;
pub mod plot;
pub mod polar;
pub mod series;
pub mod style;

// Internal modules
mod cli;

pub use cli::Args;

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::config::{DiagConfig, MonthOfYear, MonthSelector, Region};
    pub use crate::dataset::{Dataset, GridCoords, TimeStamp};
    pub use crate::errors::{IceTrendError, Result};
    pub use crate::grid::CellGrid;
    pub use crate::masked::Mv;
    pub use crate::pipeline::run_diagnostic;
    pub use crate::plot::PlotPaths;
    pub use crate::series::{SeriesTable, StatsArray, YearAxis};
    pub use crate::style::{LineStyle, StyleSet};
}
