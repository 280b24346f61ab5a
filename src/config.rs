//! Immutable diagnostic configuration
//!
//! The CLI arguments are folded into a single [`DiagConfig`] that is validated
//! once and then passed read-only into every pipeline stage.

use crate::errors::{IceTrendError, Result};
use crate::style::StyleSet;
use log::warn;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Concentration variable names this diagnostic understands
pub const SUPPORTED_VARIABLES: [&str; 2] = ["sic", "siconc"];

/// Hemisphere selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Arctic,
    Antarctic,
}

impl Region {
    /// Sign of the latitudes belonging to this hemisphere
    #[must_use]
    pub const fn pole_sign(self) -> f64 {
        match self {
            Region::Arctic => 1.0,
            Region::Antarctic => -1.0,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Region::Arctic => "Arctic",
            Region::Antarctic => "Antarctic",
        }
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Arctic" => Ok(Region::Arctic),
            "Antarctic" => Ok(Region::Antarctic),
            other => Err(format!(
                "Unsupported region '{}'. Expected 'Arctic' or 'Antarctic'.",
                other
            )),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar month, guaranteed to be in 1-12
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthOfYear(u32);

impl MonthOfYear {
    /// Validate a month number
    pub fn new(m: u32) -> std::result::Result<Self, String> {
        if (1..=12).contains(&m) {
            Ok(MonthOfYear(m))
        } else {
            Err(format!("Invalid month {}. Expected a number 1-12.", m))
        }
    }

    /// The month number, 1-12
    #[must_use]
    pub const fn number(self) -> u32 {
        self.0
    }
}

/// Temporal aggregation: annual mean or a single calendar month per year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthSelector {
    /// Day-weighted annual mean
    Annual,
    /// One time slice per year, matching this calendar month
    Month(MonthOfYear),
}

const MONTH_LABELS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

impl MonthSelector {
    /// Single-month selector for a validated month number
    pub fn month(m: u32) -> std::result::Result<Self, String> {
        MonthOfYear::new(m).map(MonthSelector::Month)
    }

    /// Short label used in output filenames
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            MonthSelector::Annual => "annual",
            MonthSelector::Month(m) => MONTH_LABELS[(m.number() - 1) as usize],
        }
    }
}

impl FromStr for MonthSelector {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s == "A" {
            return Ok(MonthSelector::Annual);
        }
        match s.parse::<u32>() {
            Ok(m) => MonthSelector::month(m),
            Err(_) => Err(format!(
                "Invalid month '{}'. Expected 'A' for annual or a number 1-12.",
                s
            )),
        }
    }
}

/// Complete, validated configuration of one diagnostic run
#[derive(Debug, Clone)]
pub struct DiagConfig {
    /// Name of the concentration variable ("sic" or "siconc")
    pub variable: String,
    /// Hemisphere to evaluate
    pub region: Region,
    /// Temporal aggregation mode
    pub month: MonthSelector,
    /// Compute a mean and stddev band across the flagged datasets
    pub multi_model_mean: bool,
    /// Patch the satellite blind spot around the North Pole (Arctic only)
    pub fill_pole_hole: bool,
    /// Draw a dataset legend at all
    pub draw_legend: bool,
    /// Draw the legend in a panel beside the plot instead of inside it
    pub legend_outside: bool,
    /// Keep individual ensemble members visible in the legend
    pub ems_in_legend: bool,
    /// Line style lookup table
    pub styleset: StyleSet,
    /// Directory the two chart files are written into
    pub output_dir: PathBuf,
}

impl DiagConfig {
    /// Validate the configuration, normalizing incompatible options
    ///
    /// Fails with a fatal error when the concentration variable is not in the
    /// supported set. A `fill_pole_hole` request for the Antarctic is not
    /// fatal: there is no polar observation hole in the south, so the option
    /// is switched off with a warning.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unsupported concentration variable.
    pub fn validated(mut self) -> Result<Self> {
        if !SUPPORTED_VARIABLES.contains(&self.variable.as_str()) {
            return Err(IceTrendError::ConfigError(format!(
                "Unsupported concentration variable '{}'. Supported: {}.",
                self.variable,
                SUPPORTED_VARIABLES.join(", ")
            )));
        }

        if self.fill_pole_hole && self.region == Region::Antarctic {
            warn!("No polar observation hole in the Antarctic; disabling fill_pole_hole");
            self.fill_pole_hole = false;
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> DiagConfig {
        DiagConfig {
            variable: "sic".to_string(),
            region: Region::Arctic,
            month: MonthSelector::Annual,
            multi_model_mean: false,
            fill_pole_hole: false,
            draw_legend: true,
            legend_outside: false,
            ems_in_legend: true,
            styleset: StyleSet::Default,
            output_dir: PathBuf::from("."),
        }
    }

    #[test]
    fn rejects_unsupported_variable() {
        let cfg = DiagConfig {
            variable: "tas".to_string(),
            ..base_config()
        };
        let result = cfg.validated();
        assert!(matches!(result, Err(IceTrendError::ConfigError(_))));
    }

    #[test]
    fn accepts_both_supported_variables() {
        for var in SUPPORTED_VARIABLES {
            let cfg = DiagConfig {
                variable: var.to_string(),
                ..base_config()
            };
            assert!(cfg.validated().is_ok());
        }
    }

    #[test]
    fn antarctic_forces_fill_pole_hole_off() {
        let cfg = DiagConfig {
            region: Region::Antarctic,
            fill_pole_hole: true,
            ..base_config()
        };
        let cfg = cfg.validated().unwrap();
        assert!(!cfg.fill_pole_hole);
    }

    #[test]
    fn arctic_keeps_fill_pole_hole() {
        let cfg = DiagConfig {
            fill_pole_hole: true,
            ..base_config()
        };
        assert!(cfg.validated().unwrap().fill_pole_hole);
    }

    #[test]
    fn region_parsing_is_exact() {
        assert_eq!("Arctic".parse::<Region>().unwrap(), Region::Arctic);
        assert_eq!("Antarctic".parse::<Region>().unwrap(), Region::Antarctic);
        assert!("arctic".parse::<Region>().is_err());
        assert!("North".parse::<Region>().is_err());
    }

    #[test]
    fn month_parsing() {
        assert_eq!("A".parse::<MonthSelector>().unwrap(), MonthSelector::Annual);
        assert_eq!(
            "3".parse::<MonthSelector>().unwrap(),
            MonthSelector::month(3).unwrap()
        );
        assert!("0".parse::<MonthSelector>().is_err());
        assert!("13".parse::<MonthSelector>().is_err());
        assert_eq!(MonthSelector::month(9).unwrap().label(), "sep");
        assert_eq!(MonthSelector::Annual.label(), "annual");
    }

    #[test]
    fn out_of_range_months_cannot_be_constructed() {
        assert!(MonthOfYear::new(0).is_err());
        assert!(MonthOfYear::new(13).is_err());
        assert!(MonthSelector::month(13).is_err());
        assert_eq!(MonthOfYear::new(12).unwrap().number(), 12);
        assert_eq!(MonthSelector::month(1).unwrap().label(), "jan");
        assert_eq!(MonthSelector::month(12).unwrap().label(), "dec");
    }
}
