//! Per-dataset line styling
//!
//! Mirrors the style tables climate diagnostics ship with: each dataset gets a
//! color, dash pattern, line width, and an averaging flag that decides whether
//! the dataset enters the multi-model mean (flag 0 = included, anything else =
//! excluded, e.g. observational references).

use plotters::style::RGBColor;
use std::str::FromStr;

/// Line style of one dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStyle {
    pub color: RGBColor,
    pub dashed: bool,
    pub width: u32,
    /// 0 = include in the multi-model mean, nonzero = exclude
    pub avg_flag: u8,
}

/// Which style lookup table to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleSet {
    /// Deterministic palette, every dataset included in the mean
    #[default]
    Default,
    /// Fixed colors for well-known CMIP5 models, observations drawn black
    Cmip5,
}

impl FromStr for StyleSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(StyleSet::Default),
            "cmip5" => Ok(StyleSet::Cmip5),
            other => Err(format!(
                "Unknown styleset '{}'. Expected 'default' or 'cmip5'.",
                other
            )),
        }
    }
}

/// Fallback palette cycled by dataset index
const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// CMIP5 model colors, as used in the usual CMIP5 style tables
const CMIP5_COLORS: [(&str, RGBColor); 10] = [
    ("ACCESS1-0", RGBColor(91, 142, 210)),
    ("CanESM2", RGBColor(30, 76, 36)),
    ("CNRM-CM5", RGBColor(145, 214, 126)),
    ("CSIRO-Mk3-6-0", RGBColor(119, 29, 123)),
    ("GFDL-ESM2G", RGBColor(255, 176, 59)),
    ("GISS-E2-R", RGBColor(119, 29, 123)),
    ("HadGEM2-ES", RGBColor(122, 139, 38)),
    ("IPSL-CM5A-LR", RGBColor(91, 83, 174)),
    ("MIROC5", RGBColor(184, 95, 182)),
    ("MPI-ESM-LR", RGBColor(93, 161, 162)),
];

/// Observational reference products drawn black and excluded from the mean
const OBS_DATASETS: [&str; 4] = ["NSIDC", "HadISST", "OSI-450", "ESACCI"];

impl StyleSet {
    /// Resolve the style of a dataset
    ///
    /// `index` is the position of the dataset in the processing order and
    /// seeds the fallback palette, so repeated runs style the same inputs the
    /// same way.
    #[must_use]
    pub fn style_for(self, dataset: &str, index: usize) -> LineStyle {
        let base = ensemble_base(dataset);
        match self {
            StyleSet::Default => LineStyle {
                color: PALETTE[index % PALETTE.len()],
                dashed: false,
                width: 2,
                avg_flag: 0,
            },
            StyleSet::Cmip5 => {
                if OBS_DATASETS.iter().any(|obs| base.starts_with(obs)) {
                    return LineStyle {
                        color: RGBColor(0, 0, 0),
                        dashed: true,
                        width: 3,
                        avg_flag: 1,
                    };
                }
                let color = CMIP5_COLORS
                    .iter()
                    .find(|(name, _)| *name == base)
                    .map(|(_, c)| *c)
                    .unwrap_or(PALETTE[index % PALETTE.len()]);
                LineStyle {
                    color,
                    dashed: false,
                    width: 2,
                    avg_flag: 0,
                }
            }
        }
    }
}

/// Strip a CMIP ensemble-member suffix (`_r1i1p1`, `_r2i1p1f2`, ...)
///
/// Datasets differing only in the ensemble suffix share one style and can be
/// collapsed to a single legend entry.
#[must_use]
pub fn ensemble_base(dataset: &str) -> &str {
    if let Some(pos) = dataset.rfind('_') {
        let suffix = &dataset[pos + 1..];
        if is_ensemble_tag(suffix) {
            return &dataset[..pos];
        }
    }
    dataset
}

fn is_ensemble_tag(s: &str) -> bool {
    // rNiNpN with an optional fN part
    let mut chars = s.chars().peekable();
    for marker in ['r', 'i', 'p'] {
        if chars.next() != Some(marker) {
            return false;
        }
        let mut digits = 0;
        while chars.peek().map_or(false, char::is_ascii_digit) {
            chars.next();
            digits += 1;
        }
        if digits == 0 {
            return false;
        }
    }
    match chars.next() {
        None => true,
        Some('f') => {
            let rest: Vec<char> = chars.collect();
            !rest.is_empty() && rest.iter().all(char::is_ascii_digit)
        }
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_styleset_includes_everything_in_mean() {
        let style = StyleSet::Default.style_for("SomeModel", 3);
        assert_eq!(style.avg_flag, 0);
        assert_eq!(style.color, PALETTE[3]);
    }

    #[test]
    fn cmip5_observations_are_excluded_from_mean() {
        let style = StyleSet::Cmip5.style_for("NSIDC-NT", 0);
        assert_ne!(style.avg_flag, 0);
        assert_eq!(style.color, RGBColor(0, 0, 0));
    }

    #[test]
    fn cmip5_known_model_color() {
        let style = StyleSet::Cmip5.style_for("MPI-ESM-LR_r1i1p1", 5);
        assert_eq!(style.color, RGBColor(93, 161, 162));
        assert_eq!(style.avg_flag, 0);
    }

    #[test]
    fn palette_wraps_around() {
        let a = StyleSet::Default.style_for("a", 1);
        let b = StyleSet::Default.style_for("b", 1 + PALETTE.len());
        assert_eq!(a.color, b.color);
    }

    #[test]
    fn ensemble_suffix_stripping() {
        assert_eq!(ensemble_base("CanESM2_r1i1p1"), "CanESM2");
        assert_eq!(ensemble_base("CanESM2_r12i1p1f2"), "CanESM2");
        assert_eq!(ensemble_base("CanESM2"), "CanESM2");
        assert_eq!(ensemble_base("HadGEM2_historical"), "HadGEM2_historical");
    }
}
