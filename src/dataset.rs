//! Dataset loading from NetCDF files
//!
//! A dataset is one gridded sea-ice-concentration field (time × lat × lon)
//! together with its grid description and year range. Concentration is
//! normalized to fraction on load; fill values become explicit missing values.

use crate::errors::{IceTrendError, Result};
use crate::masked::Mv;
use chrono::{Datelike, Duration, NaiveDate};
use log::info;
use ndarray::{Array1, Array2, Array3};
use netcdf::{AttributeValue, File};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Year and calendar month of one time slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeStamp {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

/// Grid description attached to a concentration field
#[derive(Debug, Clone)]
pub enum GridCoords {
    /// Regular grid with 1-D coordinate axes; cell areas are computed from
    /// the axis spacing
    Regular {
        lat: Array1<f64>,
        lon: Array1<f64>,
    },
    /// Irregular mesh; 2-D coordinates and per-cell areas (m²) come from an
    /// auxiliary file already aligned with the concentration field
    Irregular {
        lat: Array2<f64>,
        lon: Array2<f64>,
        area: Array2<Mv>,
    },
}

/// One loaded dataset, immutable once constructed
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Display name (model_id/source_id attribute, or the file stem)
    pub name: String,
    /// First year with data
    pub start_year: i32,
    /// One past the last year with data
    pub end_year: i32,
    /// Year/month of each time slice
    pub times: Vec<TimeStamp>,
    /// Fractional concentration (0-1), time × lat × lon
    pub concentration: Array3<Mv>,
    /// Grid attached to the field
    pub coords: GridCoords,
}

impl Dataset {
    /// Load a dataset from a NetCDF file
    ///
    /// `aux_areas` maps dataset names (or file stems) to auxiliary area files
    /// for fields without 1-D coordinate axes.
    ///
    /// # Errors
    ///
    /// Returns an error when the variable is absent, has unexpected
    /// dimensionality, the time axis cannot be decoded, or an irregular grid
    /// has no auxiliary area file.
    pub fn from_file(
        path: &Path,
        variable: &str,
        aux_areas: &HashMap<String, PathBuf>,
    ) -> Result<Self> {
        let file = netcdf::open(path)?;
        let var = file
            .variable(variable)
            .ok_or_else(|| IceTrendError::VariableNotFound {
                var: variable.to_string(),
            })?;

        let dims: Vec<String> = var
            .dimensions()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        if dims.len() != 3 {
            return Err(IceTrendError::CoordinateError {
                var: variable.to_string(),
                message: format!(
                    "expected 3 dimensions (time, lat, lon), found {}",
                    dims.len()
                ),
            });
        }
        let shape: Vec<usize> = var.dimensions().iter().map(netcdf::Dimension::len).collect();

        let fill_value = read_fill_value(&var);
        let percent_units = var
            .attribute("units")
            .and_then(|a| a.value().ok())
            .map_or(false, |v| matches!(v, AttributeValue::Str(s) if s.trim() == "%"));
        let scale = if percent_units { 0.01 } else { 1.0 };

        let raw: Vec<f64> = var.get_values::<f64, _>(..)?;
        let values: Vec<Mv> = raw
            .into_iter()
            .map(|v| match fill_value {
                Some(fv) if v == fv => Mv::NONE,
                _ => Mv::from(v).map(|x| x * scale),
            })
            .collect();
        let concentration = Array3::from_shape_vec((shape[0], shape[1], shape[2]), values)?;

        let times = decode_time_axis(&file, &dims[0])?;
        if times.len() != shape[0] {
            return Err(IceTrendError::TimeAxisError(format!(
                "time axis length {} does not match field length {}",
                times.len(),
                shape[0]
            )));
        }
        let start_year = times
            .first()
            .map(|t| t.year)
            .ok_or_else(|| IceTrendError::TimeAxisError("empty time axis".to_string()))?;
        let end_year = times.last().map(|t| t.year + 1).unwrap_or(start_year);

        let name = dataset_name(&file, path);

        let coords = if let (Some(lat), Some(lon)) =
            (read_axis(&file, &dims[1])?, read_axis(&file, &dims[2])?)
        {
            GridCoords::Regular { lat, lon }
        } else {
            let aux_path = aux_areas
                .get(&name)
                .or_else(|| {
                    path.file_stem()
                        .and_then(|s| s.to_str())
                        .and_then(|stem| aux_areas.get(stem))
                })
                .ok_or_else(|| {
                    IceTrendError::GridError(format!(
                        "Dataset '{}' has no 1-D coordinate axes and no auxiliary area file was supplied",
                        name
                    ))
                })?;
            load_aux_grid(aux_path, (shape[1], shape[2]))?
        };

        info!(
            "Loaded dataset '{}' ({}..{}) with shape {:?}",
            name, start_year, end_year, shape
        );

        Ok(Dataset {
            name,
            start_year,
            end_year,
            times,
            concentration,
            coords,
        })
    }

    /// Legend annotation: name plus covered years (end exclusive)
    #[must_use]
    pub fn annotation(&self) -> String {
        format!("{} ({}-{})", self.name, self.start_year, self.end_year - 1)
    }
}

/// Read the `_FillValue` attribute of a variable, if any
fn read_fill_value(var: &netcdf::Variable) -> Option<f64> {
    var.attribute("_FillValue")
        .and_then(|attr| match attr.value().ok()? {
            AttributeValue::Float(v) => Some(f64::from(v)),
            AttributeValue::Double(v) => Some(v),
            AttributeValue::Short(v) => Some(f64::from(v)),
            AttributeValue::Int(v) => Some(f64::from(v)),
            _ => None,
        })
}

/// Read a 1-D coordinate variable sharing its dimension's name
///
/// Returns `Ok(None)` when the file has no such variable or it is not 1-D,
/// which marks the grid as irregular.
fn read_axis(file: &File, dim_name: &str) -> Result<Option<Array1<f64>>> {
    let Some(var) = file.variable(dim_name) else {
        return Ok(None);
    };
    if var.dimensions().len() != 1 {
        return Ok(None);
    }
    let values: Vec<f64> = var.get_values::<f64, _>(..)?;
    Ok(Some(Array1::from(values)))
}

/// Decode a "days since <date>" time axis into year/month stamps
fn decode_time_axis(file: &File, time_dim: &str) -> Result<Vec<TimeStamp>> {
    let var = file
        .variable(time_dim)
        .ok_or_else(|| IceTrendError::TimeAxisError(format!("no '{}' coordinate variable", time_dim)))?;

    let units = var
        .attribute("units")
        .and_then(|a| a.value().ok())
        .and_then(|v| match v {
            AttributeValue::Str(s) => Some(s),
            _ => None,
        })
        .ok_or_else(|| IceTrendError::TimeAxisError("time axis has no units attribute".to_string()))?;

    let epoch = parse_time_units(&units)?;
    let values: Vec<f64> = var.get_values::<f64, _>(..)?;
    let times = values
        .iter()
        .map(|&v| {
            let date = epoch + Duration::days(v.floor() as i64);
            TimeStamp {
                year: date.year(),
                month: date.month(),
            }
        })
        .collect();
    Ok(times)
}

/// Parse the epoch out of a "days since YYYY-MM-DD[ hh:mm:ss]" units string
fn parse_time_units(units: &str) -> Result<NaiveDate> {
    let rest = units
        .strip_prefix("days since ")
        .ok_or_else(|| {
            IceTrendError::TimeAxisError(format!(
                "unsupported time units '{}' (expected 'days since <date>')",
                units
            ))
        })?
        .trim();
    let date_part = rest.split_whitespace().next().unwrap_or(rest);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| {
        IceTrendError::TimeAxisError(format!("cannot parse epoch '{}': {}", date_part, e))
    })
}

/// Dataset display name: source_id, else model_id, else file stem
fn dataset_name(file: &File, path: &Path) -> String {
    for attr_name in ["source_id", "model_id"] {
        if let Some(attr) = file.attributes().find(|a| a.name() == attr_name) {
            if let Ok(AttributeValue::Str(s)) = attr.value() {
                if !s.is_empty() {
                    return s;
                }
            }
        }
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Load the 2-D lat/lon/area triplet from an auxiliary file
///
/// The auxiliary source is assumed to be spatially aligned with the
/// concentration field; only the shape is checked.
fn load_aux_grid(path: &Path, expected: (usize, usize)) -> Result<GridCoords> {
    let file = netcdf::open(path)?;

    let area_var = file
        .variable("areacello")
        .or_else(|| file.variable("area"))
        .ok_or_else(|| {
            IceTrendError::GridError(format!(
                "auxiliary file {} has neither 'areacello' nor 'area'",
                path.display()
            ))
        })?;
    let fill_value = read_fill_value(&area_var);
    let area_raw: Vec<f64> = area_var.get_values::<f64, _>(..)?;
    let area_vals: Vec<Mv> = area_raw
        .into_iter()
        .map(|v| match fill_value {
            Some(fv) if v == fv => Mv::NONE,
            _ => Mv::from(v),
        })
        .collect();
    let area = Array2::from_shape_vec(expected, area_vals)?;

    let lat = read_2d(&file, "lat", expected, path)?;
    let lon = read_2d(&file, "lon", expected, path)?;

    Ok(GridCoords::Irregular { lat, lon, area })
}

fn read_2d(file: &File, name: &str, expected: (usize, usize), path: &Path) -> Result<Array2<f64>> {
    let var = file.variable(name).ok_or_else(|| {
        IceTrendError::GridError(format!(
            "auxiliary file {} is missing variable '{}'",
            path.display(),
            name
        ))
    })?;
    let values: Vec<f64> = var.get_values::<f64, _>(..)?;
    Ok(Array2::from_shape_vec(expected, values)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_units_parsing() {
        let epoch = parse_time_units("days since 1850-01-01").unwrap();
        assert_eq!(epoch, NaiveDate::from_ymd_opt(1850, 1, 1).unwrap());

        let epoch = parse_time_units("days since 1979-06-15 00:00:00").unwrap();
        assert_eq!(epoch, NaiveDate::from_ymd_opt(1979, 6, 15).unwrap());

        assert!(parse_time_units("months since 1850-01-01").is_err());
        assert!(parse_time_units("days since soon").is_err());
    }
}
