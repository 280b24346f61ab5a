//! Grid cell areas and hemisphere masking
//!
//! Resolves per-cell areas either from 1-D coordinate spacing (regular grids)
//! or from the auxiliary triplet attached to the dataset (irregular meshes),
//! zeroes the hemisphere that is not being evaluated, and rescales to
//! 10⁶ km² so the summed series plot in the conventional unit.

use crate::config::Region;
use crate::dataset::GridCoords;
use crate::errors::{IceTrendError, Result};
use crate::masked::Mv;
use ndarray::{Array1, Array2};

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6.371e6;

/// Conversion from m² to 10⁶ km²
const M2_PER_MEGA_KM2: f64 = 1.0e12;

/// Resolved grid: 2-D coordinates and matching cell areas in 10⁶ km²,
/// already masked to one hemisphere
#[derive(Debug, Clone)]
pub struct CellGrid {
    pub lat: Array2<f64>,
    pub lon: Array2<f64>,
    pub area: Array2<Mv>,
}

impl CellGrid {
    /// Build the cell grid for a dataset, masked to `region`
    ///
    /// # Errors
    ///
    /// Returns `GridError` when an irregular grid's coordinate and area
    /// shapes disagree.
    pub fn resolve(coords: &GridCoords, region: Region) -> Result<Self> {
        let (lat2d, lon2d, area_m2) = match coords {
            GridCoords::Regular { lat, lon } => {
                let area = cell_areas_regular(lat, lon);
                let (lat2d, lon2d) = broadcast_axes(lat, lon);
                let area = area.mapv(Mv::some);
                (lat2d, lon2d, area)
            }
            GridCoords::Irregular { lat, lon, area } => {
                if lat.dim() != area.dim() || lon.dim() != area.dim() {
                    return Err(IceTrendError::GridError(format!(
                        "auxiliary grid shapes disagree: lat {:?}, lon {:?}, area {:?}",
                        lat.dim(),
                        lon.dim(),
                        area.dim()
                    )));
                }
                (lat.clone(), lon.clone(), area.clone())
            }
        };

        // Zero out the opposite hemisphere so every later sum excludes it,
        // then rescale m² to 10⁶ km².
        let sign = region.pole_sign();
        let mut area = area_m2;
        for ((i, j), a) in area.indexed_iter_mut() {
            if lat2d[[i, j]] * sign < 0.0 {
                *a = Mv::some(0.0);
            } else {
                *a = a.map(|v| v / M2_PER_MEGA_KM2);
            }
        }

        Ok(CellGrid {
            lat: lat2d,
            lon: lon2d,
            area,
        })
    }
}

/// Cell areas (m²) of a regular lat/lon grid
///
/// Each cell spans from midpoint to midpoint between neighboring coordinate
/// values; latitude bounds are clamped to ±90°. Works for non-uniform axes.
pub fn cell_areas_regular(lat: &Array1<f64>, lon: &Array1<f64>) -> Array2<f64> {
    let lat_bounds = axis_bounds(lat, Some((-90.0, 90.0)));
    let lon_widths: Vec<f64> = {
        let bounds = axis_bounds(lon, None);
        bounds.windows(2).map(|w| (w[1] - w[0]).abs()).collect()
    };

    let mut area = Array2::zeros((lat.len(), lon.len()));
    for i in 0..lat.len() {
        let (s, n) = (lat_bounds[i].to_radians(), lat_bounds[i + 1].to_radians());
        let band = (n.sin() - s.sin()).abs() * EARTH_RADIUS_M * EARTH_RADIUS_M;
        for j in 0..lon.len() {
            area[[i, j]] = band * lon_widths[j].to_radians();
        }
    }
    area
}

/// Bounds of an axis: midpoints between neighbors, extrapolated at the edges
fn axis_bounds(axis: &Array1<f64>, clamp: Option<(f64, f64)>) -> Vec<f64> {
    let n = axis.len();
    let mut bounds = Vec::with_capacity(n + 1);
    if n == 1 {
        // Degenerate single-point axis: assume a 1 degree cell
        bounds.push(axis[0] - 0.5);
        bounds.push(axis[0] + 0.5);
    } else {
        bounds.push(axis[0] - (axis[1] - axis[0]) / 2.0);
        for i in 0..n - 1 {
            bounds.push((axis[i] + axis[i + 1]) / 2.0);
        }
        bounds.push(axis[n - 1] + (axis[n - 1] - axis[n - 2]) / 2.0);
    }
    if let Some((lo, hi)) = clamp {
        for b in &mut bounds {
            *b = b.clamp(lo.min(hi), hi.max(lo));
        }
    }
    bounds
}

/// Broadcast 1-D axes to 2-D fields matching the cell-area shape
fn broadcast_axes(lat: &Array1<f64>, lon: &Array1<f64>) -> (Array2<f64>, Array2<f64>) {
    let (nlat, nlon) = (lat.len(), lon.len());
    let mut lat2d = Array2::zeros((nlat, nlon));
    let mut lon2d = Array2::zeros((nlat, nlon));
    for i in 0..nlat {
        for j in 0..nlon {
            lat2d[[i, j]] = lat[i];
            lon2d[[i, j]] = lon[j];
        }
    }
    (lat2d, lon2d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const SPHERE_AREA: f64 = 4.0 * std::f64::consts::PI * EARTH_RADIUS_M * EARTH_RADIUS_M;

    #[test]
    fn regular_areas_tile_the_sphere() {
        // 10 degree grid covering the globe
        let lat = Array1::from_iter((0..18).map(|i| -85.0 + 10.0 * f64::from(i)));
        let lon = Array1::from_iter((0..36).map(|i| 5.0 + 10.0 * f64::from(i)));
        let area = cell_areas_regular(&lat, &lon);
        let total: f64 = area.iter().sum();
        assert!((total - SPHERE_AREA).abs() / SPHERE_AREA < 1e-10);
    }

    #[test]
    fn band_areas_shrink_toward_pole() {
        let lat = array![5.0, 45.0, 85.0];
        let lon = array![0.0, 10.0];
        let area = cell_areas_regular(&lat, &lon);
        assert!(area[[0, 0]] > area[[1, 0]]);
        assert!(area[[1, 0]] > area[[2, 0]]);
    }

    #[test]
    fn hemisphere_mask_zeroes_the_other_pole() {
        let coords = GridCoords::Regular {
            lat: array![-60.0, 60.0],
            lon: array![0.0, 180.0],
        };
        let grid = CellGrid::resolve(&coords, Region::Arctic).unwrap();
        assert_eq!(grid.area[[0, 0]].value(), Some(0.0));
        assert!(grid.area[[1, 0]].unwrap_or(0.0) > 0.0);

        let grid = CellGrid::resolve(&coords, Region::Antarctic).unwrap();
        assert!(grid.area[[0, 0]].unwrap_or(0.0) > 0.0);
        assert_eq!(grid.area[[1, 0]].value(), Some(0.0));
    }

    #[test]
    fn irregular_grid_passes_through_with_mask() {
        let lat = array![[80.0, 80.0], [-80.0, -80.0]];
        let lon = array![[0.0, 90.0], [0.0, 90.0]];
        let area = Array2::from_elem((2, 2), Mv::some(1.0e12));
        let coords = GridCoords::Irregular { lat, lon, area };
        let grid = CellGrid::resolve(&coords, Region::Arctic).unwrap();
        // 1e12 m² rescales to exactly 1 (10⁶ km²) in the kept hemisphere
        assert_eq!(grid.area[[0, 0]].value(), Some(1.0));
        assert_eq!(grid.area[[1, 1]].value(), Some(0.0));
    }

    #[test]
    fn missing_area_cells_stay_missing() {
        let lat = array![[80.0, 80.0]];
        let lon = array![[0.0, 90.0]];
        let mut area = Array2::from_elem((1, 2), Mv::some(1.0e12));
        area[[0, 1]] = Mv::NONE;
        let coords = GridCoords::Irregular { lat, lon, area };
        let grid = CellGrid::resolve(&coords, Region::Arctic).unwrap();
        assert!(grid.area[[0, 1]].is_missing());
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        let coords = GridCoords::Irregular {
            lat: Array2::zeros((2, 2)),
            lon: Array2::zeros((2, 2)),
            area: Array2::from_elem((3, 2), Mv::some(1.0)),
        };
        assert!(CellGrid::resolve(&coords, Region::Arctic).is_err());
    }
}
