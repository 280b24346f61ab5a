//! Polar observation hole filling
//!
//! Satellite concentration products have a blind spot around the North Pole.
//! The filler walks rings of 0.1° latitude down from the pole and sets missing
//! cells to full concentration, stopping at the first ring that has no cells
//! or no missing values. The hole is assumed to be contiguous and centered at
//! the pole; non-contiguous missing patches further south are left alone.

use crate::masked::Mv;
use ndarray::{Array2, Array3, Axis};

/// Width of one latitude ring in degrees
const LAT_STEP: f64 = 0.1;

/// Fill the polar hole in every time slice of a concentration field
///
/// Time slices that are entirely missing are skipped. Idempotent: running the
/// filler on an already-filled field changes nothing.
pub fn fill_pole_hole(concentration: &mut Array3<Mv>, lat: &Array2<f64>) {
    for mut slice in concentration.axis_iter_mut(Axis(0)) {
        if slice.iter().all(|v| v.is_missing()) {
            continue;
        }

        let mut upper = 90.0;
        loop {
            let lower = upper - LAT_STEP;
            let ring: Vec<(usize, usize)> = lat
                .indexed_iter()
                .filter(|&(_, &l)| l >= lower && l < upper)
                .map(|(idx, _)| idx)
                .collect();
            if ring.is_empty() {
                break;
            }
            let missing: Vec<(usize, usize)> = ring
                .iter()
                .copied()
                .filter(|&(i, j)| slice[[i, j]].is_missing())
                .collect();
            if missing.is_empty() {
                break;
            }
            for (i, j) in missing {
                slice[[i, j]] = Mv::some(1.0);
            }
            upper = lower;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// One column of cells marching down from the pole in 0.05° steps,
    /// dense enough that every 0.1° ring is populated
    fn dense_polar_lat(n: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, 1), |(i, _)| 89.975 - 0.05 * i as f64)
    }

    #[test]
    fn fills_contiguous_hole_from_the_pole() {
        let lat = dense_polar_lat(20);
        let mut conc = Array3::from_elem((1, 20, 1), Mv::some(0.5));
        // Hole: the 8 cells closest to the pole are unobserved
        for i in 0..8 {
            conc[[0, i, 0]] = Mv::NONE;
        }

        fill_pole_hole(&mut conc, &lat);

        for i in 0..8 {
            assert_eq!(conc[[0, i, 0]].value(), Some(1.0), "cell {} not filled", i);
        }
        for i in 8..20 {
            assert_eq!(conc[[0, i, 0]].value(), Some(0.5));
        }
    }

    #[test]
    fn filler_is_idempotent() {
        let lat = dense_polar_lat(20);
        let mut conc = Array3::from_elem((1, 20, 1), Mv::some(0.8));
        for i in 0..5 {
            conc[[0, i, 0]] = Mv::NONE;
        }

        fill_pole_hole(&mut conc, &lat);
        let once = conc.clone();
        fill_pole_hole(&mut conc, &lat);
        assert_eq!(conc, once);
    }

    #[test]
    fn all_missing_slice_is_skipped() {
        let lat = dense_polar_lat(10);
        let mut conc = Array3::from_elem((1, 10, 1), Mv::NONE);
        fill_pole_hole(&mut conc, &lat);
        assert!(conc.iter().all(|v| v.is_missing()));
    }

    #[test]
    fn stops_at_first_complete_ring() {
        // Known edge case: a missing patch separated from the pole by
        // observed rings is outside the contiguity assumption and stays
        // untouched.
        let lat = dense_polar_lat(20);
        let mut conc = Array3::from_elem((1, 20, 1), Mv::some(0.9));
        conc[[0, 10, 0]] = Mv::NONE;
        conc[[0, 11, 0]] = Mv::NONE;

        fill_pole_hole(&mut conc, &lat);

        assert!(conc[[0, 10, 0]].is_missing());
        assert!(conc[[0, 11, 0]].is_missing());
    }

    #[test]
    fn coarse_grid_with_no_polar_cells_is_untouched() {
        // A 1° grid has no cells within the first 0.1° ring, so the scan
        // stops immediately.
        let lat = Array2::from_shape_fn((4, 1), |(i, _)| 89.5 - i as f64);
        let mut conc = Array3::from_elem((1, 4, 1), Mv::some(0.3));
        conc[[0, 0, 0]] = Mv::NONE;
        fill_pole_hole(&mut conc, &lat);
        assert!(conc[[0, 0, 0]].is_missing());
    }
}
