//! Extent and area time series
//!
//! The heart of the diagnostic: per-cell extent (area where concentration is
//! at or above 15 %) and area (concentration-weighted area) fields, reduced in
//! time to one 2-D field per year and summed spatially to one scalar, stored
//! as one row per dataset over the union of all year ranges.

use crate::config::MonthSelector;
use crate::dataset::TimeStamp;
use crate::grid::CellGrid;
use crate::masked::{masked_mean_stddev, masked_sum, masked_weighted_mean, Mv};
use ndarray::{Array2, ArrayView2, Axis};

/// WMO sea-ice extent threshold: cells at or above 15 % concentration count
pub const EXTENT_THRESHOLD: f64 = 0.15;

/// Half-open union of all dataset year ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearAxis {
    /// First year
    pub start: i32,
    /// One past the last year
    pub end: i32,
}

impl YearAxis {
    /// Span `[min(start), max(end))` over half-open `(start, end)` year ranges
    #[must_use]
    pub fn spanning<I: IntoIterator<Item = (i32, i32)>>(ranges: I) -> Self {
        let mut start = i32::MAX;
        let mut end = i32::MIN;
        for (s, e) in ranges {
            start = start.min(s);
            end = end.max(e);
        }
        if start > end {
            YearAxis { start: 0, end: 0 }
        } else {
            YearAxis { start, end }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        (self.end - self.start).max(0) as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column index of a year
    #[must_use]
    pub fn index(&self, year: i32) -> usize {
        (year - self.start) as usize
    }

    /// The years on the axis, in order
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        (self.start..self.end).collect()
    }
}

/// Scalar extent and area per year for one dataset
#[derive(Debug, Clone)]
pub struct DatasetSeries {
    pub extent: Vec<(i32, Mv)>,
    pub area: Vec<(i32, Mv)>,
}

/// Compute the yearly extent/area series of one dataset
///
/// `grid` must already be hemisphere-masked and in 10⁶ km². Cells in the
/// excluded hemisphere carry zero area and contribute nothing regardless of
/// concentration.
#[must_use]
pub fn dataset_series(
    times: &[TimeStamp],
    concentration: &ndarray::Array3<Mv>,
    grid: &CellGrid,
    month: MonthSelector,
    start_year: i32,
    end_year: i32,
) -> DatasetSeries {
    let mut extent = Vec::with_capacity((end_year - start_year).max(0) as usize);
    let mut area = Vec::with_capacity(extent.capacity());

    for year in start_year..end_year {
        let (ext, ar) = match month {
            MonthSelector::Annual => annual_scalars(times, concentration, grid, year),
            MonthSelector::Month(m) => month_scalars(times, concentration, grid, year, m.number()),
        };
        extent.push((year, ext));
        area.push((year, ar));
    }

    DatasetSeries { extent, area }
}

/// Day-weighted annual mean of the extent/area fields, spatially summed
fn annual_scalars(
    times: &[TimeStamp],
    concentration: &ndarray::Array3<Mv>,
    grid: &CellGrid,
    year: i32,
) -> (Mv, Mv) {
    let slices: Vec<(usize, f64)> = times
        .iter()
        .enumerate()
        .filter(|(_, t)| t.year == year)
        .map(|(i, t)| (i, f64::from(days_in_month(t.year, t.month))))
        .collect();
    if slices.is_empty() {
        return (Mv::NONE, Mv::NONE);
    }

    let (nlat, nlon) = grid.area.dim();
    let mut extent_mean = Array2::from_elem((nlat, nlon), Mv::NONE);
    let mut area_mean = Array2::from_elem((nlat, nlon), Mv::NONE);
    for i in 0..nlat {
        for j in 0..nlon {
            let cell_area = grid.area[[i, j]];
            extent_mean[[i, j]] = masked_weighted_mean(
                slices
                    .iter()
                    .map(|&(t, w)| (extent_cell(concentration[[t, i, j]], cell_area), w)),
            );
            area_mean[[i, j]] = masked_weighted_mean(
                slices
                    .iter()
                    .map(|&(t, w)| (concentration[[t, i, j]] * cell_area, w)),
            );
        }
    }

    (spatial_sum(extent_mean.view()), spatial_sum(area_mean.view()))
}

/// Single-month mode: one time slice per year, no averaging
fn month_scalars(
    times: &[TimeStamp],
    concentration: &ndarray::Array3<Mv>,
    grid: &CellGrid,
    year: i32,
    month: u32,
) -> (Mv, Mv) {
    let Some(t) = times
        .iter()
        .position(|ts| ts.year == year && ts.month == month)
    else {
        return (Mv::NONE, Mv::NONE);
    };

    let (nlat, nlon) = grid.area.dim();
    let mut extent_field = Array2::from_elem((nlat, nlon), Mv::NONE);
    let mut area_field = Array2::from_elem((nlat, nlon), Mv::NONE);
    for i in 0..nlat {
        for j in 0..nlon {
            let cell_area = grid.area[[i, j]];
            extent_field[[i, j]] = extent_cell(concentration[[t, i, j]], cell_area);
            area_field[[i, j]] = concentration[[t, i, j]] * cell_area;
        }
    }

    (
        spatial_sum(extent_field.view()),
        spatial_sum(area_field.view()),
    )
}

/// Extent contribution of one cell: full area at or above the threshold,
/// exactly zero below it, missing where unobserved
fn extent_cell(concentration: Mv, cell_area: Mv) -> Mv {
    match concentration.value() {
        None => Mv::NONE,
        Some(c) if c >= EXTENT_THRESHOLD => cell_area,
        Some(_) => Mv::some(0.0),
    }
}

/// Sum over latitude, then over longitude
fn spatial_sum(field: ArrayView2<Mv>) -> Mv {
    let per_lon: Vec<Mv> = field
        .axis_iter(Axis(1))
        .map(|col| masked_sum(col.iter().copied()))
        .collect();
    masked_sum(per_lon)
}

/// Days in a calendar month (leap years included)
///
/// A month outside 1-12 has no days, so it contributes no weight.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    use chrono::NaiveDate;
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 0,
    }
}

/// Per-dataset rows over the shared year axis
#[derive(Debug, Clone)]
pub struct SeriesTable {
    pub years: YearAxis,
    /// Legend annotations, one per row
    pub annotations: Vec<String>,
    /// Extent in 10⁶ km², [dataset, year]
    pub extent: Array2<Mv>,
    /// Area in 10⁶ km², [dataset, year]
    pub area: Array2<Mv>,
}

impl SeriesTable {
    /// Allocate an all-missing table for `n_datasets` rows
    #[must_use]
    pub fn new(years: YearAxis, n_datasets: usize) -> Self {
        SeriesTable {
            years,
            annotations: Vec::with_capacity(n_datasets),
            extent: Array2::from_elem((n_datasets, years.len()), Mv::NONE),
            area: Array2::from_elem((n_datasets, years.len()), Mv::NONE),
        }
    }

    /// Write one dataset's series into its row
    ///
    /// Years outside the dataset's own range stay missing.
    pub fn fill_row(&mut self, row: usize, annotation: String, series: &DatasetSeries) {
        self.annotations.push(annotation);
        for &(year, v) in &series.extent {
            self.extent[[row, self.years.index(year)]] = v;
        }
        for &(year, v) in &series.area {
            self.area[[row, self.years.index(year)]] = v;
        }
    }
}

/// Row indices of a [`StatsArray`]
pub mod stats_rows {
    pub const MEAN: usize = 0;
    pub const STDDEV: usize = 1;
    pub const LOW: usize = 2;
    pub const HIGH: usize = 3;
}

/// Multi-dataset statistics: rows {mean, stddev, mean−stddev, mean+stddev},
/// one column per year
#[derive(Debug, Clone)]
pub struct StatsArray {
    pub rows: Array2<Mv>,
}

impl StatsArray {
    #[must_use]
    pub fn row(&self, which: usize) -> Vec<Mv> {
        self.rows.row(which).to_vec()
    }
}

/// Aggregate mean and sample standard deviation across the included rows
///
/// `include` marks the dataset rows that enter the statistics, i.e. those
/// whose style averaging flag is zero.
#[must_use]
pub fn aggregate_stats(values: &Array2<Mv>, include: &[bool]) -> StatsArray {
    let n_years = values.ncols();
    let mut rows = Array2::from_elem((4, n_years), Mv::NONE);
    for col in 0..n_years {
        let col_view = values.column(col);
        let column = col_view
            .iter()
            .zip(include)
            .filter(|(_, &inc)| inc)
            .map(|(&v, _)| v);
        let (mean, std) = masked_mean_stddev(column);
        rows[[stats_rows::MEAN, col]] = mean;
        rows[[stats_rows::STDDEV, col]] = std;
        rows[[stats_rows::LOW, col]] = mean - std;
        rows[[stats_rows::HIGH, col]] = mean + std;
    }
    StatsArray { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Region;
    use crate::dataset::GridCoords;
    use ndarray::{array, Array3};

    fn uniform_grid() -> CellGrid {
        // Two northern cells of exactly 1 (10⁶ km²) each
        let coords = GridCoords::Irregular {
            lat: array![[70.0, 80.0]],
            lon: array![[0.0, 90.0]],
            area: Array2::from_elem((1, 2), Mv::some(1.0e12)),
        };
        CellGrid::resolve(&coords, Region::Arctic).unwrap()
    }

    fn monthly_times(year: i32) -> Vec<TimeStamp> {
        (1..=12).map(|month| TimeStamp { year, month }).collect()
    }

    #[test]
    fn extent_threshold_is_inclusive() {
        let area = Mv::some(2.0);
        assert_eq!(extent_cell(Mv::some(0.15), area).value(), Some(2.0));
        assert_eq!(extent_cell(Mv::some(0.1499), area).value(), Some(0.0));
        assert!(extent_cell(Mv::NONE, area).is_missing());
    }

    #[test]
    fn annual_mode_full_cover_gives_cell_count() {
        let grid = uniform_grid();
        let times = monthly_times(2000);
        let conc = Array3::from_elem((12, 1, 2), Mv::some(1.0));
        let series = dataset_series(&times, &conc, &grid, MonthSelector::Annual, 2000, 2001);
        assert_eq!(series.extent[0].1.value(), Some(2.0));
        assert_eq!(series.area[0].1.value(), Some(2.0));
    }

    #[test]
    fn no_cell_above_threshold_gives_zero_extent() {
        let grid = uniform_grid();
        let times = monthly_times(2000);
        let conc = Array3::from_elem((12, 1, 2), Mv::some(0.1));
        let series = dataset_series(&times, &conc, &grid, MonthSelector::Annual, 2000, 2001);
        assert_eq!(series.extent[0].1.value(), Some(0.0));
        // Area still counts the sub-threshold concentration
        let a = series.area[0].1.unwrap_or(0.0);
        assert!((a - 0.2).abs() < 1e-12);
    }

    #[test]
    fn month_mode_picks_the_matching_slice() {
        let grid = uniform_grid();
        let times = monthly_times(2000);
        let mut conc = Array3::from_elem((12, 1, 2), Mv::some(0.0));
        // Only March is icy
        conc[[2, 0, 0]] = Mv::some(1.0);
        conc[[2, 0, 1]] = Mv::some(1.0);

        let march = MonthSelector::month(3).unwrap();
        let series = dataset_series(&times, &conc, &grid, march, 2000, 2001);
        assert_eq!(series.extent[0].1.value(), Some(2.0));

        let september = MonthSelector::month(9).unwrap();
        let series = dataset_series(&times, &conc, &grid, september, 2000, 2001);
        assert_eq!(series.extent[0].1.value(), Some(0.0));
    }

    #[test]
    fn missing_month_gives_missing_scalar() {
        let grid = uniform_grid();
        // Only half a year of data
        let times: Vec<TimeStamp> = (1..=6).map(|month| TimeStamp { year: 2000, month }).collect();
        let conc = Array3::from_elem((6, 1, 2), Mv::some(1.0));
        let december = MonthSelector::month(12).unwrap();
        let series = dataset_series(&times, &conc, &grid, december, 2000, 2001);
        assert!(series.extent[0].1.is_missing());
    }

    #[test]
    fn annual_mean_is_day_weighted() {
        let grid = uniform_grid();
        // Two slices: January fully icy, February ice free
        let times = vec![
            TimeStamp { year: 2001, month: 1 },
            TimeStamp { year: 2001, month: 2 },
        ];
        let mut conc = Array3::from_elem((2, 1, 2), Mv::some(0.0));
        conc[[0, 0, 0]] = Mv::some(1.0);
        conc[[0, 0, 1]] = Mv::some(1.0);

        let series = dataset_series(&times, &conc, &grid, MonthSelector::Annual, 2001, 2002);
        // 31 January days against 28 February days, two cells of area 1
        let expected = 2.0 * 31.0 / (31.0 + 28.0);
        assert!((series.area[0].1.unwrap_or(0.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn rows_outside_dataset_range_stay_missing() {
        let axis = YearAxis { start: 1990, end: 2000 };
        let mut table = SeriesTable::new(axis, 1);
        let series = DatasetSeries {
            extent: vec![(1995, Mv::some(1.0)), (1996, Mv::some(2.0))],
            area: vec![(1995, Mv::some(0.5)), (1996, Mv::some(0.6))],
        };
        table.fill_row(0, "test".to_string(), &series);

        for year in 1990..2000 {
            let col = axis.index(year);
            if (1995..=1996).contains(&year) {
                assert!(!table.extent[[0, col]].is_missing());
            } else {
                assert!(table.extent[[0, col]].is_missing());
                assert!(table.area[[0, col]].is_missing());
            }
        }
    }

    #[test]
    fn stats_band_is_exactly_mean_plus_minus_stddev() {
        let values = array![
            [Mv::some(1.0), Mv::some(4.0)],
            [Mv::some(3.0), Mv::some(8.0)],
            [Mv::some(100.0), Mv::some(100.0)], // excluded row
        ];
        let stats = aggregate_stats(&values, &[true, true, false]);

        for col in 0..2 {
            let mean = stats.rows[[stats_rows::MEAN, col]];
            let std = stats.rows[[stats_rows::STDDEV, col]];
            assert_eq!(stats.rows[[stats_rows::LOW, col]], mean - std);
            assert_eq!(stats.rows[[stats_rows::HIGH, col]], mean + std);
        }
        assert_eq!(stats.rows[[stats_rows::MEAN, 0]].value(), Some(2.0));
        assert_eq!(stats.rows[[stats_rows::MEAN, 1]].value(), Some(6.0));
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2001, 2), 28);
        assert_eq!(days_in_month(2001, 12), 31);
        // Invalid months carry no weight
        assert_eq!(days_in_month(2001, 0), 0);
        assert_eq!(days_in_month(2001, 13), 0);
    }

    #[test]
    fn year_axis_spans_all_ranges() {
        let axis = YearAxis::spanning([(1990, 1995), (1993, 2000)]);
        assert_eq!(axis, YearAxis { start: 1990, end: 2000 });
        assert_eq!(axis.len(), 10);
        assert_eq!(axis.index(1993), 3);

        let empty = YearAxis::spanning(Vec::<(i32, i32)>::new());
        assert!(empty.is_empty());
    }
}
