use crate::geo::{BoundingBox, Boundary, GeoPoint};
use crate::math::StatsHelper;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Shared pixel grid: north-west origin, square cells in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub west: f64,
    pub north: f64,
    pub cell_size: f64,
    pub rows: usize,
    pub cols: usize,
}

impl GridSpec {
    /// Cell index holding `point`, or `None` outside the grid.
    pub fn cell_of(&self, point: GeoPoint) -> Option<(usize, usize)> {
        if self.cell_size <= 0.0 || !point.is_finite() {
            return None;
        }
        let col = ((point.lon - self.west) / self.cell_size).floor();
        let row = ((self.north - point.lat) / self.cell_size).floor();
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        (row < self.rows && col < self.cols).then_some((row, col))
    }

    pub fn cell_center(&self, row: usize, col: usize) -> GeoPoint {
        GeoPoint::new(
            self.west + (col as f64 + 0.5) * self.cell_size,
            self.north - (row as f64 + 0.5) * self.cell_size,
        )
    }

    pub fn extent(&self) -> BoundingBox {
        BoundingBox {
            west: self.west,
            south: self.north - self.rows as f64 * self.cell_size,
            east: self.west + self.cols as f64 * self.cell_size,
            north: self.north,
        }
    }
}

/// Single-band raster; `NaN` marks missing pixels.
#[derive(Debug, Clone)]
pub struct Raster {
    grid: GridSpec,
    values: Array2<f32>,
}

impl Raster {
    /// Wraps `values`, which must be shaped `(grid.rows, grid.cols)`.
    pub fn new(grid: GridSpec, values: Array2<f32>) -> Option<Self> {
        (values.dim() == (grid.rows, grid.cols)).then_some(Self { grid, values })
    }

    pub fn empty(grid: GridSpec) -> Self {
        Self {
            grid,
            values: Array2::from_elem((grid.rows, grid.cols), f32::NAN),
        }
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    /// Value at `point`; no-data and out-of-grid points yield `None`.
    pub fn sample(&self, point: GeoPoint) -> Option<f32> {
        let (row, col) = self.grid.cell_of(point)?;
        self.values.get((row, col)).copied().filter(|v| !v.is_nan())
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.valid_count() == 0
    }

    /// Masks every pixel whose centre lies outside `boundary`.
    pub fn clip(mut self, boundary: &Boundary) -> Self {
        let grid = self.grid;
        for ((row, col), value) in self.values.indexed_iter_mut() {
            if !boundary.contains(grid.cell_center(row, col)) {
                *value = f32::NAN;
            }
        }
        self
    }

    /// Mean over the valid pixels whose centres fall inside `boundary`.
    pub fn mean_within(&self, boundary: &Boundary) -> Option<f32> {
        StatsHelper::mean(self.values.indexed_iter().map(|((row, col), value)| {
            (!value.is_nan() && boundary.contains(self.grid.cell_center(row, col))).then_some(*value)
        }))
    }

    /// Row-major copy with no-data as `None`.
    pub fn to_cells(&self) -> Vec<Option<f32>> {
        self.values
            .iter()
            .map(|v| if v.is_nan() { None } else { Some(*v) })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn grid(rows: usize, cols: usize) -> GridSpec {
        GridSpec {
            west: 0.0,
            north: rows as f64,
            cell_size: 1.0,
            rows,
            cols,
        }
    }

    #[test]
    fn sample_maps_coordinates_to_cells() {
        let values = Array2::from_shape_vec((2, 2), vec![0.1, 0.2, 0.3, f32::NAN]).unwrap();
        let raster = Raster::new(grid(2, 2), values).unwrap();
        assert_eq!(raster.sample(GeoPoint::new(0.5, 1.5)), Some(0.1));
        assert_eq!(raster.sample(GeoPoint::new(1.5, 1.5)), Some(0.2));
        assert_eq!(raster.sample(GeoPoint::new(0.5, 0.5)), Some(0.3));
        assert_eq!(raster.sample(GeoPoint::new(1.5, 0.5)), None);
        assert_eq!(raster.sample(GeoPoint::new(-0.5, 0.5)), None);
        assert_eq!(raster.sample(GeoPoint::new(0.5, 2.5)), None);
    }

    #[test]
    fn non_finite_coordinates_sample_nothing() {
        let raster = Raster::new(grid(2, 2), Array2::from_elem((2, 2), 0.7)).unwrap();
        assert_eq!(raster.sample(GeoPoint::new(f64::NAN, f64::NAN)), None);
        assert_eq!(raster.sample(GeoPoint::new(0.5, f64::INFINITY)), None);
        assert_eq!(raster.grid().cell_of(GeoPoint::new(f64::NEG_INFINITY, 0.5)), None);
    }

    #[test]
    fn raster_rejects_mismatched_shape() {
        assert!(Raster::new(grid(2, 2), Array2::zeros((3, 2))).is_none());
    }

    #[test]
    fn clip_masks_cells_outside_boundary() {
        let raster = Raster::new(grid(2, 2), Array2::from_elem((2, 2), 0.5)).unwrap();
        let boundary = Boundary::new(
            "left column",
            vec![vec![
                GeoPoint::new(0.0, 0.0),
                GeoPoint::new(1.0, 0.0),
                GeoPoint::new(1.0, 2.0),
                GeoPoint::new(0.0, 2.0),
            ]],
        );
        let clipped = raster.clip(&boundary);
        assert_eq!(clipped.valid_count(), 2);
        assert_eq!(clipped.sample(GeoPoint::new(1.5, 1.5)), None);
        assert_eq!(clipped.mean_within(&boundary), Some(0.5));
    }

    #[test]
    fn empty_raster_has_no_valid_pixels() {
        let raster = Raster::empty(grid(3, 4));
        assert!(raster.is_empty());
        assert_eq!(raster.to_cells().len(), 12);
        assert_eq!(raster.grid().extent().south, 0.0);
    }
}
