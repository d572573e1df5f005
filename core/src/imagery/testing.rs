//! Fixture archive: a 4x4 grid with a 3x3 boundary in its north-west corner.
//!
//! Cell values depend on the column (0.1, 0.3, 0.55, 0.7). Of the four
//! images per year, row 0 misses the first two, row 1 the first three, and
//! rows 2-3 are always present.

use crate::geo::{Boundary, GeoPoint};
use crate::imagery::{
    ArchiveProvider, Feature, FeatureCollection, GridSpec, ImageSeries, Raster, SourceImage,
};
use chrono::NaiveDate;
use ndarray::Array2;
use std::sync::Arc;

pub(crate) const COLUMN_VALUES: [f32; 4] = [0.1, 0.3, 0.55, 0.7];

pub(crate) fn sample_grid() -> GridSpec {
    GridSpec {
        west: 0.0,
        north: 4.0,
        cell_size: 1.0,
        rows: 4,
        cols: 4,
    }
}

pub(crate) fn sample_boundary() -> Boundary {
    Boundary::new(
        "Bangladesh",
        vec![vec![
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(3.0, 1.0),
            GeoPoint::new(3.0, 4.0),
            GeoPoint::new(0.0, 4.0),
        ]],
    )
}

fn sample_image(year: i32, index: usize) -> Arc<SourceImage> {
    let grid = sample_grid();
    let values = Array2::from_shape_fn((grid.rows, grid.cols), |(row, col)| {
        let missing = match row {
            0 => index < 2,
            1 => index < 3,
            _ => false,
        };
        if missing {
            f32::NAN
        } else {
            COLUMN_VALUES[col]
        }
    });
    let acquired = NaiveDate::from_ymd_opt(year, 1 + 3 * index as u32, 15).unwrap();
    Arc::new(SourceImage::new(
        format!("{year}_{index}"),
        acquired,
        Raster::new(grid, values).unwrap(),
    ))
}

/// 2014..=2026, four images per year.
pub(crate) fn sample_series() -> ImageSeries {
    let images = (2014..=2026)
        .flat_map(|year| (0..4).map(move |index| sample_image(year, index)))
        .collect();
    ImageSeries::new(sample_grid(), images).unwrap()
}

pub(crate) fn sample_provider() -> ArchiveProvider {
    let mut features = FeatureCollection::new(
        "FAO/GAUL/2015/level0",
        vec![Feature::new(sample_boundary()).with_property("ADM0_NAME", "Bangladesh")],
    );
    features.features.push(
        Feature::new(Boundary::new(
            "Bhutan",
            vec![vec![
                GeoPoint::new(10.0, 10.0),
                GeoPoint::new(11.0, 10.0),
                GeoPoint::new(11.0, 11.0),
            ]],
        ))
        .with_property("ADM0_NAME", "Bhutan"),
    );
    ArchiveProvider::new()
        .with_features(features)
        .with_collection(
            "LANDSAT/COMPOSITES/C02/T1_L2_32DAY_NDVI",
            "NDVI",
            sample_series(),
        )
}

/// Cell centre of column `col` in row `row`.
pub(crate) fn point(row: usize, col: usize) -> GeoPoint {
    sample_grid().cell_center(row, col)
}
