use crate::geo::GeoPoint;
use crate::imagery::{GridSpec, Raster, SourceImage};
use crate::math::{MatrixHelper, StatsHelper};
use crate::prelude::{ProviderError, ProviderResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One sample of a point time series; `value` is `None` for a gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Option<f32>,
}

pub fn mean_composite(images: &[Arc<SourceImage>], grid: &GridSpec) -> ProviderResult<Raster> {
    if let Some(odd) = images.iter().find(|image| image.raster.grid() != grid) {
        return Err(ProviderError::GridMismatch(format!(
            "image {} is not on the composite grid",
            odd.id
        )));
    }
    let mean = MatrixHelper::nan_mean(
        (grid.rows, grid.cols),
        images.iter().map(|image| image.raster.values()),
    );
    Raster::new(*grid, mean)
        .ok_or_else(|| ProviderError::GridMismatch("composite shape differs from grid".into()))
}

/// Share of `images` with a value at `point`, in percent.
pub fn availability(images: &[Arc<SourceImage>], point: GeoPoint) -> f64 {
    let valid = images
        .iter()
        .filter(|image| image.raster.sample(point).is_some())
        .count();
    StatsHelper::percentage(valid, images.len())
}

pub fn point_series(images: &[Arc<SourceImage>], point: GeoPoint) -> Vec<SeriesPoint> {
    images
        .iter()
        .map(|image| SeriesPoint {
            date: image.acquired,
            value: image.raster.sample(point),
        })
        .collect()
}
