use crate::geo::{Boundary, GeoPoint};
use crate::imagery::{
    CollectionQuery, ExportReceipt, ExportTask, FeatureQuery, GridSpec, ImageSeries, Raster,
    SourceImage,
};
use crate::processing::reduce::{self, SeriesPoint};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Dashboard-wide settings: year window, datasets, export parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub start_year: i32,
    pub end_year: i32,
    /// Percent; availability at or above this enables export.
    pub export_availability_threshold: f64,
    pub boundary_dataset: String,
    pub boundary_property: String,
    pub country: String,
    pub collection: String,
    pub band: String,
    pub export_folder: String,
    pub export_scale: f64,
    pub export_max_pixels: u64,
    pub chart_scale: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            start_year: 2015,
            end_year: 2025,
            export_availability_threshold: 50.0,
            boundary_dataset: "FAO/GAUL/2015/level0".into(),
            boundary_property: "ADM0_NAME".into(),
            country: "Bangladesh".into(),
            collection: "LANDSAT/COMPOSITES/C02/T1_L2_32DAY_NDVI".into(),
            band: "NDVI".into(),
            export_folder: "GEE_NDVI_Exports".into(),
            export_scale: 30.0,
            export_max_pixels: 10_000_000_000_000,
            chart_scale: 1000.0,
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> DashboardResult<()> {
        if self.start_year > self.end_year {
            return Err(DashboardError::InvalidConfig(format!(
                "start_year {} is after end_year {}",
                self.start_year, self.end_year
            )));
        }
        if !(0.0..=100.0).contains(&self.export_availability_threshold) {
            return Err(DashboardError::InvalidConfig(format!(
                "export threshold {} is outside 0..=100",
                self.export_availability_threshold
            )));
        }
        self.date_window()?;
        Ok(())
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.start_year..=self.end_year
    }

    /// `[start_year-01-01, end_year-12-31]`.
    pub fn date_window(&self) -> DashboardResult<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(self.start_year, 1, 1);
        let end = NaiveDate::from_ymd_opt(self.end_year, 12, 31);
        start.zip(end).ok_or_else(|| {
            DashboardError::InvalidConfig(format!(
                "years {}..={} are not representable dates",
                self.start_year, self.end_year
            ))
        })
    }

    pub fn boundary_query(&self) -> FeatureQuery {
        FeatureQuery {
            dataset: self.boundary_dataset.clone(),
            property: self.boundary_property.clone(),
            value: self.country.clone(),
        }
    }

    pub fn collection_query(&self) -> DashboardResult<CollectionQuery> {
        let (start, end) = self.date_window()?;
        Ok(CollectionQuery {
            collection: self.collection.clone(),
            band: self.band.clone(),
            start,
            end,
        })
    }

    fn country_token(&self) -> String {
        self.country.split_whitespace().collect::<Vec<_>>().join("_")
    }

    pub fn export_description(&self, year: i32) -> String {
        format!("{}_Annual_NDVI_{}", self.country_token(), year)
    }

    pub fn export_file_prefix(&self, year: i32) -> String {
        format!("NDVI_{}_{}", self.country_token(), year)
    }
}

/// Failures reported across the imagery provider boundary.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("no feature in {dataset} with {property} = {value}")]
    FeatureNotFound {
        dataset: String,
        property: String,
        value: String,
    },
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
    #[error("grid mismatch: {0}")]
    GridMismatch(String),
    #[error("export rejected: {0}")]
    ExportRejected(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Common error type for dashboard operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid year selection: {0:?}")]
    InvalidYear(String),
    #[error("no composite for year {0}")]
    NoCompositeForYear(i32),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("dashboard event loop is closed")]
    LoopClosed,
}

pub type DashboardResult<T> = Result<T, DashboardError>;

/// Contract consumed from the remote imagery platform.
///
/// Only lookup, archive access and export submission are required; the
/// reductions default to local evaluation over the rasters handed in.
/// Every call is a blocking round trip and may run off the event loop.
pub trait ImageryProvider: Send + Sync {
    fn features(&self, query: &FeatureQuery) -> ProviderResult<Boundary>;

    fn collection(&self, query: &CollectionQuery) -> ProviderResult<ImageSeries>;

    /// Queues an export; returns as soon as the task is accepted.
    fn submit_export(&self, task: ExportTask) -> ProviderResult<ExportReceipt>;

    /// Per-pixel mean of `images` on `grid`.
    fn mean(&self, images: &[Arc<SourceImage>], grid: &GridSpec) -> ProviderResult<Raster> {
        reduce::mean_composite(images, grid)
    }

    /// First-value reducer at a point.
    fn first_at(&self, raster: &Raster, point: GeoPoint) -> ProviderResult<Option<f32>> {
        Ok(raster.sample(point))
    }

    /// Percentage of `images` with a value at `point`.
    fn availability(
        &self,
        images: &[Arc<SourceImage>],
        point: GeoPoint,
    ) -> ProviderResult<Option<f64>> {
        Ok(Some(reduce::availability(images, point)))
    }

    /// Mean reducer at `point`, one entry per image.
    fn series_at(
        &self,
        images: &[Arc<SourceImage>],
        point: GeoPoint,
    ) -> ProviderResult<Vec<SeriesPoint>> {
        Ok(reduce::point_series(images, point))
    }

    fn region_mean(&self, raster: &Raster, region: &Boundary) -> ProviderResult<Option<f32>> {
        Ok(raster.mean_within(region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = DashboardConfig::default();
        config.validate().unwrap();
        assert_eq!(config.years().count(), 11);
        let (start, end) = config.date_window().unwrap();
        assert_eq!(start.to_string(), "2015-01-01");
        assert_eq!(end.to_string(), "2025-12-31");
    }

    #[test]
    fn config_rejects_inverted_years_and_bad_threshold() {
        let inverted = DashboardConfig {
            start_year: 2020,
            end_year: 2019,
            ..Default::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(DashboardError::InvalidConfig(_))
        ));

        let threshold = DashboardConfig {
            export_availability_threshold: 120.0,
            ..Default::default()
        };
        assert!(threshold.validate().is_err());
    }

    #[test]
    fn export_names_embed_country_and_year() {
        let config = DashboardConfig {
            country: "Sri Lanka".into(),
            ..Default::default()
        };
        assert_eq!(config.export_description(2018), "Sri_Lanka_Annual_NDVI_2018");
        assert_eq!(config.export_file_prefix(2018), "NDVI_Sri_Lanka_2018");
        assert_eq!(
            DashboardConfig::default().export_description(2015),
            "Bangladesh_Annual_NDVI_2015"
        );
    }
}
