use crate::generator::template::{
    bangladesh_outline, bhutan_outline, myanmar_outline, seasonal_wave,
};
use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use ndarray::Array2;
use ndvicore::geo::{Boundary, GeoPoint};
use ndvicore::imagery::{
    ArchiveProvider, Feature, FeatureCollection, GridSpec, ImageSeries, Raster, SourceImage,
};
use ndvicore::DashboardConfig;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for generating a synthetic NDVI archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveProfile {
    pub seed: u64,
    /// Degrees per pixel.
    pub cell_size: f64,
    /// Acquisitions per year on a 32-day cadence; capped by the calendar.
    pub images_per_year: usize,
    pub first_year: i32,
    pub last_year: i32,
    /// Probability that a pixel is cloud-masked, scaled up in the monsoon.
    pub cloud_fraction: f32,
    pub noise: f32,
    /// Years with no acquisitions at all.
    pub missing_years: Vec<i32>,
}

impl Default for ArchiveProfile {
    fn default() -> Self {
        Self {
            seed: 0,
            cell_size: 0.05,
            images_per_year: 12,
            first_year: 2014,
            last_year: 2026,
            cloud_fraction: 0.3,
            noise: 0.04,
            missing_years: Vec::new(),
        }
    }
}

impl ArchiveProfile {
    fn normalized_cell_size(&self) -> f64 {
        if self.cell_size > 0.0 {
            self.cell_size
        } else {
            0.05
        }
    }

    /// Grid covering the boundary with one cell of margin.
    pub fn grid_for(&self, boundary: &Boundary) -> anyhow::Result<GridSpec> {
        let bbox = boundary
            .bounding_box()
            .context("boundary outline has no points")?;
        let cell = self.normalized_cell_size();
        let west = bbox.west - cell;
        let north = bbox.north + cell;
        let cols = ((bbox.east + cell - west) / cell).ceil() as usize;
        let rows = ((north - (bbox.south - cell)) / cell).ceil() as usize;
        Ok(GridSpec {
            west,
            north,
            cell_size: cell,
            rows,
            cols,
        })
    }

    fn acquisition_dates(&self, year: i32) -> Vec<NaiveDate> {
        if self.missing_years.contains(&year) {
            return Vec::new();
        }
        (0..self.images_per_year)
            .filter_map(|k| NaiveDate::from_yo_opt(year, 1 + 32 * k as u32))
            .collect()
    }
}

/// Long-term vegetation level at a location, before seasonality.
fn baseline(point: GeoPoint) -> f64 {
    // Sundarbans mangroves along the south-west coast.
    if point.lat < 22.3 && point.lon < 89.9 {
        return 0.78;
    }
    let pattern = (point.lon * 3.1).sin() * (point.lat * 2.3).cos();
    // Dhaka and surroundings.
    let urban = (-((point.lon - 90.41).powi(2) + (point.lat - 23.81).powi(2)) / 0.02).exp();
    (0.48 + 0.18 * pattern - 0.4 * urban).clamp(0.05, 0.9)
}

fn build_image(
    profile: &ArchiveProfile,
    grid: GridSpec,
    date: NaiveDate,
    rng: &mut StdRng,
) -> anyhow::Result<Raster> {
    let season = seasonal_wave(date.ordinal());
    let trend = 0.004 * (date.year() - 2015) as f64;
    // Monsoon (Jun-Sep) is cloudier.
    let monsoon = matches!(date.month(), 6..=9);
    let cloud = (profile.cloud_fraction * if monsoon { 1.8 } else { 0.6 }).clamp(0.0, 1.0);

    let values = Array2::from_shape_fn((grid.rows, grid.cols), |(row, col)| {
        if rng.gen::<f32>() < cloud {
            return f32::NAN;
        }
        let point = grid.cell_center(row, col);
        let jitter = if profile.noise > 0.0 {
            rng.gen_range(-profile.noise..profile.noise) as f64
        } else {
            0.0
        };
        (baseline(point) + 0.12 * season + trend + jitter).clamp(-0.2, 1.0) as f32
    });
    Raster::new(grid, values).context("generated raster does not match grid")
}

pub fn build_features(config: &DashboardConfig) -> FeatureCollection {
    let property = config.boundary_property.clone();
    let feature = |name: &str, rings| {
        Feature::new(Boundary::new(name, rings)).with_property(property.clone(), name)
    };
    FeatureCollection::new(
        config.boundary_dataset.clone(),
        vec![
            feature("Bangladesh", bangladesh_outline()),
            feature("Bhutan", bhutan_outline()),
            feature("Myanmar", myanmar_outline()),
        ],
    )
}

pub fn build_series(profile: &ArchiveProfile, grid: GridSpec) -> anyhow::Result<ImageSeries> {
    let mut rng = StdRng::seed_from_u64(profile.seed);
    let mut images = Vec::new();
    for year in profile.first_year..=profile.last_year {
        for date in profile.acquisition_dates(year) {
            let raster = build_image(profile, grid, date, &mut rng)
                .with_context(|| format!("generating image for {date}"))?;
            images.push(Arc::new(SourceImage::new(
                format!("{}", date.format("%Y_%m_%d")),
                date,
                raster,
            )));
        }
    }
    ImageSeries::new(grid, images).context("generated images disagree on grid")
}

/// In-memory provider holding the boundary features and the NDVI series.
pub fn build_archive(
    profile: &ArchiveProfile,
    config: &DashboardConfig,
) -> anyhow::Result<ArchiveProvider> {
    let features = build_features(config);
    let outline = features
        .select(&config.boundary_query())
        .with_context(|| format!("no outline generated for {}", config.country))?;
    let grid = profile.grid_for(&outline)?;
    let series = build_series(profile, grid)?;
    log::info!(
        "generated {} images on a {}x{} grid (seed {})",
        series.len(),
        grid.rows,
        grid.cols,
        profile.seed
    );
    Ok(ArchiveProvider::new()
        .with_features(features)
        .with_collection(config.collection.clone(), config.band.clone(), series))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_profile() -> ArchiveProfile {
        ArchiveProfile {
            cell_size: 0.5,
            first_year: 2015,
            last_year: 2016,
            seed: 7,
            ..Default::default()
        }
    }

    #[test]
    fn generator_builds_expected_image_count() {
        let profile = small_profile();
        let grid = profile.grid_for(&Boundary::new("b", bangladesh_outline())).unwrap();
        let series = build_series(&profile, grid).unwrap();
        assert_eq!(series.len(), 2 * 12);
        assert_eq!(series.filter_year(2016).images()[11].acquired.ordinal(), 353);
    }

    #[test]
    fn generator_is_deterministic_per_seed() {
        let profile = small_profile();
        let grid = profile.grid_for(&Boundary::new("b", bangladesh_outline())).unwrap();
        let a = build_series(&profile, grid).unwrap();
        let b = build_series(&profile, grid).unwrap();
        let cells = |s: &ImageSeries| s.images()[3].raster.to_cells();
        assert_eq!(cells(&a), cells(&b));
    }

    #[test]
    fn missing_years_have_no_acquisitions() {
        let profile = ArchiveProfile {
            missing_years: vec![2016],
            ..small_profile()
        };
        let grid = profile.grid_for(&Boundary::new("b", bangladesh_outline())).unwrap();
        let series = build_series(&profile, grid).unwrap();
        assert!(series.filter_year(2016).is_empty());
        assert_eq!(series.filter_year(2015).len(), 12);
    }

    #[test]
    fn archive_serves_configured_datasets() {
        use ndvicore::ImageryProvider;
        let config = DashboardConfig::default();
        let provider = build_archive(&small_profile(), &config).unwrap();
        let boundary = provider.features(&config.boundary_query()).unwrap();
        assert_eq!(boundary.name, "Bangladesh");
        let series = provider
            .collection(&config.collection_query().unwrap())
            .unwrap();
        assert_eq!(series.len(), 24);
    }

    #[test]
    fn archive_grid_follows_configured_country() {
        use ndvicore::Dashboard;
        let config = DashboardConfig {
            country: "Bhutan".into(),
            start_year: 2015,
            end_year: 2015,
            ..Default::default()
        };
        let profile = ArchiveProfile {
            cell_size: 0.25,
            cloud_fraction: 0.0,
            ..small_profile()
        };
        let provider = build_archive(&profile, &config).unwrap();
        let mut dashboard = Dashboard::load(config, Arc::new(provider)).unwrap();
        let composite = dashboard.composites().get(2015).unwrap();
        assert!(composite.image.valid_count() > 0);

        dashboard.inspect_blocking(GeoPoint::new(90.5, 27.4));
        assert!(dashboard.view().inspection.value.starts_with("NDVI: "));
    }

    #[test]
    fn archive_rejects_country_without_outline() {
        let config = DashboardConfig {
            country: "Atlantis".into(),
            ..Default::default()
        };
        assert!(build_archive(&small_profile(), &config).is_err());
    }
}
