use crate::geo::Boundary;
use crate::imagery::{ImageSeries, Raster};
use crate::prelude::{DashboardError, DashboardResult, ImageryProvider};
use crate::telemetry::LogManager;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Boundary-clipped mean of one calendar year of source images.
#[derive(Debug, Clone)]
pub struct AnnualComposite {
    pub year: i32,
    /// January 1st of `year`.
    pub timestamp: NaiveDate,
    pub source_count: usize,
    pub image: Arc<Raster>,
}

impl AnnualComposite {
    pub fn is_empty(&self) -> bool {
        self.source_count == 0 || self.image.is_empty()
    }
}

/// Exactly one composite per year, built once and never mutated.
#[derive(Debug, Clone, Default)]
pub struct CompositeSet {
    composites: BTreeMap<i32, AnnualComposite>,
}

impl CompositeSet {
    pub fn get(&self, year: i32) -> Option<&AnnualComposite> {
        self.composites.get(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.composites.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnnualComposite> {
        self.composites.values()
    }

    pub fn len(&self) -> usize {
        self.composites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.composites.is_empty()
    }
}

pub struct AnnualCompositeBuilder {
    years: RangeInclusive<i32>,
    boundary: Arc<Boundary>,
    logger: LogManager,
}

impl AnnualCompositeBuilder {
    pub fn new(years: RangeInclusive<i32>, boundary: Arc<Boundary>) -> Self {
        Self {
            years,
            boundary,
            logger: LogManager::scoped("composite"),
        }
    }

    /// A year without source images still gets a composite, fully masked.
    pub fn build(
        &self,
        provider: &dyn ImageryProvider,
        series: &ImageSeries,
    ) -> DashboardResult<CompositeSet> {
        let mut composites = BTreeMap::new();
        for year in self.years.clone() {
            let timestamp = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| {
                DashboardError::InvalidConfig(format!("year {year} is not a valid date"))
            })?;
            let images = series.filter_year(year);
            let mean = provider.mean(images.images(), series.grid())?;
            let image = mean.clip(&self.boundary);

            if images.is_empty() {
                self.logger
                    .warn(&format!("{year}: no source images, composite is empty"));
            } else {
                self.logger.record(&format!(
                    "{year}: {} source images, {} valid pixels",
                    images.len(),
                    image.valid_count()
                ));
            }

            composites.insert(
                year,
                AnnualComposite {
                    year,
                    timestamp,
                    source_count: images.len(),
                    image: Arc::new(image),
                },
            );
        }
        Ok(CompositeSet { composites })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagery::testing::{sample_boundary, sample_provider, sample_series};

    #[test]
    fn builds_one_composite_per_year() {
        let provider = sample_provider();
        let boundary = Arc::new(sample_boundary());
        let builder = AnnualCompositeBuilder::new(2015..=2025, boundary);
        let set = builder.build(&provider, &sample_series()).unwrap();

        assert_eq!(set.len(), 11);
        for year in 2015..=2025 {
            let composite = set.get(year).unwrap();
            assert_eq!(composite.year, year);
            assert_eq!(composite.timestamp, NaiveDate::from_ymd_opt(year, 1, 1).unwrap());
        }
        assert_eq!(set.years().next(), Some(2015));
    }

    #[test]
    fn year_without_images_is_empty_not_missing() {
        let provider = sample_provider();
        let builder = AnnualCompositeBuilder::new(2015..=2030, Arc::new(sample_boundary()));
        let set = builder.build(&provider, &sample_series()).unwrap();
        let composite = set.get(2030).unwrap();
        assert!(composite.is_empty());
        assert_eq!(composite.source_count, 0);
    }

    #[test]
    fn composite_is_clipped_to_boundary() {
        let provider = sample_provider();
        let boundary = sample_boundary();
        let builder = AnnualCompositeBuilder::new(2015..=2015, Arc::new(boundary.clone()));
        let set = builder.build(&provider, &sample_series()).unwrap();
        let image = &set.get(2015).unwrap().image;
        let grid = *image.grid();
        for row in 0..grid.rows {
            for col in 0..grid.cols {
                let center = grid.cell_center(row, col);
                if !boundary.contains(center) {
                    assert_eq!(image.sample(center), None);
                }
            }
        }
    }
}
