use crate::imagery::raster::{GridSpec, Raster};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One acquisition of the NDVI band.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub id: String,
    pub acquired: NaiveDate,
    pub raster: Raster,
}

impl SourceImage {
    pub fn new(id: impl Into<String>, acquired: NaiveDate, raster: Raster) -> Self {
        Self {
            id: id.into(),
            acquired,
            raster,
        }
    }
}

/// Date-window query against a named raster collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionQuery {
    pub collection: String,
    pub band: String,
    /// Inclusive.
    pub start: NaiveDate,
    /// Inclusive.
    pub end: NaiveDate,
}

/// Acquisition-ordered image sequence on a single grid.
#[derive(Debug, Clone)]
pub struct ImageSeries {
    grid: GridSpec,
    images: Vec<Arc<SourceImage>>,
}

impl ImageSeries {
    /// Sorts by acquisition date. Returns `None` if any image is on another grid.
    pub fn new(grid: GridSpec, mut images: Vec<Arc<SourceImage>>) -> Option<Self> {
        if images.iter().any(|image| *image.raster.grid() != grid) {
            return None;
        }
        images.sort_by_key(|image| image.acquired);
        Some(Self { grid, images })
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn images(&self) -> &[Arc<SourceImage>] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn filter_dates(&self, start: NaiveDate, end: NaiveDate) -> Self {
        self.filter(|image| image.acquired >= start && image.acquired <= end)
    }

    pub fn filter_year(&self, year: i32) -> Self {
        self.filter(|image| image.acquired.year() == year)
    }

    fn filter(&self, keep: impl Fn(&SourceImage) -> bool) -> Self {
        Self {
            grid: self.grid,
            images: self
                .images
                .iter()
                .filter(|image| keep(image))
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagery::raster::tests::grid;

    fn image(date: (i32, u32, u32)) -> Arc<SourceImage> {
        let acquired = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        Arc::new(SourceImage::new(
            acquired.to_string(),
            acquired,
            Raster::empty(grid(1, 1)),
        ))
    }

    #[test]
    fn series_sorts_and_filters_by_calendar_year() {
        let series = ImageSeries::new(
            grid(1, 1),
            vec![image((2016, 3, 1)), image((2015, 12, 31)), image((2016, 1, 1))],
        )
        .unwrap();
        assert_eq!(series.images()[0].id, "2015-12-31");
        assert_eq!(series.filter_year(2016).len(), 2);
        assert!(series.filter_year(2017).is_empty());
    }

    #[test]
    fn date_filter_is_inclusive() {
        let series =
            ImageSeries::new(grid(1, 1), vec![image((2015, 1, 1)), image((2025, 12, 31))])
                .unwrap();
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(series.filter_dates(start, end).len(), 2);
        assert_eq!(series.filter_dates(start, end.pred_opt().unwrap()).len(), 1);
    }

    #[test]
    fn series_rejects_mixed_grids() {
        let other = Arc::new(SourceImage::new(
            "odd",
            NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            Raster::empty(grid(2, 2)),
        ));
        assert!(ImageSeries::new(grid(1, 1), vec![other]).is_none());
    }
}
