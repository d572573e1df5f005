use crate::geo::Boundary;
use crate::imagery::{
    CollectionQuery, ExportReceipt, ExportTask, FeatureCollection, FeatureQuery, ImageSeries,
};
use crate::prelude::{ImageryProvider, ProviderError, ProviderResult};
use crate::telemetry::LogManager;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// In-memory imagery provider over preloaded feature sets and image series.
///
/// Export tasks are only queued; nothing executes them.
pub struct ArchiveProvider {
    features: HashMap<String, FeatureCollection>,
    collections: HashMap<String, (String, ImageSeries)>,
    exports: Mutex<Vec<ExportTask>>,
    next_task: AtomicU64,
    logger: LogManager,
}

impl ArchiveProvider {
    pub fn new() -> Self {
        Self {
            features: HashMap::new(),
            collections: HashMap::new(),
            exports: Mutex::new(Vec::new()),
            next_task: AtomicU64::new(1),
            logger: LogManager::scoped("archive"),
        }
    }

    pub fn with_features(mut self, collection: FeatureCollection) -> Self {
        self.features.insert(collection.name.clone(), collection);
        self
    }

    pub fn with_collection(
        mut self,
        name: impl Into<String>,
        band: impl Into<String>,
        series: ImageSeries,
    ) -> Self {
        self.collections.insert(name.into(), (band.into(), series));
        self
    }

    pub fn queued_exports(&self) -> Vec<ExportTask> {
        self.exports
            .lock()
            .map(|queue| queue.clone())
            .unwrap_or_default()
    }
}

impl Default for ArchiveProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageryProvider for ArchiveProvider {
    fn features(&self, query: &FeatureQuery) -> ProviderResult<Boundary> {
        self.features
            .get(&query.dataset)
            .and_then(|collection| collection.select(query))
            .ok_or_else(|| ProviderError::FeatureNotFound {
                dataset: query.dataset.clone(),
                property: query.property.clone(),
                value: query.value.clone(),
            })
    }

    fn collection(&self, query: &CollectionQuery) -> ProviderResult<ImageSeries> {
        match self.collections.get(&query.collection) {
            Some((band, series)) if *band == query.band => {
                Ok(series.filter_dates(query.start, query.end))
            }
            _ => Err(ProviderError::UnknownCollection(format!(
                "{}/{}",
                query.collection, query.band
            ))),
        }
    }

    fn submit_export(&self, task: ExportTask) -> ProviderResult<ExportReceipt> {
        let mut queue = self
            .exports
            .lock()
            .map_err(|_| ProviderError::Unavailable("export queue poisoned".into()))?;
        let task_id = format!("TASK-{:04}", self.next_task.fetch_add(1, Ordering::Relaxed));
        self.logger
            .record(&format!("queued {} as {}", task.description, task_id));
        let receipt = ExportReceipt {
            task_id,
            description: task.description.clone(),
        };
        queue.push(task);
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagery::testing::{sample_boundary, sample_provider};
    use crate::prelude::DashboardConfig;
    use std::sync::Arc;

    #[test]
    fn provider_filters_collection_by_date_window() {
        let provider = sample_provider();
        let query = DashboardConfig::default().collection_query().unwrap();
        let series = provider.collection(&query).unwrap();
        assert_eq!(series.len(), 11 * 4);
        assert!(series.filter_year(2014).is_empty());
    }

    #[test]
    fn provider_rejects_unknown_collection_and_band() {
        let provider = sample_provider();
        let mut query = DashboardConfig::default().collection_query().unwrap();
        query.band = "EVI".into();
        assert!(matches!(
            provider.collection(&query),
            Err(ProviderError::UnknownCollection(_))
        ));
    }

    #[test]
    fn provider_looks_up_boundary_by_attribute() {
        let provider = sample_provider();
        let mut query = DashboardConfig::default().boundary_query();
        assert_eq!(provider.features(&query).unwrap().rings, sample_boundary().rings);
        query.value = "Atlantis".into();
        assert!(matches!(
            provider.features(&query),
            Err(ProviderError::FeatureNotFound { .. })
        ));
    }

    #[test]
    fn export_submission_is_queued_with_sequential_ids() {
        let provider = sample_provider();
        let series = provider
            .collection(&DashboardConfig::default().collection_query().unwrap())
            .unwrap();
        let task = ExportTask {
            image: Arc::new(crate::imagery::Raster::empty(*series.grid())),
            year: 2015,
            description: "Bangladesh_Annual_NDVI_2015".into(),
            folder: "GEE_NDVI_Exports".into(),
            file_name_prefix: "NDVI_Bangladesh_2015".into(),
            region: Arc::new(sample_boundary()),
            scale: 30.0,
            max_pixels: 10_000_000_000_000,
        };
        let first = provider.submit_export(task.clone()).unwrap();
        let second = provider.submit_export(task).unwrap();
        assert_eq!(first.task_id, "TASK-0001");
        assert_eq!(second.task_id, "TASK-0002");
        assert_eq!(provider.queued_exports().len(), 2);
    }
}
