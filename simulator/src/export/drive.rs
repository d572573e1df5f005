use anyhow::Context;
use log::{error, info};
use ndvicore::geo::Boundary;
use ndvicore::imagery::{
    CollectionQuery, ExportReceipt, ExportTask, FeatureQuery, GridSpec, ImageSeries, Raster,
    SourceImage,
};
use ndvicore::prelude::{ProviderError, ProviderResult};
use ndvicore::processing::SeriesPoint;
use ndvicore::{geo::GeoPoint, ImageryProvider};
use serde_json::json;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Provider decorator that runs export tasks on a background writer.
///
/// `submit_export` returns once the task is queued; the worker writes
/// `{root}/{folder}/{prefix}.json` and only logs the outcome.
pub struct DriveProvider {
    inner: Arc<dyn ImageryProvider>,
    queue: Mutex<Option<mpsc::Sender<ExportTask>>>,
    worker: Mutex<Option<JoinHandle<usize>>>,
    next_task: AtomicU64,
}

impl DriveProvider {
    pub fn spawn(inner: Arc<dyn ImageryProvider>, root: PathBuf) -> Self {
        let (sender, receiver) = mpsc::channel::<ExportTask>();
        let worker = thread::spawn(move || {
            let mut written = 0;
            for task in receiver {
                match write_export(&root, &task) {
                    Ok(path) => {
                        written += 1;
                        info!("[drive] {} written to {}", task.description, path.display());
                    }
                    Err(err) => error!("[drive] {} failed: {:#}", task.description, err),
                }
            }
            written
        });
        Self {
            inner,
            queue: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            next_task: AtomicU64::new(1),
        }
    }

    /// Stops accepting tasks, drains the queue and returns how many were written.
    pub fn finish(&self) -> usize {
        if let Ok(mut queue) = self.queue.lock() {
            queue.take();
        }
        let worker = self.worker.lock().ok().and_then(|mut worker| worker.take());
        worker.and_then(|handle| handle.join().ok()).unwrap_or(0)
    }
}

pub fn export_path(root: &Path, task: &ExportTask) -> PathBuf {
    root.join(&task.folder)
        .join(format!("{}.json", task.file_name_prefix))
}

fn write_export(root: &Path, task: &ExportTask) -> anyhow::Result<PathBuf> {
    let path = export_path(root, task);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating export folder {}", parent.display()))?;
    }
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let document = json!({
        "manifest": task.manifest(),
        "values": task.image.to_cells(),
    });
    serde_json::to_writer(BufWriter::new(file), &document)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

impl ImageryProvider for DriveProvider {
    fn features(&self, query: &FeatureQuery) -> ProviderResult<Boundary> {
        self.inner.features(query)
    }

    fn collection(&self, query: &CollectionQuery) -> ProviderResult<ImageSeries> {
        self.inner.collection(query)
    }

    fn submit_export(&self, task: ExportTask) -> ProviderResult<ExportReceipt> {
        let queue = self
            .queue
            .lock()
            .map_err(|_| ProviderError::Unavailable("drive queue poisoned".into()))?;
        let sender = queue
            .as_ref()
            .ok_or_else(|| ProviderError::ExportRejected("drive worker stopped".into()))?;
        let receipt = ExportReceipt {
            task_id: format!("DRIVE-{:04}", self.next_task.fetch_add(1, Ordering::Relaxed)),
            description: task.description.clone(),
        };
        sender
            .send(task)
            .map_err(|_| ProviderError::ExportRejected("drive worker exited".into()))?;
        Ok(receipt)
    }

    fn mean(&self, images: &[Arc<SourceImage>], grid: &GridSpec) -> ProviderResult<Raster> {
        self.inner.mean(images, grid)
    }

    fn first_at(&self, raster: &Raster, point: GeoPoint) -> ProviderResult<Option<f32>> {
        self.inner.first_at(raster, point)
    }

    fn availability(
        &self,
        images: &[Arc<SourceImage>],
        point: GeoPoint,
    ) -> ProviderResult<Option<f64>> {
        self.inner.availability(images, point)
    }

    fn series_at(
        &self,
        images: &[Arc<SourceImage>],
        point: GeoPoint,
    ) -> ProviderResult<Vec<SeriesPoint>> {
        self.inner.series_at(images, point)
    }

    fn region_mean(&self, raster: &Raster, region: &Boundary) -> ProviderResult<Option<f32>> {
        self.inner.region_mean(raster, region)
    }
}
