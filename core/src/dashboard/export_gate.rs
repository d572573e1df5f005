use crate::dashboard::inspector::Inspection;
use crate::dashboard::selection::SelectionState;
use crate::geo::Boundary;
use crate::imagery::{ExportReceipt, ExportTask};
use crate::prelude::{DashboardConfig, DashboardResult, ImageryProvider};
use crate::telemetry::LogManager;
use std::sync::Arc;

pub const EXPORT_CONFIRMATION: &str = "✅ Export created. Check Tasks tab.";

/// Enables export from the latest inspection and submits export tasks.
pub struct ExportGate {
    threshold: f64,
    status: String,
    logger: LogManager,
}

impl ExportGate {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            status: String::new(),
            logger: LogManager::scoped("export"),
        }
    }

    pub fn is_enabled(&self, inspection: Option<&Inspection>) -> bool {
        inspection.is_some_and(|inspection| inspection.export_ready(self.threshold))
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn reset(&mut self) {
        self.status.clear();
    }

    pub fn task(
        config: &DashboardConfig,
        selection: &SelectionState,
        region: &Arc<Boundary>,
    ) -> ExportTask {
        let year = selection.year();
        ExportTask {
            image: selection.composite().image.clone(),
            year,
            description: config.export_description(year),
            folder: config.export_folder.clone(),
            file_name_prefix: config.export_file_prefix(year),
            region: region.clone(),
            scale: config.export_scale,
            max_pixels: config.export_max_pixels,
        }
    }

    /// Fire and forget: the receipt only confirms the task was queued.
    pub fn submit(
        &mut self,
        provider: &dyn ImageryProvider,
        task: ExportTask,
    ) -> DashboardResult<ExportReceipt> {
        let description = task.description.clone();
        match provider.submit_export(task) {
            Ok(receipt) => {
                self.logger
                    .record(&format!("submitted {} ({})", description, receipt.task_id));
                self.status = EXPORT_CONFIRMATION.to_string();
                Ok(receipt)
            }
            Err(err) => {
                self.logger.warn(&format!("{description}: {err}"));
                self.status = format!("Export failed: {err}");
                Err(err.into())
            }
        }
    }
}
