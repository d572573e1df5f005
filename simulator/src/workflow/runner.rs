use crate::export::DriveProvider;
use crate::generator::profile::build_archive;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use ndvicore::dashboard::MarkerColor;
use ndvicore::geo::GeoPoint;
use ndvicore::telemetry::Metrics;
use ndvicore::{Dashboard, DashboardHandle, ImageryProvider};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickReport {
    pub point: GeoPoint,
    pub value: String,
    pub class: String,
    pub availability: String,
    pub marker: Option<MarkerColor>,
    pub export_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub title: String,
    pub year: i32,
    pub clicks: Vec<ClickReport>,
    pub export_task: Option<String>,
    pub export_status: String,
    /// Filled in once the loop has stopped.
    pub metrics: Option<Metrics>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Generates the archive and loads the dashboard on top of a drive writer.
    pub fn build_dashboard(&self) -> anyhow::Result<(Dashboard, Arc<DriveProvider>)> {
        let archive = build_archive(&self.config.archive, &self.config.dashboard)
            .context("generating NDVI archive")?;
        let drive = Arc::new(DriveProvider::spawn(
            Arc::new(archive),
            self.config.drive_root.clone(),
        ));
        let provider: Arc<dyn ImageryProvider> = drive.clone();
        let dashboard = Dashboard::load(self.config.dashboard.clone(), provider)
            .context("loading dashboard")?;
        Ok((dashboard, drive))
    }

    /// Replays the scripted session against a running loop.
    pub async fn run_session(&self, handle: &DashboardHandle) -> anyhow::Result<SessionReport> {
        let session = &self.config.session;
        if let Some(year) = session.year.clone() {
            handle
                .select_year(year.clone())
                .await
                .with_context(|| format!("selecting year {year}"))?;
        }

        let mut clicks = Vec::with_capacity(session.clicks.len());
        for point in &session.clicks {
            handle.inspect(*point).await.context("dispatching inspection")?;
            let view = handle.wait_settled().await.context("awaiting inspection")?;
            clicks.push(ClickReport {
                point: *point,
                value: view.inspection.value,
                class: view.inspection.class,
                availability: view.inspection.availability,
                marker: view.layers.marker.map(|marker| marker.color),
                export_enabled: view.export.enabled,
            });
        }

        let export_task = if session.export {
            handle
                .export()
                .await
                .context("submitting export")?
                .map(|receipt| receipt.task_id)
        } else {
            None
        };

        let view = handle.view();
        Ok(SessionReport {
            title: view.title,
            year: view.selected_year,
            clicks,
            export_task,
            export_status: view.export.status,
            metrics: None,
        })
    }

    pub fn append_report(&self, report: &SessionReport) -> anyhow::Result<()> {
        let report_path = &self.config.report_path;
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut line = serde_json::to_string(report).context("serialising session report")?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)
            .with_context(|| format!("opening {}", report_path.display()))?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::SessionScript;
    use ndvicore::dashboard::EXPORT_CONFIRMATION;
    use ndvicore::DashboardLoop;

    fn config(root: &std::path::Path) -> WorkflowConfig {
        let mut cfg = WorkflowConfig::default();
        cfg.archive.cell_size = 0.25;
        cfg.archive.images_per_year = 4;
        cfg.archive.cloud_fraction = 0.0;
        cfg.dashboard.start_year = 2019;
        cfg.dashboard.end_year = 2021;
        cfg.drive_root = root.join("drive");
        cfg.report_path = root.join("session.log");
        cfg.session = SessionScript {
            year: Some("2020".into()),
            clicks: vec![GeoPoint::new(87.5, 23.0), GeoPoint::new(90.41, 23.81)],
            export: true,
        };
        cfg
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn runner_replays_scripted_session() {
        let root = tempfile::tempdir().unwrap();
        let runner = Runner::new(config(root.path()));
        let (dashboard, drive) = runner.build_dashboard().unwrap();
        let (event_loop, handle) = DashboardLoop::new(dashboard);
        let task = tokio::spawn(event_loop.run());

        let report = runner.run_session(&handle).await.unwrap();
        assert_eq!(report.year, 2020);
        assert_eq!(report.title, "Bangladesh Annual NDVI Dashboard");
        assert_eq!(report.clicks[0].value, "No NDVI data at this location");
        assert!(!report.clicks[0].export_enabled);
        assert!(report.clicks[1].value.starts_with("NDVI: "));
        assert!(report.clicks[1].export_enabled);
        assert_eq!(report.export_task.as_deref(), Some("DRIVE-0001"));
        assert_eq!(report.export_status, EXPORT_CONFIRMATION);

        drop(handle);
        let dashboard = task.await.unwrap();
        assert_eq!(dashboard.metrics().inspections, 2);
        assert_eq!(dashboard.metrics().exports, 1);
        assert_eq!(drive.finish(), 1);
        assert!(root
            .path()
            .join("drive/GEE_NDVI_Exports/NDVI_Bangladesh_2020.json")
            .exists());

        runner.append_report(&report).unwrap();
        runner.append_report(&report).unwrap();
        let log = fs::read_to_string(root.path().join("session.log")).unwrap();
        assert_eq!(log.lines().count(), 2);
    }
}
