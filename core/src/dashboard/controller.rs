use crate::dashboard::chart::ChartSeries;
use crate::dashboard::export_gate::ExportGate;
use crate::dashboard::inspector::{ApplyOutcome, Inspection, InspectionRequest, InspectionResponse, PointInspector};
use crate::dashboard::selection::{SelectionState, YearInput};
use crate::dashboard::view::{
    BoundaryLayer, DashboardView, ExportView, InspectionView, MapLayers, MarkerLayer, RasterLayer,
    EXPORT_LABEL, INSPECT_PROMPT,
};
use crate::geo::{Boundary, GeoPoint};
use crate::imagery::{ExportReceipt, ImageSeries};
use crate::prelude::{DashboardConfig, DashboardResult, ImageryProvider};
use crate::processing::{AnnualCompositeBuilder, CompositeSet, SeriesPoint};
use crate::telemetry::{LogManager, Metrics, MetricsRecorder};
use std::sync::Arc;

/// Owns every piece of mutable dashboard state.
///
/// Methods taking `&mut self` are the only writers; the event loop is their
/// only caller outside tests and offline runs.
pub struct Dashboard {
    config: DashboardConfig,
    provider: Arc<dyn ImageryProvider>,
    boundary: Arc<Boundary>,
    series: ImageSeries,
    composites: CompositeSet,
    selection: SelectionState,
    inspector: PointInspector,
    gate: ExportGate,
    annual_chart: ChartSeries,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl Dashboard {
    /// Resolves the boundary, loads the archive and builds every composite.
    pub fn load(config: DashboardConfig, provider: Arc<dyn ImageryProvider>) -> DashboardResult<Self> {
        config.validate()?;
        let logger = LogManager::scoped("dashboard");

        let boundary = Arc::new(provider.features(&config.boundary_query())?);
        let series = provider.collection(&config.collection_query()?)?;
        logger.record(&format!(
            "{}: {} source images in {}..={}",
            boundary.name,
            series.len(),
            config.start_year,
            config.end_year
        ));

        let composites = AnnualCompositeBuilder::new(config.years(), boundary.clone())
            .build(provider.as_ref(), &series)?;
        let selection = SelectionState::initial(&composites, config.start_year)?;

        let annual_points = composites
            .iter()
            .map(|composite| {
                let value = provider
                    .region_mean(&composite.image, &boundary)
                    .unwrap_or_else(|err| {
                        logger.warn(&format!("{} region mean: {err}", composite.year));
                        None
                    });
                SeriesPoint {
                    date: composite.timestamp,
                    value,
                }
            })
            .collect();
        let annual_chart = ChartSeries::annual_mean(
            config.start_year,
            config.end_year,
            config.chart_scale,
            annual_points,
        );

        Ok(Self {
            gate: ExportGate::new(config.export_availability_threshold),
            config,
            provider,
            boundary,
            series,
            composites,
            selection,
            inspector: PointInspector::new(),
            annual_chart,
            metrics: MetricsRecorder::new(),
            logger,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn provider(&self) -> Arc<dyn ImageryProvider> {
        self.provider.clone()
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn composites(&self) -> &CompositeSet {
        &self.composites
    }

    pub fn selected_year(&self) -> i32 {
        self.selection.year()
    }

    pub fn inspection(&self) -> Option<&Inspection> {
        self.inspector.current()
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.snapshot()
    }

    pub fn export_enabled(&self) -> bool {
        self.gate.is_enabled(self.inspector.current())
    }

    /// Switches the displayed composite; export stays disabled until the next click.
    pub fn select_year(&mut self, input: impl Into<YearInput>) -> DashboardResult<i32> {
        let year = self.selection.select(&self.composites, &input.into())?;
        self.inspector.invalidate();
        self.gate.reset();
        self.logger.record(&format!("selected {year}"));
        Ok(year)
    }

    /// Returns the three provider requests for a click; feed their responses to `apply`.
    pub fn inspect(&mut self, point: GeoPoint) -> Vec<InspectionRequest> {
        self.metrics.record_inspection();
        self.inspector.begin(point, &self.selection, &self.series)
    }

    pub fn apply(&mut self, response: InspectionResponse) {
        match self.inspector.apply(response) {
            ApplyOutcome::Applied => self.metrics.record_applied(),
            ApplyOutcome::Degraded => {
                self.metrics.record_applied();
                self.metrics.record_failure();
            }
            ApplyOutcome::Stale => self.metrics.record_stale(),
        }
    }

    /// Runs a click's requests in place, in issue order.
    pub fn inspect_blocking(&mut self, point: GeoPoint) {
        let provider = self.provider.clone();
        for request in self.inspect(point) {
            self.apply(request.execute(provider.as_ref()));
        }
    }

    /// `Ok(None)` while export is disabled.
    pub fn export(&mut self) -> DashboardResult<Option<ExportReceipt>> {
        if !self.export_enabled() {
            self.logger.trace("export requested while disabled");
            return Ok(None);
        }
        let task = ExportGate::task(&self.config, &self.selection, &self.boundary);
        let receipt = self.gate.submit(self.provider.as_ref(), task)?;
        self.metrics.record_export();
        Ok(Some(receipt))
    }

    pub fn view(&self) -> DashboardView {
        let composite = self.selection.composite();
        let inspection = self.inspector.current();

        let inspection_view = InspectionView {
            prompt: INSPECT_PROMPT.into(),
            value: inspection.map(Inspection::value_label).unwrap_or_default(),
            class: inspection.map(Inspection::class_label).unwrap_or_default(),
            availability: inspection
                .map(Inspection::availability_label)
                .unwrap_or_default(),
        };

        let marker = inspection.map(|inspection| MarkerLayer {
            point: inspection.point,
            color: inspection.marker_color(),
        });

        let point_chart = inspection.and_then(|inspection| {
            inspection
                .series
                .ready()
                .map(|points| ChartSeries::point_series(inspection.year, points.clone()))
        });

        let pending_requests = inspection
            .filter(|inspection| inspection.token == self.inspector.latest())
            .map(Inspection::pending)
            .unwrap_or(0);

        DashboardView {
            title: format!("{} Annual NDVI Dashboard", self.config.country),
            years: self.composites.years().map(|year| year.to_string()).collect(),
            selected_year: self.selection.year(),
            layers: MapLayers {
                ndvi: RasterLayer::ndvi(
                    composite.year,
                    *composite.image.grid(),
                    composite.image.to_cells(),
                ),
                boundary: BoundaryLayer {
                    name: format!("{} Boundary", self.boundary.name),
                    rings: self.boundary.rings.clone(),
                },
                marker,
            },
            inspection: inspection_view,
            export: ExportView {
                label: EXPORT_LABEL.into(),
                enabled: self.export_enabled(),
                status: self.gate.status().to_string(),
            },
            point_chart,
            annual_chart: self.annual_chart.clone(),
            pending_requests,
        }
    }
}
