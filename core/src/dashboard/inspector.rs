use crate::dashboard::classify::{MarkerColor, NdviClass};
use crate::dashboard::selection::SelectionState;
use crate::geo::GeoPoint;
use crate::imagery::{ImageSeries, Raster, SourceImage};
use crate::prelude::{ImageryProvider, ProviderResult};
use crate::processing::SeriesPoint;
use crate::telemetry::LogManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const NO_DATA_LABEL: &str = "No NDVI data at this location";

/// Identifies the inspection a request belongs to; only the latest applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct RequestToken(pub u64);

/// Result slot for one asynchronous branch of an inspection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Probe<T> {
    #[default]
    Pending,
    Missing,
    Ready(T),
}

impl<T> Probe<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Probe::Pending)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Probe::Missing)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Probe::Ready(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum RequestKind {
    PointValue { composite: Arc<Raster> },
    Availability { images: Vec<Arc<SourceImage>> },
    TimeSeries { images: Vec<Arc<SourceImage>> },
}

/// One provider round trip issued by a click.
#[derive(Debug, Clone)]
pub struct InspectionRequest {
    pub token: RequestToken,
    pub year: i32,
    pub point: GeoPoint,
    pub kind: RequestKind,
}

impl InspectionRequest {
    /// Blocking; run off the event loop.
    pub fn execute(self, provider: &dyn ImageryProvider) -> InspectionResponse {
        let outcome = match &self.kind {
            RequestKind::PointValue { composite } => {
                ResponseOutcome::PointValue(provider.first_at(composite, self.point))
            }
            RequestKind::Availability { images } => {
                ResponseOutcome::Availability(provider.availability(images, self.point))
            }
            RequestKind::TimeSeries { images } => {
                ResponseOutcome::TimeSeries(provider.series_at(images, self.point))
            }
        };
        InspectionResponse {
            token: self.token,
            outcome,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ResponseOutcome {
    PointValue(ProviderResult<Option<f32>>),
    Availability(ProviderResult<Option<f64>>),
    TimeSeries(ProviderResult<Vec<SeriesPoint>>),
}

#[derive(Debug, Clone)]
pub struct InspectionResponse {
    pub token: RequestToken,
    pub outcome: ResponseOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Applied as missing after a provider failure.
    Degraded,
    Stale,
}

/// State of the most recent click.
///
/// A missing point value latches export off for this inspection no matter
/// when the availability response lands.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub token: RequestToken,
    pub year: i32,
    pub point: GeoPoint,
    pub value: Probe<f32>,
    pub availability: Probe<f64>,
    pub series: Probe<Vec<SeriesPoint>>,
    superseded: bool,
}

impl Inspection {
    pub fn class(&self) -> Option<NdviClass> {
        self.value.ready().map(|v| NdviClass::classify(*v))
    }

    pub fn marker_color(&self) -> MarkerColor {
        self.class().map(NdviClass::color).unwrap_or_default()
    }

    pub fn pending(&self) -> usize {
        [
            self.value.is_pending(),
            self.availability.is_pending(),
            self.series.is_pending(),
        ]
        .into_iter()
        .filter(|pending| *pending)
        .count()
    }

    /// Superseded inspections belong to a previous year selection.
    pub fn is_superseded(&self) -> bool {
        self.superseded
    }

    pub fn export_ready(&self, threshold: f64) -> bool {
        !self.superseded
            && !self.value.is_missing()
            && self.availability.ready().is_some_and(|pct| *pct >= threshold)
    }

    pub fn value_label(&self) -> String {
        match &self.value {
            Probe::Pending => String::new(),
            Probe::Missing => NO_DATA_LABEL.to_string(),
            Probe::Ready(v) => format!(
                "NDVI: {:.3} | Lon: {:.4}, Lat: {:.4}",
                v, self.point.lon, self.point.lat
            ),
        }
    }

    pub fn class_label(&self) -> String {
        self.class()
            .map(|class| format!("Class: {}", class.label()))
            .unwrap_or_default()
    }

    pub fn availability_label(&self) -> String {
        if self.value.is_missing() {
            return String::new();
        }
        match &self.availability {
            Probe::Pending => String::new(),
            Probe::Missing => "Pixel availability: 0.0%".to_string(),
            Probe::Ready(pct) => format!("Pixel availability: {:.1}%", pct),
        }
    }
}

pub struct PointInspector {
    latest: RequestToken,
    current: Option<Inspection>,
    logger: LogManager,
}

impl PointInspector {
    pub fn new() -> Self {
        Self {
            latest: RequestToken::default(),
            current: None,
            logger: LogManager::scoped("inspector"),
        }
    }

    pub fn latest(&self) -> RequestToken {
        self.latest
    }

    pub fn current(&self) -> Option<&Inspection> {
        self.current.as_ref()
    }

    fn advance(&mut self) -> RequestToken {
        self.latest = RequestToken(self.latest.0 + 1);
        self.latest
    }

    /// Starts a new inspection against the selection as it is now.
    pub fn begin(
        &mut self,
        point: GeoPoint,
        selection: &SelectionState,
        series: &ImageSeries,
    ) -> Vec<InspectionRequest> {
        let token = self.advance();
        let year = selection.year();
        let images = series.filter_year(year).images().to_vec();
        self.logger.record(&format!(
            "inspect #{} at ({:.4}, {:.4}) for {} over {} images",
            token.0,
            point.lon,
            point.lat,
            year,
            images.len()
        ));

        self.current = Some(Inspection {
            token,
            year,
            point,
            value: Probe::Pending,
            availability: Probe::Pending,
            series: Probe::Pending,
            superseded: false,
        });

        let request = |kind| InspectionRequest {
            token,
            year,
            point,
            kind,
        };
        vec![
            request(RequestKind::PointValue {
                composite: selection.composite().image.clone(),
            }),
            request(RequestKind::Availability {
                images: images.clone(),
            }),
            request(RequestKind::TimeSeries { images }),
        ]
    }

    /// Drops in-flight responses and disqualifies the current inspection from export.
    pub fn invalidate(&mut self) {
        self.advance();
        if let Some(inspection) = self.current.as_mut() {
            inspection.superseded = true;
        }
    }

    pub fn apply(&mut self, response: InspectionResponse) -> ApplyOutcome {
        let inspection = match self.current.as_mut() {
            Some(inspection)
                if response.token == self.latest && inspection.token == response.token =>
            {
                inspection
            }
            _ => {
                self.logger.trace(&format!(
                    "dropping stale response #{} (latest #{})",
                    response.token.0, self.latest.0
                ));
                return ApplyOutcome::Stale;
            }
        };

        let mut degraded = false;
        let mut settle = |err: &dyn std::fmt::Display, branch: &str| {
            self.logger
                .warn(&format!("{branch} request #{} failed: {err}", response.token.0));
            degraded = true;
        };

        match response.outcome {
            ResponseOutcome::PointValue(result) => {
                inspection.value = match result {
                    Ok(Some(v)) if v.is_finite() => Probe::Ready(v),
                    Ok(_) => Probe::Missing,
                    Err(err) => {
                        settle(&err, "point value");
                        Probe::Missing
                    }
                };
            }
            ResponseOutcome::Availability(result) => {
                inspection.availability = match result {
                    Ok(Some(pct)) if pct.is_finite() => Probe::Ready(pct),
                    Ok(_) => Probe::Missing,
                    Err(err) => {
                        settle(&err, "availability");
                        Probe::Missing
                    }
                };
            }
            ResponseOutcome::TimeSeries(result) => {
                inspection.series = match result {
                    Ok(points) => Probe::Ready(points),
                    Err(err) => {
                        settle(&err, "time series");
                        Probe::Missing
                    }
                };
            }
        }

        if degraded {
            ApplyOutcome::Degraded
        } else {
            ApplyOutcome::Applied
        }
    }
}

impl Default for PointInspector {
    fn default() -> Self {
        Self::new()
    }
}
