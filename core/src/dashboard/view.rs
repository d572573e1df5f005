use crate::dashboard::chart::ChartSeries;
use crate::dashboard::classify::MarkerColor;
use crate::dashboard::palette::NDVI_PALETTE;
use crate::geo::GeoPoint;
use crate::imagery::GridSpec;
use serde::{Deserialize, Serialize};

pub const INSPECT_PROMPT: &str = "Click on the map to inspect NDVI";
pub const EXPORT_LABEL: &str = "Export Annual NDVI";

/// Everything a presentation layer needs to draw the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub title: String,
    pub years: Vec<String>,
    pub selected_year: i32,
    pub layers: MapLayers,
    pub inspection: InspectionView,
    pub export: ExportView,
    pub point_chart: Option<ChartSeries>,
    pub annual_chart: ChartSeries,
    /// Outstanding responses for the latest inspection.
    pub pending_requests: usize,
}

/// Map layers in draw order: NDVI, boundary, marker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapLayers {
    pub ndvi: RasterLayer,
    pub boundary: BoundaryLayer,
    pub marker: Option<MarkerLayer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RasterLayer {
    pub name: String,
    pub year: i32,
    pub grid: GridSpec,
    /// Row-major, `grid.rows * grid.cols` long.
    pub cells: Vec<Option<f32>>,
    pub min: f32,
    pub max: f32,
    pub palette: Vec<String>,
}

impl RasterLayer {
    pub fn ndvi(year: i32, grid: GridSpec, cells: Vec<Option<f32>>) -> Self {
        Self {
            name: "Annual NDVI".into(),
            year,
            grid,
            cells,
            min: 0.0,
            max: 1.0,
            palette: NDVI_PALETTE.iter().map(|hex| hex.to_string()).collect(),
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.grid.rows || col >= self.grid.cols {
            return None;
        }
        self.cells.get(row * self.grid.cols + col).copied().flatten()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryLayer {
    pub name: String,
    pub rings: Vec<Vec<GeoPoint>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerLayer {
    pub point: GeoPoint,
    pub color: MarkerColor,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InspectionView {
    pub prompt: String,
    pub value: String,
    pub class: String,
    pub availability: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportView {
    pub label: String,
    pub enabled: bool,
    pub status: String,
}
