pub mod chart;
pub mod classify;
pub mod controller;
pub mod event_loop;
pub mod export_gate;
pub mod inspector;
pub mod palette;
pub mod selection;
pub mod view;

pub use chart::ChartSeries;
pub use classify::{MarkerColor, NdviClass};
pub use controller::Dashboard;
pub use event_loop::{DashboardHandle, DashboardLoop};
pub use export_gate::{ExportGate, EXPORT_CONFIRMATION};
pub use inspector::{Inspection, InspectionRequest, InspectionResponse, PointInspector, Probe, RequestToken};
pub use palette::Palette;
pub use selection::{SelectionState, YearInput};
pub use view::DashboardView;
