//! Core state machine and imagery contract for the annual NDVI dashboard.
//!
//! The modules split the dashboard into an external imagery boundary
//! (`prelude::ImageryProvider`), local raster reductions, and the controller
//! that ties year selection, point inspection and export gating together.

pub mod dashboard;
pub mod geo;
pub mod imagery;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use dashboard::{Dashboard, DashboardHandle, DashboardLoop, DashboardView};
pub use prelude::{DashboardConfig, DashboardError, DashboardResult, ImageryProvider};
