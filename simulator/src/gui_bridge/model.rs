use ndvicore::dashboard::YearInput;
use ndvicore::geo::GeoPoint;
use ndvicore::DashboardView;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearRequest {
    pub year: YearInput,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InspectRequest {
    pub lon: f64,
    pub lat: f64,
}

impl InspectRequest {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lon, self.lat)
    }
}

/// Body of every bridge response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeReply {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<u64>,
    pub view: DashboardView,
}

impl BridgeReply {
    pub fn ok(view: DashboardView) -> Self {
        Self {
            status: "ok".into(),
            message: None,
            task_id: None,
            token: None,
            view,
        }
    }

    pub fn error(message: impl Into<String>, view: DashboardView) -> Self {
        Self {
            status: "error".into(),
            message: Some(message.into()),
            task_id: None,
            token: None,
            view,
        }
    }
}
