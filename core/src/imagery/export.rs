use crate::geo::Boundary;
use crate::imagery::raster::Raster;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Export-to-storage request handed to the imagery provider.
#[derive(Debug, Clone)]
pub struct ExportTask {
    pub image: Arc<Raster>,
    pub year: i32,
    pub description: String,
    pub folder: String,
    pub file_name_prefix: String,
    pub region: Arc<Boundary>,
    pub scale: f64,
    pub max_pixels: u64,
}

impl ExportTask {
    /// Task parameters without the pixel payload.
    pub fn manifest(&self) -> Value {
        let grid = self.image.grid();
        json!({
            "description": self.description,
            "folder": self.folder,
            "fileNamePrefix": self.file_name_prefix,
            "year": self.year,
            "region": {
                "name": self.region.name,
                "bbox": self.region.bounding_box(),
            },
            "scale": self.scale,
            "maxPixels": self.max_pixels,
            "grid": grid,
        })
    }
}

/// Acknowledgement that a task was queued; says nothing about its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReceipt {
    pub task_id: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagery::raster::tests::grid;

    #[test]
    fn manifest_carries_task_parameters() {
        let task = ExportTask {
            image: Arc::new(Raster::empty(grid(2, 3))),
            year: 2019,
            description: "Bangladesh_Annual_NDVI_2019".into(),
            folder: "GEE_NDVI_Exports".into(),
            file_name_prefix: "NDVI_Bangladesh_2019".into(),
            region: Arc::new(Boundary::new("Bangladesh", Vec::new())),
            scale: 30.0,
            max_pixels: 10_000_000_000_000,
        };
        let manifest = task.manifest();
        assert_eq!(manifest["fileNamePrefix"], "NDVI_Bangladesh_2019");
        assert_eq!(manifest["maxPixels"], 10_000_000_000_000u64);
        assert_eq!(manifest["grid"]["cols"], 3);
        assert!(manifest["region"]["bbox"].is_null());
    }
}
