use crate::generator::profile::ArchiveProfile;
use anyhow::{bail, Context};
use ndvicore::geo::GeoPoint;
use ndvicore::DashboardConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Scripted interaction replayed by the offline run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionScript {
    pub year: Option<String>,
    pub clicks: Vec<GeoPoint>,
    pub export: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub dashboard: DashboardConfig,
    pub archive: ArchiveProfile,
    pub drive_root: PathBuf,
    pub bind: SocketAddr,
    pub session: SessionScript,
    pub report_path: PathBuf,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            dashboard: DashboardConfig::default(),
            archive: ArchiveProfile::default(),
            drive_root: PathBuf::from("tools/data/drive"),
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
            session: SessionScript::default(),
            report_path: PathBuf::from("tools/data/offline_session.log"),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config
            .dashboard
            .validate()
            .with_context(|| format!("validating workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Command-line flags win over whatever the YAML file set.
    pub fn apply_overrides(
        &mut self,
        year: Option<String>,
        clicks: &[String],
        export: bool,
        seed: Option<u64>,
    ) -> anyhow::Result<()> {
        if year.is_some() {
            self.session.year = year;
        }
        if !clicks.is_empty() {
            self.session.clicks = clicks
                .iter()
                .map(|raw| parse_click(raw))
                .collect::<anyhow::Result<_>>()?;
        }
        if export {
            self.session.export = true;
        }
        if let Some(seed) = seed {
            self.archive.seed = seed;
        }
        Ok(())
    }
}

/// Parses `lon,lat`.
pub fn parse_click(raw: &str) -> anyhow::Result<GeoPoint> {
    let Some((lon, lat)) = raw.split_once(',') else {
        bail!("click `{raw}` is not in lon,lat form");
    };
    let lon: f64 = lon
        .trim()
        .parse()
        .with_context(|| format!("parsing longitude in `{raw}`"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .with_context(|| format!("parsing latitude in `{raw}`"))?;
    let point = GeoPoint::new(lon, lat);
    if !point.is_finite() {
        bail!("click `{raw}` has a non-finite coordinate");
    }
    Ok(point)
}
