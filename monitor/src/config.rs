use anyhow::Context;
use orbitcore::session::{SessionConfig, SessionParameters};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Live stream endpoint.
    pub endpoint: String,
    /// Catalog of previously known objects: a file path or an http(s) URL.
    pub catalog: Option<String>,
    pub session: SessionParameters,
    pub display: SessionConfig,
    /// Enter live mode immediately instead of waiting for `start`.
    pub autostart: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:9000/stream".into(),
            catalog: Some("http://127.0.0.1:9000/catalog".into()),
            session: SessionParameters::default(),
            display: SessionConfig::default(),
            autostart: true,
        }
    }
}

impl MonitorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading monitor config {}", path_ref.display()))?;
        let config: MonitorConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing monitor config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn catalog_is_remote(&self) -> bool {
        self.catalog
            .as_deref()
            .is_some_and(|source| source.starts_with("http://") || source.starts_with("https://"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitcore::catalog::{AltitudeBin, ObjectKind};
    use orbitcore::geometry::DisplayUnit;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_point_at_local_feed() {
        let cfg = MonitorConfig::default();
        assert!(cfg.endpoint.ends_with("/stream"));
        assert!(cfg.catalog_is_remote());
        assert_eq!(cfg.display.capacity, 5_000);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"endpoint: http://feed:9000/stream
catalog: data/catalog.json
session:
  collision_threshold: 2
  length_secs: 600
  step_secs: 30
display:
  capacity: 250
  display_unit: kilometers
  criteria:
    kinds: [active]
    origins: [US, China, Other]
    altitude_bins: [\"400-800\", \"2000+\"]
",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = MonitorConfig::load(&path).unwrap();

        assert!(!cfg.catalog_is_remote());
        assert_eq!(cfg.session.step_count(), 20);
        assert_eq!(cfg.display.capacity, 250);
        assert_eq!(cfg.display.display_unit, DisplayUnit::Kilometers);
        assert!(cfg.display.criteria.kinds.contains(&ObjectKind::Active));
        assert!(!cfg.display.criteria.kinds.contains(&ObjectKind::Junk));
        assert!(cfg
            .display
            .criteria
            .altitude_bins
            .contains(&AltitudeBin::Above2000));
        assert!(cfg.autostart);
    }

    #[test]
    fn invalid_session_parameters_fail_to_load() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"session:\n  collision_threshold: 0\n  length_secs: 10\n  step_secs: 60\n")
            .unwrap();
        let path = temp.into_temp_path();
        assert!(MonitorConfig::load(&path).is_err());
    }
}
