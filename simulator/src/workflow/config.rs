use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub bind: SocketAddr,
    pub object_count: usize,
    pub seed: u64,
    /// Share of the population classified as debris or rocket bodies.
    pub junk_fraction: f64,
    /// Delay between streamed frames.
    pub tick_millis: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
            object_count: 20_000,
            seed: 0,
            junk_fraction: 0.7,
            tick_millis: 250,
        }
    }
}

impl FeedConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading feed config {}", path_ref.display()))?;
        let config: FeedConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing feed config {}", path_ref.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_args(object_count: usize, seed: u64, tick_millis: u64) -> Self {
        Self {
            object_count,
            seed,
            tick_millis,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.junk_fraction),
            "junk_fraction must lie in [0, 1], got {}",
            self.junk_fraction
        );
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_keeps_defaults() {
        let cfg = FeedConfig::from_args(500, 9, 0);
        assert_eq!(cfg.object_count, 500);
        assert_eq!(cfg.tick(), Duration::ZERO);
        assert_eq!(cfg.bind.port(), 9000);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"object_count: 1200\nseed: 42\nbind: 0.0.0.0:9100\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = FeedConfig::load(&path).unwrap();
        assert_eq!(cfg.object_count, 1200);
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.bind.port(), 9100);
        assert_eq!(cfg.tick_millis, 250);
    }

    #[test]
    fn config_load_rejects_bad_fraction() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"junk_fraction: 1.5\n").unwrap();
        let path = temp.into_temp_path();
        assert!(FeedConfig::load(&path).is_err());
    }
}
