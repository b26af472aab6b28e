//! TOML file plus env-var-override configuration, following
//! `packages/boat-sim`'s `RadioConfig: Deserialize` + `toml` pattern and
//! `uwb_hub.rs`'s `UwbHubConfig::default()` env-var idiom.

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct TargetCircleConfig {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub radius_deg: f64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FileConfig {
    pub socket_path: Option<String>,
    pub tick_period_ms: Option<u64>,
    pub plan: Option<Vec<TargetCircleConfig>>,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Unix-domain socket of the line bus to connect to.
    pub socket_path: PathBuf,
    /// Control tick period. 100ms per spec; overridable for tests only.
    pub tick_period_ms: u64,
    /// Nested target-circle plan, outermost (largest) circle first,
    /// destination circle last. Empty means no plan: Skipper falls back to
    /// the constant 225 deg bearing per the error taxonomy.
    pub plan: Vec<TargetCircleConfig>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        DaemonConfig {
            socket_path: PathBuf::from("/tmp/helmsman.sock"),
            tick_period_ms: 100,
            plan: Vec::new(),
        }
    }
}

impl DaemonConfig {
    /// Loads `path` (if given) as TOML, then applies env var overrides:
    /// `HELMSMAN_SOCKET_PATH`, `HELMSMAN_TICK_PERIOD_MS`.
    pub fn load(path: Option<&std::path::Path>) -> anyhow::Result<Self> {
        let file: FileConfig = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p)
                    .map_err(|e| anyhow::anyhow!("reading config {}: {e}", p.display()))?;
                toml::from_str(&text).map_err(|e| anyhow::anyhow!("parsing config {}: {e}", p.display()))?
            }
            None => FileConfig::default(),
        };

        let mut cfg = DaemonConfig::default();
        if let Some(s) = file.socket_path {
            cfg.socket_path = PathBuf::from(s);
        }
        if let Some(t) = file.tick_period_ms {
            cfg.tick_period_ms = t;
        }
        if let Some(plan) = file.plan {
            cfg.plan = plan;
        }

        if let Some(s) = std::env::var("HELMSMAN_SOCKET_PATH").ok() {
            cfg.socket_path = PathBuf::from(s);
        }
        if let Some(t) = std::env::var("HELMSMAN_TICK_PERIOD_MS").ok().and_then(|v| v.parse().ok()) {
            cfg.tick_period_ms = t;
        }

        Ok(cfg)
    }

    pub fn build_cascade(&self) -> Option<sailcore::TargetCircleCascade> {
        if self.plan.is_empty() {
            return None;
        }
        let circles = self
            .plan
            .iter()
            .map(|c| sailcore::TargetCircle::new(sailcore::LatLon::new(c.lat_deg, c.lon_deg), c.radius_deg))
            .collect();
        Some(sailcore::TargetCircleCascade::new(circles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_plan() {
        let cfg = DaemonConfig::default();
        assert!(cfg.build_cascade().is_none());
    }

    #[test]
    fn loads_plan_from_toml() {
        let toml_text = r#"
            socket_path = "/tmp/test.sock"
            tick_period_ms = 50

            [[plan]]
            lat_deg = 47.0
            lon_deg = 8.0
            radius_deg = 0.01
        "#;
        let dir = std::env::temp_dir().join(format!("helmsman-cfg-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, toml_text).unwrap();

        let cfg = DaemonConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.tick_period_ms, 50);
        assert!(cfg.build_cascade().is_some());

        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_dir(&dir);
    }
}
