use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub photos_dir: String,
    pub output: String,
    pub jpeg_quality: u8,
    pub viewer: ViewerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub eager_count: usize,
    pub lazy_margin_px: u32,
    pub swipe_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            photos_dir: "photos".into(),
            output: "gallery.json".into(),
            jpeg_quality: 92,
            viewer: ViewerConfig::default(),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            eager_count: 6,
            lazy_margin_px: 50,
            swipe_threshold: 50.0,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", display(path), e))?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| format!("failed to parse config {}: {}", display(path), e))?;
        config.normalize();
        Ok(config)
    }

    pub fn normalize(&mut self) {
        if self.photos_dir.trim().is_empty() {
            self.photos_dir = "photos".into();
        }
        if self.output.trim().is_empty() {
            self.output = "gallery.json".into();
        }
        self.jpeg_quality = self.jpeg_quality.clamp(10, 100);
        self.viewer.normalize();
    }
}

impl ViewerConfig {
    fn normalize(&mut self) {
        if !self.swipe_threshold.is_finite() || self.swipe_threshold <= 0.0 {
            self.swipe_threshold = 50.0;
        }
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

pub fn default_config_path(root: &Path) -> PathBuf {
    root.join("gallery.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_viewer_contract() {
        let config = Config::default();
        assert_eq!(config.photos_dir, "photos");
        assert_eq!(config.output, "gallery.json");
        assert_eq!(config.jpeg_quality, 92);
        assert_eq!(config.viewer.eager_count, 6);
        assert_eq!(config.viewer.lazy_margin_px, 50);
        assert_eq!(config.viewer.swipe_threshold, 50.0);
    }

    #[test]
    fn normalize_clamps_quality_and_threshold() {
        let mut config = Config {
            jpeg_quality: 3,
            ..Config::default()
        };
        config.viewer.swipe_threshold = -1.0;
        config.normalize();
        assert_eq!(config.jpeg_quality, 10);
        assert_eq!(config.viewer.swipe_threshold, 50.0);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str("photos_dir = \"shots\"").unwrap();
        assert_eq!(config.photos_dir, "shots");
        assert_eq!(config.output, "gallery.json");
        assert_eq!(config.viewer.eager_count, 6);
    }
}
