// Pipeline configuration.
//
// Every tunable constant of the smoother, classifier, tessellator and history
// lives here with its default. A TOML file may override any subset of them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Tool;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub smoothing: SmoothingConfig,
    pub gesture: GestureConfig,
    pub stroke: StrokeConfig,
    pub history: HistoryConfig,
    pub canvas: CanvasConfig,
}

/// Velocity-adaptive blend weights for [`crate::smoothing::LandmarkSmoother`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Weight on the previous frame when the hand is still
    pub base_weight: f32,
    /// How fast the weight drops per unit of landmark velocity
    pub velocity_gain: f32,
    /// Floor on the previous-frame weight during fast motion
    pub min_weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Thumb-to-index distance, in hand-scale units, below which the hand pinches
    pub pinch_ratio: f32,
    /// How long a new raw gesture must persist before it becomes stable
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeConfig {
    /// Jumps longer than this (px) are subdivided
    pub gap_threshold: f32,
    /// Spacing (px) of synthesized points inside a subdivided jump
    pub step: f32,
    /// Points closer than this (px) to the last accepted point are dropped
    pub min_distance: f32,
    /// Radius (px) of the disc cleared by the eraser
    pub eraser_radius: f32,
    /// Initial stroke color, 0x00RRGGBB
    pub color: u32,
    /// Initial stroke width (px)
    pub width: f32,
    /// Tool selected at startup
    pub tool: Tool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Keep at most this many undo snapshots (oldest dropped). Unbounded when unset.
    pub max_snapshots: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: usize,
    pub height: usize,
    /// Device pixels per logical pixel
    pub pixel_ratio: f32,
    /// Blank-surface color, 0x00RRGGBB
    pub background: u32,
    /// Flip landmark x so a selfie camera draws where the user points
    pub mirror_x: bool,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self { base_weight: 0.6, velocity_gain: 0.5, min_weight: 0.25 }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self { pinch_ratio: 0.3, debounce_ms: 120 }
    }
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            gap_threshold: 15.0,
            step: 5.0,
            min_distance: 1.0,
            eraser_radius: 20.0,
            color: 0x00_1E_1E_28,
            width: 4.0,
            tool: Tool::Draw,
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 640,
            pixel_ratio: 1.0,
            background: 0x00_FF_FF_FF,
            mirror_x: true,
        }
    }
}

impl Config {
    /// Check every value is in a range the pipeline can work with.
    pub fn validate(&self) -> Result<()> {
        let s = &self.smoothing;
        if !(0.0..1.0).contains(&s.base_weight) {
            return Err(Error::Config(format!(
                "smoothing.base_weight must be in [0, 1), got {}", s.base_weight
            )));
        }
        if !(0.0..=s.base_weight).contains(&s.min_weight) {
            return Err(Error::Config(format!(
                "smoothing.min_weight must be in [0, base_weight], got {}", s.min_weight
            )));
        }
        if s.velocity_gain < 0.0 || !s.velocity_gain.is_finite() {
            return Err(Error::Config(format!(
                "smoothing.velocity_gain must be >= 0, got {}", s.velocity_gain
            )));
        }

        if !(self.gesture.pinch_ratio > 0.0 && self.gesture.pinch_ratio.is_finite()) {
            return Err(Error::Config(format!(
                "gesture.pinch_ratio must be > 0, got {}", self.gesture.pinch_ratio
            )));
        }

        let st = &self.stroke;
        if !(st.step > 0.0) {
            return Err(Error::Config(format!("stroke.step must be > 0, got {}", st.step)));
        }
        if st.gap_threshold < st.step {
            return Err(Error::Config(format!(
                "stroke.gap_threshold ({}) must be >= stroke.step ({})", st.gap_threshold, st.step
            )));
        }
        if st.min_distance < 0.0 || st.min_distance > st.step {
            return Err(Error::Config(format!(
                "stroke.min_distance must be in [0, step], got {}", st.min_distance
            )));
        }
        if !(st.width > 0.0) || !(st.eraser_radius > 0.0) {
            return Err(Error::Config("stroke.width and stroke.eraser_radius must be > 0".into()));
        }

        if self.history.max_snapshots == Some(0) {
            return Err(Error::Config("history.max_snapshots must be > 0 when set".into()));
        }

        let c = &self.canvas;
        if c.width == 0 || c.height == 0 {
            return Err(Error::Config(format!(
                "canvas size must be non-zero, got {}x{}", c.width, c.height
            )));
        }
        if !(c.pixel_ratio >= 1.0 && c.pixel_ratio <= 4.0) {
            return Err(Error::Config(format!(
                "canvas.pixel_ratio must be in [1, 4], got {}", c.pixel_ratio
            )));
        }
        Ok(())
    }

    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[gesture]\ndebounce_ms = 200\n\n[history]\nmax_snapshots = 16").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.gesture.debounce_ms, 200);
        assert_eq!(config.history.max_snapshots, Some(16));
        assert_eq!(config.gesture.pinch_ratio, GestureConfig::default().pinch_ratio);
        assert_eq!(config.stroke, StrokeConfig::default());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = Config::default();
        config.smoothing.min_weight = 0.9;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.stroke.step = 20.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.history.max_snapshots = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn tool_is_read_by_name() {
        let config: Config = toml::from_str("[stroke]\ntool = \"circle\"").unwrap();
        assert_eq!(config.stroke.tool, Tool::Circle);
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[stroke\nwidth = ").unwrap();
        assert!(matches!(Config::load(file.path()), Err(Error::Config(_))));
    }

    #[test]
    fn toml_round_trip_preserves_values() {
        let mut config = Config::default();
        config.canvas.mirror_x = false;
        let text = config.to_toml().unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
