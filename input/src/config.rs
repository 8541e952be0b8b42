use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result, bail};
use derive_more::Display;
use serde::Deserialize;

use glide_frames::{FALLBACK_FRAME_INTERVAL, Frames};

/// The distance in pixels the pointer has to move before move events start.
pub const DEFAULT_THRESHOLD: f64 = 4.0;

/// A validated threshold distance: finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display)]
#[display("{_0}px")]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(pixels: f64) -> Result<Self> {
        if !pixels.is_finite() || pixels < 0.0 {
            bail!("Threshold must be a non-negative number of pixels, got {pixels}");
        }
        Ok(Self(pixels))
    }

    pub fn pixels(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameSource {
    /// The host delivers display refresh callbacks.
    #[default]
    Vsync,
    /// A fixed interval timer.
    Timer,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MoveConfig {
    pub threshold: f64,
    pub frames: FrameSource,
    /// Only used with [`FrameSource::Timer`].
    pub timer_interval_ms: u64,
}

impl Default for MoveConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            frames: FrameSource::default(),
            timer_interval_ms: FALLBACK_FRAME_INTERVAL.as_millis() as u64,
        }
    }
}

impl MoveConfig {
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml).context("Failed to parse move configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let toml = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&toml).with_context(|| format!("In {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        self.threshold()?;
        if self.frames == FrameSource::Timer && self.timer_interval_ms == 0 {
            bail!("Timer interval must not be zero");
        }
        Ok(())
    }

    pub fn threshold(&self) -> Result<Threshold> {
        Threshold::new(self.threshold)
    }

    pub fn timer_interval(&self) -> Duration {
        Duration::from_millis(self.timer_interval_ms)
    }

    /// Create the refresh source this configuration asks for.
    pub fn frames(&self) -> Frames {
        match self.frames {
            FrameSource::Vsync => Frames::new(true),
            FrameSource::Timer => Frames::timer(self.timer_interval()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = MoveConfig::from_toml_str("").unwrap();
        assert_eq!(config, MoveConfig::default());
        assert_eq!(config.threshold, 4.0);
        assert_eq!(config.timer_interval(), Duration::from_millis(25));
        assert!(matches!(config.frames(), Frames::Vsync(_)));
    }

    #[test]
    fn parses_all_fields() {
        let config = MoveConfig::from_toml_str(
            r#"
threshold = 8.5
frames = "timer"
timer_interval_ms = 16
        "#,
        )
        .unwrap();
        assert_eq!(config.threshold, 8.5);
        assert_eq!(config.frames, FrameSource::Timer);
        match config.frames() {
            Frames::Timer(timer) => assert_eq!(timer.interval(), Duration::from_millis(16)),
            Frames::Vsync(_) => panic!("Expected timer frames"),
        }
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(MoveConfig::from_toml_str("threshold = -1.0").is_err());
        assert!(MoveConfig::from_toml_str("threshold = nan").is_err());
        assert!(MoveConfig::from_toml_str("frames = \"timer\"\ntimer_interval_ms = 0").is_err());
        assert!(MoveConfig::from_toml_str("frames = \"sometimes\"").is_err());
        assert!(MoveConfig::from_toml_str("treshold = 3.0").is_err());
    }

    #[test]
    fn thresholds_must_be_finite_and_non_negative() {
        assert_eq!(Threshold::new(0.0).unwrap().pixels(), 0.0);
        assert_eq!(Threshold::default().pixels(), DEFAULT_THRESHOLD);
        assert_eq!(Threshold::new(2.5).unwrap().to_string(), "2.5px");
        assert!(Threshold::new(-1.0).is_err());
        assert!(Threshold::new(f64::NAN).is_err());
        assert!(Threshold::new(f64::INFINITY).is_err());
    }

    #[test]
    fn load_reports_missing_files() {
        let err = MoveConfig::load("/nonexistent/glide.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/glide.toml"));
    }
}
