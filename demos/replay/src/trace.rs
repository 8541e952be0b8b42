//! Recorded pointer input, replayed against a document.

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use euclid::{point2, size2};
use serde::Deserialize;

use glide_dom::PageSpace;
use glide_input::MoveConfig;

pub type Bounds = euclid::Rect<f64, PageSpace>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trace {
    #[serde(default)]
    pub config: MoveConfig,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
    /// Logical bounds of the element that recognizes moves: x, y, width, height.
    pub element: [f64; 4],
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Cursor movement, in physical pixels.
    Move { x: f64, y: f64 },
    Press,
    Release,
    /// A display refresh.
    Frame,
    Wait { ms: u64 },
}

fn default_scale_factor() -> f64 {
    1.0
}

impl Trace {
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let trace: Self = toml::from_str(toml).context("Failed to parse trace")?;
        trace.config.validate()?;
        if !(trace.scale_factor.is_finite() && trace.scale_factor > 0.0) {
            bail!("Scale factor must be positive, got {}", trace.scale_factor);
        }
        Ok(trace)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let toml = fs::read_to_string(path)
            .with_context(|| format!("Failed to read trace {}", path.display()))?;
        Self::from_toml_str(&toml).with_context(|| format!("In {}", path.display()))
    }

    pub fn element_bounds(&self) -> Bounds {
        let [x, y, width, height] = self.element;
        Bounds::new(point2(x, y), size2(width, height))
    }
}
