//! Config module: pacing and strip settings, loadable from TOML.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::item::BLACK;
use crate::render::MAX_FRAME_DROP;

/// Pacing knobs for one engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Signed delay per flash in microseconds. Negative values select
    /// frame-drop mode and give the number of flashes per frame.
    #[serde(default = "PacingConfig::default_delay_us")]
    pub delay_us: i32,
    /// Per-mille scale applied to every positive sleep (1000 = 1.0x).
    #[serde(default = "PacingConfig::default_delay_factor")]
    pub delay_factor: u32,
    /// Frame drop used while validating the result.
    #[serde(default = "PacingConfig::default_settle_frame_drop")]
    pub settle_frame_drop: u32,
    #[serde(default = "PacingConfig::default_count_comparisons")]
    pub count_comparisons: bool,
    /// Brightness of a flashed pixel relative to the strip intensity.
    #[serde(default = "PacingConfig::default_flash_boost_percent")]
    pub flash_boost_percent: u32,
    /// Time the settled result stays on the strip.
    #[serde(default = "PacingConfig::default_hold_ms")]
    pub hold_ms: u64,
    /// Shuffle seed; entropy when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl PacingConfig {
    fn default_delay_us() -> i32 {
        10_000
    }
    fn default_delay_factor() -> u32 {
        1000
    }
    fn default_settle_frame_drop() -> u32 {
        4
    }
    fn default_count_comparisons() -> bool {
        true
    }
    fn default_flash_boost_percent() -> u32 {
        200
    }
    fn default_hold_ms() -> u64 {
        2000
    }

    /// Unpaced settings: frame-drop pacing with no sleeps and no hold.
    pub fn unpaced() -> Self {
        Self {
            delay_us: -(MAX_FRAME_DROP as i32),
            hold_ms: 0,
            ..Self::default()
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            delay_us: Self::default_delay_us(),
            delay_factor: Self::default_delay_factor(),
            settle_frame_drop: Self::default_settle_frame_drop(),
            count_comparisons: Self::default_count_comparisons(),
            flash_boost_percent: Self::default_flash_boost_percent(),
            hold_ms: Self::default_hold_ms(),
            seed: None,
        }
    }
}

/// Simulated or physical strip parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripConfig {
    #[serde(default = "StripConfig::default_length")]
    pub length: usize,
    #[serde(default = "StripConfig::default_intensity")]
    pub intensity: u8,
}

impl StripConfig {
    fn default_length() -> usize {
        5 * 96
    }
    fn default_intensity() -> u8 {
        64
    }
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            length: Self::default_length(),
            intensity: Self::default_intensity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ShowConfig {
    /// Algorithm names to rotate through; empty means all.
    #[serde(default)]
    pub algorithms: Vec<String>,
    #[serde(default)]
    pub strip: StripConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    /// Per-algorithm delay overrides, keyed by algorithm name.
    #[serde(default)]
    pub delays: BTreeMap<String, i32>,
}

impl ShowConfig {
    pub fn from_toml_str(text: &str, path: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_toml_str(&text, &display)
    }

    /// Load `path`, falling back to defaults on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("{err}. Using defaults.");
                Self::default()
            }
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = usize::from(BLACK);
        if self.strip.length == 0 || self.strip.length > max {
            return Err(ConfigError::Invalid(format!(
                "strip.length {} outside 1..={max}",
                self.strip.length
            )));
        }
        let max_drop = MAX_FRAME_DROP as u32;
        if self.pacing.settle_frame_drop == 0 || self.pacing.settle_frame_drop > max_drop {
            return Err(ConfigError::Invalid(format!(
                "pacing.settle_frame_drop {} outside 1..={max_drop}",
                self.pacing.settle_frame_drop
            )));
        }
        Ok(())
    }

    /// Delay for a named algorithm, honoring overrides.
    pub fn delay_for(&self, name: &str) -> i32 {
        self.delays
            .get(name)
            .copied()
            .unwrap_or(self.pacing.delay_us)
    }
}
