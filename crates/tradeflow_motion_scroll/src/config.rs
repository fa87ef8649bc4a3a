// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequence tunables.
//!
//! Defaults match the landing page's production timing. A RON file can
//! override any subset of fields:
//!
//! ```ron
//! (
//!     reduced_motion: false,
//!     intent_threshold: 80.0,
//!     style: Slide,
//!     section_timeout_secs: None,
//! )
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tradeflow_motion_transition::TransitionStyle;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The text is not valid RON for this schema
    #[error("Failed to parse motion config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serialization failed
    #[error("Failed to serialize motion config: {0}")]
    Serialize(#[from] ron::Error),

    /// A value is outside its allowed range
    #[error("Invalid motion config: {0}")]
    Invalid(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Timing and input tunables for a scroll sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Skip animated hand-offs and start on the static page
    pub reduced_motion: bool,
    /// Accumulated wheel delta that must be exceeded to emit an intent
    pub intent_threshold: f32,
    /// Minimum seconds between two wheel intents
    pub wheel_throttle_secs: f32,
    /// Touch travel in pixels that must be exceeded to emit an intent
    pub touch_dead_zone_px: f32,
    /// Minimum seconds between two touch intents
    pub touch_dead_zone_secs: f32,
    /// Page offset at or below which an upward intent rewinds the sequence
    pub top_tolerance_px: f32,
    /// Total cross-fade duration in seconds
    pub crossfade_duration_secs: f32,
    /// Fraction of the cross-fade after which the incoming section starts
    pub crossfade_overlap: f32,
    /// Delay between section 2 and the static page, in seconds
    pub settle_delay_secs: f32,
    /// Give up waiting on a section's own animation after this many
    /// seconds. `None` waits forever.
    pub section_timeout_secs: Option<f32>,
    /// Visual style of the section hand-off
    pub style: TransitionStyle,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            reduced_motion: false,
            intent_threshold: 80.0,
            wheel_throttle_secs: 0.05,
            touch_dead_zone_px: 30.0,
            touch_dead_zone_secs: 0.1,
            top_tolerance_px: 5.0,
            crossfade_duration_secs: 0.6,
            crossfade_overlap: 0.3,
            settle_delay_secs: 0.3,
            section_timeout_secs: Some(8.0),
            style: TransitionStyle::Crossfade,
        }
    }
}

impl SequenceConfig {
    /// Parse and validate RON text
    pub fn from_ron(text: &str) -> Result<Self> {
        let config: SequenceConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Pretty-printed RON
    pub fn to_ron(&self) -> Result<String> {
        let pretty = ron::ser::PrettyConfig::default().struct_names(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Load and validate a RON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        tracing::debug!(path = %path.display(), "loaded motion config");
        Ok(config)
    }

    /// Write the configuration as RON
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Reject values the sequence cannot run with
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("intent_threshold", self.intent_threshold),
            ("touch_dead_zone_px", self.touch_dead_zone_px),
            ("crossfade_duration_secs", self.crossfade_duration_secs),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let non_negative = [
            ("wheel_throttle_secs", self.wheel_throttle_secs),
            ("touch_dead_zone_secs", self.touch_dead_zone_secs),
            ("top_tolerance_px", self.top_tolerance_px),
            ("settle_delay_secs", self.settle_delay_secs),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.crossfade_overlap) {
            return Err(ConfigError::Invalid(format!(
                "crossfade_overlap must be within [0, 1], got {}",
                self.crossfade_overlap
            )));
        }

        if let Some(timeout) = self.section_timeout_secs {
            if !(timeout.is_finite() && timeout > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "section_timeout_secs must be positive, got {timeout}"
                )));
            }
        }

        Ok(())
    }
}
