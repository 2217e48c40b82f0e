//! Simulation settings
//!
//! Passive configuration handed in by the caller: output resolution, frame
//! budget, retry policy and the palette the scenarios color their entities
//! with. Loaded from JSON; every field falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};
use crate::Rgb;

/// Colors used by the scenarios (chosen by the palette collaborator)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub bg: Rgb,
    pub primary: Rgb,
    pub secondary: Rgb,
    pub accent: Rgb,
    pub ring: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            bg: Rgb(12, 12, 20),
            primary: Rgb(255, 94, 120),
            secondary: Rgb(80, 200, 255),
            accent: Rgb(255, 214, 90),
            ring: Rgb(90, 90, 110),
        }
    }
}

impl Palette {
    /// The three entity colors scenarios pick from
    pub fn entity_colors(&self) -> [Rgb; 3] {
        [self.primary, self.secondary, self.accent]
    }
}

/// Settings for a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Output ===
    /// Canvas width in pixels
    pub width: f64,
    /// Canvas height in pixels
    pub height: f64,
    /// Frames per second of the produced animation
    pub fps: u32,

    // === Frame budget ===
    /// Hard cap on frames per run
    pub max_frames: u32,
    /// Runs shorter than this are rejected
    pub min_frames: u32,
    /// Closing sequence length after a terminal condition
    pub end_frames: u32,
    /// Slow-motion frames after a climax
    pub slowmo_frames: u32,
    /// Time scale during slow motion
    pub slowmo_dt: f64,

    // === Retry policy ===
    /// Base seed for parameter draws
    pub seed: u64,
    /// Attempts before giving up on a scenario
    pub max_attempts: u32,

    /// Entity colors
    pub palette: Palette,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            fps: FPS,

            max_frames: MAX_FRAMES,
            min_frames: MIN_FRAMES,
            end_frames: END_FRAMES,
            slowmo_frames: SLOWMO_FRAMES,
            slowmo_dt: SLOWMO_DT,

            seed: 0,
            max_attempts: 10,

            palette: Palette::default(),
        }
    }
}

impl Settings {
    /// Half-resolution canvas (used by the duplication scenario)
    pub fn half_size(&self) -> (f64, f64) {
        ((self.width / 2.0).floor(), (self.height / 2.0).floor())
    }

    /// Parse settings from a JSON document and validate them
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject settings the scenarios cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.height.is_finite()) || self.width < 100.0 || self.height < 100.0 {
            return Err(SimError::InvalidSettings(format!(
                "canvas {}x{} is too small",
                self.width, self.height
            )));
        }
        if self.fps == 0 {
            return Err(SimError::InvalidSettings("fps must be positive".into()));
        }
        if self.max_frames == 0 || self.min_frames > self.max_frames {
            return Err(SimError::InvalidSettings(format!(
                "min_frames {} exceeds max_frames {}",
                self.min_frames, self.max_frames
            )));
        }
        if !(self.slowmo_dt > 0.0 && self.slowmo_dt <= 1.0) {
            return Err(SimError::InvalidSettings(format!(
                "slowmo_dt {} must be in (0, 1]",
                self.slowmo_dt
            )));
        }
        if self.max_attempts == 0 {
            return Err(SimError::InvalidSettings("max_attempts must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.half_size(), (540.0, 960.0));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "seed": 42, "max_frames": 1200 }"#).unwrap();
        assert_eq!(settings.seed, 42);
        assert_eq!(settings.max_frames, 1200);
        assert_eq!(settings.min_frames, MIN_FRAMES);
        assert_eq!(settings.width, WIDTH);
    }

    #[test]
    fn test_rejects_min_over_max() {
        let err = Settings::from_json(r#"{ "max_frames": 100, "min_frames": 200 }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidSettings(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Settings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SimError::Json(_)));
    }

    #[test]
    fn test_json_roundtrip_keeps_palette() {
        let mut settings = Settings::default();
        settings.palette.accent = Rgb(1, 2, 3);
        let json = settings.to_json().unwrap();
        let back = Settings::from_json(&json).unwrap();
        assert_eq!(back.palette, settings.palette);
    }
}
