use std::fs;
use std::path::{Path, PathBuf};

use bevy::asset::io::file::FileAssetReader;
use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::palette::MATCH_TOLERANCE;

/// Where the optional tuning file lives, relative to the asset folder.
pub const SETTINGS_ASSET: &str = "config/color_wheel.ron";

/// Resolves the tuning file the same way the asset server resolves `assets/`:
/// `BEVY_ASSET_ROOT`, then `CARGO_MANIFEST_DIR`, then the executable's folder.
pub fn settings_path() -> PathBuf {
    FileAssetReader::get_base_path()
        .join("assets")
        .join(SETTINGS_ASSET)
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Tuning for the wheel, the flick gesture and the round pacing.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WheelSettings {
    /// Speed multiplier applied once per reference frame.
    pub friction: f32,
    /// Frame rate at which `friction` is applied exactly once per frame.
    pub reference_fps: f32,
    /// Degrees per second under which the wheel counts as stopped.
    pub stop_threshold: f32,
    /// Flick speed at level 1, degrees per second.
    pub base_spin_speed: f32,
    pub speed_increase_per_level: f32,
    /// Drag rotation applied per degree of pointer travel around the center.
    pub swipe_sensitivity: f32,
    pub min_swipe_distance: f32,
    pub max_flick_seconds: f32,
    pub flick_distance_divisor: f32,
    pub min_flick_multiplier: f32,
    pub max_flick_multiplier: f32,
    pub match_tolerance: f32,
    /// Input stays locked this long after a correct match.
    pub next_round_delay: f32,
}

impl Default for WheelSettings {
    fn default() -> Self {
        Self {
            friction: 0.95,
            reference_fps: 60.0,
            stop_threshold: 10.0,
            base_spin_speed: 100.0,
            speed_increase_per_level: 20.0,
            swipe_sensitivity: 2.0,
            min_swipe_distance: 50.0,
            max_flick_seconds: 0.5,
            flick_distance_divisor: 200.0,
            min_flick_multiplier: 0.5,
            max_flick_multiplier: 3.0,
            match_tolerance: MATCH_TOLERANCE,
            next_round_delay: 0.5,
        }
    }
}

impl WheelSettings {
    pub fn from_ron(data: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(data)?)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&data)
    }

    /// Resets every out-of-range field to its default and returns one warning
    /// per reset. Call after loading and log each warning with `warn!`.
    pub fn validate(&mut self) -> Vec<String> {
        let defaults = Self::default();
        let mut w = Vec::new();

        if !self.friction.is_finite() || self.friction <= 0.0 || self.friction >= 1.0 {
            w.push(format!(
                "friction {} outside (0, 1); the wheel would never stop, using {}",
                self.friction, defaults.friction
            ));
            self.friction = defaults.friction;
        }
        if !self.reference_fps.is_finite() || self.reference_fps <= 0.0 {
            w.push(format!(
                "reference_fps {} must be > 0, using {}",
                self.reference_fps, defaults.reference_fps
            ));
            self.reference_fps = defaults.reference_fps;
        }
        if !self.stop_threshold.is_finite() || self.stop_threshold <= 0.0 {
            w.push(format!(
                "stop_threshold {} must be > 0, using {}",
                self.stop_threshold, defaults.stop_threshold
            ));
            self.stop_threshold = defaults.stop_threshold;
        }
        if !self.base_spin_speed.is_finite() || self.base_spin_speed <= 0.0 {
            w.push(format!(
                "base_spin_speed {} must be > 0, using {}",
                self.base_spin_speed, defaults.base_spin_speed
            ));
            self.base_spin_speed = defaults.base_spin_speed;
        }
        if !self.flick_distance_divisor.is_finite() || self.flick_distance_divisor <= 0.0 {
            w.push(format!(
                "flick_distance_divisor {} must be > 0, using {}",
                self.flick_distance_divisor, defaults.flick_distance_divisor
            ));
            self.flick_distance_divisor = defaults.flick_distance_divisor;
        }
        if self.max_flick_multiplier.is_nan()
            || self.min_flick_multiplier.is_nan()
            || self.max_flick_multiplier < self.min_flick_multiplier
        {
            w.push(format!(
                "max_flick_multiplier ({}) below min_flick_multiplier ({}), using {}..{}",
                self.max_flick_multiplier,
                self.min_flick_multiplier,
                defaults.min_flick_multiplier,
                defaults.max_flick_multiplier
            ));
            self.min_flick_multiplier = defaults.min_flick_multiplier;
            self.max_flick_multiplier = defaults.max_flick_multiplier;
        }
        if !self.match_tolerance.is_finite() || self.match_tolerance <= 0.0 {
            w.push(format!(
                "match_tolerance {} must be > 0; nothing could ever match, using {}",
                self.match_tolerance, defaults.match_tolerance
            ));
            self.match_tolerance = defaults.match_tolerance;
        }
        w
    }

    /// Spin speed for a given level.
    pub fn spin_speed(&self, level: u32) -> f32 {
        (level.saturating_sub(1) as f32).mul_add(self.speed_increase_per_level, self.base_spin_speed)
    }
}

/// Falls back to defaults when the file is absent or malformed, and per
/// field when a value is out of range.
pub fn load_settings(mut commands: Commands) {
    let path = settings_path();
    let settings = match WheelSettings::load_from_file(&path) {
        Ok(mut settings) => {
            info!("Loaded wheel settings from {}", path.display());
            for warning in settings.validate() {
                warn!("Wheel settings: {warning}");
            }
            settings
        }
        Err(err) => {
            warn!("{err}, using default wheel settings");
            WheelSettings::default()
        }
    };
    commands.insert_resource(settings);
}
