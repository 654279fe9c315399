//! Caller-facing burst configuration.
//!
//! A `ConfettiConfig` is plain data: it is cloned into every session at build
//! time, so editing it afterwards never reaches a burst that is already running.
//! Configs round-trip through RON; missing fields fall back to the defaults.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::{ConfettiShape, LayerPosition};
use crate::error::ConfettiError;

/// Highest per-cell birth rate accepted, in particles per second.
pub const MAX_BIRTH_RATE: f32 = 1000.0;

/// Default palette: deep reds, a brighter red, yellow, gold and white.
/// Repeated entries weight the mix toward red.
pub const DEFAULT_PALETTE: [(u8, u8, u8); 9] = [
    (199, 1, 1),
    (199, 1, 1),
    (239, 2, 30),
    (248, 231, 28),
    (199, 1, 1),
    (199, 1, 1),
    (188, 157, 76),
    (255, 255, 255),
    (248, 231, 28),
];

/// The default palette as sRGB colors.
pub fn default_palette() -> Vec<Srgba> {
    DEFAULT_PALETTE
        .iter()
        .map(|&(r, g, b)| Srgba::rgb_u8(r, g, b))
        .collect()
}

/// Bounding size in pixels of each sprite shape.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Reflect)]
#[serde(default)]
pub struct ParticleSizes {
    pub rectangle: UVec2,
    pub square: UVec2,
    pub circle: UVec2,
    pub star: UVec2,
}

impl Default for ParticleSizes {
    fn default() -> Self {
        Self {
            rectangle: UVec2::new(22, 8),
            square: UVec2::new(10, 10),
            circle: UVec2::new(6, 6),
            star: UVec2::new(8, 8),
        }
    }
}

/// Everything a caller can tune before triggering a burst.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Reflect)]
#[serde(default)]
pub struct ConfettiConfig {
    /// Radius of the spherical spawn volume.
    pub burst_radius: f32,
    /// Seconds over which the burst keeps spawning. Also stretches the
    /// stiffness and gravity animations.
    pub birth_animation_duration: f32,
    /// Reserved. Stored and serialized, never consumed by any force.
    pub initial_force: f32,
    /// Spawn origin in target-local coordinates (y up).
    pub emitter_position: Vec2,
    /// Particles per second emitted by every cell.
    pub birth_rate: f32,
    pub sizes: ParticleSizes,
    /// Ordered palette; one cell per color, shape and layer position.
    pub colors: Vec<Srgba>,
    /// Lateral wave force magnitude.
    pub horizontal_wave_force: f32,
    /// Downward wave force magnitude.
    pub vertical_wave_force: f32,
    /// Base rotation of the star's first point, in degrees.
    pub star_rotation_degrees: f32,
    /// Rounding radius applied to each star point, in pixels.
    pub star_corner_radius: f32,
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            burst_radius: 50.0,
            birth_animation_duration: 1.0,
            initial_force: 700.0,
            emitter_position: Vec2::ZERO,
            birth_rate: 1.0,
            sizes: ParticleSizes::default(),
            colors: default_palette(),
            horizontal_wave_force: 50.0,
            vertical_wave_force: 300.0,
            star_rotation_degrees: 54.0,
            star_corner_radius: 0.1,
        }
    }
}

impl ConfettiConfig {
    /// Parse a config from RON text.
    pub fn from_ron(source: &str) -> Result<Self, ConfettiError> {
        Ok(ron::from_str(source)?)
    }

    /// Read and parse a RON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfettiError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_ron(&source)
    }

    /// Serialize to pretty-printed RON.
    pub fn to_ron(&self) -> Result<String, ConfettiError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Reject values that would make the decay animations meaningless.
    /// An empty palette is allowed and simply produces an invisible burst.
    pub fn validate(&self) -> Result<(), ConfettiError> {
        let d = self.birth_animation_duration;
        if !d.is_finite() || d <= 0.0 {
            return Err(ConfettiError::InvalidBirthDuration(d));
        }
        let r = self.burst_radius;
        if !r.is_finite() || r < 0.0 {
            return Err(ConfettiError::InvalidBurstRadius(r));
        }
        if !(0.0..=MAX_BIRTH_RATE).contains(&self.birth_rate) {
            return Err(ConfettiError::InvalidBirthRate {
                rate: self.birth_rate,
                max: MAX_BIRTH_RATE,
            });
        }
        Ok(())
    }

    /// Number of emitter cells a session built from this config will carry.
    pub fn cell_count(&self) -> usize {
        self.colors.len() * ConfettiShape::ALL.len() * LayerPosition::ALL.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_burst() {
        let config = ConfettiConfig::default();
        assert_eq!(config.colors.len(), 9);
        assert_eq!(config.colors[0], Srgba::rgb_u8(199, 1, 1));
        assert_eq!(config.colors[7], Srgba::rgb_u8(255, 255, 255));
        assert_eq!(config.sizes.rectangle, UVec2::new(22, 8));
        assert_eq!(config.sizes.star, UVec2::new(8, 8));
        assert_eq!(config.burst_radius, 50.0);
        assert_eq!(config.birth_animation_duration, 1.0);
        assert_eq!(config.cell_count(), 72);
    }

    #[test]
    fn partial_ron_fills_defaults() {
        let config = ConfettiConfig::from_ron("(burst_radius: 80.0, birth_rate: 4.0)").unwrap();
        assert_eq!(config.burst_radius, 80.0);
        assert_eq!(config.birth_rate, 4.0);
        assert_eq!(config.sizes, ParticleSizes::default());
        assert_eq!(config.colors.len(), 9);
    }

    #[test]
    fn ron_round_trip_preserves_config() {
        let mut config = ConfettiConfig::default();
        config.emitter_position = Vec2::new(120.0, -20.0);
        config.colors.truncate(2);
        let text = config.to_ron().unwrap();
        assert_eq!(ConfettiConfig::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn bundled_example_config_parses() {
        let config = ConfettiConfig::from_ron(include_str!("../config/confetti.ron")).unwrap();
        assert_eq!(config.colors.len(), 5);
        assert_eq!(config.sizes.star, UVec2::new(12, 12));
        assert_eq!(config.birth_rate, 4.0);
        assert_eq!(config.initial_force, 700.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn malformed_ron_is_a_config_error() {
        let err = ConfettiConfig::from_ron("(burst_radius: \"wide\")").unwrap_err();
        assert!(matches!(err, ConfettiError::Config(_)));
    }

    #[test]
    fn validate_rejects_non_positive_birth_duration() {
        let mut config = ConfettiConfig::default();
        config.birth_animation_duration = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfettiError::InvalidBirthDuration(_))
        ));
        config.birth_animation_duration = -1.0;
        assert!(config.validate().is_err());
        config.birth_animation_duration = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unbounded_birth_rate() {
        for rate in [f32::INFINITY, f32::NAN, -1.0, MAX_BIRTH_RATE * 2.0] {
            let config = ConfettiConfig {
                birth_rate: rate,
                ..default()
            };
            assert!(
                matches!(config.validate(), Err(ConfettiError::InvalidBirthRate { .. })),
                "{rate} accepted"
            );
        }
        let config = ConfettiConfig {
            birth_rate: MAX_BIRTH_RATE,
            ..default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_accepts_empty_palette() {
        let config = ConfettiConfig {
            colors: Vec::new(),
            ..default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.cell_count(), 0);
    }
}
