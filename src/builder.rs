//! Turns a `ConfettiConfig` into a ready-to-run `EmissionSession`.

use bevy::prelude::*;

use crate::animation;
use crate::config::{ConfettiConfig, ParticleSizes};
use crate::data::*;
use crate::error::{ConfettiError, SpriteError};
use crate::forces;
use crate::sprite::{self, StarStyle};

/// Every layer position × shape × color combination, palette order innermost.
pub fn variants(colors: &[Srgba]) -> Vec<ParticleVariant> {
    LayerPosition::ALL
        .iter()
        .flat_map(|&position| {
            ConfettiShape::ALL.iter().flat_map(move |&shape| {
                colors.iter().map(move |&color| ParticleVariant {
                    color,
                    shape,
                    position,
                })
            })
        })
        .collect()
}

/// Configured bounding box for `shape`.
pub fn sprite_size(sizes: &ParticleSizes, shape: ConfettiShape) -> UVec2 {
    match shape {
        ConfettiShape::Rectangle => sizes.rectangle,
        ConfettiShape::Square => sizes.square,
        ConfettiShape::Circle => sizes.circle,
        ConfettiShape::Star => sizes.star,
    }
}

/// One emitter cell per variant, each with a freshly baked sprite.
pub fn build_cells(config: &ConfettiConfig) -> Result<Vec<EmitterCell>, SpriteError> {
    let star = StarStyle {
        rotation_degrees: config.star_rotation_degrees,
        corner_radius: config.star_corner_radius,
    };
    let palette_len = config.colors.len().max(1);

    variants(&config.colors)
        .into_iter()
        .enumerate()
        .map(|(i, variant)| {
            let size = sprite_size(&config.sizes, variant.shape);
            let sprite = sprite::rasterize(variant.shape, size, variant.color, star)?;
            let name = format!(
                "{}.{}.{}",
                variant.position.label(),
                variant.shape.label(),
                i % palette_len
            );
            Ok(EmitterCell::new(name, variant, sprite, config.birth_rate))
        })
        .collect()
}

/// A zero burst radius collapses the spawn sphere to its centre.
pub fn spawn_shape(burst_radius: f32) -> SpawnShape {
    if burst_radius > 0.0 {
        SpawnShape::Sphere
    } else {
        SpawnShape::Point
    }
}

/// Build a complete session: cells, spawn volume, forces and animations.
///
/// The session's own birth rate is zero; the birth-rate decay animation is
/// what makes it emit, starting at `birth_animation_duration` on the first frame.
pub fn build_session(config: &ConfettiConfig) -> Result<EmissionSession, ConfettiError> {
    config.validate()?;
    let cells = build_cells(config)?;
    let animations = animation::schedule(&cells, config.birth_animation_duration);

    Ok(EmissionSession {
        cells,
        origin: config.emitter_position,
        spawn_radius: config.burst_radius,
        spawn_shape: spawn_shape(config.burst_radius),
        birth_rate: 0.0,
        behaviors: forces::build_behaviors(config),
        animations,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn cell_count_is_palette_times_shapes_times_layers() {
        for palette_len in [1, 2, 9] {
            let config = ConfettiConfig {
                colors: crate::config::default_palette()
                    .into_iter()
                    .cycle()
                    .take(palette_len)
                    .collect(),
                ..default()
            };
            let session = build_session(&config).unwrap();
            assert_eq!(session.cells.len(), palette_len * 4 * 2);
        }
    }

    #[test]
    fn cell_names_are_unique() {
        let session = build_session(&ConfettiConfig::default()).unwrap();
        let names: HashSet<&str> = session.cells.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), session.cells.len());
    }

    #[test]
    fn sprites_use_configured_sizes() {
        let mut config = ConfettiConfig::default();
        config.sizes.rectangle = UVec2::new(30, 12);
        let session = build_session(&config).unwrap();
        for cell in &session.cells {
            assert_eq!(
                cell.sprite.size(),
                sprite_size(&config.sizes, cell.variant.shape)
            );
        }
        assert!(
            session
                .cells
                .iter()
                .any(|c| c.sprite.size() == UVec2::new(30, 12))
        );
    }

    #[test]
    fn cells_share_defaults_except_sprite_and_rate() {
        let config = ConfettiConfig {
            birth_rate: 6.0,
            ..default()
        };
        let session = build_session(&config).unwrap();
        for cell in &session.cells {
            assert_eq!(cell.birth_rate, 6.0);
            assert_eq!(cell.lifetime, 10.0);
            assert_eq!(cell.begin_time, 0.1);
            assert_eq!(cell.spin, 4.0);
            assert_eq!(cell.spin_range, 8.0);
            assert_eq!(cell.velocity, 0.0);
        }
    }

    #[test]
    fn session_copies_spawn_settings() {
        let config = ConfettiConfig {
            burst_radius: 75.0,
            emitter_position: Vec2::new(10.0, 300.0),
            ..default()
        };
        let session = build_session(&config).unwrap();
        assert_eq!(session.spawn_radius, 75.0);
        assert_eq!(session.origin, Vec2::new(10.0, 300.0));
        assert_eq!(session.spawn_shape, SpawnShape::Sphere);
        assert_eq!(session.birth_rate, 0.0);
        assert_eq!(session.behaviors.len(), 3);
        assert_eq!(session.animations.len(), session.cells.len() + 2);
    }

    #[test]
    fn zero_radius_spawns_from_a_point() {
        let config = ConfettiConfig {
            burst_radius: 0.0,
            ..default()
        };
        let session = build_session(&config).unwrap();
        assert_eq!(session.spawn_shape, SpawnShape::Point);
        assert_eq!(spawn_shape(0.5), SpawnShape::Sphere);
    }

    #[test]
    fn empty_palette_builds_an_empty_session() {
        let config = ConfettiConfig {
            colors: Vec::new(),
            ..default()
        };
        let session = build_session(&config).unwrap();
        assert!(session.cells.is_empty());
        assert_eq!(session.expected_particles(0.01), Some(0.0));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ConfettiConfig {
            birth_animation_duration: 0.0,
            ..default()
        };
        assert!(matches!(
            build_session(&config),
            Err(ConfettiError::InvalidBirthDuration(_))
        ));

        let config = ConfettiConfig {
            birth_rate: f32::INFINITY,
            ..default()
        };
        assert!(matches!(
            build_session(&config),
            Err(ConfettiError::InvalidBirthRate { .. })
        ));

        let mut config = ConfettiConfig::default();
        config.sizes.circle = UVec2::ZERO;
        assert!(matches!(
            build_session(&config),
            Err(ConfettiError::Sprite(SpriteError::EmptySize { .. }))
        ));
    }

    #[test]
    fn default_burst_emits_a_few_dozen_particles() {
        let session = build_session(&ConfettiConfig::default()).unwrap();
        let expected = session.expected_particles(0.001).unwrap();
        // 72 cells, each integrating (1 - t) over [0.1, 1.0].
        assert!((expected - 72.0 * 0.405).abs() < 0.5, "{expected}");
    }
}
