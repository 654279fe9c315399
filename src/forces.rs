//! Force fields shared by every particle in a session.
//!
//! Each kind has its own typed struct and factory function. Accelerations are
//! in target-local units per second squared, y up.

use std::f32::consts::TAU;

use bevy::prelude::*;

use crate::config::ConfettiConfig;

/// Name of the burst's attractor; stiffness animations look it up by this.
pub const ATTRACTOR_NAME: &str = "attractor";

/// Depth offset that keeps the attractor behind the particle plane.
pub const ATTRACTOR_DEPTH: f32 = -70.0;

/// A force applied to every live particle.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub enum ForceField {
    Wave(WaveForce),
    Attractor(Attractor),
}

/// Oscillating force: `force * sin(2π * frequency * t + phase)`.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct WaveForce {
    pub force: Vec3,
    /// Hertz.
    pub frequency: f32,
}

/// Spring-like pull toward a point, with a radial push that fades out at
/// `radius`. No effect beyond `radius`.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct Attractor {
    pub name: String,
    pub position: Vec3,
    /// Negative values push particles away, strongest near the centre.
    pub falloff: f32,
    pub radius: f32,
    pub stiffness: f32,
}

impl ForceField {
    /// Acceleration on a particle at `position`, `time` seconds into the burst.
    /// `phase` is the particle's private wave offset in radians.
    pub fn acceleration(&self, position: Vec3, time: f32, phase: f32) -> Vec3 {
        match self {
            Self::Wave(wave) => wave.force * (TAU * wave.frequency * time + phase).sin(),
            Self::Attractor(a) => {
                let to_target = a.position - position;
                let dist = to_target.length();
                if dist < 0.001 || dist >= a.radius {
                    return Vec3::ZERO;
                }
                let pull = a.stiffness * dist + a.falloff * (1.0 - dist / a.radius);
                to_target / dist * pull
            }
        }
    }
}

/// Slow lateral sway.
pub fn horizontal_wave(magnitude: f32) -> ForceField {
    ForceField::Wave(WaveForce {
        force: Vec3::new(magnitude, 0.0, 0.0),
        frequency: 0.5,
    })
}

/// Fast downward flutter.
pub fn vertical_wave(magnitude: f32) -> ForceField {
    ForceField::Wave(WaveForce {
        force: Vec3::new(0.0, -magnitude, 0.0),
        frequency: 5.0,
    })
}

/// Attractor centred on the spawn origin, pushed back to `ATTRACTOR_DEPTH`.
pub fn attractor(origin: Vec2) -> ForceField {
    ForceField::Attractor(Attractor {
        name: ATTRACTOR_NAME.to_string(),
        position: origin.extend(ATTRACTOR_DEPTH),
        falloff: -290.0,
        radius: 200.0,
        stiffness: 10.0,
    })
}

/// Horizontal wave, vertical wave and attractor for one burst.
pub fn build_behaviors(config: &ConfettiConfig) -> Vec<ForceField> {
    vec![
        horizontal_wave(config.horizontal_wave_force),
        vertical_wave(config.vertical_wave_force),
        attractor(config.emitter_position),
    ]
}
