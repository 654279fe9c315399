//! Core data model for a confetti burst.
//!
//! A burst is one `EmissionSession`: a flat list of emitter cells (one per
//! color, shape and layer position), the spawn volume they share, the force
//! fields acting on every particle, and the parameter animations that make the
//! burst die out. Sessions own copies of everything they use; nothing is shared
//! between bursts.

use std::f32::consts::{FRAC_PI_2, PI};

use bevy::prelude::*;

use crate::animation::ParamAnimation;
use crate::forces::ForceField;
use crate::sprite::ConfettiSprite;

// ---------------------------------------------------------------------------
// Variant identity
// ---------------------------------------------------------------------------

/// Outline of a confetti piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub enum ConfettiShape {
    Rectangle,
    Circle,
    Square,
    Star,
}

impl ConfettiShape {
    pub const ALL: [Self; 4] = [Self::Rectangle, Self::Circle, Self::Square, Self::Star];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Square => "square",
            Self::Star => "star",
        }
    }
}

/// Whether a variant draws in front of or behind the target's content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub enum LayerPosition {
    Foreground,
    Background,
}

impl LayerPosition {
    pub const ALL: [Self; 2] = [Self::Foreground, Self::Background];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Foreground => "foreground",
            Self::Background => "background",
        }
    }

    /// Local z used when drawing particles of this layer.
    pub fn depth(&self) -> f32 {
        match self {
            Self::Foreground => 10.0,
            Self::Background => -10.0,
        }
    }
}

/// One color/shape/layer combination.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct ParticleVariant {
    pub color: Srgba,
    pub shape: ConfettiShape,
    pub position: LayerPosition,
}

// ---------------------------------------------------------------------------
// Emitter cell (per-variant emission descriptor)
// ---------------------------------------------------------------------------

/// Per-variant emission parameters plus the variant's baked sprite.
#[derive(Clone, Debug, PartialEq)]
pub struct EmitterCell {
    /// Unique within a session; animations address cells by this name.
    pub name: String,
    pub variant: ParticleVariant,
    pub sprite: ConfettiSprite,
    /// Particles per second before the session multiplier is applied.
    pub birth_rate: f32,
    /// Seconds after session start before the cell emits.
    pub begin_time: f32,
    /// Particle lifetime in seconds.
    pub lifetime: f32,
    /// Spin in radians per second.
    pub spin: f32,
    pub spin_range: f32,
    /// Full cone angle around the emission direction, in radians.
    pub emission_range: f32,
    pub velocity: f32,
    pub velocity_range: f32,
    /// Downward acceleration before any animation touches it.
    pub gravity: f32,
    /// Spread of the initial plane orientation, in radians.
    pub orientation_range: f32,
    pub orientation_longitude: f32,
    pub orientation_latitude: f32,
}

impl EmitterCell {
    pub fn new(
        name: String,
        variant: ParticleVariant,
        sprite: ConfettiSprite,
        birth_rate: f32,
    ) -> Self {
        Self {
            name,
            variant,
            sprite,
            birth_rate,
            begin_time: 0.1,
            lifetime: 10.0,
            spin: 4.0,
            spin_range: 8.0,
            emission_range: PI,
            velocity: 0.0,
            velocity_range: 0.0,
            gravity: 0.0,
            orientation_range: PI,
            orientation_longitude: FRAC_PI_2,
            orientation_latitude: FRAC_PI_2,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Volume particles are spawned in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum SpawnShape {
    /// Every particle starts exactly at the origin.
    Point,
    #[default]
    Sphere,
}

/// One burst: cells, spawn volume, forces and animations.
///
/// Spawned as a child of the target surface. Particle state lives in a
/// separate `ConfettiState` component driven by the simulation systems.
#[derive(Component, Clone, Debug)]
pub struct EmissionSession {
    pub cells: Vec<EmitterCell>,
    /// Spawn origin in target-local coordinates.
    pub origin: Vec2,
    /// Radius of the spawn volume.
    pub spawn_radius: f32,
    pub spawn_shape: SpawnShape,
    /// Session-wide birth-rate multiplier when no animation drives it.
    pub birth_rate: f32,
    pub behaviors: Vec<ForceField>,
    pub animations: Vec<ParamAnimation>,
}

impl EmissionSession {
    /// Mean number of particles the burst emits, integrated in `step`-second
    /// slices. `None` when the session never stops emitting.
    pub fn expected_particles(&self, step: f32) -> Option<f32> {
        let end = crate::animation::emission_end(self)?;
        let step = step.max(1e-3);
        let mut total = 0.0;
        let mut t = 0.0;
        while t < end {
            let frame = crate::animation::evaluate(self, t);
            total += self
                .cells
                .iter()
                .filter(|cell| t >= cell.begin_time)
                .map(|cell| cell.birth_rate * frame.birth_rate * step)
                .sum::<f32>();
            t += step;
        }
        Some(total)
    }
}
