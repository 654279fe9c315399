//! # bevy_confetti
//!
//! Procedural confetti bursts for Bevy 2D scenes.
//!
//! A burst bakes one small sprite per color × shape × layer combination,
//! sprays them from a spherical volume, pushes them around with two wave
//! forces and an attractor, then lets keyframed animations shut off spawning,
//! relax the attractor and ramp up gravity so the confetti falls away.
//!
//! ## Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_confetti::{ConfettiAnimation, ConfettiPlugin};
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(ConfettiPlugin)
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands) {
//!     commands.spawn(Camera2d);
//!     let surface = commands.spawn(Transform::default()).id();
//!
//!     let mut confetti = ConfettiAnimation::default();
//!     confetti.config.emitter_position = Vec2::new(0.0, 200.0);
//!     confetti.attach_target(surface);
//!     confetti.blast_confetti(&mut commands).ok();
//! }
//! ```

pub mod animation;
pub mod builder;
pub mod config;
pub mod controller;
pub mod curve;
pub mod data;
pub mod error;
pub mod forces;
pub mod simulation;
pub mod sprite;

// Re-export core types
pub use config::{ConfettiConfig, ParticleSizes};
pub use controller::{BlastConfetti, ConfettiAnimation};
pub use curve::{Curve, CurveKey, Interp};
pub use data::*;
pub use error::{ConfettiError, SpriteError};
pub use forces::{Attractor, ForceField, WaveForce};
pub use simulation::{ConfettiFinished, ConfettiParticleSprite, ConfettiState};

use bevy::prelude::*;

/// Registers confetti types, the `BlastConfetti` message and the simulation
/// systems.
pub struct ConfettiPlugin;

impl Plugin for ConfettiPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<ConfettiConfig>()
            .register_type::<ParticleSizes>()
            .register_type::<ConfettiShape>()
            .register_type::<LayerPosition>()
            .register_type::<ParticleVariant>()
            .register_type::<SpawnShape>()
            .register_type::<ForceField>()
            .register_type::<WaveForce>()
            .register_type::<Attractor>()
            .register_type::<Curve<f32>>()
            .register_type::<CurveKey<f32>>()
            .register_type::<Interp>()
            .add_message::<BlastConfetti>()
            .add_systems(
                Update,
                (
                    controller::handle_blast_messages,
                    simulation::prepare_confetti_sessions,
                    simulation::advance_confetti,
                    simulation::sync_confetti_sprites,
                )
                    .chain(),
            );
    }
}
