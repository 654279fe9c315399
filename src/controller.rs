//! Burst triggering: attach a session to a target surface and let it run.

use bevy::prelude::*;

use crate::builder;
use crate::config::ConfettiConfig;
use crate::data::EmissionSession;
use crate::error::ConfettiError;

/// A confetti effect bound to one target surface.
///
/// Edit `config` freely between bursts; each `blast_confetti` call snapshots
/// it into a brand new session.
#[derive(Clone, Debug, Default)]
pub struct ConfettiAnimation {
    pub config: ConfettiConfig,
    target: Option<Entity>,
}

impl ConfettiAnimation {
    pub fn new(config: ConfettiConfig) -> Self {
        Self {
            config,
            target: None,
        }
    }

    /// Entity whose local space the burst plays in. Any entity with a
    /// `Transform` works: a 2D scene root, a sprite, a camera-anchored node.
    pub fn attach_target(&mut self, surface: Entity) {
        self.target = Some(surface);
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    /// Build the session without attaching it anywhere.
    pub fn build_session(&self) -> Result<EmissionSession, ConfettiError> {
        builder::build_session(&self.config)
    }

    /// Build a session and spawn it as a child of the target. Particles start
    /// appearing on the next simulation frame. Returns the session entity;
    /// despawn it to reclaim the burst early or once `ConfettiFinished` shows up.
    ///
    /// Nothing is spawned if the target is unset or already despawned.
    pub fn blast_confetti(&self, commands: &mut Commands) -> Result<Entity, ConfettiError> {
        let target = self.target.ok_or(ConfettiError::NoTarget)?;
        if commands.get_entity(target).is_err() {
            return Err(ConfettiError::TargetMissing(target));
        }
        let session = self.build_session()?;

        info!(
            "Blasting confetti on {:?}: {} cells, ~{:.0} particles",
            target,
            session.cells.len(),
            session.expected_particles(0.01).unwrap_or(f32::INFINITY)
        );

        let burst = commands
            .spawn((
                Name::new("Confetti Burst"),
                session,
                Transform::default(),
                Visibility::default(),
            ))
            .id();
        commands.entity(target).add_child(burst);
        Ok(burst)
    }
}

/// Request a burst on `target` using `config`.
#[derive(Message, Clone, Debug)]
pub struct BlastConfetti {
    pub target: Entity,
    pub config: ConfettiConfig,
}

pub(crate) fn handle_blast_messages(
    mut commands: Commands,
    mut messages: MessageReader<BlastConfetti>,
) {
    for message in messages.read() {
        let mut animation = ConfettiAnimation::new(message.config.clone());
        animation.attach_target(message.target);
        if let Err(err) = animation.blast_confetti(&mut commands) {
            warn!("Confetti blast on {:?} failed: {}", message.target, err);
        }
    }
}
