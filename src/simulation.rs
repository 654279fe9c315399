//! CPU-side confetti simulation.
//!
//! Bursts are small (tens to a few hundred pieces), so every particle is a
//! plain struct stepped on the CPU and mirrored by one `Sprite` child entity.
//! `step` holds the whole integrator and has no ECS dependencies; the systems
//! below only feed it time and keep the sprite entities in sync.

use std::f32::consts::TAU;
use std::ops::Range;

use bevy::prelude::*;

use crate::animation;
use crate::data::*;

/// Longest step fed to the integrator. Longer frames are clamped so a hitch
/// cannot fling particles out of the attractor.
pub const MAX_STEP: f32 = 0.1;

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Live particles and spawn bookkeeping for one session.
#[derive(Component, Default)]
pub struct ConfettiState {
    /// Seconds since the session started.
    pub elapsed: f32,
    /// Fractional spawn accumulator per cell.
    pub accumulators: Vec<f32>,
    pub particles: Vec<ConfettiParticle>,
    pub spawned_total: u32,
}

/// A single simulated confetti piece.
#[derive(Clone, Debug)]
pub struct ConfettiParticle {
    /// Index into `EmissionSession::cells`.
    pub cell: usize,
    pub position: Vec3,
    pub velocity: Vec3,
    pub age: f32,
    pub lifetime: f32,
    pub orientation: Quat,
    pub spin_axis: Vec3,
    /// Radians per second.
    pub spin: f32,
    /// Private offset so wave forces do not move every piece in lockstep.
    pub wave_phase: f32,
    /// Draw depth taken from the cell's layer position.
    pub depth: f32,
    /// Sprite entity mirroring this particle, once spawned.
    pub entity: Option<Entity>,
}

/// Texture handles for a session's cells, indexed like `EmissionSession::cells`.
#[derive(Component, Default)]
pub struct ConfettiSprites(pub Vec<Handle<Image>>);

/// Marker for sprite entities owned by a session.
#[derive(Component)]
pub struct ConfettiParticleSprite;

/// Inserted once a session has stopped emitting and every particle expired.
/// The session entity itself is left for the surface owner to remove.
#[derive(Component)]
pub struct ConfettiFinished;

impl ConfettiState {
    /// Fresh state with randomized accumulators, so a cell whose total output
    /// is below one particle still emits with the matching probability.
    pub fn new(session: &EmissionSession) -> Self {
        Self {
            elapsed: 0.0,
            accumulators: session.cells.iter().map(|_| fastrand::f32()).collect(),
            particles: Vec::new(),
            spawned_total: 0,
        }
    }
}

/// What a single `step` changed.
#[derive(Debug, Default)]
pub struct StepOutcome {
    /// Indices into `ConfettiState::particles` of particles born this step.
    pub spawned: Range<usize>,
    /// Particles that reached the end of their lifetime.
    pub expired: Vec<ConfettiParticle>,
}

// ---------------------------------------------------------------------------
// Integrator
// ---------------------------------------------------------------------------

/// Advance a session by `dt` seconds: age and move live particles, drop
/// expired ones, then spawn this step's newborns.
pub fn step(session: &EmissionSession, state: &mut ConfettiState, dt: f32) -> StepOutcome {
    let t = state.elapsed;
    let frame = animation::evaluate(session, t);
    if state.accumulators.len() != session.cells.len() {
        state.accumulators.resize(session.cells.len(), 0.0);
    }

    let mut expired = Vec::new();
    let mut i = 0;
    while i < state.particles.len() {
        let p = &mut state.particles[i];
        p.age += dt;
        if p.age >= p.lifetime {
            expired.push(state.particles.swap_remove(i));
            continue;
        }

        let gravity = frame.gravity.get(p.cell).copied().unwrap_or(0.0);
        let mut accel = Vec3::NEG_Y * gravity;
        for behavior in &frame.behaviors {
            accel += behavior.acceleration(p.position, t, p.wave_phase);
        }
        p.velocity += accel * dt;
        p.position += p.velocity * dt;
        let spin = Quat::from_axis_angle(p.spin_axis, p.spin * dt);
        p.orientation = (spin * p.orientation).normalize();
        i += 1;
    }

    let first_new = state.particles.len();
    if frame.birth_rate > 0.0 {
        for (ci, cell) in session.cells.iter().enumerate() {
            if t < cell.begin_time {
                continue;
            }
            let acc = &mut state.accumulators[ci];
            *acc += cell.birth_rate * frame.birth_rate * dt;
            let count = *acc as u32;
            *acc -= count as f32;
            for _ in 0..count {
                state.particles.push(spawn_particle(session, ci, cell));
            }
            state.spawned_total += count;
        }
    }

    state.elapsed += dt;
    StepOutcome {
        spawned: first_new..state.particles.len(),
        expired,
    }
}

/// True once the session can never produce another visible particle.
pub fn is_finished(session: &EmissionSession, state: &ConfettiState) -> bool {
    state.particles.is_empty()
        && animation::emission_end(session).is_some_and(|end| state.elapsed > end)
}

fn spawn_particle(
    session: &EmissionSession,
    cell_index: usize,
    cell: &EmitterCell,
) -> ConfettiParticle {
    let offset = match session.spawn_shape {
        SpawnShape::Point => Vec3::ZERO,
        // Cube root keeps the density uniform through the volume.
        SpawnShape::Sphere => {
            random_unit_sphere() * session.spawn_radius * fastrand::f32().cbrt()
        }
    };

    let speed = cell.velocity + signed_unit() * cell.velocity_range;
    let direction = random_cone(Vec3::X, cell.emission_range * 0.5);

    let base = Quat::from_euler(
        EulerRot::YXZ,
        cell.orientation_longitude,
        cell.orientation_latitude,
        0.0,
    );
    let jitter = Quat::from_axis_angle(
        random_unit_sphere(),
        signed_unit() * cell.orientation_range * 0.5,
    );

    ConfettiParticle {
        cell: cell_index,
        position: session.origin.extend(0.0) + offset,
        velocity: direction * speed,
        age: 0.0,
        lifetime: cell.lifetime,
        orientation: (jitter * base).normalize(),
        spin_axis: random_unit_sphere(),
        spin: cell.spin + signed_unit() * cell.spin_range,
        wave_phase: fastrand::f32() * TAU,
        depth: cell.variant.position.depth(),
        entity: None,
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Upload cell sprites and attach simulation state to new sessions.
pub fn prepare_confetti_sessions(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    query: Query<(Entity, &EmissionSession), Without<ConfettiState>>,
) {
    for (entity, session) in &query {
        let handles: Vec<Handle<Image>> = session
            .cells
            .iter()
            .map(|cell| images.add(cell.sprite.to_image()))
            .collect();
        debug!("Confetti session {:?}: uploaded {} sprites", entity, handles.len());
        commands
            .entity(entity)
            .insert((ConfettiState::new(session), ConfettiSprites(handles)));
    }
}

/// Step every running session and spawn/despawn sprite entities to match.
pub fn advance_confetti(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<
        (Entity, &EmissionSession, &mut ConfettiState, &ConfettiSprites),
        Without<ConfettiFinished>,
    >,
) {
    let dt = time.delta_secs().min(MAX_STEP);
    if dt <= 0.0 {
        return;
    }

    for (entity, session, mut state, sprites) in &mut query {
        let outcome = step(session, &mut state, dt);

        for p in &outcome.expired {
            if let Some(e) = p.entity {
                commands.entity(e).try_despawn();
            }
        }

        for i in outcome.spawned {
            let p = &mut state.particles[i];
            let Some(image) = sprites.0.get(p.cell) else {
                continue;
            };
            let child = commands
                .spawn((
                    ConfettiParticleSprite,
                    Sprite::from_image(image.clone()),
                    Transform::from_translation(p.position.truncate().extend(p.depth))
                        .with_rotation(p.orientation),
                ))
                .id();
            commands.entity(entity).add_child(child);
            p.entity = Some(child);
        }

        if is_finished(session, &state) {
            debug!(
                "Confetti session {:?} finished after {:.2}s ({} particles)",
                entity, state.elapsed, state.spawned_total
            );
            commands.entity(entity).insert(ConfettiFinished);
        }
    }
}

/// Write simulated positions and orientations to the sprite transforms.
pub fn sync_confetti_sprites(
    query: Query<&ConfettiState>,
    mut transforms: Query<&mut Transform, With<ConfettiParticleSprite>>,
) {
    for state in &query {
        for p in &state.particles {
            let Some(entity) = p.entity else {
                continue;
            };
            if let Ok(mut transform) = transforms.get_mut(entity) {
                transform.translation = p.position.truncate().extend(p.depth);
                transform.rotation = p.orientation;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Uniform in [-1, 1).
fn signed_unit() -> f32 {
    fastrand::f32() * 2.0 - 1.0
}

fn random_unit_sphere() -> Vec3 {
    loop {
        let v = Vec3::new(signed_unit(), signed_unit(), signed_unit());
        let len_sq = v.length_squared();
        if len_sq > 0.001 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

fn random_cone(direction: Vec3, half_angle: f32) -> Vec3 {
    let dir = direction.normalize_or_zero();
    if dir.length_squared() < 0.001 {
        return random_unit_sphere();
    }

    let up = if dir.y.abs() < 0.99 { Vec3::Y } else { Vec3::X };
    let right = dir.cross(up).normalize();
    let up2 = right.cross(dir).normalize();

    let angle = fastrand::f32() * TAU;
    let cos_theta = 1.0 - fastrand::f32() * (1.0 - half_angle.cos());
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

    (dir * cos_theta + right * sin_theta * angle.cos() + up2 * sin_theta * angle.sin()).normalize()
}
