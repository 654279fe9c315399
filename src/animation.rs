//! Time-keyed parameter animations that make a burst die out.
//!
//! Three families are scheduled per burst, all relative to session start:
//! a front-loaded birth-rate decay, an ease-out decay of the attractor's
//! stiffness, and a gravity ramp applied to every cell by name.

use std::collections::HashMap;

use crate::curve::{Curve, Interp};
use crate::data::{EmissionSession, EmitterCell};
use crate::forces::{ATTRACTOR_NAME, ForceField};

/// Extra seconds the stiffness decay runs past the birth window.
pub const STIFFNESS_EXTRA_SECONDS: f32 = 2.0;
/// Extra seconds the gravity ramp runs past the birth window.
pub const GRAVITY_EXTRA_SECONDS: f32 = 3.0;

/// Session parameter an animation drives.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamPath {
    /// Session-wide birth-rate multiplier.
    SessionBirthRate,
    /// Stiffness of the named attractor.
    BehaviorStiffness(String),
    /// Downward acceleration of the named cell.
    CellGravity(String),
}

/// What happens to the parameter once the animation's duration has elapsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FillMode {
    /// Keep the curve's final value.
    #[default]
    Hold,
    /// Drop the animation; the parameter returns to its model value.
    Removed,
}

/// A curve bound to a parameter, stretched over `duration` seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamAnimation {
    pub path: ParamPath,
    pub duration: f32,
    pub curve: Curve<f32>,
    pub fill: FillMode,
}

impl ParamAnimation {
    pub fn new(path: ParamPath, duration: f32, curve: Curve<f32>) -> Self {
        Self {
            path,
            duration,
            curve,
            fill: FillMode::default(),
        }
    }

    pub fn with_fill(mut self, fill: FillMode) -> Self {
        self.fill = fill;
        self
    }

    /// Curve value `elapsed` seconds after start, clamped to the curve's span.
    pub fn sample(&self, elapsed: f32) -> f32 {
        if self.duration <= 0.0 {
            return self.curve.sample(1.0);
        }
        self.curve.sample(elapsed / self.duration)
    }

    /// Value the animation imposes at `elapsed`, or `None` if it imposes
    /// nothing (not started yet, or finished with `FillMode::Removed`).
    pub fn value_at(&self, elapsed: f32) -> Option<f32> {
        if elapsed < 0.0 {
            return None;
        }
        if elapsed <= self.duration {
            return Some(self.sample(elapsed));
        }
        match self.fill {
            FillMode::Hold => Some(self.curve.sample(1.0)),
            FillMode::Removed => None,
        }
    }
}

/// Stiffness 20 easing out to 5 by 40% of `birth_duration + 2`, then held.
pub fn attractor_stiffness_decay(birth_duration: f32) -> ParamAnimation {
    ParamAnimation::new(
        ParamPath::BehaviorStiffness(ATTRACTOR_NAME.to_string()),
        birth_duration + STIFFNESS_EXTRA_SECONDS,
        Curve::keyframes(&[(0.0, 20.0), (0.4, 5.0)], Interp::EaseOut),
    )
}

/// Linear decay from `birth_duration` to zero over `birth_duration` seconds.
pub fn birth_rate_decay(birth_duration: f32) -> ParamAnimation {
    ParamAnimation::new(
        ParamPath::SessionBirthRate,
        birth_duration,
        Curve::linear(birth_duration, 0.0),
    )
}

/// Downward acceleration ramp 10 → 250 → 500 → 1000 over `birth_duration + 3`.
pub fn gravity_ramp(cell_name: &str, birth_duration: f32) -> ParamAnimation {
    ParamAnimation::new(
        ParamPath::CellGravity(cell_name.to_string()),
        birth_duration + GRAVITY_EXTRA_SECONDS,
        Curve::keyframes(
            &[(0.05, 10.0), (0.25, 250.0), (0.5, 500.0), (1.0, 1000.0)],
            Interp::Linear,
        ),
    )
}

/// Every animation a burst over `cells` needs.
pub fn schedule(cells: &[EmitterCell], birth_duration: f32) -> Vec<ParamAnimation> {
    let mut animations = Vec::with_capacity(cells.len() + 2);
    animations.push(attractor_stiffness_decay(birth_duration));
    animations.push(birth_rate_decay(birth_duration));
    animations.extend(cells.iter().map(|cell| gravity_ramp(&cell.name, birth_duration)));
    animations
}

/// Session parameters with every active animation applied.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionFrame {
    pub birth_rate: f32,
    pub behaviors: Vec<ForceField>,
    /// Downward acceleration per cell, indexed like `EmissionSession::cells`.
    pub gravity: Vec<f32>,
}

/// Resolve the session's animated parameters `elapsed` seconds after start.
pub fn evaluate(session: &EmissionSession, elapsed: f32) -> SessionFrame {
    let mut frame = SessionFrame {
        birth_rate: session.birth_rate,
        behaviors: session.behaviors.clone(),
        gravity: session.cells.iter().map(|c| c.gravity).collect(),
    };
    let cell_lookup: HashMap<&str, usize> = session
        .cells
        .iter()
        .enumerate()
        .map(|(i, c)| (c.name.as_str(), i))
        .collect();

    for animation in &session.animations {
        let Some(value) = animation.value_at(elapsed) else {
            continue;
        };
        match &animation.path {
            ParamPath::SessionBirthRate => frame.birth_rate = value,
            ParamPath::BehaviorStiffness(name) => {
                for behavior in &mut frame.behaviors {
                    if let ForceField::Attractor(a) = behavior {
                        if a.name == *name {
                            a.stiffness = value;
                        }
                    }
                }
            }
            ParamPath::CellGravity(name) => {
                if let Some(&i) = cell_lookup.get(name.as_str()) {
                    frame.gravity[i] = value;
                }
            }
        }
    }

    frame
}

/// Seconds after start when the session stops spawning, or `None` if it never
/// does.
pub fn emission_end(session: &EmissionSession) -> Option<f32> {
    let birth_animations: Vec<&ParamAnimation> = session
        .animations
        .iter()
        .filter(|a| a.path == ParamPath::SessionBirthRate)
        .collect();

    let settles_at_zero = |a: &&ParamAnimation| match a.fill {
        FillMode::Hold => a.curve.sample(1.0) <= 0.0,
        FillMode::Removed => session.birth_rate <= 0.0,
    };

    if birth_animations.is_empty() {
        return (session.birth_rate <= 0.0).then_some(0.0);
    }
    if !birth_animations.iter().all(settles_at_zero) {
        return None;
    }
    Some(birth_animations.iter().map(|a| a.duration).fold(0.0, f32::max))
}

#[cfg(test)]
mod tests {
    use bevy::prelude::default;

    use super::*;
    use crate::builder::build_session;
    use crate::config::ConfettiConfig;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn birth_rate_decays_to_zero() {
        let anim = birth_rate_decay(1.0);
        assert_eq!(anim.duration, 1.0);
        assert!(approx(anim.sample(0.0), 1.0));
        assert!(approx(anim.sample(0.5), 0.5));
        assert!(approx(anim.sample(1.0), 0.0));

        let long = birth_rate_decay(2.5);
        assert!(approx(long.sample(0.0), 2.5));
        assert!(approx(long.sample(2.5), 0.0));
    }

    #[test]
    fn gravity_ramp_hits_every_key() {
        let anim = gravity_ramp("any", 1.0);
        let d = anim.duration;
        assert!(approx(anim.sample(0.05 * d), 10.0));
        assert!(approx(anim.sample(0.25 * d), 250.0));
        assert!(approx(anim.sample(0.5 * d), 500.0));
        assert!(approx(anim.sample(d), 1000.0));
        // Held at the first key before it is reached.
        assert!(approx(anim.sample(0.0), 10.0));
    }

    #[test]
    fn spans_follow_birth_duration() {
        assert!(approx(attractor_stiffness_decay(1.0).duration, 3.0));
        assert!(approx(gravity_ramp("cell", 1.0).duration, 4.0));
        assert!(approx(birth_rate_decay(1.0).duration, 1.0));
    }

    #[test]
    fn stiffness_eases_out_then_holds() {
        let anim = attractor_stiffness_decay(1.0);
        assert!(approx(anim.sample(0.0), 20.0));
        assert!(approx(anim.sample(1.2), 5.0));
        assert!(approx(anim.sample(2.5), 5.0));
        // Ease-out: more than halfway down at the middle of the segment.
        assert!(anim.sample(0.6) < 12.5);
    }

    #[test]
    fn keys_are_well_formed() {
        for anim in [
            attractor_stiffness_decay(1.0),
            birth_rate_decay(1.0),
            gravity_ramp("c", 1.0),
        ] {
            assert!(anim.curve.is_well_formed(), "{:?}", anim.path);
        }
    }

    #[test]
    fn fill_mode_controls_value_after_end() {
        let held = gravity_ramp("c", 1.0);
        assert_eq!(held.value_at(10.0), Some(1000.0));
        let removed = gravity_ramp("c", 1.0).with_fill(FillMode::Removed);
        assert_eq!(removed.value_at(10.0), None);
        assert_eq!(removed.value_at(4.0), Some(1000.0));
        assert_eq!(removed.value_at(-0.1), None);
    }

    #[test]
    fn schedule_targets_every_cell_by_name() {
        let session = build_session(&ConfettiConfig::default()).unwrap();
        let gravity_paths: Vec<&ParamPath> = session
            .animations
            .iter()
            .filter(|a| matches!(a.path, ParamPath::CellGravity(_)))
            .map(|a| &a.path)
            .collect();
        assert_eq!(gravity_paths.len(), session.cells.len());
        for cell in &session.cells {
            assert!(gravity_paths.contains(&&ParamPath::CellGravity(cell.name.clone())));
        }
    }

    #[test]
    fn evaluate_applies_animations() {
        let session = build_session(&ConfettiConfig::default()).unwrap();
        assert_eq!(session.birth_rate, 0.0);

        let start = evaluate(&session, 0.0);
        assert!(approx(start.birth_rate, 1.0));
        assert!(start.gravity.iter().all(|&g| approx(g, 10.0)));
        let stiffness = start.behaviors.iter().find_map(|b| match b {
            ForceField::Attractor(a) => Some(a.stiffness),
            _ => None,
        });
        assert_eq!(stiffness, Some(20.0));

        let end = evaluate(&session, 4.0);
        assert!(approx(end.birth_rate, 0.0));
        assert!(end.gravity.iter().all(|&g| approx(g, 1000.0)));
    }

    #[test]
    fn emission_end_tracks_birth_rate_animation() {
        let session = build_session(&ConfettiConfig {
            birth_animation_duration: 2.0,
            ..default()
        })
        .unwrap();
        assert_eq!(emission_end(&session), Some(2.0));

        let mut endless = session.clone();
        endless.animations.clear();
        endless.birth_rate = 1.0;
        assert_eq!(emission_end(&endless), None);
    }
}
