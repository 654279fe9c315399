//! Error types for sprite baking and burst setup.
//!
//! Every variant here is a configuration or environment problem. Nothing is
//! retried; callers either fix their input or drop the burst.

use bevy::prelude::Entity;
use thiserror::Error;

/// Failure while rasterizing a particle sprite.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpriteError {
    #[error("sprite size {width}x{height} has no area")]
    EmptySize { width: u32, height: u32 },
    #[error("sprite size {width}x{height} exceeds the {max}px limit")]
    TooLarge { width: u32, height: u32, max: u32 },
    #[error("star corner radius {0} must be finite and non-negative")]
    InvalidCornerRadius(f32),
}

/// Failure while building or attaching a confetti burst.
#[derive(Error, Debug)]
pub enum ConfettiError {
    #[error("no target surface attached; call attach_target first")]
    NoTarget,
    #[error("target surface {0} no longer exists")]
    TargetMissing(Entity),
    #[error("birth animation duration must be finite and positive, got {0}")]
    InvalidBirthDuration(f32),
    #[error("burst radius must be finite and non-negative, got {0}")]
    InvalidBurstRadius(f32),
    #[error("birth rate must be finite and within 0..={max}, got {rate}")]
    InvalidBirthRate { rate: f32, max: f32 },
    #[error("sprite rasterization failed: {0}")]
    Sprite(#[from] SpriteError),
    #[error("invalid confetti config: {0}")]
    Config(#[from] ron::error::SpannedError),
    #[error("failed to serialize confetti config: {0}")]
    Serialize(#[from] ron::Error),
    #[error("config i/o failed: {0}")]
    Io(#[from] std::io::Error),
}
