use thiserror::Error;

use crate::types::AttackKind;

/// A configuration value that breaks a simulation invariant.
///
/// Raised when a [`SimConfig`](crate::SimConfig) is built or loaded, never
/// while ticking.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("arena dimensions must be positive, got {width}x{height}")]
    ArenaSize { width: f32, height: f32 },
    #[error("body width {body_width} does not fit inside arena width {arena_width}")]
    BodyWiderThanArena { body_width: f32, arena_width: f32 },
    #[error("ground line {ground_y} must lie in ({body_height}, {arena_height}]")]
    GroundLine {
        ground_y: f32,
        body_height: f32,
        arena_height: f32,
    },
    #[error("crouch height {crouch} must lie in (0, {body}]")]
    CrouchHeight { crouch: f32, body: f32 },
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f32 },
    #[error("drag must lie in [0, 1], got {0}")]
    Drag(f32),
    #[error("{name} must be non-negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("{0:?} attack needs at least one startup frame")]
    NoStartupFrames(AttackKind),
    #[error("{0:?} attack has no active frames")]
    NoActiveFrames(AttackKind),
    #[error("max health must be positive, got {0}")]
    MaxHealth(f32),
    #[error("max steps must be at least 1")]
    MaxSteps,
    #[error("persistence range [{min}, {max}] is empty or starts at zero")]
    PersistenceRange { min: u32, max: u32 },
    #[error("personality weights must be non-negative with a positive sum, got {0:?}")]
    PersonalityWeights([f32; 4]),
    #[error("spawn margin {margin} plus jitter {jitter} leaves the arena")]
    SpawnPlacement { margin: f32, jitter: f32 },
    #[error("failed to parse config: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

/// Errors surfaced by the environment's public surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("invalid action {0}: expected 0..=8")]
    InvalidAction(i64),
    #[error("expected {expected} actions, got {got}")]
    BatchSize { expected: usize, got: usize },
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
}
