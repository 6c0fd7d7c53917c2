use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::{ArenaConfig, SimConfig};
use crate::error::SimError;
use crate::{ACTION_COUNT, OBS_SIZE};

/// Discrete player intent. The numeric encoding is part of the external
/// contract shared with the training loop and the real-time client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    #[default]
    Idle = 0,
    Left = 1,
    Right = 2,
    Jump = 3,
    Crouch = 4,
    Block = 5,
    Light = 6,
    Heavy = 7,
    Special = 8,
}

impl Action {
    pub const ALL: [Action; ACTION_COUNT] = [
        Action::Idle,
        Action::Left,
        Action::Right,
        Action::Jump,
        Action::Crouch,
        Action::Block,
        Action::Light,
        Action::Heavy,
        Action::Special,
    ];

    /// Decode a raw action index, rejecting anything outside `0..=8`.
    pub fn from_index(raw: i64) -> Result<Self, SimError> {
        usize::try_from(raw)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(SimError::InvalidAction(raw))
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Attack tier started by this action, if any.
    pub fn attack_kind(self) -> AttackKind {
        match self {
            Action::Light => AttackKind::Light,
            Action::Heavy => AttackKind::Heavy,
            Action::Special => AttackKind::Special,
            _ => AttackKind::None,
        }
    }
}

impl TryFrom<i64> for Action {
    type Error = SimError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Action::from_index(raw)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    #[default]
    None,
    Light,
    Heavy,
    Special,
}

/// Per-fighter mutable state. `attack_kind == None` iff `attack_timer == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterState {
    /// Top-left corner of the body rectangle.
    pub position: Vec2,
    pub velocity: Vec2,
    pub health: f32,
    pub stun_frames: u32,
    pub attack_kind: AttackKind,
    pub attack_timer: u32,
    /// Hit-guard: set once the current attack activation has connected.
    pub has_hit: bool,
    pub blocking: bool,
    pub crouching: bool,
}

impl FighterState {
    /// A neutral fighter standing at `x` on the ground line.
    pub fn new(x: f32, config: &SimConfig) -> Self {
        let arena = &config.arena;
        Self {
            position: Vec2::new(x, arena.ground_y - arena.body_height),
            velocity: Vec2::ZERO,
            health: config.combat.max_health,
            stun_frames: 0,
            attack_kind: AttackKind::None,
            attack_timer: 0,
            has_hit: false,
            blocking: false,
            crouching: false,
        }
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_frames > 0
    }

    pub fn is_attacking(&self) -> bool {
        self.attack_timer > 0
    }

    pub fn is_knocked_out(&self) -> bool {
        self.health <= 0.0
    }

    /// Body height for the current stance.
    pub fn height(&self, arena: &ArenaConfig) -> f32 {
        if self.crouching {
            arena.crouch_height
        } else {
            arena.body_height
        }
    }

    /// Y coordinate at which this fighter rests on the ground.
    pub fn floor_y(&self, arena: &ArenaConfig) -> f32 {
        arena.ground_y - self.height(arena)
    }

    pub fn is_grounded(&self, arena: &ArenaConfig) -> bool {
        self.position.y >= self.floor_y(arena)
    }

    /// Cancel any attack in progress.
    pub fn interrupt_attack(&mut self) {
        self.attack_kind = AttackKind::None;
        self.attack_timer = 0;
    }

    /// Put the fighter into hitstun: guard and crouch drop, any attack is
    /// cancelled.
    pub fn apply_stun(&mut self, frames: u32) {
        self.stun_frames = frames;
        self.blocking = false;
        self.crouching = false;
        self.interrupt_attack();
    }
}

/// Fixed-order observation vector, each entry pre-scaled to roughly [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub data: [f32; OBS_SIZE],
}

impl Observation {
    pub const DX: usize = 0;
    pub const DY: usize = 1;
    pub const HEALTH_SELF: usize = 2;
    pub const HEALTH_OPP: usize = 3;
    pub const VX_SELF: usize = 4;
    pub const VY_SELF: usize = 5;
    pub const VX_OPP: usize = 6;
    pub const VY_OPP: usize = 7;
    pub const STUNNED_SELF: usize = 8;
    pub const ATTACKING_SELF: usize = 9;
    pub const BLOCKING_SELF: usize = 10;
    pub const CROUCHING_SELF: usize = 11;
    pub const STUNNED_OPP: usize = 12;
    pub const ATTACKING_OPP: usize = 13;
    pub const BLOCKING_OPP: usize = 14;
    pub const CROUCHING_OPP: usize = 15;

    pub fn zeros() -> Self {
        Self {
            data: [0.0; OBS_SIZE],
        }
    }
}

impl serde::Serialize for Observation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.as_slice().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Observation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v: Vec<f32> = Vec::deserialize(deserializer)?;
        if v.len() != OBS_SIZE {
            return Err(serde::de::Error::custom(format!(
                "expected {} floats, got {}",
                OBS_SIZE,
                v.len()
            )));
        }
        let mut data = [0.0f32; OBS_SIZE];
        data.copy_from_slice(&v);
        Ok(Observation { data })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub tick: u32,
    pub fighters: [FighterSnapshot; 2],
    /// Reward credited to fighter 0 on this tick (0 for the initial frame).
    pub reward: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FighterSnapshot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub health: f32,
    pub stun_frames: u32,
    pub attack: AttackKind,
    pub attack_timer: u32,
    pub blocking: bool,
    pub crouching: bool,
}

impl From<&FighterState> for FighterSnapshot {
    fn from(s: &FighterState) -> Self {
        Self {
            x: s.position.x,
            y: s.position.y,
            vx: s.velocity.x,
            vy: s.velocity.y,
            health: s.health,
            stun_frames: s.stun_frames,
            attack: s.attack_kind,
            attack_timer: s.attack_timer,
            blocking: s.blocking,
            crouching: s.crouching,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    pub seed: u64,
    pub agent: String,
    pub opponent: String,
    pub config: SimConfig,
    pub frames: Vec<ReplayFrame>,
    pub result: EpisodeResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeResult {
    pub outcome: EpisodeOutcome,
    pub reason: EpisodeEndReason,
    pub final_tick: u32,
    pub total_reward: f32,
    pub stats: EpisodeStats,
}

/// Outcome from fighter 0's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeOutcome {
    AgentWin,
    OpponentWin,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeEndReason {
    Knockout,
    StepLimit,
}

/// Per-fighter combat counters, indexed by fighter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub attacks_started: [u32; 2],
    pub hits: [u32; 2],
    pub blocked: [u32; 2],
    pub damage_dealt: [f32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_decoding() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(Action::from_index(i as i64), Ok(*action));
            assert_eq!(action.index(), i);
        }
        assert_eq!(Action::from_index(9), Err(SimError::InvalidAction(9)));
        assert_eq!(Action::from_index(-1), Err(SimError::InvalidAction(-1)));
        assert!(Action::try_from(42i64).is_err());
    }

    #[test]
    fn test_attack_kind_for_action() {
        assert_eq!(Action::Light.attack_kind(), AttackKind::Light);
        assert_eq!(Action::Heavy.attack_kind(), AttackKind::Heavy);
        assert_eq!(Action::Special.attack_kind(), AttackKind::Special);
        assert_eq!(Action::Block.attack_kind(), AttackKind::None);
    }

    #[test]
    fn test_new_fighter_is_neutral_and_grounded() {
        let config = SimConfig::default();
        let f = FighterState::new(200.0, &config);
        assert_eq!(f.health, config.combat.max_health);
        assert!(!f.is_stunned());
        assert!(!f.is_attacking());
        assert!(f.is_grounded(&config.arena));
        assert_eq!(f.position.y, config.arena.ground_y - config.arena.body_height);
    }

    #[test]
    fn test_stun_drops_guard_and_stance() {
        let config = SimConfig::default();
        let mut f = FighterState::new(100.0, &config);
        f.blocking = true;
        f.crouching = true;
        f.attack_kind = AttackKind::Heavy;
        f.attack_timer = 10;

        f.apply_stun(35);
        assert_eq!(f.stun_frames, 35);
        assert!(!f.blocking && !f.crouching);
        assert!(!f.is_attacking());
        assert_eq!(f.attack_kind, AttackKind::None);
    }

    #[test]
    fn test_crouch_changes_height() {
        let config = SimConfig::default();
        let mut f = FighterState::new(200.0, &config);
        f.crouching = true;
        assert_eq!(f.height(&config.arena), config.arena.crouch_height);
        assert_eq!(f.floor_y(&config.arena), config.arena.ground_y - config.arena.crouch_height);
    }

    #[test]
    fn test_observation_rejects_wrong_length() {
        let bad: Result<Observation, _> = serde_json::from_str("[0.0, 1.0]");
        assert!(bad.is_err());

        let obs = Observation::zeros();
        let json = serde_json::to_string(&obs).unwrap();
        let back: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, obs);
    }
}
