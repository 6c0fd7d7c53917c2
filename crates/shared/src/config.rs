use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;
use crate::types::AttackKind;

/// Complete set of tunables shared by the training-side simulator and any
/// separately implemented client. Two implementations agree on behavior
/// only if they agree on every field here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub arena: ArenaConfig,
    pub movement: MovementConfig,
    pub combat: CombatConfig,
    pub reward: RewardWeights,
    pub opponent: OpponentConfig,
    pub episode: EpisodeConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    pub ground_y: f32,
    pub body_width: f32,
    pub body_height: f32,
    pub crouch_height: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            ground_y: GROUND_Y,
            body_width: BODY_WIDTH,
            body_height: BODY_HEIGHT,
            crouch_height: CROUCH_HEIGHT,
        }
    }
}

impl ArenaConfig {
    /// Largest legal x for a fighter's left edge.
    pub fn max_x(&self) -> f32 {
        self.width - self.body_width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub walk_speed: f32,
    /// Vertical velocity applied on jump; negative because y grows downward.
    pub jump_impulse: f32,
    pub gravity: f32,
    /// Per-tick horizontal velocity multiplier.
    pub drag: f32,
    /// Horizontal speeds below this snap to zero.
    pub velocity_epsilon: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: WALK_SPEED,
            jump_impulse: JUMP_IMPULSE,
            gravity: GRAVITY,
            drag: DRAG,
            velocity_epsilon: VELOCITY_EPSILON,
        }
    }
}

/// Frame data and effects of one attack tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackTier {
    pub startup: u32,
    pub active: u32,
    pub recovery: u32,
    pub damage: f32,
    pub stun: u32,
    pub reach_bonus: f32,
    pub knockback_victim: f32,
    pub knockback_attacker: f32,
}

impl AttackTier {
    fn from_table(phases: [u32; 3], damage: f32, stun: u32, reach_bonus: f32) -> Self {
        Self {
            startup: phases[0],
            active: phases[1],
            recovery: phases[2],
            damage,
            stun,
            reach_bonus,
            knockback_victim: KNOCKBACK_VICTIM,
            knockback_attacker: KNOCKBACK_ATTACKER,
        }
    }

    /// Total ticks from activation until the fighter is free again.
    pub fn duration(&self) -> u32 {
        self.startup + self.active + self.recovery
    }

    /// Whether `elapsed` ticks since activation falls in `[startup, startup + active)`.
    pub fn is_active_at(&self, elapsed: u32) -> bool {
        elapsed >= self.startup && elapsed < self.startup + self.active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierTable {
    pub light: AttackTier,
    pub heavy: AttackTier,
    pub special: AttackTier,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            light: AttackTier::from_table(LIGHT_PHASES, LIGHT_DAMAGE, LIGHT_STUN, LIGHT_REACH_BONUS),
            heavy: AttackTier::from_table(HEAVY_PHASES, HEAVY_DAMAGE, HEAVY_STUN, HEAVY_REACH_BONUS),
            special: AttackTier::from_table(
                SPECIAL_PHASES,
                SPECIAL_DAMAGE,
                SPECIAL_STUN,
                SPECIAL_REACH_BONUS,
            ),
        }
    }
}

impl TierTable {
    pub fn get(&self, kind: AttackKind) -> Option<&AttackTier> {
        match kind {
            AttackKind::None => None,
            AttackKind::Light => Some(&self.light),
            AttackKind::Heavy => Some(&self.heavy),
            AttackKind::Special => Some(&self.special),
        }
    }

    fn iter(&self) -> impl Iterator<Item = (AttackKind, &AttackTier)> {
        [
            (AttackKind::Light, &self.light),
            (AttackKind::Heavy, &self.heavy),
            (AttackKind::Special, &self.special),
        ]
        .into_iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub max_health: f32,
    pub base_reach: f32,
    pub tiers: TierTable,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            max_health: MAX_HEALTH,
            base_reach: BASE_REACH,
            tiers: TierTable::default(),
        }
    }
}

impl CombatConfig {
    /// Horizontal reach of an attack of the given tier.
    pub fn reach(&self, tier: &AttackTier) -> f32 {
        self.base_reach + tier.reach_bonus
    }
}

/// Historical reward weightings. Runs trained under one preset must not be
/// compared against another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardPreset {
    /// First training environment: health deltas and terminal bonus only.
    V1,
    /// Shaped reward with approach, efficiency and corner terms.
    V2,
}

impl RewardPreset {
    pub fn weights(self) -> RewardWeights {
        match self {
            RewardPreset::V1 => RewardWeights {
                damage_dealt: 1.0,
                damage_taken: 1.5,
                approach: 0.0,
                efficiency: 0.0,
                corner_penalty: 0.0,
                corner_margin: 0.0,
                win_bonus: 10.0,
                loss_penalty: 5.0,
            },
            RewardPreset::V2 => RewardWeights {
                damage_dealt: 40.0,
                damage_taken: 10.0,
                approach: 10.0,
                efficiency: 0.01,
                corner_penalty: 0.05,
                corner_margin: 50.0,
                win_bonus: 100.0,
                loss_penalty: 50.0,
            },
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "v1" => Some(RewardPreset::V1),
            "v2" => Some(RewardPreset::V2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardWeights {
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub approach: f32,
    /// Flat per-tick cost.
    pub efficiency: f32,
    pub corner_penalty: f32,
    /// Distance from either wall under which the corner penalty applies.
    pub corner_margin: f32,
    pub win_bonus: f32,
    pub loss_penalty: f32,
}

impl Default for RewardWeights {
    fn default() -> Self {
        RewardPreset::V2.weights()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentConfig {
    /// Sampling weights for aggressive, defensive, random, passive.
    pub personality_weights: [f32; 4],
    pub persistence_min: u32,
    pub persistence_max: u32,
    /// Aggressive opponents walk in until closer than this.
    pub approach_distance: f32,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self {
            personality_weights: PERSONALITY_WEIGHTS,
            persistence_min: PERSISTENCE_MIN,
            persistence_max: PERSISTENCE_MAX,
            approach_distance: APPROACH_DISTANCE,
        }
    }
}

/// How out-of-range raw actions are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvalidActionMode {
    #[default]
    Reject,
    /// Legacy behavior: anything outside 0..=8 acts as Idle.
    TreatAsIdle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeConfig {
    pub max_steps: u32,
    /// Fighter 0's minimum distance from the left wall at spawn.
    pub spawn_margin: f32,
    /// Random extra offset added to the spawn margin; fighter 1 mirrors it.
    pub spawn_jitter: f32,
    pub invalid_actions: InvalidActionMode,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            max_steps: MAX_STEPS,
            spawn_margin: SPAWN_MARGIN,
            spawn_jitter: SPAWN_JITTER,
            invalid_actions: InvalidActionMode::Reject,
        }
    }
}

fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative { name, value });
    }
    Ok(())
}

impl SimConfig {
    /// Parse a (possibly partial) JSON override and validate the result.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> String {
        // Plain data with no maps or non-string keys: serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn with_reward_preset(mut self, preset: RewardPreset) -> Self {
        self.reward = preset.weights();
        self
    }

    /// Check every invariant the tick pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.arena;
        finite("arena.width", a.width)?;
        finite("arena.height", a.height)?;
        if a.width <= 0.0 || a.height <= 0.0 {
            return Err(ConfigError::ArenaSize {
                width: a.width,
                height: a.height,
            });
        }
        finite("arena.body_width", a.body_width)?;
        if a.body_width <= 0.0 || a.body_width >= a.width {
            return Err(ConfigError::BodyWiderThanArena {
                body_width: a.body_width,
                arena_width: a.width,
            });
        }
        finite("arena.ground_y", a.ground_y)?;
        finite("arena.body_height", a.body_height)?;
        if a.body_height <= 0.0 || a.ground_y <= a.body_height || a.ground_y > a.height {
            return Err(ConfigError::GroundLine {
                ground_y: a.ground_y,
                body_height: a.body_height,
                arena_height: a.height,
            });
        }
        finite("arena.crouch_height", a.crouch_height)?;
        if a.crouch_height <= 0.0 || a.crouch_height > a.body_height {
            return Err(ConfigError::CrouchHeight {
                crouch: a.crouch_height,
                body: a.body_height,
            });
        }

        let m = &self.movement;
        non_negative("movement.walk_speed", m.walk_speed)?;
        finite("movement.jump_impulse", m.jump_impulse)?;
        non_negative("movement.gravity", m.gravity)?;
        non_negative("movement.velocity_epsilon", m.velocity_epsilon)?;
        finite("movement.drag", m.drag)?;
        if !(0.0..=1.0).contains(&m.drag) {
            return Err(ConfigError::Drag(m.drag));
        }

        let c = &self.combat;
        finite("combat.max_health", c.max_health)?;
        if c.max_health <= 0.0 {
            return Err(ConfigError::MaxHealth(c.max_health));
        }
        non_negative("combat.base_reach", c.base_reach)?;
        for (kind, tier) in c.tiers.iter() {
            // Combat first sees a new attack at elapsed == 1
            if tier.startup == 0 {
                return Err(ConfigError::NoStartupFrames(kind));
            }
            if tier.active == 0 {
                return Err(ConfigError::NoActiveFrames(kind));
            }
            non_negative("combat.tiers.damage", tier.damage)?;
            non_negative("combat.tiers.reach_bonus", tier.reach_bonus)?;
            non_negative("combat.tiers.knockback_victim", tier.knockback_victim)?;
            non_negative("combat.tiers.knockback_attacker", tier.knockback_attacker)?;
        }

        let r = &self.reward;
        for (name, value) in [
            ("reward.damage_dealt", r.damage_dealt),
            ("reward.damage_taken", r.damage_taken),
            ("reward.approach", r.approach),
            ("reward.efficiency", r.efficiency),
            ("reward.corner_penalty", r.corner_penalty),
            ("reward.win_bonus", r.win_bonus),
            ("reward.loss_penalty", r.loss_penalty),
        ] {
            finite(name, value)?;
        }
        non_negative("reward.corner_margin", r.corner_margin)?;

        let o = &self.opponent;
        if o.persistence_min == 0 || o.persistence_min > o.persistence_max {
            return Err(ConfigError::PersistenceRange {
                min: o.persistence_min,
                max: o.persistence_max,
            });
        }
        let weights_ok = o
            .personality_weights
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0)
            && o.personality_weights.iter().sum::<f32>() > 0.0;
        if !weights_ok {
            return Err(ConfigError::PersonalityWeights(o.personality_weights));
        }
        non_negative("opponent.approach_distance", o.approach_distance)?;

        let e = &self.episode;
        if e.max_steps == 0 {
            return Err(ConfigError::MaxSteps);
        }
        non_negative("episode.spawn_margin", e.spawn_margin)?;
        non_negative("episode.spawn_jitter", e.spawn_jitter)?;
        if e.spawn_margin + e.spawn_jitter > a.max_x() {
            return Err(ConfigError::SpawnPlacement {
                margin: e.spawn_margin,
                jitter: e.spawn_jitter,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_tier_durations() {
        let tiers = TierTable::default();
        assert_eq!(tiers.light.duration(), 22);
        assert_eq!(tiers.heavy.duration(), 38);
        assert_eq!(tiers.special.duration(), 60);
    }

    #[test]
    fn test_active_window_bounds() {
        let light = TierTable::default().light;
        assert!(!light.is_active_at(3));
        assert!(light.is_active_at(4));
        assert!(light.is_active_at(9));
        assert!(!light.is_active_at(10));
    }

    #[test]
    fn test_reach_includes_tier_bonus() {
        let combat = CombatConfig::default();
        assert_eq!(combat.reach(&combat.tiers.light), 90.0);
        assert_eq!(combat.reach(&combat.tiers.heavy), 110.0);
        assert_eq!(combat.reach(&combat.tiers.special), 140.0);
    }

    #[test]
    fn test_partial_json_override() {
        let config = SimConfig::from_json_str(r#"{"movement": {"walk_speed": 7.5}}"#).unwrap();
        assert_eq!(config.movement.walk_speed, 7.5);
        assert_eq!(config.movement.gravity, GRAVITY);
        assert_eq!(config.arena, ArenaConfig::default());
    }

    #[test]
    fn test_missing_tier_is_parse_error() {
        let json = r#"{"combat": {"tiers": {"light": {
            "startup": 4, "active": 6, "recovery": 12, "damage": 1.5, "stun": 18,
            "reach_bonus": 0.0, "knockback_victim": 8.0, "knockback_attacker": 4.0
        }}}}"#;
        assert!(matches!(SimConfig::from_json_str(json), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_json_round_trip_preserves_config() {
        let config = SimConfig::default().with_reward_preset(RewardPreset::V1);
        let back = SimConfig::from_json_str(&config.to_json_pretty()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_rejects_zero_arena_width() {
        let mut config = SimConfig::default();
        config.arena.width = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::ArenaSize { .. })));
    }

    #[test]
    fn test_rejects_tier_without_active_frames() {
        let mut config = SimConfig::default();
        config.combat.tiers.heavy.active = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoActiveFrames(AttackKind::Heavy)));
    }

    #[test]
    fn test_rejects_zero_startup() {
        let mut config = SimConfig::default();
        config.combat.tiers.light.startup = 0;
        config.combat.tiers.light.active = 1;
        assert_eq!(config.validate(), Err(ConfigError::NoStartupFrames(AttackKind::Light)));
    }

    #[test]
    fn test_rejects_negative_damage() {
        let mut config = SimConfig::default();
        config.combat.tiers.special.damage = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Negative { .. })));
    }

    #[test]
    fn test_rejects_bad_drag_and_crouch() {
        let mut config = SimConfig::default();
        config.movement.drag = 1.5;
        assert_eq!(config.validate(), Err(ConfigError::Drag(1.5)));

        let mut config = SimConfig::default();
        config.arena.crouch_height = 150.0;
        assert!(matches!(config.validate(), Err(ConfigError::CrouchHeight { .. })));
    }

    #[test]
    fn test_rejects_bad_opponent_settings() {
        let mut config = SimConfig::default();
        config.opponent.persistence_min = 10;
        config.opponent.persistence_max = 5;
        assert!(matches!(config.validate(), Err(ConfigError::PersistenceRange { .. })));

        let mut config = SimConfig::default();
        config.opponent.personality_weights = [0.0; 4];
        assert!(matches!(config.validate(), Err(ConfigError::PersonalityWeights(_))));
    }

    #[test]
    fn test_rejects_spawn_outside_arena() {
        let mut config = SimConfig::default();
        config.episode.spawn_margin = 700.0;
        assert!(matches!(config.validate(), Err(ConfigError::SpawnPlacement { .. })));
    }

    #[test]
    fn test_reward_presets_differ() {
        assert_ne!(RewardPreset::V1.weights(), RewardPreset::V2.weights());
        assert_eq!(RewardWeights::default(), RewardPreset::V2.weights());
        assert_eq!(RewardPreset::from_name("V1"), Some(RewardPreset::V1));
        assert_eq!(RewardPreset::from_name("v9"), None);
    }
}
