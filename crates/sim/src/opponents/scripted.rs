use brawl_shared::*;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::policy::{Policy, SimRng};

/// Attacks an aggressive opponent picks from once in range.
const CLOSE_RANGE_ACTIONS: [Action; 4] = [Action::Block, Action::Light, Action::Heavy, Action::Special];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    Aggressive,
    Defensive,
    Random,
    Passive,
}

impl Personality {
    /// Same order as `OpponentConfig::personality_weights`.
    pub const ALL: [Personality; 4] = [
        Personality::Aggressive,
        Personality::Defensive,
        Personality::Random,
        Personality::Passive,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Personality::Aggressive => "aggressive",
            Personality::Defensive => "defensive",
            Personality::Random => "random",
            Personality::Passive => "passive",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

/// Baseline opponent: draws a personality at reset, then commits to each
/// chosen action for a random number of ticks before choosing again.
#[derive(Debug, Clone)]
pub struct ScriptedOpponent {
    config: OpponentConfig,
    arena_width: f32,
    personalities: WeightedIndex<f32>,
    pinned: Option<Personality>,
    personality: Personality,
    current: Action,
    persistence: u32,
}

impl ScriptedOpponent {
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let weights = config.opponent.personality_weights;
        let personalities =
            WeightedIndex::new(weights).map_err(|_| ConfigError::PersonalityWeights(weights))?;
        Ok(Self {
            config: config.opponent,
            arena_width: config.arena.width,
            personalities,
            pinned: None,
            personality: Personality::Random,
            current: Action::Idle,
            persistence: 0,
        })
    }

    /// Skip the personality draw and always play `personality`.
    pub fn pinned(mut self, personality: Personality) -> Self {
        self.pinned = Some(personality);
        self.personality = personality;
        self
    }

    pub fn personality(&self) -> Personality {
        self.personality
    }

    fn choose(&self, obs: &Observation, rng: &mut SimRng) -> Action {
        let dx = obs.data[Observation::DX] * self.arena_width;
        let toward = if dx >= 0.0 { Action::Right } else { Action::Left };
        let away = if dx >= 0.0 { Action::Left } else { Action::Right };

        match self.personality {
            Personality::Aggressive => {
                if dx.abs() > self.config.approach_distance {
                    toward
                } else {
                    CLOSE_RANGE_ACTIONS[rng.gen_range(0..CLOSE_RANGE_ACTIONS.len())]
                }
            }
            Personality::Defensive => away,
            Personality::Random => Action::ALL[rng.gen_range(0..Action::ALL.len())],
            Personality::Passive => Action::Idle,
        }
    }
}

impl Policy for ScriptedOpponent {
    fn name(&self) -> &str {
        match self.pinned {
            Some(p) => p.name(),
            None => "scripted",
        }
    }

    fn reset(&mut self, rng: &mut SimRng) {
        self.personality = match self.pinned {
            Some(p) => p,
            None => Personality::ALL[self.personalities.sample(rng)],
        };
        self.current = Action::Idle;
        self.persistence = 0;
        debug!(personality = self.personality.name(), "opponent personality");
    }

    fn act(&mut self, obs: &Observation, rng: &mut SimRng) -> Action {
        if self.persistence == 0 {
            self.current = self.choose(obs, rng);
            self.persistence = rng.gen_range(self.config.persistence_min..=self.config.persistence_max);
            debug!(
                personality = self.personality.name(),
                action = ?self.current,
                hold = self.persistence,
                "opponent re-roll"
            );
        }
        self.persistence -= 1;
        self.current
    }
}
