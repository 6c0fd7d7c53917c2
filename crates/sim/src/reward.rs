use brawl_shared::*;
use serde::{Deserialize, Serialize};

/// Terminal result credited on the tick an episode ends by knockout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Win,
    Loss,
}

/// Signed contribution of each reward term for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub approach: f32,
    pub efficiency: f32,
    pub corner: f32,
    pub terminal: f32,
}

impl RewardBreakdown {
    pub fn total(&self) -> f32 {
        self.damage_dealt + self.damage_taken + self.approach + self.efficiency + self.corner + self.terminal
    }
}

/// Everything the shaper needs for one tick, from `player`'s point of view.
#[derive(Debug, Clone, Copy)]
pub struct RewardInputs {
    pub player: usize,
    pub health_before: [f32; 2],
    pub health_after: [f32; 2],
    pub prev_distance: f32,
    pub curr_distance: f32,
    /// X of `player`'s body after the tick.
    pub x: f32,
    pub terminal: Option<Terminal>,
}

pub fn shape_reward(weights: &RewardWeights, arena: &ArenaConfig, inputs: &RewardInputs) -> RewardBreakdown {
    let me = inputs.player;
    let them = 1 - me;
    let dealt = inputs.health_before[them] - inputs.health_after[them];
    let taken = inputs.health_before[me] - inputs.health_after[me];

    let near_wall = inputs.x < weights.corner_margin || inputs.x > arena.max_x() - weights.corner_margin;

    RewardBreakdown {
        damage_dealt: weights.damage_dealt * dealt,
        damage_taken: -weights.damage_taken * taken,
        approach: weights.approach * (inputs.prev_distance - inputs.curr_distance),
        efficiency: -weights.efficiency,
        corner: if near_wall { -weights.corner_penalty } else { 0.0 },
        terminal: match inputs.terminal {
            Some(Terminal::Win) => weights.win_bonus,
            Some(Terminal::Loss) => -weights.loss_penalty,
            None => 0.0,
        },
    }
}
