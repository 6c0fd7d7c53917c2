use brawl_shared::*;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::opponents::ScriptedOpponent;
use crate::physics::SimState;
use crate::policy::{Policy, SimRng};
use crate::reward::{shape_reward, RewardBreakdown, RewardInputs, Terminal};

/// Per-episode bookkeeping, rebuilt on every reset.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub seed: u64,
    pub step_count: u32,
    pub terminated: bool,
    pub truncated: bool,
    /// Normalized distance after the previous tick.
    pub prev_distance: f32,
    pub total_reward: f32,
}

impl Episode {
    fn new(seed: u64, distance: f32) -> Self {
        Self {
            seed,
            step_count: 0,
            terminated: false,
            truncated: false,
            prev_distance: distance,
            total_reward: 0.0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

#[derive(Debug, Clone)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f32,
    pub terminated: bool,
    pub truncated: bool,
    pub breakdown: RewardBreakdown,
    pub opponent_action: Action,
}

impl StepResult {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Single-agent environment: fighter 0 is driven through [`FightingEnv::step`],
/// fighter 1 by an owned opponent policy. All randomness comes from one
/// RNG owned by this instance.
pub struct FightingEnv {
    config: SimConfig,
    state: SimState,
    episode: Episode,
    opponent: Box<dyn Policy>,
    rng: SimRng,
}

impl FightingEnv {
    /// Environment against the scripted baseline opponent.
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let opponent = ScriptedOpponent::new(&config)?;
        Self::with_opponent(config, seed, Box::new(opponent))
    }

    pub fn with_opponent(config: SimConfig, seed: u64, opponent: Box<dyn Policy>) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = SimState::new(config);
        let episode = Episode::new(seed, state.normalized_distance());
        let mut env = Self {
            config,
            state,
            episode,
            opponent,
            rng: SimRng::seed_from_u64(seed),
        };
        env.reset(Some(seed));
        Ok(env)
    }

    /// Start a new episode. With a seed the RNG is reseeded, otherwise the
    /// current stream continues.
    pub fn reset(&mut self, seed: Option<u64>) -> Observation {
        if let Some(seed) = seed {
            self.rng = SimRng::seed_from_u64(seed);
            self.episode.seed = seed;
        }
        self.state = SimState::spawn(self.config, &mut self.rng);
        self.opponent.reset(&mut self.rng);
        self.episode = Episode::new(self.episode.seed, self.state.normalized_distance());

        info!(
            seed = self.episode.seed,
            opponent = self.opponent.name(),
            x0 = self.state.fighters[0].position.x,
            x1 = self.state.fighters[1].position.x,
            "episode reset"
        );
        self.state.observe(0)
    }

    /// Map a raw action index to an [`Action`] according to the configured
    /// invalid-action mode.
    pub fn decode_action(&self, raw: i64) -> Result<Action, SimError> {
        match Action::from_index(raw) {
            Ok(action) => Ok(action),
            Err(e) => match self.config.episode.invalid_actions {
                InvalidActionMode::Reject => Err(e),
                InvalidActionMode::TreatAsIdle => {
                    warn!(raw, "out-of-range action treated as idle");
                    Ok(Action::Idle)
                }
            },
        }
    }

    pub fn step(&mut self, raw: i64) -> Result<StepResult, SimError> {
        let action = self.decode_action(raw)?;
        Ok(self.step_action(action))
    }

    /// Run one tick of the pipeline with an already-decoded agent action.
    pub fn step_action(&mut self, action: Action) -> StepResult {
        let was_done = self.episode.is_done();
        if was_done {
            warn!(
                step = self.episode.step_count,
                "step called on a finished episode; call reset"
            );
        }

        let opponent_obs = self.state.observe(1);
        let opponent_action = self.opponent.act(&opponent_obs, &mut self.rng);

        let health_before = self.state.health();
        self.state.step(&[action, opponent_action]);
        self.episode.step_count += 1;

        let knockout = self.state.is_knockout();
        let terminal = if knockout && !self.episode.terminated {
            match self.state.outcome() {
                EpisodeOutcome::AgentWin => Some(Terminal::Win),
                _ => Some(Terminal::Loss),
            }
        } else {
            None
        };

        let curr_distance = self.state.normalized_distance();
        let breakdown = shape_reward(
            &self.config.reward,
            &self.config.arena,
            &RewardInputs {
                player: 0,
                health_before,
                health_after: self.state.health(),
                prev_distance: self.episode.prev_distance,
                curr_distance,
                x: self.state.fighters[0].position.x,
                terminal,
            },
        );
        let reward = breakdown.total();

        self.episode.prev_distance = curr_distance;
        self.episode.terminated = knockout;
        self.episode.truncated = !knockout && self.episode.step_count >= self.config.episode.max_steps;
        self.episode.total_reward += reward;

        if !was_done && self.episode.is_done() {
            if let Some(result) = self.result() {
                info!(
                    seed = self.episode.seed,
                    steps = self.episode.step_count,
                    outcome = ?result.outcome,
                    reason = ?result.reason,
                    total_reward = self.episode.total_reward,
                    "episode finished"
                );
            }
        }

        StepResult {
            observation: self.state.observe(0),
            reward,
            terminated: self.episode.terminated,
            truncated: self.episode.truncated,
            breakdown,
            opponent_action,
        }
    }

    /// Summary of a finished episode; `None` while it is still running.
    pub fn result(&self) -> Option<EpisodeResult> {
        let reason = if self.episode.terminated {
            EpisodeEndReason::Knockout
        } else if self.episode.truncated {
            EpisodeEndReason::StepLimit
        } else {
            return None;
        };
        Some(EpisodeResult {
            outcome: self.state.outcome(),
            reason,
            final_tick: self.state.tick,
            total_reward: self.episode.total_reward,
            stats: self.state.stats,
        })
    }

    /// Move both fighters to the given x positions, standing at rest on the
    /// ground, and restart distance tracking from there.
    pub fn place_fighters(&mut self, x0: f32, x1: f32) {
        let arena = self.config.arena;
        let max_x = arena.max_x();
        for (f, x) in self.state.fighters.iter_mut().zip([x0, x1]) {
            f.position.x = x.clamp(0.0, max_x);
            f.position.y = f.floor_y(&arena);
            f.velocity.x = 0.0;
            f.velocity.y = 0.0;
        }
        self.episode.prev_distance = self.state.normalized_distance();
    }

    pub fn observe(&self, player: usize) -> Observation {
        self.state.observe(player)
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimState {
        &mut self.state
    }

    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn opponent_name(&self) -> &str {
        self.opponent.name()
    }

    /// Swap reward weights mid-run; takes effect on the next step.
    pub fn set_reward_weights(&mut self, weights: RewardWeights) -> Result<(), ConfigError> {
        let mut config = self.config;
        config.reward = weights;
        config.validate()?;
        self.config = config;
        self.state.config = config;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::IdlePolicy;

    fn idle_env() -> FightingEnv {
        FightingEnv::with_opponent(SimConfig::default(), 0, Box::new(IdlePolicy)).unwrap()
    }

    #[test]
    fn test_place_fighters_lands_them_at_rest() {
        let mut env = idle_env();
        env.step(Action::Jump as i64).unwrap();
        env.step(Action::Right as i64).unwrap();
        assert!(!env.state().fighters[0].is_grounded(&env.config().arena));

        env.place_fighters(200.0, 500.0);
        let arena = env.config().arena;
        for f in &env.state().fighters {
            assert_eq!(f.position.y, f.floor_y(&arena));
            assert_eq!(f.velocity.x, 0.0);
            assert_eq!(f.velocity.y, 0.0);
        }
        assert_eq!(env.state().fighters[0].position.x, 200.0);
    }

    #[test]
    fn test_reset_restores_neutral_state() {
        let mut env = idle_env();
        env.place_fighters(300.0, 320.0);
        for _ in 0..30 {
            env.step(Action::Heavy as i64).unwrap();
        }
        assert!(env.state().fighters[1].health < MAX_HEALTH);

        env.reset(Some(1));
        assert_eq!(env.episode().step_count, 0);
        assert_eq!(env.episode().seed, 1);
        assert!(!env.episode().is_done());
        assert_eq!(env.state().health(), [MAX_HEALTH, MAX_HEALTH]);
        assert_eq!(env.state().stats, EpisodeStats::default());
    }

    #[test]
    fn test_invalid_action_rejected_by_default() {
        let mut env = idle_env();
        assert_eq!(env.step(9).unwrap_err(), SimError::InvalidAction(9));
        assert_eq!(env.step(-3).unwrap_err(), SimError::InvalidAction(-3));
        assert_eq!(env.episode().step_count, 0);
    }

    #[test]
    fn test_lenient_mode_treats_invalid_as_idle() {
        let mut config = SimConfig::default();
        config.episode.invalid_actions = InvalidActionMode::TreatAsIdle;
        let mut env = FightingEnv::with_opponent(config, 0, Box::new(IdlePolicy)).unwrap();
        let x = env.state().fighters[0].position.x;

        let r = env.step(42).unwrap();
        assert!(!r.done());
        assert_eq!(env.state().fighters[0].position.x, x);
        assert_eq!(env.decode_action(7), Ok(Action::Heavy));
    }

    #[test]
    fn test_truncation_at_step_limit() {
        let mut config = SimConfig::default();
        config.episode.max_steps = 5;
        let mut env = FightingEnv::with_opponent(config, 0, Box::new(IdlePolicy)).unwrap();
        for _ in 0..4 {
            let r = env.step(0).unwrap();
            assert!(!r.truncated && !r.terminated);
        }
        let r = env.step(0).unwrap();
        assert!(r.truncated);
        assert!(!r.terminated);

        let result = env.result().unwrap();
        assert_eq!(result.reason, EpisodeEndReason::StepLimit);
        assert_eq!(result.outcome, EpisodeOutcome::Draw);
        assert_eq!(result.final_tick, 5);
    }

    #[test]
    fn test_reward_matches_breakdown() {
        let mut env = idle_env();
        env.place_fighters(300.0, 320.0);
        let mut total = 0.0;
        for _ in 0..15 {
            let r = env.step(Action::Light as i64).unwrap();
            assert_eq!(r.reward, r.breakdown.total());
            total += r.reward;
        }
        assert!((env.episode().total_reward - total).abs() < 1e-4);
    }

    #[test]
    fn test_construction_validates_config() {
        let mut config = SimConfig::default();
        config.arena.width = -1.0;
        assert!(FightingEnv::new(config, 0).is_err());
    }

    #[test]
    fn test_set_reward_weights_rejects_non_finite() {
        let mut env = idle_env();
        let mut w = RewardPreset::V1.weights();
        assert!(env.set_reward_weights(w).is_ok());
        assert_eq!(env.config().reward, w);

        w.win_bonus = f32::NAN;
        assert!(env.set_reward_weights(w).is_err());
        assert_eq!(env.config().reward, RewardPreset::V1.weights());
    }
}
