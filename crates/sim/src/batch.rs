use brawl_shared::*;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::env::{FightingEnv, StepResult};
use crate::policy::SimRng;

/// Outcome of stepping one env inside a batch.
#[derive(Debug, Clone)]
pub struct BatchStep {
    pub result: StepResult,
    /// Summary of the episode that just ended, if it did.
    pub episode: Option<EpisodeResult>,
    /// First observation of the replacement episode after an auto-reset.
    pub reset_observation: Option<Observation>,
}

impl BatchStep {
    /// Observation the caller should act on next.
    pub fn next_observation(&self) -> &Observation {
        self.reset_observation.as_ref().unwrap_or(&self.result.observation)
    }
}

/// N independent environments stepped in parallel. Finished envs are reset
/// with seeds drawn sequentially from a master RNG, so a batch is as
/// reproducible as a single env.
pub struct BatchEnv {
    envs: Vec<FightingEnv>,
    rng: SimRng,
}

impl BatchEnv {
    pub fn new(config: SimConfig, n_envs: usize, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = SimRng::seed_from_u64(seed);
        let envs = (0..n_envs)
            .map(|_| FightingEnv::new(config, rng.gen::<u64>()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { envs, rng })
    }

    pub fn len(&self) -> usize {
        self.envs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envs.is_empty()
    }

    pub fn envs(&self) -> &[FightingEnv] {
        &self.envs
    }

    /// Reset every env with a fresh seed.
    pub fn reset(&mut self) -> Vec<Observation> {
        // Seeds come from the master RNG sequentially, resets run in parallel
        let seeds: Vec<u64> = (0..self.envs.len()).map(|_| self.rng.gen()).collect();
        self.envs
            .par_iter_mut()
            .zip(seeds.into_par_iter())
            .map(|(env, seed)| env.reset(Some(seed)))
            .collect()
    }

    /// Step every env with its action. Every action is decoded before any env
    /// moves, so a bad action leaves the whole batch untouched.
    pub fn step(&mut self, actions: &[i64]) -> Result<Vec<BatchStep>, SimError> {
        if actions.len() != self.envs.len() {
            return Err(SimError::BatchSize {
                expected: self.envs.len(),
                got: actions.len(),
            });
        }
        let decoded = self
            .envs
            .iter()
            .zip(actions)
            .map(|(env, raw)| env.decode_action(*raw))
            .collect::<Result<Vec<_>, _>>()?;

        let results: Vec<StepResult> = self
            .envs
            .par_iter_mut()
            .zip(decoded.into_par_iter())
            .map(|(env, action)| env.step_action(action))
            .collect();

        let episodes: Vec<Option<EpisodeResult>> = self.envs.iter().map(FightingEnv::result).collect();

        let rng = &mut self.rng;
        let seeds: Vec<Option<u64>> = results.iter().map(|r| r.done().then(|| rng.gen())).collect();

        let resets: Vec<Option<Observation>> = self
            .envs
            .par_iter_mut()
            .zip(seeds.into_par_iter())
            .map(|(env, seed)| seed.map(|s| env.reset(Some(s))))
            .collect();

        Ok(results
            .into_iter()
            .zip(episodes)
            .zip(resets)
            .map(|((result, episode), reset_observation)| BatchStep {
                result,
                episode,
                reset_observation,
            })
            .collect())
    }

    pub fn set_reward_weights(&mut self, weights: RewardWeights) -> Result<(), ConfigError> {
        for env in &mut self.envs {
            env.set_reward_weights(weights)?;
        }
        Ok(())
    }
}
