use brawl_shared::*;
use rand::SeedableRng;

use crate::env::FightingEnv;
use crate::policy::{Policy, SimRng};

/// Mixed into the episode seed so the agent's RNG never shares a stream
/// with the environment's.
const AGENT_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Run one full episode and record it. The environment RNG is seeded with
/// `seed`; the agent gets its own RNG derived from it.
pub fn run_episode(
    config: SimConfig,
    seed: u64,
    agent: &mut dyn Policy,
    opponent: Box<dyn Policy>,
) -> Result<Replay, ConfigError> {
    let opponent_name = opponent.name().to_string();
    let mut env = FightingEnv::with_opponent(config, seed, opponent)?;
    let mut agent_rng = SimRng::seed_from_u64(seed ^ AGENT_SEED_SALT);
    agent.reset(&mut agent_rng);

    let mut frames = vec![env.state().snapshot(0.0)];
    let mut obs = env.observe(0);

    let result = loop {
        let action = agent.act(&obs, &mut agent_rng);
        let step = env.step_action(action);

        frames.push(env.state().snapshot(step.reward));
        obs = step.observation;

        if let Some(result) = env.result() {
            break result;
        }
    };

    Ok(Replay {
        seed,
        agent: agent.name().to_string(),
        opponent: opponent_name,
        config,
        frames,
        result,
    })
}
