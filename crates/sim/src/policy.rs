use brawl_shared::{Action, Observation};
use rand::Rng;
use rand_pcg::Pcg64;

/// The only randomness source a simulation ever consumes. Every episode owns
/// its own instance.
pub type SimRng = Pcg64;

/// Anything that can pick a fighter's action from an observation.
pub trait Policy: Send {
    fn name(&self) -> &str;
    fn act(&mut self, obs: &Observation, rng: &mut SimRng) -> Action;

    /// Called once per episode, after fighter placement.
    fn reset(&mut self, _rng: &mut SimRng) {}
}

/// Policy that does nothing - useful for testing.
pub struct IdlePolicy;

impl Policy for IdlePolicy {
    fn name(&self) -> &str {
        "idle"
    }

    fn act(&mut self, _obs: &Observation, _rng: &mut SimRng) -> Action {
        Action::Idle
    }
}

/// Uniform over every action, every tick.
pub struct RandomPolicy;

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn act(&mut self, _obs: &Observation, rng: &mut SimRng) -> Action {
        Action::ALL[rng.gen_range(0..Action::ALL.len())]
    }
}
