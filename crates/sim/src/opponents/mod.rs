pub mod scripted;

pub use scripted::{Personality, ScriptedOpponent};

use brawl_shared::{ConfigError, SimConfig};

use crate::policy::{IdlePolicy, Policy, RandomPolicy};

/// Names accepted by [`policy_by_name`].
pub const POLICY_NAMES: [&str; 6] = ["idle", "random", "scripted", "aggressive", "defensive", "passive"];

/// Resolve a policy by its command-line name. Personality names give a
/// scripted opponent pinned to that personality.
pub fn policy_by_name(name: &str, config: &SimConfig) -> Result<Option<Box<dyn Policy>>, ConfigError> {
    let policy: Box<dyn Policy> = match name {
        "idle" => Box::new(IdlePolicy),
        "random" => Box::new(RandomPolicy),
        "scripted" => Box::new(ScriptedOpponent::new(config)?),
        "aggressive" | "defensive" | "passive" => {
            let Some(personality) = Personality::from_name(name) else {
                return Ok(None);
            };
            Box::new(ScriptedOpponent::new(config)?.pinned(personality))
        }
        _ => return Ok(None),
    };
    Ok(Some(policy))
}
