mod sweep;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use brawl_shared::*;
use brawl_sim::opponents::{policy_by_name, POLICY_NAMES};
use brawl_sim::{run_episode, Policy};

#[derive(Parser)]
#[command(name = "brawl", about = "Two-fighter combat simulator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one episode between an agent and an opponent
    Run {
        /// Policy driving fighter 0
        #[arg(long, default_value = "random")]
        agent: String,

        /// Policy driving fighter 1
        #[arg(long, default_value = "scripted")]
        opponent: String,

        /// Random seed for the episode
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// JSON file with config overrides
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output path for replay JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run many episodes in parallel and summarize them
    Rollout {
        #[arg(long, default_value_t = 100)]
        episodes: u64,

        /// Seed of the first episode; episode i uses seed + i
        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[arg(long, default_value = "random")]
        agent: String,

        #[arg(long, default_value = "scripted")]
        opponent: String,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Sweep a physics or combat parameter and report how episodes change
    Sweep {
        /// Parameter to sweep (all when omitted)
        #[arg(long)]
        param: Option<String>,

        /// Values per parameter, evenly spaced over its range
        #[arg(long, default_value_t = 5)]
        steps: usize,

        /// Episodes per value
        #[arg(long, default_value_t = 20)]
        seeds: u32,

        #[arg(long, default_value = "aggressive")]
        agent: String,

        #[arg(long, default_value = "scripted")]
        opponent: String,

        /// Write results as CSV
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the default config as JSON, or validate an override file
    Config {
        #[arg(long)]
        validate: Option<PathBuf>,
    },
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Batch commands log one line per episode at info
    let level = match cli.command {
        Commands::Rollout { .. } | Commands::Sweep { .. } => "warn",
        _ => "info",
    };
    init_tracing(level);

    match cli.command {
        Commands::Run {
            agent,
            opponent,
            seed,
            config,
            output,
        } => cmd_run(&agent, &opponent, seed, config.as_deref(), output),

        Commands::Rollout {
            episodes,
            seed,
            agent,
            opponent,
            config,
        } => cmd_rollout(episodes, seed, &agent, &opponent, config.as_deref()),

        Commands::Sweep {
            param,
            steps,
            seeds,
            agent,
            opponent,
            output,
        } => sweep::cmd_sweep(param.as_deref(), steps, seeds, &agent, &opponent, output),

        Commands::Config { validate } => cmd_config(validate.as_deref()),
    }
}

/// Load a JSON override file on top of the defaults, or the defaults alone.
pub(crate) fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    SimConfig::from_json_str(&json).with_context(|| format!("loading config {}", path.display()))
}

/// Resolve a policy name to a boxed Policy trait object.
pub(crate) fn resolve_policy(name: &str, config: &SimConfig) -> Result<Box<dyn Policy>> {
    policy_by_name(name, config)?.ok_or_else(|| {
        anyhow!(
            "unknown policy '{}'. Valid options: {}",
            name,
            POLICY_NAMES.join(", ")
        )
    })
}

fn cmd_run(agent_name: &str, opponent_name: &str, seed: u64, config: Option<&Path>, output: Option<PathBuf>) -> Result<()> {
    let config = load_config(config)?;
    let mut agent = resolve_policy(agent_name, &config)?;
    let opponent = resolve_policy(opponent_name, &config)?;

    println!("Running episode: {} vs {} (seed={})", agent.name(), opponent.name(), seed);

    let replay = run_episode(config, seed, agent.as_mut(), opponent)?;
    let result = &replay.result;
    let stats = &result.stats;

    println!();
    println!("=== Episode Result ===");
    println!("Outcome:      {:?}", result.outcome);
    println!("Reason:       {:?}", result.reason);
    println!("Final tick:   {}", result.final_tick);
    println!("Total reward: {:.3}", result.total_reward);
    println!();
    println!("--- Stats ---");
    let last = replay.frames.last().map(|f| f.fighters);
    for (i, name) in [&replay.agent, &replay.opponent].iter().enumerate() {
        let health = last.map(|f| f[i].health).unwrap_or(config.combat.max_health);
        println!(
            "  {} (P{}): HP={:.1}, Attacks={}, Hits={}, Blocked={}, Damage={:.1}",
            name, i, health, stats.attacks_started[i], stats.hits[i], stats.blocked[i], stats.damage_dealt[i]
        );
    }

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&replay)?;
        std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("\nReplay written to {}", path.display());
    }
    Ok(())
}

fn cmd_rollout(episodes: u64, seed: u64, agent_name: &str, opponent_name: &str, config: Option<&Path>) -> Result<()> {
    if episodes == 0 {
        bail!("rollout needs at least one episode");
    }
    let config = load_config(config)?;
    // Fail on bad names before spawning any work
    resolve_policy(agent_name, &config)?;
    resolve_policy(opponent_name, &config)?;

    println!(
        "Rollout: {} episodes, {} vs {} (seeds {}..{})",
        episodes,
        agent_name,
        opponent_name,
        seed,
        seed + episodes
    );
    let start = std::time::Instant::now();

    let results = (seed..seed + episodes)
        .into_par_iter()
        .map(|s| -> Result<EpisodeResult> {
            let mut agent = resolve_policy(agent_name, &config)?;
            let opponent = resolve_policy(opponent_name, &config)?;
            Ok(run_episode(config, s, agent.as_mut(), opponent)?.result)
        })
        .collect::<Result<Vec<EpisodeResult>>>()?;

    let count = |o: EpisodeOutcome| results.iter().filter(|r| r.outcome == o).count();
    let knockouts = results.iter().filter(|r| r.reason == EpisodeEndReason::Knockout).count();
    let n = results.len() as f32;
    let mean_reward = results.iter().map(|r| r.total_reward).sum::<f32>() / n;
    let mean_length = results.iter().map(|r| r.final_tick as f32).sum::<f32>() / n;

    info!(episodes, elapsed_s = start.elapsed().as_secs_f32(), "rollout finished");

    println!();
    println!("=== Rollout Summary ({:.1}s) ===", start.elapsed().as_secs_f32());
    println!("Agent wins:    {}", count(EpisodeOutcome::AgentWin));
    println!("Opponent wins: {}", count(EpisodeOutcome::OpponentWin));
    println!("Draws:         {}", count(EpisodeOutcome::Draw));
    println!("Knockouts:     {}", knockouts);
    println!("Truncations:   {}", results.len() - knockouts);
    println!("Mean reward:   {:.3}", mean_reward);
    println!("Mean length:   {:.1} ticks", mean_length);
    Ok(())
}

fn cmd_config(validate: Option<&Path>) -> Result<()> {
    match validate {
        Some(path) => {
            let config = load_config(Some(path))?;
            println!("{} is valid", path.display());
            info!(max_steps = config.episode.max_steps, "config loaded");
        }
        None => println!("{}", SimConfig::default().to_json_pretty()),
    }
    Ok(())
}
