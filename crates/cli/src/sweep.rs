use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rayon::prelude::*;

use brawl_shared::*;
use brawl_sim::run_episode;

use crate::resolve_policy;

/// A sweepable parameter with its name, range, and accessor.
struct SweepParam {
    name: &'static str,
    min: f64,
    default: f64,
    max: f64,
    /// Apply this parameter value to a SimConfig.
    apply: fn(&mut SimConfig, f64),
}

const SWEEP_PARAMS: &[SweepParam] = &[
    SweepParam {
        name: "walk_speed",
        min: 2.0,
        default: 5.0,
        max: 9.0,
        apply: |c, v| c.movement.walk_speed = v as f32,
    },
    SweepParam {
        name: "jump_impulse",
        min: -22.0,
        default: -15.0,
        max: -8.0,
        apply: |c, v| c.movement.jump_impulse = v as f32,
    },
    SweepParam {
        name: "gravity",
        min: 0.4,
        default: 0.8,
        max: 1.4,
        apply: |c, v| c.movement.gravity = v as f32,
    },
    SweepParam {
        name: "drag",
        min: 0.6,
        default: 0.85,
        max: 0.98,
        apply: |c, v| c.movement.drag = v as f32,
    },
    SweepParam {
        name: "base_reach",
        min: 50.0,
        default: 90.0,
        max: 140.0,
        apply: |c, v| c.combat.base_reach = v as f32,
    },
    SweepParam {
        name: "max_health",
        min: 25.0,
        default: 100.0,
        max: 150.0,
        apply: |c, v| c.combat.max_health = v as f32,
    },
    SweepParam {
        name: "light_damage",
        min: 0.5,
        default: 1.5,
        max: 4.0,
        apply: |c, v| c.combat.tiers.light.damage = v as f32,
    },
    SweepParam {
        name: "heavy_stun",
        min: 10.0,
        default: 35.0,
        max: 60.0,
        apply: |c, v| c.combat.tiers.heavy.stun = v as u32,
    },
    SweepParam {
        name: "special_startup",
        min: 5.0,
        default: 15.0,
        max: 30.0,
        apply: |c, v| c.combat.tiers.special.startup = v as u32,
    },
    SweepParam {
        name: "knockback_victim",
        min: 0.0,
        default: 8.0,
        max: 16.0,
        apply: |c, v| {
            c.combat.tiers.light.knockback_victim = v as f32;
            c.combat.tiers.heavy.knockback_victim = v as f32;
            c.combat.tiers.special.knockback_victim = v as f32;
        },
    },
];

/// Aggregated episode metrics for one parameter value.
struct AggResult {
    value: f64,
    ko_rate: f32,
    agent_win_rate: f32,
    mean_length: f32,
    mean_reward: f32,
    mean_hits: f32,
    episode_count: u32,
}

fn sweep_param(param: &SweepParam, steps: usize, seeds: u32, agent: &str, opponent: &str) -> Result<Vec<AggResult>> {
    // Generate linearly-spaced values
    let values: Vec<f64> = if steps == 1 {
        vec![param.default]
    } else {
        (0..steps)
            .map(|i| param.min + (param.max - param.min) * i as f64 / (steps - 1) as f64)
            .collect()
    };

    values
        .iter()
        .map(|&val| -> Result<AggResult> {
            let mut config = SimConfig::default();
            (param.apply)(&mut config, val);
            config
                .validate()
                .with_context(|| format!("{} = {}", param.name, val))?;

            let results = (0..seeds as u64)
                .into_par_iter()
                .map(|seed| -> Result<EpisodeResult> {
                    let mut p0 = resolve_policy(agent, &config)?;
                    let p1 = resolve_policy(opponent, &config)?;
                    Ok(run_episode(config, seed, p0.as_mut(), p1)?.result)
                })
                .collect::<Result<Vec<_>>>()?;

            let n = results.len().max(1) as f32;
            let frac = |pred: &dyn Fn(&EpisodeResult) -> bool| results.iter().filter(|r| pred(r)).count() as f32 / n;

            Ok(AggResult {
                value: val,
                ko_rate: frac(&|r| r.reason == EpisodeEndReason::Knockout),
                agent_win_rate: frac(&|r| r.outcome == EpisodeOutcome::AgentWin),
                mean_length: results.iter().map(|r| r.final_tick as f32).sum::<f32>() / n,
                mean_reward: results.iter().map(|r| r.total_reward).sum::<f32>() / n,
                mean_hits: results.iter().map(|r| (r.stats.hits[0] + r.stats.hits[1]) as f32).sum::<f32>() / n,
                episode_count: results.len() as u32,
            })
        })
        .collect()
}

fn print_param_table(param: &SweepParam, results: &[AggResult]) {
    println!("\n--- {} (default {}) ---", param.name, param.default);
    println!(
        "{:>10} {:>7} {:>7} {:>8} {:>9} {:>6}",
        "value", "ko%", "win%", "length", "reward", "hits"
    );
    println!("{:-<52}", "");

    for r in results {
        println!(
            "{:>10.3} {:>7.1} {:>7.1} {:>8.1} {:>9.2} {:>6.1}",
            r.value,
            r.ko_rate * 100.0,
            r.agent_win_rate * 100.0,
            r.mean_length,
            r.mean_reward,
            r.mean_hits,
        );
    }
}

fn write_csv(path: &Path, all_results: &[(&str, Vec<AggResult>)]) -> Result<()> {
    let mut file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    writeln!(
        file,
        "parameter,value,ko_rate,agent_win_rate,mean_length,mean_reward,mean_hits,episode_count"
    )?;

    for (param_name, results) in all_results {
        for r in results {
            writeln!(
                file,
                "{},{:.4},{:.3},{:.3},{:.2},{:.4},{:.2},{}",
                param_name,
                r.value,
                r.ko_rate,
                r.agent_win_rate,
                r.mean_length,
                r.mean_reward,
                r.mean_hits,
                r.episode_count,
            )?;
        }
    }
    println!("\nCSV written to {}", path.display());
    Ok(())
}

pub fn cmd_sweep(
    param_filter: Option<&str>,
    steps: usize,
    seeds: u32,
    agent: &str,
    opponent: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    if steps == 0 || seeds == 0 {
        bail!("sweep needs at least one step and one seed");
    }
    // Fail on bad names before running anything
    resolve_policy(agent, &SimConfig::default())?;
    resolve_policy(opponent, &SimConfig::default())?;

    // Filter to requested parameter(s)
    let params_to_sweep: Vec<&SweepParam> = match param_filter {
        Some(name) => match SWEEP_PARAMS.iter().find(|p| p.name == name) {
            Some(p) => vec![p],
            None => bail!(
                "unknown parameter '{}'. Available: {}",
                name,
                SWEEP_PARAMS.iter().map(|p| p.name).collect::<Vec<_>>().join(", ")
            ),
        },
        None => SWEEP_PARAMS.iter().collect(),
    };

    println!(
        "=== Parameter Sweep ===\n{} vs {} | Steps: {} | Seeds: {}\nParams: {} | Total episodes: {}",
        agent,
        opponent,
        steps,
        seeds,
        params_to_sweep.len(),
        params_to_sweep.len() * steps * seeds as usize,
    );

    let start = std::time::Instant::now();
    let mut all_results: Vec<(&str, Vec<AggResult>)> = Vec::new();

    for param in &params_to_sweep {
        let results = sweep_param(param, steps, seeds, agent, opponent)?;
        print_param_table(param, &results);
        all_results.push((param.name, results));
    }

    println!("\n=== Done ({:.1}s) ===", start.elapsed().as_secs_f32());

    if let Some(path) = &output {
        write_csv(path, &all_results)?;
    }
    Ok(())
}
