use brawl_shared::*;
use rand::Rng;
use tracing::debug;

use crate::actions::resolve_action;
use crate::combat::{resolve_combat, Contact};
use crate::policy::SimRng;

/// Full simulation state for a 1v1 bout.
#[derive(Debug, Clone)]
pub struct SimState {
    pub fighters: [FighterState; 2],
    pub tick: u32,
    pub stats: EpisodeStats,
    pub config: SimConfig,
}

/// What happened during one tick, beyond the state change itself.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    pub attacks_started: [bool; 2],
    pub contacts: [Option<Contact>; 2],
}

impl SimState {
    /// Both fighters at the un-jittered mirrored spawn points.
    pub fn new(config: SimConfig) -> Self {
        Self::with_spawn(config, config.episode.spawn_margin)
    }

    /// Randomized mirrored spawn: fighter 0 is offset from the left wall,
    /// fighter 1 sits at the same offset from the right wall.
    pub fn spawn(config: SimConfig, rng: &mut SimRng) -> Self {
        let jitter = config.episode.spawn_jitter;
        let offset = if jitter > 0.0 {
            rng.gen_range(0.0..jitter)
        } else {
            0.0
        };
        Self::with_spawn(config, config.episode.spawn_margin + offset)
    }

    fn with_spawn(config: SimConfig, x0: f32) -> Self {
        let x1 = config.arena.max_x() - x0;
        Self {
            fighters: [FighterState::new(x0, &config), FighterState::new(x1, &config)],
            tick: 0,
            stats: EpisodeStats::default(),
            config,
        }
    }

    pub fn health(&self) -> [f32; 2] {
        [self.fighters[0].health, self.fighters[1].health]
    }

    /// Horizontal separation divided by arena width.
    pub fn normalized_distance(&self) -> f32 {
        (self.fighters[1].position.x - self.fighters[0].position.x).abs() / self.config.arena.width
    }

    pub fn is_knockout(&self) -> bool {
        self.fighters.iter().any(FighterState::is_knocked_out)
    }

    /// Result from fighter 0's point of view. A double knockout counts as a
    /// win because the opponent's knockout is checked first.
    pub fn outcome(&self) -> EpisodeOutcome {
        let [me, them] = &self.fighters;
        if them.is_knocked_out() {
            EpisodeOutcome::AgentWin
        } else if me.is_knocked_out() {
            EpisodeOutcome::OpponentWin
        } else if me.health > them.health {
            EpisodeOutcome::AgentWin
        } else if them.health > me.health {
            EpisodeOutcome::OpponentWin
        } else {
            EpisodeOutcome::Draw
        }
    }

    pub fn snapshot(&self, reward: f32) -> ReplayFrame {
        ReplayFrame {
            tick: self.tick,
            fighters: [
                FighterSnapshot::from(&self.fighters[0]),
                FighterSnapshot::from(&self.fighters[1]),
            ],
            reward,
        }
    }

    /// Advance one tick: actions, physics, then combat.
    pub fn step(&mut self, actions: &[Action; 2]) -> TickReport {
        let mut attacks_started = [false; 2];
        for (i, action) in actions.iter().enumerate() {
            attacks_started[i] = resolve_action(&mut self.fighters[i], *action, &self.config);
        }

        for f in &mut self.fighters {
            integrate(f, &self.config);
        }

        let contacts = resolve_combat(&mut self.fighters, &self.config);

        let report = TickReport {
            attacks_started,
            contacts,
        };
        self.record(&report);
        self.tick += 1;
        report
    }

    fn record(&mut self, report: &TickReport) {
        for (i, started) in report.attacks_started.iter().enumerate() {
            if *started {
                self.stats.attacks_started[i] += 1;
            }
        }

        for contact in report.contacts.iter().flatten() {
            let who = contact.attacker;
            if contact.blocked {
                self.stats.blocked[who] += 1;
                debug!(tick = self.tick, attacker = who, kind = ?contact.kind, "attack blocked");
            } else {
                self.stats.hits[who] += 1;
                self.stats.damage_dealt[who] += contact.tier.damage;
                debug!(
                    tick = self.tick,
                    attacker = who,
                    kind = ?contact.kind,
                    defender_health = self.fighters[contact.defender()].health,
                    "attack landed"
                );
            }
        }
    }
}

/// Integrate one fighter's motion for a tick and clamp it to the arena.
pub fn integrate(f: &mut FighterState, config: &SimConfig) {
    let arena = &config.arena;
    let movement = &config.movement;

    f.position += f.velocity;

    f.velocity.x *= movement.drag;
    if f.velocity.x.abs() < movement.velocity_epsilon {
        f.velocity.x = 0.0;
    }

    let floor = f.floor_y(arena);
    if f.position.y < floor {
        f.velocity.y += movement.gravity;
    } else {
        f.position.y = floor;
        f.velocity.y = 0.0;
    }

    f.position.x = f.position.x.clamp(0.0, arena.max_x());
}
