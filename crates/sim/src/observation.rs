use brawl_shared::*;

use crate::physics::SimState;

fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// `num / den`, or 0 when the denominator is zero.
fn scaled(num: f32, den: f32) -> f32 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

impl SimState {
    /// Build the 16-float observation from `player`'s point of view.
    pub fn observe(&self, player: usize) -> Observation {
        let mut data = [0.0f32; OBS_SIZE];
        let me = &self.fighters[player];
        let them = &self.fighters[1 - player];
        let arena = &self.config.arena;
        let movement = &self.config.movement;
        let max_health = self.config.combat.max_health;
        let max_jump = movement.jump_impulse.abs();

        let rel = them.position - me.position;
        data[Observation::DX] = scaled(rel.x, arena.width);
        data[Observation::DY] = scaled(rel.y, arena.height);
        data[Observation::HEALTH_SELF] = scaled(me.health, max_health);
        data[Observation::HEALTH_OPP] = scaled(them.health, max_health);
        data[Observation::VX_SELF] = scaled(me.velocity.x, movement.walk_speed);
        data[Observation::VY_SELF] = scaled(me.velocity.y, max_jump);
        data[Observation::VX_OPP] = scaled(them.velocity.x, movement.walk_speed);
        data[Observation::VY_OPP] = scaled(them.velocity.y, max_jump);

        data[Observation::STUNNED_SELF] = flag(me.is_stunned());
        data[Observation::ATTACKING_SELF] = flag(me.is_attacking());
        data[Observation::BLOCKING_SELF] = flag(me.blocking);
        data[Observation::CROUCHING_SELF] = flag(me.crouching);
        data[Observation::STUNNED_OPP] = flag(them.is_stunned());
        data[Observation::ATTACKING_OPP] = flag(them.is_attacking());
        data[Observation::BLOCKING_OPP] = flag(them.blocking);
        data[Observation::CROUCHING_OPP] = flag(them.crouching);

        Observation { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_size() {
        let state = SimState::new(SimConfig::default());
        assert_eq!(state.observe(0).data.len(), OBS_SIZE);
    }

    #[test]
    fn test_observation_initial_values() {
        let state = SimState::new(SimConfig::default());
        let obs = state.observe(0);
        let expected_dx = (ARENA_WIDTH - BODY_WIDTH - 2.0 * SPAWN_MARGIN) / ARENA_WIDTH;
        assert!((obs.data[Observation::DX] - expected_dx).abs() < 1e-6);
        assert_eq!(obs.data[Observation::DY], 0.0);
        assert_eq!(obs.data[Observation::HEALTH_SELF], 1.0);
        assert_eq!(obs.data[Observation::HEALTH_OPP], 1.0);
        for i in Observation::VX_SELF..OBS_SIZE {
            assert_eq!(obs.data[i], 0.0, "index {} should be zero", i);
        }
    }

    #[test]
    fn test_observation_symmetry() {
        let state = SimState::new(SimConfig::default());
        let obs0 = state.observe(0);
        let obs1 = state.observe(1);
        assert!((obs0.data[Observation::DX] + obs1.data[Observation::DX]).abs() < 1e-6);
        assert_eq!(obs0.data[Observation::HEALTH_SELF], obs1.data[Observation::HEALTH_OPP]);
    }

    #[test]
    fn test_flags_and_velocities() {
        let mut state = SimState::new(SimConfig::default());
        state.fighters[0].velocity.x = -WALK_SPEED;
        state.fighters[0].velocity.y = JUMP_IMPULSE;
        state.fighters[0].blocking = true;
        state.fighters[1].stun_frames = 5;
        state.fighters[1].attack_kind = AttackKind::Heavy;
        state.fighters[1].attack_timer = 3;
        state.fighters[1].crouching = true;

        let obs = state.observe(0);
        assert_eq!(obs.data[Observation::VX_SELF], -1.0);
        assert_eq!(obs.data[Observation::VY_SELF], -1.0);
        assert_eq!(obs.data[Observation::BLOCKING_SELF], 1.0);
        assert_eq!(obs.data[Observation::STUNNED_SELF], 0.0);
        assert_eq!(obs.data[Observation::STUNNED_OPP], 1.0);
        assert_eq!(obs.data[Observation::ATTACKING_OPP], 1.0);
        assert_eq!(obs.data[Observation::CROUCHING_OPP], 1.0);
        assert_eq!(obs.data[Observation::BLOCKING_OPP], 0.0);
    }

    #[test]
    fn test_zero_walk_speed_does_not_divide_by_zero() {
        let mut config = SimConfig::default();
        config.movement.walk_speed = 0.0;
        let mut state = SimState::new(config);
        state.fighters[0].velocity.x = 3.0;
        let obs = state.observe(0);
        assert_eq!(obs.data[Observation::VX_SELF], 0.0);
        assert!(obs.data.iter().all(|v| v.is_finite()));
    }
}
