use brawl_shared::*;

/// Apply a requested action to one fighter and advance its timers by one tick.
///
/// Priority: stunned > mid-attack > free. Only a free fighter reacts to input;
/// stunned and attacking fighters keep their velocity and let drag decay it.
/// Returns `true` when the action started a new attack.
pub fn resolve_action(f: &mut FighterState, action: Action, config: &SimConfig) -> bool {
    // Block and crouch never survive stun or an attack in progress
    f.blocking = false;
    f.crouching = false;

    let started = if f.is_stunned() || f.is_attacking() {
        false
    } else {
        apply_free_action(f, action, config)
    };

    tick_timers(f);
    started
}

fn apply_free_action(f: &mut FighterState, action: Action, config: &SimConfig) -> bool {
    let movement = &config.movement;
    match action {
        Action::Idle => {}
        Action::Left => f.velocity.x = -movement.walk_speed,
        Action::Right => f.velocity.x = movement.walk_speed,
        Action::Jump => {
            if f.is_grounded(&config.arena) {
                f.velocity.y = movement.jump_impulse;
            }
        }
        Action::Crouch => {
            f.velocity.x = 0.0;
            f.crouching = true;
        }
        Action::Block => {
            f.velocity.x = 0.0;
            f.blocking = true;
        }
        Action::Light | Action::Heavy | Action::Special => {
            let kind = action.attack_kind();
            let Some(tier) = config.combat.tiers.get(kind) else {
                return false;
            };
            f.attack_kind = kind;
            f.attack_timer = tier.duration();
            f.has_hit = false;
            f.velocity.x = 0.0;
            return true;
        }
    }
    false
}

fn tick_timers(f: &mut FighterState) {
    f.stun_frames = f.stun_frames.saturating_sub(1);
    if f.attack_timer > 0 {
        f.attack_timer -= 1;
    }
    if f.attack_timer == 0 {
        f.attack_kind = AttackKind::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter(config: &SimConfig) -> FighterState {
        FighterState::new(300.0, config)
    }

    #[test]
    fn test_walk_sets_horizontal_velocity() {
        let config = SimConfig::default();
        let mut f = fighter(&config);

        resolve_action(&mut f, Action::Right, &config);
        assert_eq!(f.velocity.x, config.movement.walk_speed);

        resolve_action(&mut f, Action::Left, &config);
        assert_eq!(f.velocity.x, -config.movement.walk_speed);
    }

    #[test]
    fn test_idle_keeps_velocity() {
        let config = SimConfig::default();
        let mut f = fighter(&config);
        f.velocity.x = 3.0;

        resolve_action(&mut f, Action::Idle, &config);
        assert_eq!(f.velocity.x, 3.0);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let config = SimConfig::default();
        let mut f = fighter(&config);

        resolve_action(&mut f, Action::Jump, &config);
        assert_eq!(f.velocity.y, config.movement.jump_impulse);

        let mut airborne = fighter(&config);
        airborne.position.y -= 40.0;
        resolve_action(&mut airborne, Action::Jump, &config);
        assert_eq!(airborne.velocity.y, 0.0);
    }

    #[test]
    fn test_block_and_crouch_stop_and_set_flags() {
        let config = SimConfig::default();
        let mut f = fighter(&config);
        f.velocity.x = 5.0;
        resolve_action(&mut f, Action::Block, &config);
        assert!(f.blocking);
        assert!(!f.crouching);
        assert_eq!(f.velocity.x, 0.0);

        f.velocity.x = 5.0;
        resolve_action(&mut f, Action::Crouch, &config);
        assert!(f.crouching);
        assert!(!f.blocking);
        assert_eq!(f.velocity.x, 0.0);

        resolve_action(&mut f, Action::Idle, &config);
        assert!(!f.crouching);
        assert!(!f.blocking);
    }

    #[test]
    fn test_attack_activation_counts_first_tick() {
        let config = SimConfig::default();
        let mut f = fighter(&config);
        f.has_hit = true;
        f.velocity.x = 5.0;

        assert!(resolve_action(&mut f, Action::Heavy, &config));
        assert_eq!(f.attack_kind, AttackKind::Heavy);
        assert_eq!(f.attack_timer, config.combat.tiers.heavy.duration() - 1);
        assert!(!f.has_hit);
        assert_eq!(f.velocity.x, 0.0);
    }

    #[test]
    fn test_attack_cannot_be_redirected() {
        let config = SimConfig::default();
        let mut f = fighter(&config);
        resolve_action(&mut f, Action::Light, &config);
        f.velocity.x = 2.0;

        assert!(!resolve_action(&mut f, Action::Left, &config));
        assert_eq!(f.velocity.x, 2.0);
        assert_eq!(f.attack_kind, AttackKind::Light);

        assert!(!resolve_action(&mut f, Action::Special, &config));
        assert_eq!(f.attack_kind, AttackKind::Light);
    }

    #[test]
    fn test_attack_expires_to_none() {
        let config = SimConfig::default();
        let mut f = fighter(&config);
        resolve_action(&mut f, Action::Light, &config);
        for _ in 1..config.combat.tiers.light.duration() {
            assert_eq!(f.attack_kind, AttackKind::Light);
            resolve_action(&mut f, Action::Idle, &config);
        }
        assert_eq!(f.attack_timer, 0);
        assert_eq!(f.attack_kind, AttackKind::None);
    }

    #[test]
    fn test_stun_ignores_input_and_counts_down() {
        let config = SimConfig::default();
        let mut f = fighter(&config);
        f.stun_frames = 3;
        f.blocking = true;
        f.velocity.x = 4.0;

        resolve_action(&mut f, Action::Block, &config);
        assert!(!f.blocking);
        assert_eq!(f.stun_frames, 2);
        assert_eq!(f.velocity.x, 4.0);

        resolve_action(&mut f, Action::Light, &config);
        assert_eq!(f.attack_kind, AttackKind::None);
        assert_eq!(f.stun_frames, 1);
    }
}
