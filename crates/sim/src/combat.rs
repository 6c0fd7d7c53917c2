use brawl_shared::*;

/// Axis-aligned rectangle, `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Strict overlap: rectangles that only touch along an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

pub fn body_rect(f: &FighterState, arena: &ArenaConfig) -> Rect {
    Rect {
        x: f.position.x,
        y: f.position.y,
        w: arena.body_width,
        h: f.height(arena),
    }
}

/// +1 when the defender is to the attacker's right, -1 otherwise.
pub fn attack_direction(attacker: &FighterState, defender: &FighterState) -> f32 {
    if attacker.position.x < defender.position.x {
        1.0
    } else {
        -1.0
    }
}

/// The attacker's body extended by `reach` towards `direction`.
pub fn attack_rect(attacker: &FighterState, direction: f32, reach: f32, arena: &ArenaConfig) -> Rect {
    let mut rect = body_rect(attacker, arena);
    if direction < 0.0 {
        rect.x -= reach;
    }
    rect.w += reach;
    rect
}

/// An attack hitbox touching the opponent's body on this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub attacker: usize,
    pub kind: AttackKind,
    pub tier: AttackTier,
    pub direction: f32,
    /// The defender was blocking: the contact has no effect and does not
    /// consume the attacker's hit-guard.
    pub blocked: bool,
}

impl Contact {
    pub fn defender(&self) -> usize {
        1 - self.attacker
    }

    pub fn landed(&self) -> bool {
        !self.blocked
    }
}

/// Check whether fighter `attacker` has a live hitbox overlapping its opponent.
pub fn find_contact(fighters: &[FighterState; 2], attacker: usize, config: &SimConfig) -> Option<Contact> {
    let me = &fighters[attacker];
    let them = &fighters[1 - attacker];

    if !me.is_attacking() || me.has_hit {
        return None;
    }
    let tier = *config.combat.tiers.get(me.attack_kind)?;

    // Startup and recovery frames carry no hitbox
    let elapsed = tier.duration().saturating_sub(me.attack_timer);
    if !tier.is_active_at(elapsed) {
        return None;
    }

    let direction = attack_direction(me, them);
    let hitbox = attack_rect(me, direction, config.combat.reach(&tier), &config.arena);
    if !hitbox.overlaps(&body_rect(them, &config.arena)) {
        return None;
    }

    Some(Contact {
        attacker,
        kind: me.attack_kind,
        tier,
        direction,
        blocked: them.blocking,
    })
}

/// Resolve both fighters' attacks against the same pre-combat state, then
/// commit the results. Neither side's hit can pre-empt the other's.
pub fn resolve_combat(fighters: &mut [FighterState; 2], config: &SimConfig) -> [Option<Contact>; 2] {
    let contacts = [
        find_contact(fighters, 0, config),
        find_contact(fighters, 1, config),
    ];

    // Knockback impulses from both contacts sum when they hit the same fighter
    let mut knockback: [Option<f32>; 2] = [None, None];

    for contact in contacts.iter().flatten().filter(|c| c.landed()) {
        let tier = &contact.tier;
        let defender = &mut fighters[contact.defender()];
        defender.health -= tier.damage;
        defender.apply_stun(tier.stun);

        fighters[contact.attacker].has_hit = true;

        *knockback[contact.defender()].get_or_insert(0.0) += contact.direction * tier.knockback_victim;
        *knockback[contact.attacker].get_or_insert(0.0) -= contact.direction * tier.knockback_attacker;
    }

    for (f, impulse) in fighters.iter_mut().zip(knockback) {
        if let Some(vx) = impulse {
            f.velocity.x = vx;
        }
    }

    contacts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(config: &SimConfig, x0: f32, x1: f32) -> [FighterState; 2] {
        [FighterState::new(x0, config), FighterState::new(x1, config)]
    }

    /// Put `f` into the first active frame of a `kind` attack.
    fn arm(f: &mut FighterState, kind: AttackKind, config: &SimConfig) {
        let tier = config.combat.tiers.get(kind).unwrap();
        f.attack_kind = kind;
        f.attack_timer = tier.duration() - tier.startup;
        f.has_hit = false;
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect { x: 0.0, y: 0.0, w: 10.0, h: 10.0 };
        let b = Rect { x: 10.0, y: 0.0, w: 10.0, h: 10.0 };
        let c = Rect { x: 9.9, y: 9.9, w: 10.0, h: 10.0 };
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
    }

    #[test]
    fn test_attack_rect_extends_toward_opponent() {
        let config = SimConfig::default();
        let fighters = pair(&config, 300.0, 500.0);
        let arena = &config.arena;

        let right = attack_rect(&fighters[0], attack_direction(&fighters[0], &fighters[1]), 90.0, arena);
        assert_eq!(right.x, 300.0);
        assert_eq!(right.w, 140.0);

        let left = attack_rect(&fighters[1], attack_direction(&fighters[1], &fighters[0]), 90.0, arena);
        assert_eq!(left.x, 410.0);
        assert_eq!(left.w, 140.0);
    }

    #[test]
    fn test_no_hitbox_outside_active_window() {
        let config = SimConfig::default();
        let mut fighters = pair(&config, 300.0, 320.0);
        fighters[0].attack_kind = AttackKind::Light;
        fighters[0].attack_timer = config.combat.tiers.light.duration() - 1; // startup
        assert!(find_contact(&fighters, 0, &config).is_none());

        fighters[0].attack_timer = 2; // recovery
        assert!(find_contact(&fighters, 0, &config).is_none());
    }

    #[test]
    fn test_hit_applies_damage_stun_and_knockback() {
        let config = SimConfig::default();
        let mut fighters = pair(&config, 300.0, 320.0);
        arm(&mut fighters[0], AttackKind::Heavy, &config);
        let tier = config.combat.tiers.heavy;

        let contacts = resolve_combat(&mut fighters, &config);
        assert!(contacts[0].is_some_and(|c| c.landed()));
        assert!(contacts[1].is_none());

        assert_eq!(fighters[1].health, config.combat.max_health - tier.damage);
        assert_eq!(fighters[1].stun_frames, tier.stun);
        assert_eq!(fighters[1].velocity.x, tier.knockback_victim);
        assert_eq!(fighters[0].velocity.x, -tier.knockback_attacker);
        assert!(fighters[0].has_hit);
    }

    #[test]
    fn test_hit_guard_blocks_second_damage() {
        let config = SimConfig::default();
        let mut fighters = pair(&config, 300.0, 320.0);
        arm(&mut fighters[0], AttackKind::Light, &config);

        resolve_combat(&mut fighters, &config);
        let after_first = fighters[1].health;
        fighters[0].attack_timer -= 1;
        let contacts = resolve_combat(&mut fighters, &config);

        assert!(contacts[0].is_none());
        assert_eq!(fighters[1].health, after_first);
    }

    #[test]
    fn test_block_negates_without_consuming_guard() {
        let config = SimConfig::default();
        let mut fighters = pair(&config, 300.0, 320.0);
        arm(&mut fighters[0], AttackKind::Light, &config);
        fighters[1].blocking = true;

        let contacts = resolve_combat(&mut fighters, &config);
        assert!(contacts[0].is_some_and(|c| c.blocked));
        assert_eq!(fighters[1].health, config.combat.max_health);
        assert_eq!(fighters[1].stun_frames, 0);
        assert_eq!(fighters[1].velocity.x, 0.0);
        assert!(!fighters[0].has_hit);

        // Dropping the guard inside the same active window lets the hit land
        fighters[1].blocking = false;
        fighters[0].attack_timer -= 1;
        let contacts = resolve_combat(&mut fighters, &config);
        assert!(contacts[0].is_some_and(|c| c.landed()));
        assert!(fighters[1].health < config.combat.max_health);
    }

    #[test]
    fn test_hit_interrupts_defender_attack() {
        let config = SimConfig::default();
        let mut fighters = pair(&config, 300.0, 320.0);
        arm(&mut fighters[0], AttackKind::Light, &config);
        fighters[1].attack_kind = AttackKind::Special;
        fighters[1].attack_timer = config.combat.tiers.special.duration() - 1;

        resolve_combat(&mut fighters, &config);
        assert_eq!(fighters[1].attack_kind, AttackKind::None);
        assert_eq!(fighters[1].attack_timer, 0);
    }

    #[test]
    fn test_simultaneous_hits_both_land() {
        let config = SimConfig::default();
        let mut fighters = pair(&config, 300.0, 320.0);
        arm(&mut fighters[0], AttackKind::Light, &config);
        arm(&mut fighters[1], AttackKind::Light, &config);
        let tier = config.combat.tiers.light;

        let contacts = resolve_combat(&mut fighters, &config);
        assert!(contacts.iter().all(|c| c.is_some_and(|c| c.landed())));
        assert_eq!(fighters[0].health, fighters[1].health);
        assert_eq!(fighters[0].attack_kind, AttackKind::None);
        assert_eq!(fighters[1].attack_kind, AttackKind::None);

        let push = tier.knockback_victim + tier.knockback_attacker;
        assert_eq!(fighters[0].velocity.x, -push);
        assert_eq!(fighters[1].velocity.x, push);
    }

    #[test]
    fn test_out_of_reach_misses() {
        let config = SimConfig::default();
        // body 50 + reach 90 = 140: a defender starting at x=440 is just touching
        let mut fighters = pair(&config, 300.0, 440.0);
        arm(&mut fighters[0], AttackKind::Light, &config);
        assert!(find_contact(&fighters, 0, &config).is_none());

        fighters[1].position.x = 439.0;
        assert!(find_contact(&fighters, 0, &config).is_some());
    }
}
