// Arena (side-view: X=horizontal, Y grows downward, origin top-left)
pub const ARENA_WIDTH: f32 = 800.0;
pub const ARENA_HEIGHT: f32 = 600.0;
pub const GROUND_Y: f32 = 500.0;

// Fighter body
pub const BODY_WIDTH: f32 = 50.0;
pub const BODY_HEIGHT: f32 = 100.0;
pub const CROUCH_HEIGHT: f32 = 50.0;
pub const MAX_HEALTH: f32 = 100.0;

// Movement (units per tick)
pub const WALK_SPEED: f32 = 5.0;
pub const JUMP_IMPULSE: f32 = -15.0;
pub const GRAVITY: f32 = 0.8;
pub const DRAG: f32 = 0.85;
pub const VELOCITY_EPSILON: f32 = 0.05;

// Attack reach: base plus per-tier bonus
pub const BASE_REACH: f32 = 90.0;

// Frame phases: [startup, active, recovery]
pub const LIGHT_PHASES: [u32; 3] = [4, 6, 12]; // 22 total
pub const HEAVY_PHASES: [u32; 3] = [10, 8, 20]; // 38 total
pub const SPECIAL_PHASES: [u32; 3] = [15, 10, 35]; // 60 total

pub const LIGHT_DAMAGE: f32 = 1.5;
pub const HEAVY_DAMAGE: f32 = 4.0;
pub const SPECIAL_DAMAGE: f32 = 8.0;

pub const LIGHT_STUN: u32 = 18;
pub const HEAVY_STUN: u32 = 35;
pub const SPECIAL_STUN: u32 = 55;

pub const LIGHT_REACH_BONUS: f32 = 0.0;
pub const HEAVY_REACH_BONUS: f32 = 20.0;
pub const SPECIAL_REACH_BONUS: f32 = 50.0;

// Knockback impulses (units per tick)
pub const KNOCKBACK_VICTIM: f32 = 8.0;
pub const KNOCKBACK_ATTACKER: f32 = 4.0;

// Episode
pub const MAX_STEPS: u32 = 2000;
pub const SPAWN_MARGIN: f32 = 150.0;
pub const SPAWN_JITTER: f32 = 100.0;

// Scripted opponent
pub const PERSONALITY_WEIGHTS: [f32; 4] = [0.4, 0.2, 0.3, 0.1]; // aggressive, defensive, random, passive
pub const PERSISTENCE_MIN: u32 = 4;
pub const PERSISTENCE_MAX: u32 = 12;
pub const APPROACH_DISTANCE: f32 = 150.0;

// Observation / action spaces
pub const OBS_SIZE: usize = 16;
pub const ACTION_COUNT: usize = 9;
