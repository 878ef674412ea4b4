pub const TICK_RATE: u32 = 20;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const TILE_SIZE: i32 = 32;
pub const GRID_COLUMNS: usize = 19;
pub const GRID_ROWS: usize = 21;

/// Pixel rows (top edge of an entity) inside which horizontal wrap-around is allowed.
pub const PORTAL_BAND_TOP: i32 = 8 * TILE_SIZE;
pub const PORTAL_BAND_BOTTOM: i32 = 10 * TILE_SIZE;

pub const BASE_SPEED: i32 = TILE_SIZE / 4;
pub const CLONE_SPEED_MULTIPLIER: f32 = 1.5;
pub const FROZEN_SPEED_MULTIPLIER: f32 = 1.0 / 3.0;
pub const CLONE_ROTATION_STEP: f32 = 10.0;

pub const STARTING_LIVES: i32 = 3;
pub const FOOD_POINTS: i32 = 10;
pub const POWER_PLUS_POINTS: i32 = 10;
pub const GHOST_EAT_POINTS: i32 = 200;
pub const POWER_PLUS_PER_LEVEL: usize = 9;

pub const SCARED_DURATION_MS: u64 = 5_000;
pub const SHIELD_BREAK_SCARED_DURATION_MS: u64 = 15_000;
pub const FROZEN_DURATION_MS: u64 = 7_000;
pub const ENTANGLED_DURATION_MS: u64 = 3_000;

pub const GHOST_RESPAWN_MS: u64 = 30_000;
pub const TELEPORT_COOLDOWN_MS: u64 = 15_000;
pub const SILK_TRAP_COOLDOWN_MS: u64 = 15_000;
pub const TRAP_DURATION_MS: u64 = 10_000;
pub const PINK_SHIELD_CHARGES: i32 = 3;

pub const INTERSECTION_TURN_CHANCE: f32 = 0.6;
pub const RED_DETOUR_CHANCE: f32 = 0.1;
pub const PINK_SECONDARY_AXIS_CHANCE: f32 = 0.12;
pub const ORANGE_RANDOM_CHANCE: f32 = 0.15;

pub const PLACEMENT_ATTEMPTS: usize = 100;

/// Food and power-plus pellets are small squares centered in their tile.
pub const PELLET_SIZE: i32 = 4;

/// The 19x21 reference maze. The two ends of row 9 are portal cells.
pub const REFERENCE_LAYOUT: [&str; GRID_ROWS] = [
    "XXXXXXXXXXXXXXXXXXX",
    "X                 X",
    "X XX XXX X XXX XX X",
    "X                 X",
    "X XX X XXXXX X XX X",
    "X    X       X    X",
    "XXXX XXXX XXXX XXXX",
    "OOOX X       X XOOO",
    "XXXX X XXrXX X XXXX",
    "O      b p o      O",
    "XXXX X XXXXX X XXXX",
    "OOOX X       X XOOO",
    "XXXX X XXXXX X XXXX",
    "X    X       X    X",
    "X XX XXX X XXX XX X",
    "X  X     P     X  X",
    "XX X X XXXXX X X XX",
    "X    X       X    X",
    "X XXXXXX X XXXXXX X",
    "X                 X",
    "XXXXXXXXXXXXXXXXXXX",
];

/// Pixels per tick while Frozen. Fractional; movers bank the remainder between ticks.
pub fn frozen_speed(speed: f32) -> f32 {
    speed * FROZEN_SPEED_MULTIPLIER
}

pub fn clone_speed() -> i32 {
    (BASE_SPEED as f32 * CLONE_SPEED_MULTIPLIER) as i32
}

