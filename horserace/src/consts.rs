//! Default game constants. Most of them can be overridden through the parameter file, see
//! `pre::read_game_pars::GamePars`.

/// Bounds of the random pool size, MAX_HORSES is also the size of the name and color tables
pub const MIN_HORSES: usize = 1;
pub const MAX_HORSES: usize = 20;
/// Number of horses running in every round
pub const HORSES_PER_RACE: usize = 10;
/// Number of rounds in a schedule
pub const TOTAL_ROUNDS: usize = 6;
/// (m) Distance of each round
pub const ROUND_DISTANCES: [u32; TOTAL_ROUNDS] = [1200, 1400, 1600, 1800, 2000, 2200];

pub const MIN_CONDITION: u32 = 1;
pub const MAX_CONDITION: u32 = 100;

/// Condition multiplier applied to every participant after a round
pub const FATIGUE_FACTOR: f64 = 0.95;
/// Condition points regained by horses sitting a round out (inclusive range)
pub const REST_RECOVERY_MIN: u32 = 2;
pub const REST_RECOVERY_MAX: u32 = 6;

/// Points for positions 1 to 10, every other position scores nothing
pub const POSITION_POINTS: [u32; 10] = [10, 8, 6, 5, 4, 3, 2, 1, 1, 1];

pub const ANIMATION_FPS: f64 = 60.0;
/// (ms) Nominal duration of one animation frame
pub const FRAME_DURATION_MS: f64 = 1000.0 / ANIMATION_FPS;

/// Accepted range of the playback speed multiplier
pub const MIN_SPEED_MULTIPLIER: f64 = 0.1;
pub const MAX_SPEED_MULTIPLIER: f64 = 20.0;

pub const HORSE_NAMES: [&str; MAX_HORSES] = [
    "Thunder Strike",
    "Lightning Bolt",
    "Golden Wind",
    "Silver Arrow",
    "Midnight Star",
    "Desert Storm",
    "Ocean Breeze",
    "Mountain King",
    "Fire Spirit",
    "Ice Runner",
    "Brave Heart",
    "Swift Shadow",
    "Royal Prince",
    "Wild Mustang",
    "Storm Chaser",
    "Victory Dance",
    "Noble Knight",
    "Mystic Dream",
    "Phoenix Rising",
    "Eternal Flame",
];

/// Hex colors, index-aligned with HORSE_NAMES
pub const HORSE_COLORS: [&str; MAX_HORSES] = [
    "#FF4444", "#44FF44", "#4444FF", "#FFFF44", "#FF44FF", "#44FFFF", "#FF8844", "#8844FF",
    "#44FF88", "#FF4488", "#88FF44", "#4488FF", "#FFB700", "#00FFB7", "#B700FF", "#FF00B7",
    "#B7FF00", "#00B7FF", "#8B4513", "#2E8B57",
];
