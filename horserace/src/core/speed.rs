use crate::core::horse::Horse;
use helpers::random::random_float;
use rand::Rng;

/// (m/s) Base speed of a horse in perfect condition
const MAX_BASE_SPEED: f64 = 45.0;
/// (m/s) Soft floor, slower draws are lifted into [SPEED_FLOOR, SPEED_FLOOR + SPEED_FLOOR_BAND]
const SPEED_FLOOR: f64 = 24.0;
const SPEED_FLOOR_BAND: f64 = 2.0;
const RANDOM_FACTOR_MIN: f64 = 0.85;
const RANDOM_FACTOR_MAX: f64 = 1.15;
/// (m) Preferred distances lie in [OPTIMAL_DISTANCE_BASE, OPTIMAL_DISTANCE_BASE + OPTIMAL_DISTANCE_SPAN[
const OPTIMAL_DISTANCE_BASE: u32 = 1200;
const OPTIMAL_DISTANCE_SPAN: u32 = 1100;
const MIN_SUITABILITY: f64 = 0.7;

/// Highest speed the model can produce.
pub const MAX_SPEED: f64 = MAX_BASE_SPEED * RANDOM_FACTOR_MAX;

/// stable_hash sums the character codes of the id, so the same id always maps to the same
/// preferred distance.
pub fn stable_hash(id: &str) -> u32 {
    id.chars().fold(0u32, |acc, c| acc.wrapping_add(c as u32))
}

/// optimal_distance returns the preferred race distance (m) of the horse.
pub fn optimal_distance(horse: &Horse) -> f64 {
    (OPTIMAL_DISTANCE_BASE + stable_hash(&horse.id) % OPTIMAL_DISTANCE_SPAN) as f64
}

/// distance_suitability returns the performance multiplier in [0.7, 1.0] of the horse for the
/// given distance, decreasing linearly with the deviation from its preferred distance.
pub fn distance_suitability(horse: &Horse, distance: f64) -> f64 {
    let deviation = (distance - optimal_distance(horse)).abs();
    (1.0 - deviation / 2000.0).max(MIN_SUITABILITY)
}

/// compute_speed returns the race speed (m/s) of the horse for the given distance.
pub fn compute_speed<R: Rng + ?Sized>(horse: &Horse, distance: f64, rng: &mut R) -> f64 {
    let base_speed = horse.condition as f64 / 100.0 * MAX_BASE_SPEED;
    let suitability = distance_suitability(horse, distance);
    let random_factor = rng.gen_range(RANDOM_FACTOR_MIN..=RANDOM_FACTOR_MAX);

    let speed = base_speed * suitability * random_factor;

    if speed < SPEED_FLOOR {
        rng.gen_range(SPEED_FLOOR..=SPEED_FLOOR + SPEED_FLOOR_BAND)
    } else {
        speed
    }
}

/// compute_expected_finish_time_ms returns the a-priori finish time (ms) of the horse starting
/// at `index` in the field. The index offset and the jitter terms spread out horses with equal
/// speeds. The value is a baseline for display only, the finish order comes from the live
/// simulation.
pub fn compute_expected_finish_time_ms<R: Rng + ?Sized>(
    speed: f64,
    distance: f64,
    index: usize,
    rng: &mut R,
) -> f64 {
    let t_base = distance / speed * 1000.0;
    let t_index = index as f64 * 10.0;
    let t_random = random_float(rng, -50.0, 50.0);
    let t_speed = speed / 10.0 * random_float(rng, -0.5, 0.5);

    t_base + t_index + t_random + t_speed
}
