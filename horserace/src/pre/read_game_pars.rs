use crate::consts::{
    FATIGUE_FACTOR, FRAME_DURATION_MS, HORSES_PER_RACE, HORSE_NAMES, MAX_HORSES, MIN_HORSES,
    REST_RECOVERY_MAX, REST_RECOVERY_MIN, ROUND_DISTANCES,
};
use anyhow::Context;
use helpers::general::InputValueError;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;

/// GamePars contains all tunable parameters of a championship. Every field may be omitted in the
/// parameter file, in which case the default from `consts` is used.
/// * `min_pool_size` / `pool_size` - Range the size of a generated pool is drawn from, a pool
///   smaller than `horses_per_race` has to be generated again before a schedule can be built
/// * `horses_per_race` - Number of horses running in every round
/// * `round_distances` - (m) One entry per round, its length is the number of rounds
/// * `fatigue_factor` - Condition multiplier applied to participants after a round, in (0, 1]
/// * `rest_recovery_min` / `rest_recovery_max` - Condition range regained by resting horses
/// * `frame_duration_ms` - (ms) Nominal duration of one animation frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamePars {
    pub min_pool_size: usize,
    pub pool_size: usize,
    pub horses_per_race: usize,
    pub round_distances: Vec<u32>,
    pub fatigue_factor: f64,
    pub rest_recovery_min: u32,
    pub rest_recovery_max: u32,
    pub frame_duration_ms: f64,
}

impl Default for GamePars {
    fn default() -> Self {
        GamePars {
            min_pool_size: MIN_HORSES,
            pool_size: MAX_HORSES,
            horses_per_race: HORSES_PER_RACE,
            round_distances: ROUND_DISTANCES.to_vec(),
            fatigue_factor: FATIGUE_FACTOR,
            rest_recovery_min: REST_RECOVERY_MIN,
            rest_recovery_max: REST_RECOVERY_MAX,
            frame_duration_ms: FRAME_DURATION_MS,
        }
    }
}

impl GamePars {
    /// validate checks the parameters for consistency.
    pub fn validate(&self) -> Result<(), InputValueError> {
        if self.pool_size == 0 || self.pool_size > HORSE_NAMES.len() {
            return Err(InputValueError::new(format!(
                "pool_size must be in [1, {}], but is {}",
                HORSE_NAMES.len(),
                self.pool_size
            )));
        }
        if self.min_pool_size == 0 || self.min_pool_size > self.pool_size {
            return Err(InputValueError::new(format!(
                "min_pool_size must be in [1, pool_size = {}], but is {}",
                self.pool_size, self.min_pool_size
            )));
        }
        if self.horses_per_race == 0 {
            return Err(InputValueError::new("horses_per_race must be at least 1"));
        }
        if self.round_distances.is_empty() {
            return Err(InputValueError::new(
                "round_distances must contain at least one distance",
            ));
        }
        if self.round_distances.iter().any(|&distance| distance == 0) {
            return Err(InputValueError::new(
                "round_distances must only contain positive distances",
            ));
        }
        if !(self.fatigue_factor > 0.0 && self.fatigue_factor <= 1.0) {
            return Err(InputValueError::new(format!(
                "fatigue_factor must be in (0, 1], but is {}",
                self.fatigue_factor
            )));
        }
        if self.rest_recovery_min > self.rest_recovery_max {
            return Err(InputValueError::new(format!(
                "rest_recovery_min ({}) must not exceed rest_recovery_max ({})",
                self.rest_recovery_min, self.rest_recovery_max
            )));
        }
        if !(self.frame_duration_ms > 0.0) {
            return Err(InputValueError::new(format!(
                "frame_duration_ms must be positive, but is {}",
                self.frame_duration_ms
            )));
        }
        Ok(())
    }

    pub fn total_rounds(&self) -> usize {
        self.round_distances.len()
    }
}

/// read_game_pars reads the JSON file, decodes it into the game parameters struct and validates
/// the result.
pub fn read_game_pars(filepath: &Path) -> anyhow::Result<GamePars> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;
    let pars: GamePars = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    pars.validate().context(format!(
        "Parameter file {} contains invalid values!",
        filepath.display()
    ))?;
    Ok(pars)
}
