use crate::consts::{HORSE_COLORS, HORSE_NAMES, MAX_CONDITION, MIN_CONDITION};
use helpers::general::InputValueError;
use helpers::random::{random_int, shuffle};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// * `id` - Unique identifier within the pool, e.g. "7"
/// * `name` - Horse name, e.g. Golden Wind
/// * `color` - Hex color used by the presentation layer, e.g. #FFB700
/// * `condition` - Form in [1, 100], drives the base speed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horse {
    pub id: String,
    pub name: String,
    pub color: String,
    pub condition: u32,
}

/// HorsePool is the interface the engine needs from whoever owns the horses.
pub trait HorsePool {
    fn get_all(&self) -> &[Horse];
    fn get_by_id(&self, id: &str) -> Option<&Horse>;
    /// The new condition is clamped to [MIN_CONDITION, MAX_CONDITION].
    fn mutate_condition(&mut self, id: &str, new_condition: u32);
}

/// Stable keeps the horse pool in generation order with an id index for O(1) lookups.
#[derive(Debug, Clone, Default)]
pub struct Stable {
    horses: Vec<Horse>,
    idx_by_id: HashMap<String, usize>,
}

impl Stable {
    pub fn new(horses: Vec<Horse>) -> Stable {
        let idx_by_id = horses
            .iter()
            .enumerate()
            .map(|(i, horse)| (horse.id.to_owned(), i))
            .collect();

        Stable { horses, idx_by_id }
    }

    /// generate creates a pool with a random size in [min_count, max_count] and ids "0", "1", ...
    /// Names and colors are unique within the pool, conditions are drawn from [1, 100].
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        min_count: usize,
        max_count: usize,
    ) -> Result<Stable, InputValueError> {
        if min_count == 0 || min_count > max_count || max_count > HORSE_NAMES.len() {
            return Err(InputValueError::new(format!(
                "pool size range must lie in [1, {}], but is [{}, {}]",
                HORSE_NAMES.len(),
                min_count,
                max_count
            )));
        }
        let count = random_int(rng, min_count as i64, max_count as i64) as usize;

        let table_idxs: Vec<usize> = (0..HORSE_NAMES.len()).collect();
        let horses = shuffle(rng, &table_idxs)
            .into_iter()
            .take(count)
            .enumerate()
            .map(|(new_idx, table_idx)| Horse {
                id: new_idx.to_string(),
                name: HORSE_NAMES[table_idx].to_owned(),
                color: HORSE_COLORS[table_idx].to_owned(),
                condition: random_condition(rng),
            })
            .collect();

        Ok(Stable::new(horses))
    }

    /// reset_conditions draws a fresh condition for every horse in the pool.
    pub fn reset_conditions<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for horse in self.horses.iter_mut() {
            horse.condition = random_condition(rng);
        }
    }

    pub fn len(&self) -> usize {
        self.horses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.horses.is_empty()
    }
}

impl HorsePool for Stable {
    fn get_all(&self) -> &[Horse] {
        &self.horses
    }

    fn get_by_id(&self, id: &str) -> Option<&Horse> {
        self.idx_by_id.get(id).map(|&i| &self.horses[i])
    }

    fn mutate_condition(&mut self, id: &str, new_condition: u32) {
        if let Some(&i) = self.idx_by_id.get(id) {
            self.horses[i].condition = new_condition.clamp(MIN_CONDITION, MAX_CONDITION);
        }
    }
}

fn random_condition<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    random_int(rng, MIN_CONDITION as i64, MAX_CONDITION as i64) as u32
}
