//! Randomization utilities. Every function draws from the generator handed in, so a seeded
//! generator makes the results reproducible.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

/// SelectionOverflow is returned if more items are requested than can be drawn without
/// replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Cannot select {requested} items from {available} available")]
pub struct SelectionOverflow {
    pub requested: usize,
    pub available: usize,
}

/// random_int returns an integer in [min, max] (both inclusive).
pub fn random_int<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> i64 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..=max)
}

/// random_float returns a float in [min, max[. An empty range yields min.
pub fn random_float<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..max)
}

/// shuffle returns a shuffled copy of the items (Fisher-Yates), the input is left untouched.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(rng: &mut R, items: &[T]) -> Vec<T> {
    let mut shuffled = items.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

/// select_random draws count distinct items without replacement.
pub fn select_random<T: Clone, R: Rng + ?Sized>(
    rng: &mut R,
    items: &[T],
    count: usize,
) -> Result<Vec<T>, SelectionOverflow> {
    if count > items.len() {
        return Err(SelectionOverflow {
            requested: count,
            available: items.len(),
        });
    }

    let mut selected = shuffle(rng, items);
    selected.truncate(count);
    Ok(selected)
}
