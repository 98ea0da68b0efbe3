use crate::core::horse::Horse;
use crate::error::RaceError;
use crate::post::race_result::RaceResult;
use helpers::random::select_random;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundStatus {
    Pending,
    InProgress,
    Completed,
}

/// * `round_number` - 1-based number of the round
/// * `distance` - (m) Race distance
/// * `participants` - Horses running in this round, fixed when the schedule is built
/// * `start_time` / `end_time` - (ms) Clock timestamps set by the state handler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub round_number: u32,
    pub distance: u32,
    pub participants: Vec<Horse>,
    pub status: RoundStatus,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub results: Vec<RaceResult>,
}

/// Schedule is the ordered list of rounds of one championship.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    rounds: Vec<Round>,
}

impl Schedule {
    /// build draws an independent random field of `horses_per_race` horses for every distance.
    pub fn build<R: Rng + ?Sized>(
        pool: &[Horse],
        round_distances: &[u32],
        horses_per_race: usize,
        rng: &mut R,
    ) -> Result<Schedule, RaceError> {
        if pool.len() < horses_per_race {
            return Err(RaceError::InsufficientPoolSize {
                available: pool.len(),
                required: horses_per_race,
            });
        }

        let mut rounds = Vec::with_capacity(round_distances.len());

        for (idx, &distance) in round_distances.iter().enumerate() {
            rounds.push(Round {
                round_number: idx as u32 + 1,
                distance,
                participants: select_random(rng, pool, horses_per_race)?,
                status: RoundStatus::Pending,
                start_time: None,
                end_time: None,
                results: Vec::new(),
            });
        }

        log::info!(
            "Generated schedule with {} rounds of {} horses",
            rounds.len(),
            horses_per_race
        );

        Ok(Schedule { rounds })
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn get(&self, idx: usize) -> Option<&Round> {
        self.rounds.get(idx)
    }

    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut Round> {
        self.rounds.get_mut(idx)
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn completed_rounds(&self) -> Vec<&Round> {
        self.rounds
            .iter()
            .filter(|round| round.status == RoundStatus::Completed)
            .collect()
    }

    pub fn remaining_rounds(&self) -> Vec<&Round> {
        self.rounds
            .iter()
            .filter(|round| round.status != RoundStatus::Completed)
            .collect()
    }

    pub fn get_all_completed(&self) -> bool {
        !self.rounds.is_empty()
            && self
                .rounds
                .iter()
                .all(|round| round.status == RoundStatus::Completed)
    }
}
