use crate::consts::{MAX_CONDITION, MIN_CONDITION, POSITION_POINTS};
use crate::core::horse::HorsePool;
use crate::core::race::Race;
use crate::post::race_result::{RaceResult, Standing};
use helpers::general::mean;
use helpers::random::random_int;
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// points_for_position returns the championship points for a 1-based finishing position.
pub fn points_for_position(position: usize) -> u32 {
    if position == 0 {
        return 0;
    }
    POSITION_POINTS.get(position - 1).copied().unwrap_or(0)
}

/// apply_fatigue returns the condition after a run, never below MIN_CONDITION.
pub fn apply_fatigue(condition: u32, fatigue_factor: f64) -> u32 {
    ((condition as f64 * fatigue_factor).floor() as u32).max(MIN_CONDITION)
}

/// apply_rest_recovery returns the condition after sitting a round out, never above
/// MAX_CONDITION.
pub fn apply_rest_recovery<R: Rng + ?Sized>(
    condition: u32,
    recovery_min: u32,
    recovery_max: u32,
    rng: &mut R,
) -> u32 {
    let recovery = random_int(rng, recovery_min as i64, recovery_max as i64) as u32;
    (condition + recovery).min(MAX_CONDITION)
}

/// rank_results turns the finish order of a race into result entries.
pub fn rank_results(race: &Race) -> Vec<RaceResult> {
    race.finish_order()
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| RaceResult {
            round_number: race.round_number,
            horse_id: entry.horse_id.to_owned(),
            position: idx as u32 + 1,
            completion_time: entry
                .viewer_finish_time
                .or(entry.real_elapsed_time)
                .unwrap_or(0.0),
            final_speed: entry.speed,
            points: points_for_position(idx + 1),
        })
        .collect()
}

/// compute_standings aggregates the complete result history into one standing per horse, in the
/// order the horses first appear. Results of horses that are not in the pool are skipped.
pub fn compute_standings<P: HorsePool + ?Sized>(results: &[RaceResult], pool: &P) -> Vec<Standing> {
    let mut standings: Vec<Standing> = Vec::new();
    let mut idx_by_id: HashMap<&str, usize> = HashMap::new();

    for result in results.iter() {
        let horse = match pool.get_by_id(&result.horse_id) {
            Some(horse) => horse,
            None => continue,
        };

        let idx = *idx_by_id.entry(result.horse_id.as_str()).or_insert_with(|| {
            standings.push(Standing {
                horse_id: horse.id.to_owned(),
                horse_name: horse.name.to_owned(),
                horse_color: horse.color.to_owned(),
                total_points: 0,
                races_participated: 0,
                average_position: 0.0,
                best_position: u32::MAX,
                positions: Vec::new(),
            });
            standings.len() - 1
        });

        let standing = &mut standings[idx];
        standing.total_points += result.points;
        standing.races_participated += 1;
        standing.positions.push(result.position);
        standing.best_position = standing.best_position.min(result.position);
    }

    for standing in standings.iter_mut() {
        standing.average_position = mean(standing.positions.iter().copied()).unwrap_or(0.0);
    }

    standings
}

/// apply_condition_changes applies fatigue to every participant of a finished round and rest
/// recovery to every other horse in the pool.
pub fn apply_condition_changes<P: HorsePool + ?Sized, R: Rng + ?Sized>(
    pool: &mut P,
    participant_ids: &[String],
    fatigue_factor: f64,
    recovery_range: (u32, u32),
    rng: &mut R,
) {
    let participants: HashSet<&str> = participant_ids.iter().map(|id| id.as_str()).collect();

    let updates: Vec<(String, u32)> = pool
        .get_all()
        .iter()
        .map(|horse| {
            let new_condition = if participants.contains(horse.id.as_str()) {
                apply_fatigue(horse.condition, fatigue_factor)
            } else {
                apply_rest_recovery(horse.condition, recovery_range.0, recovery_range.1, rng)
            };
            (horse.id.to_owned(), new_condition)
        })
        .collect();

    for (id, new_condition) in updates {
        pool.mutate_condition(&id, new_condition);
    }
}
