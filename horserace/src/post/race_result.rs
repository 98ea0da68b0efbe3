use crate::core::horse::HorsePool;
use crate::core::scoring::compute_standings;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// RaceResult contains the outcome of one horse in one round.
/// * `position` - 1-based finishing position
/// * `completion_time` - (ms) Finish time as shown to the viewer
/// * `final_speed` - (m/s) Nominal speed the horse ran the round with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    pub round_number: u32,
    pub horse_id: String,
    pub position: u32,
    pub completion_time: f64,
    pub final_speed: f64,
    pub points: u32,
}

/// Standing aggregates the results of one horse over all recorded rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub horse_id: String,
    pub horse_name: String,
    pub horse_color: String,
    pub total_points: u32,
    pub races_participated: u32,
    pub average_position: f64,
    pub best_position: u32,
    pub positions: Vec<u32>,
}

/// ResultsLog is the append-only history of round results. The standings are recomputed in full
/// every time a batch is recorded.
#[derive(Debug, Clone, Default)]
pub struct ResultsLog {
    round_results: Vec<RaceResult>,
    standings: Vec<Standing>,
}

impl ResultsLog {
    pub fn record_round_results<P: HorsePool + ?Sized>(
        &mut self,
        results: &[RaceResult],
        pool: &P,
    ) {
        self.round_results.extend_from_slice(results);
        self.standings = compute_standings(&self.round_results, pool);
    }

    pub fn get_round_results(&self) -> &[RaceResult] {
        &self.round_results
    }

    pub fn get_results_by_round(&self, round_number: u32) -> Vec<&RaceResult> {
        self.round_results
            .iter()
            .filter(|result| result.round_number == round_number)
            .collect()
    }

    pub fn get_horse_history(&self, horse_id: &str) -> Vec<&RaceResult> {
        self.round_results
            .iter()
            .filter(|result| result.horse_id == horse_id)
            .collect()
    }

    /// get_standings returns the standings in the order the horses first appear in the results.
    pub fn get_standings(&self) -> &[Standing] {
        &self.standings
    }

    /// sorted_standings returns the standings by descending total points. Horses with equal points
    /// keep the order they first appeared in.
    pub fn sorted_standings(&self) -> Vec<Standing> {
        let mut sorted = self.standings.to_owned();
        sorted.sort_by(|a, b| b.total_points.cmp(&a.total_points));
        sorted
    }

    /// champion returns the standing with the most points, the first one encountered wins a tie.
    pub fn champion(&self) -> Option<&Standing> {
        self.standings.iter().fold(None, |best: Option<&Standing>, cur| match best {
            Some(best) if cur.total_points <= best.total_points => Some(best),
            _ => Some(cur),
        })
    }

    pub fn has_results(&self) -> bool {
        !self.round_results.is_empty()
    }

    pub fn clear(&mut self) {
        self.round_results.clear();
        self.standings.clear();
    }
}

/// print_round_results prints the result table of one round to the console output.
pub fn print_round_results<P: HorsePool + ?Sized>(
    round_number: u32,
    distance: u32,
    results: &[RaceResult],
    pool: &P,
) -> fmt::Result {
    println!("RESULT: Round {} ({}m)", round_number, distance);
    println!("{}", fmt_round_results(results, pool)?);
    Ok(())
}

/// print_standings prints the overall standings to the console output.
pub fn print_standings(standings: &[Standing]) -> fmt::Result {
    println!("RESULT: Overall standings");
    println!("{}", fmt_standings(standings)?);
    Ok(())
}

pub fn fmt_round_results<P: HorsePool + ?Sized>(
    results: &[RaceResult],
    pool: &P,
) -> Result<String, fmt::Error> {
    let mut content = String::new();
    writeln!(
        &mut content,
        "pos, {:<16}, {:>9}, {:>10}, pts",
        "horse", "time", "speed"
    )?;

    for result in results.iter() {
        let name = pool
            .get_by_id(&result.horse_id)
            .map(|horse| horse.name.as_str())
            .unwrap_or("?");
        writeln!(
            &mut content,
            "{:3}, {:<16}, {:8.3}s, {:6.2}m/s, {:3}",
            result.position,
            name,
            result.completion_time / 1000.0,
            result.final_speed,
            result.points
        )?;
    }
    Ok(content)
}

pub fn fmt_standings(standings: &[Standing]) -> Result<String, fmt::Error> {
    let mut content = String::new();
    writeln!(
        &mut content,
        "rank, {:<16}, pts, races, avg pos, best",
        "horse"
    )?;

    for (i, standing) in standings.iter().enumerate() {
        writeln!(
            &mut content,
            "{:4}, {:<16}, {:3}, {:5}, {:7.2}, {:4}",
            i + 1,
            standing.horse_name,
            standing.total_points,
            standing.races_participated,
            standing.average_position,
            standing.best_position
        )?;
    }
    Ok(content)
}
