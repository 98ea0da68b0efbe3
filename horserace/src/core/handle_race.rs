use crate::core::clock::{CancelToken, FrameClock};
use crate::core::game::Game;
use crate::core::state_handler::RaceState;
use crate::error::RaceError;
use crate::interfaces::gui_interface::{RaceSnapshot, MAX_GUI_UPDATE_FREQUENCY};
use crate::post::race_result::RaceResult;
use anyhow::{bail, Context};
use flume::Sender;

/// Number of pools generated at most before a championship is given up for lack of horses
const MAX_POOL_ATTEMPTS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum RoundOutcome {
    Completed(Vec<RaceResult>),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChampionshipOutcome {
    Completed,
    Cancelled,
}

/// handle_round runs the current round of the game frame by frame until every horse has
/// finished, and returns the results. A round left in RACE_IN_PROGRESS by an earlier cancellation
/// is resumed. If a sender is inserted, snapshots of the race are sent at most
/// MAX_GUI_UPDATE_FREQUENCY times per simulated second and once more with the final results.
pub fn handle_round<C: FrameClock + ?Sized>(
    game: &mut Game,
    clock: &mut C,
    cancel: &CancelToken,
    tx: Option<&Sender<RaceSnapshot>>,
) -> anyhow::Result<RoundOutcome> {
    match game.get_state() {
        RaceState::ScheduleReady => {
            game.start_race(clock.now_ms())
                .context("Failed to start the current round!")?;
        }
        RaceState::RaceInProgress => {
            if let Some(round) = game.get_cur_round() {
                log::info!("Resuming round {}", round.round_number);
            }
        }
        state => bail!("Cannot run a round from state {}!", state),
    }

    let mut t_race_update_print = 0.0;
    let mut t_race_update_gui: Option<f64> = None;

    loop {
        if cancel.is_cancelled() {
            game.interrupt_race();
            if let Some(round) = game.get_cur_round() {
                log::info!("Round {} cancelled", round.round_number);
            }
            return Ok(RoundOutcome::Cancelled);
        }

        let timestamp = clock.next_frame();
        let all_finished = game
            .advance_frame(timestamp)
            .context("Failed to advance the race!")?;

        let race = match game.get_active_race() {
            Some(race) => race,
            None => bail!("Race vanished while running!"),
        };

        if race.real_elapsed_ms() > t_race_update_print + 999.9 {
            if let Some(leader) = race.get_leader() {
                log::debug!(
                    "Simulating... Current race time is {:.3}s, leader is horse {} at {:.1}%",
                    race.real_elapsed_ms() / 1000.0,
                    leader.horse_id,
                    leader.progress
                );
            }
            t_race_update_print = race.real_elapsed_ms();
        }

        if let Some(tx) = tx {
            let gui_update_due = match t_race_update_gui {
                Some(t_last) => {
                    race.real_elapsed_ms() > t_last + 1000.0 / MAX_GUI_UPDATE_FREQUENCY - 1.0
                }
                None => true,
            };

            if gui_update_due && !all_finished {
                let snapshot =
                    RaceSnapshot::from_race(race, game.get_stable(), game.get_speed_multiplier())?;
                tx.send(snapshot)
                    .context("Failed to send race snapshot!")?;
                t_race_update_gui = Some(race.real_elapsed_ms());
            }
        }

        if all_finished {
            break;
        }
    }

    let results = game
        .complete_round(clock.now_ms())
        .context("Failed to complete the current round!")?;

    // after the loop finishes, send the final result once
    if let Some(tx) = tx {
        if let Some(race) = game.get_active_race() {
            let mut snapshot =
                RaceSnapshot::from_race(race, game.get_stable(), game.get_speed_multiplier())?;
            snapshot.final_results = Some(results.to_owned());
            tx.send(snapshot)
                .context("Failed to send final race snapshot!")?;
        }
    }

    Ok(RoundOutcome::Completed(results))
}

/// handle_championship runs all remaining rounds of the game in sequence. A new schedule is
/// generated if there is none to run, the pool is generated again while it is too small for a
/// race. Returns early if the cancel token is set, calling it again continues where it stopped.
pub fn handle_championship<C: FrameClock + ?Sized>(
    game: &mut Game,
    clock: &mut C,
    cancel: &CancelToken,
    tx: Option<&Sender<RaceSnapshot>>,
) -> anyhow::Result<ChampionshipOutcome> {
    if matches!(
        game.get_state(),
        RaceState::Idle | RaceState::AllRacesCompleted
    ) {
        generate_schedule(game)?;
    }

    loop {
        match game.get_state() {
            RaceState::ScheduleReady | RaceState::RaceInProgress => {
                if handle_round(game, clock, cancel, tx)? == RoundOutcome::Cancelled {
                    return Ok(ChampionshipOutcome::Cancelled);
                }
            }
            RaceState::RaceCompleted => {
                if !game.next_round()? {
                    break;
                }
            }
            RaceState::AllRacesCompleted => break,
            RaceState::Idle => bail!("Championship was reset while running!"),
        }
    }

    if let Some(champion) = game.get_results().champion() {
        log::info!(
            "Championship finished, champion is {} with {} points",
            champion.horse_name,
            champion.total_points
        );
    }
    Ok(ChampionshipOutcome::Completed)
}

/// generate_schedule builds the schedule of a new championship and regenerates the pool up to
/// MAX_POOL_ATTEMPTS times while it is too small.
fn generate_schedule(game: &mut Game) -> anyhow::Result<()> {
    for attempt in 1..=MAX_POOL_ATTEMPTS {
        match game.generate_schedule() {
            Ok(()) => return Ok(()),
            Err(RaceError::InsufficientPoolSize {
                available,
                required,
            }) => {
                log::warn!(
                    "Pool of {} horses is too small for races of {} (attempt {}/{}), generating \
                     horses again",
                    available,
                    required,
                    attempt,
                    MAX_POOL_ATTEMPTS
                );
                game.generate_horses()
                    .context("Failed to generate the horse pool!")?;
            }
            Err(err) => return Err(err).context("Failed to generate the race schedule!"),
        }
    }
    bail!(
        "Failed to generate a large enough horse pool in {} attempts!",
        MAX_POOL_ATTEMPTS
    )
}
