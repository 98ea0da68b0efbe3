use anyhow::Context;
use clap::Parser;
use horserace::core::clock::{CancelToken, FixedStepClock, RealtimeClock};
use horserace::core::game::Game;
use horserace::core::handle_race::{handle_championship, ChampionshipOutcome};
use horserace::interfaces::gui_interface::RaceSnapshot;
use horserace::post::export::{write_csv, write_json};
use horserace::post::race_result::{print_round_results, print_standings};
use horserace::pre::read_game_pars::{read_game_pars, GamePars};
use horserace::pre::sim_opts::SimOpts;
use rayon::prelude::*;
use std::collections::HashMap;
use std::thread;
use std::time::Instant;

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// print_championship prints the result tables of every completed round and the standings.
fn print_championship(game: &Game) -> anyhow::Result<()> {
    for round in game.get_schedule().completed_rounds() {
        print_round_results(
            round.round_number,
            round.distance,
            &round.results,
            game.get_stable(),
        )
        .context("Failed to format round results!")?;
    }
    print_standings(&game.get_results().sorted_standings())
        .context("Failed to format standings!")?;
    Ok(())
}

/// print_snapshot prints a one-line summary of the live race.
fn print_snapshot(snapshot: &RaceSnapshot) {
    if let Some(results) = &snapshot.final_results {
        let winner = results.first().and_then(|result| {
            snapshot
                .horse_states
                .iter()
                .find(|horse| horse.horse_id == result.horse_id)
        });
        if let Some(winner) = winner {
            println!(
                "Round {} finished, winner: {} ({:.2}s)",
                snapshot.round_number,
                winner.name,
                winner.viewer_finish_time.unwrap_or(0.0) / 1000.0
            );
        }
    } else if let Some(leader) = snapshot.get_leader() {
        let no_finished = snapshot.horse_states.iter().filter(|h| h.finished).count();
        println!(
            "Round {} | {:7.2}s | leader: {:<16} {:5.1}% | finished: {}/{}",
            snapshot.round_number,
            snapshot.viewer_elapsed_ms / 1000.0,
            leader.name,
            leader.progress,
            no_finished,
            snapshot.horse_states.len()
        );
    }
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();
    init_logging(sim_opts.debug);

    // get game parameters
    let game_pars = if let Some(parfile_path) = &sim_opts.parfile_path {
        log::info!("Reading game parameters from {:?}", parfile_path);
        read_game_pars(parfile_path)?
    } else {
        log::info!("No parameter file provided, using the default parameters");
        GamePars::default()
    };

    log::info!(
        "Simulating championship with pools of {}-{} horses, {} rounds of {} horses",
        game_pars.min_pool_size,
        game_pars.pool_size,
        game_pars.total_rounds(),
        game_pars.horses_per_race
    );

    // EXECUTION -----------------------------------------------------------------------------------
    let game = if !sim_opts.realtime {
        // instant simulation, several championships are run in parallel
        let t_start = Instant::now();
        let no_sim_runs = sim_opts.no_sim_runs.max(1);

        let mut games = (0..no_sim_runs)
            .into_par_iter()
            .map(|run| -> anyhow::Result<Game> {
                let seed = sim_opts.seed.map(|seed| seed.wrapping_add(run as u64));
                let mut game = Game::new(game_pars.clone(), seed)?;
                game.set_speed_multiplier(sim_opts.speed_multiplier)?;
                let mut clock = FixedStepClock::new(game_pars.frame_duration_ms);

                handle_championship(&mut game, &mut clock, &CancelToken::new(), None)
                    .context(format!("Championship {} failed!", run + 1))?;
                Ok(game)
            })
            .collect::<anyhow::Result<Vec<Game>>>()?;

        log::info!("Execution time: {}ms", t_start.elapsed().as_millis());

        if no_sim_runs > 1 {
            let mut champion_counts: HashMap<String, u32> = HashMap::new();
            for game in games.iter() {
                if let Some(champion) = game.get_results().champion() {
                    *champion_counts
                        .entry(champion.horse_name.to_owned())
                        .or_insert(0) += 1;
                }
            }

            let mut counts: Vec<(String, u32)> = champion_counts.into_iter().collect();
            counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

            println!("RESULT: Championship wins over {} runs", no_sim_runs);
            for (name, count) in counts.iter() {
                println!("{:<16}, {:3}", name, count);
            }
        }

        games.pop().context("No championship was simulated!")?
    } else {
        // real-time simulation in a worker thread, live progress is printed from the snapshots
        let (tx, rx) = flume::unbounded();
        let mut game = Game::new(game_pars.clone(), sim_opts.seed)?;
        game.set_speed_multiplier(sim_opts.speed_multiplier)?;
        let frame_duration_ms = game_pars.frame_duration_ms;

        let sim_thread = thread::spawn(move || -> anyhow::Result<Game> {
            let mut clock = RealtimeClock::new(frame_duration_ms);
            let outcome =
                handle_championship(&mut game, &mut clock, &CancelToken::new(), Some(&tx))?;
            if outcome == ChampionshipOutcome::Cancelled {
                log::warn!("Championship was cancelled");
            }
            Ok(game)
        });

        let mut last_printed_s = -1i64;
        for snapshot in rx.iter() {
            let cur_s = (snapshot.viewer_elapsed_ms / 1000.0).floor() as i64;
            if snapshot.final_results.is_some() || cur_s > last_printed_s {
                print_snapshot(&snapshot);
                last_printed_s = if snapshot.final_results.is_some() {
                    -1
                } else {
                    cur_s
                };
            }
        }

        sim_thread
            .join()
            .map_err(|_| anyhow::anyhow!("Simulation thread panicked!"))??
    };

    // POST-PROCESSING -----------------------------------------------------------------------------
    print_championship(&game)?;

    if let Some(path) = &sim_opts.export_json {
        write_json(game.get_results(), path)?;
    }
    if let Some(path) = &sim_opts.export_csv {
        write_csv(game.get_results(), path)?;
    }

    Ok(())
}
