use horserace::consts::{HORSES_PER_RACE, MAX_HORSES, TOTAL_ROUNDS};
use horserace::core::clock::{CancelToken, FixedStepClock};
use horserace::core::game::{Command, Game, GameEvent};
use horserace::core::handle_race::{handle_championship, handle_round, ChampionshipOutcome, RoundOutcome};
use horserace::core::horse::HorsePool;
use horserace::core::schedule::RoundStatus;
use horserace::core::scoring::compute_standings;
use horserace::core::state_handler::RaceState;
use horserace::error::RaceError;
use horserace::post::export::ExportDocument;
use horserace::pre::read_game_pars::GamePars;
use std::collections::HashSet;

const FRAME_MS: f64 = 16.0;

fn full_pool_pars() -> GamePars {
    GamePars {
        min_pool_size: MAX_HORSES,
        ..GamePars::default()
    }
}

fn game(seed: u64) -> Game {
    let mut game = Game::new(full_pool_pars(), Some(seed)).unwrap();
    game.set_speed_multiplier(20.0).unwrap();
    game
}

fn run_championship(seed: u64) -> Game {
    let mut game = game(seed);
    let mut clock = FixedStepClock::new(FRAME_MS);
    let outcome = handle_championship(&mut game, &mut clock, &CancelToken::new(), None).unwrap();
    assert_eq!(outcome, ChampionshipOutcome::Completed);
    game
}

#[test]
fn full_championship_ends_all_completed() {
    let game = run_championship(2024);

    assert_eq!(game.get_state(), RaceState::AllRacesCompleted);
    assert_eq!(game.get_schedule().len(), TOTAL_ROUNDS);
    assert!(game.get_schedule().get_all_completed());
    assert!(game.get_schedule().remaining_rounds().is_empty());
    assert_eq!(
        game.get_results().get_round_results().len(),
        TOTAL_ROUNDS * HORSES_PER_RACE
    );

    for round in game.get_schedule().rounds() {
        assert_eq!(round.status, RoundStatus::Completed);
        assert_eq!(round.results.len(), HORSES_PER_RACE);

        let positions: Vec<u32> = round.results.iter().map(|r| r.position).collect();
        assert_eq!(positions, (1..=HORSES_PER_RACE as u32).collect::<Vec<_>>());

        let ids: HashSet<&str> = round.results.iter().map(|r| r.horse_id.as_str()).collect();
        let participant_ids: HashSet<&str> =
            round.participants.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, participant_ids);
    }
}

#[test]
fn seeded_pipeline_is_reproducible() {
    let a = run_championship(7);
    let b = run_championship(7);

    assert_eq!(
        a.get_results().get_round_results(),
        b.get_results().get_round_results()
    );
    assert_eq!(a.get_results().sorted_standings(), b.get_results().sorted_standings());
    assert_eq!(a.get_stable().get_all(), b.get_stable().get_all());
}

#[test]
fn finish_times_unique_per_centisecond() {
    let mut game = game(99);
    game.generate_schedule().unwrap();
    let mut clock = FixedStepClock::new(FRAME_MS);

    loop {
        let outcome = handle_round(&mut game, &mut clock, &CancelToken::new(), None).unwrap();
        assert!(matches!(outcome, RoundOutcome::Completed(_)));

        let race = game.get_active_race().unwrap();
        let buckets: HashSet<i64> = race
            .progress_list()
            .iter()
            .map(|e| (e.real_elapsed_time.unwrap() / 10.0).floor() as i64)
            .collect();
        assert_eq!(buckets.len(), HORSES_PER_RACE);

        if game.get_state() == RaceState::AllRacesCompleted {
            break;
        }
        assert!(game.next_round().unwrap());
    }
}

#[test]
fn standings_recompute_is_idempotent() {
    let game = run_championship(11);
    let results = game.get_results();

    let recomputed = compute_standings(results.get_round_results(), game.get_stable());
    assert_eq!(recomputed.as_slice(), results.get_standings());

    let total_points: u32 = results.get_standings().iter().map(|s| s.total_points).sum();
    let result_points: u32 = results.get_round_results().iter().map(|r| r.points).sum();
    assert_eq!(total_points, result_points);

    let champion = results.champion().unwrap();
    assert_eq!(champion.total_points, results.sorted_standings()[0].total_points);
}

#[test]
fn conditions_stay_in_range() {
    let game = run_championship(5);
    assert!(game
        .get_stable()
        .get_all()
        .iter()
        .all(|h| (1..=100).contains(&h.condition)));
}

#[test]
fn random_pool_championships_complete() {
    for seed in 0..5 {
        let mut game = Game::new(GamePars::default(), Some(seed)).unwrap();
        game.set_speed_multiplier(20.0).unwrap();
        let mut clock = FixedStepClock::new(FRAME_MS);

        let outcome =
            handle_championship(&mut game, &mut clock, &CancelToken::new(), None).unwrap();
        assert_eq!(outcome, ChampionshipOutcome::Completed);
        assert!(game.get_stable().len() >= HORSES_PER_RACE);
        assert!(game.get_stable().len() <= MAX_HORSES);
    }
}

#[test]
fn cancelled_championship_resumes() {
    let mut game = game(31);
    let mut clock = FixedStepClock::new(FRAME_MS);
    let cancel = CancelToken::new();

    game.generate_schedule().unwrap();
    cancel.cancel();
    let outcome = handle_championship(&mut game, &mut clock, &cancel, None).unwrap();
    assert_eq!(outcome, ChampionshipOutcome::Cancelled);
    assert_eq!(game.get_state(), RaceState::RaceInProgress);

    cancel.reset();
    let outcome = handle_championship(&mut game, &mut clock, &cancel, None).unwrap();
    assert_eq!(outcome, ChampionshipOutcome::Completed);
    assert_eq!(game.get_state(), RaceState::AllRacesCompleted);
}

#[test]
fn command_driven_round() {
    let mut game = Game::new(full_pool_pars(), Some(3)).unwrap();

    assert_eq!(
        game.dispatch(Command::GenerateHorses, 0.0).unwrap(),
        GameEvent::HorsesGenerated { count: 20 }
    );
    assert_eq!(
        game.dispatch(Command::StartRace, 0.0).unwrap_err(),
        RaceError::IllegalOperation {
            operation: "start race",
            state: RaceState::Idle
        }
    );
    game.dispatch(Command::GenerateSchedule, 0.0).unwrap();
    game.dispatch(Command::SetSpeed(20.0), 0.0).unwrap();
    game.dispatch(Command::StartRace, 0.0).unwrap();

    let mut timestamp = 0.0;
    while !game.advance_frame(timestamp).unwrap() {
        timestamp += FRAME_MS;
    }

    match game.dispatch(Command::CompleteRound, timestamp).unwrap() {
        GameEvent::RoundCompleted {
            round_number,
            results,
            all_completed,
        } => {
            assert_eq!(round_number, 1);
            assert_eq!(results.len(), HORSES_PER_RACE);
            assert!(!all_completed);
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(
        game.dispatch(Command::NextRound, timestamp).unwrap(),
        GameEvent::RoundAdvanced { advanced: true }
    );
    assert_eq!(game.get_state(), RaceState::ScheduleReady);
}

#[test]
fn export_document_matches_results() {
    let game = run_championship(8);
    let doc = ExportDocument::from_results(game.get_results());

    assert_eq!(doc.round_results.len(), TOTAL_ROUNDS * HORSES_PER_RACE);
    for pair in doc.overall_standings.windows(2) {
        assert!(pair[0].total_points >= pair[1].total_points);
    }
}
