use crate::consts::{MAX_SPEED_MULTIPLIER, MIN_SPEED_MULTIPLIER};
use crate::core::horse::{HorsePool, Stable};
use crate::core::race::Race;
use crate::core::schedule::{Round, Schedule};
use crate::core::scoring::{apply_condition_changes, rank_results};
use crate::core::state_handler::{RaceState, StateHandler};
use crate::error::RaceError;
use crate::post::race_result::{RaceResult, ResultsLog};
use crate::pre::read_game_pars::GamePars;
use helpers::general::InputValueError;
use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Command lists everything a front-end can ask the game to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GenerateHorses,
    ResetHorses,
    GenerateSchedule,
    StartRace,
    CompleteRound,
    NextRound,
    SetSpeed(f64),
    Reset,
}

/// GameEvent is the answer to a successfully executed command.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    HorsesGenerated {
        count: usize,
    },
    HorsesReset,
    ScheduleGenerated {
        rounds: usize,
    },
    RaceStarted {
        round_number: u32,
        distance: u32,
    },
    RoundCompleted {
        round_number: u32,
        results: Vec<RaceResult>,
        all_completed: bool,
    },
    RoundAdvanced {
        advanced: bool,
    },
    SpeedChanged {
        speed_multiplier: f64,
    },
    Reset,
}

/// Game is the complete application state: parameters, random number generator, horse pool,
/// lifecycle state machine with the schedule, the active race and the results log.
#[derive(Debug, Clone)]
pub struct Game {
    pars: GamePars,
    rng: Pcg32,
    stable: Stable,
    state_handler: StateHandler,
    active_race: Option<Race>,
    results: ResultsLog,
    speed_multiplier: f64,
}

impl Game {
    /// new creates a game without horses. A given seed makes every random draw of the game
    /// reproducible.
    pub fn new(pars: GamePars, seed: Option<u64>) -> Result<Game, RaceError> {
        pars.validate()?;

        let rng = match seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_entropy(),
        };

        Ok(Game {
            pars,
            rng,
            stable: Stable::default(),
            state_handler: StateHandler::default(),
            active_race: None,
            results: ResultsLog::default(),
            speed_multiplier: 1.0,
        })
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHOD ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// dispatch executes a command. `t_now` (ms) is used to stamp round start and end times.
    pub fn dispatch(&mut self, cmd: Command, t_now: f64) -> Result<GameEvent, RaceError> {
        match cmd {
            Command::GenerateHorses => {
                self.generate_horses()?;
                Ok(GameEvent::HorsesGenerated {
                    count: self.stable.len(),
                })
            }
            Command::ResetHorses => {
                self.reset_horses()?;
                Ok(GameEvent::HorsesReset)
            }
            Command::GenerateSchedule => {
                self.generate_schedule()?;
                Ok(GameEvent::ScheduleGenerated {
                    rounds: self.state_handler.get_schedule().len(),
                })
            }
            Command::StartRace => {
                let round = self.start_race(t_now)?;
                Ok(GameEvent::RaceStarted {
                    round_number: round.round_number,
                    distance: round.distance,
                })
            }
            Command::CompleteRound => {
                let results = self.complete_round(t_now)?;
                Ok(GameEvent::RoundCompleted {
                    round_number: results.first().map_or(0, |result| result.round_number),
                    results,
                    all_completed: self.get_state() == RaceState::AllRacesCompleted,
                })
            }
            Command::NextRound => Ok(GameEvent::RoundAdvanced {
                advanced: self.next_round()?,
            }),
            Command::SetSpeed(speed_multiplier) => {
                self.set_speed_multiplier(speed_multiplier)?;
                Ok(GameEvent::SpeedChanged { speed_multiplier })
            }
            Command::Reset => {
                self.reset();
                Ok(GameEvent::Reset)
            }
        }
    }

    /// generate_horses replaces the pool by a freshly generated one. Its size is drawn from
    /// [min_pool_size, pool_size], so the new pool can be too small for a schedule.
    pub fn generate_horses(&mut self) -> Result<(), RaceError> {
        self.require_not_racing("generate horses")?;
        self.stable = Stable::generate(
            &mut self.rng,
            self.pars.min_pool_size,
            self.pars.pool_size,
        )?;
        log::info!("Generated {} horses", self.stable.len());
        Ok(())
    }

    /// reset_horses draws a fresh condition for every horse in the pool.
    pub fn reset_horses(&mut self) -> Result<(), RaceError> {
        self.require_not_racing("reset horses")?;
        self.stable.reset_conditions(&mut self.rng);
        Ok(())
    }

    /// generate_schedule starts a new championship. An existing schedule and its results are
    /// dropped, an empty pool is filled first.
    pub fn generate_schedule(&mut self) -> Result<(), RaceError> {
        self.require_not_racing("generate schedule")?;

        if self.get_state() != RaceState::Idle {
            self.reset();
        }
        if self.stable.is_empty() {
            self.generate_horses()?;
        }

        let schedule = Schedule::build(
            self.stable.get_all(),
            &self.pars.round_distances,
            self.pars.horses_per_race,
            &mut self.rng,
        )?;
        self.state_handler.load_schedule(schedule)
    }

    /// start_race starts the current round and initializes the progress of its participants.
    pub fn start_race(&mut self, t_start: f64) -> Result<&Round, RaceError> {
        self.state_handler.start_race(t_start)?;

        let round = self
            .state_handler
            .get_cur_round()
            .ok_or(RaceError::IllegalOperation {
                operation: "start race without rounds",
                state: RaceState::RaceInProgress,
            })?;
        self.active_race = Some(Race::new(
            round,
            &self.stable,
            self.pars.frame_duration_ms,
            &mut self.rng,
        ));

        log::info!(
            "Round {} started ({}m, {} horses)",
            round.round_number,
            round.distance,
            round.participants.len()
        );
        Ok(round)
    }

    /// advance_frame advances the active race by one frame and returns true once every horse has
    /// finished.
    pub fn advance_frame(&mut self, timestamp: f64) -> Result<bool, RaceError> {
        let state = self.get_state();
        let race = match (state, self.active_race.as_mut()) {
            (RaceState::RaceInProgress, Some(race)) => race,
            _ => {
                return Err(RaceError::IllegalOperation {
                    operation: "advance race",
                    state,
                })
            }
        };

        Ok(race.advance_frame(timestamp, self.speed_multiplier, &mut self.rng))
    }

    /// interrupt_race marks a pause of the active race, so the time until the next frame is not
    /// counted as race time.
    pub fn interrupt_race(&mut self) {
        if let Some(race) = self.active_race.as_mut() {
            race.interrupt();
        }
    }

    /// complete_round ranks the active race, records the results and applies fatigue to the
    /// participants and rest recovery to everybody else. Horses that have not finished are ranked
    /// last.
    pub fn complete_round(&mut self, t_end: f64) -> Result<Vec<RaceResult>, RaceError> {
        let state = self.get_state();
        let race = match (state, self.active_race.as_ref()) {
            (RaceState::RaceInProgress, Some(race)) => race,
            _ => {
                return Err(RaceError::IllegalOperation {
                    operation: "complete round",
                    state,
                })
            }
        };

        let results = rank_results(race);
        let participant_ids: Vec<String> = race
            .progress_list()
            .iter()
            .map(|entry| entry.horse_id.to_owned())
            .collect();
        let round_number = race.round_number;

        self.state_handler
            .complete_current_round(t_end, results.to_owned())?;
        self.results.record_round_results(&results, &self.stable);
        apply_condition_changes(
            &mut self.stable,
            &participant_ids,
            self.pars.fatigue_factor,
            (self.pars.rest_recovery_min, self.pars.rest_recovery_max),
            &mut self.rng,
        );

        if let Some(winner) = results.first() {
            log::info!(
                "Round {} finished, winner is horse {} after {:.2}s",
                round_number,
                winner.horse_id,
                winner.completion_time / 1000.0
            );
        }
        Ok(results)
    }

    /// next_round moves on to the next round. Returns false if there is none left.
    pub fn next_round(&mut self) -> Result<bool, RaceError> {
        let advanced = self.state_handler.next_round()?;
        if advanced {
            self.active_race = None;
        }
        Ok(advanced)
    }

    /// set_speed_multiplier changes the playback speed. The race clock used for the ranking is not
    /// affected.
    pub fn set_speed_multiplier(&mut self, speed_multiplier: f64) -> Result<(), RaceError> {
        if !(MIN_SPEED_MULTIPLIER..=MAX_SPEED_MULTIPLIER).contains(&speed_multiplier) {
            return Err(InputValueError::new(format!(
                "speed multiplier must be in [{}, {}], but is {}",
                MIN_SPEED_MULTIPLIER, MAX_SPEED_MULTIPLIER, speed_multiplier
            ))
            .into());
        }
        self.speed_multiplier = speed_multiplier;
        Ok(())
    }

    /// reset returns to IDLE and drops the schedule, the active race and all results. The pool is
    /// kept.
    pub fn reset(&mut self) {
        self.state_handler.reset();
        self.active_race = None;
        self.results.clear();
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    fn require_not_racing(&self, operation: &'static str) -> Result<(), RaceError> {
        if self.state_handler.is_race_in_progress() {
            return Err(RaceError::IllegalOperation {
                operation,
                state: RaceState::RaceInProgress,
            });
        }
        Ok(())
    }

    pub fn get_stable(&self) -> &Stable {
        &self.stable
    }

    pub fn get_state(&self) -> RaceState {
        self.state_handler.get_state()
    }

    pub fn get_state_handler(&self) -> &StateHandler {
        &self.state_handler
    }

    pub fn get_schedule(&self) -> &Schedule {
        self.state_handler.get_schedule()
    }

    pub fn get_cur_round(&self) -> Option<&Round> {
        self.state_handler.get_cur_round()
    }

    pub fn get_active_race(&self) -> Option<&Race> {
        self.active_race.as_ref()
    }

    pub fn get_results(&self) -> &ResultsLog {
        &self.results
    }

    pub fn get_speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schedule::RoundStatus;

    fn game(seed: u64) -> Game {
        let pars = GamePars {
            min_pool_size: 12,
            pool_size: 12,
            round_distances: vec![1200, 1400],
            ..GamePars::default()
        };
        Game::new(pars, Some(seed)).unwrap()
    }

    fn run_race(game: &mut Game) {
        game.set_speed_multiplier(20.0).unwrap();
        let mut timestamp = 0.0;
        while !game.advance_frame(timestamp).unwrap() {
            timestamp += 16.0;
        }
    }

    #[test]
    fn test_invalid_pars_rejected() {
        let pars = GamePars {
            horses_per_race: 0,
            ..GamePars::default()
        };
        assert!(matches!(
            Game::new(pars, None),
            Err(RaceError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_generate_schedule_fills_empty_pool() {
        let mut game = game(1);
        let event = game.dispatch(Command::GenerateSchedule, 0.0).unwrap();

        assert_eq!(event, GameEvent::ScheduleGenerated { rounds: 2 });
        assert_eq!(game.get_stable().len(), 12);
        assert_eq!(game.get_state(), RaceState::ScheduleReady);
    }

    #[test]
    fn test_insufficient_pool() {
        let pars = GamePars {
            min_pool_size: 9,
            pool_size: 9,
            ..GamePars::default()
        };
        let mut game = Game::new(pars, Some(3)).unwrap();

        assert_eq!(
            game.dispatch(Command::GenerateSchedule, 0.0).unwrap_err(),
            RaceError::InsufficientPoolSize {
                available: 9,
                required: 10
            }
        );
        assert_eq!(game.get_state(), RaceState::Idle);
    }

    #[test]
    fn test_regenerate_undersized_pool() {
        // first seed whose initial random pool is too small for a race
        let mut game = (0..)
            .map(|seed| {
                let mut game = Game::new(GamePars::default(), Some(seed)).unwrap();
                game.generate_horses().unwrap();
                game
            })
            .find(|game| game.get_stable().len() < 10)
            .unwrap();
        let available = game.get_stable().len();

        assert_eq!(
            game.dispatch(Command::GenerateSchedule, 0.0).unwrap_err(),
            RaceError::InsufficientPoolSize {
                available,
                required: 10
            }
        );
        assert_eq!(game.get_state(), RaceState::Idle);
        assert!(game.get_schedule().is_empty());

        let mut attempts = 0;
        loop {
            attempts += 1;
            assert!(attempts <= 100, "pool never reached the required size");

            match game.dispatch(Command::GenerateHorses, 0.0).unwrap() {
                GameEvent::HorsesGenerated { count } if count >= 10 => break,
                GameEvent::HorsesGenerated { .. } => assert!(matches!(
                    game.dispatch(Command::GenerateSchedule, 0.0),
                    Err(RaceError::InsufficientPoolSize { .. })
                )),
                other => panic!("unexpected event {:?}", other),
            }
        }

        assert_eq!(
            game.dispatch(Command::GenerateSchedule, 0.0).unwrap(),
            GameEvent::ScheduleGenerated { rounds: 6 }
        );
        assert_eq!(game.get_state(), RaceState::ScheduleReady);
    }

    #[test]
    fn test_full_round() {
        let mut game = game(2);
        game.generate_schedule().unwrap();
        let conditions_before: Vec<u32> =
            game.get_stable().get_all().iter().map(|h| h.condition).collect();

        let event = game.dispatch(Command::StartRace, 100.0).unwrap();
        assert_eq!(
            event,
            GameEvent::RaceStarted {
                round_number: 1,
                distance: 1200
            }
        );
        run_race(&mut game);

        let event = game.dispatch(Command::CompleteRound, 200.0).unwrap();
        let results = match event {
            GameEvent::RoundCompleted {
                round_number,
                results,
                all_completed,
            } => {
                assert_eq!(round_number, 1);
                assert!(!all_completed);
                results
            }
            other => panic!("unexpected event {:?}", other),
        };

        assert_eq!(results.len(), 10);
        assert_eq!(game.get_state(), RaceState::RaceCompleted);
        assert_eq!(game.get_results().get_round_results(), results.as_slice());

        let round = &game.get_schedule().rounds()[0];
        assert_eq!(round.status, RoundStatus::Completed);
        assert_eq!(round.start_time, Some(100.0));
        assert_eq!(round.end_time, Some(200.0));
        assert_eq!(round.results, results);

        // participants got tired, the others recovered
        let participant_ids: Vec<&str> =
            round.participants.iter().map(|h| h.id.as_str()).collect();
        for (horse, &before) in game.get_stable().get_all().iter().zip(&conditions_before) {
            if participant_ids.contains(&horse.id.as_str()) {
                assert!(horse.condition <= before);
            } else {
                assert!(horse.condition >= before);
            }
        }
    }

    #[test]
    fn test_championship_ends_all_completed() {
        let mut game = game(4);
        game.generate_schedule().unwrap();

        game.start_race(0.0).unwrap();
        run_race(&mut game);
        game.complete_round(1.0).unwrap();
        assert!(game.next_round().unwrap());
        assert!(game.get_active_race().is_none());

        game.start_race(2.0).unwrap();
        run_race(&mut game);
        game.complete_round(3.0).unwrap();

        assert_eq!(game.get_state(), RaceState::AllRacesCompleted);
        assert_eq!(game.get_results().get_round_results().len(), 20);
        assert!(game.get_results().champion().is_some());
    }

    #[test]
    fn test_commands_rejected_while_racing() {
        let mut game = game(5);
        game.generate_schedule().unwrap();
        game.start_race(0.0).unwrap();

        for cmd in [
            Command::GenerateHorses,
            Command::ResetHorses,
            Command::GenerateSchedule,
            Command::StartRace,
            Command::NextRound,
        ] {
            assert!(matches!(
                game.dispatch(cmd, 0.0),
                Err(RaceError::IllegalOperation { .. })
            ));
        }
        assert_eq!(game.get_state(), RaceState::RaceInProgress);
    }

    #[test]
    fn test_advance_and_complete_need_running_race() {
        let mut game = game(6);
        assert!(game.advance_frame(0.0).is_err());
        assert!(game.complete_round(0.0).is_err());
    }

    #[test]
    fn test_regenerate_schedule_starts_new_championship() {
        let mut game = game(7);
        game.generate_schedule().unwrap();
        game.start_race(0.0).unwrap();
        run_race(&mut game);
        game.complete_round(1.0).unwrap();

        game.dispatch(Command::GenerateSchedule, 0.0).unwrap();
        assert_eq!(game.get_state(), RaceState::ScheduleReady);
        assert_eq!(game.get_state_handler().get_cur_round_idx(), 0);
        assert!(!game.get_results().has_results());
    }

    #[test]
    fn test_reset_keeps_pool() {
        let mut game = game(8);
        game.generate_schedule().unwrap();
        game.start_race(0.0).unwrap();
        let pool = game.get_stable().get_all().to_vec();

        assert_eq!(game.dispatch(Command::Reset, 0.0).unwrap(), GameEvent::Reset);
        assert_eq!(game.get_state(), RaceState::Idle);
        assert!(game.get_schedule().is_empty());
        assert!(game.get_active_race().is_none());
        assert_eq!(game.get_stable().get_all(), pool.as_slice());
    }

    #[test]
    fn test_set_speed() {
        let mut game = game(9);
        assert_eq!(
            game.dispatch(Command::SetSpeed(4.0), 0.0).unwrap(),
            GameEvent::SpeedChanged {
                speed_multiplier: 4.0
            }
        );
        assert_eq!(game.get_speed_multiplier(), 4.0);

        assert!(matches!(
            game.set_speed_multiplier(0.0),
            Err(RaceError::InvalidInput(_))
        ));
        assert!(game.set_speed_multiplier(f64::NAN).is_err());
        assert_eq!(game.get_speed_multiplier(), 4.0);
    }

    #[test]
    fn test_seeded_games_are_reproducible() {
        let mut a = game(42);
        let mut b = game(42);
        for game in [&mut a, &mut b] {
            game.generate_schedule().unwrap();
            game.start_race(0.0).unwrap();
            run_race(game);
            game.complete_round(1.0).unwrap();
        }

        assert_eq!(
            a.get_results().get_round_results(),
            b.get_results().get_round_results()
        );
        assert_eq!(a.get_stable().get_all(), b.get_stable().get_all());
    }
}
