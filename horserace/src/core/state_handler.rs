use crate::core::schedule::{Round, RoundStatus, Schedule};
use crate::error::RaceError;
use crate::post::race_result::RaceResult;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RaceState {
    Idle,
    ScheduleReady,
    RaceInProgress,
    RaceCompleted,
    AllRacesCompleted,
}

impl RaceState {
    /// allowed_transitions returns the states that can be reached from this one.
    pub fn allowed_transitions(self) -> &'static [RaceState] {
        match self {
            RaceState::Idle => &[RaceState::ScheduleReady],
            RaceState::ScheduleReady => &[RaceState::RaceInProgress, RaceState::Idle],
            RaceState::RaceInProgress => &[RaceState::RaceCompleted],
            RaceState::RaceCompleted => &[
                RaceState::ScheduleReady,
                RaceState::AllRacesCompleted,
                RaceState::Idle,
            ],
            RaceState::AllRacesCompleted => &[RaceState::Idle],
        }
    }

    pub fn can_transition_to(self, target: RaceState) -> bool {
        self.allowed_transitions().contains(&target)
    }
}

impl fmt::Display for RaceState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            RaceState::Idle => "IDLE",
            RaceState::ScheduleReady => "SCHEDULE_READY",
            RaceState::RaceInProgress => "RACE_IN_PROGRESS",
            RaceState::RaceCompleted => "RACE_COMPLETED",
            RaceState::AllRacesCompleted => "ALL_RACES_COMPLETED",
        };
        write!(f, "{}", name)
    }
}

/// StateHandler owns the race lifecycle: the current state, the schedule and the index of the
/// current round. Every operation checks the state first and leaves everything untouched if the
/// check fails.
#[derive(Debug, Clone)]
pub struct StateHandler {
    state: RaceState,
    schedule: Schedule,
    cur_round_idx: usize,
}

impl StateHandler {
    /// transition moves to the target state if the transition table allows it.
    pub fn transition(&mut self, target: RaceState) -> Result<(), RaceError> {
        if !self.state.can_transition_to(target) {
            return Err(RaceError::InvalidTransition {
                from: self.state,
                to: target,
                allowed: self.state.allowed_transitions().to_vec(),
            });
        }

        log::debug!("Race state {} -> {}", self.state, target);
        self.state = target;
        Ok(())
    }

    /// reset returns to IDLE from any state and drops the schedule.
    pub fn reset(&mut self) {
        self.state = RaceState::Idle;
        self.schedule = Schedule::default();
        self.cur_round_idx = 0;
    }

    /// load_schedule installs a freshly built schedule and moves to SCHEDULE_READY.
    pub fn load_schedule(&mut self, schedule: Schedule) -> Result<(), RaceError> {
        self.transition(RaceState::ScheduleReady)?;
        self.schedule = schedule;
        self.cur_round_idx = 0;
        Ok(())
    }

    /// start_race marks the current round as running.
    pub fn start_race(&mut self, t_start: f64) -> Result<(), RaceError> {
        self.require(RaceState::ScheduleReady, "start race")?;

        let state = self.state;
        let round = self
            .schedule
            .get_mut(self.cur_round_idx)
            .ok_or(RaceError::IllegalOperation {
                operation: "start race without rounds",
                state,
            })?;
        round.status = RoundStatus::InProgress;
        round.start_time = Some(t_start);

        self.transition(RaceState::RaceInProgress)
    }

    /// complete_current_round stores the results of the running round and moves to
    /// RACE_COMPLETED, or straight on to ALL_RACES_COMPLETED after the last round.
    pub fn complete_current_round(
        &mut self,
        t_end: f64,
        results: Vec<RaceResult>,
    ) -> Result<(), RaceError> {
        self.require(RaceState::RaceInProgress, "complete round")?;
        self.transition(RaceState::RaceCompleted)?;

        let idx = self.cur_round_idx;
        if let Some(round) = self.schedule.get_mut(idx) {
            round.status = RoundStatus::Completed;
            round.end_time = Some(t_end);
            round.results = results;
        }

        if self.schedule.get_all_completed() {
            self.transition(RaceState::AllRacesCompleted)?;
        }
        Ok(())
    }

    /// next_round moves on to the next round. Returns false (and changes nothing) if there is no
    /// round left.
    pub fn next_round(&mut self) -> Result<bool, RaceError> {
        self.require(RaceState::RaceCompleted, "advance to next round")?;

        if self.cur_round_idx + 1 >= self.schedule.len() {
            return Ok(false);
        }

        self.transition(RaceState::ScheduleReady)?;
        self.cur_round_idx += 1;
        Ok(true)
    }

    fn require(&self, expected: RaceState, operation: &'static str) -> Result<(), RaceError> {
        if self.state != expected {
            return Err(RaceError::IllegalOperation {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    pub fn get_state(&self) -> RaceState {
        self.state
    }

    pub fn get_schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn get_cur_round_idx(&self) -> usize {
        self.cur_round_idx
    }

    pub fn get_cur_round(&self) -> Option<&Round> {
        self.schedule.get(self.cur_round_idx)
    }

    pub fn is_race_in_progress(&self) -> bool {
        self.state == RaceState::RaceInProgress
    }
}

impl Default for StateHandler {
    fn default() -> Self {
        StateHandler {
            state: RaceState::Idle,
            schedule: Schedule::default(),
            cur_round_idx: 0,
        }
    }
}
