use crate::core::state_handler::RaceState;
use helpers::general::InputValueError;
use helpers::random::SelectionOverflow;
use thiserror::Error;

/// Errors raised by the engine. They all describe usage errors (wrong phase, too small pool,
/// bad input) and are handed back to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RaceError {
    #[error(
        "Insufficient horses to start a race: the pool has {available} horses, \
         but at least {required} are required. Please generate horses again."
    )]
    InsufficientPoolSize { available: usize, required: usize },

    #[error("Cannot {operation} from state {state}")]
    IllegalOperation {
        operation: &'static str,
        state: RaceState,
    },

    #[error("Invalid transition from {from} to {to} (allowed: {allowed:?})")]
    InvalidTransition {
        from: RaceState,
        to: RaceState,
        allowed: Vec<RaceState>,
    },

    #[error(transparent)]
    SelectionOverflow(#[from] SelectionOverflow),

    #[error(transparent)]
    InvalidInput(#[from] InputValueError),
}
