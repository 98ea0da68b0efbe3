pub mod clock;
pub mod game;
pub mod handle_race;
pub mod horse;
pub mod race;
pub mod schedule;
pub mod scoring;
pub mod speed;
pub mod state_handler;
