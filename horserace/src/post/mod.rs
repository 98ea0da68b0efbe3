pub mod export;
pub mod race_result;
