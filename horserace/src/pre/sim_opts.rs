use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "horserace",
    about = "A frame-based horse race championship simulator written in Rust"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug logging
    #[clap(short, long)]
    pub debug: bool,

    /// Pace the races in real time and print live progress
    #[clap(short, long)]
    pub realtime: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set number of championships to simulate (only for instant mode, ignored in real-time mode)
    #[clap(short, long, default_value = "1")]
    pub no_sim_runs: u32,

    /// Set path to the game parameter file (OPTIONAL: if not set, the default parameters are used)
    #[clap(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set playback speed multiplier, should be in the range [0.1, 20.0]
    #[clap(short, long, default_value = "1.0")]
    pub speed_multiplier: f64,

    /// Set seed of the random number generator for reproducible championships
    #[clap(long)]
    pub seed: Option<u64>,

    /// Export results and standings of the (last) championship as JSON
    #[clap(long)]
    pub export_json: Option<PathBuf>,

    /// Export the round results of the (last) championship as CSV
    #[clap(long)]
    pub export_csv: Option<PathBuf>,
}
