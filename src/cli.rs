use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gradCPT response reconciliation and zone labelling
#[derive(Parser, Debug)]
#[command(name = "gradcpt")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile and label a recorded session
    Label {
        /// Session JSON written by the recorder
        #[arg(short, long)]
        session: PathBuf,

        /// Labels output file
        #[arg(short, long, default_value = "gradcpt_output.txt")]
        output: PathBuf,

        /// Also write reconciled response times as JSON
        #[arg(long)]
        response_times: Option<PathBuf>,
    },

    /// Record a synthetic session with a simulated participant
    Simulate {
        /// Session JSON output
        #[arg(short, long)]
        output: PathBuf,

        /// RNG seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Override the configured trial count
        #[arg(long)]
        trials: Option<usize>,

        /// Pace the session on the wall clock instead of a simulated one
        #[arg(long)]
        realtime: bool,
    },

    /// Extract per-window EEG features from a JSON array of samples
    Features {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Preceding windows appended to each row
        #[arg(long, default_value = "9")]
        lags: usize,
    },
}
