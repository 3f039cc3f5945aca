use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::frequency::FrequencyPolicy;

/// Conjecture - Collatz runner with a persistent seen cache
#[derive(Parser, Debug)]
#[command(name = "conjecture")]
#[command(about = "Collatz runner with a persistent seen cache and frequency counting")]
#[command(version)]
pub struct Cli {
    /// Starting positive integer (prompted for when omitted)
    #[arg(allow_negative_numbers = true)]
    pub start: Option<String>,

    /// Number of consecutive starts to run (N..N+repeats-1).
    /// Defaults to 2 when the start is given on the command line.
    #[arg(short, long, allow_negative_numbers = true)]
    pub repeats: Option<i64>,

    /// Number of additional starts after the first (--after 2 runs N, N+1, N+2)
    #[arg(short = 'x', long, allow_negative_numbers = true)]
    pub after: Option<i64>,

    /// Run every start from N to TO inclusive. TO < N runs downward.
    #[arg(short, long, allow_negative_numbers = true)]
    pub to: Option<String>,

    /// Run the start and every number below it down to 1
    #[arg(long)]
    pub down: bool,

    /// Repeat indefinitely starting at N (Ctrl-C to stop)
    #[arg(short, long)]
    pub auto: bool,

    /// JSON file storing seen numbers (default: .collatz_seen.json next to the executable)
    #[arg(long, env = "CONJECTURE_SEEN_FILE")]
    pub persist_file: Option<PathBuf>,

    /// Do not skip starts that are already in the seen cache
    #[arg(long)]
    pub no_skip: bool,

    /// Collect frequency counts across runs and print them at the end
    #[arg(long)]
    pub counts: bool,

    /// Minimum occurrences shown in the frequency table (default: max(2, batch/4))
    #[arg(long)]
    pub min_count: Option<u64>,

    /// Threshold policy for the frequency table (count or percent)
    #[arg(long, default_value_t = FrequencyPolicy::Count)]
    pub frequency_policy: FrequencyPolicy,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
