//! Session configuration
//!
//! Turns raw command-line values into a validated [`SessionConfig`]. This is
//! the only place user input is validated; the core never sees a
//! non-positive start or an invalid repeat count.
//!
//! Mode precedence follows the tool's historical behaviour:
//! `--auto` > `--down` > `--to` > `--after` > `--repeats` > default.
//! Only the honoured option is validated.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use num_bigint::{BigInt, BigUint};
use num_traits::Zero;

use crate::cli::Cli;
use crate::error::{ConjectureError, Result};
use crate::frequency::FrequencyPolicy;
use crate::planner::RunMode;
use crate::seen_store::DEFAULT_SEEN_FILE;

pub const PROMPT: &str = "Enter the starting number: ";

/// Frequency counting settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountingConfig {
    pub policy: FrequencyPolicy,
    /// Explicit minimum count (count policy); `None` uses the batch default
    pub min_count: Option<u64>,
}

/// Everything the core needs for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub start: BigUint,
    pub mode: RunMode,
    pub skip_seen: bool,
    pub counting: Option<CountingConfig>,
    pub seen_path: PathBuf,
}

impl SessionConfig {
    /// Validate `cli` for an already-parsed `start`.
    ///
    /// `start_prompted` selects the default repeat count: a start typed at
    /// the prompt runs once, a start given as an argument runs twice.
    pub fn from_cli(cli: &Cli, start: BigUint, start_prompted: bool) -> Result<Self> {
        let mode = resolve_mode(cli, start_prompted)?;
        let counting = cli.counts.then_some(CountingConfig {
            policy: cli.frequency_policy,
            min_count: cli.min_count,
        });
        let seen_path = cli.persist_file.clone().unwrap_or_else(default_seen_path);

        tracing::debug!(
            "Session: start={} mode={} skip_seen={} counting={:?} cache={}",
            start,
            mode,
            !cli.no_skip,
            counting,
            seen_path.display()
        );

        Ok(Self {
            start,
            mode,
            skip_seen: !cli.no_skip,
            counting,
            seen_path,
        })
    }
}

/// `.collatz_seen.json` next to the running executable, or in the current
/// directory when the executable path is unavailable
pub fn default_seen_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_SEEN_FILE)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SEEN_FILE))
}

/// Parse a signed integer, or `None` if the text is not one
fn parse_signed(text: &str) -> Option<BigInt> {
    BigInt::from_str(text.trim()).ok()
}

/// Parse and validate a starting value
pub fn parse_start(text: &str) -> Result<BigUint> {
    let value = parse_signed(text).ok_or_else(|| ConjectureError::validation("Invalid input"))?;
    value
        .to_biguint()
        .filter(|n| !n.is_zero())
        .ok_or_else(|| ConjectureError::validation("Please enter a positive integer greater than 0"))
}

/// Ask for the starting value on `output` and read one line from `input`
pub fn prompt_start<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<BigUint> {
    write!(output, "{}", PROMPT)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(ConjectureError::validation("Invalid input"));
    }
    parse_start(&line)
}

fn parse_to(text: &str) -> Result<BigUint> {
    let value = parse_signed(text)
        .ok_or_else(|| ConjectureError::validation("Invalid --to value; must be an integer"))?;
    value
        .to_biguint()
        .filter(|n| !n.is_zero())
        .ok_or_else(|| ConjectureError::validation("Invalid --to value; must be >= 1"))
}

/// Pick the single honoured iteration mode
pub fn resolve_mode(cli: &Cli, start_prompted: bool) -> Result<RunMode> {
    if cli.auto {
        return Ok(RunMode::Auto);
    }
    if cli.down {
        return Ok(RunMode::Down);
    }
    if let Some(to) = &cli.to {
        if cli.repeats.is_some() || cli.after.is_some() {
            tracing::debug!("--to takes precedence over --repeats/--after");
        }
        return Ok(RunMode::Range { to: parse_to(to)? });
    }
    if let Some(after) = cli.after {
        let after = u64::try_from(after)
            .map_err(|_| ConjectureError::validation("Invalid --after value; must be >= 0"))?;
        return Ok(RunMode::after(after));
    }

    let repeats = cli.repeats.unwrap_or(if start_prompted {
        1
    } else {
        RunMode::DEFAULT_REPEATS as i64
    });
    if repeats <= 0 {
        return Err(ConjectureError::validation("Repeats must be >= 1"));
    }
    Ok(RunMode::Repeats {
        count: repeats as u64,
    })
}
