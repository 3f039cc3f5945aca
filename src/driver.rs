//! Session orchestration
//!
//! The driver walks a [`RunPlan`] and, for each start, decides whether to skip
//! it, runs the engine against the seen cache, merges and persists what was
//! learned and optionally feeds a frequency counter.
//!
//! # Per-start steps
//!
//! 1. Skip-on-seen enabled and start already cached: skip notice, no compute.
//! 2. Otherwise generate with the seen set as the stop set.
//! 3. Non-empty sequence: print, merge, persist, count.
//! 4. Empty sequence (start was cached): skip notice.
//! 5. Early stop: stop notice.
//!
//! In [`RunMode::Down`] an early stop additionally walks every integer below
//! the stopped start down to 1 through the same steps before the plan
//! resumes. Auto mode runs full trajectories without a stop set and never
//! counts frequencies.

use std::fmt;
use std::io::Write;

use num_bigint::BigUint;
use num_traits::One;

use crate::error::Result;
use crate::frequency::{FrequencyCounter, FrequencyPolicy, FrequencyReport};
use crate::interrupt::CancelToken;
use crate::planner::RunMode;
use crate::seen_store::SeenStore;
use crate::sequence::{self, format_sequence};

/// One line of user-facing run output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent<'a> {
    /// A sequence was computed (possibly cut short)
    Ran {
        start: &'a BigUint,
        sequence: &'a [BigUint],
    },
    /// The start was already in the seen cache
    Skipped { start: &'a BigUint },
    /// Generation hit a cached value
    StoppedEarly {
        start: &'a BigUint,
        at: &'a BigUint,
    },
}

impl fmt::Display for RunEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ran { start, sequence } => {
                write!(f, "Start={}: {}", start, format_sequence(sequence))
            }
            Self::Skipped { start } => {
                write!(f, "Skipping Start={}: already in seen cache", start)
            }
            Self::StoppedEarly { start, at } => write!(
                f,
                "Stopped early for Start={} because {} was already in the seen cache",
                start, at
            ),
        }
    }
}

/// Statistics for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Starts taken from the plan (the batch size)
    pub planned: u64,
    /// Starts that produced a non-empty sequence, nested walks included
    pub executed: u64,
    /// Starts skipped because they were cached, nested walks included
    pub skipped: u64,
    pub stopped_early: u64,
    /// Numbers added to the seen cache
    pub new_numbers: u64,
    pub persist_failures: u64,
    /// The session ended on a cancellation request
    pub interrupted: bool,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "planned={} executed={} skipped={} stopped_early={} new_numbers={} persist_failures={}",
            self.planned,
            self.executed,
            self.skipped,
            self.stopped_early,
            self.new_numbers,
            self.persist_failures
        )?;
        if self.interrupted {
            write!(f, " (interrupted)")?;
        }
        Ok(())
    }
}

/// What a finished session hands back to the caller
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub summary: RunSummary,
    /// Present when counting was enabled and the mode allowed it
    pub counter: Option<FrequencyCounter>,
}

impl SessionReport {
    /// Frequency table for the batch, if counting was active
    pub fn frequency_report(
        &self,
        policy: FrequencyPolicy,
        min_count: Option<u64>,
    ) -> Option<FrequencyReport> {
        self.counter.as_ref().map(|counter| {
            FrequencyReport::build(counter, self.summary.planned, policy, min_count)
        })
    }
}

/// Runs one session against a seen store, writing run lines to `out`
pub struct RunDriver<'a, W: Write> {
    store: &'a mut SeenStore,
    out: W,
    cancel: CancelToken,
    skip_seen: bool,
    counter: Option<FrequencyCounter>,
    summary: RunSummary,
}

impl<'a, W: Write> RunDriver<'a, W> {
    /// Skip-on-seen enabled, counting disabled
    pub fn new(store: &'a mut SeenStore, out: W, cancel: CancelToken) -> Self {
        Self {
            store,
            out,
            cancel,
            skip_seen: true,
            counter: None,
            summary: RunSummary::default(),
        }
    }

    /// Whether starts already in the cache are skipped before computing
    pub fn skip_seen(mut self, skip: bool) -> Self {
        self.skip_seen = skip;
        self
    }

    /// Fold every computed sequence into a frequency counter
    pub fn count_frequencies(mut self, enabled: bool) -> Self {
        self.counter = enabled.then(FrequencyCounter::new);
        self
    }

    /// Run every start `mode` plans from `start`
    pub fn run(mut self, mode: &RunMode, start: &BigUint) -> Result<SessionReport> {
        tracing::info!("Running {} from {}", mode, start);

        if mode.is_unbounded() {
            if self.counter.take().is_some() {
                tracing::warn!("Frequency counting is disabled in auto mode");
            }
            for current in mode.plan(start) {
                if self.check_cancelled() {
                    break;
                }
                self.summary.planned += 1;
                self.run_full(&current)?;
            }
        } else {
            let continue_below = mode.continues_below_stops();
            for current in mode.plan(start) {
                if self.check_cancelled() {
                    break;
                }
                self.summary.planned += 1;
                let stopped = self.attempt(&current)?;
                if stopped && continue_below {
                    self.walk_below(&current)?;
                }
            }
        }

        self.out.flush()?;
        tracing::info!("Session finished: {}", self.summary);
        Ok(SessionReport {
            summary: self.summary,
            counter: self.counter,
        })
    }

    fn check_cancelled(&mut self) -> bool {
        if self.cancel.is_cancelled() {
            tracing::debug!("Cancellation observed, ending session");
            self.summary.interrupted = true;
        }
        self.summary.interrupted
    }

    /// Steps 1-5 for one start. Returns true if generation stopped early.
    fn attempt(&mut self, start: &BigUint) -> Result<bool> {
        if self.skip_seen && self.store.contains(start) {
            self.skip(start)?;
            return Ok(false);
        }

        let trajectory = sequence::generate(start, Some(self.store.seen()));
        if trajectory.is_skipped() {
            self.skip(start)?;
        } else {
            self.emit(&RunEvent::Ran {
                start,
                sequence: &trajectory.sequence,
            })?;
            self.summary.executed += 1;
            self.learn(&trajectory.sequence);
        }

        if let Some(at) = &trajectory.stopped_at {
            self.emit(&RunEvent::StoppedEarly { start, at })?;
            self.summary.stopped_early += 1;
        }
        Ok(trajectory.stopped_at.is_some())
    }

    /// Descending-sweep continuation: every integer below `start` down to 1
    fn walk_below(&mut self, start: &BigUint) -> Result<()> {
        let mut next = start.clone();
        while next > BigUint::one() {
            next -= 1u32;
            if self.check_cancelled() {
                break;
            }
            self.attempt(&next)?;
        }
        Ok(())
    }

    /// Auto mode: skip or run the full trajectory, no stop set
    fn run_full(&mut self, start: &BigUint) -> Result<()> {
        if self.skip_seen && self.store.contains(start) {
            return self.skip(start);
        }

        let full = sequence::full_sequence(start);
        self.emit(&RunEvent::Ran {
            start,
            sequence: &full,
        })?;
        self.summary.executed += 1;
        self.learn(&full);
        Ok(())
    }

    fn skip(&mut self, start: &BigUint) -> Result<()> {
        self.summary.skipped += 1;
        self.emit(&RunEvent::Skipped { start })
    }

    /// Merge into the cache, persist if anything was new, and count
    fn learn(&mut self, sequence: &[BigUint]) {
        let added = self.store.merge(sequence);
        self.summary.new_numbers += added as u64;
        if added > 0 && !self.store.persist() {
            self.summary.persist_failures += 1;
        }
        if let Some(counter) = self.counter.as_mut() {
            counter.record(sequence);
        }
    }

    fn emit(&mut self, event: &RunEvent<'_>) -> Result<()> {
        writeln!(self.out, "{}", event)?;
        Ok(())
    }
}
