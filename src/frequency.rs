//! Frequency counting across a batch of runs
//!
//! The counter remembers the order in which numbers were first seen so
//! ranking is stable: descending by count, ties in first-encountered order.

use std::collections::HashMap;
use std::fmt;

use num_bigint::BigUint;
use strum::{Display, EnumString};

/// Threshold policy used to decide which numbers are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum FrequencyPolicy {
    /// Count at least `min_count`, defaulting to `max(2, batch / 4)`
    #[default]
    Count,
    /// Count strictly above 2% of the batch size
    Percent,
}

/// Share of the batch a number must exceed under [`FrequencyPolicy::Percent`]
pub const PERCENT_THRESHOLD: u64 = 2;

/// Occurrence counts for one session. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct FrequencyCounter {
    counts: HashMap<BigUint, u64>,
    order: Vec<BigUint>,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count each member of `sequence` once
    pub fn record(&mut self, sequence: &[BigUint]) {
        for n in sequence {
            match self.counts.get_mut(n) {
                Some(count) => *count += 1,
                None => {
                    self.counts.insert(n.clone(), 1);
                    self.order.push(n.clone());
                }
            }
        }
    }

    pub fn get(&self, n: &BigUint) -> u64 {
        self.counts.get(n).copied().unwrap_or(0)
    }

    /// All entries, most frequent first, ties in first-encountered order
    pub fn ranked(&self) -> Vec<FrequencyEntry> {
        let mut entries: Vec<FrequencyEntry> = self
            .order
            .iter()
            .map(|n| FrequencyEntry {
                number: n.clone(),
                count: self.counts[n],
            })
            .collect();
        // Stable sort keeps insertion order among equal counts
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries
    }
}

/// One reported number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyEntry {
    pub number: BigUint,
    pub count: u64,
}

/// Default minimum count for a batch: `max(2, batch / 4)`
pub fn default_min_count(batch_size: u64) -> u64 {
    (batch_size / 4).max(2)
}

/// Filtered, ranked frequencies ready to print
#[derive(Debug, Clone)]
pub struct FrequencyReport {
    pub policy: FrequencyPolicy,
    pub batch_size: u64,
    /// Effective minimum count (count policy only)
    pub min_count: u64,
    pub entries: Vec<FrequencyEntry>,
}

impl FrequencyReport {
    /// Rank and filter `counter` for a batch of `batch_size` planned starts.
    ///
    /// `min_count` overrides the default threshold of the count policy and is
    /// ignored by the percent policy.
    pub fn build(
        counter: &FrequencyCounter,
        batch_size: u64,
        policy: FrequencyPolicy,
        min_count: Option<u64>,
    ) -> Self {
        let min_count = min_count.unwrap_or_else(|| default_min_count(batch_size));
        let entries = counter
            .ranked()
            .into_iter()
            .filter(|entry| match policy {
                FrequencyPolicy::Count => entry.count >= min_count,
                FrequencyPolicy::Percent => exceeds_percent(entry.count, batch_size),
            })
            .collect();

        Self {
            policy,
            batch_size,
            min_count,
            entries,
        }
    }
}

/// `count / batch_size > 2%`, in integer arithmetic
fn exceeds_percent(count: u64, batch_size: u64) -> bool {
    batch_size > 0
        && u128::from(count) * 100 > u128::from(batch_size) * u128::from(PERCENT_THRESHOLD)
}

fn percentage(count: u64, batch_size: u64) -> Option<f64> {
    if batch_size == 0 {
        return None;
    }
    Some(count as f64 / batch_size as f64 * 100.0)
}

impl fmt::Display for FrequencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.policy {
            FrequencyPolicy::Count => {
                writeln!(f, "--- Number Frequencies (>= {} occurrences) ---", self.min_count)?;
                for entry in &self.entries {
                    writeln!(f, "{}: {}", entry.number, entry.count)?;
                }
            }
            FrequencyPolicy::Percent => {
                writeln!(
                    f,
                    "--- Frequently Appearing Numbers (>{}% of sequences) ---",
                    PERCENT_THRESHOLD
                )?;
                for entry in &self.entries {
                    let pct = percentage(entry.count, self.batch_size).unwrap_or(0.0);
                    writeln!(
                        f,
                        "Number {:>4} → Found in {:>3} sequences ({:>5.1}%)",
                        entry.number.to_string(),
                        entry.count,
                        pct
                    )?;
                }
            }
        }
        Ok(())
    }
}
