//! Collatz trajectory generation
//!
//! Pure functions over arbitrary-precision integers. `generate` stops as soon
//! as the trajectory re-enters a caller-supplied stop set, which is how the
//! driver avoids recomputing tails that the seen cache already covers.
//!
//! # Early-stop contract
//!
//! - If the start itself is in the stop set the sequence is empty and
//!   `stopped_at` is the start.
//! - If a later value is in the stop set, generation ends *before* that value
//!   is appended and `stopped_at` holds it.
//! - Otherwise the sequence ends with 1 and `stopped_at` is `None`.

use std::collections::{BTreeSet, HashSet};

use num_bigint::BigUint;
use num_traits::One;

/// Membership test used to cut a trajectory short.
///
/// Implemented for the standard sets and for the seen cache so the engine
/// stays independent of how the caller stores visited numbers.
pub trait StopSet {
    /// Returns true if `n` has already been explored
    fn contains_value(&self, n: &BigUint) -> bool;
}

impl StopSet for HashSet<BigUint> {
    fn contains_value(&self, n: &BigUint) -> bool {
        self.contains(n)
    }
}

impl StopSet for BTreeSet<BigUint> {
    fn contains_value(&self, n: &BigUint) -> bool {
        self.contains(n)
    }
}

/// Result of one `generate` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trajectory {
    /// Start followed by every newly computed value
    pub sequence: Vec<BigUint>,
    /// The already-seen value that ended generation, if any
    pub stopped_at: Option<BigUint>,
}

impl Trajectory {
    /// True when the start itself was in the stop set and nothing was learned
    pub fn is_skipped(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Apply the Collatz transformation once: `n / 2` if even, else `3n + 1`.
pub fn step(n: &BigUint) -> BigUint {
    if n.bit(0) { n * 3u32 + 1u32 } else { n >> 1u32 }
}

/// Generate the trajectory of `start`, stopping early on re-entering `stop_set`.
///
/// `start` must be at least 1; zero is a fixed point of the transformation
/// and would never reach 1. Callers validate this before planning a run.
pub fn generate<S>(start: &BigUint, stop_set: Option<&S>) -> Trajectory
where
    S: StopSet + ?Sized,
{
    debug_assert!(*start >= BigUint::one(), "start must be positive");

    if let Some(stop) = stop_set
        && stop.contains_value(start)
    {
        return Trajectory {
            sequence: Vec::new(),
            stopped_at: Some(start.clone()),
        };
    }

    let mut sequence = vec![start.clone()];
    let mut n = start.clone();
    while !n.is_one() {
        n = step(&n);
        if let Some(stop) = stop_set
            && stop.contains_value(&n)
        {
            return Trajectory {
                sequence,
                stopped_at: Some(n),
            };
        }
        sequence.push(n.clone());
    }

    Trajectory {
        sequence,
        stopped_at: None,
    }
}

/// Full trajectory of `start` down to 1, with no early stop.
pub fn full_sequence(start: &BigUint) -> Vec<BigUint> {
    generate::<HashSet<BigUint>>(start, None).sequence
}

/// Render a sequence as `a -> b -> c`
pub fn format_sequence(sequence: &[BigUint]) -> String {
    sequence
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
