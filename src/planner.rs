//! Run planning: which starting values a session attempts, in order.
//!
//! A [`RunMode`] is turned into a [`RunPlan`], an iterator of starts. Plans
//! for every mode except [`RunMode::Auto`] are finite.

use std::fmt;

use num_bigint::BigUint;
use num_traits::One;

/// Iteration policy for a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// `n, n+1, ..., n+count-1` (count >= 1)
    Repeats { count: u64 },
    /// `n` to `to` inclusive, stepping towards `to`
    Range { to: BigUint },
    /// `n` down to 1, continuing below any early stop
    Down,
    /// `n, n+1, n+2, ...` until cancelled
    Auto,
}

impl RunMode {
    /// Default when no mode flag is given: the start and its successor
    pub const DEFAULT_REPEATS: u64 = 2;

    /// `after` extra starts following the first one
    pub fn after(after: u64) -> Self {
        Self::Repeats {
            count: after.saturating_add(1),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Whether an early stop walks the integers below the stopped start
    pub fn continues_below_stops(&self) -> bool {
        matches!(self, Self::Down)
    }

    /// Build the ordered plan of starts beginning at `start`
    pub fn plan(&self, start: &BigUint) -> RunPlan {
        match self {
            Self::Repeats { count } => RunPlan::ascending(start.clone(), Some(*count)),
            Self::Range { to } => RunPlan::towards(start.clone(), to.clone()),
            Self::Down => RunPlan::towards(start.clone(), BigUint::one()),
            Self::Auto => RunPlan::ascending(start.clone(), None),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Repeats { count } => write!(f, "repeats {}", count),
            Self::Range { to } => write!(f, "range to {}", to),
            Self::Down => write!(f, "down to 1"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

#[derive(Debug, Clone)]
enum Bound {
    /// Stop after this many more starts
    Count(u64),
    /// Stop after emitting this value (inclusive)
    Until(BigUint),
    Unbounded,
}

/// Ordered, possibly infinite sequence of starts
#[derive(Debug, Clone)]
pub struct RunPlan {
    next: Option<BigUint>,
    descending: bool,
    bound: Bound,
}

impl RunPlan {
    fn ascending(start: BigUint, count: Option<u64>) -> Self {
        let bound = match count {
            Some(0) => {
                return Self {
                    next: None,
                    descending: false,
                    bound: Bound::Count(0),
                };
            }
            Some(count) => Bound::Count(count),
            None => Bound::Unbounded,
        };
        Self {
            next: Some(start),
            descending: false,
            bound,
        }
    }

    fn towards(start: BigUint, to: BigUint) -> Self {
        Self {
            descending: to < start,
            next: Some(start),
            bound: Bound::Until(to),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self.bound, Bound::Unbounded)
    }
}

impl Iterator for RunPlan {
    type Item = BigUint;

    fn next(&mut self) -> Option<BigUint> {
        let current = self.next.take()?;

        let more = match &mut self.bound {
            Bound::Count(remaining) => {
                *remaining -= 1;
                *remaining > 0
            }
            Bound::Until(to) => current != *to,
            Bound::Unbounded => true,
        };

        if more {
            self.next = Some(if self.descending {
                &current - 1u32
            } else {
                &current + 1u32
            });
        }
        Some(current)
    }
}
