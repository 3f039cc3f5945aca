//! Durable seen-number cache
//!
//! The cache is a JSON array of integers, written sorted ascending. Loading
//! never fails the session: a missing, unreadable or corrupt file yields an
//! empty set and a warning. Persisting writes a temporary file in the target
//! directory and renames it over the cache, so readers never observe a
//! half-written file. A failed persist leaves the previous file untouched.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use num_bigint::BigUint;
use num_traits::FromPrimitive;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{Formatter, Serializer};
use tempfile::NamedTempFile;

use crate::sequence::StopSet;

/// Default cache file name, resolved next to the executable by `config`
pub const DEFAULT_SEEN_FILE: &str = ".collatz_seen.json";

/// Set of every integer produced by a completed run.
///
/// Grows monotonically within a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    values: HashSet<BigUint>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, n: &BigUint) -> bool {
        self.values.contains(n)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Add every item, returning how many were not already present.
    pub fn merge<'a, I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = &'a BigUint>,
    {
        let mut added = 0;
        for n in items {
            if self.values.insert(n.clone()) {
                added += 1;
            }
        }
        added
    }

    /// Members in ascending order (the canonical serialized order)
    pub fn sorted(&self) -> Vec<&BigUint> {
        let mut values: Vec<&BigUint> = self.values.iter().collect();
        values.sort_unstable();
        values
    }
}

impl StopSet for SeenSet {
    fn contains_value(&self, n: &BigUint) -> bool {
        self.contains(n)
    }
}

impl FromIterator<BigUint> for SeenSet {
    fn from_iter<I: IntoIterator<Item = BigUint>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Writes arrays as `[1, 2, 4]`, the layout earlier versions of the tool
/// produced, so old and new cache files diff cleanly.
struct SpacedArrayFormatter;

impl Formatter for SpacedArrayFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }
}

/// Serialize a set to its canonical form: a sorted ascending JSON array.
pub fn encode(set: &SeenSet) -> Result<Vec<u8>> {
    let values = set
        .sorted()
        .into_iter()
        .map(|n| {
            serde_json::Number::from_str(&n.to_string())
                .map(Value::Number)
                .with_context(|| format!("Failed to encode {} as a JSON number", n))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, SpacedArrayFormatter);
    Value::Array(values)
        .serialize(&mut serializer)
        .context("Failed to serialize seen cache")?;
    Ok(out)
}

/// Parse a cache document. Every element must coerce to a non-negative
/// integer; one bad element rejects the whole document.
pub fn decode(bytes: &[u8]) -> Result<SeenSet> {
    let document: Value = serde_json::from_slice(bytes).context("Failed to parse seen cache JSON")?;
    let Value::Array(items) = document else {
        bail!("Seen cache must be a JSON array of integers");
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            coerce_integer(item).with_context(|| format!("Invalid entry at index {}", index))
        })
        .collect()
}

/// Integer coercion for cache entries: integers of any width, integral
/// floats (truncated), decimal digit strings and booleans.
fn coerce_integer(value: &Value) -> Result<BigUint> {
    match value {
        Value::Number(number) => {
            let text = number.to_string();
            if let Ok(n) = BigUint::from_str(&text) {
                return Ok(n);
            }
            text.parse::<f64>()
                .ok()
                .and_then(BigUint::from_f64)
                .ok_or_else(|| anyhow!("{} is not a non-negative integer", text))
        }
        Value::String(s) => BigUint::from_str(s.trim())
            .map_err(|_| anyhow!("{:?} is not a non-negative integer", s)),
        Value::Bool(b) => Ok(BigUint::from(u8::from(*b))),
        other => bail!("{} is not an integer", other),
    }
}

fn try_load(path: &Path) -> Result<SeenSet> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    decode(&bytes).with_context(|| format!("Failed to decode {}", path.display()))
}

/// Load the seen set from `path`.
///
/// A missing file is a fresh start. Any other failure is logged as a warning
/// and also yields an empty set.
pub fn load(path: &Path) -> SeenSet {
    if !path.exists() {
        tracing::debug!("No seen cache at {}, starting fresh", path.display());
        return SeenSet::new();
    }

    match try_load(path) {
        Ok(set) => {
            tracing::debug!("Loaded {} seen numbers from {}", set.len(), path.display());
            set
        }
        Err(e) => {
            tracing::warn!("Couldn't read seen file {}: {:#}", path.display(), e);
            SeenSet::new()
        }
    }
}

/// Atomically replace `path` with the serialized set.
pub fn try_persist(path: &Path, set: &SeenSet) -> Result<()> {
    let bytes = encode(set)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(&bytes)
        .context("Failed to write temporary seen cache")?;
    tmp.as_file()
        .sync_all()
        .context("Failed to sync temporary seen cache")?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

/// Persist the set, logging a warning on failure. Returns true on success.
pub fn persist(path: &Path, set: &SeenSet) -> bool {
    match try_persist(path, set) {
        Ok(()) => {
            tracing::debug!("Persisted {} seen numbers to {}", set.len(), path.display());
            true
        }
        Err(e) => {
            tracing::warn!("Couldn't save seen file {}: {:#}", path.display(), e);
            false
        }
    }
}

/// A seen set bound to its durable location.
#[derive(Debug)]
pub struct SeenStore {
    path: PathBuf,
    seen: SeenSet,
}

impl SeenStore {
    /// Load the store from `path` (see [`load`] for failure handling)
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let seen = load(&path);
        Self { path, seen }
    }

    /// Wrap an in-memory set without touching the filesystem
    pub fn with_set(path: impl Into<PathBuf>, seen: SeenSet) -> Self {
        Self {
            path: path.into(),
            seen,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    pub fn contains(&self, n: &BigUint) -> bool {
        self.seen.contains(n)
    }

    /// Merge new items in memory, returning how many were new
    pub fn merge(&mut self, items: &[BigUint]) -> usize {
        self.seen.merge(items)
    }

    /// Flush the in-memory set to disk. Failure keeps the in-memory data.
    pub fn persist(&self) -> bool {
        persist(&self.path, &self.seen)
    }
}
