//! OrderedSet: a sorted, duplicate-controlled sequence of integer keys.
//!
//! The set backs every incidence list of the mesh (node → elements, node →
//! faces) and the pending-removal stacks. Entries are kept ascending at all
//! times; duplicates are rejected unless the caller asks for them per insert.
//!
//! An optional parallel array records, for each entry, the size of the set at
//! the moment the entry was inserted. Callers that keep their own per-insertion
//! arrays use it to map a sorted rank back to the insertion order.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::data::alloc::try_grow;
use crate::debug_invariants::{DebugInvariants, ensure_sorted};
use crate::mesh_error::MeshError;

/// Result of a rank search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Search {
    /// The key is stored at this rank (any occurrence for repeated keys).
    Found(usize),
    /// The key is absent; this is the rank that keeps the order if inserted.
    Missing(usize),
}

/// Binary search over a sorted slice. An empty slice reports
/// `Missing(0)` without searching.
pub(crate) fn search_sorted<K: Ord>(entries: &[K], entry: &K) -> Search {
    if entries.is_empty() {
        return Search::Missing(0);
    }
    match entries.binary_search(entry) {
        Ok(rank) => Search::Found(rank),
        Err(rank) => Search::Missing(rank),
    }
}

/// Sorted set of keys with optional insertion-rank tracking.
///
/// # Invariants
/// - `entries[i] < entries[i + 1]` unless repeats were allowed on insert, in
///   which case `entries[i] <= entries[i + 1]`.
/// - When tracking is enabled, `original_rank.len() == entries.len()`.
///
/// Deserialization checks the same invariants and fails on unsorted input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "RawOrderedSet<K>",
    bound(deserialize = "K: Deserialize<'de> + Ord + Copy + Display")
)]
pub struct OrderedSet<K> {
    entries: Vec<K>,
    original_rank: Option<Vec<usize>>,
}

/// Unchecked wire form of [`OrderedSet`].
#[derive(Deserialize)]
struct RawOrderedSet<K> {
    entries: Vec<K>,
    original_rank: Option<Vec<usize>>,
}

impl<K: Ord + Copy + Display> TryFrom<RawOrderedSet<K>> for OrderedSet<K> {
    type Error = MeshError;

    fn try_from(raw: RawOrderedSet<K>) -> Result<Self, MeshError> {
        let set = Self {
            entries: raw.entries,
            original_rank: raw.original_rank,
        };
        set.validate_invariants_inner()?;
        Ok(set)
    }
}

impl<K> Default for OrderedSet<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            original_rank: None,
        }
    }
}

impl<K: Ord + Copy + Display> OrderedSet<K> {
    /// Creates an empty set without rank tracking.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set that records the insertion rank of every entry.
    pub fn with_rank_tracking() -> Self {
        Self {
            entries: Vec::new(),
            original_rank: Some(Vec::new()),
        }
    }

    /// Number of stored entries (repeats included).
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted view of the entries.
    #[inline]
    pub fn as_slice(&self) -> &[K] {
        &self.entries
    }

    /// Iterates the entries in ascending order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = K> + '_ {
        self.entries.iter().copied()
    }

    /// Insertion ranks parallel to [`as_slice`](Self::as_slice), if tracked.
    pub fn original_ranks(&self) -> Option<&[usize]> {
        self.original_rank.as_deref()
    }

    /// Returns `true` if `entry` is stored at least once.
    pub fn contains(&self, entry: K) -> bool {
        matches!(search_sorted(&self.entries, &entry), Search::Found(_))
    }

    /// Rank of the first occurrence of `entry`, if present.
    pub fn rank_of(&self, entry: K) -> Option<usize> {
        match search_sorted(&self.entries, &entry) {
            Search::Found(rank) => Some(self.first_of_run(rank)),
            Search::Missing(_) => None,
        }
    }

    /// Inserts `entry`, keeping the set sorted.
    ///
    /// When `entry` is already present the set is left unchanged unless
    /// `allow_repeat` is set. Returns whether an entry was written.
    ///
    /// # Errors
    /// [`MeshError::Allocation`] if the backing buffers cannot grow.
    pub fn insert(&mut self, entry: K, allow_repeat: bool) -> Result<bool, MeshError> {
        let rank = match search_sorted(&self.entries, &entry) {
            Search::Found(rank) if allow_repeat => rank,
            Search::Found(_) => return Ok(false),
            Search::Missing(rank) => rank,
        };
        try_grow("ordered set", &mut self.entries, 1)?;
        if let Some(ranks) = self.original_rank.as_mut() {
            try_grow("ordered set ranks", ranks, 1)?;
            ranks.insert(rank, self.entries.len());
        }
        self.entries.insert(rank, entry);
        crate::debug_invariants!(self.validate_invariants_inner(), "OrderedSet::insert");
        Ok(true)
    }

    /// Removes up to `max_count` consecutive occurrences of `entry`
    /// (`None` removes all of them) and returns how many were removed.
    ///
    /// Removing an absent entry is not an error and returns `Ok(0)`.
    pub fn remove(&mut self, entry: K, max_count: Option<usize>) -> Result<usize, MeshError> {
        let Search::Found(hit) = search_sorted(&self.entries, &entry) else {
            return Ok(0);
        };
        if self.entries[hit] != entry {
            return Err(MeshError::Logic(format!(
                "ordered set search returned rank {hit} for a different entry"
            )));
        }
        let first = self.first_of_run(hit);
        let run = self.entries[first..]
            .iter()
            .take_while(|&&e| e == entry)
            .count();
        let n = max_count.map_or(run, |max| max.min(run));
        self.entries.drain(first..first + n);
        self.entries.shrink_to_fit();
        if let Some(ranks) = self.original_rank.as_mut() {
            ranks.drain(first..first + n);
            ranks.shrink_to_fit();
        }
        Ok(n)
    }

    /// Removes every entry, keeping rank tracking enabled if it was.
    pub fn clear(&mut self) {
        self.entries = Vec::new();
        if let Some(ranks) = self.original_rank.as_mut() {
            *ranks = Vec::new();
        }
    }

    fn first_of_run(&self, mut rank: usize) -> usize {
        while rank > 0 && self.entries[rank - 1] == self.entries[rank] {
            rank -= 1;
        }
        rank
    }

    fn validate_invariants_inner(&self) -> Result<(), MeshError> {
        ensure_sorted(&self.entries, true, "ordered set")?;
        if let Some(ranks) = &self.original_rank {
            if ranks.len() != self.entries.len() {
                return Err(MeshError::Logic(format!(
                    "ordered set tracks {} ranks for {} entries",
                    ranks.len(),
                    self.entries.len()
                )));
            }
        }
        Ok(())
    }
}

impl<K: Ord + Copy + Display> DebugInvariants for OrderedSet<K> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "OrderedSet");
    }

    fn validate_invariants(&self) -> Result<(), MeshError> {
        self.validate_invariants_inner()
    }
}

impl<K: Ord + Copy> FromIterator<K> for OrderedSet<K> {
    /// Collects distinct keys; repeated keys are kept once.
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut entries: Vec<K> = iter.into_iter().collect();
        entries.sort_unstable();
        entries.dedup();
        Self {
            entries,
            original_rank: None,
        }
    }
}
