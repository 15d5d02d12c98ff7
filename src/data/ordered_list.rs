//! OrderedDataList: integer keys kept sorted, each owning a payload.
//!
//! This is the general form of [`OrderedSet`](super::ordered_set::OrderedSet):
//! keys and payloads live in two parallel vectors that are shifted in
//! lockstep. Payloads are moved, never copied byte-wise, so a payload that
//! owns resources is dropped exactly once when it is replaced or removed.

use serde::{Deserialize, Serialize};

use crate::data::alloc::try_grow;
use crate::data::ordered_set::{Search, search_sorted};
use crate::debug_invariants::{DebugInvariants, ensure_sorted};
use crate::mesh_error::MeshError;

/// Sorted association list from `i64` keys to payloads `V`.
///
/// Deserialization rejects unsorted keys and a key/payload length mismatch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "RawOrderedDataList<V>",
    bound(deserialize = "V: Deserialize<'de>")
)]
pub struct OrderedDataList<V> {
    keys: Vec<i64>,
    data: Vec<V>,
}

/// Unchecked wire form of [`OrderedDataList`].
#[derive(Deserialize)]
struct RawOrderedDataList<V> {
    keys: Vec<i64>,
    data: Vec<V>,
}

impl<V> TryFrom<RawOrderedDataList<V>> for OrderedDataList<V> {
    type Error = MeshError;

    fn try_from(raw: RawOrderedDataList<V>) -> Result<Self, MeshError> {
        let list = Self {
            keys: raw.keys,
            data: raw.data,
        };
        list.validate_invariants()?;
        Ok(list)
    }
}

impl<V> Default for OrderedDataList<V> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            data: Vec::new(),
        }
    }
}

impl<V> OrderedDataList<V> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if the list is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sorted keys.
    #[inline]
    pub fn keys(&self) -> &[i64] {
        &self.keys
    }

    /// Payloads in key order.
    #[inline]
    pub fn values(&self) -> &[V] {
        &self.data
    }

    /// Iterates `(key, &payload)` in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &V)> + '_ {
        self.keys.iter().copied().zip(self.data.iter())
    }

    /// Rank of the first entry with `key`.
    pub fn rank_of(&self, key: i64) -> Option<usize> {
        match search_sorted(&self.keys, &key) {
            Search::Found(rank) => Some(self.first_of_run(rank)),
            Search::Missing(_) => None,
        }
    }

    /// Payload of the first entry with `key`.
    pub fn get(&self, key: i64) -> Option<&V> {
        self.rank_of(key).map(|rank| &self.data[rank])
    }

    /// Mutable payload of the first entry with `key`.
    pub fn get_mut(&mut self, key: i64) -> Option<&mut V> {
        self.rank_of(key).map(move |rank| &mut self.data[rank])
    }

    /// Inserts `data` under `key` and returns the rank it occupies.
    ///
    /// With `allow_repeat == false` an existing entry keeps its rank and its
    /// payload is replaced by `data`. With `allow_repeat == true` a new entry
    /// is inserted before the existing run of `key`.
    ///
    /// # Errors
    /// [`MeshError::Allocation`] if the backing buffers cannot grow.
    pub fn insert(&mut self, key: i64, data: V, allow_repeat: bool) -> Result<usize, MeshError> {
        let rank = match search_sorted(&self.keys, &key) {
            Search::Found(rank) if !allow_repeat => {
                let rank = self.first_of_run(rank);
                self.data[rank] = data;
                return Ok(rank);
            }
            Search::Found(rank) => self.first_of_run(rank),
            Search::Missing(rank) => rank,
        };
        try_grow("ordered data list keys", &mut self.keys, 1)?;
        try_grow("ordered data list payloads", &mut self.data, 1)?;
        self.keys.insert(rank, key);
        self.data.insert(rank, data);
        crate::debug_invariants!(self.validate_invariants(), "OrderedDataList::insert");
        Ok(rank)
    }

    /// Removes the first entry with `key` and returns its payload.
    ///
    /// # Errors
    /// [`MeshError::EntryNotFound`] if `key` is absent.
    pub fn remove(&mut self, key: i64) -> Result<V, MeshError> {
        let rank = self.rank_of(key).ok_or(MeshError::EntryNotFound(key))?;
        self.keys.remove(rank);
        let payload = self.data.remove(rank);
        self.keys.shrink_to_fit();
        self.data.shrink_to_fit();
        Ok(payload)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.keys = Vec::new();
        self.data = Vec::new();
    }

    fn first_of_run(&self, mut rank: usize) -> usize {
        while rank > 0 && self.keys[rank - 1] == self.keys[rank] {
            rank -= 1;
        }
        rank
    }
}

impl<V> DebugInvariants for OrderedDataList<V> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "OrderedDataList");
    }

    fn validate_invariants(&self) -> Result<(), MeshError> {
        ensure_sorted(&self.keys, true, "ordered data list")?;
        if self.keys.len() != self.data.len() {
            return Err(MeshError::Logic(format!(
                "ordered data list has {} keys but {} payloads",
                self.keys.len(),
                self.data.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn insert_returns_rank() {
        let mut list = OrderedDataList::new();
        assert_eq!(list.insert(10, "ten", false).unwrap(), 0);
        assert_eq!(list.insert(30, "thirty", false).unwrap(), 1);
        assert_eq!(list.insert(20, "twenty", false).unwrap(), 1);
        assert_eq!(list.insert(5, "five", false).unwrap(), 0);
        assert_eq!(list.keys(), &[5, 10, 20, 30]);
        assert_eq!(list.values(), &["five", "ten", "twenty", "thirty"]);
    }

    #[test]
    fn existing_key_is_replaced() {
        let mut list = OrderedDataList::new();
        list.insert(1, 1.0, false).unwrap();
        list.insert(2, 2.0, false).unwrap();
        assert_eq!(list.insert(2, 20.0, false).unwrap(), 1);
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(2), Some(&20.0));
    }

    #[test]
    fn repeats_when_allowed() {
        let mut list = OrderedDataList::new();
        list.insert(3, 'a', true).unwrap();
        list.insert(3, 'b', true).unwrap();
        assert_eq!(list.keys(), &[3, 3]);
        assert_eq!(list.remove(3).unwrap(), 'b');
        assert_eq!(list.values(), &['a']);
    }

    #[test]
    fn remove_moves_payloads_in_lockstep() {
        let mut list = OrderedDataList::new();
        for k in [4, 1, 3, 2] {
            list.insert(k, k * 100, false).unwrap();
        }
        assert_eq!(list.remove(2).unwrap(), 200);
        assert_eq!(list.keys(), &[1, 3, 4]);
        assert_eq!(list.values(), &[100, 300, 400]);
        assert!(list.validate_invariants().is_ok());
    }

    #[test]
    fn remove_missing_is_error() {
        let mut list: OrderedDataList<u8> = OrderedDataList::new();
        assert_eq!(list.remove(9), Err(MeshError::EntryNotFound(9)));
    }

    #[test]
    fn owning_payloads_are_dropped_once() {
        let shared = Rc::new(());
        let mut list = OrderedDataList::new();
        list.insert(1, Rc::clone(&shared), false).unwrap();
        list.insert(1, Rc::clone(&shared), false).unwrap();
        assert_eq!(Rc::strong_count(&shared), 2);
        let removed = list.remove(1).unwrap();
        drop(removed);
        assert_eq!(Rc::strong_count(&shared), 1);
    }

    #[test]
    fn json_checks_keys_and_payloads() {
        let mut list = OrderedDataList::new();
        list.insert(7, "b".to_string(), false).unwrap();
        list.insert(2, "a".to_string(), false).unwrap();
        let s = serde_json::to_string(&list).unwrap();
        let back: OrderedDataList<String> = serde_json::from_str(&s).unwrap();
        assert_eq!(back, list);

        let unsorted = r#"{"keys":[7,2],"data":["b","a"]}"#;
        assert!(serde_json::from_str::<OrderedDataList<String>>(unsorted).is_err());
        let missing = r#"{"keys":[2,7],"data":["a"]}"#;
        assert!(serde_json::from_str::<OrderedDataList<String>>(missing).is_err());
    }
}
