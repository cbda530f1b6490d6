//! SymTable: string-keyed table with separate chaining over a slot arena.

use crate::binding::{copy_key, Binding};
use crate::hash::bucket_index;
use crate::tiers::{TierError, Tiers};
use core::fmt;
use core::iter::FusedIterator;
use log::{debug, trace, warn};
use slotmap::{DefaultKey, SlotMap};
use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PutError {
    #[error("key is already present")]
    DuplicateKey,
    #[error("could not allocate the key copy: {0}")]
    OutOfMemory(#[from] TryReserveError),
}

/// A mutable map from string keys to values of type `V`.
///
/// Bindings live in a `SlotMap` arena; each bucket holds the arena key of
/// the first binding in its chain and each binding links to the next. The
/// bucket count follows the table's [`Tiers`], advancing one tier whenever
/// a `put` finds the table as full as its bucket count.
pub struct SymTable<V> {
    slots: SlotMap<DefaultKey, Binding<V>>,
    buckets: Vec<Option<DefaultKey>>,
    tier: usize,
    tiers: Tiers,
}

impl<V> SymTable<V> {
    pub fn new() -> Self {
        let tiers = Tiers::default();
        let buckets = vec![None; tiers.capacity(0)];
        Self::from_parts(tiers, buckets)
    }

    /// An empty table at the first tier of `tiers`.
    ///
    /// Fails if the first tier's bucket array cannot be allocated.
    pub fn with_tiers(tiers: Tiers) -> Result<Self, TierError> {
        let capacity = tiers.capacity(0);
        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(capacity)
            .map_err(|source| TierError::Alloc { capacity, source })?;
        buckets.resize(capacity, None);
        Ok(Self::from_parts(tiers, buckets))
    }

    fn from_parts(tiers: Tiers, buckets: Vec<Option<DefaultKey>>) -> Self {
        Self {
            slots: SlotMap::with_key(),
            buckets,
            tier: 0,
            tiers,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Index of the current bucket count within [`SymTable::tiers`].
    pub fn tier(&self) -> usize {
        self.tier
    }

    pub fn tiers(&self) -> &Tiers {
        &self.tiers
    }

    fn locate(&self, key: &str) -> Option<DefaultKey> {
        let mut cur = self.buckets[bucket_index(key, self.buckets.len())];
        while let Some(k) = cur {
            let binding = &self.slots[k];
            if &*binding.key == key {
                return Some(k);
            }
            cur = binding.next;
        }
        None
    }

    /// Insert `key -> value`, copying the key.
    ///
    /// Fails without touching the table if the key is already bound or
    /// its copy cannot be allocated. May grow the bucket array first.
    /// The binding's arena slot is allocated infallibly and aborts on OOM.
    pub fn put(&mut self, key: &str, value: V) -> Result<(), PutError> {
        self.put_with(key, value, copy_key)
    }

    // `copy` makes the table's own key; the whole put fails if it does.
    fn put_with<F>(&mut self, key: &str, value: V, copy: F) -> Result<(), PutError>
    where
        F: FnOnce(&str) -> Result<Box<str>, TryReserveError>,
    {
        if self.locate(key).is_some() {
            return Err(PutError::DuplicateKey);
        }
        let key = copy(key)?;

        self.grow_if_full();

        let index = bucket_index(&key, self.buckets.len());
        let next = self.buckets[index];
        let k = self.slots.insert(Binding { key, value, next });
        self.buckets[index] = Some(k);
        Ok(())
    }

    fn grow_if_full(&mut self) {
        let count = self.slots.len();
        if self.tiers.should_grow(count, self.tier) {
            self.grow();
        } else if count == self.tiers.capacity(self.tier) {
            trace!(
                "symtable at maximum tier ({} buckets); chains will lengthen",
                self.buckets.len()
            );
        }
    }

    /// Move every binding into a bucket array sized to the next tier.
    ///
    /// If the new array cannot be allocated the table keeps its current
    /// array and tier. Once it is allocated, relinking cannot fail.
    fn grow(&mut self) {
        let Some(next_tier) = self.tiers.next(self.tier) else {
            return;
        };
        let new_count = self.tiers.capacity(next_tier);

        let mut buckets: Vec<Option<DefaultKey>> = Vec::new();
        if let Err(err) = buckets.try_reserve_exact(new_count) {
            warn!(
                "symtable growth to {} buckets failed, staying at {}: {}",
                new_count,
                self.buckets.len(),
                err
            );
            return;
        }
        buckets.resize(new_count, None);

        for head in self.buckets.iter_mut() {
            let mut cur = head.take();
            while let Some(k) = cur {
                let binding = &mut self.slots[k];
                cur = binding.next;
                let index = bucket_index(&binding.key, new_count);
                binding.next = buckets[index];
                buckets[index] = Some(k);
            }
        }

        debug!(
            "symtable grew from {} to {} buckets with {} entries",
            self.buckets.len(),
            new_count,
            self.slots.len()
        );
        self.buckets = buckets;
        self.tier = next_tier;
    }

    /// Swap in `value` for an existing key and hand back the old value.
    /// Returns `None` and leaves the table alone if the key is absent.
    pub fn replace(&mut self, key: &str, value: V) -> Option<V> {
        let k = self.locate(key)?;
        Some(core::mem::replace(&mut self.slots[k].value, value))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.locate(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let k = self.locate(key)?;
        self.slots.get(k).map(|b| &b.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let k = self.locate(key)?;
        self.slots.get_mut(k).map(|b| &mut b.value)
    }

    /// Unlink and drop the binding for `key`, returning its value.
    ///
    /// The bucket array never shrinks.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let index = bucket_index(key, self.buckets.len());

        let mut prev: Option<DefaultKey> = None;
        let mut cur = self.buckets[index];
        while let Some(k) = cur {
            if &*self.slots[k].key == key {
                break;
            }
            prev = Some(k);
            cur = self.slots[k].next;
        }
        let k = cur?;

        let next = self.slots[k].next;
        match prev {
            None => self.buckets[index] = next,
            Some(p) => self.slots[p].next = next,
        }
        self.slots.remove(k).map(|b| b.value)
    }

    /// Call `apply(key, value, extra)` once for every binding, in bucket
    /// order and then chain order.
    ///
    /// `apply` may read the table; it cannot mutate it.
    pub fn map<C, F>(&self, mut apply: F, extra: &mut C)
    where
        C: ?Sized,
        F: FnMut(&str, &V, &mut C),
    {
        for (key, value) in self.iter() {
            apply(key, value, &mut *extra);
        }
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            buckets: self.buckets.iter(),
            slots: &self.slots,
            cursor: None,
            remaining: self.slots.len(),
        }
    }

    /// Panics unless every binding sits in the bucket its key hashes to,
    /// every arena slot is reachable from exactly one chain, and no two
    /// bindings share a key.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        use std::collections::HashSet;

        let mut seen_slots = HashSet::new();
        let mut seen_keys = HashSet::new();
        for (index, head) in self.buckets.iter().enumerate() {
            let mut cur = *head;
            while let Some(k) = cur {
                let binding = self.slots.get(k).expect("chain links a live slot");
                assert_eq!(
                    bucket_index(&binding.key, self.buckets.len()),
                    index,
                    "binding {:?} is in the wrong bucket",
                    binding.key
                );
                assert!(seen_slots.insert(k), "slot linked twice");
                assert!(seen_keys.insert(binding.key.clone()), "duplicate key");
                cur = binding.next;
            }
        }
        assert_eq!(seen_slots.len(), self.slots.len(), "unreachable bindings");
        assert_eq!(self.buckets.len(), self.tiers.capacity(self.tier));
    }
}

impl<V> Default for SymTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for SymTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over `(key, value)` pairs, in bucket order then chain order.
pub struct Iter<'a, V> {
    buckets: core::slice::Iter<'a, Option<DefaultKey>>,
    slots: &'a SlotMap<DefaultKey, Binding<V>>,
    cursor: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(k) = self.cursor {
                let slots = self.slots;
                let binding = &slots[k];
                self.cursor = binding.next;
                self.remaining -= 1;
                return Some((&*binding.key, &binding.value));
            }
            self.cursor = *self.buckets.next()?;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

impl<'a, V> IntoIterator for &'a SymTable<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
