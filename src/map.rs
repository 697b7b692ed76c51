//! `LinearHashMap` — an associative index that grows one bucket at a time.
//!
//! Classic linear hashing: a load-factor threshold triggers the split of a
//! single bucket per insertion, so rehash cost is amortized across
//! operations instead of being paid in one stop-the-world resize. A pair of
//! bit masks one bit apart decides, per lookup, whether a key's bucket has
//! already split in the current doubling round.
//!
//! Key properties:
//! - **Incremental growth**: every split moves at most one bucket's chain;
//!   the table is never rehashed wholesale.
//! - **Bounded occupancy**: after any insert the global load factor stays
//!   within one insertion of the utilization threshold.
//! - **Duplicate-safe chains**: hole reuse during insertion purges stale
//!   copies deeper in the chain, so a key never occupies two live slots.
//! - **Silent not-found**: absent keys on lookup and removal are a normal
//!   outcome, not an error.

use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};
use core::mem;
use std::collections::hash_map::RandomState;

use crate::bucket::{Entry, Node, Removal, NODE_CAPACITY};

/// Occupancy ratio (live entries over total slot capacity) above which an
/// insertion triggers a bucket split.
pub const UTILIZATION_FACTOR: f64 = 0.75;

/// A hash map that grows by splitting one bucket at a time.
///
/// Each bucket is a chain of fixed-capacity nodes ([`NODE_CAPACITY`] slots
/// per node); collisions overflow into lazily allocated tail nodes rather
/// than forcing growth. The structure has a single logical owner: all
/// mutation goes through `&mut self`, and there is no internal locking.
///
/// # Example
///
/// ```rust
/// use linhash::LinearHashMap;
///
/// let mut index = LinearHashMap::new();
/// index.insert("alpha", 1);
/// index.insert("beta", 2);
///
/// assert_eq!(index.get(&"alpha"), Some(&1));
/// assert_eq!(index.insert("alpha", 10), Some(1));
/// assert_eq!(index.len(), 2);
///
/// assert_eq!(index.remove(&"beta"), Some(2));
/// assert_eq!(index.get(&"beta"), None);
/// ```
#[derive(Clone)]
pub struct LinearHashMap<K, V, S = RandomState> {
    /// Chain heads, addressed by bucket index. Grows only by appending;
    /// every index always resolves to a node, possibly empty.
    buckets: Vec<Node<K, V>>,
    /// Live entries across all chains.
    len: usize,
    /// Linked nodes across all chains, heads included.
    node_count: usize,
    /// Next bucket scheduled to split in the current doubling round.
    split_index: u64,
    /// Addressing mask for buckets not yet split this round.
    mask_low: u64,
    /// Addressing mask for buckets already split this round;
    /// `mask_high == 2 * mask_low + 1`.
    mask_high: u64,
    hash_builder: S,
}

/// Computes the bucket index for `hash` under the given addressing state.
///
/// Buckets below the split cursor have already split this round and need
/// one extra hash bit to tell old entries from migrated ones; buckets at or
/// above it still use the narrow mask.
fn bucket_for(hash: u64, mask_low: u64, mask_high: u64, split_index: u64) -> usize {
    let low = hash & mask_low;
    if low >= split_index {
        low as usize
    } else {
        (hash & mask_high) as usize
    }
}

impl<K, V> LinearHashMap<K, V, RandomState>
where
    K: Eq + Hash,
{
    /// Creates an empty map with two head buckets and the default hasher.
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }
}

impl<K, V, S> LinearHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Creates an empty map using `hash_builder` to hash keys.
    ///
    /// Useful for deterministic tests and for callers that bring their own
    /// hash function.
    pub fn with_hasher(hash_builder: S) -> Self {
        let mut buckets = Vec::with_capacity(16);
        buckets.push(Node::empty());
        buckets.push(Node::empty());
        Self {
            buckets,
            len: 0,
            node_count: 2,
            split_index: 0,
            mask_low: 1,
            mask_high: 3,
            hash_builder,
        }
    }

    /// Returns the number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of head buckets.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the total slot capacity across all nodes, overflow included.
    #[inline]
    pub fn capacity(&self) -> usize {
        NODE_CAPACITY * self.node_count
    }

    /// Returns the current load factor: live entries over total capacity.
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// Returns a reference to the map's hasher.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    fn hash_of(&self, key: &K) -> u64 {
        let mut hasher = self.hash_builder.build_hasher();
        key.hash(&mut hasher);
        hasher.finish()
    }

    fn bucket_of(&self, hash: u64) -> usize {
        bucket_for(hash, self.mask_low, self.mask_high, self.split_index)
    }

    fn apply_node_delta(&mut self, delta: isize) {
        debug_assert!(delta >= -(self.node_count as isize));
        self.node_count = self.node_count.wrapping_add_signed(delta);
    }

    /// Returns a reference to the value mapped to `key`, or `None`.
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = self.hash_of(key);
        self.buckets[self.bucket_of(hash)].get(hash, key)
    }

    /// Returns an exclusive reference to the value mapped to `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = self.hash_of(key);
        let idx = self.bucket_of(hash);
        self.buckets[idx].get_mut(hash, key)
    }

    /// Returns `true` if the map holds an entry for `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Inserts a key/value pair, returning the previous value if the key
    /// was already present.
    ///
    /// At most one bucket split follows the insertion, triggered when the
    /// load factor crosses [`UTILIZATION_FACTOR`].
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_of(&key);
        let idx = self.bucket_of(hash);
        let (displaced, delta) = self.buckets[idx].upsert(Entry { hash, key, value });
        self.apply_node_delta(delta);
        if displaced.is_none() {
            self.len += 1;
        }
        if self.load_factor() > UTILIZATION_FACTOR {
            self.split();
        }
        displaced
    }

    /// Removes `key` from the map, returning its value if it was present.
    ///
    /// Removing an absent key is a silent no-op. An overflow node emptied
    /// by the removal is unlinked from its chain; an emptied head is
    /// replaced by its successor, or retained empty when it is the sole
    /// node of its bucket.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let hash = self.hash_of(key);
        let idx = self.bucket_of(hash);
        if let Some(Removal { value, emptied }) = self.buckets[idx].take_local(hash, key) {
            if emptied {
                if let Some(next) = self.buckets[idx].next.take() {
                    self.buckets[idx] = *next;
                    self.node_count -= 1;
                }
            }
            self.len -= 1;
            return Some(value);
        }
        let (removed, delta) = Node::remove_from(&mut self.buckets[idx].next, hash, key);
        if removed.is_some() {
            self.len -= 1;
        }
        self.apply_node_delta(delta);
        removed
    }

    /// Removes every entry and resets the table to its freshly constructed
    /// two-bucket state. The hasher is kept.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.buckets.push(Node::empty());
        self.buckets.push(Node::empty());
        self.len = 0;
        self.node_count = 2;
        self.split_index = 0;
        self.mask_low = 1;
        self.mask_high = 3;
    }

    /// Splits the bucket at the split cursor, growing the table by exactly
    /// one head bucket. Never rehashes more than that single chain.
    fn split(&mut self) {
        let split_at = self.split_index as usize;
        self.buckets.push(Node::empty());
        self.node_count += 1;
        self.split_index += 1;
        if 2 * self.split_index == self.buckets.len() as u64 {
            // Every bucket this round started with has now split; slide
            // the mask window and start the next doubling round.
            self.split_index = 0;
            self.mask_low = self.mask_high;
            self.mask_high = self.mask_high * 2 + 1;
        }
        let (mask_low, mask_high, split_index) = (self.mask_low, self.mask_high, self.split_index);
        let target = self.buckets.len() - 1;

        #[cfg(feature = "tracing")]
        tracing::trace!(
            bucket = split_at,
            new_bucket = target,
            entries = self.len,
            nodes = self.node_count,
            "splitting bucket"
        );

        // Detach the chain being split so its entries can be reclassified
        // while the new tail bucket is inserted into. Entries are rehomed
        // under the *updated* addressing state.
        let detached = mem::replace(&mut self.buckets[split_at], Node::empty());
        let mut cursor = Some(Box::new(detached));
        let mut kept: Vec<Box<Node<K, V>>> = Vec::new();
        let mut dropped = 0usize;
        while let Some(mut node) = cursor {
            cursor = node.next.take();
            let mut occupied = false;
            for slot in &mut node.slots {
                let stays = slot.as_ref().map_or(true, |e| {
                    bucket_for(e.hash, mask_low, mask_high, split_index) == split_at
                });
                if stays {
                    occupied |= slot.is_some();
                } else if let Some(entry) = slot.take() {
                    debug_assert_eq!(
                        bucket_for(entry.hash, mask_low, mask_high, split_index),
                        target
                    );
                    let (_, delta) = self.buckets[target].upsert(entry);
                    self.apply_node_delta(delta);
                }
            }
            if occupied {
                kept.push(node);
            } else {
                dropped += 1;
            }
        }
        // Relink the surviving nodes in their original order. If none
        // survived, the placeholder stays on as the bucket's sole (empty)
        // head, standing in for one of the dropped nodes.
        let mut rebuilt: Option<Box<Node<K, V>>> = None;
        for mut node in kept.into_iter().rev() {
            node.next = rebuilt;
            rebuilt = Some(node);
        }
        if let Some(head) = rebuilt {
            self.buckets[split_at] = *head;
        } else if dropped > 0 {
            dropped -= 1;
        }
        self.node_count -= dropped;
    }

    /// Recounts entries and nodes by walking every chain and compares the
    /// result against the cached counters, also checking that no key
    /// occupies more than one live slot.
    ///
    /// # Panics
    ///
    /// Panics on any disagreement: that is an internal-consistency
    /// violation, meaning the addressing/split/prune machinery is broken
    /// and further mutation would be untrustworthy. This is a diagnostic
    /// aid for tests and debugging, not a steady-state code path.
    pub fn validate(&self) {
        let mut nodes = 0;
        let mut entries = 0;
        for head in &self.buckets {
            let mut node = Some(head);
            while let Some(current) = node {
                nodes += 1;
                entries += current.slots.iter().flatten().count();
                node = current.next.as_deref();
            }
        }
        assert_eq!(
            nodes, self.node_count,
            "corrupt table: cached node count disagrees with a full walk"
        );
        assert_eq!(
            entries, self.len,
            "corrupt table: cached entry count disagrees with a full walk"
        );
        let mut seen = std::collections::HashSet::with_capacity(self.len);
        for (key, _) in self.iter() {
            assert!(
                seen.insert(key),
                "corrupt table: a key occupies more than one live slot"
            );
        }
    }

    /// Visits every entry in arbitrary order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            node: None,
            slot: 0,
            remaining: self.len,
        }
    }

    /// Visits every key in arbitrary order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    /// Visits every value in arbitrary order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }
}

impl<K, V, S> Default for LinearHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> fmt::Debug for LinearHashMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearHashMap")
            .field("len", &self.len)
            .field("node_count", &self.node_count)
            .field("split_index", &self.split_index)
            .field("mask_low", &self.mask_low)
            .field("mask_high", &self.mask_high)
            .field("buckets", &BucketsFmt(&self.buckets))
            .finish()
    }
}

struct BucketsFmt<'a, K, V>(&'a [Node<K, V>]);

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BucketsFmt<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter().map(ChainFmt)).finish()
    }
}

struct ChainFmt<'a, K, V>(&'a Node<K, V>);

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ChainFmt<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chain = f.debug_list();
        let mut node = Some(self.0);
        while let Some(current) = node {
            chain.entry(&NodeFmt(current));
            node = current.next.as_deref();
        }
        chain.finish()
    }
}

struct NodeFmt<'a, K, V>(&'a Node<K, V>);

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for NodeFmt<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.slots.iter().flatten().map(|e| (&e.key, &e.value)))
            .finish()
    }
}

/// Borrowing iterator over a map's entries, in arbitrary order.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Node<K, V>>,
    node: Option<&'a Node<K, V>>,
    slot: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.node {
                Some(node) => {
                    while self.slot < NODE_CAPACITY {
                        let idx = self.slot;
                        self.slot += 1;
                        if let Some(entry) = node.slots[idx].as_ref() {
                            self.remaining -= 1;
                            return Some((&entry.key, &entry.value));
                        }
                    }
                    self.node = node.next.as_deref();
                    self.slot = 0;
                }
                None => {
                    self.node = Some(self.buckets.next()?);
                    self.slot = 0;
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Borrowing iterator over a map's keys.
pub struct Keys<'a, K, V>(Iter<'a, K, V>);

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// Borrowing iterator over a map's values.
pub struct Values<'a, K, V>(Iter<'a, K, V>);

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// Consuming iterator over a map's entries, in arbitrary order.
pub struct IntoIter<K, V> {
    buckets: std::vec::IntoIter<Node<K, V>>,
    node: Option<Node<K, V>>,
    slot: usize,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.node.as_mut() {
                Some(node) => {
                    while self.slot < NODE_CAPACITY {
                        let idx = self.slot;
                        self.slot += 1;
                        if let Some(entry) = node.slots[idx].take() {
                            self.remaining -= 1;
                            return Some((entry.key, entry.value));
                        }
                    }
                    let next = node.next.take().map(|boxed| *boxed);
                    self.node = next;
                    self.slot = 0;
                }
                None => {
                    self.node = Some(self.buckets.next()?);
                    self.slot = 0;
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V, S> IntoIterator for LinearHashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            remaining: self.len,
            buckets: self.buckets.into_iter(),
            node: None,
            slot: 0,
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a LinearHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> FromIterator<(K, V)> for LinearHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for LinearHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, S> PartialEq for LinearHashMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K, V, S> Eq for LinearHashMap<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::hash::BuildHasherDefault;

    /// Hashes a key to itself, making bucket placement deterministic.
    #[derive(Default)]
    struct IdentityHasher(u64);

    impl Hasher for IdentityHasher {
        fn finish(&self) -> u64 {
            self.0
        }

        fn write(&mut self, bytes: &[u8]) {
            for &byte in bytes {
                self.0 = (self.0 << 8) | u64::from(byte);
            }
        }

        fn write_u64(&mut self, n: u64) {
            self.0 = n;
        }
    }

    type IdentityState = BuildHasherDefault<IdentityHasher>;

    fn identity_map() -> LinearHashMap<u64, String, IdentityState> {
        LinearHashMap::with_hasher(IdentityState::default())
    }

    fn value_for(key: u64) -> String {
        format!("hello{key}")
    }

    #[test]
    fn construction_state() {
        let map = identity_map();
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
        assert_eq!(map.bucket_count(), 2);
        assert_eq!(map.capacity(), 2 * NODE_CAPACITY);
        map.validate();
    }

    #[test]
    fn even_keys_fill_bucket_zero_without_overflow() {
        let mut map = identity_map();
        for key in (0..2 * NODE_CAPACITY as u64).step_by(2) {
            map.insert(key, value_for(key));
        }
        // 64 even keys fit exactly in bucket 0's head node.
        assert_eq!(map.len(), NODE_CAPACITY);
        assert_eq!(map.bucket_count(), 2);
        assert_eq!(map.node_count, 2);
        for key in (0..2 * NODE_CAPACITY as u64).step_by(2) {
            assert_eq!(map.get(&key), Some(&value_for(key)));
        }
        map.validate();
    }

    #[test]
    fn overfilling_one_bucket_chains_an_overflow_node() {
        let mut map = identity_map();
        for key in (0..4 * NODE_CAPACITY as u64).step_by(2) {
            map.insert(key, value_for(key));
        }
        // 128 even keys: bucket 0 holds two full nodes, no split yet
        // (load factor 128 / 192 is under the threshold).
        assert_eq!(map.len(), 2 * NODE_CAPACITY);
        assert_eq!(map.bucket_count(), 2);
        assert_eq!(map.node_count, 3);
        for key in (0..4 * NODE_CAPACITY as u64).step_by(2) {
            assert_eq!(map.get(&key), Some(&value_for(key)));
        }
        map.validate();
    }

    #[test]
    fn crossing_the_threshold_splits_exactly_one_bucket() {
        let mut map = identity_map();
        // 96 entries bring the load factor to exactly 0.75; no split yet.
        for key in 0..96 {
            map.insert(key, value_for(key));
        }
        assert_eq!(map.bucket_count(), 2);
        // The 97th crosses the threshold and splits bucket 0: even keys
        // with hash & 3 == 2 migrate to the new bucket 2.
        map.insert(96, value_for(96));
        assert_eq!(map.bucket_count(), 3);
        assert_eq!(map.len(), 97);
        assert!(map.load_factor() <= UTILIZATION_FACTOR);
        for key in 0..=96 {
            assert_eq!(map.get(&key), Some(&value_for(key)));
        }
        map.validate();
    }

    #[test]
    fn sequential_fill_through_multiple_rounds() {
        let mut map = identity_map();
        for key in 0..1024 {
            map.insert(key, value_for(key));
            assert!(
                map.len() as f64 <= UTILIZATION_FACTOR * map.capacity() as f64 + 1.0,
                "load factor out of bounds after inserting {key}"
            );
        }
        assert!(map.bucket_count() > 2);
        for key in 0..1024 {
            assert_eq!(map.get(&key), Some(&value_for(key)));
        }
        map.validate();
    }

    #[test]
    fn update_keeps_len_and_returns_old_value() {
        let mut map = identity_map();
        assert_eq!(map.insert(7, value_for(7)), None);
        assert_eq!(map.insert(7, "other".to_owned()), Some(value_for(7)));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&7).map(String::as_str), Some("other"));
        map.validate();
    }

    #[test]
    fn removing_the_last_overflow_entry_prunes_the_node() {
        let mut map = identity_map();
        // Fill bucket 0's head, then push one entry into an overflow node.
        for key in (0..2 * NODE_CAPACITY as u64).step_by(2) {
            map.insert(key, value_for(key));
        }
        let spill = 2 * NODE_CAPACITY as u64;
        map.insert(spill, value_for(spill));
        assert_eq!(map.node_count, 3);

        assert_eq!(map.remove(&spill), Some(value_for(spill)));
        assert_eq!(map.node_count, 2);
        map.validate();
    }

    #[test]
    fn emptied_sole_head_is_retained() {
        let mut map = identity_map();
        map.insert(2, value_for(2));
        assert_eq!(map.remove(&2), Some(value_for(2)));
        assert_eq!(map.node_count, 2);
        assert_eq!(map.len(), 0);
        // The retained empty head still accepts entries.
        map.insert(4, value_for(4));
        assert_eq!(map.get(&4), Some(&value_for(4)));
        map.validate();
    }

    #[test]
    fn emptied_head_with_overflow_is_replaced_by_its_successor() {
        let mut map = identity_map();
        for key in (0..2 * NODE_CAPACITY as u64).step_by(2) {
            map.insert(key, value_for(key));
        }
        let spill = 2 * NODE_CAPACITY as u64;
        map.insert(spill, value_for(spill));
        assert_eq!(map.node_count, 3);
        // Drain the head node completely; the overflow node must take
        // its place as the bucket head.
        for key in (0..2 * NODE_CAPACITY as u64).step_by(2) {
            assert_eq!(map.remove(&key), Some(value_for(key)));
        }
        assert_eq!(map.node_count, 2);
        assert_eq!(map.get(&spill), Some(&value_for(spill)));
        map.validate();
    }

    #[test]
    fn hole_reuse_purges_stale_chain_copy() {
        let mut map = identity_map();
        for key in (0..2 * NODE_CAPACITY as u64).step_by(2) {
            map.insert(key, value_for(key));
        }
        let spill = 2 * NODE_CAPACITY as u64;
        map.insert(spill, "stale".to_owned());
        assert_eq!(map.node_count, 3);

        // Open a hole in the head, then re-insert the overflow key: the
        // hole is reused, the stale copy deeper in the chain is purged,
        // and the insert reports an update, not an addition.
        map.remove(&0);
        let before = map.len();
        assert_eq!(map.insert(spill, "fresh".to_owned()).as_deref(), Some("stale"));
        assert_eq!(map.len(), before);
        assert_eq!(map.node_count, 2);
        assert_eq!(map.get(&spill).map(String::as_str), Some("fresh"));
        map.validate();
    }

    #[test]
    fn removing_absent_keys_changes_nothing() {
        let mut map = identity_map();
        for key in 0..10 {
            map.insert(key, value_for(key));
        }
        assert_eq!(map.remove(&999), None);
        assert_eq!(map.len(), 10);
        for key in 0..10 {
            assert_eq!(map.get(&key), Some(&value_for(key)));
        }
        map.validate();
    }

    #[test]
    fn split_redistributes_only_the_split_bucket() {
        let mut map = identity_map();
        for key in 0..97 {
            map.insert(key, value_for(key));
        }
        // Bucket 0 split: even keys now spread over buckets 0 and 2 by
        // their second hash bit; odd keys were untouched.
        assert_eq!(map.bucket_count(), 3);
        for key in (0..97u64).step_by(2) {
            let expected = if key & 3 == 0 { 0 } else { 2 };
            assert_eq!(map.bucket_of(key), expected);
        }
        for key in (1..97u64).step_by(2) {
            assert_eq!(map.bucket_of(key), 1);
        }
        map.validate();
    }

    #[test]
    fn clear_resets_to_constructed_state() {
        let mut map = identity_map();
        for key in 0..500 {
            map.insert(key, value_for(key));
        }
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.bucket_count(), 2);
        assert_eq!(map.capacity(), 2 * NODE_CAPACITY);
        assert_eq!(map.get(&1), None);
        map.insert(1, value_for(1));
        assert_eq!(map.get(&1), Some(&value_for(1)));
        map.validate();
    }

    #[test]
    fn iterators_visit_every_entry_once() {
        let mut map = identity_map();
        for key in 0..300 {
            map.insert(key, value_for(key));
        }
        let mut keys: Vec<u64> = map.keys().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..300).collect::<Vec<_>>());
        assert_eq!(map.iter().len(), 300);
        assert_eq!(map.values().count(), 300);

        let mut owned: Vec<(u64, String)> = map.into_iter().collect();
        owned.sort_unstable_by_key(|(key, _)| *key);
        assert_eq!(owned.len(), 300);
        assert!(owned.iter().all(|(key, value)| *value == value_for(*key)));
    }

    #[test]
    fn from_iterator_round_trips() {
        let map: LinearHashMap<u64, String, IdentityState> =
            (0..100).map(|key| (key, value_for(key))).collect();
        assert_eq!(map.len(), 100);
        for key in 0..100 {
            assert_eq!(map.get(&key), Some(&value_for(key)));
        }
        map.validate();
    }

    #[test]
    fn debug_output_carries_the_counters() {
        let mut map = identity_map();
        map.insert(3, value_for(3));
        let dump = format!("{map:?}");
        assert!(dump.contains("len: 1"));
        assert!(dump.contains("node_count: 2"));
        assert!(dump.contains("split_index: 0"));
    }

    #[test]
    fn default_hasher_smoke() {
        let mut map = LinearHashMap::new();
        for key in 0..1000u32 {
            map.insert(key, key * 2);
        }
        for key in 0..1000u32 {
            assert_eq!(map.get(&key), Some(&(key * 2)));
        }
        assert_eq!(map.len(), 1000);
        map.validate();
    }
}
