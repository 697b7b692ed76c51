//! `LinearHashSet` — set membership on top of the linear-hashing map.
//!
//! A thin wrapper over [`LinearHashMap<K, ()>`]; it inherits the map's
//! incremental, one-bucket-at-a-time growth.

use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

use crate::map::{Keys, LinearHashMap};

/// A hash set that grows by splitting one bucket at a time.
///
/// # Example
///
/// ```rust
/// use linhash::LinearHashSet;
///
/// let mut set = LinearHashSet::new();
/// assert!(set.insert("a"));
/// assert!(!set.insert("a"));
/// assert!(set.contains(&"a"));
/// assert!(set.remove(&"a"));
/// assert!(set.is_empty());
/// ```
#[derive(Clone)]
pub struct LinearHashSet<K, S = RandomState> {
    inner: LinearHashMap<K, (), S>,
}

impl<K> LinearHashSet<K, RandomState>
where
    K: Eq + Hash,
{
    /// Creates an empty set with the default hasher.
    pub fn new() -> Self {
        Self {
            inner: LinearHashMap::new(),
        }
    }
}

impl<K, S> LinearHashSet<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Creates an empty set using `hash_builder` to hash values.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            inner: LinearHashMap::with_hasher(hash_builder),
        }
    }

    /// Returns the number of values in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the set holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Inserts a value. Returns `true` if it was not already present.
    pub fn insert(&mut self, value: K) -> bool {
        self.inner.insert(value, ()).is_none()
    }

    /// Removes a value. Returns `true` if it was present.
    pub fn remove(&mut self, value: &K) -> bool {
        self.inner.remove(value).is_some()
    }

    /// Returns `true` if the set contains `value`.
    pub fn contains(&self, value: &K) -> bool {
        self.inner.contains_key(value)
    }

    /// Removes every value, resetting the set to its constructed state.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Visits every value in arbitrary order.
    pub fn iter(&self) -> Keys<'_, K, ()> {
        self.inner.keys()
    }
}

impl<K, S> Default for LinearHashSet<K, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, S> fmt::Debug for LinearHashSet<K, S>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearHashSet")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<K, S> FromIterator<K> for LinearHashSet<K, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        let mut set = Self::with_hasher(S::default());
        set.extend(iter);
        set
    }
}

impl<K, S> Extend<K> for LinearHashSet<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = K>>(&mut self, iter: T) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<K, S> PartialEq for LinearHashSet<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|value| other.contains(value))
    }
}

impl<K, S> Eq for LinearHashSet<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
}

impl<'a, K, S> IntoIterator for &'a LinearHashSet<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = &'a K;
    type IntoIter = Keys<'a, K, ()>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
