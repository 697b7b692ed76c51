//! Bucket nodes and the overflow-chain protocol.
//!
//! A bucket is a singly linked chain of fixed-capacity nodes. The head node
//! is addressed directly by the table's bucket index; successors are
//! overflow nodes allocated lazily when a chain fills up. Every link is an
//! owning `Option<Box<Node>>`, so unlinking a node can never leave a
//! dangling successor.

use core::mem;

/// Number of entry slots in a single bucket node.
pub const NODE_CAPACITY: usize = 64;

// The table's addressing masks assume power-of-two growth.
const _: () = assert!(NODE_CAPACITY.is_power_of_two());

/// A live key/value pair together with the key's cached 64-bit hash.
///
/// Caching the hash lets lookups short-circuit on hash inequality and lets
/// splits reclassify entries without re-invoking the hasher.
#[derive(Clone)]
pub(crate) struct Entry<K, V> {
    pub(crate) hash: u64,
    pub(crate) key: K,
    pub(crate) value: V,
}

/// Outcome of clearing a matching slot within a single node.
pub(crate) struct Removal<V> {
    /// The value that occupied the cleared slot.
    pub(crate) value: V,
    /// `true` when no other live slot remains in the node, making it
    /// eligible for pruning.
    pub(crate) emptied: bool,
}

/// One fixed-capacity node in a bucket chain.
///
/// A slot is either a hole (`None`) or holds exactly one entry. Within a
/// node no two live slots hold equal keys; the chain protocol below keeps
/// that true across the whole chain as well.
#[derive(Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) slots: [Option<Entry<K, V>>; NODE_CAPACITY],
    pub(crate) next: Option<Box<Node<K, V>>>,
}

impl<K, V> Node<K, V> {
    /// Creates a node with every slot empty and no successor.
    pub(crate) fn empty() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
            next: None,
        }
    }

    /// Allocates a fresh overflow node holding a single entry.
    fn boxed(entry: Entry<K, V>) -> Box<Self> {
        let mut node = Self::empty();
        node.slots[0] = Some(entry);
        Box::new(node)
    }
}

impl<K: Eq, V> Node<K, V> {
    /// Scans the chain for `key`, skipping holes, and returns the first
    /// match's value.
    pub(crate) fn get(&self, hash: u64, key: &K) -> Option<&V> {
        for entry in self.slots.iter().flatten() {
            if entry.hash == hash && entry.key == *key {
                return Some(&entry.value);
            }
        }
        self.next.as_deref()?.get(hash, key)
    }

    /// Like [`Node::get`], but yields an exclusive reference.
    pub(crate) fn get_mut(&mut self, hash: u64, key: &K) -> Option<&mut V> {
        for entry in self.slots.iter_mut().flatten() {
            if entry.hash == hash && entry.key == *key {
                return Some(&mut entry.value);
            }
        }
        self.next.as_deref_mut()?.get_mut(hash, key)
    }

    /// Inserts or updates `entry` somewhere in this chain.
    ///
    /// Returns the displaced value (`Some` for an update, `None` for a
    /// genuine addition) and the chain's node-count delta.
    ///
    /// A matching key in a node is overwritten in place. Otherwise the
    /// first hole in the node is reused; because a stale copy of the key
    /// may still live deeper in the chain (holes come from removals, and
    /// slot selection is local to one node), the remainder of the chain is
    /// then purged of the key. Only when a node has neither a match nor a
    /// hole does the entry descend to the successor, allocating a tail
    /// node if the chain is exhausted.
    pub(crate) fn upsert(&mut self, entry: Entry<K, V>) -> (Option<V>, isize) {
        let mut hole = None;
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            match slot {
                Some(occupant) if occupant.hash == entry.hash && occupant.key == entry.key => {
                    return (Some(mem::replace(&mut occupant.value, entry.value)), 0);
                }
                None if hole.is_none() => hole = Some(idx),
                _ => {}
            }
        }
        if let Some(idx) = hole {
            let written = self.slots[idx].insert(entry);
            return Self::remove_from(&mut self.next, written.hash, &written.key);
        }
        if let Some(next) = self.next.as_deref_mut() {
            return next.upsert(entry);
        }
        self.next = Some(Self::boxed(entry));
        (None, 1)
    }

    /// Clears the slot holding `key` in this node, if any.
    ///
    /// Touches only this node; the caller decides whether an emptied node
    /// is pruned (overflow nodes are, a sole head is retained).
    pub(crate) fn take_local(&mut self, hash: u64, key: &K) -> Option<Removal<V>> {
        let mut hit = None;
        let mut emptied = true;
        for slot in &mut self.slots {
            let matched = hit.is_none()
                && slot
                    .as_ref()
                    .map_or(false, |e| e.hash == hash && e.key == *key);
            if matched {
                hit = slot.take().map(|e| e.value);
            } else if slot.is_some() {
                emptied = false;
            }
        }
        hit.map(|value| Removal { value, emptied })
    }

    /// Removes `key` from the chain hanging off `link`.
    ///
    /// A node emptied by the removal is spliced out of the chain, its
    /// predecessor's link re-pointed at its successor. Returns the removed
    /// value (`None` if the chain never held the key, which is a silent
    /// no-op) and the chain's node-count delta.
    pub(crate) fn remove_from(link: &mut Option<Box<Self>>, hash: u64, key: &K) -> (Option<V>, isize) {
        let Some(mut node) = link.take() else {
            return (None, 0);
        };
        match node.take_local(hash, key) {
            Some(Removal { value, emptied: true }) => {
                *link = node.next.take();
                (Some(value), -1)
            }
            Some(Removal { value, emptied: false }) => {
                *link = Some(node);
                (Some(value), 0)
            }
            None => {
                let outcome = Self::remove_from(&mut node.next, hash, key);
                *link = Some(node);
                outcome
            }
        }
    }
}
