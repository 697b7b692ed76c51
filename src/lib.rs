//! # `linhash` — containers that grow one bucket at a time
//!
//! An in-memory [linear hashing](https://en.wikipedia.org/wiki/Linear_hashing)
//! map and set. Where a conventional hash table doubles its storage in one
//! stop-the-world rehash, a linear-hashing table splits a single bucket per
//! insertion once a load-factor threshold is crossed, spreading rehash cost
//! evenly across operations.
//!
//! ## How addressing works
//!
//! The table keeps a pair of bit masks one bit apart (`mask_high ==
//! 2 * mask_low + 1`) and a split cursor. A key whose narrow-masked hash
//! falls below the cursor belongs to a bucket that already split this
//! round, so it is re-addressed with the wide mask; everything else uses
//! the narrow mask. When the cursor has walked half the bucket array, the
//! doubling round is complete and the mask window slides up one bit.
//!
//! ## Key features
//!
//! - **Amortized growth**: each split rehashes at most one bucket's chain;
//!   there is no global rehash, ever.
//! - **Fixed-capacity nodes with overflow chains**: collisions spill into
//!   lazily allocated overflow nodes; nodes emptied by removals are pruned.
//! - **Duplicate-safe mutation**: the insert protocol reuses holes left by
//!   removals and purges stale copies deeper in the chain, so a key never
//!   occupies two live slots.
//! - **Single owner, no locking**: all mutation goes through `&mut self`;
//!   callers needing sharing bring their own synchronization.
//!
//! ## Example
//!
//! ```rust
//! use linhash::LinearHashMap;
//!
//! let mut population = LinearHashMap::new();
//! population.insert("lagos", 16_600_000u64);
//! population.insert("cairo", 20_900_000);
//!
//! assert_eq!(population.get(&"lagos"), Some(&16_600_000));
//! assert_eq!(population.len(), 2);
//! ```
//!
//! ## Cargo features
//!
//! - `serde`: `Serialize`/`Deserialize` for both containers.
//! - `tracing`: emits a `trace!` event per bucket split.

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

mod bucket;
pub mod map;
pub mod set;

#[cfg(feature = "serde")]
mod serde;

pub use bucket::NODE_CAPACITY;
pub use map::{IntoIter, Iter, Keys, LinearHashMap, Values, UTILIZATION_FACTOR};
pub use set::LinearHashSet;
