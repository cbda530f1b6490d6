//! symtable: a single-threaded symbol table mapping string keys to
//! arbitrary values, built on separate chaining with tiered growth.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small, predictable string-keyed map whose growth policy and
//!   chain layout are explicit and inspectable.
//! - Layers:
//!   - `hash`: the 65599 polynomial string hash reduced to a bucket index.
//!   - `tiers`: the ascending sequence of bucket counts and the decision of
//!     when to move to the next one.
//!   - `binding`: chain nodes and fallible key copying.
//!   - `SymTable<V>`: bucket heads plus a `SlotMap` arena of bindings;
//!     owns every binding and every key copy.
//!
//! Constraints
//! - Single-owner: no internal locking. `&mut self` on every mutation is
//!   the only exclusion; the table is `Send`/`Sync` exactly when `V` is.
//! - Keys are copied on `put` and never aliased; values are moved in and
//!   handed back by `replace`/`remove`. The table never clones values.
//! - Unique keys: `put` on a present key fails and leaves the old value.
//! - Every mutating operation either completes or leaves the table as it
//!   was.
//!
//! Growth
//! - Before linking a new binding, `put` grows if `len()` has reached the
//!   current tier's bucket count and a larger tier exists.
//! - Bucket arrays are allocated with `try_reserve_exact`. `with_tiers`
//!   reports a failure as `TierError::Alloc`; a failed growth keeps the old
//!   array and the `put` proceeds there.
//! - Once allocated, every binding is relinked under its new bucket index.
//!   Relinking only rewrites arena keys, so it cannot fail halfway.
//! - At the top tier growth stops and chains lengthen. Removal never
//!   shrinks the table.
//!
//! Traversal
//! - `map` and `iter` borrow the table shared, so a `map` callback may read
//!   the table but cannot mutate it.
//!
//! Notes and non-goals
//! - Traversal order is bucket order then chain order: deterministic for a
//!   given table, not meaningful to callers.
//! - No persistence, concurrency, or shrinking.

mod binding;
pub mod hash;
pub mod sym_table;
mod sym_table_proptest;
pub mod tiers;

// Public surface
pub use hash::{bucket_index, HASH_MULTIPLIER};
pub use sym_table::{Iter, PutError, SymTable};
pub use tiers::{TierError, Tiers, DEFAULT_TIERS};
