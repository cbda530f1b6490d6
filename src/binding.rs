//! Bindings: the chain nodes stored in the table's arena.

use slotmap::DefaultKey;
use std::collections::TryReserveError;

/// One key/value pair plus the link to the next binding in its bucket.
///
/// The key is the table's own copy; callers never share it.
#[derive(Debug)]
pub(crate) struct Binding<V> {
    pub(crate) key: Box<str>,
    pub(crate) value: V,
    pub(crate) next: Option<DefaultKey>,
}

/// Copy `key` into a fresh allocation, reporting allocator refusal instead
/// of aborting.
pub(crate) fn copy_key(key: &str) -> Result<Box<str>, TryReserveError> {
    let mut copy = String::new();
    copy.try_reserve_exact(key.len())?;
    copy.push_str(key);
    Ok(copy.into_boxed_str())
}
