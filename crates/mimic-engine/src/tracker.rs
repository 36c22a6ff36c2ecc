//! Per-call identity tracker
//!
//! Maps source node identity to the clone already produced for it within
//! one top-level clone call. Detects shared references and cycles.
//!
//! Live sets are typically small, so the tracker starts as a sorted
//! inline buffer probed by binary search and spills into a hash map past
//! a threshold. Externally it behaves exactly like an identity map.

use mimic_value::{Identity, Value};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Entry count at which the inline buffer spills into a hash map
const SPILL_THRESHOLD: usize = 32;

#[derive(Debug)]
enum Slots {
    /// Sorted by identity; binary searched
    Inline(SmallVec<[(Identity, Value); 8]>),
    Spilled(HashMap<Identity, Value>),
}

/// Identity-keyed map from source node to its clone
///
/// One tracker per top-level clone call; never shared across calls. The
/// driver registers a clone **before** recursing into the source's
/// fields, so cyclic back-references resolve to the (possibly still
/// unpopulated) shell instead of recursing forever.
#[derive(Debug)]
pub struct IdentityTracker {
    slots: Slots,
}

impl IdentityTracker {
    /// Create an empty tracker
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Slots::Inline(SmallVec::new()),
        }
    }

    /// Clone already produced for this source identity, if any
    #[must_use]
    pub fn get(&self, id: Identity) -> Option<&Value> {
        match &self.slots {
            Slots::Inline(buf) => buf
                .binary_search_by_key(&id, |(key, _)| *key)
                .ok()
                .map(|idx| &buf[idx].1),
            Slots::Spilled(map) => map.get(&id),
        }
    }

    /// Register the clone for a source identity
    ///
    /// Overwrites any previous entry for the same identity.
    pub fn insert(&mut self, id: Identity, clone: Value) {
        match &mut self.slots {
            Slots::Inline(buf) => {
                match buf.binary_search_by_key(&id, |(key, _)| *key) {
                    Ok(idx) => buf[idx].1 = clone,
                    Err(idx) => {
                        buf.insert(idx, (id, clone));
                        if buf.len() > SPILL_THRESHOLD {
                            let map = buf.drain(..).collect();
                            self.slots = Slots::Spilled(map);
                        }
                    }
                }
            }
            Slots::Spilled(map) => {
                map.insert(id, clone);
            }
        }
    }

    /// Number of tracked entries
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.slots {
            Slots::Inline(buf) => buf.len(),
            Slots::Spilled(map) => map.len(),
        }
    }

    /// Whether the tracker is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for IdentityTracker {
    fn default() -> Self {
        Self::new()
    }
}
