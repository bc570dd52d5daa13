//! The contact-tracing ledger.
//!
//! A shared, append-only set of interaction identifiers that belong to
//! confirmed cases.  Agents check their own history against it to learn they
//! were exposed, without anyone learning who the confirmed case was.
//!
//! Reads take a shared lock and appends an exclusive one, so several agents
//! confirmed in the same timestep can publish concurrently.

use std::sync::{PoisonError, RwLock};

use gc_core::InteractionId;
use rustc_hash::FxHashSet;

#[derive(Default)]
pub struct ContactLedger {
    ids: RwLock<FxHashSet<InteractionId>>,
}

impl ContactLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append identifiers.  Never removes anything.
    pub fn publish<'a, I>(&self, ids: I)
    where
        I: IntoIterator<Item = &'a InteractionId>,
    {
        let mut set = self.ids.write().unwrap_or_else(PoisonError::into_inner);
        set.extend(ids.into_iter().copied());
    }

    pub fn contains(&self, id: InteractionId) -> bool {
        self.ids.read().unwrap_or_else(PoisonError::into_inner).contains(&id)
    }

    /// `true` if any of `history` has been published.
    pub fn intersects(&self, history: &[InteractionId]) -> bool {
        if history.is_empty() {
            return false;
        }
        let set = self.ids.read().unwrap_or_else(PoisonError::into_inner);
        history.iter().any(|id| set.contains(id))
    }

    pub fn len(&self) -> usize {
        self.ids.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
