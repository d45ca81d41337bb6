//! Per-listing mutual exclusion for read-validate-write sequences.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::listing::ListingId;

type Slot = Arc<AsyncMutex<()>>;
type SlotTable = Arc<Mutex<HashMap<ListingId, Slot>>>;

/// Registry handing out one async mutex per listing.
///
/// The guard returned by [`ListingLocks::acquire`] is held across every
/// await point of a commit, adjustment or deletion and released on drop,
/// so all exit paths unlock. A slot lives only while some caller holds or
/// waits on it; the last guard out removes it, so ids that never name a
/// listing leave nothing behind.
#[derive(Debug, Default, Clone)]
pub struct ListingLocks {
    slots: SlotTable,
}

/// Exclusive access to one listing, released on drop.
#[derive(Debug)]
pub struct ListingGuard {
    guard: Option<OwnedMutexGuard<()>>,
    slot: Slot,
    listing_id: ListingId,
    slots: SlotTable,
}

impl ListingLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, listing_id: &ListingId) -> Slot {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(slots.entry(listing_id.clone()).or_default())
    }

    /// Wait for exclusive access to `listing_id`.
    pub async fn acquire(&self, listing_id: &ListingId) -> ListingGuard {
        let slot = self.slot(listing_id);
        let guard = Arc::clone(&slot).lock_owned().await;
        ListingGuard {
            guard: Some(guard),
            slot,
            listing_id: listing_id.clone(),
            slots: Arc::clone(&self.slots),
        }
    }

    /// Number of listings with a live slot.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for ListingGuard {
    fn drop(&mut self) {
        self.guard.take();
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // The table and this guard hold the only references: nobody waits.
        let idle = slots.get(&self.listing_id).is_some_and(|current| {
            Arc::ptr_eq(current, &self.slot) && Arc::strong_count(&self.slot) == 2
        });
        if idle {
            slots.remove(&self.listing_id);
        }
    }
}
