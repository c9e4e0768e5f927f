/*!
 * Open-File Table
 * Kernel-wide, fixed-capacity pool of reference-counted open-file records
 */

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

use super::open_file::OpenFile;
use crate::core::types::OfIndex;

/// Live slot: the record plus the number of references to it
struct Slot {
    file: Arc<OpenFile>,
    refs: usize,
}

struct Slots {
    entries: Vec<Option<Slot>>,
    shut_down: bool,
}

impl Slots {
    /// First free index in `[0, capacity)`
    fn first_free(&self) -> Option<OfIndex> {
        self.entries.iter().position(Option::is_none)
    }
}

/// Kernel-wide open-file table
///
/// One table-wide lock covers slot claim, reference counting and slot
/// release, so a release racing a `dup2` increment can neither under- nor
/// over-count. Objects are never closed while the lock is held.
pub struct OpenFileTable {
    slots: Mutex<Slots>,
    capacity: usize,
}

impl OpenFileTable {
    /// Create an empty table with `capacity` slots
    pub fn new(capacity: usize) -> Self {
        let mut entries = Vec::with_capacity(capacity);
        entries.resize_with(capacity, || None);
        Self {
            slots: Mutex::new(Slots {
                entries,
                shut_down: false,
            }),
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// First free slot, if any (informational; [`install`](Self::install) claims)
    pub fn free_slot(&self) -> Option<OfIndex> {
        let slots = self.slots.lock();
        if slots.shut_down {
            return None;
        }
        slots.first_free()
    }

    /// Claim the first free slot for `file` with one reference (the creator's)
    ///
    /// When the table is full, or shut down, the record is handed back so the
    /// caller can close its object.
    pub fn install(&self, file: OpenFile) -> Result<OfIndex, OpenFile> {
        let mut slots = self.slots.lock();
        if slots.shut_down {
            return Err(file);
        }
        let Some(index) = slots.first_free() else {
            return Err(file);
        };
        slots.entries[index] = Some(Slot {
            file: Arc::new(file),
            refs: 1,
        });
        debug!(slot = index, "Open-file slot claimed");
        Ok(index)
    }

    /// Record in a live slot
    pub fn get(&self, index: OfIndex) -> Option<Arc<OpenFile>> {
        self.slots
            .lock()
            .entries
            .get(index)?
            .as_ref()
            .map(|slot| Arc::clone(&slot.file))
    }

    /// Whether `index` is in range and holds a record
    pub fn is_live(&self, index: OfIndex) -> bool {
        matches!(self.slots.lock().entries.get(index), Some(Some(_)))
    }

    /// Add one reference to a live slot
    ///
    /// Returns `false` (and changes nothing) if the slot is not live.
    pub fn retain(&self, index: OfIndex) -> bool {
        match self.slots.lock().entries.get_mut(index) {
            Some(Some(slot)) => {
                slot.refs += 1;
                true
            }
            _ => false,
        }
    }

    /// Drop one reference
    ///
    /// Decrement and zero-check happen under the table lock. When this was the
    /// last reference the slot is freed and the record returned; the caller
    /// closes its object after releasing its own locks.
    #[must_use = "the last reference must have its object closed"]
    pub fn release(&self, index: OfIndex) -> Option<Arc<OpenFile>> {
        let mut slots = self.slots.lock();
        let entry = slots.entries.get_mut(index)?;
        let slot = entry.as_mut()?;
        slot.refs -= 1;
        if slot.refs > 0 {
            return None;
        }
        debug!(slot = index, "Last reference dropped, freeing slot");
        entry.take().map(|slot| slot.file)
    }

    /// Reference count of a live slot
    pub fn ref_count(&self, index: OfIndex) -> Option<usize> {
        self.slots
            .lock()
            .entries
            .get(index)?
            .as_ref()
            .map(|slot| slot.refs)
    }

    /// Number of live slots
    pub fn live_count(&self) -> usize {
        self.slots.lock().entries.iter().flatten().count()
    }

    pub fn is_shut_down(&self) -> bool {
        self.slots.lock().shut_down
    }

    /// Force-close every live record regardless of its reference count
    ///
    /// Every slot is freed and the table refuses new records afterwards.
    /// Returns the number of records closed.
    pub fn shutdown(&self) -> usize {
        let drained: Vec<(OfIndex, Slot)> = {
            let mut slots = self.slots.lock();
            slots.shut_down = true;
            slots
                .entries
                .iter_mut()
                .enumerate()
                .filter_map(|(index, entry)| entry.take().map(|slot| (index, slot)))
                .collect()
        };

        let count = drained.len();
        for (index, slot) in drained {
            if slot.refs > 1 {
                debug!(slot = index, refs = slot.refs, path = slot.file.path(), "Force-closing shared record");
            }
            if let Err(e) = slot.file.close_object() {
                warn!(slot = index, path = slot.file.path(), error = %e, "Object close failed during shutdown");
            }
        }
        count
    }
}

impl std::fmt::Debug for OpenFileTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenFileTable")
            .field("capacity", &self.capacity)
            .field("live", &self.live_count())
            .finish()
    }
}
