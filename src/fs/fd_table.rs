/*!
 * Descriptor Table
 * Per-process mapping from descriptors to open-file slots
 */

use parking_lot::{Mutex, MutexGuard};
use tracing::warn;

use super::open_file::OpenFile;
use super::open_file_table::OpenFileTable;
use crate::core::types::{Fd, OfIndex};
use crate::syscalls::types::{SyscallError, SyscallOutcome};
use std::sync::Arc;

/// Per-process descriptor table
///
/// Entries are `None` (free) or the index of a live open-file slot. Several
/// entries, in this or other tables, may name the same slot. Once
/// [`FdTable::close_all`] has run the table is closed and stays empty.
pub struct FdTable {
    entries: Mutex<Entries>,
}

struct Entries {
    slots: Vec<Option<OfIndex>>,
    closed: bool,
}

impl FdTable {
    /// Empty table with `capacity` descriptors
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Entries {
                slots: vec![None; capacity],
                closed: false,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().slots.len()
    }

    /// Lock the table for a multi-step bookkeeping sequence
    ///
    /// The guard must be taken before the open-file table lock.
    pub fn lock(&self) -> FdTableGuard<'_> {
        FdTableGuard {
            entries: self.entries.lock(),
        }
    }

    /// Slot behind `fd`, if it is in range and occupied
    pub fn slot_of(&self, fd: Fd) -> Option<OfIndex> {
        self.lock().get(fd)
    }

    /// Number of occupied descriptors
    pub fn open_count(&self) -> usize {
        self.entries.lock().slots.iter().flatten().count()
    }

    /// Treat every live descriptor as an implicit close
    ///
    /// The table is closed afterwards: it allocates and stores nothing more.
    /// Returns the number of objects whose last reference this dropped.
    pub fn close_all(&self, table: &OpenFileTable) -> usize {
        let released: Vec<(Fd, Arc<OpenFile>)> = {
            let mut guard = self.lock();
            guard.entries.closed = true;
            let mut released = Vec::new();
            for (fd, entry) in guard.entries.slots.iter_mut().enumerate() {
                if let Some(slot) = entry.take() {
                    if let Some(file) = table.release(slot) {
                        released.push((fd as Fd, file));
                    }
                }
            }
            released
        };

        let count = released.len();
        for (fd, file) in released {
            if let Err(e) = file.close_object() {
                warn!(fd, path = file.path(), error = %e, "Object close failed on table teardown");
            }
        }
        count
    }
}

impl std::fmt::Debug for FdTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("FdTable")
            .field("capacity", &entries.slots.len())
            .field("open", &entries.slots.iter().flatten().count())
            .field("closed", &entries.closed)
            .finish()
    }
}

/// Locked view of a descriptor table
pub struct FdTableGuard<'a> {
    entries: MutexGuard<'a, Entries>,
}

impl FdTableGuard<'_> {
    #[inline]
    fn index(&self, fd: Fd) -> Option<usize> {
        usize::try_from(fd).ok().filter(|&i| i < self.entries.slots.len())
    }

    /// Whether the owning process has already torn the table down
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.entries.closed
    }

    /// Whether `fd` lies in `[0, capacity)`
    #[inline]
    pub fn in_range(&self, fd: Fd) -> bool {
        self.index(fd).is_some()
    }

    /// First free descriptor; `None` when full or closed
    pub fn allocate(&self) -> Option<Fd> {
        if self.entries.closed {
            return None;
        }
        self.entries
            .slots
            .iter()
            .position(Option::is_none)
            .map(|i| i as Fd)
    }

    /// Stored slot, without checking that it is live
    pub fn get(&self, fd: Fd) -> Option<OfIndex> {
        self.index(fd).and_then(|i| self.entries.slots[i])
    }

    /// Point `fd` at `slot`; ignored for out-of-range descriptors and closed tables
    pub fn set(&mut self, fd: Fd, slot: OfIndex) {
        if self.entries.closed {
            return;
        }
        if let Some(i) = self.index(fd) {
            self.entries.slots[i] = Some(slot);
        }
    }

    /// Empty `fd`, returning what it held
    pub fn clear(&mut self, fd: Fd) -> Option<OfIndex> {
        let i = self.index(fd)?;
        self.entries.slots[i].take()
    }

    /// Resolve `fd` to its live slot
    ///
    /// Bad descriptor unless the fd is in range, the entry is occupied, the
    /// stored index is within the open-file table and that slot is live.
    pub fn validate(&self, fd: Fd, table: &OpenFileTable) -> SyscallOutcome<OfIndex> {
        let slot = self.get(fd).ok_or(SyscallError::BadDescriptor(fd))?;
        if slot >= table.capacity() || !table.is_live(slot) {
            return Err(SyscallError::BadDescriptor(fd));
        }
        Ok(slot)
    }
}
