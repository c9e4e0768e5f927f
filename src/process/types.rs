/*!
 * Process Types
 * A process as seen by the descriptor layer
 */

use crate::core::types::Pid;
use crate::fs::FdTable;

/// Process owning exactly one descriptor table
#[derive(Debug)]
pub struct Process {
    pid: Pid,
    name: String,
    fd_table: FdTable,
}

impl Process {
    pub(super) fn new(pid: Pid, name: String, fd_table: FdTable) -> Self {
        Self {
            pid,
            name,
            fd_table,
        }
    }

    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Descriptor table shared by every thread of the process
    #[inline]
    pub fn fd_table(&self) -> &FdTable {
        &self.fd_table
    }
}
