/*!
 * Process Management
 * Process registry owning the per-process descriptor tables
 */

use ahash::RandomState;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::info;

use super::types::Process;
use crate::core::errors::ProcessError;
use crate::core::types::Pid;
use crate::fs::FileSubsystem;

/// Process registry
///
/// Creating a process gives it a fresh descriptor table wired to the console
/// records; exiting it closes every descriptor it still holds.
#[derive(Clone)]
pub struct ProcessManager {
    processes: Arc<DashMap<Pid, Arc<Process>, RandomState>>,
    next_pid: Arc<AtomicU32>,
    files: Arc<FileSubsystem>,
}

impl ProcessManager {
    pub fn new(files: Arc<FileSubsystem>) -> Self {
        Self {
            processes: Arc::new(DashMap::with_hasher(RandomState::new())),
            next_pid: Arc::new(AtomicU32::new(1)),
            files,
        }
    }

    /// Create a process under the next free pid
    pub fn create(&self, name: impl Into<String>) -> Arc<Process> {
        let name = name.into();
        loop {
            let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
            if let Ok(process) = self.create_with_pid(pid, name.clone()) {
                return process;
            }
        }
    }

    /// Create a process under a caller-chosen pid
    pub fn create_with_pid(
        &self,
        pid: Pid,
        name: impl Into<String>,
    ) -> Result<Arc<Process>, ProcessError> {
        use dashmap::mapref::entry::Entry;

        match self.processes.entry(pid) {
            Entry::Occupied(_) => Err(ProcessError::AlreadyExists(pid)),
            Entry::Vacant(slot) => {
                let process = Arc::new(Process::new(pid, name.into(), self.files.new_fd_table()));
                info!(pid, name = process.name(), "Process created");
                slot.insert(Arc::clone(&process));
                Ok(process)
            }
        }
    }

    pub fn get(&self, pid: Pid) -> Option<Arc<Process>> {
        self.processes.get(&pid).map(|entry| Arc::clone(entry.value()))
    }

    /// Remove a process, closing every descriptor it still holds
    ///
    /// Returns the number of objects whose last reference went with it.
    pub fn exit(&self, pid: Pid) -> Result<usize, ProcessError> {
        let (_, process) = self
            .processes
            .remove(&pid)
            .ok_or(ProcessError::NotFound(pid))?;
        let closed = process.fd_table().close_all(self.files.table());
        info!(pid, closed, "Process exited");
        Ok(closed)
    }

    pub fn count(&self) -> usize {
        self.processes.len()
    }

    pub fn files(&self) -> &Arc<FileSubsystem> {
        &self.files
    }
}
