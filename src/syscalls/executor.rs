/*!
 * Syscall Executor
 * Central dispatcher for the descriptor syscalls
 */

use std::sync::Arc;
use tracing::{debug, warn};

use super::types::{Syscall, SyscallError, SyscallOutcome, SyscallResult};
use crate::core::limits::MAX_TRANSFER;
use crate::core::types::{Fd, Pid};
use crate::fs::FileSubsystem;
use crate::monitoring::SyscallSpan;
use crate::process::{Process, ProcessManager};

/// System call executor
#[derive(Clone)]
pub struct SyscallExecutor {
    pub(super) files: Arc<FileSubsystem>,
    pub(super) processes: ProcessManager,
}

impl SyscallExecutor {
    pub fn new(processes: ProcessManager) -> Self {
        Self {
            files: Arc::clone(processes.files()),
            processes,
        }
    }

    #[inline]
    pub fn files(&self) -> &Arc<FileSubsystem> {
        &self.files
    }

    #[inline]
    pub fn processes(&self) -> &ProcessManager {
        &self.processes
    }

    /// Calling process, or `NoSuchProcess`
    pub(super) fn process(&self, pid: Pid) -> SyscallOutcome<Arc<Process>> {
        self.processes
            .get(pid)
            .ok_or(SyscallError::NoSuchProcess(pid))
    }

    /// Execute a decoded syscall on behalf of `pid`
    pub fn execute(&self, pid: Pid, syscall: Syscall) -> SyscallResult {
        let span = SyscallSpan::new(syscall.name(), pid);

        let outcome = span.span().in_scope(|| match syscall {
            Syscall::Open { path, flags, mode } => {
                self.open(pid, &path, flags, mode).map(|fd| SyscallResult::success(fd.into()))
            }
            Syscall::Close { fd } => self.close(pid, fd).map(|()| SyscallResult::success(0)),
            Syscall::Read { fd, len } => self.read_bounce(pid, fd, len),
            Syscall::Write { fd, data } => self
                .write(pid, fd, &data)
                .map(|n| SyscallResult::success(n as i64)),
            Syscall::Lseek { fd, offset, whence } => self
                .lseek(pid, fd, offset, whence)
                .map(SyscallResult::success),
            Syscall::Dup2 { oldfd, newfd } => self
                .dup2(pid, oldfd, newfd)
                .map(|fd| SyscallResult::success(fd.into())),
        });

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                if matches!(e, SyscallError::NoSuchProcess(_)) {
                    warn!(pid, error = %e, "Syscall from unknown process");
                }
                SyscallResult::from(e)
            }
        };
        span.finish(&result);
        result
    }

    /// `read` through a kernel bounce buffer
    ///
    /// The descriptor is checked before anything is allocated. The buffer is
    /// capped at [`MAX_TRANSFER`] and reserved fallibly, so an oversized
    /// request yields a short count or `ENOMEM` instead of aborting the kernel.
    fn read_bounce(&self, pid: Pid, fd: Fd, len: usize) -> SyscallOutcome<SyscallResult> {
        let file = self.readable(pid, fd)?;

        let len = len.min(MAX_TRANSFER);
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|_| SyscallError::out_of_memory(format!("read buffer of {} bytes", len)))?;
        buf.resize(len, 0);

        let n = self.read_record(pid, fd, &file, &mut buf)?;
        buf.truncate(n);
        debug!(pid, fd, bytes = n, "Read copied out");
        Ok(SyscallResult::success_with_data(n as i64, buf))
    }
}
