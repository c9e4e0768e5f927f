/*!
 * Syscall Error Types
 * The fixed error enumeration of the descriptor syscalls
 */

use crate::core::data_structures::InlineString;
use crate::core::limits::errno;
use crate::core::types::{Fd, Pid};
use crate::vfs::VfsError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of a typed syscall operation
pub type SyscallOutcome<T> = Result<T, SyscallError>;

/// Syscall operation errors
///
/// Every variant maps to exactly one errno ([`SyscallError::errno`]).
/// File-object failures travel unchanged inside [`SyscallError::Vfs`].
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error_type", content = "details")]
#[non_exhaustive]
pub enum SyscallError {
    /// Descriptor out of range, empty, or pointing at a dead record;
    /// also access-mode mismatches on read/write
    #[error("Bad file descriptor: {0}")]
    BadDescriptor(Fd),

    /// Invalid flags, whence or resulting offset
    #[error("Invalid argument: {0}")]
    InvalidArgument(InlineString),

    /// Kernel-side buffer could not be allocated
    #[error("Out of memory: {0}")]
    OutOfMemory(InlineString),

    /// Descriptor table of the calling process is full
    #[error("Too many open files in process")]
    ProcessFileLimit,

    /// Kernel-wide open-file table is full
    #[error("Too many open files in system")]
    SystemFileLimit,

    /// Object cannot be repositioned
    #[error("Illegal seek on descriptor {0}")]
    NotSeekable(Fd),

    /// Calling pid has no descriptor table
    #[error("No such process: {0}")]
    NoSuchProcess(Pid),

    /// File-object layer failure, passed through verbatim
    #[error(transparent)]
    Vfs(#[from] VfsError),
}

impl SyscallError {
    /// Create an invalid argument error
    #[inline]
    pub fn invalid_argument(msg: impl Into<InlineString>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an out of memory error
    #[inline]
    pub fn out_of_memory(msg: impl Into<InlineString>) -> Self {
        Self::OutOfMemory(msg.into())
    }

    /// Errno reported through the raw ABI
    pub const fn errno(&self) -> i32 {
        match self {
            SyscallError::BadDescriptor(_) => errno::EBADF,
            SyscallError::InvalidArgument(_) => errno::EINVAL,
            SyscallError::OutOfMemory(_) => errno::ENOMEM,
            SyscallError::ProcessFileLimit => errno::EMFILE,
            SyscallError::SystemFileLimit => errno::ENFILE,
            SyscallError::NotSeekable(_) => errno::ESPIPE,
            SyscallError::NoSuchProcess(_) => errno::ESRCH,
            SyscallError::Vfs(e) => e.errno(),
        }
    }
}
