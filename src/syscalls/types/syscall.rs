/*!
 * Syscall Enum
 * Decoded descriptor syscalls as they arrive from the calling convention
 */

use crate::core::limits::{SEEK_CUR, SEEK_END, SEEK_SET};
use crate::core::types::{Fd, Offset};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::errors::SyscallError;

/// Descriptor system calls
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "syscall")]
pub enum Syscall {
    Open {
        path: PathBuf,
        flags: u32,
        #[serde(default)]
        mode: u32,
    },
    Close {
        fd: Fd,
    },
    Read {
        fd: Fd,
        len: usize,
    },
    Write {
        fd: Fd,
        data: Vec<u8>,
    },
    Lseek {
        fd: Fd,
        offset: Offset,
        whence: i32,
    },
    Dup2 {
        oldfd: Fd,
        newfd: Fd,
    },
}

impl Syscall {
    /// Syscall name for logging and spans
    pub const fn name(&self) -> &'static str {
        match self {
            Syscall::Open { .. } => "open",
            Syscall::Close { .. } => "close",
            Syscall::Read { .. } => "read",
            Syscall::Write { .. } => "write",
            Syscall::Lseek { .. } => "lseek",
            Syscall::Dup2 { .. } => "dup2",
        }
    }
}

/// Reference point for `lseek`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Whence {
    /// From the start of the object
    Set,
    /// From the current offset
    Cur,
    /// From the end (object size)
    End,
}

impl TryFrom<i32> for Whence {
    type Error = SyscallError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            SEEK_SET => Ok(Whence::Set),
            SEEK_CUR => Ok(Whence::Cur),
            SEEK_END => Ok(Whence::End),
            other => Err(SyscallError::invalid_argument(format!("bad whence: {}", other))),
        }
    }
}
