/*!
 * VFS Error Types
 * Structured, type-safe error handling for file-object operations
 */

use crate::core::limits::errno;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// VFS operation result
///
/// # Must Use
/// VFS operations can fail and must be handled to prevent data loss
#[must_use = "VFS operations can fail and must be handled"]
pub type VfsResult<T> = Result<T, VfsError>;

/// VFS errors with structured, type-safe error handling
///
/// These are passed through the syscall layer unchanged, so every variant
/// carries its own errno (see [`VfsError::errno`]).
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum VfsError {
    #[error("Not found: {0}")]
    NotFound(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Already exists: {0}")]
    AlreadyExists(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Permission denied: {0}")]
    PermissionDenied(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Not a directory: {0}")]
    NotADirectory(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Is a directory: {0}")]
    IsADirectory(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Invalid path: {0}")]
    InvalidPath(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("I/O error: {0}")]
    IoError(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Not supported: {0}")]
    NotSupported(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Out of space")]
    OutOfSpace,

    #[error("Invalid argument: {0}")]
    InvalidArgument(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("File too large")]
    FileTooLarge,

    #[error("Read-only filesystem")]
    ReadOnly,
}

impl VfsError {
    /// Errno reported to the syscall caller
    pub const fn errno(&self) -> i32 {
        match self {
            VfsError::NotFound(_) | VfsError::InvalidPath(_) => errno::ENOENT,
            VfsError::AlreadyExists(_) => errno::EEXIST,
            VfsError::PermissionDenied(_) => errno::EACCES,
            VfsError::NotADirectory(_) => errno::ENOTDIR,
            VfsError::IsADirectory(_) => errno::EISDIR,
            VfsError::IoError(_) => errno::EIO,
            VfsError::NotSupported(_) => errno::ENOTSUP,
            VfsError::OutOfSpace => errno::ENOSPC,
            VfsError::InvalidArgument(_) => errno::EINVAL,
            VfsError::FileTooLarge => errno::EFBIG,
            VfsError::ReadOnly => errno::EROFS,
        }
    }

    /// Map a host I/O error, keeping the most specific variant
    pub fn from_io(e: std::io::Error, context: impl Into<String>) -> Self {
        use std::io::ErrorKind;
        match e.kind() {
            ErrorKind::NotFound => VfsError::NotFound(context.into()),
            ErrorKind::PermissionDenied => VfsError::PermissionDenied(context.into()),
            ErrorKind::AlreadyExists => VfsError::AlreadyExists(context.into()),
            ErrorKind::InvalidInput => VfsError::InvalidArgument(context.into()),
            _ => VfsError::IoError(format!("{}: {}", context.into(), e)),
        }
    }
}

/// Deserialize and validate non-empty string for error messages
pub(super) fn deserialize_nonempty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        return Err(serde::de::Error::custom("error message must not be empty"));
    }
    Ok(s)
}
