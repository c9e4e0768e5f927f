/*!
 * Syscall Result Types
 * ABI-facing outcome of a dispatched syscall
 */

use super::errors::SyscallError;
use serde::{Deserialize, Serialize};

/// System call result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SyscallResult {
    /// Successful operation
    Success {
        /// Return value (fd, byte count, offset, or 0)
        value: i64,
        /// Optional data payload (bytes read)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Vec<u8>>,
    },
    /// Operation failed
    Error {
        /// Linux errno
        errno: i32,
        /// Human-readable error message
        message: String,
    },
}

impl SyscallResult {
    #[inline]
    #[must_use]
    pub fn success(value: i64) -> Self {
        Self::Success { value, data: None }
    }

    #[inline]
    #[must_use]
    pub fn success_with_data(value: i64, data: Vec<u8>) -> Self {
        Self::Success {
            value,
            data: Some(data),
        }
    }

    /// Check if result is successful
    #[inline]
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Check if result is error
    #[inline]
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Return value on success
    #[inline]
    #[must_use]
    pub const fn value(&self) -> Option<i64> {
        match self {
            Self::Success { value, .. } => Some(*value),
            Self::Error { .. } => None,
        }
    }

    /// Errno on failure
    #[inline]
    #[must_use]
    pub const fn errno(&self) -> Option<i32> {
        match self {
            Self::Success { .. } => None,
            Self::Error { errno, .. } => Some(*errno),
        }
    }

    /// Extract data if successful
    #[inline]
    #[must_use]
    pub const fn data(&self) -> Option<&Vec<u8>> {
        match self {
            Self::Success { data, .. } => data.as_ref(),
            Self::Error { .. } => None,
        }
    }

    /// Raw register value: the result on success, `-errno` on failure
    #[inline]
    #[must_use]
    pub const fn to_raw(&self) -> i64 {
        match self {
            Self::Success { value, .. } => *value,
            Self::Error { errno, .. } => -(*errno as i64),
        }
    }
}

/// Convert from SyscallError to SyscallResult
impl From<SyscallError> for SyscallResult {
    fn from(err: SyscallError) -> Self {
        Self::Error {
            errno: err.errno(),
            message: err.to_string(),
        }
    }
}
