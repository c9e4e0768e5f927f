/*!
 * VFS Open Flags and Mode
 * Flags and modes for file opening operations
 */

use super::errors::VfsError;
use super::permissions::Permissions;
use crate::core::limits::{
    O_ACCMODE, O_APPEND, O_CREAT, O_EXCL, O_RDONLY, O_RDWR, O_TRUNC, O_WRONLY,
};
use serde::{Deserialize, Serialize};

fn is_false(b: &bool) -> bool {
    !*b
}

/// Access mode selected by the `O_ACCMODE` bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    #[default]
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    #[inline]
    #[must_use]
    pub const fn can_read(self) -> bool {
        matches!(self, AccessMode::ReadOnly | AccessMode::ReadWrite)
    }

    #[inline]
    #[must_use]
    pub const fn can_write(self) -> bool {
        matches!(self, AccessMode::WriteOnly | AccessMode::ReadWrite)
    }

    /// Decode the access-mode bits; anything but the three legal values is rejected
    pub fn from_posix(flags: u32) -> Result<Self, VfsError> {
        match flags & O_ACCMODE {
            O_RDONLY => Ok(AccessMode::ReadOnly),
            O_WRONLY => Ok(AccessMode::WriteOnly),
            O_RDWR => Ok(AccessMode::ReadWrite),
            bits => Err(VfsError::InvalidArgument(format!(
                "invalid access mode bits: {:#o}",
                bits
            ))),
        }
    }

    #[inline]
    #[must_use]
    pub const fn to_posix(self) -> u32 {
        match self {
            AccessMode::ReadOnly => O_RDONLY,
            AccessMode::WriteOnly => O_WRONLY,
            AccessMode::ReadWrite => O_RDWR,
        }
    }
}

/// File open flags with optimized serialization (skips false values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct OpenFlags {
    pub access: AccessMode,
    #[serde(skip_serializing_if = "is_false")]
    pub append: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub truncate: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub create: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub create_new: bool,
}

impl OpenFlags {
    #[inline]
    #[must_use]
    pub fn read_only() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn write_only() -> Self {
        Self {
            access: AccessMode::WriteOnly,
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn read_write() -> Self {
        Self {
            access: AccessMode::ReadWrite,
            ..Default::default()
        }
    }

    /// Flags for an access mode with no extra behaviour
    #[inline]
    #[must_use]
    pub fn with_access(access: AccessMode) -> Self {
        Self {
            access,
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub const fn will_create(&self) -> bool {
        self.create || self.create_new
    }

    /// Convert from POSIX-style flags (O_RDONLY, O_WRONLY, O_RDWR, O_CREAT, ...)
    ///
    /// Fails when the access-mode bits are not exactly one of the three legal values.
    pub fn from_posix(flags: u32) -> Result<Self, VfsError> {
        Ok(Self {
            access: AccessMode::from_posix(flags)?,
            append: flags & O_APPEND != 0,
            truncate: flags & O_TRUNC != 0,
            create: flags & O_CREAT != 0,
            create_new: flags & O_EXCL != 0 && flags & O_CREAT != 0,
        })
    }

    /// Convert to POSIX-style flags
    pub fn to_posix(&self) -> u32 {
        let mut flags = self.access.to_posix();
        if self.append {
            flags |= O_APPEND;
        }
        if self.truncate {
            flags |= O_TRUNC;
        }
        if self.create {
            flags |= O_CREAT;
        }
        if self.create_new {
            flags |= O_CREAT | O_EXCL;
        }
        flags
    }
}

/// File open mode (permissions for newly created files)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenMode {
    pub permissions: Permissions,
}

impl OpenMode {
    #[inline]
    #[must_use]
    pub const fn new(mode: u32) -> Self {
        Self {
            permissions: Permissions::new(mode),
        }
    }

    #[inline]
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.permissions.mode
    }
}

impl Default for OpenMode {
    fn default() -> Self {
        Self {
            permissions: Permissions::readwrite(),
        }
    }
}
