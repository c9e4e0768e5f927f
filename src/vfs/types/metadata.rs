/*!
 * VFS Metadata
 * Result of `stat` on a file object
 */

use super::file_type::FileType;
use super::permissions::Permissions;
use serde::{Deserialize, Serialize};

/// File metadata
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct Metadata {
    pub file_type: FileType,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub permissions: Permissions,
}

impl Metadata {
    #[inline]
    #[must_use]
    pub const fn file(size: u64, permissions: Permissions) -> Self {
        Self {
            file_type: FileType::File,
            size,
            permissions,
        }
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self.file_type, FileType::File)
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.file_type, FileType::Directory)
    }
}
