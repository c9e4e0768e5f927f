/*!
 * VFS Traits
 * Core file-object abstraction traits
 */

use std::path::Path;

use super::types::*;

/// Filesystem or device that can hand out file objects
///
/// All backends implement this trait. The descriptor layer only ever calls
/// [`FileSystem::open`]; everything else happens on the returned object.
pub trait FileSystem: Send + Sync {
    /// Open `path` with the given flags and creation mode
    fn open(&self, path: &Path, flags: OpenFlags, mode: OpenMode) -> VfsResult<Box<dyn FileObject>>;

    /// Check if a file exists
    fn exists(&self, path: &Path) -> bool;

    /// Get filesystem name/type
    fn name(&self) -> &str;

    /// Check if filesystem is read-only
    fn readonly(&self) -> bool {
        false
    }
}

/// Opened file object
///
/// Positional: the caller owns the offset and passes it on every transfer.
/// `close` is called exactly once by the owning open-file record; a backend
/// may also release resources on drop for objects that never reach it.
#[cfg_attr(test, mockall::automock)]
pub trait FileObject: Send {
    /// Read up to `buf.len()` bytes starting at `offset`
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> VfsResult<usize>;

    /// Write up to `buf.len()` bytes starting at `offset`
    fn write_at(&mut self, buf: &[u8], offset: u64) -> VfsResult<usize>;

    /// Current metadata, size included
    fn stat(&self) -> VfsResult<Metadata>;

    /// Whether the object can be repositioned
    fn is_seekable(&self) -> bool;

    /// Release the underlying resource
    fn close(&mut self) -> VfsResult<()>;
}
