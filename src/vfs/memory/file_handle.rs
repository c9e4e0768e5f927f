/*!
 * File Handle Implementation
 * In-memory file object for positional read/write
 */

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::super::traits::FileObject;
use super::super::types::*;
use super::node::Node;
use super::MemFS;

/// In-memory file object
pub(super) struct MemFile {
    fs: MemFS,
    path: PathBuf,
    node: Arc<Node>,
    access: AccessMode,
    closed: bool,
}

impl MemFile {
    pub(super) fn new(fs: MemFS, path: PathBuf, node: Arc<Node>, access: AccessMode) -> Self {
        Self {
            fs,
            path,
            node,
            access,
            closed: false,
        }
    }

    fn ensure_open(&self) -> VfsResult<()> {
        if self.closed {
            return Err(VfsError::IoError(format!(
                "object already closed: {}",
                self.path.display()
            )));
        }
        Ok(())
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.fs.closed_objects.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl FileObject for MemFile {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> VfsResult<usize> {
        self.ensure_open()?;
        if !self.access.can_read() {
            return Err(VfsError::PermissionDenied(format!(
                "not opened for reading: {}",
                self.path.display()
            )));
        }

        let data = self.node.data.read();
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        if start >= data.len() {
            return Ok(0);
        }
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    fn write_at(&mut self, buf: &[u8], offset: u64) -> VfsResult<usize> {
        self.ensure_open()?;
        if !self.access.can_write() {
            return Err(VfsError::PermissionDenied(format!(
                "not opened for writing: {}",
                self.path.display()
            )));
        }

        let start = usize::try_from(offset).map_err(|_| VfsError::FileTooLarge)?;
        let end = start.checked_add(buf.len()).ok_or(VfsError::FileTooLarge)?;

        let mut data = self.node.data.write();
        if end > data.len() {
            self.fs.reserve_space(end - data.len())?;
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        Ok(buf.len())
    }

    fn stat(&self) -> VfsResult<Metadata> {
        self.ensure_open()?;
        Ok(Metadata::file(self.node.len() as u64, self.node.permissions))
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn close(&mut self) -> VfsResult<()> {
        self.ensure_open()?;
        self.release();
        Ok(())
    }
}

impl Drop for MemFile {
    fn drop(&mut self) {
        self.release();
    }
}
