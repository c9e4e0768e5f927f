/*!
 * In-Memory Filesystem Backend
 * Fast, volatile filesystem for testing and temporary storage
 */

mod file_handle;
mod node;

use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

use super::traits::{FileObject, FileSystem};
use super::types::*;
use file_handle::MemFile;
use node::Node;

/// In-memory filesystem implementation
///
/// Files are flat entries keyed by normalised path. Every object opened on a
/// path shares the same node, so writes through one are visible through all.
///
/// # Performance
/// - Cache-line aligned to prevent false sharing of the atomic counters
#[repr(C, align(64))]
#[derive(Debug, Clone)]
pub struct MemFS {
    pub(super) nodes: Arc<DashMap<PathBuf, Arc<Node>, RandomState>>,
    pub(super) max_size: Option<usize>,
    pub(super) current_size: Arc<AtomicUsize>,
    pub(super) open_objects: Arc<AtomicUsize>,
    pub(super) closed_objects: Arc<AtomicUsize>,
}

impl MemFS {
    /// Create new in-memory filesystem
    pub fn new() -> Self {
        Self {
            nodes: Arc::new(DashMap::with_hasher(RandomState::new())),
            max_size: None,
            current_size: Arc::new(AtomicUsize::new(0)),
            open_objects: Arc::new(AtomicUsize::new(0)),
            closed_objects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create with size limit
    pub fn with_capacity(max_size: usize) -> Self {
        let mut fs = Self::new();
        fs.max_size = Some(max_size);
        fs
    }

    /// Normalize path (make absolute and clean)
    pub(super) fn normalize(&self, path: &Path) -> PathBuf {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new("/").join(path)
        };

        PathBuf::from(path_clean::clean(&path))
    }

    /// Check if space is available and reserve it atomically
    pub(super) fn reserve_space(&self, additional: usize) -> VfsResult<()> {
        let Some(max) = self.max_size else {
            self.current_size.fetch_add(additional, Ordering::SeqCst);
            return Ok(());
        };
        loop {
            let current = self.current_size.load(Ordering::SeqCst);
            if current + additional > max {
                return Err(VfsError::OutOfSpace);
            }
            if self
                .current_size
                .compare_exchange(current, current + additional, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return Ok(());
            }
        }
    }

    /// Release space (truncate, delete)
    pub(super) fn release_space(&self, amount: usize) {
        self.current_size.fetch_sub(amount, Ordering::SeqCst);
    }

    /// Create or replace a file with the given contents
    pub fn write_file(&self, path: &Path, data: &[u8]) -> VfsResult<()> {
        let path = self.normalize(path);
        self.reserve_space(data.len())?;
        let node = Arc::new(Node::new(data.to_vec(), Permissions::readwrite()));
        if let Some(old) = self.nodes.insert(path, node) {
            self.release_space(old.len());
        }
        Ok(())
    }

    /// Snapshot of a file's contents
    pub fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let path = self.normalize(path);
        self.nodes
            .get(&path)
            .map(|node| node.data.read().clone())
            .ok_or_else(|| VfsError::NotFound(path.display().to_string()))
    }

    /// Remove a file; objects already open on it keep working
    pub fn delete(&self, path: &Path) -> VfsResult<()> {
        let path = self.normalize(path);
        match self.nodes.remove(&path) {
            Some((_, node)) => {
                self.release_space(node.len());
                Ok(())
            }
            None => Err(VfsError::NotFound(path.display().to_string())),
        }
    }

    /// Mark a file read-only so write opens are refused
    pub fn set_readonly(&self, path: &Path) -> VfsResult<()> {
        let path = self.normalize(path);
        let mut entry = self
            .nodes
            .get_mut(&path)
            .ok_or_else(|| VfsError::NotFound(path.display().to_string()))?;
        let data = entry.data.read().clone();
        *entry = Arc::new(Node::new(data, Permissions::readonly()));
        Ok(())
    }

    /// Bytes currently stored
    pub fn used_space(&self) -> usize {
        self.current_size.load(Ordering::SeqCst)
    }

    /// Objects opened so far
    pub fn opened_count(&self) -> usize {
        self.open_objects.load(Ordering::SeqCst)
    }

    /// Objects released so far
    pub fn closed_count(&self) -> usize {
        self.closed_objects.load(Ordering::SeqCst)
    }

    fn lookup_or_create(&self, path: &PathBuf, flags: &OpenFlags, mode: OpenMode) -> VfsResult<Arc<Node>> {
        match self.nodes.entry(path.clone()) {
            Entry::Occupied(entry) => {
                if flags.create_new {
                    return Err(VfsError::AlreadyExists(path.display().to_string()));
                }
                Ok(entry.get().clone())
            }
            Entry::Vacant(entry) => {
                if !flags.will_create() {
                    return Err(VfsError::NotFound(path.display().to_string()));
                }
                debug!(path = %path.display(), mode = mode.bits(), "MemFS creating file");
                let node = Arc::new(Node::new(Vec::new(), mode.permissions));
                entry.insert(node.clone());
                Ok(node)
            }
        }
    }
}

impl Default for MemFS {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MemFS {
    fn open(&self, path: &Path, flags: OpenFlags, mode: OpenMode) -> VfsResult<Box<dyn FileObject>> {
        let path = self.normalize(path);
        if path == Path::new("/") {
            return Err(VfsError::IsADirectory(path.display().to_string()));
        }

        let node = self.lookup_or_create(&path, &flags, mode)?;

        if flags.access.can_write() && node.permissions.is_readonly() {
            return Err(VfsError::PermissionDenied(path.display().to_string()));
        }

        if flags.truncate && flags.access.can_write() {
            let mut data = node.data.write();
            self.release_space(data.len());
            data.clear();
        }

        self.open_objects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemFile::new(self.clone(), path, node, flags.access)))
    }

    fn exists(&self, path: &Path) -> bool {
        self.nodes.contains_key(&self.normalize(path))
    }

    fn name(&self) -> &str {
        "memfs"
    }
}
