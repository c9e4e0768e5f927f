/*!
 * Local Filesystem Backend
 * Wraps std::fs for host filesystem access
 */

use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};

use super::traits::{FileObject, FileSystem};
use super::types::*;

/// Local filesystem implementation using std::fs
#[derive(Debug, Clone)]
pub struct LocalFS {
    root: PathBuf,
    readonly: bool,
}

impl LocalFS {
    /// Create new local filesystem rooted at specified path
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            readonly: false,
        }
    }

    /// Create read-only local filesystem
    pub fn readonly<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            readonly: true,
        }
    }

    /// Resolve path relative to root
    ///
    /// `..` never climbs above the root, for existing and non-existing paths alike.
    fn resolve(&self, path: &Path) -> PathBuf {
        let mut components = Vec::with_capacity(8);
        for component in path.components() {
            match component {
                Component::Normal(name) => components.push(name),
                Component::ParentDir => {
                    components.pop();
                }
                _ => {}
            }
        }

        let mut result = self.root.clone();
        result.extend(components);
        result
    }

    fn convert_metadata(md: fs::Metadata) -> Metadata {
        #[cfg(unix)]
        let mode = {
            use std::os::unix::fs::PermissionsExt;
            md.permissions().mode()
        };
        #[cfg(not(unix))]
        let mode = if md.permissions().readonly() { 0o444 } else { 0o644 };

        let file_type = if md.is_dir() {
            FileType::Directory
        } else if md.is_file() {
            FileType::File
        } else {
            FileType::Unknown
        };

        Metadata {
            file_type,
            size: md.len(),
            permissions: Permissions::new(mode),
        }
    }
}

impl FileSystem for LocalFS {
    fn open(&self, path: &Path, flags: OpenFlags, mode: OpenMode) -> VfsResult<Box<dyn FileObject>> {
        if self.readonly && (flags.access.can_write() || flags.will_create() || flags.truncate) {
            return Err(VfsError::ReadOnly);
        }

        let full_path = self.resolve(path);
        if full_path.is_dir() {
            return Err(VfsError::IsADirectory(path.display().to_string()));
        }

        let mut options = fs::OpenOptions::new();
        options
            .read(flags.access.can_read())
            .write(flags.access.can_write())
            .truncate(flags.truncate && flags.access.can_write())
            .create(flags.create && flags.access.can_write())
            .create_new(flags.create_new && flags.access.can_write());

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode.bits());
        }
        #[cfg(not(unix))]
        let _ = mode;

        let file = options
            .open(&full_path)
            .map_err(|e| VfsError::from_io(e, path.display().to_string()))?;

        Ok(Box::new(LocalFile {
            file: Some(file),
            path: path.to_path_buf(),
        }))
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }

    fn name(&self) -> &str {
        "local"
    }

    fn readonly(&self) -> bool {
        self.readonly
    }
}

/// Local file object
struct LocalFile {
    file: Option<fs::File>,
    path: PathBuf,
}

impl LocalFile {
    fn file(&mut self) -> VfsResult<&mut fs::File> {
        let path = &self.path;
        self.file
            .as_mut()
            .ok_or_else(|| VfsError::IoError(format!("object already closed: {}", path.display())))
    }

    fn io(&self, e: std::io::Error) -> VfsError {
        VfsError::from_io(e, self.path.display().to_string())
    }
}

impl FileObject for LocalFile {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> VfsResult<usize> {
        let file = self.file()?;
        let result = file
            .seek(SeekFrom::Start(offset))
            .and_then(|_| file.read(buf));
        result.map_err(|e| self.io(e))
    }

    fn write_at(&mut self, buf: &[u8], offset: u64) -> VfsResult<usize> {
        let file = self.file()?;
        let result = file
            .seek(SeekFrom::Start(offset))
            .and_then(|_| file.write(buf));
        result.map_err(|e| self.io(e))
    }

    fn stat(&self) -> VfsResult<Metadata> {
        let file = self
            .file
            .as_ref()
            .ok_or_else(|| VfsError::IoError(format!("object already closed: {}", self.path.display())))?;
        let md = file.metadata().map_err(|e| self.io(e))?;
        Ok(LocalFS::convert_metadata(md))
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn close(&mut self) -> VfsResult<()> {
        let file = self
            .file
            .take()
            .ok_or_else(|| VfsError::IoError(format!("object already closed: {}", self.path.display())))?;
        file.sync_all().map_err(|e| self.io(e))
    }
}
