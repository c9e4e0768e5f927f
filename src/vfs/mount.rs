/*!
 * Mount Manager
 * Routes paths and device names to file-object backends
 */

use ahash::RandomState;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use super::traits::{FileObject, FileSystem};
use super::types::*;

/// Internal mount entry with filesystem and options
struct MountEntry {
    fs: Arc<dyn FileSystem>,
    readonly: bool,
}

/// Mount manager for filesystem routing
///
/// Two namespaces:
/// - devices, addressed as `name:` (e.g. `con:`), optionally followed by a sub-path
/// - mount points, addressed by absolute path prefix, longest prefix first
#[derive(Clone)]
pub struct MountManager {
    mounts: Arc<DashMap<PathBuf, MountEntry, RandomState>>,
    mount_order: Arc<RwLock<Vec<PathBuf>>>, // Longest paths first for proper resolution
    devices: Arc<DashMap<String, Arc<dyn FileSystem>, RandomState>>,
}

impl MountManager {
    /// Create new mount manager
    pub fn new() -> Self {
        Self {
            mounts: Arc::new(DashMap::with_hasher(RandomState::new())),
            mount_order: Arc::new(RwLock::new(Vec::new())),
            devices: Arc::new(DashMap::with_hasher(RandomState::new())),
        }
    }

    /// Mount a filesystem at specified path
    pub fn mount<P: Into<PathBuf>>(&self, mount_path: P, fs: Arc<dyn FileSystem>) -> VfsResult<()> {
        self.mount_with_options(mount_path, fs, false)
    }

    /// Mount a filesystem at specified path with readonly option
    pub fn mount_with_options<P: Into<PathBuf>>(
        &self,
        mount_path: P,
        fs: Arc<dyn FileSystem>,
        readonly: bool,
    ) -> VfsResult<()> {
        let mount_path = self.normalize_path(&mount_path.into());

        if self.mounts.contains_key(&mount_path) {
            return Err(VfsError::AlreadyExists(format!(
                "mount point already exists: {}",
                mount_path.display()
            )));
        }

        info!(path = %mount_path.display(), fs = fs.name(), readonly, "Mounting filesystem");
        self.mounts
            .insert(mount_path.clone(), MountEntry { fs, readonly });

        let mut order = self.mount_order.write();
        order.push(mount_path);
        order.sort_by(|a, b| b.as_os_str().len().cmp(&a.as_os_str().len()));

        Ok(())
    }

    /// Unmount filesystem at specified path
    ///
    /// Objects already opened through it stay valid until their records release them.
    pub fn unmount<P: AsRef<Path>>(&self, mount_path: P) -> VfsResult<()> {
        let mount_path = self.normalize_path(mount_path.as_ref());

        if self.mounts.remove(&mount_path).is_none() {
            return Err(VfsError::NotFound(format!(
                "mount point not found: {}",
                mount_path.display()
            )));
        }

        self.mount_order.write().retain(|p| p != &mount_path);
        Ok(())
    }

    /// Register a named device; `name` includes the trailing colon (`con:`)
    pub fn register_device(&self, name: &str, device: Arc<dyn FileSystem>) -> VfsResult<()> {
        if !name.ends_with(':') || name.len() < 2 || name[..name.len() - 1].contains(':') {
            return Err(VfsError::InvalidArgument(format!("bad device name: {}", name)));
        }
        if self.devices.contains_key(name) {
            return Err(VfsError::AlreadyExists(format!("device already registered: {}", name)));
        }
        info!(device = name, kind = device.name(), "Registering device");
        self.devices.insert(name.to_string(), device);
        Ok(())
    }

    /// Device prefix (`name:`) of a path, if it addresses a device
    fn device_name<'a>(&self, path: &'a Path) -> Option<&'a str> {
        let s = path.to_str()?;
        let colon = s.find(':')?;
        if s[..colon].contains('/') {
            return None;
        }
        Some(&s[..=colon])
    }

    /// Resolve path to (filesystem, relative_path, readonly)
    fn resolve(&self, path: &Path) -> VfsResult<(Arc<dyn FileSystem>, PathBuf, bool)> {
        if let Some(device) = self.device_name(path) {
            let fs = self
                .devices
                .get(device)
                .map(|entry| entry.value().clone())
                .ok_or_else(|| VfsError::NotFound(format!("no such device: {}", device)))?;
            return Ok((fs, path.to_path_buf(), false));
        }

        let path = self.normalize_path(path);
        let order = self.mount_order.read();

        for mount_path in order.iter() {
            if path.starts_with(mount_path) {
                let entry = self.mounts.get(mount_path).ok_or_else(|| {
                    VfsError::NotFound(format!(
                        "mount point was removed concurrently: {}",
                        mount_path.display()
                    ))
                })?;

                let rel_path = path
                    .strip_prefix(mount_path)
                    .map(|p| PathBuf::from("/").join(p))
                    .unwrap_or_else(|_| PathBuf::from("/"));
                return Ok((entry.fs.clone(), rel_path, entry.readonly));
            }
        }

        Err(VfsError::NotFound(format!(
            "no filesystem mounted for path: {}",
            path.display()
        )))
    }

    /// Normalize path (make absolute)
    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            PathBuf::from("/").join(path)
        }
    }

    /// List all mount points
    pub fn list_mounts(&self) -> Vec<(PathBuf, String)> {
        self.mounts
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().fs.name().to_string()))
            .collect()
    }

    /// Check if path is mounted
    pub fn is_mounted<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = self.normalize_path(path.as_ref());
        self.mounts.contains_key(&path)
    }
}

impl Default for MountManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MountManager {
    fn open(&self, path: &Path, flags: OpenFlags, mode: OpenMode) -> VfsResult<Box<dyn FileObject>> {
        let (fs, rel_path, readonly) = self.resolve(path)?;
        if readonly && (flags.access.can_write() || flags.will_create() || flags.truncate) {
            return Err(VfsError::ReadOnly);
        }
        fs.open(&rel_path, flags, mode)
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path)
            .map(|(fs, rel_path, _)| fs.exists(&rel_path))
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        "mount_manager"
    }
}
