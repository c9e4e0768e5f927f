/*!
 * File Subsystem
 * Kernel start-up and shutdown of the open-file table and console records
 */

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use super::fd_table::FdTable;
use super::open_file::OpenFile;
use super::open_file_table::OpenFileTable;
use crate::core::config::FsConfig;
use crate::core::errors::{KernelError, KernelResult};
use crate::core::limits::CONSOLE_MODE;
use crate::core::types::{Fd, OfIndex};
use crate::vfs::{FileSystem, OpenFlags, OpenMode, VfsError};

/// Install a console record, closing its object if the table is full
///
/// `FsConfig::validate` guarantees room at boot, so a full table is treated
/// as a device fault.
fn install_console(table: &OpenFileTable, record: OpenFile) -> KernelResult<OfIndex> {
    table.install(record).map_err(|record| {
        if let Err(e) = record.close_object() {
            warn!(path = record.path(), error = %e, "Console object close failed");
        }
        KernelError::Vfs(VfsError::OutOfSpace)
    })
}

/// Kernel-wide file state
///
/// Owns the open-file table and the file-object layer it opens through.
/// Shared by reference with the syscall layer and the process manager.
pub struct FileSubsystem {
    config: FsConfig,
    vfs: Arc<dyn FileSystem>,
    table: OpenFileTable,
    /// Reserved console records as (descriptor, slot)
    std_streams: Vec<(Fd, OfIndex)>,
}

impl FileSubsystem {
    /// Build the open-file table and open the configured console records
    ///
    /// Each console record holds one kernel reference so it survives every
    /// process closing its standard descriptors.
    pub fn init(config: FsConfig, vfs: Arc<dyn FileSystem>) -> KernelResult<Self> {
        config.validate()?;
        let table = OpenFileTable::new(config.open_max);
        let mut std_streams = Vec::with_capacity(config.std_streams.len());

        let device = Path::new(config.console_device.as_str());
        for stream in &config.std_streams {
            let flags = OpenFlags::with_access(stream.access);
            let mode = OpenMode::new(CONSOLE_MODE);
            let object = match vfs.open(device, flags, mode) {
                Ok(object) => object,
                Err(e) => {
                    table.shutdown();
                    return Err(KernelError::Vfs(e));
                }
            };
            let record = OpenFile::new(config.console_device.as_str(), object, flags, mode, 0);
            let slot = match install_console(&table, record) {
                Ok(slot) => slot,
                Err(e) => {
                    table.shutdown();
                    return Err(e);
                }
            };
            info!(fd = stream.fd, slot, access = ?stream.access, "Console record reserved");
            std_streams.push((stream.fd, slot));
        }

        info!(
            fd_max = config.fd_max,
            open_max = config.open_max,
            vfs = vfs.name(),
            "File subsystem initialized"
        );
        Ok(Self {
            config,
            vfs,
            table,
            std_streams,
        })
    }

    /// Fresh descriptor table wired to the console records
    pub fn new_fd_table(&self) -> FdTable {
        let fds = FdTable::new(self.config.fd_max);
        {
            let mut guard = fds.lock();
            for &(fd, slot) in &self.std_streams {
                if self.table.retain(slot) {
                    guard.set(fd, slot);
                } else {
                    warn!(fd, slot, "Console record gone, leaving descriptor empty");
                }
            }
        }
        fds
    }

    /// Force-close every record; the table refuses new records afterwards
    pub fn shutdown(&self) -> usize {
        let closed = self.table.shutdown();
        info!(closed, "File subsystem shut down");
        closed
    }

    #[inline]
    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    #[inline]
    pub fn vfs(&self) -> &Arc<dyn FileSystem> {
        &self.vfs
    }

    #[inline]
    pub fn table(&self) -> &OpenFileTable {
        &self.table
    }

    /// Reserved console records as (descriptor, slot)
    pub fn std_streams(&self) -> &[(Fd, OfIndex)] {
        &self.std_streams
    }
}

impl std::fmt::Debug for FileSubsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSubsystem")
            .field("config", &self.config)
            .field("vfs", &self.vfs.name())
            .field("table", &self.table)
            .finish()
    }
}
