/*!
 * File Descriptor Syscalls
 * open, close, read, write, lseek and dup2 over the two-level descriptor tables
 */

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::executor::SyscallExecutor;
use super::types::{SyscallError, SyscallOutcome, Whence};
use crate::core::limits::O_ACCMODE;
use crate::core::types::{Fd, Offset, Pid};
use crate::fs::{OpenFile, OpenFileTable};
use crate::process::Process;
use crate::vfs::{OpenFlags, OpenMode};

/// Close an object whose last reference was dropped; failures are only logged
fn close_released(file: Option<Arc<OpenFile>>, pid: Pid, fd: Fd) {
    if let Some(file) = file {
        if let Err(e) = file.close_object() {
            warn!(pid, fd, path = file.path(), error = %e, "Object close failed, descriptor cleared anyway");
        }
    }
}

impl SyscallExecutor {
    #[inline]
    fn table(&self) -> &OpenFileTable {
        self.files.table()
    }

    /// Validate `fd` and take a handle on its record
    ///
    /// The descriptor-table lock is released before returning, so no table
    /// lock is held across the file-object call that follows.
    fn resolve(&self, process: &Process, fd: Fd) -> SyscallOutcome<Arc<OpenFile>> {
        let guard = process.fd_table().lock();
        let slot = guard.validate(fd, self.table())?;
        self.table().get(slot).ok_or(SyscallError::BadDescriptor(fd))
    }

    /// Open `path` and bind it to the lowest free descriptor
    pub fn open(&self, pid: Pid, path: &Path, flags: u32, mode: u32) -> SyscallOutcome<Fd> {
        if flags & O_ACCMODE == O_ACCMODE {
            return Err(SyscallError::invalid_argument(format!(
                "access mode bits {:#o}",
                flags & O_ACCMODE
            )));
        }
        let open_flags =
            OpenFlags::from_posix(flags).map_err(|e| SyscallError::invalid_argument(e.to_string()))?;
        let open_mode = OpenMode::new(mode);
        let process = self.process(pid)?;

        let mut object = self.files.vfs().open(path, open_flags, open_mode)?;

        let offset = if open_flags.append {
            let size = match object.stat() {
                Ok(meta) => meta.size,
                Err(e) => {
                    if let Err(close_err) = object.close() {
                        warn!(pid, error = %close_err, "Object close failed after stat error");
                    }
                    return Err(e.into());
                }
            };
            Offset::try_from(size).unwrap_or(Offset::MAX)
        } else {
            0
        };

        let record = OpenFile::new(&*path.to_string_lossy(), object, open_flags, open_mode, offset);

        let claimed = {
            let mut guard = process.fd_table().lock();
            if guard.is_closed() {
                // The process exited while the object was being opened
                Err((SyscallError::NoSuchProcess(pid), record))
            } else {
                match guard.allocate() {
                    None => Err((SyscallError::ProcessFileLimit, record)),
                    Some(fd) => match self.table().install(record) {
                        Ok(slot) => {
                            guard.set(fd, slot);
                            Ok((fd, slot))
                        }
                        Err(record) => Err((SyscallError::SystemFileLimit, record)),
                    },
                }
            }
        };

        match claimed {
            Ok((fd, slot)) => {
                info!(pid, fd, slot, path = %path.display(), flags, "Opened");
                Ok(fd)
            }
            Err((e, record)) => {
                debug!(pid, path = %path.display(), error = %e, "Open rejected, closing object");
                if let Err(close_err) = record.close_object() {
                    warn!(pid, error = %close_err, "Object close failed after rejected open");
                }
                Err(e)
            }
        }
    }

    /// Release `fd`
    ///
    /// The descriptor is cleared even when closing the object fails.
    pub fn close(&self, pid: Pid, fd: Fd) -> SyscallOutcome<()> {
        let process = self.process(pid)?;
        let released = {
            let mut guard = process.fd_table().lock();
            let slot = guard.validate(fd, self.table())?;
            guard.clear(fd);
            self.table().release(slot)
        };
        info!(pid, fd, last = released.is_some(), "Closed");
        close_released(released, pid, fd);
        Ok(())
    }

    /// Validate `fd` for reading and take a handle on its record
    pub(super) fn readable(&self, pid: Pid, fd: Fd) -> SyscallOutcome<Arc<OpenFile>> {
        let process = self.process(pid)?;
        let file = self.resolve(&process, fd)?;
        if !file.access().can_read() {
            return Err(SyscallError::BadDescriptor(fd));
        }
        Ok(file)
    }

    /// Read into `buf` at the record offset, advancing it by the count read
    pub fn read(&self, pid: Pid, fd: Fd, buf: &mut [u8]) -> SyscallOutcome<usize> {
        let file = self.readable(pid, fd)?;
        self.read_record(pid, fd, &file, buf)
    }

    /// Transfer from an already validated record
    pub(super) fn read_record(
        &self,
        pid: Pid,
        fd: Fd,
        file: &OpenFile,
        buf: &mut [u8],
    ) -> SyscallOutcome<usize> {
        let n = file
            .with_io(|object, offset| -> SyscallOutcome<usize> {
                let n = object.read_at(buf, *offset as u64)?;
                *offset += n as Offset;
                Ok(n)
            })
            .ok_or(SyscallError::BadDescriptor(fd))??;
        debug!(pid, fd, bytes = n, "Read");
        Ok(n)
    }

    /// Write `buf` at the record offset, advancing it by the count written
    pub fn write(&self, pid: Pid, fd: Fd, buf: &[u8]) -> SyscallOutcome<usize> {
        let process = self.process(pid)?;
        let file = self.resolve(&process, fd)?;
        if !file.access().can_write() {
            return Err(SyscallError::BadDescriptor(fd));
        }

        let n = file
            .with_io(|object, offset| -> SyscallOutcome<usize> {
                let n = object.write_at(buf, *offset as u64)?;
                *offset += n as Offset;
                Ok(n)
            })
            .ok_or(SyscallError::BadDescriptor(fd))??;
        debug!(pid, fd, bytes = n, "Wrote");
        Ok(n)
    }

    /// Reposition the record offset
    ///
    /// The result must land in `[0, size]`; otherwise the offset is left
    /// untouched and `EINVAL` returned.
    pub fn lseek(&self, pid: Pid, fd: Fd, pos: Offset, whence: i32) -> SyscallOutcome<Offset> {
        let whence = Whence::try_from(whence)?;
        let process = self.process(pid)?;
        let file = self.resolve(&process, fd)?;

        let new_offset = file
            .with_io(|object, offset| -> SyscallOutcome<Offset> {
                if !object.is_seekable() {
                    return Err(SyscallError::NotSeekable(fd));
                }
                let size = Offset::try_from(object.stat()?.size)
                    .map_err(|_| SyscallError::invalid_argument("object size exceeds offset range"))?;
                let base = match whence {
                    Whence::Set => 0,
                    Whence::Cur => *offset,
                    Whence::End => size,
                };
                let candidate = base
                    .checked_add(pos)
                    .ok_or_else(|| SyscallError::invalid_argument("offset overflow"))?;
                if candidate < 0 || candidate > size {
                    return Err(SyscallError::invalid_argument(format!(
                        "offset {} outside [0, {}]",
                        candidate, size
                    )));
                }
                *offset = candidate;
                Ok(candidate)
            })
            .ok_or(SyscallError::BadDescriptor(fd))??;
        debug!(pid, fd, offset = new_offset, ?whence, "Seeked");
        Ok(new_offset)
    }

    /// Make `newfd` share `oldfd`'s record
    ///
    /// A live `newfd` is implicitly closed first. The descriptor-table lock is
    /// held for the whole sequence.
    pub fn dup2(&self, pid: Pid, oldfd: Fd, newfd: Fd) -> SyscallOutcome<Fd> {
        let process = self.process(pid)?;
        let displaced = {
            let mut guard = process.fd_table().lock();
            if guard.is_closed() {
                return Err(SyscallError::NoSuchProcess(pid));
            }
            let slot = guard.validate(oldfd, self.table())?;
            if !guard.in_range(newfd) {
                return Err(SyscallError::BadDescriptor(newfd));
            }
            if oldfd == newfd {
                return Ok(newfd);
            }

            let displaced = guard
                .clear(newfd)
                .and_then(|previous| self.table().release(previous));
            if !self.table().retain(slot) {
                // Only a concurrent shutdown frees a slot we hold a reference to
                drop(guard);
                close_released(displaced, pid, newfd);
                return Err(SyscallError::BadDescriptor(oldfd));
            }
            guard.set(newfd, slot);
            displaced
        };

        info!(pid, oldfd, newfd, "Duplicated descriptor");
        close_released(displaced, pid, newfd);
        Ok(newfd)
    }
}
