/*!
 * Console Device
 * Character device backing the standard streams
 */

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::traits::{FileObject, FileSystem};
use super::types::*;

#[derive(Debug, Default)]
struct ConsoleState {
    output: Mutex<Vec<u8>>,
    input: Mutex<VecDeque<u8>>,
    open_objects: AtomicUsize,
}

/// Console device
///
/// Writes are appended to a captured output buffer (and optionally echoed to
/// the host stdout); reads drain a queue fed with [`ConsoleDevice::push_input`].
/// The device is not seekable and always reports size 0.
#[derive(Debug, Clone, Default)]
pub struct ConsoleDevice {
    state: Arc<ConsoleState>,
    echo: bool,
}

impl ConsoleDevice {
    /// Console that only captures output
    pub fn new() -> Self {
        Self::default()
    }

    /// Console that also echoes output to the host stdout
    pub fn with_echo() -> Self {
        Self {
            state: Arc::default(),
            echo: true,
        }
    }

    /// Queue bytes for subsequent reads
    pub fn push_input(&self, data: &[u8]) {
        self.state.input.lock().extend(data);
    }

    /// Everything written so far
    pub fn output(&self) -> Vec<u8> {
        self.state.output.lock().clone()
    }

    /// Drain the captured output
    pub fn take_output(&self) -> Vec<u8> {
        std::mem::take(&mut *self.state.output.lock())
    }

    /// Console objects currently open
    pub fn open_objects(&self) -> usize {
        self.state.open_objects.load(Ordering::SeqCst)
    }
}

impl FileSystem for ConsoleDevice {
    fn open(&self, path: &Path, flags: OpenFlags, _mode: OpenMode) -> VfsResult<Box<dyn FileObject>> {
        if flags.create_new {
            return Err(VfsError::AlreadyExists(path.display().to_string()));
        }
        self.state.open_objects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ConsoleFile {
            device: self.clone(),
            access: flags.access,
            closed: false,
        }))
    }

    fn exists(&self, _path: &Path) -> bool {
        true
    }

    fn name(&self) -> &str {
        "console"
    }
}

struct ConsoleFile {
    device: ConsoleDevice,
    access: AccessMode,
    closed: bool,
}

impl ConsoleFile {
    fn check(&self, allowed: bool, op: &str) -> VfsResult<()> {
        if self.closed {
            return Err(VfsError::IoError("console object already closed".into()));
        }
        if !allowed {
            return Err(VfsError::PermissionDenied(format!("console not opened for {}", op)));
        }
        Ok(())
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.device.state.open_objects.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl FileObject for ConsoleFile {
    fn read_at(&mut self, buf: &mut [u8], _offset: u64) -> VfsResult<usize> {
        self.check(self.access.can_read(), "reading")?;
        let mut input = self.device.state.input.lock();
        let n = buf.len().min(input.len());
        for (slot, byte) in buf.iter_mut().zip(input.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write_at(&mut self, buf: &[u8], _offset: u64) -> VfsResult<usize> {
        self.check(self.access.can_write(), "writing")?;
        self.device.state.output.lock().extend_from_slice(buf);
        if self.device.echo {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(buf)
                .and_then(|_| stdout.flush())
                .map_err(|e| VfsError::from_io(e, "con:"))?;
        }
        Ok(buf.len())
    }

    fn stat(&self) -> VfsResult<Metadata> {
        Ok(Metadata {
            file_type: FileType::CharDevice,
            size: 0,
            permissions: Permissions::new(0o664),
        })
    }

    fn is_seekable(&self) -> bool {
        false
    }

    fn close(&mut self) -> VfsResult<()> {
        self.check(true, "closing")?;
        self.release();
        Ok(())
    }
}

impl Drop for ConsoleFile {
    fn drop(&mut self) {
        self.release();
    }
}
