/*!
 * Open-File Record
 * One opened file object plus its offset and open-time mode
 */

use parking_lot::Mutex;
use std::fmt;

use crate::core::data_structures::InlineString;
use crate::core::types::Offset;
use crate::vfs::{AccessMode, FileObject, OpenFlags, OpenMode, VfsResult};

/// Object and offset, guarded together
///
/// Holding this lock across *offset read → I/O → offset write* serialises
/// transfers through every descriptor aliasing the record.
struct FileIo {
    object: Option<Box<dyn FileObject>>,
    offset: Offset,
}

/// Kernel-wide open-file record
///
/// Shared by every descriptor-table entry pointing at its slot. The reference
/// count lives in [`super::OpenFileTable`]; the record itself only guarantees
/// that its object is closed at most once.
pub struct OpenFile {
    path: InlineString,
    flags: OpenFlags,
    mode: OpenMode,
    io: Mutex<FileIo>,
}

impl OpenFile {
    /// Wrap a freshly opened object, starting at `offset`
    pub fn new(
        path: impl Into<InlineString>,
        object: Box<dyn FileObject>,
        flags: OpenFlags,
        mode: OpenMode,
        offset: Offset,
    ) -> Self {
        Self {
            path: path.into(),
            flags,
            mode,
            io: Mutex::new(FileIo {
                object: Some(object),
                offset,
            }),
        }
    }

    #[inline]
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    #[inline]
    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    #[inline]
    pub fn access(&self) -> AccessMode {
        self.flags.access
    }

    /// Current offset
    pub fn offset(&self) -> Offset {
        self.io.lock().offset
    }

    /// Whether the object is still open
    pub fn is_open(&self) -> bool {
        self.io.lock().object.is_some()
    }

    /// Run `f` with exclusive access to the object and the offset
    ///
    /// Returns `None` once the object has been closed.
    pub fn with_io<T>(&self, f: impl FnOnce(&mut dyn FileObject, &mut Offset) -> T) -> Option<T> {
        let mut io = self.io.lock();
        let FileIo { object, offset } = &mut *io;
        let object = object.as_deref_mut()?;
        Some(f(object, offset))
    }

    /// Close the object
    ///
    /// The object is taken out before closing, so whichever caller comes first
    /// closes it and every later call is a no-op.
    pub fn close_object(&self) -> VfsResult<()> {
        let object = self.io.lock().object.take();
        match object {
            Some(mut object) => object.close(),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for OpenFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let io = self.io.lock();
        f.debug_struct("OpenFile")
            .field("path", &self.path)
            .field("flags", &self.flags)
            .field("mode", &self.mode)
            .field("offset", &io.offset)
            .field("open", &io.object.is_some())
            .finish()
    }
}
