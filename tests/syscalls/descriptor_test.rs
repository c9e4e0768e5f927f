/*!
 * Descriptor Syscall Tests
 * open/close/read/write/lseek/dup2 semantics through the executor
 */

use ai_os_fdtable::core::limits::{errno, O_CREAT, O_RDONLY, O_RDWR, O_TRUNC, SEEK_CUR, SEEK_END, SEEK_SET};
use ai_os_fdtable::vfs::{Metadata, OpenFlags, OpenMode, VfsResult};
use ai_os_fdtable::{
    ConsoleDevice, FileObject, FileSubsystem, FileSystem, FsConfig, MemFS, MountManager, Pid,
    ProcessManager, SyscallError, SyscallExecutor, VfsError,
};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;

struct Fixture {
    exec: SyscallExecutor,
    console: ConsoleDevice,
    mem: MemFS,
    pid: Pid,
}

fn fixture() -> Fixture {
    let vfs = MountManager::new();
    let console = ConsoleDevice::new();
    vfs.register_device("con:", Arc::new(console.clone())).unwrap();
    let mem = MemFS::new();
    vfs.mount("/tmp", Arc::new(mem.clone())).unwrap();
    let files = Arc::new(FileSubsystem::init(FsConfig::default(), Arc::new(vfs)).unwrap());
    let processes = ProcessManager::new(files);
    let pid = processes.create("test").pid();
    Fixture {
        exec: SyscallExecutor::new(processes),
        console,
        mem,
        pid,
    }
}

#[test]
fn test_a_txt_scenario() {
    let f = fixture();
    let fd = f
        .exec
        .open(f.pid, Path::new("/tmp/a.txt"), O_CREAT | O_RDWR, 0o644)
        .unwrap();
    assert_eq!(fd, 3);

    assert_eq!(f.exec.write(f.pid, fd, b"0123456789"), Ok(10));
    assert_eq!(f.exec.lseek(f.pid, fd, 0, SEEK_SET), Ok(0));

    let mut buf = [0u8; 10];
    assert_eq!(f.exec.read(f.pid, fd, &mut buf), Ok(10));
    assert_eq!(&buf, b"0123456789");

    assert_eq!(f.exec.close(f.pid, fd), Ok(()));
    assert_eq!(f.exec.read(f.pid, fd, &mut buf), Err(SyscallError::BadDescriptor(3)));
    assert_eq!(f.mem.closed_count(), 1);
}

#[test]
fn test_close_then_use_is_ebadf() {
    let f = fixture();
    let fd = f.exec.open(f.pid, Path::new("/tmp/x"), O_CREAT | O_RDWR, 0o644).unwrap();
    f.exec.close(f.pid, fd).unwrap();

    let mut buf = [0u8; 1];
    assert_eq!(f.exec.close(f.pid, fd).unwrap_err().errno(), errno::EBADF);
    assert_eq!(f.exec.read(f.pid, fd, &mut buf).unwrap_err().errno(), errno::EBADF);
    assert_eq!(f.exec.write(f.pid, fd, b"x").unwrap_err().errno(), errno::EBADF);
    assert_eq!(f.exec.lseek(f.pid, fd, 0, SEEK_SET).unwrap_err().errno(), errno::EBADF);
    assert_eq!(f.exec.dup2(f.pid, fd, 10).unwrap_err().errno(), errno::EBADF);
}

#[test]
fn test_lowest_free_descriptor_reused() {
    let f = fixture();
    let a = f.exec.open(f.pid, Path::new("/tmp/a"), O_CREAT | O_RDWR, 0o644).unwrap();
    let b = f.exec.open(f.pid, Path::new("/tmp/b"), O_CREAT | O_RDWR, 0o644).unwrap();
    assert_eq!((a, b), (3, 4));

    f.exec.close(f.pid, 0).unwrap();
    let c = f.exec.open(f.pid, Path::new("/tmp/c"), O_CREAT | O_RDWR, 0o644).unwrap();
    assert_eq!(c, 0);
}

#[test]
fn test_offsets_advance_by_transfer_count() {
    let f = fixture();
    f.mem.write_file(Path::new("/short"), b"abc").unwrap();
    let fd = f.exec.open(f.pid, Path::new("/tmp/short"), O_RDONLY, 0).unwrap();

    // Short read advances by what was actually read
    let mut buf = [0u8; 8];
    assert_eq!(f.exec.read(f.pid, fd, &mut buf), Ok(3));
    assert_eq!(f.exec.lseek(f.pid, fd, 0, SEEK_CUR), Ok(3));
    assert_eq!(f.exec.read(f.pid, fd, &mut buf), Ok(0));
    assert_eq!(f.exec.lseek(f.pid, fd, 0, SEEK_CUR), Ok(3));
}

#[test]
fn test_two_opens_have_independent_offsets() {
    let f = fixture();
    let w = f.exec.open(f.pid, Path::new("/tmp/shared"), O_CREAT | O_RDWR | O_TRUNC, 0o644).unwrap();
    let r = f.exec.open(f.pid, Path::new("/tmp/shared"), O_RDONLY, 0).unwrap();

    f.exec.write(f.pid, w, b"hello").unwrap();
    let mut buf = [0u8; 5];
    assert_eq!(f.exec.read(f.pid, r, &mut buf), Ok(5));
    assert_eq!(&buf, b"hello");
    assert_eq!(f.exec.lseek(f.pid, w, 0, SEEK_CUR), Ok(5));
    assert_eq!(f.exec.lseek(f.pid, r, 0, SEEK_CUR), Ok(5));
}

#[test]
fn test_seek_bounds() {
    let f = fixture();
    let fd = f.exec.open(f.pid, Path::new("/tmp/s"), O_CREAT | O_RDWR, 0o644).unwrap();
    f.exec.write(f.pid, fd, b"12345678").unwrap();

    assert_eq!(f.exec.lseek(f.pid, fd, 0, SEEK_END), Ok(8));
    assert_eq!(f.exec.lseek(f.pid, fd, 2, SEEK_SET), Ok(2));

    for (pos, whence) in [(-3, SEEK_CUR), (9, SEEK_SET), (1, SEEK_END), (-9, SEEK_END)] {
        assert_eq!(f.exec.lseek(f.pid, fd, pos, whence).unwrap_err().errno(), errno::EINVAL);
        assert_eq!(f.exec.lseek(f.pid, fd, 0, SEEK_CUR), Ok(2));
    }
    assert_eq!(f.exec.lseek(f.pid, fd, 0, 42).unwrap_err().errno(), errno::EINVAL);
}

#[test]
fn test_console_not_seekable() {
    let f = fixture();
    assert_eq!(f.exec.lseek(f.pid, 1, 0, SEEK_CUR), Err(SyscallError::NotSeekable(1)));
    assert_eq!(f.exec.lseek(f.pid, 0, 0, SEEK_SET).unwrap_err().errno(), errno::ESPIPE);
}

#[test]
fn test_dup2_self_changes_nothing() {
    let f = fixture();
    let fd = f.exec.open(f.pid, Path::new("/tmp/d"), O_CREAT | O_RDWR, 0o644).unwrap();
    let table = f.exec.files().table();
    let process = f.exec.processes().get(f.pid).unwrap();
    let slot = process.fd_table().slot_of(fd).unwrap();

    assert_eq!(f.exec.dup2(f.pid, fd, fd), Ok(fd));
    assert_eq!(table.ref_count(slot), Some(1));
    assert_eq!(process.fd_table().open_count(), 4);
}

#[test]
fn test_dup2_alias_survives_close() {
    let f = fixture();
    let a = f.exec.open(f.pid, Path::new("/tmp/alias"), O_CREAT | O_RDWR, 0o644).unwrap();
    assert_eq!(f.exec.dup2(f.pid, a, 7), Ok(7));

    // Shared offset: a write through one alias moves the other
    f.exec.write(f.pid, a, b"abc").unwrap();
    assert_eq!(f.exec.lseek(f.pid, 7, 0, SEEK_CUR), Ok(3));

    f.exec.close(f.pid, a).unwrap();
    assert_eq!(f.mem.closed_count(), 0);
    assert_eq!(f.exec.write(f.pid, 7, b"def"), Ok(3));

    f.exec.close(f.pid, 7).unwrap();
    assert_eq!(f.mem.closed_count(), 1);
    assert_eq!(f.mem.read_file(Path::new("/alias")).unwrap(), b"abcdef");
}

#[test]
fn test_dup2_onto_alias_of_same_record() {
    let f = fixture();
    let a = f.exec.open(f.pid, Path::new("/tmp/same"), O_CREAT | O_RDWR, 0o644).unwrap();
    f.exec.dup2(f.pid, a, 6).unwrap();
    f.exec.dup2(f.pid, a, 6).unwrap();

    let process = f.exec.processes().get(f.pid).unwrap();
    let slot = process.fd_table().slot_of(a).unwrap();
    assert_eq!(f.exec.files().table().ref_count(slot), Some(2));
    assert_eq!(f.mem.closed_count(), 0);
}

#[test]
fn test_dup2_stdout_equivalence() {
    let f = fixture();
    assert_eq!(f.exec.dup2(f.pid, 1, 5), Ok(5));
    f.exec.write(f.pid, 5, b"via five;").unwrap();
    f.exec.write(f.pid, 1, b"via one").unwrap();
    assert_eq!(f.console.take_output(), b"via five;via one");

    f.exec.close(f.pid, 1).unwrap();
    assert_eq!(f.exec.write(f.pid, 5, b"!"), Ok(1));
    assert_eq!(f.console.output(), b"!");
}

/// MemFS whose objects report an error from `close` after releasing
struct FailingCloseFS {
    inner: MemFS,
}

struct FailingClose {
    inner: Box<dyn FileObject>,
}

impl FileObject for FailingClose {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> VfsResult<usize> {
        self.inner.read_at(buf, offset)
    }

    fn write_at(&mut self, buf: &[u8], offset: u64) -> VfsResult<usize> {
        self.inner.write_at(buf, offset)
    }

    fn stat(&self) -> VfsResult<Metadata> {
        self.inner.stat()
    }

    fn is_seekable(&self) -> bool {
        self.inner.is_seekable()
    }

    fn close(&mut self) -> VfsResult<()> {
        self.inner.close()?;
        Err(VfsError::IoError("flush failed".into()))
    }
}

impl FileSystem for FailingCloseFS {
    fn open(&self, path: &Path, flags: OpenFlags, mode: OpenMode) -> VfsResult<Box<dyn FileObject>> {
        let inner = self.inner.open(path, flags, mode)?;
        Ok(Box::new(FailingClose { inner }))
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn name(&self) -> &str {
        "failing-close"
    }
}

#[test]
fn test_failing_object_close_still_frees_descriptor() {
    let mem = MemFS::new();
    let vfs = MountManager::new();
    vfs.register_device("con:", Arc::new(ConsoleDevice::new())).unwrap();
    vfs.mount("/bad", Arc::new(FailingCloseFS { inner: mem.clone() })).unwrap();
    let files = Arc::new(FileSubsystem::init(FsConfig::default(), Arc::new(vfs)).unwrap());
    let exec = SyscallExecutor::new(ProcessManager::new(files));
    let pid = exec.processes().create("flaky").pid();

    let fd = exec.open(pid, Path::new("/bad/f"), O_CREAT | O_RDWR, 0o644).unwrap();
    let slot = exec.processes().get(pid).unwrap().fd_table().slot_of(fd).unwrap();
    assert_eq!(exec.write(pid, fd, b"data"), Ok(4));

    // The close error is logged, not returned, and the slot is gone
    assert_eq!(exec.close(pid, fd), Ok(()));
    let mut buf = [0u8; 4];
    assert_eq!(exec.read(pid, fd, &mut buf), Err(SyscallError::BadDescriptor(fd)));
    assert_eq!(exec.files().table().ref_count(slot), None);
    assert_eq!(exec.files().table().live_count(), 3);
    assert_eq!(mem.closed_count(), 1);

    // Same for the implicit close inside dup2
    let fd = exec.open(pid, Path::new("/bad/f"), O_RDWR, 0).unwrap();
    assert_eq!(exec.dup2(pid, 1, fd), Ok(fd));
    assert_eq!(mem.closed_count(), 2);
    assert_eq!(exec.files().table().live_count(), 3);
    assert_eq!(exec.close(pid, 99), Err(SyscallError::BadDescriptor(99)));
}
