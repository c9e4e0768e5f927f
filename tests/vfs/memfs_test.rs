/*!
 * MemFS Tests
 * File objects backed by the in-memory filesystem
 */

use std::path::Path;

use ai_os_fdtable::vfs::traits::FileSystem;
use ai_os_fdtable::vfs::types::{FileType, OpenFlags, OpenMode, VfsError};
use ai_os_fdtable::vfs::memory::MemFS;

#[test]
fn test_memfs_positional_io() {
    let fs = MemFS::new();
    let flags = OpenFlags {
        create: true,
        ..OpenFlags::read_write()
    };
    let mut obj = fs.open(Path::new("/test.txt"), flags, OpenMode::default()).unwrap();

    assert_eq!(obj.write_at(b"hello world", 0).unwrap(), 11);
    assert_eq!(obj.write_at(b"W", 6).unwrap(), 1);

    let mut buf = [0u8; 32];
    let n = obj.read_at(&mut buf, 0).unwrap();
    assert_eq!(&buf[..n], b"hello World");
    assert_eq!(obj.read_at(&mut buf, 11).unwrap(), 0);

    let meta = obj.stat().unwrap();
    assert_eq!(meta.file_type, FileType::File);
    assert_eq!(meta.size, 11);
    assert!(obj.is_seekable());
    obj.close().unwrap();

    assert_eq!(fs.read_file(Path::new("/test.txt")).unwrap(), b"hello World");
}

#[test]
fn test_capacity_limit() {
    let fs = MemFS::with_capacity(8);
    let flags = OpenFlags {
        create: true,
        ..OpenFlags::write_only()
    };
    let mut obj = fs.open(Path::new("/big"), flags, OpenMode::default()).unwrap();
    assert_eq!(obj.write_at(b"12345678", 0).unwrap(), 8);
    assert!(matches!(obj.write_at(b"9", 8), Err(VfsError::OutOfSpace)));
    obj.close().unwrap();
}

#[test]
fn test_release_counted_once() {
    let fs = MemFS::new();
    fs.write_file(Path::new("/f"), b"x").unwrap();

    let mut closed = fs.open(Path::new("/f"), OpenFlags::read_only(), OpenMode::default()).unwrap();
    closed.close().unwrap();
    let dropped = fs.open(Path::new("/f"), OpenFlags::read_only(), OpenMode::default()).unwrap();
    drop(dropped);

    assert_eq!(fs.opened_count(), 2);
    assert_eq!(fs.closed_count(), 2);
}

#[test]
fn test_delete_keeps_open_objects_working() {
    let fs = MemFS::new();
    fs.write_file(Path::new("/gone"), b"still here").unwrap();
    let mut obj = fs.open(Path::new("/gone"), OpenFlags::read_only(), OpenMode::default()).unwrap();
    fs.delete(Path::new("/gone")).unwrap();

    assert!(!fs.exists(Path::new("/gone")));
    let mut buf = [0u8; 16];
    let n = obj.read_at(&mut buf, 0).unwrap();
    assert_eq!(&buf[..n], b"still here");
}
