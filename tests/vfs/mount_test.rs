/*!
 * Mount Tests
 * Routing of paths and device names through MountManager
 */

use std::path::Path;
use std::sync::Arc;

use ai_os_fdtable::vfs::traits::FileSystem;
use ai_os_fdtable::vfs::types::{FileType, OpenFlags, OpenMode, VfsError};
use ai_os_fdtable::vfs::{ConsoleDevice, MemFS, MountManager};

#[test]
fn test_paths_reach_their_mount() {
    let vfs = MountManager::new();
    let tmp = MemFS::new();
    let cache = MemFS::new();
    vfs.mount("/tmp", Arc::new(tmp.clone())).unwrap();
    vfs.mount("/cache", Arc::new(cache.clone())).unwrap();

    let flags = OpenFlags {
        create: true,
        ..OpenFlags::write_only()
    };
    let mut obj = vfs.open(Path::new("/cache/x"), flags, OpenMode::default()).unwrap();
    obj.write_at(b"cached", 0).unwrap();
    obj.close().unwrap();

    assert_eq!(cache.read_file(Path::new("/x")).unwrap(), b"cached");
    assert!(tmp.read_file(Path::new("/x")).is_err());
    assert_eq!(vfs.list_mounts().len(), 2);
}

#[test]
fn test_console_device_by_name() {
    let vfs = MountManager::new();
    let console = ConsoleDevice::new();
    vfs.register_device("con:", Arc::new(console.clone())).unwrap();

    let mut out = vfs.open(Path::new("con:"), OpenFlags::write_only(), OpenMode::default()).unwrap();
    assert!(!out.is_seekable());
    assert_eq!(out.stat().unwrap().file_type, FileType::CharDevice);
    assert_eq!(out.stat().unwrap().size, 0);
    out.write_at(b"line\n", 0).unwrap();
    assert_eq!(console.output(), b"line\n");

    let mut input = vfs.open(Path::new("con:"), OpenFlags::read_only(), OpenMode::default()).unwrap();
    let mut buf = [0u8; 4];
    assert_eq!(input.read_at(&mut buf, 0).unwrap(), 0);
    assert!(out.read_at(&mut buf, 0).is_err());
}

#[test]
fn test_unknown_device_and_bad_names() {
    let vfs = MountManager::new();
    assert!(matches!(
        vfs.open(Path::new("lpt:"), OpenFlags::write_only(), OpenMode::default()),
        Err(VfsError::NotFound(_))
    ));
    assert!(vfs.register_device("con", Arc::new(ConsoleDevice::new())).is_err());
    assert!(vfs.register_device(":", Arc::new(ConsoleDevice::new())).is_err());
}
