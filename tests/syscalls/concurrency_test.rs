/*!
 * Concurrency Tests
 * Threads of one process sharing a descriptor table
 */

use ai_os_fdtable::core::limits::{O_CREAT, O_RDWR, SEEK_CUR};
use ai_os_fdtable::{
    ConsoleDevice, FileSubsystem, FsConfig, MemFS, MountManager, ProcessManager, SyscallExecutor,
};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::thread;

fn setup() -> (SyscallExecutor, MemFS) {
    let vfs = MountManager::new();
    vfs.register_device("con:", Arc::new(ConsoleDevice::new())).unwrap();
    let mem = MemFS::new();
    vfs.mount("/tmp", Arc::new(mem.clone())).unwrap();
    let files = Arc::new(FileSubsystem::init(FsConfig::default(), Arc::new(vfs)).unwrap());
    (SyscallExecutor::new(ProcessManager::new(files)), mem)
}

#[test]
fn test_concurrent_opens_get_distinct_descriptors() {
    let (exec, _mem) = setup();
    let pid = exec.processes().create("threads").pid();

    let fds: Vec<i32> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let exec = &exec;
                s.spawn(move || {
                    (0..20)
                        .map(|i| {
                            let path = format!("/tmp/t{}_{}", t, i);
                            exec.open(pid, Path::new(&path), O_CREAT | O_RDWR, 0o644).unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
    });

    let unique: HashSet<i32> = fds.iter().copied().collect();
    assert_eq!(unique.len(), 80);
    let process = exec.processes().get(pid).unwrap();
    assert_eq!(process.fd_table().open_count(), 83);
    assert_eq!(exec.files().table().live_count(), 83);
}

#[test]
fn test_aliased_writes_never_lose_offset_updates() {
    let (exec, mem) = setup();
    let pid = exec.processes().create("writers").pid();
    let fd = exec
        .open(pid, Path::new("/tmp/counter"), O_CREAT | O_RDWR, 0o644)
        .unwrap();
    for alias in 10..14 {
        exec.dup2(pid, fd, alias).unwrap();
    }

    thread::scope(|s| {
        for alias in 10..14 {
            let exec = &exec;
            s.spawn(move || {
                for _ in 0..250 {
                    assert_eq!(exec.write(pid, alias, b"x"), Ok(1));
                }
            });
        }
    });

    assert_eq!(exec.lseek(pid, fd, 0, SEEK_CUR), Ok(1000));
    assert_eq!(mem.read_file(Path::new("/counter")).unwrap().len(), 1000);
}

#[test]
fn test_close_racing_dup2_releases_once() {
    let (exec, mem) = setup();
    let pid = exec.processes().create("racers").pid();

    for round in 0..50 {
        let path = format!("/tmp/r{}", round);
        let fd = exec.open(pid, Path::new(&path), O_CREAT | O_RDWR, 0o644).unwrap();
        thread::scope(|s| {
            let exec = &exec;
            s.spawn(move || {
                let _ = exec.dup2(pid, fd, 50);
            });
            s.spawn(move || {
                let _ = exec.close(pid, fd);
            });
        });
        let _ = exec.close(pid, 50);
    }

    assert_eq!(exec.processes().get(pid).unwrap().fd_table().open_count(), 3);
    assert_eq!(mem.opened_count(), 50);
    assert_eq!(mem.closed_count(), 50);
}
