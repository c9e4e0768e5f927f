/*!
 * Reference Count Tests
 * Conservation of references and object releases under random syscall sequences
 */

use ai_os_fdtable::core::limits::{O_CREAT, O_RDWR};
use ai_os_fdtable::{
    ConsoleDevice, FileSubsystem, FsConfig, MemFS, MountManager, ProcessManager, SyscallExecutor,
};
use proptest::prelude::*;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    Open(u8),
    Close(i32),
    Dup2(i32, i32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..4).prop_map(Op::Open),
        (0i32..8).prop_map(Op::Close),
        (0i32..8, 0i32..8).prop_map(|(a, b)| Op::Dup2(a, b)),
    ]
}

fn setup() -> (SyscallExecutor, MemFS, u32) {
    let vfs = MountManager::new();
    vfs.register_device("con:", Arc::new(ConsoleDevice::new())).unwrap();
    let mem = MemFS::new();
    vfs.mount("/tmp", Arc::new(mem.clone())).unwrap();

    let config = FsConfig {
        fd_max: 8,
        open_max: 6,
        ..FsConfig::default()
    };
    let files = Arc::new(FileSubsystem::init(config, Arc::new(vfs)).unwrap());
    let processes = ProcessManager::new(files);
    let pid = processes.create("prop").pid();
    (SyscallExecutor::new(processes), mem, pid)
}

proptest! {
    #[test]
    fn references_match_descriptors(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let (exec, mem, pid) = setup();
        let table = exec.files().table();
        let console_records = exec.files().std_streams().len();

        for op in ops {
            match op {
                Op::Open(n) => {
                    let path = format!("/tmp/f{}", n);
                    let _ = exec.open(pid, Path::new(&path), O_CREAT | O_RDWR, 0o644);
                }
                Op::Close(fd) => {
                    let _ = exec.close(pid, fd);
                }
                Op::Dup2(a, b) => {
                    let _ = exec.dup2(pid, a, b);
                }
            }

            let process = exec.processes().get(pid).unwrap();
            let refs: usize = (0..table.capacity()).filter_map(|slot| table.ref_count(slot)).sum();
            prop_assert_eq!(refs, process.fd_table().open_count() + console_records);
            prop_assert_eq!(
                mem.opened_count() - mem.closed_count(),
                table.live_count() - console_records
            );
        }

        // Every object created is released exactly once
        exec.processes().exit(pid).unwrap();
        prop_assert_eq!(mem.opened_count(), mem.closed_count());
        prop_assert_eq!(table.live_count(), console_records);
    }
}
