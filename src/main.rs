/*!
 * AI-OS File Descriptor Layer - Demo Entry Point
 *
 * Boots the file subsystem, runs a short descriptor session for one
 * process and shuts everything down again.
 */

use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use ai_os_fdtable::core::limits::{O_CREAT, O_RDWR, SEEK_SET};
use ai_os_fdtable::{
    init_tracing, ConsoleDevice, FileSubsystem, FsConfig, MemFS, MountManager, ProcessManager,
    Syscall, SyscallExecutor,
};

fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("File descriptor layer starting...");
    let config = FsConfig::from_env().context("loading configuration")?;

    info!("Initializing VFS with console device and /tmp...");
    let vfs = MountManager::new();
    vfs.register_device(config.console_device.as_str(), Arc::new(ConsoleDevice::with_echo()))?;
    vfs.mount("/tmp", Arc::new(MemFS::with_capacity(16 * 1024 * 1024)))?;

    let files = FileSubsystem::init(config, Arc::new(vfs))
        .map_err(|e| anyhow::anyhow!("{:?}", miette::Report::new(e)))?;
    let files = Arc::new(files);
    let processes = ProcessManager::new(Arc::clone(&files));
    let executor = SyscallExecutor::new(processes.clone());
    let pid = processes.create("demo").pid();

    let session = [
        Syscall::Open {
            path: "/tmp/a.txt".into(),
            flags: O_CREAT | O_RDWR,
            mode: 0o644,
        },
        Syscall::Write {
            fd: 3,
            data: b"0123456789".to_vec(),
        },
        Syscall::Lseek {
            fd: 3,
            offset: 0,
            whence: SEEK_SET,
        },
        Syscall::Read { fd: 3, len: 10 },
        Syscall::Dup2 { oldfd: 1, newfd: 5 },
        Syscall::Write {
            fd: 5,
            data: b"hello from fd 5\n".to_vec(),
        },
        Syscall::Close { fd: 3 },
        Syscall::Read { fd: 3, len: 10 },
    ];

    for call in session {
        let name = call.name();
        let result = executor.execute(pid, call);
        info!(pid, syscall = name, raw = result.to_raw(), "Syscall returned");
        if let Some(data) = result.data() {
            info!(bytes = %String::from_utf8_lossy(data), "Read back");
        }
    }

    processes.exit(pid)?;
    info!(live = files.table().live_count(), "Process exited");
    let closed = files.shutdown();
    info!(closed, "Kernel shut down");
    Ok(())
}
