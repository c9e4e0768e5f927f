/*!
 * AI-OS File Descriptor Layer
 * Per-process descriptor tables over a kernel-wide open-file table
 */

pub mod core;
pub mod fs;
pub mod monitoring;
pub mod process;
pub mod syscalls;
pub mod vfs;

// Re-exports
pub use crate::core::config::{FsConfig, StdStream};
pub use crate::core::errors::{KernelError, KernelResult, ProcessError};
pub use crate::core::types::{Fd, OfIndex, Offset, Pid};
pub use fs::{FdTable, FileSubsystem, OpenFile, OpenFileTable};
pub use monitoring::init_tracing;
pub use process::{Process, ProcessManager};
pub use syscalls::{Syscall, SyscallError, SyscallExecutor, SyscallResult};
pub use vfs::{ConsoleDevice, FileObject, FileSystem, LocalFS, MemFS, MountManager, VfsError};
