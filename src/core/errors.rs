/*!
 * Error Types
 * Kernel-level error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::config::ConfigError;
use super::types::Pid;

// Re-export subsystem errors
pub use crate::syscalls::types::SyscallError;
pub use crate::vfs::VfsError;

/// Process registry errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProcessError {
    #[error("Process {0} not found")]
    #[diagnostic(
        code(process::not_found),
        help("The process may have exited or never existed. Check PID validity.")
    )]
    NotFound(Pid),

    #[error("Process {0} already exists")]
    #[diagnostic(
        code(process::already_exists),
        help("Each PID owns exactly one descriptor table. Exit the old process first.")
    )]
    AlreadyExists(Pid),
}

/// Unified kernel error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum KernelError {
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(kernel::config),
        help("Check KERNEL_FD_MAX, KERNEL_OPEN_MAX and the standard stream layout.")
    )]
    Config(#[from] ConfigError),

    #[error("VFS error: {0}")]
    #[diagnostic(
        code(kernel::vfs),
        help("The file-object layer rejected the request. Check mounts and devices.")
    )]
    Vfs(#[from] VfsError),

    #[error("Syscall error: {0}")]
    #[diagnostic(code(kernel::syscall))]
    Syscall(#[from] SyscallError),

    #[error("Process error: {0}")]
    #[diagnostic(transparent)]
    Process(#[from] ProcessError),
}

/// Kernel result type
pub type KernelResult<T> = Result<T, KernelError>;
