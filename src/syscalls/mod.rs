/*!
 * Syscalls Module
 * Descriptor system calls and their dispatcher
 */

mod executor;
mod file;
pub mod types;

// Re-export public API
pub use executor::SyscallExecutor;
pub use types::{Syscall, SyscallError, SyscallOutcome, SyscallResult, Whence};
