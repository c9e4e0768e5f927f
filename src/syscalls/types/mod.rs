/*!
 * Syscall Types Module
 * Defines syscall enum, errors, results, and helper types
 */

mod errors;
mod results;
mod syscall;

// Re-export all public types
pub use errors::{SyscallError, SyscallOutcome};
pub use results::SyscallResult;
pub use syscall::{Syscall, Whence};
