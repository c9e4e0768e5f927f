/*!
 * Core Types
 * Common types used across the kernel
 */

/// Process ID type
pub type Pid = u32;

/// File descriptor as seen by callers
///
/// Signed so that negative values coming through the syscall ABI can be
/// rejected with `EBADF` instead of wrapping.
pub type Fd = i32;

/// Index of a slot in the kernel-wide open-file table
pub type OfIndex = usize;

/// Byte offset inside an open file (`off_t`)
pub type Offset = i64;
