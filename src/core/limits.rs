/*!
 * System Limits and Constants
 *
 * Default capacities and ABI constants for the file-descriptor layer.
 * Runtime overrides live in `core::config::FsConfig`.
 */

// =============================================================================
// TABLE CAPACITIES
// =============================================================================

/// Descriptor table capacity per process
/// Valid descriptors are `0..FD_MAX`
pub const FD_MAX: usize = 128;

/// Kernel-wide open-file table capacity
/// Valid slot indices are `0..OPEN_MAX`
pub const OPEN_MAX: usize = 128;

/// Largest single `read` transfer through the kernel bounce buffer
///
/// Longer requests return a short count.
pub const MAX_TRANSFER: usize = 1 << 20;

// =============================================================================
// CONSOLE
// =============================================================================

/// Device name the standard streams are bound to
pub const CONSOLE_DEVICE: &str = "con:";

/// Permission bits used when opening the console records
pub const CONSOLE_MODE: u32 = 0o664;

// =============================================================================
// OPEN FLAGS [LINUX-COMPAT]
// =============================================================================

pub const O_RDONLY: u32 = 0o0;
pub const O_WRONLY: u32 = 0o1;
pub const O_RDWR: u32 = 0o2;
/// Mask selecting the access-mode bits
pub const O_ACCMODE: u32 = 0o3;
pub const O_CREAT: u32 = 0o100;
pub const O_EXCL: u32 = 0o200;
pub const O_TRUNC: u32 = 0o1000;
pub const O_APPEND: u32 = 0o2000;

// =============================================================================
// SEEK WHENCE [LINUX-COMPAT]
// =============================================================================

pub const SEEK_SET: i32 = 0;
pub const SEEK_CUR: i32 = 1;
pub const SEEK_END: i32 = 2;

// =============================================================================
// ERRNO VALUES [LINUX-COMPAT]
// =============================================================================

pub mod errno {
    pub const ENOENT: i32 = 2;
    pub const ESRCH: i32 = 3;
    pub const EIO: i32 = 5;
    pub const EBADF: i32 = 9;
    pub const ENOMEM: i32 = 12;
    pub const EACCES: i32 = 13;
    pub const EEXIST: i32 = 17;
    pub const ENOTDIR: i32 = 20;
    pub const EISDIR: i32 = 21;
    pub const EINVAL: i32 = 22;
    pub const ENFILE: i32 = 23;
    pub const EMFILE: i32 = 24;
    pub const EFBIG: i32 = 27;
    pub const ENOSPC: i32 = 28;
    pub const ESPIPE: i32 = 29;
    pub const EROFS: i32 = 30;
    pub const ENOTSUP: i32 = 95;
}
