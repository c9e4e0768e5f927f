/*!
 * Virtual File System Module
 * Pluggable file-object layer consumed by the descriptor tables
 */

pub mod console;
pub mod local;
pub mod memory;
pub mod mount;
pub mod traits;
pub mod types;

// Re-exports
pub use console::ConsoleDevice;
pub use local::LocalFS;
pub use memory::MemFS;
pub use mount::MountManager;
pub use traits::{FileObject, FileSystem};
pub use types::{
    AccessMode, FileType, Metadata, OpenFlags, OpenMode, Permissions, VfsError, VfsResult,
};
