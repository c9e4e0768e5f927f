/*!
 * VFS Types
 * Shared types for file-object operations
 */

mod errors;
mod file_type;
mod metadata;
mod open_flags;
mod permissions;

pub use errors::{VfsError, VfsResult};
pub use file_type::FileType;
pub use metadata::Metadata;
pub use open_flags::{AccessMode, OpenFlags, OpenMode};
pub use permissions::Permissions;
