/*!
 * File Descriptor Subsystem
 * Two-level indirection from per-process descriptors to shared open-file records
 *
 * Lock order is fixed: descriptor table, then open-file table, then the
 * record's I/O lock. Objects are closed only after table locks are released.
 */

pub mod fd_table;
pub mod open_file;
pub mod open_file_table;
pub mod subsystem;

pub use fd_table::{FdTable, FdTableGuard};
pub use open_file::OpenFile;
pub use open_file_table::OpenFileTable;
pub use subsystem::FileSubsystem;
