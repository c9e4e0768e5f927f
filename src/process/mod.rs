/*!
 * Process Module
 * Processes and the descriptor tables they own
 */

pub mod manager;
pub mod types;

pub use manager::ProcessManager;
pub use types::Process;
