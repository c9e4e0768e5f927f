/*!
 * Monitoring
 * Structured logging and syscall tracing
 */

mod tracer;

pub use tracer::{init_tracing, span_syscall, SyscallSpan};
