/*!
 * Structured Tracing
 * Subscriber set-up and per-syscall spans using the tracing crate
 */

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info, span, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::core::types::Pid;
use crate::syscalls::SyscallResult;

static NEXT_TRACE_ID: AtomicU64 = AtomicU64::new(1);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - KERNEL_TRACE_JSON: Enable JSON output (default: false)
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("KERNEL_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Structured tracing initialized");
    }
    installed
}

/// Span covering one dispatched syscall
pub struct SyscallSpan {
    span: Span,
    start: Instant,
    trace_id: u64,
}

impl SyscallSpan {
    pub fn new(syscall_name: &'static str, pid: Pid) -> Self {
        let trace_id = NEXT_TRACE_ID.fetch_add(1, Ordering::Relaxed);
        let span = span!(
            Level::DEBUG,
            "syscall",
            trace_id,
            syscall = syscall_name,
            pid,
            duration_us = tracing::field::Empty,
            result = tracing::field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
            trace_id,
        }
    }

    #[inline]
    pub fn trace_id(&self) -> u64 {
        self.trace_id
    }

    /// Underlying span, for running work inside it
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Record the raw return value and elapsed time
    pub fn finish(self, result: &SyscallResult) {
        let duration = self.start.elapsed();
        self.span.record("duration_us", duration.as_micros() as u64);
        self.span.record("result", result.to_raw());
        let _entered = self.span.enter();
        debug!(
            trace_id = self.trace_id,
            raw = result.to_raw(),
            duration_us = duration.as_micros() as u64,
            "syscall completed"
        );
    }
}

/// Convenience constructor matching the other span helpers
pub fn span_syscall(syscall_name: &'static str, pid: Pid) -> SyscallSpan {
    SyscallSpan::new(syscall_name, pid)
}
