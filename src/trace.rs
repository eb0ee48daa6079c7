//! Conditional tracing macros for instrumenting matrix-build and ICD-sweep
//! progress (zero-cost when the `tracing` feature is disabled).
//!
//! Reconstruction runs can take minutes; `orchestrator::build_system_matrix`
//! and `orchestrator::reconstruct` wrap their bodies in a `trace_span!` and
//! emit `trace_event!`s (`system_matrix_built`, `convergence_warning`,
//! `reconstruct_done`) at the points an operator watching `RUST_LOG` output
//! would want a timestamp. With the feature off, every one of these calls
//! compiles away entirely.

/// Opens a span around one orchestrator-level operation, e.g.
/// `trace_span!("reconstruct", nx = image.nx(), nz = image.nz())`.
///
/// With `tracing` enabled this is `tracing::info_span!`; disabled, it returns
/// a dummy guard so call sites don't need their own `#[cfg(...)]`.
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        tracing::info_span!($name $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        $crate::trace::NoopSpan
    };
}

/// Emits one named measurement, e.g.
/// `trace_event!("system_matrix_built", columns = matrix.n_columns())`.
///
/// With `tracing` enabled this calls `tracing::info!`; disabled, the field
/// expressions are still evaluated (so a call site can't silently break) but
/// their results are discarded rather than logged.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::info!(name: $name, $($key = $value),+)
    };
    ($name:expr) => {
        tracing::info!(name: $name)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
    ($name:expr) => {};
}

pub(crate) use trace_event;
pub(crate) use trace_span;

/// Stand-in for `tracing::span::EnteredSpan` when the `tracing` feature is
/// off, so `let _span = trace_span!(...).entered();` compiles either way in
/// `build_system_matrix`/`reconstruct` without a second code path.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Mimics `Span::entered()`.
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
