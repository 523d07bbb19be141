//! Span and event macros for the detection and verification pipeline.
//!
//! `detect` opens one span for the whole cascade and one per stage
//! (`proposal`, `refine_coarse`, `refine_fine`, `refine_landmarks`); each
//! stage ends with an event carrying its surviving candidate count. The
//! similarity solver reports its iteration count and final loss. The embedder
//! reports feature length; the verifier reports which image had no face, or
//! the final similarity. Without the `tracing` feature every call site
//! compiles away.

/// Create an info-level span for a detection stage or alignment call.
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

/// Emit an info-level event, typically a candidate count after a stage.
///
/// Without the `tracing` feature the values are still evaluated so call sites
/// do not trigger unused-variable warnings.
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

/// Stand-in span guard used when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Mirrors `Span::entered()`.
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
