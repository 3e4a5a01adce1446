//! Logging hooks for the matching stages.
//!
//! Calibration, timeline and refinement report through these macros. The
//! `tracing` feature routes them to the `tracing` crate; otherwise the field
//! values are only borrowed and nothing is recorded.

/// Span around one stage such as `initialize_scale` or `refine`.
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

/// Stage outcome: chosen width, confirmed boundary, range counts.
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
        $(let _ = &$value;)+
    };
    ($name:expr) => {};
}

/// Per-frame score, logged at debug level.
#[cfg(feature = "tracing")]
macro_rules! trace_frame {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::debug!(name: $name, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_frame {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        $(let _ = &$value;)+
    };
}

pub(crate) use trace_event;
pub(crate) use trace_frame;
pub(crate) use trace_span;

/// Guard returned by `trace_span!` without the `tracing` feature.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Keeps `trace_span!(..).entered()` call sites feature-agnostic.
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
