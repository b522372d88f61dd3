//! Logging macros that compile to nothing without the `tracing` feature

#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "routefetch", $($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => {
        ::tracing::warn!(target: "routefetch", $($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

pub(crate) use trace_debug;
pub(crate) use trace_warn;
