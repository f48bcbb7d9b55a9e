#![forbid(unsafe_code)]

//! Logging shim.
//!
//! With the `tracing` feature the standard `tracing` macros are re-exported
//! here and at the crate root. Without it, macros of the same names expand
//! to nothing, so call sites never need their own `cfg` guards.
//!
//! The `tracing-json` feature adds [`init_json_logging`] for binaries and
//! harnesses that want machine-readable output.

#[cfg(feature = "tracing")]
pub use tracing::{debug, error, info, trace, warn};

/// No-op stand-ins used when the `tracing` feature is disabled.
#[cfg(not(feature = "tracing"))]
mod noop {
    #[macro_export]
    #[doc(hidden)]
    macro_rules! __gxr_noop_log {
        ($($arg:tt)*) => {{}};
    }

    pub use crate::__gxr_noop_log as debug;
    pub use crate::__gxr_noop_log as error;
    pub use crate::__gxr_noop_log as info;
    pub use crate::__gxr_noop_log as trace;
    pub use crate::__gxr_noop_log as warn;
}

#[cfg(not(feature = "tracing"))]
pub use noop::{debug, error, info, trace, warn};

/// Install a global JSON subscriber filtered by `filter`
/// (an `EnvFilter` directive such as `"gxr_runtime=debug"`).
///
/// `RUST_LOG`, when set, takes precedence over `filter`.
/// Returns `false` if a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging(filter: &str) -> bool {
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter)
        .with_current_span(false)
        .try_init()
        .is_ok()
}
