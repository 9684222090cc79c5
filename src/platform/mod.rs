//! Platform abstraction (timers, task spawning, logging).
//!
//! The bridge and poller are written against these helpers so the same code
//! runs on tokio natively and on the browser event loop inside the NUI page.

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        mod runtime_wasm;
        pub use runtime_wasm::{init_logging, sleep, spawn, timeout};
    } else {
        mod runtime_native;
        pub use runtime_native::{init_logging, sleep, spawn, timeout};
    }
}

/// A bounded future did not finish before its deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Elapsed;

impl std::fmt::Display for Elapsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "deadline elapsed")
    }
}

impl std::error::Error for Elapsed {}
