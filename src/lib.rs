//! nuibridge - request bridge for the game-server admin panel
//!
//! The admin panel ("NUI" panel) renders inside the game client's embedded
//! browser, or in a plain browser during development. Every page is driven by
//! named request/response calls to the host game-server process. This crate
//! provides the three pieces those pages share:
//!
//! - [`environment`]: classifies the context once at startup
//! - [`bridge`]: posts a named event with a JSON payload to the host, with
//!   timeout, fallback and cancellation
//! - [`poller`]: re-issues a call on a fixed cadence and republishes the
//!   result only when it changed
//!
//! ## Usage
//!
//! Native CLI against a local mock host:
//! ```bash
//! cargo run --features mock-host --bin nui-mock-host
//! cargo run --bin nuibridge -- --base-url http://127.0.0.1:3030 call getPlayers
//! ```
//!
//! NUI page build:
//! ```bash
//! cargo build --target wasm32-unknown-unknown --no-default-features --features web
//! ```

// Core modules (available on all platforms)
pub mod config;
pub mod constants;
pub mod envelope;
pub mod environment;
pub mod fingerprint;
pub mod types;

// Request bridge and typed endpoints
pub mod bridge;
pub mod events;

// Live-data polling and view state
pub mod poller;
pub mod view;

// Persisted preferences (theme)
pub mod preferences;

// Platform abstraction layer
pub mod platform;

// WASM-specific JavaScript bridge (host globals)
pub mod webshim;

// Dev-mode stand-in for the host process
#[cfg(feature = "mock-host")]
pub mod mock_host;

// Re-export commonly used types
pub use bridge::{BridgeError, FetchOptions, NuiBridge};
pub use config::{Config, Mode};
pub use environment::{Environment, HostSignals};
pub use poller::{LivePoller, PollEvent, PollHandle};
