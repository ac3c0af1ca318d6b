//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Logging/metrics → Build service → Listen
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → stop accepting → drain in-flight callbacks → exit
//! ```

pub mod signals;

pub use signals::shutdown_signal;
