//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → Backend client → Route discovery → Capability table
//!     → Dispatcher → GatewayServer
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM / Ctrl-C / Shutdown::trigger → stop accepting → drain → exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The capability table is built once, before the listener serves traffic

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
pub use startup::{bootstrap, StartupError};
