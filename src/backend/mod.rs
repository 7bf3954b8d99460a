//! Backend subsystem.
//!
//! A single bounded client talks to the memory-layer service. It is built
//! once by startup and shared by the dispatcher and the native passthrough.

pub mod client;

pub use client::{BackendClient, BackendResponse};
