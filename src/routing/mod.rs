//! Routing subsystem: from backend routes to the capability table.
//!
//! # Data Flow
//! ```text
//! Route source (catalog | config endpoints | OpenAPI)
//!     → discovery.rs (build RouteDescriptor list, tag sensitive paths)
//!     → classifier.rs (Excluded | Action | Resource | TemplatedResource)
//!     → table.rs (assign names, freeze as immutable CapabilityTable)
//!
//! Per request:
//!     capability name or resource URI
//!     → table.rs lookup / matcher.rs template capture
//!     → matched CapabilityEntry or explicit NotFound
//! ```
//!
//! # Design Decisions
//! - Table built at startup, immutable at runtime
//! - No regex in the lookup path (exact names, segment matching)
//! - Deterministic: same route list always yields the same table

pub mod catalog;
pub mod classifier;
pub mod descriptor;
pub mod discovery;
pub mod matcher;
pub mod table;

pub use classifier::{classify, classify_route, CapabilityKind, Classification};
pub use descriptor::{HttpMethod, RouteDescriptor, SafetyTag};
pub use matcher::{PathMatcher, PathTemplate, SensitivePrefixMatcher};
pub use table::{CapabilityEntry, CapabilitySummary, CapabilityTable};
