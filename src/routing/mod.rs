//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at setup):
//!     Route { name, pattern, defaults, constraints, is_static }
//!     → pattern.rs (template → anchored regex with named groups)
//!     → router.rs (append to RouteTable, insertion order = priority)
//!
//! Incoming Request (path):
//!     → router.rs (scan routes in order)
//!     → route.rs + matcher.rs (captures → defaults → controller/action/params)
//!     → Return: RouteData or no-match
//! ```
//!
//! # Design Decisions
//! - Routes compiled at setup, immutable while serving
//! - Placeholder grammar is fixed: `{name}`, optionally after a `/`
//! - Deterministic: same input always matches same route
//! - First match wins

pub mod matcher;
pub mod pattern;
pub mod route;
pub mod router;

pub use pattern::CompiledPattern;
pub use route::{Route, RouteData, RouteError};
pub use router::RouteTable;
