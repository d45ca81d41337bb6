//! Process-local persistence adapters.
//!
//! A single [`MemoryStore`] implements every persistence port of the domain.
//! When opened on a data directory it loads one JSON snapshot file per table
//! and rewrites the affected files after each mutation.
//!
//! # Architecture
//!
//! - **Thin adapters**: the port implementations only translate between
//!   rows and domain types. No business logic resides here.
//! - **Internal models**: snapshot row structs (`models.rs`) are internal
//!   implementation details, never exposed to the domain layer.
//! - **Row-level atomicity**: every port call takes the table lock once;
//!   cross-call sequences are the caller's to coordinate.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use propvest::outbound::persistence::MemoryStore;
//!
//! let store = MemoryStore::open(Path::new("data"))?;
//! # Ok::<(), propvest::outbound::persistence::SnapshotError>(())
//! ```

mod memory_repositories;
mod memory_store;
mod models;
mod snapshot;

pub use memory_store::MemoryStore;
pub use snapshot::SnapshotError;

#[cfg(test)]
mod tests;
