//! In-memory backend for the Folio tenancy core.
//!
//! Implements the `folio-tenancy` storage ports over `parking_lot`
//! locks and `HashMap`s. Used by the test suites and by single-process
//! deployments; real deployments swap in a database-backed crate
//! implementing the same ports.

pub mod collection;
pub mod store;

pub use collection::MemoryCollection;
pub use store::MemoryStore;
