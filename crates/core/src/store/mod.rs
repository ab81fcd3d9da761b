//! Durable cycle store.
//!
//! The store owns the append-only log of cycle records: a JSON document on
//! disk as the single source of truth, mirrored by an in-memory cache that
//! is kept consistent after every append. The store is explicitly
//! constructed and explicitly passed; there is no ambient singleton.

pub mod container;
pub mod error;

pub use container::CycleStore;
pub use error::PersistenceError;
