//! Persistence and query layer for the recipe catalog
//!
//! The [`Store`] trait is the capability set the services program against.
//! [`PgStore`] is the production adapter backed by PostgreSQL and
//! [`MemoryStore`] is an in-memory adapter implementing the same contract
//! for tests.
//!
//! Every list and get operation returns denormalized records: foreign ids are
//! replaced by snapshots of the referenced user and author. Deletes are
//! guarded by the referential-integrity checks in [`integrity`].

pub mod deadline;
pub mod error;
pub mod integrity;
pub mod memory;
pub mod models;
pub mod pagination;
pub mod postgres;
mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use pagination::{FindOptions, Pagination, SortKey};
pub use postgres::PgStore;
pub use store::Store;
