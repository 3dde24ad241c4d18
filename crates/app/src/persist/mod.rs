//! Durable persistence for the client state.
//!
//! # Architecture
//!
//! The store holds the whole state in memory; this module keeps the durable
//! subset of it (session and order slices) in a [`Storage`] backend.
//! [`rehydrate`] runs once at startup and turns whatever was saved into the
//! store's initial state, and [`spawn_persistor`] starts a write-behind task
//! that mirrors every later change back out. Snapshots are versioned; an
//! unreadable or mismatched snapshot is discarded, never migrated.

mod persistor;
mod snapshot;
mod storage;

pub use persistor::{rehydrate, spawn_persistor};
pub(crate) use persistor::write_snapshot;
pub use snapshot::{PersistedAuth, PersistedOrder, PersistedState, ROOT_KEY, SCHEMA_VERSION};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
