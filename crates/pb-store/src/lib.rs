//! # pb-store
//!
//! Durable persistence for the Pulseboard aggregate.
//!
//! The whole portal state is one [`AppState`] value persisted as one JSON
//! document. [`StateStore`] is the abstraction seam: the engine is handed a
//! boxed store and never knows whether it is talking to a file or to the
//! in-memory fake used in tests.
//!
//! ## Key components
//!
//! - [`StateStore`] — load/save trait for whole-aggregate persistence
//! - [`JsonStateStore`] — single JSON document on disk, atomic replace
//! - [`MemoryStateStore`] — in-memory fake for engine tests
//!
//! `load()` never fails on bad content: a missing or unparseable document
//! falls back to the seed aggregate, and documents written by older schema
//! versions are migrated forward (missing fields defaulted, then
//! re-persisted). `save()` failures, by contrast, always propagate.
//!
//! [`AppState`]: pb_model::AppState

pub mod error;
pub mod memory;
mod migrate;
pub mod paths;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStateStore;
pub use paths::default_state_path;
pub use store::{JsonStateStore, StateStore};
