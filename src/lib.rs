//! classindex: compile-time annotation, subclass and package index generator.
//!
//! Walks compiled declarations round by round and writes sidecar index files
//! a runtime scanner can read instead of scanning a whole artifact.

// Core infrastructure - re-exported from classindex-core
pub use classindex_core::config;
pub use classindex_core::docs;
pub use classindex_core::engine;
pub use classindex_core::error;
pub use classindex_core::model;
pub use classindex_core::output;
pub use classindex_core::paths;
pub use classindex_core::registry;
pub use classindex_core::store;
pub use classindex_core::writer;

// Front door: manifest-driven host adapter
pub mod cli;
pub mod manifest;
