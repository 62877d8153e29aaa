//! Core engine for classindex.
//!
//! This crate provides the language-agnostic indexing machinery:
//! - Declaration model and resolver traits
//! - Registration registry (explicit or marker-driven tracking)
//! - Traversal engine accumulating annotation, subclass and package memberships
//! - Index writer merging with pre-existing index files
//! - Documentation sidecar writer
//! - Resource stores (filesystem, in-memory)
//! - Configuration resolution, error types and JSON output types

pub mod config;
pub mod docs;
pub mod engine;
pub mod error;
pub mod model;
pub mod output;
pub mod paths;
pub mod registry;
pub mod store;
pub mod writer;
