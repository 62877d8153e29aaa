//! Documentation sidecars: a type's doc comment persisted next to the indexes.
//!
//! A type can be reached through several tracked keys that all request
//! documentation. The writer remembers every type it has handled this
//! session and issues at most one write per type.

use std::collections::HashSet;

use tracing::debug;

use crate::error::IndexResult;
use crate::model::Declaration;
use crate::paths::javadoc_path;
use crate::store::ResourceStore;

/// What [`DocSidecarWriter::store_documentation`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocOutcome {
    /// The comment was written.
    Written,
    /// The type has no doc comment; nothing written, but the type is now marked.
    NoComment,
    /// The type was already handled this session.
    AlreadyStored,
}

/// Session-scoped documentation sidecar writer.
#[derive(Debug, Default)]
pub struct DocSidecarWriter {
    stored: HashSet<String>,
}

impl DocSidecarWriter {
    pub fn new() -> Self {
        DocSidecarWriter::default()
    }

    /// Persist the doc comment of `decl`, once per session.
    ///
    /// The type is marked as handled before the write is attempted, so a
    /// failed write is not retried later in the same session.
    pub fn store_documentation<D, S>(&mut self, decl: &D, store: &mut S) -> IndexResult<DocOutcome>
    where
        D: Declaration + ?Sized,
        S: ResourceStore + ?Sized,
    {
        let name = decl.qualified_name();
        if !self.stored.insert(name.to_string()) {
            return Ok(DocOutcome::AlreadyStored);
        }

        let Some(comment) = decl.doc_comment() else {
            return Ok(DocOutcome::NoComment);
        };

        store.write_resource(&javadoc_path(name), comment.as_bytes())?;
        debug!(type_name = name, "stored documentation sidecar");
        Ok(DocOutcome::Written)
    }

    /// Whether `qualified_name` was already handled this session.
    pub fn is_stored(&self, qualified_name: &str) -> bool {
        self.stored.contains(qualified_name)
    }

    pub fn clear(&mut self) {
        self.stored.clear();
    }
}
