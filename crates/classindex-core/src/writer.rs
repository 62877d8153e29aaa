//! Index file writer: merge-on-read, then full overwrite.
//!
//! Two artifacts built separately may each have written a partial index for
//! the same key before being packaged together, and a previous run may have
//! left entries in the build output. Before writing, the prior contents of
//! the resource are read back and unioned with the session's members, so
//! the rewritten file always subsumes what was there.
//!
//! Reads never fail the session. Writes always do.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::IndexResult;
use crate::paths::index_path;
use crate::registry::IndexKind;
use crate::store::{ReadOutcome, ResourceStore};

/// One index file written during finalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenIndex {
    pub kind: IndexKind,
    pub key: String,
    pub path: String,
    /// Total entries in the written file.
    pub entries: usize,
    /// Entries that came only from the pre-existing file.
    pub carried_over: usize,
}

/// Parse newline-delimited index contents. Blank lines and `\r` are dropped.
pub fn parse_entries(bytes: &[u8]) -> BTreeSet<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render entries one per line, each terminated by `\n`, in iteration order.
pub fn render_entries<'a>(entries: impl IntoIterator<Item = &'a String>) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(entry);
        out.push('\n');
    }
    out
}

/// Prior contents of an index resource; every failure mode reads as empty.
pub fn read_existing_entries<S>(store: &S, path: &str) -> BTreeSet<String>
where
    S: ResourceStore + ?Sized,
{
    match store.read_resource(path) {
        ReadOutcome::Found(bytes) => parse_entries(&bytes),
        ReadOutcome::NotFound => BTreeSet::new(),
        ReadOutcome::Unsupported => {
            debug!(path, "store cannot read back resources, skipping merge");
            BTreeSet::new()
        }
        ReadOutcome::Failed(e) => {
            warn!(path, error = %e, "failed to read existing index, treating as empty");
            BTreeSet::new()
        }
    }
}

/// Union `members` with the existing resource for `key` and write the result.
pub fn write_index<S>(
    store: &mut S,
    kind: IndexKind,
    key: &str,
    members: &BTreeSet<String>,
) -> IndexResult<WrittenIndex>
where
    S: ResourceStore + ?Sized,
{
    let path = index_path(kind, key);
    let existing = read_existing_entries(store, &path);
    let carried_over = existing.difference(members).count();

    let mut merged = existing;
    merged.extend(members.iter().cloned());

    store.write_resource(&path, render_entries(&merged).as_bytes())?;
    info!(
        %kind,
        key,
        path = %path,
        entries = merged.len(),
        carried_over,
        "wrote index"
    );

    Ok(WrittenIndex {
        kind,
        key: key.to_string(),
        path,
        entries: merged.len(),
        carried_over,
    })
}
