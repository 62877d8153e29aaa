//! Resource store: where index files are read back from and written to.
//!
//! The host environment decides where build output lives and whether
//! previously generated resources can be read back at all. Reads report an
//! explicit [`ReadOutcome`] instead of an error so the writer can branch on
//! "missing", "unsupported" and "failed" without treating any of them as
//! fatal. Writes replace the whole resource.
//!
//! Two implementations are provided:
//! - [`FsResourceStore`]: rooted at a build-output directory, atomic writes
//! - [`MemoryResourceStore`]: in-memory, for embedding and tests

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use tempfile::Builder;
use tracing::debug;

use crate::error::{IndexError, IndexResult};

// ============================================================================
// Store Contract
// ============================================================================

/// Result of reading a resource.
#[derive(Debug)]
pub enum ReadOutcome {
    /// The resource exists; its full contents.
    Found(Vec<u8>),
    /// No resource at this path.
    NotFound,
    /// The host cannot read resources back.
    Unsupported,
    /// Reading failed for another reason.
    Failed(io::Error),
}

/// Storage for generated resources, rooted at a build-output location.
pub trait ResourceStore {
    /// Read a resource by relative path.
    fn read_resource(&self, path: &str) -> ReadOutcome;

    /// Create or truncate a resource and write `contents` to it.
    fn write_resource(&mut self, path: &str, contents: &[u8]) -> IndexResult<()>;
}

/// Reject absolute paths and paths that climb out of the output root.
pub fn validate_resource_path(path: &str) -> IndexResult<()> {
    let invalid = |reason: &str| IndexError::InvalidResourcePath {
        path: path.to_string(),
        reason: reason.to_string(),
    };
    if path.is_empty() {
        return Err(invalid("empty path"));
    }
    for component in Path::new(path).components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => return Err(invalid("parent directory component")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("path must be relative"))
            }
        }
    }
    Ok(())
}

// ============================================================================
// Filesystem Store
// ============================================================================

/// Resource store backed by a build-output directory.
#[derive(Debug, Clone)]
pub struct FsResourceStore {
    root: PathBuf,
}

impl FsResourceStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsResourceStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a resource.
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl ResourceStore for FsResourceStore {
    fn read_resource(&self, path: &str) -> ReadOutcome {
        if let Err(e) = validate_resource_path(path) {
            return ReadOutcome::Failed(io::Error::new(io::ErrorKind::InvalidInput, e.to_string()));
        }
        match fs::read(self.resolve(path)) {
            Ok(bytes) => ReadOutcome::Found(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => ReadOutcome::NotFound,
            Err(e) if e.kind() == io::ErrorKind::Unsupported => ReadOutcome::Unsupported,
            Err(e) => ReadOutcome::Failed(e),
        }
    }

    fn write_resource(&mut self, path: &str, contents: &[u8]) -> IndexResult<()> {
        validate_resource_path(path)?;
        let target = self.resolve(path);
        let parent = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        fs::create_dir_all(&parent).map_err(|e| IndexError::io(path, e))?;

        // Temp file in the target directory so the final rename stays on one filesystem.
        let mut temp = temp_file_builder()
            .tempfile_in(&parent)
            .map_err(|e| IndexError::io(path, e))?;
        // A replaced resource keeps its mode, even if another module wrote it.
        if let Some(existing) = fs::metadata(&target).ok().filter(|m| m.is_file()) {
            temp.as_file()
                .set_permissions(existing.permissions())
                .map_err(|e| IndexError::io(path, e))?;
        }
        temp.write_all(contents)
            .and_then(|_| temp.flush())
            .map_err(|e| IndexError::io(path, e))?;
        temp.persist(&target)
            .map_err(|e| IndexError::io(path, e.error))?;

        debug!(path, bytes = contents.len(), "wrote resource");
        Ok(())
    }
}

/// Temp files default to owner-only; new resources get the mode `fs::write` would give them.
#[cfg(unix)]
fn temp_file_builder() -> Builder<'static, 'static> {
    use std::os::unix::fs::PermissionsExt;

    let mut builder = Builder::new();
    builder.permissions(fs::Permissions::from_mode(0o666));
    builder
}

#[cfg(not(unix))]
fn temp_file_builder() -> Builder<'static, 'static> {
    Builder::new()
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// In-memory resource store.
///
/// Tracks how often each path was written, can simulate hosts that cannot
/// read resources back, and can be told to fail writes under a prefix.
#[derive(Debug, Clone)]
pub struct MemoryResourceStore {
    resources: BTreeMap<String, Vec<u8>>,
    write_counts: BTreeMap<String, usize>,
    read_supported: bool,
    failing_prefix: Option<String>,
}

impl Default for MemoryResourceStore {
    fn default() -> Self {
        MemoryResourceStore {
            resources: BTreeMap::new(),
            write_counts: BTreeMap::new(),
            read_supported: true,
            failing_prefix: None,
        }
    }
}

impl MemoryResourceStore {
    pub fn new() -> Self {
        MemoryResourceStore::default()
    }

    /// A store whose reads always report [`ReadOutcome::Unsupported`].
    pub fn without_read_support() -> Self {
        MemoryResourceStore {
            read_supported: false,
            ..MemoryResourceStore::default()
        }
    }

    /// Make every write to a path starting with `prefix` fail.
    pub fn fail_writes_under(mut self, prefix: impl Into<String>) -> Self {
        self.failing_prefix = Some(prefix.into());
        self
    }

    /// Seed a resource without counting it as a write.
    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.resources.insert(path.into(), contents.into());
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.resources.get(path).map(Vec::as_slice)
    }

    /// Contents as UTF-8 text.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Number of writes issued to `path`.
    pub fn write_count(&self, path: &str) -> usize {
        self.write_counts.get(path).copied().unwrap_or(0)
    }

    /// All stored paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }
}

impl ResourceStore for MemoryResourceStore {
    fn read_resource(&self, path: &str) -> ReadOutcome {
        if !self.read_supported {
            return ReadOutcome::Unsupported;
        }
        match self.resources.get(path) {
            Some(bytes) => ReadOutcome::Found(bytes.clone()),
            None => ReadOutcome::NotFound,
        }
    }

    fn write_resource(&mut self, path: &str, contents: &[u8]) -> IndexResult<()> {
        validate_resource_path(path)?;
        if let Some(prefix) = &self.failing_prefix {
            if path.starts_with(prefix.as_str()) {
                return Err(IndexError::io(
                    path,
                    io::Error::new(io::ErrorKind::PermissionDenied, "write rejected"),
                ));
            }
        }
        self.resources.insert(path.to_string(), contents.to_vec());
        *self.write_counts.entry(path.to_string()).or_insert(0) += 1;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
