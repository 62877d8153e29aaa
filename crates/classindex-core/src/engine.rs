//! Indexing engine: batch traversal and end-of-session finalization.
//!
//! A session is one [`ClassIndexer`] instance driven by the host:
//!
//! 1. [`ClassIndexer::process_batch`] once per round of new top-level
//!    declarations. Each root contributes to three membership mappings:
//!    annotation → types, supertype → types, package → simple names.
//! 2. [`ClassIndexer::finalize`] once no more rounds will arrive. Every
//!    non-empty key is merged with its on-disk index and rewritten.
//!
//! # Traversal
//!
//! For each root `D`:
//! - every annotation directly on `D` is classified and, if tracked, `D` is
//!   recorded under it;
//! - the full supertype closure of `D` is walked depth-first. For each
//!   supertype `S`, `D` is recorded under `S` if `S` is tracked, and under every
//!   tracked annotation on `S` that is marked "inherited";
//! - `D` is recorded under its package if the package is tracked.
//!
//! Each supertype is visited once per root, so diamond-shaped interface
//! hierarchies are walked in linear time. A root is never recorded under its
//! own name.
//!
//! # Unresolved References
//!
//! A supertype or annotation name the resolver cannot find is skipped with a
//! warning and counted in [`SessionStats::unresolved_references`]. Explicit
//! registrations still match such a name, since they need no declaration.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::docs::{DocOutcome, DocSidecarWriter};
use crate::error::IndexResult;
use crate::model::{Declaration, DeclarationResolver, MarkerKind};
use crate::registry::{IndexKind, Registry, Tracking};
use crate::store::ResourceStore;
use crate::writer::{write_index, WrittenIndex};

// ============================================================================
// Membership Mapping
// ============================================================================

/// Key → deduplicated member entries, both in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Membership {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl Membership {
    /// Record `entry` under `key`. Returns false if it was already present.
    pub fn record(&mut self, key: &str, entry: &str) -> bool {
        self.entries
            .entry(key.to_string())
            .or_default()
            .insert(entry.to_string())
    }

    pub fn get(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str, entry: &str) -> bool {
        self.get(key).is_some_and(|members| members.contains(entry))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(BTreeSet::is_empty)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ============================================================================
// Session Reporting
// ============================================================================

/// Counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub rounds: usize,
    pub roots_processed: usize,
    pub unresolved_references: usize,
    pub docs_written: usize,
}

/// Every index file written by one [`ClassIndexer::finalize`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FinalizeReport {
    pub indexes: Vec<WrittenIndex>,
}

impl FinalizeReport {
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.indexes.iter().map(|w| w.path.as_str())
    }
}

// ============================================================================
// Engine
// ============================================================================

/// One indexing session over a resource store.
#[derive(Debug)]
pub struct ClassIndexer<S> {
    registry: Registry,
    store: S,
    annotated: Membership,
    subclasses: Membership,
    packages: Membership,
    docs: DocSidecarWriter,
    stats: SessionStats,
    last_report: Option<FinalizeReport>,
}

impl<S: ResourceStore> ClassIndexer<S> {
    /// Start a session. The registry is frozen from here on.
    pub fn new(registry: Registry, store: S) -> Self {
        ClassIndexer {
            registry,
            store,
            annotated: Membership::default(),
            subclasses: Membership::default(),
            packages: Membership::default(),
            docs: DocSidecarWriter::new(),
            stats: SessionStats::default(),
            last_report: None,
        }
    }

    /// Annotation types this indexer wants to see: all of them.
    pub fn supported_annotation_types() -> &'static [&'static str] {
        &["*"]
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Report of the most recent finalization, if any.
    pub fn last_report(&self) -> Option<&FinalizeReport> {
        self.last_report.as_ref()
    }

    /// The accumulated mapping for one kind.
    pub fn membership(&self, kind: IndexKind) -> &Membership {
        match kind {
            IndexKind::Annotated => &self.annotated,
            IndexKind::Subclasses => &self.subclasses,
            IndexKind::Package => &self.packages,
        }
    }

    /// Clear all session state so the instance can serve an independent run.
    pub fn reset(&mut self) {
        self.annotated.clear();
        self.subclasses.clear();
        self.packages.clear();
        self.docs.clear();
        self.stats = SessionStats::default();
        self.last_report = None;
    }

    /// Host entry point for one round.
    ///
    /// Processes `roots`, finalizes when `processing_over` is set, and
    /// always returns `false`: the indexer only observes declarations and
    /// never claims them from other consumers.
    pub fn process<'a, R, I>(
        &mut self,
        resolver: &R,
        roots: I,
        processing_over: bool,
    ) -> IndexResult<bool>
    where
        R: DeclarationResolver,
        R::Decl: 'a,
        I: IntoIterator<Item = &'a R::Decl>,
    {
        self.process_batch(resolver, roots)?;
        if processing_over {
            self.finalize()?;
        }
        Ok(false)
    }

    /// Accumulate memberships for one batch of root declarations.
    pub fn process_batch<'a, R, I>(&mut self, resolver: &R, roots: I) -> IndexResult<()>
    where
        R: DeclarationResolver,
        R::Decl: 'a,
        I: IntoIterator<Item = &'a R::Decl>,
    {
        self.stats.rounds += 1;
        for root in roots {
            self.index_root(resolver, root)?;
            self.stats.roots_processed += 1;
        }
        Ok(())
    }

    /// Merge every non-empty mapping with the store and write it back.
    ///
    /// Safe to call repeatedly: a second call reads back exactly what the
    /// first wrote and writes the same union again.
    pub fn finalize(&mut self) -> IndexResult<FinalizeReport> {
        let ClassIndexer {
            store,
            annotated,
            subclasses,
            packages,
            ..
        } = self;

        let mut report = FinalizeReport::default();
        for kind in IndexKind::ALL {
            let mapping: &Membership = match kind {
                IndexKind::Annotated => &*annotated,
                IndexKind::Subclasses => &*subclasses,
                IndexKind::Package => &*packages,
            };
            for (key, members) in mapping.iter() {
                if members.is_empty() {
                    continue;
                }
                report
                    .indexes
                    .push(write_index(&mut *store, kind, key, members)?);
            }
        }

        self.last_report = Some(report.clone());
        Ok(report)
    }

    // ------------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------------

    fn index_root<R>(&mut self, resolver: &R, root: &R::Decl) -> IndexResult<()>
    where
        R: DeclarationResolver,
    {
        for annotation in root.direct_annotations() {
            self.store_annotation(resolver, annotation, root)?;
        }

        let mut visited = HashSet::new();
        self.index_supertypes(resolver, root, root, &mut visited)?;

        let package = root.package_name();
        let marker = resolver.package_marker(package, IndexKind::Package.marker_kind());
        let tracking = self.registry.classify(IndexKind::Package, package, marker);
        self.record(IndexKind::Package, package, root, tracking)
    }

    fn index_supertypes<'r, R>(
        &mut self,
        resolver: &'r R,
        root: &R::Decl,
        element: &R::Decl,
        visited: &mut HashSet<&'r str>,
    ) -> IndexResult<()>
    where
        R: DeclarationResolver,
    {
        for name in element.direct_supertypes() {
            let Some(supertype) = resolver.resolve_type(name) else {
                self.note_unresolved("supertype", name, root);
                let tracking = self.registry.classify(IndexKind::Subclasses, name, None);
                self.record(IndexKind::Subclasses, name, root, tracking)?;
                continue;
            };
            if !visited.insert(supertype.qualified_name()) {
                continue;
            }

            let marker = supertype.marker(MarkerKind::IndexSubclasses);
            let tracking = self.registry.classify(IndexKind::Subclasses, name, marker);
            self.record(IndexKind::Subclasses, name, root, tracking)?;

            for annotation in supertype.direct_annotations() {
                self.store_inherited_annotation(resolver, annotation, root)?;
            }

            self.index_supertypes(resolver, root, supertype, visited)?;
        }
        Ok(())
    }

    fn store_annotation<R>(&mut self, resolver: &R, name: &str, root: &R::Decl) -> IndexResult<()>
    where
        R: DeclarationResolver,
    {
        let marker = match resolver.resolve_type(name) {
            Some(decl) => decl.marker(MarkerKind::IndexAnnotated),
            None => {
                self.note_unresolved("annotation", name, root);
                None
            }
        };
        let tracking = self.registry.classify(IndexKind::Annotated, name, marker);
        self.record(IndexKind::Annotated, name, root, tracking)
    }

    /// Annotation found on a supertype: only counts when marked "inherited".
    fn store_inherited_annotation<R>(
        &mut self,
        resolver: &R,
        name: &str,
        root: &R::Decl,
    ) -> IndexResult<()>
    where
        R: DeclarationResolver,
    {
        let Some(decl) = resolver.resolve_type(name) else {
            self.note_unresolved("annotation", name, root);
            return Ok(());
        };
        if !decl.is_inherited_annotation() {
            return Ok(());
        }
        let marker = decl.marker(MarkerKind::IndexAnnotated);
        let tracking = self.registry.classify(IndexKind::Annotated, name, marker);
        self.record(IndexKind::Annotated, name, root, tracking)
    }

    fn record<D>(&mut self, kind: IndexKind, key: &str, root: &D, tracking: Tracking) -> IndexResult<()>
    where
        D: Declaration + ?Sized,
    {
        if !tracking.is_tracked() || key == root.qualified_name() {
            return Ok(());
        }

        let entry = match kind {
            IndexKind::Package => root.simple_name(),
            IndexKind::Annotated | IndexKind::Subclasses => root.qualified_name(),
        };
        let mapping = match kind {
            IndexKind::Annotated => &mut self.annotated,
            IndexKind::Subclasses => &mut self.subclasses,
            IndexKind::Package => &mut self.packages,
        };
        if mapping.record(key, entry) {
            debug!(%kind, key, entry, "recorded member");
        }

        if tracking.store_docs()
            && self.docs.store_documentation(root, &mut self.store)? == DocOutcome::Written
        {
            self.stats.docs_written += 1;
        }
        Ok(())
    }

    fn note_unresolved<D>(&mut self, what: &str, name: &str, root: &D)
    where
        D: Declaration + ?Sized,
    {
        self.stats.unresolved_references += 1;
        warn!(
            reference = name,
            kind = what,
            root = root.qualified_name(),
            "unresolved reference, skipping"
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
