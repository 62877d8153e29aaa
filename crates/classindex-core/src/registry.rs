//! Registration registry: which annotations, supertypes and packages are tracked.
//!
//! A registry starts in annotation-driven mode, where a key is tracked when
//! its own declaration carries the matching marker. The first explicit
//! registration of any kind switches the whole registry to explicit mode and
//! disables marker discovery for the session.
//!
//! The registry is moved into the engine when a session starts; from then on
//! it is only reachable by shared reference.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{IndexMarker, MarkerKind};

// ============================================================================
// Index Kind
// ============================================================================

/// The three kinds of tracked key, one membership mapping each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    Annotated,
    Subclasses,
    Package,
}

impl IndexKind {
    /// All kinds, in the order finalization writes them.
    pub const ALL: [IndexKind; 3] = [
        IndexKind::Subclasses,
        IndexKind::Annotated,
        IndexKind::Package,
    ];

    /// The marker that makes a key of this kind tracked in annotation-driven mode.
    pub fn marker_kind(self) -> MarkerKind {
        match self {
            IndexKind::Annotated => MarkerKind::IndexAnnotated,
            IndexKind::Subclasses | IndexKind::Package => MarkerKind::IndexSubclasses,
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Annotated => write!(f, "annotated"),
            IndexKind::Subclasses => write!(f, "subclasses"),
            IndexKind::Package => write!(f, "package"),
        }
    }
}

// ============================================================================
// Tracking Decision
// ============================================================================

/// Outcome of classifying a candidate key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracking {
    /// Explicitly registered by name.
    Explicit,
    /// Discovered through a marker in annotation-driven mode.
    Marked { store_docs: bool },
    /// Not tracked.
    Untracked,
}

impl Tracking {
    pub fn is_tracked(self) -> bool {
        !matches!(self, Tracking::Untracked)
    }

    /// Whether members recorded under this key get a documentation sidecar.
    pub fn store_docs(self) -> bool {
        matches!(self, Tracking::Marked { store_docs: true })
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Set of tracked keys plus the explicit/annotation-driven mode flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    annotation_driven: bool,
    annotations: BTreeSet<String>,
    superclasses: BTreeSet<String>,
    packages: BTreeSet<String>,
}

impl Default for Registry {
    fn default() -> Self {
        Registry::annotation_driven()
    }
}

impl Registry {
    /// A registry relying purely on marker discovery.
    pub fn annotation_driven() -> Self {
        Registry {
            annotation_driven: true,
            annotations: BTreeSet::new(),
            superclasses: BTreeSet::new(),
            packages: BTreeSet::new(),
        }
    }

    /// A registry tracking the given annotations.
    ///
    /// An empty list leaves the registry annotation-driven.
    pub fn with_annotations<I, S>(annotations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Registry::annotation_driven();
        registry.register_annotations(annotations);
        registry
    }

    pub fn register_annotation(&mut self, name: impl Into<String>) {
        self.annotations.insert(name.into());
        self.annotation_driven = false;
    }

    pub fn register_superclass(&mut self, name: impl Into<String>) {
        self.superclasses.insert(name.into());
        self.annotation_driven = false;
    }

    pub fn register_package(&mut self, name: impl Into<String>) {
        self.packages.insert(name.into());
        self.annotation_driven = false;
    }

    /// Register several annotations. An empty iterator changes nothing.
    pub fn register_annotations<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.register_annotation(name);
        }
    }

    /// Register several superclasses or interfaces. An empty iterator changes nothing.
    pub fn register_superclasses<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.register_superclass(name);
        }
    }

    /// Register several packages. An empty iterator changes nothing.
    pub fn register_packages<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.register_package(name);
        }
    }

    /// True until the first explicit registration.
    pub fn is_annotation_driven(&self) -> bool {
        self.annotation_driven
    }

    /// Whether `name` is explicitly registered for `kind`.
    pub fn is_tracked(&self, kind: IndexKind, name: &str) -> bool {
        self.keys(kind).contains(name)
    }

    /// The explicitly registered keys of one kind.
    pub fn keys(&self, kind: IndexKind) -> &BTreeSet<String> {
        match kind {
            IndexKind::Annotated => &self.annotations,
            IndexKind::Subclasses => &self.superclasses,
            IndexKind::Package => &self.packages,
        }
    }

    /// Marker lookup honoring the mode: always `None` in explicit mode.
    pub fn is_marked(&self, marker: Option<IndexMarker>) -> Option<IndexMarker> {
        if self.annotation_driven {
            marker
        } else {
            None
        }
    }

    /// Classify a candidate key.
    ///
    /// `marker` is the marker of `kind.marker_kind()` carried by the key's own
    /// declaration, or `None` when the declaration could not be resolved.
    pub fn classify(&self, kind: IndexKind, name: &str, marker: Option<IndexMarker>) -> Tracking {
        if self.is_tracked(kind, name) {
            return Tracking::Explicit;
        }
        match self.is_marked(marker) {
            Some(m) => Tracking::Marked {
                store_docs: m.store_docs,
            },
            None => Tracking::Untracked,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod mode {
        use super::*;

        #[test]
        fn default_is_annotation_driven() {
            let registry = Registry::default();
            assert!(registry.is_annotation_driven());
        }

        #[test]
        fn any_explicit_registration_disables_markers() {
            let mut registry = Registry::annotation_driven();
            registry.register_package("com.example");
            assert!(!registry.is_annotation_driven());
            assert_eq!(
                registry.classify(
                    IndexKind::Annotated,
                    "com.example.Tag",
                    Some(IndexMarker::plain())
                ),
                Tracking::Untracked
            );
        }

        #[test]
        fn empty_annotation_list_keeps_marker_mode() {
            let registry = Registry::with_annotations(Vec::<String>::new());
            assert!(registry.is_annotation_driven());
        }

        #[test]
        fn non_empty_annotation_list_is_explicit() {
            let registry = Registry::with_annotations(["com.example.Tag"]);
            assert!(!registry.is_annotation_driven());
            assert!(registry.is_tracked(IndexKind::Annotated, "com.example.Tag"));
        }
    }

    mod classify {
        use super::*;

        #[test]
        fn explicit_wins_over_marker() {
            let mut registry = Registry::annotation_driven();
            registry.register_superclass("com.example.Base");
            let tracking = registry.classify(
                IndexKind::Subclasses,
                "com.example.Base",
                Some(IndexMarker::with_docs()),
            );
            assert_eq!(tracking, Tracking::Explicit);
            assert!(!tracking.store_docs());
        }

        #[test]
        fn marker_carries_store_docs() {
            let registry = Registry::annotation_driven();
            let tracking = registry.classify(
                IndexKind::Annotated,
                "com.example.Tag",
                Some(IndexMarker::with_docs()),
            );
            assert_eq!(tracking, Tracking::Marked { store_docs: true });
            assert!(tracking.is_tracked());
            assert!(tracking.store_docs());
        }

        #[test]
        fn kinds_are_independent() {
            let mut registry = Registry::annotation_driven();
            registry.register_annotation("com.example.Thing");
            assert!(registry.is_tracked(IndexKind::Annotated, "com.example.Thing"));
            assert!(!registry.is_tracked(IndexKind::Subclasses, "com.example.Thing"));
        }

        #[test]
        fn registering_twice_is_idempotent() {
            let mut registry = Registry::annotation_driven();
            registry.register_annotation("com.example.Tag");
            registry.register_annotation("com.example.Tag");
            assert_eq!(registry.keys(IndexKind::Annotated).len(), 1);
        }
    }

    #[test]
    fn index_kind_display_matches_serde_names() {
        for kind in IndexKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    fn package_and_subclass_share_marker() {
        assert_eq!(
            IndexKind::Package.marker_kind(),
            MarkerKind::IndexSubclasses
        );
        assert_eq!(
            IndexKind::Annotated.marker_kind(),
            MarkerKind::IndexAnnotated
        );
    }
}
