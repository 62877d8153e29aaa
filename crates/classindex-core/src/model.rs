//! Declaration model: the read-only view of compiled types the engine walks.
//!
//! The engine never sees a host compiler's own representation. Hosts implement
//! [`Declaration`] for their type elements and [`DeclarationResolver`] for the
//! lookup that turns a qualified-name reference (supertype or annotation) back
//! into a declaration. Types outside the current batch must still resolve:
//! the supertype walk reaches arbitrarily far up the hierarchy.
//!
//! [`DeclarationSet`] is the concrete, serde-deserializable implementation
//! used by the CLI manifest adapter and by tests.
//!
//! # Markers
//!
//! A declaration may carry index markers (see [`MarkerKind`]). In
//! annotation-driven mode these are what make an annotation, supertype or
//! package a tracked key. Packages only honor [`MarkerKind::IndexSubclasses`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Markers
// ============================================================================

/// The two declarative markers recognized in annotation-driven mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// "Index every type annotated with the annotation carrying this marker."
    IndexAnnotated,
    /// "Index every subtype of (or type in) the declaration carrying this marker."
    IndexSubclasses,
}

/// Options carried by a marker occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexMarker {
    /// Also persist the documentation comment of every indexed member.
    #[serde(default)]
    pub store_docs: bool,
}

impl IndexMarker {
    /// A marker that does not request documentation storage.
    pub fn plain() -> Self {
        IndexMarker { store_docs: false }
    }

    /// A marker that requests documentation storage.
    pub fn with_docs() -> Self {
        IndexMarker { store_docs: true }
    }
}

/// Marker set attached to a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Markers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_annotated: Option<IndexMarker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_subclasses: Option<IndexMarker>,
}

impl Markers {
    /// Look up the marker of the given kind.
    pub fn get(&self, kind: MarkerKind) -> Option<IndexMarker> {
        match kind {
            MarkerKind::IndexAnnotated => self.index_annotated,
            MarkerKind::IndexSubclasses => self.index_subclasses,
        }
    }

    /// Returns true if no marker is present.
    pub fn is_empty(&self) -> bool {
        self.index_annotated.is_none() && self.index_subclasses.is_none()
    }
}

// ============================================================================
// Capability Traits
// ============================================================================

/// Read-only view of one declared type.
///
/// Supertypes and annotations are qualified-name references resolved through
/// a [`DeclarationResolver`]; implementors never hand out other declarations
/// directly.
pub trait Declaration {
    /// Globally unique qualified name, e.g. `com.example.Widget`.
    fn qualified_name(&self) -> &str;

    /// Simple name, e.g. `Widget`.
    fn simple_name(&self) -> &str;

    /// Qualified name of the enclosing package (empty for the unnamed package).
    fn package_name(&self) -> &str;

    /// Direct supertypes (superclass first, then interfaces), in declaration order.
    fn direct_supertypes(&self) -> &[String];

    /// Annotations attached directly to this declaration.
    fn direct_annotations(&self) -> &[String];

    /// For annotation types: whether the annotation is marked "inherited".
    fn is_inherited_annotation(&self) -> bool;

    /// The index marker of the given kind carried by this declaration, if any.
    fn marker(&self, kind: MarkerKind) -> Option<IndexMarker>;

    /// Source-level documentation comment, if the host retained one.
    fn doc_comment(&self) -> Option<&str>;
}

/// Resolves qualified-name references to declarations.
pub trait DeclarationResolver {
    type Decl: Declaration;

    /// Resolve a type (class, interface, annotation) by qualified name.
    fn resolve_type(&self, qualified_name: &str) -> Option<&Self::Decl>;

    /// The marker of the given kind on a package declaration, if any.
    fn package_marker(&self, package_name: &str, kind: MarkerKind) -> Option<IndexMarker>;
}

// ============================================================================
// Concrete Model
// ============================================================================

/// Kind of declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Annotation,
    Enum,
}

/// A declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Qualified name (`com.example.Widget`, nested types use `Outer.Inner`).
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    /// Direct supertypes by qualified name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supertypes: Vec<String>,
    /// Directly attached annotations by qualified name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
    /// Annotation types only: carries the "inherited" meta-annotation.
    #[serde(default)]
    pub inherited: bool,
    #[serde(default, skip_serializing_if = "Markers::is_empty")]
    pub markers: Markers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Explicit package name; derived from `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

impl TypeDecl {
    /// Create a class declaration.
    pub fn class(name: impl Into<String>) -> Self {
        TypeDecl {
            name: name.into(),
            kind: TypeKind::Class,
            supertypes: Vec::new(),
            annotations: Vec::new(),
            inherited: false,
            markers: Markers::default(),
            doc: None,
            package: None,
        }
    }

    /// Create an interface declaration.
    pub fn interface(name: impl Into<String>) -> Self {
        TypeDecl {
            kind: TypeKind::Interface,
            ..TypeDecl::class(name)
        }
    }

    /// Create an annotation type declaration.
    pub fn annotation(name: impl Into<String>) -> Self {
        TypeDecl {
            kind: TypeKind::Annotation,
            ..TypeDecl::class(name)
        }
    }

    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    /// Mark this annotation type as "inherited".
    pub fn inherited(mut self) -> Self {
        self.inherited = true;
        self
    }

    pub fn with_marker(mut self, kind: MarkerKind, marker: IndexMarker) -> Self {
        match kind {
            MarkerKind::IndexAnnotated => self.markers.index_annotated = Some(marker),
            MarkerKind::IndexSubclasses => self.markers.index_subclasses = Some(marker),
        }
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn in_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }
}

impl Declaration for TypeDecl {
    fn qualified_name(&self) -> &str {
        &self.name
    }

    fn simple_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[idx + 1..],
            None => &self.name,
        }
    }

    fn package_name(&self) -> &str {
        if let Some(package) = &self.package {
            return package;
        }
        match self.name.rfind('.') {
            Some(idx) => &self.name[..idx],
            None => "",
        }
    }

    fn direct_supertypes(&self) -> &[String] {
        &self.supertypes
    }

    fn direct_annotations(&self) -> &[String] {
        &self.annotations
    }

    fn is_inherited_annotation(&self) -> bool {
        self.kind == TypeKind::Annotation && self.inherited
    }

    fn marker(&self, kind: MarkerKind) -> Option<IndexMarker> {
        self.markers.get(kind)
    }

    fn doc_comment(&self) -> Option<&str> {
        self.doc.as_deref()
    }
}

/// A package declaration (only needed when the package carries markers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Markers::is_empty")]
    pub markers: Markers,
}

impl PackageDecl {
    pub fn new(name: impl Into<String>) -> Self {
        PackageDecl {
            name: name.into(),
            markers: Markers::default(),
        }
    }

    pub fn with_marker(mut self, kind: MarkerKind, marker: IndexMarker) -> Self {
        match kind {
            MarkerKind::IndexAnnotated => self.markers.index_annotated = Some(marker),
            MarkerKind::IndexSubclasses => self.markers.index_subclasses = Some(marker),
        }
        self
    }
}

// ============================================================================
// Declaration Set
// ============================================================================

/// Deterministic name → declaration table.
///
/// Later insertions under an existing name replace the earlier declaration,
/// so a manifest can override a type described by a previous one.
#[derive(Debug, Clone, Default)]
pub struct DeclarationSet {
    types: BTreeMap<String, TypeDecl>,
    packages: BTreeMap<String, PackageDecl>,
}

impl DeclarationSet {
    pub fn new() -> Self {
        DeclarationSet::default()
    }

    pub fn insert_type(&mut self, decl: TypeDecl) {
        self.types.insert(decl.name.clone(), decl);
    }

    pub fn insert_package(&mut self, decl: PackageDecl) {
        self.packages.insert(decl.name.clone(), decl);
    }

    /// Builder-style insertion.
    pub fn with_type(mut self, decl: TypeDecl) -> Self {
        self.insert_type(decl);
        self
    }

    /// Builder-style insertion.
    pub fn with_package(mut self, decl: PackageDecl) -> Self {
        self.insert_package(decl);
        self
    }

    pub fn get(&self, qualified_name: &str) -> Option<&TypeDecl> {
        self.types.get(qualified_name)
    }

    /// All types in name order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl DeclarationResolver for DeclarationSet {
    type Decl = TypeDecl;

    fn resolve_type(&self, qualified_name: &str) -> Option<&TypeDecl> {
        self.types.get(qualified_name)
    }

    fn package_marker(&self, package_name: &str, kind: MarkerKind) -> Option<IndexMarker> {
        self.packages
            .get(package_name)
            .and_then(|p| p.markers.get(kind))
    }
}

// ============================================================================
// Tests
// ============================================================================
