//! Integration tests for complete indexing sessions against a real output
//! directory.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use classindex_core::engine::ClassIndexer;
use classindex_core::model::{DeclarationSet, IndexMarker, MarkerKind, PackageDecl, TypeDecl};
use classindex_core::paths::{index_path, javadoc_path};
use classindex_core::registry::{IndexKind, Registry};
use classindex_core::store::FsResourceStore;

/// Run one single-round session over `names`, writing into `out`.
fn run_session(out: &Path, registry: Registry, decls: &DeclarationSet, names: &[&str]) {
    let roots: Vec<&TypeDecl> = names
        .iter()
        .map(|name| decls.get(name).expect("root declared"))
        .collect();
    let mut indexer = ClassIndexer::new(registry, FsResourceStore::new(out));
    let claimed = indexer.process(decls, roots, true).expect("session succeeds");
    assert!(!claimed);
}

fn read_index(out: &Path, kind: IndexKind, key: &str) -> Option<String> {
    fs::read_to_string(out.join(index_path(kind, key))).ok()
}

fn lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

// ============================================================================
// Incremental merge
// ============================================================================

#[test]
fn second_session_merges_with_first() {
    let temp = TempDir::new().unwrap();
    let decls = DeclarationSet::new()
        .with_type(TypeDecl::class("app.A").extends("app.Base"))
        .with_type(TypeDecl::class("app.B").extends("app.Base"))
        .with_type(TypeDecl::class("app.C").extends("app.Base"));

    let explicit = || {
        let mut registry = Registry::annotation_driven();
        registry.register_superclass("app.Base");
        registry
    };

    run_session(temp.path(), explicit(), &decls, &["app.A", "app.B"]);
    run_session(temp.path(), explicit(), &decls, &["app.B", "app.C"]);

    let text = read_index(temp.path(), IndexKind::Subclasses, "app.Base").unwrap();
    assert_eq!(lines(&text), vec!["app.A", "app.B", "app.C"]);
    assert!(text.ends_with('\n'));
}

#[test]
fn rerunning_identical_session_is_stable() {
    let temp = TempDir::new().unwrap();
    let decls = DeclarationSet::new()
        .with_type(
            TypeDecl::annotation("app.Service")
                .with_marker(MarkerKind::IndexAnnotated, IndexMarker::plain()),
        )
        .with_type(TypeDecl::class("app.Impl").annotated("app.Service"));

    run_session(temp.path(), Registry::annotation_driven(), &decls, &["app.Impl"]);
    let first = read_index(temp.path(), IndexKind::Annotated, "app.Service").unwrap();
    run_session(temp.path(), Registry::annotation_driven(), &decls, &["app.Impl"]);
    let second = read_index(temp.path(), IndexKind::Annotated, "app.Service").unwrap();

    assert_eq!(first, "app.Impl\n");
    assert_eq!(first, second);
}

// ============================================================================
// Hierarchy propagation
// ============================================================================

#[test]
fn marker_on_interface_reaches_indirect_implementors() {
    let temp = TempDir::new().unwrap();
    let decls = DeclarationSet::new()
        .with_type(
            TypeDecl::interface("app.Plugin")
                .with_marker(MarkerKind::IndexSubclasses, IndexMarker::plain()),
        )
        .with_type(TypeDecl::interface("app.FancyPlugin").extends("app.Plugin"))
        .with_type(TypeDecl::class("app.AbstractPlugin").extends("app.FancyPlugin"))
        .with_type(TypeDecl::class("app.RealPlugin").extends("app.AbstractPlugin"));

    run_session(
        temp.path(),
        Registry::annotation_driven(),
        &decls,
        &["app.Plugin", "app.FancyPlugin", "app.AbstractPlugin", "app.RealPlugin"],
    );

    let text = read_index(temp.path(), IndexKind::Subclasses, "app.Plugin").unwrap();
    assert_eq!(
        lines(&text),
        vec!["app.AbstractPlugin", "app.FancyPlugin", "app.RealPlugin"]
    );
    // Untracked intermediate types get no index of their own.
    assert!(read_index(temp.path(), IndexKind::Subclasses, "app.FancyPlugin").is_none());
}

#[test]
fn inherited_annotation_propagates_to_subclasses() {
    let temp = TempDir::new().unwrap();
    let decls = DeclarationSet::new()
        .with_type(
            TypeDecl::annotation("app.Entity")
                .inherited()
                .with_marker(MarkerKind::IndexAnnotated, IndexMarker::plain()),
        )
        .with_type(
            TypeDecl::annotation("app.Audited")
                .with_marker(MarkerKind::IndexAnnotated, IndexMarker::plain()),
        )
        .with_type(
            TypeDecl::class("app.BaseEntity")
                .annotated("app.Entity")
                .annotated("app.Audited"),
        )
        .with_type(TypeDecl::class("app.Customer").extends("app.BaseEntity"));

    run_session(
        temp.path(),
        Registry::annotation_driven(),
        &decls,
        &["app.BaseEntity", "app.Customer"],
    );

    let entity = read_index(temp.path(), IndexKind::Annotated, "app.Entity").unwrap();
    assert_eq!(lines(&entity), vec!["app.BaseEntity", "app.Customer"]);

    let audited = read_index(temp.path(), IndexKind::Annotated, "app.Audited").unwrap();
    assert_eq!(lines(&audited), vec!["app.BaseEntity"]);
}

#[test]
fn type_is_never_listed_in_its_own_index() {
    let temp = TempDir::new().unwrap();
    let decls = DeclarationSet::new()
        .with_type(TypeDecl::class("app.Base"))
        .with_type(TypeDecl::class("app.Child").extends("app.Base"));

    let mut registry = Registry::annotation_driven();
    registry.register_superclass("app.Base");
    run_session(temp.path(), registry, &decls, &["app.Base", "app.Child"]);

    let text = read_index(temp.path(), IndexKind::Subclasses, "app.Base").unwrap();
    assert_eq!(lines(&text), vec!["app.Child"]);
}

// ============================================================================
// Packages
// ============================================================================

#[test]
fn package_index_lists_simple_names() {
    let temp = TempDir::new().unwrap();
    let decls = DeclarationSet::new()
        .with_package(
            PackageDecl::new("app.handlers")
                .with_marker(MarkerKind::IndexSubclasses, IndexMarker::plain()),
        )
        .with_type(TypeDecl::class("app.handlers.LoginHandler"))
        .with_type(TypeDecl::class("app.handlers.LogoutHandler"))
        .with_type(TypeDecl::class("app.Other"));

    run_session(
        temp.path(),
        Registry::annotation_driven(),
        &decls,
        &["app.handlers.LoginHandler", "app.handlers.LogoutHandler", "app.Other"],
    );

    let text = fs::read_to_string(temp.path().join("app/handlers/jbossindex")).unwrap();
    assert_eq!(lines(&text), vec!["LoginHandler", "LogoutHandler"]);
    assert!(!temp.path().join("app/jbossindex").exists());
}

// ============================================================================
// Registration modes
// ============================================================================

#[test]
fn explicit_registration_ignores_markers() {
    let temp = TempDir::new().unwrap();
    let decls = DeclarationSet::new()
        .with_type(
            TypeDecl::annotation("app.Marked")
                .with_marker(MarkerKind::IndexAnnotated, IndexMarker::plain()),
        )
        .with_type(TypeDecl::annotation("app.Chosen"))
        .with_type(
            TypeDecl::class("app.Impl")
                .annotated("app.Marked")
                .annotated("app.Chosen"),
        );

    run_session(
        temp.path(),
        Registry::with_annotations(["app.Chosen"]),
        &decls,
        &["app.Impl"],
    );

    assert_eq!(
        read_index(temp.path(), IndexKind::Annotated, "app.Chosen").as_deref(),
        Some("app.Impl\n")
    );
    assert!(read_index(temp.path(), IndexKind::Annotated, "app.Marked").is_none());
}

#[test]
fn untouched_indexes_are_not_rewritten() {
    let temp = TempDir::new().unwrap();
    let other = temp.path().join(index_path(IndexKind::Subclasses, "lib.Unrelated"));
    fs::create_dir_all(other.parent().unwrap()).unwrap();
    fs::write(&other, "lib.Old\n").unwrap();

    let decls = DeclarationSet::new().with_type(TypeDecl::class("app.Lonely"));
    run_session(temp.path(), Registry::annotation_driven(), &decls, &["app.Lonely"]);

    assert_eq!(fs::read_to_string(&other).unwrap(), "lib.Old\n");
}

// ============================================================================
// Documentation sidecars
// ============================================================================

#[test]
fn documentation_written_once_per_type() {
    let temp = TempDir::new().unwrap();
    let decls = DeclarationSet::new()
        .with_type(
            TypeDecl::annotation("app.Command")
                .with_marker(MarkerKind::IndexAnnotated, IndexMarker::with_docs()),
        )
        .with_type(
            TypeDecl::interface("app.Handler")
                .with_marker(MarkerKind::IndexSubclasses, IndexMarker::with_docs()),
        )
        .with_type(
            TypeDecl::class("app.Deploy")
                .annotated("app.Command")
                .extends("app.Handler")
                .with_doc("Deploys the current build."),
        )
        .with_type(TypeDecl::class("app.Undocumented").extends("app.Handler"));

    let roots = vec![
        decls.get("app.Deploy").unwrap(),
        decls.get("app.Undocumented").unwrap(),
    ];
    let mut indexer = ClassIndexer::new(
        Registry::annotation_driven(),
        FsResourceStore::new(temp.path()),
    );
    indexer.process(&decls, roots, true).unwrap();

    assert_eq!(indexer.stats().docs_written, 1);
    assert_eq!(
        fs::read_to_string(temp.path().join(javadoc_path("app.Deploy"))).unwrap(),
        "Deploys the current build."
    );
    assert!(!temp.path().join(javadoc_path("app.Undocumented")).exists());
}
