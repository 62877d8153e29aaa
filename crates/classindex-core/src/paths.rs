//! Resource paths of generated index files.
//!
//! All paths are relative to the build-output root and always use `/`.
//! These prefixes are a contract with the runtime reader: keep them stable.
//!
//! | Kind | Path |
//! |------|------|
//! | annotated | `META-INF/annotated/<annotation>` |
//! | subclasses | `META-INF/subclasses/<supertype>` |
//! | package | `<package/as/path>/jbossindex` |
//! | documentation | `META-INF/javadocs/<type>` |

use crate::registry::IndexKind;

/// Prefix of annotation index files.
pub const ANNOTATED_INDEX_PREFIX: &str = "META-INF/annotated/";

/// Prefix of subclass index files.
pub const SUBCLASS_INDEX_PREFIX: &str = "META-INF/subclasses/";

/// File name of the per-package index.
pub const PACKAGE_INDEX_NAME: &str = "jbossindex";

/// Prefix of documentation sidecars.
pub const JAVADOC_PREFIX: &str = "META-INF/javadocs/";

/// Resource path of the index file for `key`.
pub fn index_path(kind: IndexKind, key: &str) -> String {
    match kind {
        IndexKind::Annotated => format!("{}{}", ANNOTATED_INDEX_PREFIX, key),
        IndexKind::Subclasses => format!("{}{}", SUBCLASS_INDEX_PREFIX, key),
        IndexKind::Package => package_index_path(key),
    }
}

/// `com.example` -> `com/example/jbossindex`; the unnamed package maps to the root.
pub fn package_index_path(package: &str) -> String {
    if package.is_empty() {
        PACKAGE_INDEX_NAME.to_string()
    } else {
        format!("{}/{}", package.replace('.', "/"), PACKAGE_INDEX_NAME)
    }
}

/// Resource path of the documentation sidecar for a type.
pub fn javadoc_path(qualified_name: &str) -> String {
    format!("{}{}", JAVADOC_PREFIX, qualified_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotated_and_subclass_paths_use_qualified_names() {
        assert_eq!(
            index_path(IndexKind::Annotated, "com.example.Tag"),
            "META-INF/annotated/com.example.Tag"
        );
        assert_eq!(
            index_path(IndexKind::Subclasses, "com.example.Base"),
            "META-INF/subclasses/com.example.Base"
        );
    }

    #[test]
    fn package_path_uses_slashes() {
        assert_eq!(
            index_path(IndexKind::Package, "com.example.widgets"),
            "com/example/widgets/jbossindex"
        );
    }

    #[test]
    fn unnamed_package_maps_to_root() {
        assert_eq!(package_index_path(""), "jbossindex");
    }

    #[test]
    fn kinds_never_collide() {
        // `META-INF` is not a legal package segment, so package files stay outside it.
        assert!(!index_path(IndexKind::Package, "com.example").starts_with("META-INF/"));
        assert_ne!(
            index_path(IndexKind::Annotated, "a.B"),
            index_path(IndexKind::Subclasses, "a.B")
        );
    }

    #[test]
    fn javadoc_path_uses_qualified_name() {
        assert_eq!(
            javadoc_path("com.example.Widget"),
            "META-INF/javadocs/com.example.Widget"
        );
    }
}
