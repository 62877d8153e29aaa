//! Declaration manifests: the CLI's stand-in for a compiler's round model.
//!
//! A manifest file is JSON:
//!
//! ```json
//! {
//!   "types": [
//!     { "name": "com.example.Plugin", "kind": "interface",
//!       "markers": { "index_subclasses": { "store_docs": true } } },
//!     { "name": "com.example.Impl", "supertypes": ["com.example.Plugin"],
//!       "doc": "An implementation." }
//!   ],
//!   "packages": [],
//!   "rounds": [["com.example.Plugin", "com.example.Impl"]]
//! }
//! ```
//!
//! Without `rounds`, every type in the file forms a single round. A
//! directory of manifests is read in path order: all files contribute
//! declarations, and each file's rounds follow the previous file's.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use walkdir::WalkDir;

use classindex_core::error::{IndexError, IndexResult};
use classindex_core::model::{DeclarationSet, PackageDecl, TypeDecl};

/// On-disk manifest shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestFile {
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub packages: Vec<PackageDecl>,
    #[serde(default)]
    pub rounds: Option<Vec<Vec<String>>>,
}

/// Declarations plus the rounds to feed the engine.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub declarations: DeclarationSet,
    pub rounds: Vec<Vec<String>>,
}

impl Manifest {
    /// Load a manifest file or a directory of manifest files.
    pub fn load(path: &Path) -> IndexResult<Self> {
        let mut manifest = Manifest::default();
        if path.is_dir() {
            let mut files = Vec::new();
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry
                    .map_err(|e| IndexError::manifest(path.display().to_string(), e.to_string()))?;
                let is_json = entry.path().extension().and_then(|e| e.to_str()) == Some("json");
                if entry.file_type().is_file() && is_json {
                    files.push(entry.into_path());
                }
            }
            for file in files {
                manifest.add_file(&file)?;
            }
        } else {
            manifest.add_file(path)?;
        }
        Ok(manifest)
    }

    fn add_file(&mut self, path: &Path) -> IndexResult<()> {
        let display = path.display().to_string();
        let text =
            fs::read_to_string(path).map_err(|e| IndexError::manifest(&display, e.to_string()))?;
        let file: ManifestFile = serde_json::from_str(&text)
            .map_err(|e| IndexError::manifest(&display, e.to_string()))?;
        self.add(file);
        Ok(())
    }

    /// Merge one parsed manifest file.
    pub fn add(&mut self, file: ManifestFile) {
        let default_round: Vec<String> = file.types.iter().map(|t| t.name.clone()).collect();
        for decl in file.types {
            self.declarations.insert_type(decl);
        }
        for package in file.packages {
            self.declarations.insert_package(package);
        }
        match file.rounds {
            Some(rounds) => self.rounds.extend(rounds),
            None if !default_round.is_empty() => self.rounds.push(default_round),
            None => {}
        }
    }

    /// Resolve the root names of one round.
    pub fn roots<'a>(&'a self, round: &[String]) -> IndexResult<Vec<&'a TypeDecl>> {
        round
            .iter()
            .map(|name| {
                self.declarations
                    .get(name)
                    .ok_or_else(|| IndexError::UnresolvedRoot { name: name.clone() })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_rounds_default_to_all_types() {
        let mut manifest = Manifest::default();
        manifest.add(ManifestFile {
            types: vec![TypeDecl::class("a.A"), TypeDecl::class("a.B")],
            ..Default::default()
        });
        assert_eq!(manifest.rounds, vec![vec!["a.A".to_string(), "a.B".to_string()]]);
    }

    #[test]
    fn unknown_root_is_an_error() {
        let manifest = Manifest::default();
        let err = manifest.roots(&["a.Missing".to_string()]).unwrap_err();
        assert!(matches!(err, IndexError::UnresolvedRoot { .. }));
    }

    #[test]
    fn directory_files_are_read_in_order() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("02-second.json"),
            r#"{ "types": [{ "name": "a.Second" }] }"#,
        )
        .unwrap();
        fs::write(
            temp.path().join("01-first.json"),
            r#"{ "types": [{ "name": "a.First" }] }"#,
        )
        .unwrap();
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        let manifest = Manifest::load(temp.path()).unwrap();
        assert_eq!(
            manifest.rounds,
            vec![vec!["a.First".to_string()], vec!["a.Second".to_string()]]
        );
        assert_eq!(manifest.declarations.len(), 2);
    }

    #[test]
    fn malformed_json_is_a_manifest_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Manifest::load(&path),
            Err(IndexError::Manifest { .. })
        ));
    }
}
