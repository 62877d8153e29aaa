//! Configuration resolution with precedence tracking.
//!
//! Precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (`CLASSINDEX_*`)
//! 3. Project config file (`classindex.json`)
//! 4. Defaults
//!
//! List values (annotations, superclasses, packages) are replaced wholesale by
//! a higher-precedence source, never concatenated.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{IndexError, IndexResult};
use crate::registry::Registry;

/// Default project config file name.
pub const PROJECT_CONFIG_FILE: &str = "classindex.json";

/// Default build-output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "target/classes";

// ============================================================================
// Sources
// ============================================================================

/// Configuration value source (for precedence tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From `classindex.json`.
    ProjectConfig = 1,
    /// From environment variable.
    EnvVar = 2,
    /// From CLI flag (highest precedence).
    CliFlag = 3,
}

/// A configuration value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }

    /// Merge with another value, preferring higher precedence.
    pub fn merge(self, other: Self) -> Self {
        if other.source >= self.source {
            other
        } else {
            self
        }
    }
}

/// Contents of `classindex.json`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub output_dir: Option<PathBuf>,
    pub annotations: Option<Vec<String>>,
    pub superclasses: Option<Vec<String>>,
    pub packages: Option<Vec<String>>,
}

impl ProjectConfig {
    /// Load a project config file.
    pub fn load(path: &Path) -> IndexResult<Self> {
        let config_err = |message: String| IndexError::Config {
            path: path.display().to_string(),
            message,
        };
        let text = fs::read_to_string(path).map_err(|e| config_err(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| config_err(e.to_string()))
    }
}

/// CLI configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// --output flag.
    pub output_dir: Option<PathBuf>,
    /// --annotation flags.
    pub annotations: Vec<String>,
    /// --superclass flags.
    pub superclasses: Vec<String>,
    /// --package flags.
    pub packages: Vec<String>,
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolved configuration with precedence information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub output_dir: ConfigValue<PathBuf>,
    pub annotations: ConfigValue<Vec<String>>,
    pub superclasses: ConfigValue<Vec<String>>,
    pub packages: ConfigValue<Vec<String>>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        ResolvedConfig {
            output_dir: ConfigValue::new(PathBuf::from(DEFAULT_OUTPUT_DIR), ConfigSource::Default),
            annotations: ConfigValue::new(Vec::new(), ConfigSource::Default),
            superclasses: ConfigValue::new(Vec::new(), ConfigSource::Default),
            packages: ConfigValue::new(Vec::new(), ConfigSource::Default),
        }
    }
}

impl ResolvedConfig {
    /// Resolve configuration from all sources, reading the process environment.
    pub fn resolve(project: Option<&ProjectConfig>, cli: &CliOverrides) -> Self {
        Self::resolve_with_env(project, cli, |key| std::env::var(key).ok())
    }

    /// Resolve configuration with an explicit environment lookup.
    pub fn resolve_with_env(
        project: Option<&ProjectConfig>,
        cli: &CliOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut config = ResolvedConfig::default();
        if let Some(project) = project {
            config.apply_project_config(project);
        }
        config.apply_env_vars(env);
        config.apply_cli_overrides(cli);
        config
    }

    fn apply_project_config(&mut self, project: &ProjectConfig) {
        let source = ConfigSource::ProjectConfig;
        if let Some(dir) = &project.output_dir {
            self.set_output_dir(dir.clone(), source);
        }
        if let Some(list) = &project.annotations {
            self.annotations = take_list(self.annotations.clone(), list.clone(), source);
        }
        if let Some(list) = &project.superclasses {
            self.superclasses = take_list(self.superclasses.clone(), list.clone(), source);
        }
        if let Some(list) = &project.packages {
            self.packages = take_list(self.packages.clone(), list.clone(), source);
        }
    }

    fn apply_env_vars(&mut self, env: impl Fn(&str) -> Option<String>) {
        let source = ConfigSource::EnvVar;
        if let Some(dir) = env("CLASSINDEX_OUTPUT_DIR").filter(|v| !v.is_empty()) {
            self.set_output_dir(PathBuf::from(dir), source);
        }
        if let Some(list) = env("CLASSINDEX_ANNOTATIONS") {
            self.annotations = take_list(self.annotations.clone(), split_list(&list), source);
        }
        if let Some(list) = env("CLASSINDEX_SUPERCLASSES") {
            self.superclasses = take_list(self.superclasses.clone(), split_list(&list), source);
        }
        if let Some(list) = env("CLASSINDEX_PACKAGES") {
            self.packages = take_list(self.packages.clone(), split_list(&list), source);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        let source = ConfigSource::CliFlag;
        if let Some(dir) = &cli.output_dir {
            self.set_output_dir(dir.clone(), source);
        }
        if !cli.annotations.is_empty() {
            self.annotations = take_list(self.annotations.clone(), cli.annotations.clone(), source);
        }
        if !cli.superclasses.is_empty() {
            self.superclasses =
                take_list(self.superclasses.clone(), cli.superclasses.clone(), source);
        }
        if !cli.packages.is_empty() {
            self.packages = take_list(self.packages.clone(), cli.packages.clone(), source);
        }
    }

    fn set_output_dir(&mut self, dir: PathBuf, source: ConfigSource) {
        self.output_dir = self
            .output_dir
            .clone()
            .merge(ConfigValue::new(dir, source));
    }

    /// Build the session registry. Any configured key means explicit mode.
    pub fn to_registry(&self) -> Registry {
        let mut registry = Registry::annotation_driven();
        registry.register_annotations(self.annotations.value.iter().cloned());
        registry.register_superclasses(self.superclasses.value.iter().cloned());
        registry.register_packages(self.packages.value.iter().cloned());
        registry
    }
}

fn take_list(
    current: ConfigValue<Vec<String>>,
    list: Vec<String>,
    source: ConfigSource,
) -> ConfigValue<Vec<String>> {
    current.merge(ConfigValue::new(list, source))
}

/// Split a comma-separated list, dropping blanks.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
