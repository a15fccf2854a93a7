//! Run-configuration file
//!
//! A TOML file bundles everything one catalog run needs (the four filter
//! lists, the output path, and the mode toggles) so pipelines can check a
//! single file into their repo instead of repeating flags:
//!
//! ```toml
//! output = "search.json"
//! original-type = false
//! list-operators = true
//! list-functions = true
//!
//! [filters]
//! exclude-functions = "exclude_functions.txt"
//! include-functions = "include_functions.txt"
//! include-globals = "include_globals.txt"
//! exclude-locals = "exclude_locals.txt"
//! ```
//!
//! Relative paths resolve against the directory containing the config file.
//! Command-line flags override config values.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::filter::FilterLists;
use crate::walk::SearchOptions;

/// Errors raised while loading the run configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Unreadable(PathBuf, io::Error),
    /// The config file is not valid TOML for this schema.
    Invalid(PathBuf, toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Unreadable(path, err) => {
                write!(f, "Failed to read '{}': {}", path.display(), err)
            }
            ConfigError::Invalid(path, err) => {
                write!(f, "Failed to parse '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// The `[filters]` section: paths of the four name lists.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterSection {
    #[serde(rename = "exclude-functions")]
    pub exclude_functions: PathBuf,

    #[serde(rename = "include-functions")]
    pub include_functions: PathBuf,

    #[serde(rename = "include-globals")]
    pub include_globals: PathBuf,

    #[serde(rename = "exclude-locals")]
    pub exclude_locals: PathBuf,
}

/// One catalog run's configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Where the search file is written.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Restrict candidates to narrowings of each entity's declared type.
    #[serde(rename = "original-type", default)]
    pub original_type: bool,

    /// Scan arithmetic/comparison operations.
    #[serde(rename = "list-operators", default = "default_enabled")]
    pub list_operators: bool,

    /// Scan calls to tunable math functions.
    #[serde(rename = "list-functions", default = "default_enabled")]
    pub list_functions: bool,

    /// The four filter lists.
    pub filters: FilterSection,
}

fn default_output() -> PathBuf {
    PathBuf::from("search.json")
}

fn default_enabled() -> bool {
    true
}

fn resolve(base: &Path, path: &mut PathBuf) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}

impl RunConfig {
    /// Load and parse a config file, resolving relative paths against its
    /// directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|err| ConfigError::Unreadable(path.to_path_buf(), err))?;
        let mut config: RunConfig =
            toml::from_str(&text).map_err(|err| ConfigError::Invalid(path.to_path_buf(), err))?;

        if let Some(base) = path.parent() {
            resolve(base, &mut config.output);
            resolve(base, &mut config.filters.exclude_functions);
            resolve(base, &mut config.filters.include_functions);
            resolve(base, &mut config.filters.include_globals);
            resolve(base, &mut config.filters.exclude_locals);
        }

        Ok(config)
    }

    /// The filter list paths in the form the policy loader takes.
    pub fn filter_lists(&self) -> FilterLists {
        FilterLists {
            excluded_functions: self.filters.exclude_functions.clone(),
            included_functions: self.filters.include_functions.clone(),
            included_globals: self.filters.include_globals.clone(),
            excluded_locals: self.filters.exclude_locals.clone(),
        }
    }

    /// The mode toggles in the form the pass takes.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            original_type: self.original_type,
            list_operators: self.list_operators,
            list_calls: self.list_functions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        output = "out/search.json"
        original-type = true
        list-operators = false
        list-functions = true

        [filters]
        exclude-functions = "exclude_functions.txt"
        include-functions = "include_functions.txt"
        include-globals = "include_globals.txt"
        exclude-locals = "exclude_locals.txt"
    "#;

    #[test]
    fn test_parse_full_config() {
        let config: RunConfig = toml::from_str(FULL).unwrap();
        assert_eq!(config.output, PathBuf::from("out/search.json"));
        assert!(config.original_type);
        assert!(!config.list_operators);
        assert!(config.list_functions);
        assert_eq!(
            config.filters.include_globals,
            PathBuf::from("include_globals.txt")
        );
    }

    #[test]
    fn test_defaults() {
        let config: RunConfig = toml::from_str(
            r#"
            [filters]
            exclude-functions = "a"
            include-functions = "b"
            include-globals = "c"
            exclude-locals = "d"
        "#,
        )
        .unwrap();
        assert_eq!(config.output, PathBuf::from("search.json"));
        assert!(!config.original_type);
        assert!(config.list_operators);
        assert!(config.list_functions);
    }

    #[test]
    fn test_missing_filters_section_rejected() {
        let result: Result<RunConfig, _> = toml::from_str("output = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_search_options_mapping() {
        let config: RunConfig = toml::from_str(FULL).unwrap();
        let options = config.search_options();
        assert!(options.original_type);
        assert!(!options.list_operators);
        assert!(options.list_calls);
    }
}
