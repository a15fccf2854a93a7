//! Filter Policy
//!
//! Four name lists loaded once per run decide which entities the catalog
//! visits. The rules are deliberately asymmetric:
//!
//! - functions must be explicitly included AND not excluded
//! - globals must be explicitly included
//! - locals are included by default and only opt out via the exclusion list
//!
//! Names containing a `'.'` are compiler-synthesized temporaries and are
//! never eligible. Tunable call targets are a fixed builtin set, not loaded
//! from a file.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Call targets eligible for precision-specific dispatch (`sqrt`/`sqrtf`).
pub const TUNABLE_CALLS: [&str; 5] = ["log", "sqrt", "cos", "sin", "acos"];

/// Result type for filter loading.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors raised while loading the filter lists.
#[derive(Debug)]
pub enum FilterError {
    /// A required list file could not be read.
    Unreadable(PathBuf, io::Error),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::Unreadable(path, err) => {
                write!(f, "Unable to open {}: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for FilterError {}

/// Paths of the four name lists.
#[derive(Debug, Clone)]
pub struct FilterLists {
    /// Functions to exclude (required).
    pub excluded_functions: PathBuf,
    /// Functions to include (required).
    pub included_functions: PathBuf,
    /// Global variables to include (required).
    pub included_globals: PathBuf,
    /// Local variables to exclude (optional; missing file means an empty
    /// list).
    pub excluded_locals: PathBuf,
}

/// The loaded, immutable filter configuration.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    excluded_functions: HashSet<String>,
    included_functions: HashSet<String>,
    included_globals: HashSet<String>,
    excluded_locals: HashSet<String>,
    tunable_calls: HashSet<&'static str>,
}

/// Read one list file: whitespace-separated name tokens.
fn read_names(path: &Path) -> FilterResult<HashSet<String>> {
    let content = fs::read_to_string(path)
        .map_err(|err| FilterError::Unreadable(path.to_path_buf(), err))?;
    Ok(content.split_whitespace().map(str::to_string).collect())
}

impl FilterPolicy {
    /// Load the policy from the four list files. The first three are
    /// required; the excluded-locals list is treated permissively and an
    /// unreadable file there means no exclusions.
    pub fn load(lists: &FilterLists) -> FilterResult<Self> {
        let excluded_functions = read_names(&lists.excluded_functions)?;
        let included_functions = read_names(&lists.included_functions)?;
        let included_globals = read_names(&lists.included_globals)?;
        let excluded_locals = read_names(&lists.excluded_locals).unwrap_or_default();

        Ok(Self::from_sets(
            excluded_functions,
            included_functions,
            included_globals,
            excluded_locals,
        ))
    }

    /// Build a policy from already-collected name sets. Used by embedding
    /// hosts that manage their own configuration, and by tests.
    pub fn from_sets(
        excluded_functions: HashSet<String>,
        included_functions: HashSet<String>,
        included_globals: HashSet<String>,
        excluded_locals: HashSet<String>,
    ) -> Self {
        FilterPolicy {
            excluded_functions,
            included_functions,
            included_globals,
            excluded_locals,
            tunable_calls: TUNABLE_CALLS.iter().copied().collect(),
        }
    }

    /// Functions require explicit inclusion and absence from the exclusion
    /// list.
    pub fn function_eligible(&self, name: &str) -> bool {
        self.included_functions.contains(name) && !self.excluded_functions.contains(name)
    }

    /// Globals require explicit inclusion; dotted names are synthesized by
    /// the compiler and never eligible.
    pub fn global_eligible(&self, name: &str) -> bool {
        self.included_globals.contains(name) && !name.contains('.')
    }

    /// Locals have no inclusion list: eligible unless excluded or
    /// synthesized.
    pub fn local_eligible(&self, name: &str) -> bool {
        !self.excluded_locals.contains(name) && !name.contains('.')
    }

    /// True when the named call target belongs to the builtin tunable set.
    pub fn call_tunable(&self, name: &str) -> bool {
        self.tunable_calls.contains(name)
    }
}
