//! fpscout - Floating-Point Precision Catalog
//!
//! This library inspects a compiled program's intermediate representation and
//! emits a machine-readable catalog (a "search file") of every
//! floating-point-typed entity: global variables, local variables and
//! parameters, arithmetic and comparison operations, and calls to a fixed set
//! of tunable math functions. Each entry carries the ordered set of numeric
//! precisions a downstream mixed-precision search may assign to it.
//!
//! # Architecture
//!
//! The pass is a single synchronous traversal built from small pieces:
//!
//! 1. **IR object model** (`ir` module) - the read-only graph of types,
//!    globals, functions, blocks, and instructions the walkers query. Hosts
//!    assemble it in memory or dump the textual form read by `irparse`.
//! 2. **Type Classifier** (`classify` module) - reduces a declared type to a
//!    closed shape vocabulary: floating-point scalar, array, pointer, or
//!    opaque, recursing through nested array/pointer layers.
//! 3. **Candidate-Set Generator** (`candidates` module) - maps a shape to
//!    its ordered precision labels, exhaustively or anchored at the declared
//!    precision, with array/pointer suffixes applied uniformly.
//! 4. **Filter Policy** (`filter` module) - four name lists with asymmetric
//!    rules: functions need inclusion and no exclusion, globals need
//!    inclusion, locals only need absence from the exclusion list.
//! 5. **Entity Walkers** (`walk` module) - the global, local, operator, and
//!    call scans, orchestrated by [`SearchFilePass`].
//! 6. **Record Emitter** (`emit` module) - incremental writer for the fixed
//!    JSON schema; owns the separator state so records stream out without
//!    buffering.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashSet;
//! use fpscout::{parse_module, FilterPolicy, SearchFilePass, SearchOptions};
//!
//! let module = parse_module(r#"
//!     (module "sim"
//!       (global "gsum" double)
//!       (function "main"
//!         (block "entry"
//!           (fadd (id "main_0"))
//!           (ret))))
//! "#).unwrap();
//!
//! let policy = FilterPolicy::from_sets(
//!     HashSet::new(),
//!     ["main".to_string()].into_iter().collect(),
//!     ["gsum".to_string()].into_iter().collect(),
//!     HashSet::new(),
//! );
//!
//! let pass = SearchFilePass::new(&policy, SearchOptions::default());
//! let mut out = Vec::new();
//! pass.run(&module, &mut out).unwrap();
//!
//! let text = String::from_utf8(out).unwrap();
//! assert!(text.contains("\"globalVar\""));
//! ```
//!
//! Diagnostics (unclassifiable types, instructions missing their stable
//! identifier) are reported through `tracing` under `fpscout::*` targets and
//! never abort the traversal. Only a missing required filter list is fatal,
//! and that happens before any output is written.

pub mod candidates;
pub mod classify;
pub mod config;
pub mod emit;
pub mod filter;
pub mod ir;
pub mod irparse;
pub mod walk;

pub use candidates::{candidates, CandidateSet, Precision};
pub use classify::{classify, is_fp_reachable, is_fp_scalar, FloatKind, OpaqueShape, TypeShape};
pub use config::{ConfigError, RunConfig};
pub use filter::{FilterError, FilterLists, FilterPolicy, TUNABLE_CALLS};
pub use ir::{Block, Function, Instruction, Module, Opcode, Type};
pub use irparse::parse_module;
pub use walk::{SearchFilePass, SearchOptions};
