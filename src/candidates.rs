//! Candidate-Set Generator
//!
//! Maps a classified [`TypeShape`] to the ordered list of precision labels a
//! downstream tuning search may try for that entity. Two policies exist:
//!
//! - **Exhaustive** (the default): every floating-point shape gets the full
//!   low-to-high triple, with the shape's suffix (`*` or dimension list)
//!   applied uniformly.
//! - **Original-type**: only precisions at or above the declared one, i.e. a
//!   prefix of the order ending at the declared kind. Both extended formats
//!   deliberately keep the full triple in this mode as well; downstream
//!   consumers rely on that asymmetry.
//!
//! Opaque shapes yield a single fixed label ("int", "struct", "pointer", or
//! the textual array fallback). Those are diagnostic entries, not tuning
//! candidates; the generator reports everything the classifier could name and
//! leaves filtering to consumers.

use crate::classify::{Dims, FloatKind, OpaqueShape, TypeShape};

/// A candidate numeric precision, ordered low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precision {
    Float,
    Double,
    LongDouble,
}

impl Precision {
    /// All precisions in ascending order.
    pub const ALL: [Precision; 3] = [Precision::Float, Precision::Double, Precision::LongDouble];

    /// The label used in the search file.
    pub fn label(self) -> &'static str {
        match self {
            Precision::Float => "float",
            Precision::Double => "double",
            Precision::LongDouble => "longdouble",
        }
    }
}

/// The precision candidates generated for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSet {
    /// An ordered list of distinct labels, serialized as a JSON array.
    Candidates(Vec<String>),
    /// A single diagnostic label, serialized as a bare JSON string.
    Fixed(String),
}

/// How many precisions the mode admits for a declared scalar kind. The
/// original-type policy anchors at the declared precision; extended kinds
/// have no narrower anchor and stay exhaustive.
fn admitted(kind: FloatKind, original_type_only: bool) -> usize {
    if !original_type_only {
        return Precision::ALL.len();
    }
    match kind {
        FloatKind::Float => 1,
        FloatKind::Double => 2,
        FloatKind::X86Extended | FloatKind::PpcExtended => Precision::ALL.len(),
    }
}

fn suffixed(kind: FloatKind, original_type_only: bool, suffix: &str) -> CandidateSet {
    let labels = Precision::ALL[..admitted(kind, original_type_only)]
        .iter()
        .map(|p| format!("{}{}", p.label(), suffix))
        .collect();
    CandidateSet::Candidates(labels)
}

/// Render a dimension list as the `[d1][d2]...` suffix.
fn dim_suffix(dims: &Dims) -> String {
    dims.iter().map(|d| format!("[{}]", d)).collect()
}

/// Generate the candidate set for a classified shape under the given policy.
pub fn candidates(shape: &TypeShape, original_type_only: bool) -> CandidateSet {
    match shape {
        TypeShape::Scalar(kind) => suffixed(*kind, original_type_only, ""),
        TypeShape::Pointer(kind) => suffixed(*kind, original_type_only, "*"),
        TypeShape::Array(dims, kind) => suffixed(*kind, original_type_only, &dim_suffix(dims)),
        TypeShape::Opaque(OpaqueShape::Int) => CandidateSet::Fixed("int".to_string()),
        TypeShape::Opaque(OpaqueShape::Struct) => CandidateSet::Fixed("struct".to_string()),
        TypeShape::Opaque(OpaqueShape::Pointer) => CandidateSet::Fixed("pointer".to_string()),
        TypeShape::Opaque(OpaqueShape::Array(dims, text)) => {
            CandidateSet::Fixed(format!("{}{}", text, dim_suffix(dims)))
        }
        TypeShape::Opaque(OpaqueShape::Other) => CandidateSet::Fixed("unknown".to_string()),
    }
}

/// The fixed candidate triple for arithmetic and comparison operations.
/// Operators act on scalar values, so their candidates are independent of any
/// array or pointer structure on the operands.
pub fn operator_candidates() -> CandidateSet {
    CandidateSet::Candidates(Precision::ALL.iter().map(|p| p.label().to_string()).collect())
}

/// The replacement table for a tunable call target: the single-precision
/// variant first (`sqrtf`), then the declared double-precision name.
pub fn call_switch(callee: &str) -> [String; 2] {
    [format!("{}f", callee), callee.to_string()]
}
