//! Type Classifier
//!
//! Reduces a declared [`Type`] to the closed [`TypeShape`] vocabulary the
//! candidate generator understands: a floating-point scalar, an array of
//! floating-point elements, a pointer reaching floating-point storage, or an
//! opaque shape that only ever gets a diagnostic label.
//!
//! Classification never fails. Shapes the model cannot name are logged under
//! the `fpscout::classify` target and reported as opaque; eligibility
//! decisions stay with the walkers.

use smallvec::SmallVec;
use tracing::warn;

use crate::ir::Type;

/// Array dimensions, outermost first. Real tuning targets rarely nest deeper
/// than a handful of dimensions, so the list stays inline.
pub type Dims = SmallVec<[u64; 4]>;

/// The floating-point scalar format reported by the IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatKind {
    /// 32-bit single precision.
    Float,
    /// 64-bit double precision.
    Double,
    /// 80-bit x86 extended precision.
    X86Extended,
    /// 128-bit PowerPC extended precision.
    PpcExtended,
}

/// Shapes with no tunable precision. These still serialize, as single fixed
/// labels, so the catalog records what it saw instead of dropping it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpaqueShape {
    /// Integer scalar of any width.
    Int,
    /// Struct, reported as one complete unit and never decomposed.
    Struct,
    /// Pointer that never reaches floating-point storage.
    Pointer,
    /// Array whose stripped element is not a floating-point scalar; carries
    /// the element's textual spelling for the diagnostic label.
    Array(Dims, String),
    /// Anything the classifier could not name.
    Other,
}

/// The classified structure of a declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    /// A bare floating-point scalar.
    Scalar(FloatKind),
    /// A (possibly multi-dimensional) array of floating-point elements.
    Array(Dims, FloatKind),
    /// A pointer reaching floating-point storage.
    Pointer(FloatKind),
    /// Everything else.
    Opaque(OpaqueShape),
}

fn float_kind(ty: &Type) -> Option<FloatKind> {
    match ty {
        Type::Float => Some(FloatKind::Float),
        Type::Double => Some(FloatKind::Double),
        Type::X86Fp80 => Some(FloatKind::X86Extended),
        Type::PpcFp128 => Some(FloatKind::PpcExtended),
        _ => None,
    }
}

/// Classify a declared type into its [`TypeShape`].
pub fn classify(ty: &Type) -> TypeShape {
    match ty {
        Type::Float => TypeShape::Scalar(FloatKind::Float),
        Type::Double => TypeShape::Scalar(FloatKind::Double),
        Type::X86Fp80 => TypeShape::Scalar(FloatKind::X86Extended),
        Type::PpcFp128 => TypeShape::Scalar(FloatKind::PpcExtended),
        Type::Int(_) => TypeShape::Opaque(OpaqueShape::Int),
        Type::Struct(_) => TypeShape::Opaque(OpaqueShape::Struct),
        Type::Pointer(pointee) => classify_pointee(pointee),
        Type::Array(_, _) => classify_array(ty),
        Type::Void | Type::Other(_) => {
            warn!(target: "fpscout::classify", ty = %ty, "unclassified type");
            TypeShape::Opaque(OpaqueShape::Other)
        }
    }
}

/// Pointer classification: unwrap nested pointer/array layers until a scalar
/// decides the outcome. The type system guarantees finite nesting, so plain
/// recursion through the loop below terminates.
fn classify_pointee(pointee: &Type) -> TypeShape {
    let mut ty = pointee;
    loop {
        if let Some(kind) = float_kind(ty) {
            return TypeShape::Pointer(kind);
        }
        match ty {
            Type::Pointer(inner) => ty = inner,
            Type::Array(_, element) => ty = element,
            _ => return TypeShape::Opaque(OpaqueShape::Pointer),
        }
    }
}

/// Array classification: strip every array layer, collecting each layer's
/// element count outermost-first, then decide on the element type.
fn classify_array(ty: &Type) -> TypeShape {
    let mut dims = Dims::new();
    let mut element = ty;
    while let Type::Array(len, inner) = element {
        dims.push(*len);
        element = inner;
    }

    match float_kind(element) {
        Some(kind) => TypeShape::Array(dims, kind),
        // Pointer elements (and anything else) keep the textual rendering so
        // the catalog still shows the shape it skipped.
        None => TypeShape::Opaque(OpaqueShape::Array(dims, element.to_string())),
    }
}

/// True when the type is itself a floating-point scalar.
pub fn is_fp_scalar(ty: &Type) -> bool {
    ty.is_floating_point()
}

/// True when unwrapping one array or pointer layer at a time eventually
/// reaches a floating-point scalar. Bare scalars return false; the walkers
/// pair this with [`is_fp_scalar`].
pub fn is_fp_reachable(ty: &Type) -> bool {
    match ty {
        Type::Array(_, element) | Type::Pointer(element) => {
            element.is_floating_point() || is_fp_reachable(element)
        }
        _ => false,
    }
}
