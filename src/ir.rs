//! Read-only object model for the analyzed program's intermediate
//! representation.
//!
//! The catalog pass never mutates the program it inspects; this module is the
//! queryable graph it walks. A host compiler embeds the crate and assembles a
//! [`Module`] through the constructors here, or loads one from the textual
//! form understood by [`crate::irparse`].
//!
//! Only the slice of a real IR that the catalog needs is modeled:
//!
//! - types (scalars, pointers, arrays, structs, integers)
//! - module-level global variables
//! - functions with parameters and basic blocks
//! - instructions with opcodes, string metadata, and debug locations
//!
//! Instruction identity comes from an upstream numbering pass that stores a
//! stable string under the [`INST_ID_KEY`] metadata key. The catalog treats
//! that key as an opaque lookup and tolerates its absence.

use std::collections::BTreeMap;
use std::fmt;

/// Metadata key under which the upstream numbering pass stores the stable
/// per-instruction identifier.
pub const INST_ID_KEY: &str = "fpscout.inst.id";

/// A declared type in the analyzed program.
///
/// Mirrors the closed set of type kinds the catalog can meet: four
/// floating-point formats, sized integers, pointers, sized arrays, named
/// structs, and an escape hatch for anything else the host reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// 32-bit IEEE 754 single precision.
    Float,
    /// 64-bit IEEE 754 double precision.
    Double,
    /// 80-bit x86 extended precision.
    X86Fp80,
    /// 128-bit PowerPC extended double-double.
    PpcFp128,
    /// Integer of the given bit width.
    Int(u32),
    /// Pointer to the pointee type.
    Pointer(Box<Type>),
    /// Array of `len` elements of the element type.
    Array(u64, Box<Type>),
    /// Named struct, treated as a complete unit.
    Struct(String),
    /// The void type.
    Void,
    /// Any type kind the model does not represent, by its textual spelling.
    Other(String),
}

impl Type {
    /// Convenience constructor for `Pointer`.
    pub fn pointer_to(pointee: Type) -> Type {
        Type::Pointer(Box::new(pointee))
    }

    /// Convenience constructor for `Array`.
    pub fn array_of(len: u64, element: Type) -> Type {
        Type::Array(len, Box::new(element))
    }

    /// True for the four floating-point scalar formats.
    pub fn is_floating_point(&self) -> bool {
        matches!(
            self,
            Type::Float | Type::Double | Type::X86Fp80 | Type::PpcFp128
        )
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Float => write!(f, "float"),
            Type::Double => write!(f, "double"),
            Type::X86Fp80 => write!(f, "x86_fp80"),
            Type::PpcFp128 => write!(f, "ppc_fp128"),
            Type::Int(bits) => write!(f, "i{}", bits),
            Type::Pointer(pointee) => write!(f, "{}*", pointee),
            Type::Array(len, element) => write!(f, "[{} x {}]", len, element),
            Type::Struct(name) => write!(f, "struct.{}", name),
            Type::Void => write!(f, "void"),
            Type::Other(text) => write!(f, "{}", text),
        }
    }
}

/// A source location attached to an instruction by debug metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugLoc {
    /// Source file the instruction was lowered from.
    pub file: String,
    /// 1-based source line; 0 when unknown.
    pub line: u32,
}

/// Instruction opcodes the catalog distinguishes.
///
/// Everything outside this set is carried as `Other` so a host can hand over
/// complete functions without the walkers tripping on unmodeled opcodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Opcode {
    /// Stack allocation introducing a named local of the allocated type.
    Alloca { name: String, allocated: Type },
    /// Floating-point addition.
    FAdd,
    /// Floating-point subtraction.
    FSub,
    /// Floating-point multiplication.
    FMul,
    /// Floating-point division.
    FDiv,
    /// Floating-point comparison.
    FCmp,
    /// Call; `callee` is the target name for direct calls, `None` when the
    /// target is a computed value.
    Call { callee: Option<String> },
    /// Return terminator.
    Ret,
    /// Branch terminator.
    Br,
    /// Any other opcode, by name.
    Other(String),
}

impl Opcode {
    /// The opcode spelling used in emitted records.
    pub fn name(&self) -> &str {
        match self {
            Opcode::Alloca { .. } => "alloca",
            Opcode::FAdd => "fadd",
            Opcode::FSub => "fsub",
            Opcode::FMul => "fmul",
            Opcode::FDiv => "fdiv",
            Opcode::FCmp => "fcmp",
            Opcode::Call { .. } => "call",
            Opcode::Ret => "ret",
            Opcode::Br => "br",
            Opcode::Other(name) => name,
        }
    }

    /// True for opcodes that end a basic block.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Opcode::Ret | Opcode::Br)
    }
}

/// One instruction: an opcode plus attached string metadata and an optional
/// debug location.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub debug_loc: Option<DebugLoc>,
    metadata: BTreeMap<String, String>,
}

impl Instruction {
    pub fn new(opcode: Opcode) -> Self {
        Instruction {
            opcode,
            debug_loc: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach the stable identifier the numbering pass would have assigned.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.insert(INST_ID_KEY.to_string(), id.into());
        self
    }

    /// Attach a debug location.
    pub fn with_debug_loc(mut self, file: impl Into<String>, line: u32) -> Self {
        self.debug_loc = Some(DebugLoc {
            file: file.into(),
            line,
        });
        self
    }

    /// Store arbitrary string metadata under a key.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Look up string metadata by key.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// The stable identifier assigned by the upstream numbering pass, if any.
    pub fn stable_id(&self) -> Option<&str> {
        self.metadata(INST_ID_KEY)
    }
}

/// A basic block: a label and its instructions in layout order.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub label: String,
    pub instructions: Vec<Instruction>,
}

impl Block {
    pub fn new(label: impl Into<String>) -> Self {
        Block {
            label: label.into(),
            instructions: Vec::new(),
        }
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// The block terminator, when the last instruction is one.
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions
            .last()
            .filter(|inst| inst.opcode.is_terminator())
    }
}

/// A named formal parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

/// A function: signature, body blocks, and whether a body exists at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub blocks: Vec<Block>,
    pub is_declaration: bool,
}

impl Function {
    /// A function with a body (blocks may be pushed afterwards).
    pub fn definition(name: impl Into<String>) -> Self {
        Function {
            name: name.into(),
            params: Vec::new(),
            blocks: Vec::new(),
            is_declaration: false,
        }
    }

    /// A body-less declaration, e.g. an external math routine.
    pub fn declaration(name: impl Into<String>) -> Self {
        Function {
            name: name.into(),
            params: Vec::new(),
            blocks: Vec::new(),
            is_declaration: true,
        }
    }

    pub fn push_param(&mut self, name: impl Into<String>, ty: Type) {
        self.params.push(Param {
            name: name.into(),
            ty,
        });
    }

    pub fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// The first block of the body.
    pub fn entry_block(&self) -> Option<&Block> {
        self.blocks.first()
    }

    /// Named local values in a deterministic order: parameters in signature
    /// order, then stack allocations in block layout order.
    pub fn named_locals(&self) -> impl Iterator<Item = (&str, &Type)> {
        let params = self
            .params
            .iter()
            .map(|param| (param.name.as_str(), &param.ty));
        let allocas = self
            .blocks
            .iter()
            .flat_map(|block| block.instructions.iter())
            .filter_map(|inst| match &inst.opcode {
                Opcode::Alloca { name, allocated } => Some((name.as_str(), allocated)),
                _ => None,
            });
        params.chain(allocas)
    }
}

/// A module-level global variable. `ty` is the value type of the variable,
/// not the address through which the host addresses it.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalVariable {
    pub name: String,
    pub ty: Type,
}

/// A whole translation unit: globals and functions in their original order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub name: String,
    pub globals: Vec<GlobalVariable>,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            globals: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn push_global(&mut self, name: impl Into<String>, ty: Type) {
        self.globals.push(GlobalVariable {
            name: name.into(),
            ty,
        });
    }

    pub fn push_function(&mut self, function: Function) {
        self.functions.push(function);
    }

    /// Find a function by name.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}
