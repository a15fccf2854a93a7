//! Entity Walkers and Module Driver
//!
//! One synchronous pass over a [`Module`]: eligible globals first, then for
//! each eligible function its locals, its floating-point operations, and its
//! tunable calls. Each walk classifies the entity, generates its candidate
//! set, and hands the finished record to the emitter; nothing is buffered and
//! no entity is visited twice.

use std::io::{self, Write};

use tracing::warn;

use crate::candidates::{candidates, operator_candidates};
use crate::classify::{classify, is_fp_reachable, is_fp_scalar};
use crate::emit::RecordWriter;
use crate::filter::FilterPolicy;
use crate::ir::{Function, Instruction, Module, Opcode, Type};

/// Toggles for one catalog run.
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// Restrict candidates to precisions at or above each entity's declared
    /// precision instead of the exhaustive triple.
    pub original_type: bool,
    /// Scan arithmetic/comparison operations.
    pub list_operators: bool,
    /// Scan calls to tunable math functions.
    pub list_calls: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            original_type: false,
            list_operators: true,
            list_calls: true,
        }
    }
}

/// The catalog pass. Borrows the loaded filter policy; one instance runs one
/// module traversal at a time.
pub struct SearchFilePass<'p> {
    policy: &'p FilterPolicy,
    options: SearchOptions,
}

impl<'p> SearchFilePass<'p> {
    pub fn new(policy: &'p FilterPolicy, options: SearchOptions) -> Self {
        SearchFilePass { policy, options }
    }

    /// Traverse the module and write the complete search file to `out`.
    pub fn run<W: Write>(&self, module: &Module, out: W) -> io::Result<()> {
        let mut writer = RecordWriter::new(out)?;

        self.find_global_variables(module, &mut writer)?;

        for function in &module.functions {
            if !function.is_declaration && self.policy.function_eligible(&function.name) {
                self.run_on_function(function, &mut writer)?;
            }
        }

        writer.finish()?;
        Ok(())
    }

    /// The type-level gate shared by the global and local scans: a
    /// floating-point scalar, or floating-point storage reachable through
    /// array/pointer layers.
    fn tunable_type(ty: &Type) -> bool {
        is_fp_scalar(ty) || is_fp_reachable(ty)
    }

    fn find_global_variables<W: Write>(
        &self,
        module: &Module,
        writer: &mut RecordWriter<W>,
    ) -> io::Result<()> {
        for global in &module.globals {
            if self.policy.global_eligible(&global.name) && Self::tunable_type(&global.ty) {
                let set = candidates(&classify(&global.ty), self.options.original_type);
                writer.global_var(&global.name, &set)?;
            }
        }
        Ok(())
    }

    fn run_on_function<W: Write>(
        &self,
        function: &Function,
        writer: &mut RecordWriter<W>,
    ) -> io::Result<()> {
        self.find_local_variables(function, writer)?;

        if self.options.list_operators {
            self.find_operators(function, writer)?;
        }

        if self.options.list_calls {
            self.find_function_calls(function, writer)?;
        }

        Ok(())
    }

    /// The function's declared source file, read best-effort from the entry
    /// block terminator's debug location.
    fn source_file(function: &Function) -> Option<&str> {
        function
            .entry_block()?
            .terminator()?
            .debug_loc
            .as_ref()
            .map(|loc| loc.file.as_str())
    }

    /// The stable identifier for an operation/call record. Missing metadata
    /// is non-fatal: the record is still emitted with an empty id.
    fn instruction_id(function: &Function, inst: &Instruction) -> String {
        match inst.stable_id() {
            Some(id) => id.to_string(),
            None => {
                warn!(
                    target: "fpscout::walk",
                    function = %function.name,
                    opcode = inst.opcode.name(),
                    "instruction has no stable identifier"
                );
                String::new()
            }
        }
    }

    fn find_local_variables<W: Write>(
        &self,
        function: &Function,
        writer: &mut RecordWriter<W>,
    ) -> io::Result<()> {
        let file = Self::source_file(function);

        for (name, ty) in function.named_locals() {
            // Struct locals with floating-point fields are not decomposed.
            if self.policy.local_eligible(name) && Self::tunable_type(ty) {
                let set = candidates(&classify(ty), self.options.original_type);
                writer.local_var(file, &function.name, name, &set)?;
            }
        }
        Ok(())
    }

    fn find_operators<W: Write>(
        &self,
        function: &Function,
        writer: &mut RecordWriter<W>,
    ) -> io::Result<()> {
        for block in &function.blocks {
            for inst in &block.instructions {
                match inst.opcode {
                    Opcode::FAdd | Opcode::FSub | Opcode::FMul | Opcode::FDiv | Opcode::FCmp => {
                        let id = Self::instruction_id(function, inst);
                        writer.operation(
                            &id,
                            &function.name,
                            inst.opcode.name(),
                            &operator_candidates(),
                        )?;
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn find_function_calls<W: Write>(
        &self,
        function: &Function,
        writer: &mut RecordWriter<W>,
    ) -> io::Result<()> {
        for block in &function.blocks {
            for inst in &block.instructions {
                if let Opcode::Call {
                    callee: Some(callee),
                } = &inst.opcode
                {
                    if self.policy.call_tunable(callee) {
                        let id = Self::instruction_id(function, inst);
                        writer.call(&id, &function.name, callee)?;
                    }
                }
            }
        }
        Ok(())
    }
}
