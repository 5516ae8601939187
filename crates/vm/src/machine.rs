//! VM state management: frame set, operand stack, call stack, label table,
//! and operand resolution.

use crate::error::RuntimeError;
use crate::frame::{Frame, FrameSet};
use crate::io::Io;
use ippi_common::{DataType, FrameKind, Instruction, Operand, Program, Value, VarRef};
use std::collections::HashMap;
use std::fmt::Write as _;
use tracing::trace;

/// The IPPcode19 execution engine.
///
/// Owns all mutable run state. Nothing is shared: a fresh `VM` per run.
pub struct VM<'a> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    /// GF, TF and the LF stack.
    pub(crate) frames: FrameSet,
    /// Operand stack for PUSHS / POPS.
    pub(crate) stack: Vec<Value>,
    /// Return positions: the index of each pending CALL.
    pub(crate) call_stack: Vec<usize>,
    /// Label name to the index of its LABEL instruction.
    pub(crate) labels: HashMap<&'a str, usize>,
    /// Index of the instruction being executed.
    pub(crate) pc: usize,
    /// Instructions executed so far.
    pub(crate) executed: u64,
    pub(crate) io: Io<'a>,
}

impl<'a> VM<'a> {
    /// Create a new VM for the given program.
    pub fn new(program: &'a Program, io: Io<'a>) -> Self {
        Self {
            program,
            frames: FrameSet::new(),
            stack: Vec::new(),
            call_stack: Vec::new(),
            labels: HashMap::new(),
            pc: 0,
            executed: 0,
            io,
        }
    }

    /// Build the label table. A label declared twice, or an instruction
    /// whose operands do not fit its signature, is fatal before any
    /// instruction runs.
    pub(crate) fn scan_labels(&mut self) -> Result<(), RuntimeError> {
        let program = self.program;
        for (index, instr) in program.instructions.iter().enumerate() {
            if !instr.is_well_formed() {
                return Err(RuntimeError::MalformedInstruction {
                    at: index,
                    opcode: instr.opcode.mnemonic(),
                });
            }
            if let Some(name) = instr.label_name() {
                if self.labels.insert(name, index).is_some() {
                    return Err(RuntimeError::DuplicateLabel {
                        at: index,
                        label: name.to_string(),
                    });
                }
                trace!(label = name, index, "label registered");
            }
        }
        Ok(())
    }

    /// Push a value onto the operand stack.
    pub(crate) fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Pop a value from the operand stack.
    pub(crate) fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack
            .pop()
            .ok_or(RuntimeError::StackUnderflow { at: self.pc })
    }

    pub(crate) fn malformed(&self, instr: &Instruction) -> RuntimeError {
        RuntimeError::MalformedInstruction {
            at: self.pc,
            opcode: instr.opcode.mnemonic(),
        }
    }

    /// The variable operand at `index`, checked to exist in its frame.
    ///
    /// Used for destinations: the slot's current value is not needed, but
    /// the frame and the declaration are validated before any work is done.
    pub(crate) fn target(
        &self,
        instr: &'a Instruction,
        index: usize,
    ) -> Result<&'a VarRef, RuntimeError> {
        match instr.operand(index) {
            Some(Operand::Var(var)) => {
                self.frames
                    .slot(var)
                    .map_err(|e| RuntimeError::from_frame(e, self.pc))?;
                Ok(var)
            }
            _ => Err(self.malformed(instr)),
        }
    }

    /// Resolve a symbol without requiring it to be initialized.
    pub(crate) fn resolve(&self, instr: &Instruction, index: usize) -> Result<Value, RuntimeError> {
        match instr.operand(index) {
            Some(Operand::Const(value)) => Ok(value.clone()),
            Some(Operand::Var(var)) => self
                .frames
                .slot(var)
                .map(|slot| slot.value().clone())
                .map_err(|e| RuntimeError::from_frame(e, self.pc)),
            _ => Err(self.malformed(instr)),
        }
    }

    /// Resolve a symbol for reading. Uninitialized variables are fatal.
    pub(crate) fn symbol(&self, instr: &Instruction, index: usize) -> Result<Value, RuntimeError> {
        let value = self.resolve(instr, index)?;
        if value.is_set() {
            return Ok(value);
        }
        let var = match instr.operand(index) {
            Some(Operand::Var(var)) => var.to_string(),
            _ => String::new(),
        };
        Err(RuntimeError::UninitializedVariable { at: self.pc, var })
    }

    /// The type operand of READ.
    pub(crate) fn type_operand(
        &self,
        instr: &Instruction,
        index: usize,
    ) -> Result<DataType, RuntimeError> {
        match instr.operand(index) {
            Some(Operand::Type(dt)) => Ok(*dt),
            _ => Err(self.malformed(instr)),
        }
    }

    /// Resolve the label operand at `index` to its instruction index.
    pub(crate) fn label_target(
        &self,
        instr: &Instruction,
        index: usize,
    ) -> Result<usize, RuntimeError> {
        match instr.operand(index) {
            Some(Operand::Label(name)) => {
                self.labels
                    .get(name.as_str())
                    .copied()
                    .ok_or_else(|| RuntimeError::UndefinedLabel {
                        at: self.pc,
                        label: name.clone(),
                    })
            }
            _ => Err(self.malformed(instr)),
        }
    }

    /// Store into a variable that [`VM::target`] already validated.
    pub(crate) fn assign(&mut self, var: &VarRef, value: Value) -> Result<(), RuntimeError> {
        self.frames
            .assign(var, value)
            .map_err(|e| RuntimeError::from_frame(e, self.pc))
    }

    /// Human-readable snapshot of the run state, one item per line.
    pub(crate) fn state_report(&self) -> String {
        let mut report = String::new();
        let _ = writeln!(report, "position: {}", self.pc);
        let _ = writeln!(report, "executed: {}", self.executed);
        write_frame(&mut report, "GF", Some(self.frames.global()));
        write_frame(&mut report, "TF", self.frames.temporary());
        let _ = writeln!(report, "LF depth: {}", self.frames.local_depth());
        write_frame(&mut report, "LF", self.frames.frame(FrameKind::Local).ok());
        let _ = writeln!(report, "operand stack: {}", self.stack.len());
        let _ = writeln!(report, "call stack: {}", self.call_stack.len());
        report
    }
}

fn write_frame(report: &mut String, label: &str, frame: Option<&Frame>) {
    let Some(frame) = frame else {
        let _ = writeln!(report, "{label}: <undefined>");
        return;
    };
    let _ = write!(report, "{label}:");
    for (name, slot) in frame.iter() {
        match slot.value().to_literal() {
            Some(literal) => {
                let _ = write!(report, " {name}={literal}");
            }
            None => {
                let _ = write!(report, " {name}=<unset>");
            }
        }
    }
    report.push('\n');
}
