//! A single decoded instruction.
//!
//! Instructions reach the engine already validated by the front-end: the
//! opcode is known and every operand fits the kind its position requires
//! (see [`Opcode::signature`]). The engine only performs dynamic checks.

use crate::opcode::Opcode;
use crate::operand::Operand;
use std::fmt;

/// One instruction: an opcode plus its operands in signature order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// Operands, in the order given by `opcode.signature()`.
    pub operands: Vec<Operand>,
}

impl Instruction {
    /// Create a new instruction.
    pub fn new(opcode: Opcode, operands: Vec<Operand>) -> Self {
        Self { opcode, operands }
    }

    /// Returns true if the operands match the opcode signature in count
    /// and kind.
    pub fn is_well_formed(&self) -> bool {
        let signature = self.opcode.signature();
        signature.len() == self.operands.len()
            && self
                .operands
                .iter()
                .zip(signature)
                .all(|(operand, &kind)| operand.fits(kind))
    }

    /// The operand at `index`, if present.
    pub fn operand(&self, index: usize) -> Option<&Operand> {
        self.operands.get(index)
    }

    /// The label name of a `LABEL` instruction.
    pub fn label_name(&self) -> Option<&str> {
        match (self.opcode, self.operands.first()) {
            (Opcode::Label, Some(Operand::Label(name))) => Some(name),
            _ => None,
        }
    }
}

/// Canonical source form: upper case mnemonic, operands separated by a
/// single space.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode.mnemonic())?;
        for operand in &self.operands {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_type::DataType;
    use crate::operand::{FrameKind, VarRef};
    use crate::value::Value;

    fn gf(name: &str) -> Operand {
        Operand::Var(VarRef::new(FrameKind::Global, name))
    }

    #[test]
    fn well_formed_matches_signature() {
        let add = Instruction::new(
            Opcode::Add,
            vec![gf("x"), gf("y"), Operand::Const(Value::Int(1))],
        );
        assert!(add.is_well_formed());
    }

    #[test]
    fn wrong_arity_is_not_well_formed() {
        let add = Instruction::new(Opcode::Add, vec![gf("x"), gf("y")]);
        assert!(!add.is_well_formed());
        let brk = Instruction::new(Opcode::Break, vec![gf("x")]);
        assert!(!brk.is_well_formed());
    }

    #[test]
    fn constant_in_var_position_is_not_well_formed() {
        let mv = Instruction::new(
            Opcode::Move,
            vec![Operand::Const(Value::Int(1)), gf("x")],
        );
        assert!(!mv.is_well_formed());
    }

    #[test]
    fn label_name_only_for_label() {
        let label = Instruction::new(Opcode::Label, vec![Operand::Label("top".to_string())]);
        assert_eq!(label.label_name(), Some("top"));
        let jump = Instruction::new(Opcode::Jump, vec![Operand::Label("top".to_string())]);
        assert_eq!(jump.label_name(), None);
    }

    #[test]
    fn display_canonical_text() {
        let read = Instruction::new(
            Opcode::Read,
            vec![
                Operand::Var(VarRef::new(FrameKind::Local, "n")),
                Operand::Type(DataType::Int),
            ],
        );
        assert_eq!(read.to_string(), "READ LF@n int");

        let write = Instruction::new(
            Opcode::Write,
            vec![Operand::Const(Value::Str("hi there".to_string()))],
        );
        assert_eq!(write.to_string(), "WRITE string@hi\\032there");

        let brk = Instruction::new(Opcode::Break, vec![]);
        assert_eq!(brk.to_string(), "BREAK");
    }
}
