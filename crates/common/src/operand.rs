//! Instruction operands: variable references, constants, labels, types.

use crate::data_type::DataType;
use crate::value::Value;
use std::fmt;

/// Which member of the frame set a variable reference names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// `GF`: lives for the whole run.
    Global,
    /// `LF`: the top of the local frame stack.
    Local,
    /// `TF`: the temporary frame.
    Temporary,
}

impl FrameKind {
    /// Returns the two-letter source prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            FrameKind::Global => "GF",
            FrameKind::Local => "LF",
            FrameKind::Temporary => "TF",
        }
    }

    /// Parses a two-letter source prefix.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "GF" => Some(FrameKind::Global),
            "LF" => Some(FrameKind::Local),
            "TF" => Some(FrameKind::Temporary),
            _ => None,
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A `<frame>@<name>` variable reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarRef {
    pub frame: FrameKind,
    pub name: String,
}

impl VarRef {
    pub fn new(frame: FrameKind, name: impl Into<String>) -> Self {
        Self {
            frame,
            name: name.into(),
        }
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.frame, self.name)
    }
}

/// The static kind of an operand position in an opcode signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// Must be a variable reference.
    Var,
    /// A variable reference or a typed constant.
    Symb,
    /// A label name.
    Label,
    /// A type name (only `READ` uses this).
    Type,
}

impl OperandKind {
    pub fn name(&self) -> &'static str {
        match self {
            OperandKind::Var => "var",
            OperandKind::Symb => "symb",
            OperandKind::Label => "label",
            OperandKind::Type => "type",
        }
    }
}

/// A decoded operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Var(VarRef),
    Const(Value),
    Label(String),
    Type(DataType),
}

impl Operand {
    /// Returns true if this operand may fill a position of the given kind.
    pub fn fits(&self, kind: OperandKind) -> bool {
        matches!(
            (self, kind),
            (Operand::Var(_), OperandKind::Var | OperandKind::Symb)
                | (Operand::Const(_), OperandKind::Symb)
                | (Operand::Label(_), OperandKind::Label)
                | (Operand::Type(_), OperandKind::Type)
        )
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Var(var) => write!(f, "{var}"),
            Operand::Const(value) => f.write_str(&value.to_literal().unwrap_or_default()),
            Operand::Label(label) => f.write_str(label),
            Operand::Type(dt) => write!(f, "{dt}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_prefix_roundtrip() {
        for kind in [FrameKind::Global, FrameKind::Local, FrameKind::Temporary] {
            assert_eq!(FrameKind::from_prefix(kind.prefix()), Some(kind));
        }
        assert_eq!(FrameKind::from_prefix("gf"), None);
        assert_eq!(FrameKind::from_prefix("XF"), None);
    }

    #[test]
    fn var_ref_display() {
        assert_eq!(VarRef::new(FrameKind::Temporary, "counter").to_string(), "TF@counter");
    }

    #[test]
    fn operand_fits_signature_kinds() {
        let var = Operand::Var(VarRef::new(FrameKind::Global, "x"));
        let constant = Operand::Const(Value::Int(1));
        let label = Operand::Label("loop".to_string());
        let ty = Operand::Type(DataType::Int);

        assert!(var.fits(OperandKind::Var));
        assert!(var.fits(OperandKind::Symb));
        assert!(!var.fits(OperandKind::Label));

        assert!(constant.fits(OperandKind::Symb));
        assert!(!constant.fits(OperandKind::Var));

        assert!(label.fits(OperandKind::Label));
        assert!(!label.fits(OperandKind::Symb));

        assert!(ty.fits(OperandKind::Type));
        assert!(!ty.fits(OperandKind::Symb));
    }

    #[test]
    fn operand_display() {
        assert_eq!(Operand::Const(Value::Nil).to_string(), "nil@nil");
        assert_eq!(Operand::Type(DataType::Bool).to_string(), "bool");
        assert_eq!(Operand::Label("end".to_string()).to_string(), "end");
    }
}
