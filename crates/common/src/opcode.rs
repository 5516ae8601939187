//! Opcode definitions for the IPPcode19 instruction set.

use crate::operand::OperandKind;
use OperandKind::{Label, Symb, Type, Var};

/// Identifies the operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Frames and calls
    /// Copy a symbol into a variable.
    Move,
    /// Replace the temporary frame with a fresh, empty one.
    CreateFrame,
    /// Move the temporary frame onto the local frame stack.
    PushFrame,
    /// Move the top local frame back into the temporary frame.
    PopFrame,
    /// Declare an uninitialized variable.
    DefVar,
    /// Save the return position and jump to a label.
    Call,
    /// Jump back to the most recent call site.
    Return,

    // Operand stack
    /// Push a symbol onto the operand stack.
    Pushs,
    /// Pop the operand stack into a variable.
    Pops,

    // Arithmetic, relational, boolean, conversion
    Add,
    Sub,
    Mul,
    /// Truncating integer division.
    Idiv,
    Lt,
    Gt,
    Eq,
    And,
    Or,
    Not,
    /// Code point to single-character string.
    Int2Char,
    /// Code point of the character at an index.
    Stri2Int,

    // Input and output
    /// Read one line from the input and convert it to the requested type.
    Read,
    /// Print a symbol to standard output.
    Write,

    // Strings
    Concat,
    Strlen,
    GetChar,
    SetChar,

    // Types
    /// Store the type name of a symbol.
    Type,

    // Program flow
    Label,
    Jump,
    JumpIfEq,
    JumpIfNeq,
    /// Terminate with an exit code in `0..=49`.
    Exit,

    // Debugging
    /// Print a symbol to the diagnostic stream.
    Dprint,
    /// Print interpreter state to the diagnostic stream.
    Break,
}

/// All valid opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 35] = [
    Opcode::Move,
    Opcode::CreateFrame,
    Opcode::PushFrame,
    Opcode::PopFrame,
    Opcode::DefVar,
    Opcode::Call,
    Opcode::Return,
    Opcode::Pushs,
    Opcode::Pops,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Idiv,
    Opcode::Lt,
    Opcode::Gt,
    Opcode::Eq,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Int2Char,
    Opcode::Stri2Int,
    Opcode::Read,
    Opcode::Write,
    Opcode::Concat,
    Opcode::Strlen,
    Opcode::GetChar,
    Opcode::SetChar,
    Opcode::Type,
    Opcode::Label,
    Opcode::Jump,
    Opcode::JumpIfEq,
    Opcode::JumpIfNeq,
    Opcode::Exit,
    Opcode::Dprint,
    Opcode::Break,
];

impl Opcode {
    /// Returns the canonical (upper case) mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::DefVar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::Pushs => "PUSHS",
            Opcode::Pops => "POPS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Idiv => "IDIV",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Concat => "CONCAT",
            Opcode::Strlen => "STRLEN",
            Opcode::GetChar => "GETCHAR",
            Opcode::SetChar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::Exit => "EXIT",
            Opcode::Dprint => "DPRINT",
            Opcode::Break => "BREAK",
        }
    }

    /// Looks up an opcode by mnemonic, ignoring ASCII case.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(mnemonic))
            .copied()
    }

    /// The operand kinds this opcode takes, in order.
    pub fn signature(&self) -> &'static [OperandKind] {
        match self {
            Opcode::CreateFrame
            | Opcode::PushFrame
            | Opcode::PopFrame
            | Opcode::Return
            | Opcode::Break => &[],

            Opcode::DefVar | Opcode::Pops => &[Var],

            Opcode::Pushs | Opcode::Write | Opcode::Exit | Opcode::Dprint => &[Symb],

            Opcode::Call | Opcode::Label | Opcode::Jump => &[Label],

            Opcode::Move
            | Opcode::Not
            | Opcode::Int2Char
            | Opcode::Strlen
            | Opcode::Type => &[Var, Symb],

            Opcode::Read => &[Var, Type],

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Idiv
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq
            | Opcode::And
            | Opcode::Or
            | Opcode::Stri2Int
            | Opcode::Concat
            | Opcode::GetChar
            | Opcode::SetChar => &[Var, Symb, Symb],

            Opcode::JumpIfEq | Opcode::JumpIfNeq => &[Label, Symb, Symb],
        }
    }
}
