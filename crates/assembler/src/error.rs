//! Error types for the IPPcode19 front-end.

use ippi_common::LiteralError;
use thiserror::Error;

/// Errors produced while reading an IPPcode19 program, as source text or
/// as XML.
///
/// Line numbers are 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// The first non-blank, non-comment line is not `.IPPcode19`.
    #[error("line {line}: missing .IPPcode19 header")]
    MissingHeader { line: usize },

    /// An unrecognized opcode mnemonic was encountered.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// An opcode was given too few or too many operands.
    #[error("line {line}: {opcode} expects {expected} operand(s), found {found}")]
    WrongOperandCount {
        line: usize,
        opcode: &'static str,
        expected: usize,
        found: usize,
    },

    /// A `var` position holds something other than a variable.
    #[error("line {line}: {opcode} operand {position} must be a variable, found '{token}'")]
    ExpectedVariable {
        line: usize,
        opcode: &'static str,
        position: usize,
        token: String,
    },

    /// A `symb` position holds neither a variable nor a constant.
    #[error("line {line}: {opcode} operand {position} must be a variable or constant, found '{token}'")]
    ExpectedSymbol {
        line: usize,
        opcode: &'static str,
        position: usize,
        token: String,
    },

    /// A `label` position holds something other than a label name.
    #[error("line {line}: {opcode} operand {position} must be a label, found '{token}'")]
    ExpectedLabel {
        line: usize,
        opcode: &'static str,
        position: usize,
        token: String,
    },

    /// A `type` position holds something other than `int`, `bool` or `string`.
    #[error("line {line}: {opcode} operand {position} must be a type name, found '{token}'")]
    ExpectedType {
        line: usize,
        opcode: &'static str,
        position: usize,
        token: String,
    },

    /// A name that breaks the identifier rules, or an unknown `@` prefix.
    #[error("line {line}: invalid identifier '{token}'")]
    InvalidIdentifier { line: usize, token: String },

    /// A typed constant whose text does not decode.
    #[error("line {line}: invalid literal '{token}': {source}")]
    InvalidLiteral {
        line: usize,
        token: String,
        source: LiteralError,
    },

    /// The XML document is not well formed.
    #[error("line {line}: malformed XML: {message}")]
    MalformedXml { line: usize, message: String },

    /// A well-formed XML document that does not describe a program.
    #[error("line {line}: unexpected XML structure: {message}")]
    UnexpectedXml { line: usize, message: String },
}

impl AsmError {
    /// The process exit code for this error: 31 for a missing header or
    /// malformed XML, 32 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            AsmError::MissingHeader { .. } | AsmError::MalformedXml { .. } => 31,
            _ => 32,
        }
    }

    /// The 1-based source line the error was found on.
    pub fn line(&self) -> usize {
        match self {
            AsmError::MissingHeader { line }
            | AsmError::UnknownOpcode { line, .. }
            | AsmError::WrongOperandCount { line, .. }
            | AsmError::ExpectedVariable { line, .. }
            | AsmError::ExpectedSymbol { line, .. }
            | AsmError::ExpectedLabel { line, .. }
            | AsmError::ExpectedType { line, .. }
            | AsmError::InvalidIdentifier { line, .. }
            | AsmError::InvalidLiteral { line, .. }
            | AsmError::MalformedXml { line, .. }
            | AsmError::UnexpectedXml { line, .. } => *line,
        }
    }
}
