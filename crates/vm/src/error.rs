//! Runtime errors for the IPPcode19 engine.
//!
//! Every error includes the instruction index (`at`) for debugging and
//! maps to one of the process exit codes in [`RuntimeError::exit_code`].

use crate::frame::FrameError;
use ippi_common::FrameKind;
use thiserror::Error;

/// Errors that halt execution.
///
/// All of these are fatal. The only recoverable condition in the engine,
/// a `READ` whose input does not parse, never produces an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The instruction's operands do not fit its signature. The front-end
    /// rejects such programs, so this only happens for hand-built ones,
    /// and is reported before execution starts.
    #[error("malformed operands for {opcode} at instruction {at}")]
    MalformedInstruction { at: usize, opcode: &'static str },

    /// Jump or call to a label that is never declared.
    #[error("undefined label '{label}' at instruction {at}")]
    UndefinedLabel { at: usize, label: String },

    /// The same label declared twice. Found before execution starts.
    #[error("label '{label}' redeclared at instruction {at}")]
    DuplicateLabel { at: usize, label: String },

    /// RETURN with no pending call.
    #[error("RETURN with empty call stack at instruction {at}")]
    EmptyCallStack { at: usize },

    /// DEFVAR of a name that already exists in the frame.
    #[error("variable {var} redeclared at instruction {at}")]
    VariableRedeclared { at: usize, var: String },

    /// An operand has a type the operation does not accept.
    #[error("type mismatch at instruction {at}: expected {expected}, found {found}")]
    TypeMismatch {
        at: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// A variable that was never declared in its frame.
    #[error("undeclared variable {var} at instruction {at}")]
    UndeclaredVariable { at: usize, var: String },

    /// Access to a temporary or local frame that does not exist.
    #[error("frame {frame} is not initialized at instruction {at}")]
    FrameNotInitialized { at: usize, frame: FrameKind },

    /// POPFRAME with an empty local frame stack.
    #[error("POPFRAME with no local frame at instruction {at}")]
    NoLocalFrame { at: usize },

    /// Read of a declared but never assigned variable.
    #[error("uninitialized variable {var} at instruction {at}")]
    UninitializedVariable { at: usize, var: String },

    /// POPS on an empty operand stack.
    #[error("operand stack underflow at instruction {at}")]
    StackUnderflow { at: usize },

    /// IDIV by zero.
    #[error("division by zero at instruction {at}")]
    DivisionByZero { at: usize },

    /// EXIT with a code outside `0..=49`.
    #[error("exit code {code} out of range 0..=49 at instruction {at}")]
    InvalidExitCode { at: usize, code: i64 },

    /// String index outside the string.
    #[error("index {index} out of range (length {length}) at instruction {at}")]
    IndexOutOfRange { at: usize, index: i64, length: usize },

    /// INT2CHAR of a value that is not a Unicode scalar value.
    #[error("{code} is not a Unicode scalar value at instruction {at}")]
    InvalidCodePoint { at: usize, code: i64 },

    /// SETCHAR with an empty replacement string.
    #[error("SETCHAR with empty replacement at instruction {at}")]
    EmptyReplacement { at: usize },
}

impl RuntimeError {
    /// The process exit code this error terminates with.
    pub fn exit_code(&self) -> i32 {
        match self {
            RuntimeError::MalformedInstruction { .. } => 32,
            RuntimeError::UndefinedLabel { .. }
            | RuntimeError::DuplicateLabel { .. }
            | RuntimeError::EmptyCallStack { .. }
            | RuntimeError::VariableRedeclared { .. } => 52,
            RuntimeError::TypeMismatch { .. } => 53,
            RuntimeError::UndeclaredVariable { .. } => 54,
            RuntimeError::FrameNotInitialized { .. } | RuntimeError::NoLocalFrame { .. } => 55,
            RuntimeError::UninitializedVariable { .. } | RuntimeError::StackUnderflow { .. } => 56,
            RuntimeError::DivisionByZero { .. } | RuntimeError::InvalidExitCode { .. } => 57,
            RuntimeError::IndexOutOfRange { .. }
            | RuntimeError::InvalidCodePoint { .. }
            | RuntimeError::EmptyReplacement { .. } => 58,
        }
    }

    /// Attach an instruction index to a frame set failure.
    pub(crate) fn from_frame(err: FrameError, at: usize) -> Self {
        match err {
            FrameError::NotInitialized(frame) => RuntimeError::FrameNotInitialized { at, frame },
            FrameError::NoLocalFrame => RuntimeError::NoLocalFrame { at },
            FrameError::Undeclared(var) => RuntimeError::UndeclaredVariable {
                at,
                var: var.to_string(),
            },
            FrameError::Redeclared(var) => RuntimeError::VariableRedeclared {
                at,
                var: var.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ippi_common::VarRef;

    #[test]
    fn error_display_formats() {
        assert_eq!(
            RuntimeError::DivisionByZero { at: 5 }.to_string(),
            "division by zero at instruction 5"
        );
        assert_eq!(
            RuntimeError::TypeMismatch {
                at: 2,
                expected: "int",
                found: "string"
            }
            .to_string(),
            "type mismatch at instruction 2: expected int, found string"
        );
        assert_eq!(
            RuntimeError::FrameNotInitialized {
                at: 0,
                frame: FrameKind::Temporary
            }
            .to_string(),
            "frame TF is not initialized at instruction 0"
        );
    }

    #[test]
    fn exit_codes() {
        assert_eq!(RuntimeError::EmptyCallStack { at: 0 }.exit_code(), 52);
        assert_eq!(
            RuntimeError::UndefinedLabel {
                at: 0,
                label: "x".to_string()
            }
            .exit_code(),
            52
        );
        assert_eq!(RuntimeError::NoLocalFrame { at: 0 }.exit_code(), 55);
        assert_eq!(RuntimeError::StackUnderflow { at: 0 }.exit_code(), 56);
        assert_eq!(RuntimeError::InvalidExitCode { at: 0, code: 50 }.exit_code(), 57);
        assert_eq!(RuntimeError::EmptyReplacement { at: 0 }.exit_code(), 58);
    }

    #[test]
    fn frame_errors_keep_location() {
        let var = VarRef::new(FrameKind::Global, "x");
        assert_eq!(
            RuntimeError::from_frame(FrameError::Undeclared(var.clone()), 7),
            RuntimeError::UndeclaredVariable {
                at: 7,
                var: "GF@x".to_string()
            }
        );
        assert_eq!(RuntimeError::from_frame(FrameError::Redeclared(var), 3).exit_code(), 52);
        assert_eq!(
            RuntimeError::from_frame(FrameError::NotInitialized(FrameKind::Local), 1).exit_code(),
            55
        );
    }
}
