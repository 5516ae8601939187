//! IPPcode19 common types.
//!
//! This crate provides the data structures shared by the front-end and the
//! execution engine:
//!
//! - [`Opcode`]: the 35 instructions and their operand signatures
//! - [`Operand`], [`VarRef`], [`FrameKind`]: decoded operands
//! - [`DataType`]: `int`, `bool`, `string`, `nil`
//! - [`Value`]: runtime values, including the not-yet-assigned `Unset`
//! - [`Instruction`] and [`Program`]
//! - [`LiteralError`]: errors from decoding constant text
//!
//! # Dependencies
//!
//! This crate uses `thiserror` (compile-time proc-macro, zero runtime cost)
//! and has no other dependencies.

pub mod data_type;
pub mod error;
pub mod instruction;
pub mod opcode;
pub mod operand;
pub mod program;
pub mod value;

// Re-export commonly used types at the crate root.
pub use data_type::DataType;
pub use error::LiteralError;
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use operand::{FrameKind, Operand, OperandKind, VarRef};
pub use program::Program;
pub use value::Value;

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every i64 renders to an int literal that decodes to itself.
        #[test]
        fn int_literal_text_decodes(n in any::<i64>()) {
            let literal = Value::Int(n).to_literal().unwrap();
            let body = literal.strip_prefix("int@").unwrap();
            prop_assert_eq!(Value::parse_literal(DataType::Int, body), Ok(Value::Int(n)));
        }

        /// Any string survives escaping, and escaped text never contains
        /// control characters, spaces or `#`.
        #[test]
        fn escaped_strings_decode(text in "\\PC*|[ \\t\\n#\\\\]*") {
            let escaped = value::escape_string(&text);
            prop_assert!(!escaped.chars().any(|c| (c as u32) <= 32 || c == '#'));
            prop_assert_eq!(value::decode_string(&escaped), Ok(text));
        }

        /// Decoding arbitrary text either succeeds or fails with a specific
        /// error, and never panics.
        #[test]
        fn decode_arbitrary_text(text in "\\PC{0,40}") {
            match value::decode_string(&text) {
                Ok(_) => {}
                Err(LiteralError::InvalidEscape { .. })
                | Err(LiteralError::ForbiddenCharacter { .. }) => {}
                Err(other) => prop_assert!(false, "unexpected error {other:?}"),
            }
        }
    }
}
