//! Literal decoding errors.

use thiserror::Error;

/// Errors that occur while decoding the text of a typed constant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    /// Not an optionally signed decimal number, or outside the `i64` range.
    #[error("invalid int literal '{0}'")]
    InvalidInt(String),

    /// Anything other than `true` or `false`.
    #[error("invalid bool literal '{0}' (expected 'true' or 'false')")]
    InvalidBool(String),

    /// Anything other than `nil`.
    #[error("invalid nil literal '{0}' (expected 'nil')")]
    InvalidNil(String),

    /// A backslash not followed by exactly three decimal digits.
    #[error("invalid escape sequence at byte {offset}")]
    InvalidEscape { offset: usize },

    /// Whitespace or `#` inside a string literal.
    #[error("character {ch:?} must be escaped at byte {offset}")]
    ForbiddenCharacter { ch: char, offset: usize },
}
