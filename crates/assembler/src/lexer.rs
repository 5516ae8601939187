//! Tokenizer for IPPcode19 source text.

use crate::error::AsmError;
use ippi_common::{DataType, FrameKind, Value, VarRef};
use std::fmt;

/// The header every program starts with.
pub(crate) const HEADER: &str = ".IPPcode19";

/// A single token from a source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// A bare identifier: opcode mnemonic, label name, or type name.
    Word(String),
    /// `GF@name`, `LF@name` or `TF@name`.
    Var(VarRef),
    /// A typed constant such as `int@5` or `string@a\032b`.
    Const(Value),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(word) => f.write_str(word),
            Token::Var(var) => write!(f, "{var}"),
            Token::Const(value) => f.write_str(&value.to_literal().unwrap_or_default()),
        }
    }
}

/// Remove a `#` comment and surrounding whitespace.
pub(crate) fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
    .trim()
}

/// True if the (comment-stripped) line is the program header.
pub(crate) fn is_header(line: &str) -> bool {
    strip_comment(line).eq_ignore_ascii_case(HEADER)
}

/// Identifier rule shared by variable and label names.
pub(crate) fn is_identifier(name: &str) -> bool {
    const SPECIAL: &[char] = &['_', '-', '$', '&', '%', '*', '!', '?'];
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || SPECIAL.contains(&first) => {
            chars.all(|c| c.is_ascii_alphanumeric() || SPECIAL.contains(&c))
        }
        _ => false,
    }
}

/// Tokenize a single line of source text.
///
/// Returns an empty Vec for blank lines and comment-only lines.
/// Comments start with `#` and extend to end of line.
pub(crate) fn tokenize_line(line: &str, line_num: usize) -> Result<Vec<Token>, AsmError> {
    strip_comment(line)
        .split_whitespace()
        .map(|word| classify(word, line_num))
        .collect()
}

fn classify(word: &str, line_num: usize) -> Result<Token, AsmError> {
    let invalid = || AsmError::InvalidIdentifier {
        line: line_num,
        token: word.to_string(),
    };

    let Some((prefix, rest)) = word.split_once('@') else {
        return if is_identifier(word) {
            Ok(Token::Word(word.to_string()))
        } else {
            Err(invalid())
        };
    };

    if let Some(frame) = FrameKind::from_prefix(prefix) {
        if !is_identifier(rest) {
            return Err(invalid());
        }
        return Ok(Token::Var(VarRef::new(frame, rest)));
    }

    let data_type = DataType::from_name(prefix).ok_or_else(invalid)?;
    Value::parse_literal(data_type, rest)
        .map(Token::Const)
        .map_err(|source| AsmError::InvalidLiteral {
            line: line_num,
            token: word.to_string(),
            source,
        })
}
