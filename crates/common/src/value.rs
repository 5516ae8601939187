//! Runtime value representation and literal decoding.
//!
//! Values are what live in variable slots and on the operand stack.

use crate::data_type::DataType;
use crate::error::LiteralError;
use std::fmt;

/// Runtime value representation.
///
/// Every variable slot and every operand stack entry holds exactly one of
/// these. `Unset` marks a slot created by `DEFVAR` that has not been
/// assigned yet; it never appears on the operand stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// Boolean value.
    Bool(bool),
    /// String of Unicode scalar values.
    Str(String),
    /// The `nil` value.
    Nil,
    /// Declared but never assigned.
    Unset,
}

impl Value {
    /// Returns the data type of this value, or `None` for [`Value::Unset`].
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Int(_) => Some(DataType::Int),
            Value::Bool(_) => Some(DataType::Bool),
            Value::Str(_) => Some(DataType::String),
            Value::Nil => Some(DataType::Nil),
            Value::Unset => None,
        }
    }

    /// Name of the value's type as produced by the `TYPE` instruction.
    ///
    /// Empty for [`Value::Unset`].
    pub fn type_name(&self) -> &'static str {
        self.data_type().map(|dt| dt.name()).unwrap_or("")
    }

    /// Returns true unless this is [`Value::Unset`].
    pub fn is_set(&self) -> bool {
        !matches!(self, Value::Unset)
    }

    /// Decode the text of a typed constant (`int@…`, `string@…`, …).
    ///
    /// Decoding is total and strict: the text either denotes exactly one
    /// value of the requested type or an error is returned.
    pub fn parse_literal(data_type: DataType, text: &str) -> Result<Value, LiteralError> {
        match data_type {
            DataType::Int => text
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| LiteralError::InvalidInt(text.to_string())),
            DataType::Bool => match text {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(LiteralError::InvalidBool(text.to_string())),
            },
            DataType::Nil => match text {
                "nil" => Ok(Value::Nil),
                _ => Err(LiteralError::InvalidNil(text.to_string())),
            },
            DataType::String => decode_string(text).map(Value::Str),
        }
    }

    /// Render this value as constant source text, e.g. `int@-3` or
    /// `string@a\032b`. Returns `None` for [`Value::Unset`].
    pub fn to_literal(&self) -> Option<String> {
        let body = match self {
            Value::Int(i) => i.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Str(s) => escape_string(s),
            Value::Nil => "nil".to_string(),
            Value::Unset => return None,
        };
        Some(format!("{}@{}", self.type_name(), body))
    }
}

/// The `WRITE` form: bools as `true`/`false`, nil and unset as empty text.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => f.write_str(s),
            Value::Nil | Value::Unset => Ok(()),
        }
    }
}

/// Characters that may only appear escaped in a string literal, besides `\`.
fn must_escape(ch: char) -> bool {
    (ch as u32) <= 32 || ch == '#'
}

/// Decode a string literal body, expanding `\DDD` escapes.
pub fn decode_string(text: &str) -> Result<String, LiteralError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices();

    while let Some((offset, ch)) = chars.next() {
        if ch == '\\' {
            let code = text
                .get(offset + 1..offset + 4)
                .filter(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|digits| digits.parse::<u32>().ok())
                .and_then(char::from_u32)
                .ok_or(LiteralError::InvalidEscape { offset })?;
            out.push(code);
            // The three digits are ASCII, one char each.
            chars.nth(2);
        } else if must_escape(ch) {
            return Err(LiteralError::ForbiddenCharacter { ch, offset });
        } else {
            out.push(ch);
        }
    }

    Ok(out)
}

/// Encode a string as a literal body. Inverse of [`decode_string`].
pub fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '\\' || must_escape(ch) {
            out.push_str(&format!("\\{:03}", ch as u32));
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_types() {
        assert_eq!(Value::Int(1).data_type(), Some(DataType::Int));
        assert_eq!(Value::Bool(true).data_type(), Some(DataType::Bool));
        assert_eq!(Value::Str(String::new()).data_type(), Some(DataType::String));
        assert_eq!(Value::Nil.data_type(), Some(DataType::Nil));
        assert_eq!(Value::Unset.data_type(), None);
    }

    #[test]
    fn type_names() {
        assert_eq!(Value::Int(0).type_name(), "int");
        assert_eq!(Value::Nil.type_name(), "nil");
        assert_eq!(Value::Unset.type_name(), "");
    }

    #[test]
    fn equality_requires_same_variant() {
        assert_eq!(Value::Int(42), Value::Int(42));
        assert_ne!(Value::Int(1), Value::Bool(true));
        assert_ne!(Value::Str("nil".to_string()), Value::Nil);
        assert_eq!(Value::Nil, Value::Nil);
    }

    #[test]
    fn display_write_form() {
        assert_eq!(Value::Int(-8).to_string(), "-8");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Str("a b".to_string()).to_string(), "a b");
        assert_eq!(Value::Nil.to_string(), "");
        assert_eq!(Value::Unset.to_string(), "");
    }

    #[test]
    fn parse_int_literals() {
        assert_eq!(Value::parse_literal(DataType::Int, "42"), Ok(Value::Int(42)));
        assert_eq!(Value::parse_literal(DataType::Int, "-7"), Ok(Value::Int(-7)));
        assert_eq!(Value::parse_literal(DataType::Int, "+7"), Ok(Value::Int(7)));
        assert_eq!(
            Value::parse_literal(DataType::Int, "9223372036854775807"),
            Ok(Value::Int(i64::MAX))
        );
    }

    #[test]
    fn parse_int_rejects_non_decimal() {
        for bad in ["", "1.5", "0x10", "abc", " 1", "9223372036854775808"] {
            assert_eq!(
                Value::parse_literal(DataType::Int, bad),
                Err(LiteralError::InvalidInt(bad.to_string())),
                "'{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn parse_bool_and_nil() {
        assert_eq!(Value::parse_literal(DataType::Bool, "true"), Ok(Value::Bool(true)));
        assert_eq!(Value::parse_literal(DataType::Bool, "false"), Ok(Value::Bool(false)));
        assert!(Value::parse_literal(DataType::Bool, "TRUE").is_err());
        assert_eq!(Value::parse_literal(DataType::Nil, "nil"), Ok(Value::Nil));
        assert_eq!(
            Value::parse_literal(DataType::Nil, ""),
            Err(LiteralError::InvalidNil(String::new()))
        );
    }

    #[test]
    fn decode_escapes() {
        assert_eq!(decode_string("a\\032b").unwrap(), "a b");
        assert_eq!(decode_string("\\035\\092").unwrap(), "#\\");
        assert_eq!(decode_string("\\010").unwrap(), "\n");
        assert_eq!(decode_string("").unwrap(), "");
        assert_eq!(decode_string("příliš").unwrap(), "příliš");
    }

    #[test]
    fn decode_rejects_short_escape() {
        assert_eq!(decode_string("ab\\03"), Err(LiteralError::InvalidEscape { offset: 2 }));
        assert_eq!(decode_string("\\"), Err(LiteralError::InvalidEscape { offset: 0 }));
        assert_eq!(decode_string("\\a12"), Err(LiteralError::InvalidEscape { offset: 0 }));
    }

    #[test]
    fn decode_rejects_raw_whitespace_and_hash() {
        assert_eq!(
            decode_string("a b"),
            Err(LiteralError::ForbiddenCharacter { ch: ' ', offset: 1 })
        );
        assert_eq!(
            decode_string("#x"),
            Err(LiteralError::ForbiddenCharacter { ch: '#', offset: 0 })
        );
    }

    #[test]
    fn escape_then_decode_restores_text() {
        let text = "tab\there # back\\slash é";
        assert_eq!(decode_string(&escape_string(text)).unwrap(), text);
    }

    #[test]
    fn literal_rendering() {
        assert_eq!(Value::Int(-3).to_literal().unwrap(), "int@-3");
        assert_eq!(Value::Bool(false).to_literal().unwrap(), "bool@false");
        assert_eq!(Value::Str("a b".to_string()).to_literal().unwrap(), "string@a\\032b");
        assert_eq!(Value::Nil.to_literal().unwrap(), "nil@nil");
        assert_eq!(Value::Unset.to_literal(), None);
    }
}
