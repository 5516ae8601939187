//! Data type names of the IPPcode19 type system.

/// The type of a constant, or of a value held by a variable.
///
/// Variables are dynamically typed: a slot takes the type of whatever was
/// last assigned to it. A slot that was declared but never assigned has no
/// type at all (see [`Value::Unset`](crate::Value::Unset)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Signed 64-bit integer.
    Int,
    /// `true` or `false`.
    Bool,
    /// Sequence of Unicode scalar values.
    String,
    /// The single value `nil`.
    Nil,
}

/// All data types, in definition order.
pub const ALL_DATA_TYPES: [DataType; 4] =
    [DataType::Int, DataType::Bool, DataType::String, DataType::Nil];

impl DataType {
    /// Returns the source-level name of this type.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Bool => "bool",
            DataType::String => "string",
            DataType::Nil => "nil",
        }
    }

    /// Looks up a type by its source-level name. Names are case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_DATA_TYPES.iter().find(|dt| dt.name() == name).copied()
    }

    /// Returns true if `read` may request this type.
    pub fn is_readable(&self) -> bool {
        !matches!(self, DataType::Nil)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
