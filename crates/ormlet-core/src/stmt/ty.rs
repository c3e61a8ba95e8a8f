/// A column value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// Boolean value
    Bool,

    /// Signed 64-bit integer
    I64,

    /// Short string value
    String,

    /// Unbounded string value
    Text,

    /// Arbitrary JSON document
    Json,

    /// One of a fixed set of string variants
    Enum(Vec<String>),
}

impl Type {
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    pub fn is_i64(&self) -> bool {
        matches!(self, Self::I64)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::String | Self::Text)
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, Self::Enum(_))
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::I64 => f.write_str("i64"),
            Self::String => f.write_str("string"),
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
            Self::Enum(variants) => write!(f, "enum({})", variants.join(", ")),
        }
    }
}
