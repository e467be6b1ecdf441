//! The closed set of built-in value types field declarations may use
//! without resolving against a package scope.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Bool,
    Varint,
    Uvarint,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Timestamp,
    Duration,
    List,
    Map,
}

impl Primitive {
    /// True for the built-ins `ValidMapArguments` accepts as a map key:
    /// `string`, the integer family, and `bool`.
    pub fn is_hashable(&self) -> bool {
        matches!(
            self,
            Primitive::String
                | Primitive::Bool
                | Primitive::Varint
                | Primitive::Uvarint
                | Primitive::Int8
                | Primitive::Int16
                | Primitive::Int32
                | Primitive::Int64
                | Primitive::Uint8
                | Primitive::Uint16
                | Primitive::Uint32
                | Primitive::Uint64
        )
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Primitive::String | Primitive::Bool | Primitive::List | Primitive::Map)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Bool => "bool",
            Primitive::Varint => "varint",
            Primitive::Uvarint => "uvarint",
            Primitive::Int8 => "int8",
            Primitive::Int16 => "int16",
            Primitive::Int32 => "int32",
            Primitive::Int64 => "int64",
            Primitive::Uint8 => "uint8",
            Primitive::Uint16 => "uint16",
            Primitive::Uint32 => "uint32",
            Primitive::Uint64 => "uint64",
            Primitive::Float32 => "float32",
            Primitive::Float64 => "float64",
            Primitive::Timestamp => "timestamp",
            Primitive::Duration => "duration",
            Primitive::List => "list",
            Primitive::Map => "map",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves a bare identifier into a built-in, or `None` if it names a
/// user-declared type instead.
pub fn parse_primitive(name: &str) -> Option<Primitive> {
    match name {
        "string" => Some(Primitive::String),
        "bool" => Some(Primitive::Bool),
        "varint" => Some(Primitive::Varint),
        "uvarint" => Some(Primitive::Uvarint),
        "int8" => Some(Primitive::Int8),
        "int16" => Some(Primitive::Int16),
        "int32" => Some(Primitive::Int32),
        "int64" => Some(Primitive::Int64),
        "uint8" => Some(Primitive::Uint8),
        "uint16" => Some(Primitive::Uint16),
        "uint32" => Some(Primitive::Uint32),
        "uint64" => Some(Primitive::Uint64),
        "float32" => Some(Primitive::Float32),
        "float64" => Some(Primitive::Float64),
        "timestamp" => Some(Primitive::Timestamp),
        "duration" => Some(Primitive::Duration),
        "list" => Some(Primitive::List),
        "map" => Some(Primitive::Map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_primitives_round_trip_through_as_str() {
        let names = [
            "string", "bool", "varint", "uvarint", "int8", "int16", "int32", "int64", "uint8", "uint16", "uint32",
            "uint64", "float32", "float64", "timestamp", "duration", "list", "map",
        ];
        for name in names {
            let prim = parse_primitive(name).unwrap_or_else(|| panic!("{name} should parse"));
            assert_eq!(prim.as_str(), name);
        }
    }

    #[test]
    fn unknown_name_is_not_a_primitive() {
        assert_eq!(parse_primitive("MyStruct"), None);
    }

    #[test]
    fn only_string_bool_and_integers_are_hashable() {
        assert!(Primitive::String.is_hashable());
        assert!(Primitive::Bool.is_hashable());
        assert!(Primitive::Int32.is_hashable());
        assert!(!Primitive::Float32.is_hashable());
        assert!(!Primitive::List.is_hashable());
    }
}
