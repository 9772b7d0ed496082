//! Builtin type table (spec §4.1): fixed integer/char types with known byte widths.
//!
//! A fixed mapping from name to `(byte_length, signedness)`, exposed as a
//! lookup by string name. No mutation after initialization, mirroring the
//! `available_types` table the original builds at import time (but as an
//! explicit `const` table instead of import-time side effects, per the
//! generalized annotation-registry design note in spec §9).

/// One of the nine builtin scalar types recognized by `.packet` files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Char,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
}

impl BuiltinType {
    /// Look up a builtin type by its `.packet` source name.
    pub fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "char" => BuiltinType::Char,
            "int8" => BuiltinType::Int8,
            "int16" => BuiltinType::Int16,
            "int32" => BuiltinType::Int32,
            "int64" => BuiltinType::Int64,
            "uint8" => BuiltinType::Uint8,
            "uint16" => BuiltinType::Uint16,
            "uint32" => BuiltinType::Uint32,
            "uint64" => BuiltinType::Uint64,
            _ => return None,
        })
    }

    /// Source name, as it would appear in a `.packet` file.
    pub fn name(self) -> &'static str {
        match self {
            BuiltinType::Char => "char",
            BuiltinType::Int8 => "int8",
            BuiltinType::Int16 => "int16",
            BuiltinType::Int32 => "int32",
            BuiltinType::Int64 => "int64",
            BuiltinType::Uint8 => "uint8",
            BuiltinType::Uint16 => "uint16",
            BuiltinType::Uint32 => "uint32",
            BuiltinType::Uint64 => "uint64",
        }
    }

    /// Constant byte width; always `Some` for a builtin type.
    pub fn byte_length(self) -> u32 {
        match self {
            BuiltinType::Char | BuiltinType::Int8 | BuiltinType::Uint8 => 1,
            BuiltinType::Int16 | BuiltinType::Uint16 => 2,
            BuiltinType::Int32 | BuiltinType::Uint32 => 4,
            BuiltinType::Int64 | BuiltinType::Uint64 => 8,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            BuiltinType::Char | BuiltinType::Int8 | BuiltinType::Int16 | BuiltinType::Int32 | BuiltinType::Int64
        )
    }
}
