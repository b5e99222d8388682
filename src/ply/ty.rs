//! The closed set of PLY property types.

use std::fmt;

use crate::parse::Span;


const SIGNED: u16 = 0x100;
const UNSIGNED: u16 = 0x200;
const FLOAT: u16 = 0x400;
const SIZE_MASK: u16 = 0xF;

/// A primitive PLY type: 8, 16 or 32 bit (un)signed integers or 32/64 bit
/// floats.
///
/// The discriminant packs the classification (signed, unsigned, float) and
/// the size in bytes, so that all queries are a simple bit test. `Invalid` is
/// the result of looking up an unknown type name; it has no class and a size
/// of 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ScalarType {
    Invalid = 0,
    Int8 = 0x0000 | 1 | SIGNED,
    UInt8 = 0x1000 | 1 | UNSIGNED,
    Int16 = 0x2000 | 2 | SIGNED,
    UInt16 = 0x3000 | 2 | UNSIGNED,
    Int32 = 0x4000 | 4 | SIGNED,
    UInt32 = 0x5000 | 4 | UNSIGNED,
    Float32 = 0x6000 | 4 | FLOAT,
    Float64 = 0x7000 | 8 | FLOAT,
}

/// Canonical name, alias, type. Canonical names come first so that
/// `ply_type_name` can use the same table.
const NAMES: [(&str, &str, ScalarType); 8] = [
    ("int8", "char", ScalarType::Int8),
    ("uint8", "uchar", ScalarType::UInt8),
    ("int16", "short", ScalarType::Int16),
    ("uint16", "ushort", ScalarType::UInt16),
    ("int32", "int", ScalarType::Int32),
    ("uint32", "uint", ScalarType::UInt32),
    ("float32", "float", ScalarType::Float32),
    ("float64", "double", ScalarType::Float64),
];

impl ScalarType {
    /// All valid types.
    pub const ALL: [ScalarType; 8] = [
        ScalarType::Int8,
        ScalarType::UInt8,
        ScalarType::Int16,
        ScalarType::UInt16,
        ScalarType::Int32,
        ScalarType::UInt32,
        ScalarType::Float32,
        ScalarType::Float64,
    ];

    /// Looks up a type by its PLY name (`float32`) or C-style alias (`float`),
    /// ignoring ASCII case. Unknown names result in `Invalid`.
    pub fn from_name(name: Span<'_>) -> Self {
        NAMES.iter()
            .find(|(canonical, alias, _)| name == *canonical || name == *alias)
            .map(|&(_, _, ty)| ty)
            .unwrap_or(ScalarType::Invalid)
    }

    /// Returns the canonical name used in PLY headers, e.g. `uint8`.
    pub fn ply_type_name(&self) -> &'static str {
        NAMES.iter()
            .find(|(_, _, ty)| ty == self)
            .map(|&(canonical, _, _)| canonical)
            .unwrap_or("invalid")
    }

    fn bits(self) -> u16 {
        self as u16
    }

    pub fn is_valid(&self) -> bool {
        *self != ScalarType::Invalid
    }

    /// Returns `true` for `int8`, `int16` and `int32`.
    pub fn is_signed_integer(&self) -> bool {
        self.bits() & SIGNED != 0
    }

    /// Returns `true` for `uint8`, `uint16` and `uint32`.
    pub fn is_unsigned_integer(&self) -> bool {
        self.bits() & UNSIGNED != 0
    }

    pub fn is_integer(&self) -> bool {
        self.bits() & (SIGNED | UNSIGNED) != 0
    }

    /// Returns `true` for `float32` and `float64`.
    pub fn is_floating_point(&self) -> bool {
        self.bits() & FLOAT != 0
    }

    /// Returns the number of bytes this type occupies (0 for `Invalid`).
    pub fn len(&self) -> usize {
        (self.bits() & SIZE_MASK) as usize
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.ply_type_name())
    }
}

/// The declared type of a property: a single scalar or a list of scalars
/// prefixed by its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    Scalar(ScalarType),
    List {
        len_type: ScalarType,
        scalar_type: ScalarType,
    },
}

impl PropertyType {
    pub fn len_type(&self) -> Option<ScalarType> {
        match *self {
            PropertyType::Scalar(_) => None,
            PropertyType::List { len_type, .. } => Some(len_type),
        }
    }

    /// The scalar type of the value (or list items).
    pub fn scalar_type(&self) -> ScalarType {
        match *self {
            PropertyType::Scalar(scalar_type) => scalar_type,
            PropertyType::List { scalar_type, .. } => scalar_type,
        }
    }

    pub fn is_list(&self) -> bool {
        self.len_type().is_some()
    }

    /// Returns the same kind of type (scalar or list with the same length
    /// type), but with `scalar_type` as value type.
    pub fn with_scalar_type(&self, scalar_type: ScalarType) -> Self {
        match *self {
            PropertyType::Scalar(_) => PropertyType::Scalar(scalar_type),
            PropertyType::List { len_type, .. } => PropertyType::List { len_type, scalar_type },
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PropertyType::Scalar(ty) => write!(f, "{}", ty),
            PropertyType::List { len_type, scalar_type } => {
                write!(f, "list {} {}", len_type, scalar_type)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn ty(name: &str) -> ScalarType {
        ScalarType::from_name(Span::new(name.as_bytes()))
    }

    #[test]
    fn aliases_resolve_to_same_type() {
        for &(canonical, alias, expected) in &NAMES {
            assert_eq!(ty(canonical), expected);
            assert_eq!(ty(alias), expected);
            assert_eq!(ty(&canonical.to_uppercase()), expected);
        }
        assert_eq!(ty("Float32"), ScalarType::Float32);
        assert_eq!(ty("UCHAR"), ScalarType::UInt8);
    }

    #[test]
    fn unknown_names_are_invalid() {
        assert_eq!(ty("int64"), ScalarType::Invalid);
        assert_eq!(ty(""), ScalarType::Invalid);
        assert_eq!(ty("list"), ScalarType::Invalid);
        assert_eq!(ScalarType::Invalid.len(), 0);
        assert!(!ScalarType::Invalid.is_valid());
    }

    #[test]
    fn exactly_one_class() {
        for &t in &ScalarType::ALL {
            let classes = [t.is_signed_integer(), t.is_unsigned_integer(), t.is_floating_point()];
            assert_eq!(classes.iter().filter(|&&c| c).count(), 1, "{:?}", t);
            assert!(t.is_valid());
        }

        let invalid = ScalarType::Invalid;
        assert!(!invalid.is_signed_integer());
        assert!(!invalid.is_unsigned_integer());
        assert!(!invalid.is_floating_point());
        assert!(!invalid.is_integer());
    }

    #[test]
    fn sizes() {
        let sizes: Vec<_> = ScalarType::ALL.iter().map(|t| t.len()).collect();
        assert_eq!(sizes, [1, 1, 2, 2, 4, 4, 4, 8]);
    }

    #[test]
    fn list_type() {
        let list = PropertyType::List {
            len_type: ScalarType::UInt8,
            scalar_type: ScalarType::Int32,
        };
        assert!(list.is_list());
        assert_eq!(list.scalar_type(), ScalarType::Int32);
        assert_eq!(list.to_string(), "list uint8 int32");
        assert_eq!(
            list.with_scalar_type(ScalarType::UInt32).len_type(),
            Some(ScalarType::UInt8),
        );
        assert_eq!(PropertyType::Scalar(ScalarType::Float64).len_type(), None);
    }
}
