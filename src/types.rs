//! Type descriptors for columns.
//!
//! A [`Type`] is created once and shared behind a [`TypeRef`] by every column of that type.
//! Two descriptors are compatible exactly when they are structurally equal.

use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use smol_str::{format_smolstr, SmolStr};

pub type TypeRef = Arc<Type>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    String,
    Nullable(TypeRef),
    Array(TypeRef),
    Tuple(Vec<TypeRef>),
    LowCardinality(TypeRef),
}

/// The logical kind of a type without its parameters.
///
/// `Void` never names a column type; it tags the [`ItemView`](crate::ItemView) of a null
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    Void,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    String,
    Nullable,
    Array,
    Tuple,
    LowCardinality,
}

impl Type {
    pub fn code(&self) -> TypeCode {
        match self {
            Type::Int8 => TypeCode::Int8,
            Type::Int16 => TypeCode::Int16,
            Type::Int32 => TypeCode::Int32,
            Type::Int64 => TypeCode::Int64,
            Type::UInt8 => TypeCode::UInt8,
            Type::UInt16 => TypeCode::UInt16,
            Type::UInt32 => TypeCode::UInt32,
            Type::UInt64 => TypeCode::UInt64,
            Type::Float32 => TypeCode::Float32,
            Type::Float64 => TypeCode::Float64,
            Type::String => TypeCode::String,
            Type::Nullable(_) => TypeCode::Nullable,
            Type::Array(_) => TypeCode::Array,
            Type::Tuple(_) => TypeCode::Tuple,
            Type::LowCardinality(_) => TypeCode::LowCardinality,
        }
    }

    /// The type name as ClickHouse spells it, e.g. `Array(Nullable(String))`.
    pub fn name(&self) -> SmolStr {
        match self {
            Type::Nullable(nested) => format_smolstr!("Nullable({})", nested.name()),
            Type::Array(item) => format_smolstr!("Array({})", item.name()),
            Type::Tuple(items) => {
                format_smolstr!("Tuple({})", items.iter().map(|t| t.name()).join(", "))
            }
            Type::LowCardinality(nested) => {
                format_smolstr!("LowCardinality({})", nested.name())
            }
            scalar => SmolStr::new_static(scalar.code().scalar_name()),
        }
    }

    /// The element type of a container type, if this is one.
    pub fn item_type(&self) -> Option<&TypeRef> {
        match self {
            Type::Nullable(t) | Type::Array(t) | Type::LowCardinality(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Type::Int8
                | Type::Int16
                | Type::Int32
                | Type::Int64
                | Type::UInt8
                | Type::UInt16
                | Type::UInt32
                | Type::UInt64
                | Type::Float32
                | Type::Float64
        )
    }

    pub fn string() -> TypeRef {
        Arc::new(Type::String)
    }

    pub fn nullable(nested: TypeRef) -> TypeRef {
        Arc::new(Type::Nullable(nested))
    }

    pub fn array(item: TypeRef) -> TypeRef {
        Arc::new(Type::Array(item))
    }

    pub fn tuple<I: IntoIterator<Item = TypeRef>>(items: I) -> TypeRef {
        Arc::new(Type::Tuple(items.into_iter().collect()))
    }

    pub fn low_cardinality(nested: TypeRef) -> TypeRef {
        Arc::new(Type::LowCardinality(nested))
    }
}

impl TypeCode {
    fn scalar_name(self) -> &'static str {
        match self {
            TypeCode::Void => "Void",
            TypeCode::Int8 => "Int8",
            TypeCode::Int16 => "Int16",
            TypeCode::Int32 => "Int32",
            TypeCode::Int64 => "Int64",
            TypeCode::UInt8 => "UInt8",
            TypeCode::UInt16 => "UInt16",
            TypeCode::UInt32 => "UInt32",
            TypeCode::UInt64 => "UInt64",
            TypeCode::Float32 => "Float32",
            TypeCode::Float64 => "Float64",
            TypeCode::String => "String",
            TypeCode::Nullable => "Nullable",
            TypeCode::Array => "Array",
            TypeCode::Tuple => "Tuple",
            TypeCode::LowCardinality => "LowCardinality",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scalar_name())
    }
}
