use std::sync::Arc;

use super::{
    ArrayColumn, Column, ItemView, LowCardinalityColumn, Numeric, NullableColumn, NumericColumn,
    StringColumn, TupleColumn,
};
use crate::error::ColumnError;
use crate::types::TypeRef;
use crate::wire::{InputChannel, OutputChannel};

/// A read only, shareable snapshot of a column.
///
/// To modify a shared column take it back with [`Arc::try_unwrap`], or copy on write with
/// [`Arc::make_mut`].
pub type ColumnRef = Arc<AnyColumn>;

/// Any of the concrete columns.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyColumn {
    Int8(NumericColumn<i8>),
    Int16(NumericColumn<i16>),
    Int32(NumericColumn<i32>),
    Int64(NumericColumn<i64>),
    UInt8(NumericColumn<u8>),
    UInt16(NumericColumn<u16>),
    UInt32(NumericColumn<u32>),
    UInt64(NumericColumn<u64>),
    Float32(NumericColumn<f32>),
    Float64(NumericColumn<f64>),
    String(StringColumn),
    Nullable(NullableColumn),
    Array(ArrayColumn),
    Tuple(TupleColumn),
    LowCardinality(LowCardinalityColumn),
}

macro_rules! forward {
    ($self:expr, $col:ident => $body:expr) => {
        match $self {
            AnyColumn::Int8($col) => $body,
            AnyColumn::Int16($col) => $body,
            AnyColumn::Int32($col) => $body,
            AnyColumn::Int64($col) => $body,
            AnyColumn::UInt8($col) => $body,
            AnyColumn::UInt16($col) => $body,
            AnyColumn::UInt32($col) => $body,
            AnyColumn::UInt64($col) => $body,
            AnyColumn::Float32($col) => $body,
            AnyColumn::Float64($col) => $body,
            AnyColumn::String($col) => $body,
            AnyColumn::Nullable($col) => $body,
            AnyColumn::Array($col) => $body,
            AnyColumn::Tuple($col) => $body,
            AnyColumn::LowCardinality($col) => $body,
        }
    };
}

/// A concrete column which can be recovered from an [`AnyColumn`].
pub trait ConcreteColumn: Column + Sized {
    fn downcast_ref(column: &AnyColumn) -> Option<&Self>;

    fn downcast_mut(column: &mut AnyColumn) -> Option<&mut Self>;

    fn downcast(column: AnyColumn) -> Result<Self, AnyColumn>;

    fn into_any(self) -> AnyColumn;
}

macro_rules! concrete {
    ($($column:ty => $variant:ident),*) => {
        $(
            impl ConcreteColumn for $column {
                fn downcast_ref(column: &AnyColumn) -> Option<&Self> {
                    match column {
                        AnyColumn::$variant(c) => Some(c),
                        _ => None,
                    }
                }

                fn downcast_mut(column: &mut AnyColumn) -> Option<&mut Self> {
                    match column {
                        AnyColumn::$variant(c) => Some(c),
                        _ => None,
                    }
                }

                fn downcast(column: AnyColumn) -> Result<Self, AnyColumn> {
                    match column {
                        AnyColumn::$variant(c) => Ok(c),
                        other => Err(other),
                    }
                }

                fn into_any(self) -> AnyColumn {
                    AnyColumn::$variant(self)
                }
            }

            impl From<$column> for AnyColumn {
                fn from(column: $column) -> Self {
                    AnyColumn::$variant(column)
                }
            }
        )*
    };
}

concrete!(
    StringColumn => String,
    NullableColumn => Nullable,
    ArrayColumn => Array,
    TupleColumn => Tuple,
    LowCardinalityColumn => LowCardinality
);

impl<T: Numeric> From<NumericColumn<T>> for AnyColumn {
    fn from(column: NumericColumn<T>) -> Self {
        T::wrap(column)
    }
}

impl AnyColumn {
    /// View this column as the concrete column `C`, or `None` if it is some other column.
    pub fn downcast_ref<C: ConcreteColumn>(&self) -> Option<&C> {
        C::downcast_ref(self)
    }

    pub fn downcast_mut<C: ConcreteColumn>(&mut self) -> Option<&mut C> {
        C::downcast_mut(self)
    }

    /// Take the concrete column out, returning `self` unchanged if it is some other column.
    pub fn into_concrete<C: ConcreteColumn>(self) -> Result<C, AnyColumn> {
        C::downcast(self)
    }

    /// The values of a numeric column of `T`.
    pub fn as_numeric<T: Numeric>(&self) -> Option<&[T]> {
        T::unwrap_ref(self).map(NumericColumn::as_slice)
    }

    pub fn into_ref(self) -> ColumnRef {
        Arc::new(self)
    }

    #[cfg(feature = "slow_path_assertions")]
    pub(crate) fn assert_invariants(&self) {
        match self {
            AnyColumn::Nullable(c) => c.assert_invariants(),
            AnyColumn::Array(c) => c.assert_invariants(),
            AnyColumn::Tuple(c) => c.assert_invariants(),
            AnyColumn::LowCardinality(c) => c.assert_invariants(),
            _ => {}
        }
    }
}

impl Column for AnyColumn {
    fn type_ref(&self) -> &TypeRef {
        forward!(self, c => c.type_ref())
    }

    fn append(&mut self, other: &AnyColumn) -> Result<(), ColumnError> {
        forward!(self, c => c.append(other))?;
        #[cfg(feature = "slow_path_assertions")]
        self.assert_invariants();
        Ok(())
    }

    fn clear(&mut self) {
        forward!(self, c => c.clear())
    }

    fn size(&self) -> usize {
        forward!(self, c => c.size())
    }

    fn slice(&self, begin: usize, len: usize) -> Result<AnyColumn, ColumnError> {
        forward!(self, c => c.slice(begin, len))
    }

    fn swap(&mut self, other: &mut AnyColumn) -> Result<(), ColumnError> {
        forward!(self, c => c.swap(other))
    }

    fn get_item(&self, index: usize) -> Result<ItemView<'_>, ColumnError> {
        forward!(self, c => c.get_item(index))
    }

    fn load_prefix(&mut self, input: &mut dyn InputChannel, rows: usize) -> Result<(), ColumnError> {
        forward!(self, c => c.load_prefix(input, rows))
    }

    fn load_body(&mut self, input: &mut dyn InputChannel, rows: usize) -> Result<(), ColumnError> {
        forward!(self, c => c.load_body(input, rows))?;
        #[cfg(feature = "slow_path_assertions")]
        self.assert_invariants();
        Ok(())
    }

    fn save_prefix(&self, output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        forward!(self, c => c.save_prefix(output))
    }

    fn save_body(&self, output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        forward!(self, c => c.save_body(output))
    }

    fn save_suffix(&self, output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        forward!(self, c => c.save_suffix(output))
    }
}

/// Exchange the contents of two columns of the same concrete type.
pub fn swap(left: &mut AnyColumn, right: &mut AnyColumn) -> Result<(), ColumnError> {
    left.swap(right)
}

/// `other` as the same concrete column as `this`, provided the two have equal types.
pub(crate) fn compatible<'a, C: ConcreteColumn>(
    this: &C,
    other: &'a AnyColumn,
) -> Result<&'a C, ColumnError> {
    if this.type_ref() != other.type_ref() {
        return Err(ColumnError::type_mismatch(this.type_name(), other.type_name()));
    }
    C::downcast_ref(other).ok_or_else(|| ColumnError::type_mismatch(this.type_name(), other.type_name()))
}

pub(crate) fn swap_concrete<C: ConcreteColumn>(
    this: &mut C,
    other: &mut AnyColumn,
) -> Result<(), ColumnError> {
    if this.type_ref() != other.type_ref() {
        return Err(ColumnError::type_mismatch(this.type_name(), other.type_name()));
    }
    let expected = this.type_name();
    let actual = other.type_name();
    let other = C::downcast_mut(other).ok_or_else(|| ColumnError::type_mismatch(expected, actual))?;
    std::mem::swap(this, other);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeCode;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn columns_can_be_shared_between_threads() {
        assert_send_sync::<AnyColumn>();
        assert_send_sync::<ColumnRef>();
    }

    #[test]
    fn downcast_to_the_matching_variant_only() {
        let col: AnyColumn = NumericColumn::from_vec(vec![1_u32, 2, 3]).into();
        assert_eq!(col.as_numeric::<u32>(), Some(&[1, 2, 3][..]));
        assert_eq!(col.as_numeric::<i32>(), None);
        assert!(col.downcast_ref::<StringColumn>().is_none());
        assert!(col.downcast_ref::<NumericColumn<u32>>().is_some());

        let col = match col.into_concrete::<StringColumn>() {
            Ok(_) => panic!("downcast to the wrong column succeeded"),
            Err(col) => col,
        };
        let numbers = col.into_concrete::<NumericColumn<u32>>().unwrap();
        assert_eq!(numbers.size(), 3);
    }

    #[test]
    fn swap_requires_the_same_concrete_type() {
        let mut ints: AnyColumn = NumericColumn::from_vec(vec![1_u8]).into();
        let mut strings: AnyColumn = StringColumn::from_iter(["a", "b"]).into();
        assert!(matches!(
            swap(&mut ints, &mut strings),
            Err(ColumnError::TypeMismatch { .. })
        ));
        assert_eq!(ints.size(), 1);
        assert_eq!(strings.size(), 2);

        let mut more_ints: AnyColumn = NumericColumn::from_vec(vec![7_u8, 8, 9]).into();
        swap(&mut ints, &mut more_ints).unwrap();
        assert_eq!(ints.as_numeric::<u8>(), Some(&[7, 8, 9][..]));
        assert_eq!(more_ints.as_numeric::<u8>(), Some(&[1][..]));
        assert_eq!(ints.type_ref().code(), TypeCode::UInt8);
    }

    #[test]
    fn same_kind_with_different_item_types_is_a_mismatch() {
        let mut strings: AnyColumn = NullableColumn::from_parts(
            StringColumn::from_iter(["a"]).into(),
            vec![0],
        )
        .unwrap()
        .into();
        let mut bytes: AnyColumn =
            NullableColumn::from_parts(NumericColumn::from_vec(vec![7_u8, 8]).into(), vec![0, 1])
                .unwrap()
                .into();
        let (strings_before, bytes_before) = (strings.clone(), bytes.clone());

        let err = swap(&mut strings, &mut bytes).unwrap_err();
        assert_eq!(
            err.to_string(),
            "type mismatch: expected `Nullable(String)` but received `Nullable(UInt8)`"
        );
        assert!(matches!(
            strings.append(&bytes),
            Err(ColumnError::TypeMismatch { .. })
        ));
        assert_eq!(strings, strings_before);
        assert_eq!(bytes, bytes_before);

        let mut string_arrays: AnyColumn = ArrayColumn::new(Arc::new(crate::types::Type::String))
            .unwrap()
            .into();
        let mut int_arrays = ArrayColumn::new(Arc::new(crate::types::Type::Int32)).unwrap();
        int_arrays
            .append_as_row(&NumericColumn::from_vec(vec![1_i32, 2]).into())
            .unwrap();
        let mut int_arrays: AnyColumn = int_arrays.into();
        let int_arrays_before = int_arrays.clone();

        assert!(matches!(
            string_arrays.swap(&mut int_arrays),
            Err(ColumnError::TypeMismatch { .. })
        ));
        assert!(matches!(
            int_arrays.append(&string_arrays),
            Err(ColumnError::TypeMismatch { .. })
        ));
        assert!(string_arrays.is_empty());
        assert_eq!(int_arrays, int_arrays_before);
    }

    #[test]
    fn shared_snapshots_copy_on_write() {
        let snapshot = AnyColumn::from(NumericColumn::from_vec(vec![1_i64, 2])).into_ref();
        let mut mine = snapshot.clone();
        Arc::make_mut(&mut mine)
            .append(&NumericColumn::from_vec(vec![3_i64]).into())
            .unwrap();
        assert_eq!(snapshot.size(), 2);
        assert_eq!(mine.size(), 3);
    }
}
