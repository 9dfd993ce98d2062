//! Fixed width numeric columns.
//!
//! One generic [`NumericColumn`] covers every integer and float type. The wire body is the
//! values in little endian order with no prefix or suffix.

use std::fmt::Debug;
use std::sync::Arc;

use super::any::{compatible, swap_concrete};
use super::{AnyColumn, Column, ConcreteColumn, ItemView};
use crate::error::{check_index, check_range, ColumnError};
use crate::types::{Type, TypeCode, TypeRef};
use crate::wire::{self, FixedWidth, InputChannel, OutputChannel};

/// A scalar which can be stored in a [`NumericColumn`].
pub trait Numeric:
    FixedWidth + bytemuck::Pod + Default + PartialEq + Debug + Send + Sync + 'static
{
    const TYPE: Type;
    const CODE: TypeCode;

    fn wrap(column: NumericColumn<Self>) -> AnyColumn;

    fn unwrap_ref(column: &AnyColumn) -> Option<&NumericColumn<Self>>;

    fn unwrap_mut(column: &mut AnyColumn) -> Option<&mut NumericColumn<Self>>;

    fn unwrap(column: AnyColumn) -> Result<NumericColumn<Self>, AnyColumn>;
}

macro_rules! numeric {
    ($($t:ty => $variant:ident),*) => {
        $(
            impl Numeric for $t {
                const TYPE: Type = Type::$variant;
                const CODE: TypeCode = TypeCode::$variant;

                fn wrap(column: NumericColumn<Self>) -> AnyColumn {
                    AnyColumn::$variant(column)
                }

                fn unwrap_ref(column: &AnyColumn) -> Option<&NumericColumn<Self>> {
                    match column {
                        AnyColumn::$variant(c) => Some(c),
                        _ => None,
                    }
                }

                fn unwrap_mut(column: &mut AnyColumn) -> Option<&mut NumericColumn<Self>> {
                    match column {
                        AnyColumn::$variant(c) => Some(c),
                        _ => None,
                    }
                }

                fn unwrap(column: AnyColumn) -> Result<NumericColumn<Self>, AnyColumn> {
                    match column {
                        AnyColumn::$variant(c) => Ok(c),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

numeric!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64
);

#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn<T> {
    ty: TypeRef,
    data: Vec<T>,
}

impl<T: Numeric> Default for NumericColumn<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Numeric> NumericColumn<T> {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    pub fn from_vec(data: Vec<T>) -> Self {
        NumericColumn {
            ty: Arc::new(T::TYPE),
            data,
        }
    }

    pub(crate) fn with_type(ty: TypeRef) -> Self {
        debug_assert_eq!(*ty, T::TYPE);
        NumericColumn {
            ty,
            data: Vec::new(),
        }
    }

    pub fn push(&mut self, value: T) {
        self.data.push(value)
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.data.get(index).copied()
    }

    /// Bulk access to the values.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T: Numeric> FromIterator<T> for NumericColumn<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: Numeric> Column for NumericColumn<T> {
    fn type_ref(&self) -> &TypeRef {
        &self.ty
    }

    fn append(&mut self, other: &AnyColumn) -> Result<(), ColumnError> {
        let other = compatible(self, other)?;
        self.data.extend_from_slice(&other.data);
        Ok(())
    }

    fn clear(&mut self) {
        self.data.clear()
    }

    fn size(&self) -> usize {
        self.data.len()
    }

    fn slice(&self, begin: usize, len: usize) -> Result<AnyColumn, ColumnError> {
        check_range(begin, len, self.size())?;
        Ok(T::wrap(NumericColumn {
            ty: self.ty.clone(),
            data: self.data[begin..begin + len].to_vec(),
        }))
    }

    fn swap(&mut self, other: &mut AnyColumn) -> Result<(), ColumnError> {
        swap_concrete(self, other)
    }

    fn get_item(&self, index: usize) -> Result<ItemView<'_>, ColumnError> {
        check_index(index, self.size())?;
        Ok(ItemView::new(
            T::CODE,
            bytemuck::bytes_of(&self.data[index]),
        ))
    }

    fn load_body(&mut self, input: &mut dyn InputChannel, rows: usize) -> Result<(), ColumnError> {
        self.data = wire::read_fixed_vec(input, rows)?;
        Ok(())
    }

    fn save_body(&self, output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        wire::write_fixed_slice(output, &self.data)?;
        Ok(())
    }
}

impl<T: Numeric> ConcreteColumn for NumericColumn<T> {
    fn downcast_ref(column: &AnyColumn) -> Option<&Self> {
        T::unwrap_ref(column)
    }

    fn downcast_mut(column: &mut AnyColumn) -> Option<&mut Self> {
        T::unwrap_mut(column)
    }

    fn downcast(column: AnyColumn) -> Result<Self, AnyColumn> {
        T::unwrap(column)
    }

    fn into_any(self) -> AnyColumn {
        T::wrap(self)
    }
}
