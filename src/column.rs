//! The column contract and the concrete columns which implement it.
//!
//! Every column implements [`Column`]. Row storage differs per type, but the way a column is
//! streamed is always the same: [`ColumnIo::load`] runs [`Column::load_prefix`] and then
//! [`Column::load_body`], [`ColumnIo::save`] runs [`Column::save_prefix`],
//! [`Column::save_body`] and [`Column::save_suffix`]. The prefix carries metadata which has to
//! be known before any row can be decoded (for example the key version of a
//! low cardinality column) and is written for all nested columns before any of their bodies.
//!
//! Columns are held as an [`AnyColumn`], a closed set of the concrete columns in this module.
//! Algorithms which need a particular representation recover it with
//! [`AnyColumn::downcast_ref`] or [`AnyColumn::as_numeric`].
use std::fmt::Debug;

use smol_str::SmolStr;

use crate::error::ColumnError;
use crate::types::TypeRef;
use crate::wire::{InputChannel, OutputChannel};

mod any;
pub use any::{swap, AnyColumn, ColumnRef, ConcreteColumn};
mod array;
pub use array::ArrayColumn;
mod factory;
pub use factory::{create_column, default_row};
mod item_view;
pub use item_view::ItemView;
mod low_cardinality;
pub use low_cardinality::LowCardinalityColumn;
mod nullable;
pub use nullable::NullableColumn;
mod numeric;
pub use numeric::{Numeric, NumericColumn};
mod staged;
pub use staged::{ColumnIo, Stage};
mod string;
pub use string::StringColumn;
mod tuple;
pub use tuple::TupleColumn;

/// Operations every column supports.
///
/// The staged I/O hooks have default implementations which do nothing and succeed. A column
/// overrides the stages its wire representation actually has; most columns only have a body.
/// The hooks are driven by [`ColumnIo`], which fixes their order, and should not be called
/// directly except by a composite column forwarding to its nested columns.
pub trait Column: Debug {
    /// The type descriptor this column was created with. It never changes.
    fn type_ref(&self) -> &TypeRef;

    fn type_name(&self) -> SmolStr {
        self.type_ref().name()
    }

    /// Append all rows of `other` to the end of this column.
    ///
    /// # Errors
    /// [`ColumnError::TypeMismatch`] if `other` has a different type, in which case this
    /// column is unchanged.
    fn append(&mut self, other: &AnyColumn) -> Result<(), ColumnError>;

    /// Remove all rows.
    fn clear(&mut self);

    /// The number of rows.
    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// A new, independent column containing `len` rows starting at `begin`.
    ///
    /// # Errors
    /// [`ColumnError::OutOfRange`] if `begin + len > self.size()`
    fn slice(&self, begin: usize, len: usize) -> Result<AnyColumn, ColumnError>;

    /// Exchange the contents of this column with `other`.
    ///
    /// # Errors
    /// [`ColumnError::TypeMismatch`] unless `other` is the same concrete column with the same
    /// type descriptor. Neither column is modified in that case.
    fn swap(&mut self, other: &mut AnyColumn) -> Result<(), ColumnError>;

    /// A view of the raw data of the row at `index`.
    ///
    /// The view borrows the column, so it cannot outlive the next mutation.
    ///
    /// # Errors
    /// * [`ColumnError::UnsupportedOperation`] if this column has no item level representation
    /// * [`ColumnError::OutOfRange`] if `index >= self.size()`
    fn get_item(&self, _index: usize) -> Result<ItemView<'_>, ColumnError> {
        Err(ColumnError::UnsupportedOperation {
            operation: "get_item",
            type_name: self.type_name().to_string(),
        })
    }

    fn load_prefix(
        &mut self,
        _input: &mut dyn InputChannel,
        _rows: usize,
    ) -> Result<(), ColumnError> {
        Ok(())
    }

    /// Replace the contents of this column with `rows` rows read from `input`.
    fn load_body(&mut self, _input: &mut dyn InputChannel, _rows: usize) -> Result<(), ColumnError> {
        Ok(())
    }

    fn save_prefix(&self, _output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        Ok(())
    }

    fn save_body(&self, _output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        Ok(())
    }

    fn save_suffix(&self, _output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        Ok(())
    }
}
