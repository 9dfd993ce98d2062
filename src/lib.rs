//! # chwire
//!
//! Columns of the ClickHouse native wire format.
//!
//! A column is an ordered, homogeneous sequence of values of one [`Type`]. Every column
//! supports the same small set of operations ([`Column`]): append another column of the same
//! type, clear, slice, swap contents, and borrow a single row as an [`ItemView`]. Columns are
//! streamed to and from a byte channel in stages, a prefix of metadata followed by a body of
//! rows and, when saving, a suffix. The order of the stages is fixed by [`ColumnIo`].
//!
//! ## Columns
//!
//! Columns are passed around as an [`AnyColumn`], a closed set of concrete columns:
//!
//! * [`NumericColumn`] for every integer and float width
//! * [`StringColumn`]
//! * [`NullableColumn`], [`ArrayColumn`], [`TupleColumn`] and [`LowCardinalityColumn`], which
//!   wrap other columns
//!
//! [`create_column`] builds an empty column for any type. The concrete column is recovered
//! with [`AnyColumn::downcast_ref`], which returns `None` rather than failing when the column
//! is of some other kind.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use chwire::{create_column, AnyColumn, ColumnIo, NumericColumn, Type};
//! use chwire::wire::SliceInput;
//!
//! let column: AnyColumn = NumericColumn::from_vec(vec![1_u32, 2, 3]).into();
//! let mut bytes = Vec::new();
//! column.save(&mut bytes)?;
//!
//! let mut loaded = create_column(&Arc::new(Type::UInt32))?;
//! loaded.load(&mut SliceInput::new(&bytes), 3)?;
//! assert_eq!(loaded.as_numeric::<u32>(), Some(&[1, 2, 3][..]));
//! # Ok::<(), chwire::ColumnError>(())
//! ```
//!
//! ## Sharing
//!
//! Mutation needs exclusive access (`&mut`). A column which should be read from several places
//! at once is wrapped in a [`ColumnRef`]; [`std::sync::Arc::make_mut`] gives a private copy
//! to modify.
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    unused_allocation,
    unused_comparisons,
    unused_parens,
    while_true
)]

pub mod column;
pub mod error;
pub mod types;
pub mod wire;

pub use column::{
    create_column, default_row, swap, AnyColumn, ArrayColumn, Column, ColumnIo, ColumnRef,
    ConcreteColumn, ItemView, LowCardinalityColumn, NullableColumn, Numeric, NumericColumn,
    Stage, StringColumn, TupleColumn,
};
pub use error::{ChannelError, ColumnError};
pub use types::{Type, TypeCode, TypeRef};
