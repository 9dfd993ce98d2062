use super::any::{compatible, swap_concrete};
use super::{AnyColumn, Column};
use crate::error::{check_range, ColumnError};
use crate::types::{Type, TypeRef};
use crate::wire::{InputChannel, OutputChannel};

/// A fixed number of element columns of equal length, one per tuple position.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleColumn {
    ty: TypeRef,
    columns: Vec<AnyColumn>,
}

impl TupleColumn {
    /// # Errors
    /// [`ColumnError::LengthMismatch`] if the element columns have different sizes.
    pub fn new(columns: Vec<AnyColumn>) -> Result<Self, ColumnError> {
        if let Some((first, rest)) = columns.split_first() {
            if let Some(bad) = rest.iter().find(|c| c.size() != first.size()) {
                return Err(ColumnError::LengthMismatch {
                    expected: first.size(),
                    actual: bad.size(),
                });
            }
        }
        let ty = Type::tuple(columns.iter().map(|c| c.type_ref().clone()));
        Ok(TupleColumn { ty, columns })
    }

    pub(crate) fn with_type(ty: TypeRef, columns: Vec<AnyColumn>) -> Self {
        TupleColumn { ty, columns }
    }

    pub fn element(&self, index: usize) -> Option<&AnyColumn> {
        self.columns.get(index)
    }

    pub fn element_count(&self) -> usize {
        self.columns.len()
    }

    pub(crate) fn elements_mut(&mut self) -> impl Iterator<Item = &mut AnyColumn> {
        self.columns.iter_mut()
    }

    #[cfg(feature = "slow_path_assertions")]
    pub(crate) fn assert_invariants(&self) {
        let size = self.size();
        for column in &self.columns {
            assert_eq!(column.size(), size);
            column.assert_invariants();
        }
    }
}

impl Column for TupleColumn {
    fn type_ref(&self) -> &TypeRef {
        &self.ty
    }

    fn append(&mut self, other: &AnyColumn) -> Result<(), ColumnError> {
        let other = compatible(self, other)?;
        for (column, other) in self.columns.iter_mut().zip(&other.columns) {
            column.append(other)?;
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.columns.iter_mut().for_each(AnyColumn::clear);
    }

    fn size(&self) -> usize {
        self.columns.first().map_or(0, AnyColumn::size)
    }

    fn slice(&self, begin: usize, len: usize) -> Result<AnyColumn, ColumnError> {
        check_range(begin, len, self.size())?;
        let columns = self
            .columns
            .iter()
            .map(|c| c.slice(begin, len))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AnyColumn::Tuple(TupleColumn::with_type(self.ty.clone(), columns)))
    }

    fn swap(&mut self, other: &mut AnyColumn) -> Result<(), ColumnError> {
        swap_concrete(self, other)
    }

    fn load_prefix(&mut self, input: &mut dyn InputChannel, rows: usize) -> Result<(), ColumnError> {
        for column in &mut self.columns {
            column.load_prefix(input, rows)?;
        }
        Ok(())
    }

    fn load_body(&mut self, input: &mut dyn InputChannel, rows: usize) -> Result<(), ColumnError> {
        for column in &mut self.columns {
            column.load_body(input, rows)?;
        }
        Ok(())
    }

    fn save_prefix(&self, output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        for column in &self.columns {
            column.save_prefix(output)?;
        }
        Ok(())
    }

    fn save_body(&self, output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        for column in &self.columns {
            column.save_body(output)?;
        }
        Ok(())
    }

    fn save_suffix(&self, output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        for column in &self.columns {
            column.save_suffix(output)?;
        }
        Ok(())
    }
}
