use super::any::{compatible, swap_concrete};
use super::factory::{create_column, push_default};
use super::{AnyColumn, Column, ItemView};
use crate::error::{check_index, check_range, ColumnError};
use crate::types::{Type, TypeRef};
use crate::wire::{self, InputChannel, OutputChannel};

/// A nested column plus a null flag per row.
///
/// A null row still occupies a row of the nested column, holding its default value. On the
/// wire the body is one byte per row (1 for null) followed by the nested body.
#[derive(Debug, Clone, PartialEq)]
pub struct NullableColumn {
    ty: TypeRef,
    nested: Box<AnyColumn>,
    nulls: Vec<u8>,
}

impl NullableColumn {
    /// An empty column of `Nullable(nested)`.
    pub fn new(nested: TypeRef) -> Result<Self, ColumnError> {
        let ty = Type::nullable(nested.clone());
        Ok(Self::with_type(ty, create_column(&nested)?))
    }

    pub(crate) fn with_type(ty: TypeRef, nested: AnyColumn) -> Self {
        debug_assert_eq!(ty.item_type(), Some(nested.type_ref()));
        let nulls = vec![0; nested.size()];
        NullableColumn {
            ty,
            nested: Box::new(nested),
            nulls,
        }
    }

    /// Combine `nested` values with null flags, non zero meaning null.
    ///
    /// # Errors
    /// [`ColumnError::LengthMismatch`] if there is not exactly one flag per nested row.
    pub fn from_parts(nested: AnyColumn, nulls: Vec<u8>) -> Result<Self, ColumnError> {
        if nested.size() != nulls.len() {
            return Err(ColumnError::LengthMismatch {
                expected: nested.size(),
                actual: nulls.len(),
            });
        }
        Ok(NullableColumn {
            ty: Type::nullable(nested.type_ref().clone()),
            nested: Box::new(nested),
            nulls: nulls.into_iter().map(|n| u8::from(n != 0)).collect(),
        })
    }

    pub fn is_null(&self, index: usize) -> bool {
        self.nulls.get(index).is_some_and(|&n| n != 0)
    }

    pub fn nested(&self) -> &AnyColumn {
        &self.nested
    }

    pub fn nulls(&self) -> &[u8] {
        &self.nulls
    }

    pub fn push_null(&mut self) -> Result<(), ColumnError> {
        push_default(&mut self.nested)?;
        self.nulls.push(1);
        Ok(())
    }

    /// Append non null rows.
    pub fn append_values(&mut self, values: &AnyColumn) -> Result<(), ColumnError> {
        self.nested.append(values)?;
        self.nulls.resize(self.nested.size(), 0);
        Ok(())
    }

    #[cfg(feature = "slow_path_assertions")]
    pub(crate) fn assert_invariants(&self) {
        assert_eq!(self.nulls.len(), self.nested.size());
        self.nested.assert_invariants();
    }
}

impl Column for NullableColumn {
    fn type_ref(&self) -> &TypeRef {
        &self.ty
    }

    fn append(&mut self, other: &AnyColumn) -> Result<(), ColumnError> {
        let other = compatible(self, other)?;
        self.nested.append(&other.nested)?;
        self.nulls.extend_from_slice(&other.nulls);
        Ok(())
    }

    fn clear(&mut self) {
        self.nested.clear();
        self.nulls.clear();
    }

    fn size(&self) -> usize {
        self.nulls.len()
    }

    fn slice(&self, begin: usize, len: usize) -> Result<AnyColumn, ColumnError> {
        check_range(begin, len, self.size())?;
        Ok(AnyColumn::Nullable(NullableColumn {
            ty: self.ty.clone(),
            nested: Box::new(self.nested.slice(begin, len)?),
            nulls: self.nulls[begin..begin + len].to_vec(),
        }))
    }

    fn swap(&mut self, other: &mut AnyColumn) -> Result<(), ColumnError> {
        swap_concrete(self, other)
    }

    fn get_item(&self, index: usize) -> Result<ItemView<'_>, ColumnError> {
        check_index(index, self.size())?;
        if self.is_null(index) {
            return Ok(ItemView::null());
        }
        self.nested.get_item(index).map_err(|e| match e {
            ColumnError::UnsupportedOperation { operation, .. } => {
                ColumnError::UnsupportedOperation {
                    operation,
                    type_name: self.type_name().to_string(),
                }
            }
            other => other,
        })
    }

    fn load_prefix(&mut self, input: &mut dyn InputChannel, rows: usize) -> Result<(), ColumnError> {
        self.nested.load_prefix(input, rows)
    }

    fn load_body(&mut self, input: &mut dyn InputChannel, rows: usize) -> Result<(), ColumnError> {
        let mut nulls = wire::read_bytes(input, rows)?;
        nulls.iter_mut().for_each(|n| *n = u8::from(*n != 0));
        self.nested.load_body(input, rows)?;
        self.nulls = nulls;
        Ok(())
    }

    fn save_prefix(&self, output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        self.nested.save_prefix(output)
    }

    fn save_body(&self, output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        output.write_all(&self.nulls)?;
        self.nested.save_body(output)
    }

    fn save_suffix(&self, output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        self.nested.save_suffix(output)
    }
}
