use super::any::{compatible, swap_concrete};
use super::factory::create_column;
use super::{AnyColumn, Column};
use crate::error::{check_index, check_range, ChannelError, ColumnError};
use crate::types::{Type, TypeRef};
use crate::wire::{self, InputChannel, OutputChannel};

/// Variable length arrays stored as one nested column of all elements.
///
/// `offsets[i]` is the end of row `i` in the nested column. The wire body is the offsets as
/// `u64` followed by the nested body of all elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayColumn {
    ty: TypeRef,
    data: Box<AnyColumn>,
    offsets: Vec<u64>,
}

impl ArrayColumn {
    /// An empty column of `Array(item)`.
    pub fn new(item: TypeRef) -> Result<Self, ColumnError> {
        let ty = Type::array(item.clone());
        Ok(Self::with_type(ty, create_column(&item)?))
    }

    pub(crate) fn with_type(ty: TypeRef, data: AnyColumn) -> Self {
        debug_assert!(data.is_empty());
        ArrayColumn {
            ty,
            data: Box::new(data),
            offsets: Vec::new(),
        }
    }

    fn end(&self) -> u64 {
        self.offsets.last().copied().unwrap_or(0)
    }

    fn bounds(&self, index: usize) -> (usize, usize) {
        let start = match index {
            0 => 0,
            i => self.offsets[i - 1],
        };
        (start as usize, self.offsets[index] as usize)
    }

    /// Append all rows of `row` as the elements of one new array.
    pub fn append_as_row(&mut self, row: &AnyColumn) -> Result<(), ColumnError> {
        self.data.append(row)?;
        self.offsets.push(self.data.size() as u64);
        Ok(())
    }

    pub(crate) fn push_empty(&mut self) {
        self.offsets.push(self.end());
    }

    /// The number of elements in row `index`.
    pub fn row_len(&self, index: usize) -> Option<usize> {
        if index >= self.offsets.len() {
            return None;
        }
        let (start, end) = self.bounds(index);
        Some(end - start)
    }

    /// The elements of row `index` as a new column.
    pub fn get_as_column(&self, index: usize) -> Result<AnyColumn, ColumnError> {
        check_index(index, self.size())?;
        let (start, end) = self.bounds(index);
        self.data.slice(start, end - start)
    }

    /// The column of all elements of all rows.
    pub fn nested(&self) -> &AnyColumn {
        &self.data
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    #[cfg(feature = "slow_path_assertions")]
    pub(crate) fn assert_invariants(&self) {
        assert!(self.offsets.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(self.end() as usize, self.data.size());
        self.data.assert_invariants();
    }
}

impl Column for ArrayColumn {
    fn type_ref(&self) -> &TypeRef {
        &self.ty
    }

    fn append(&mut self, other: &AnyColumn) -> Result<(), ColumnError> {
        let other = compatible(self, other)?;
        let base = self.end();
        self.data.append(&other.data)?;
        self.offsets.extend(other.offsets.iter().map(|o| o + base));
        Ok(())
    }

    fn clear(&mut self) {
        self.data.clear();
        self.offsets.clear();
    }

    fn size(&self) -> usize {
        self.offsets.len()
    }

    fn slice(&self, begin: usize, len: usize) -> Result<AnyColumn, ColumnError> {
        check_range(begin, len, self.size())?;
        if len == 0 {
            let data = self.data.slice(0, 0)?;
            return Ok(AnyColumn::Array(ArrayColumn::with_type(self.ty.clone(), data)));
        }
        let (start, _) = self.bounds(begin);
        let (_, end) = self.bounds(begin + len - 1);
        let base = start as u64;
        Ok(AnyColumn::Array(ArrayColumn {
            ty: self.ty.clone(),
            data: Box::new(self.data.slice(start, end - start)?),
            offsets: self.offsets[begin..begin + len]
                .iter()
                .map(|o| o - base)
                .collect(),
        }))
    }

    fn swap(&mut self, other: &mut AnyColumn) -> Result<(), ColumnError> {
        swap_concrete(self, other)
    }

    fn load_prefix(&mut self, input: &mut dyn InputChannel, rows: usize) -> Result<(), ColumnError> {
        self.data.load_prefix(input, rows)
    }

    fn load_body(&mut self, input: &mut dyn InputChannel, rows: usize) -> Result<(), ColumnError> {
        let offsets = wire::read_fixed_vec::<u64>(input, rows)?;
        if let Some(w) = offsets.windows(2).find(|w| w[0] > w[1]) {
            return Err(ChannelError::malformed(format!(
                "array offsets decrease from {} to {}",
                w[0], w[1]
            ))
            .into());
        }
        let elements = offsets.last().copied().unwrap_or(0);
        let elements = usize::try_from(elements).map_err(|_| ChannelError::OverlargeAllocation {
            attempted: usize::MAX,
            maximum: input.max_allocation(),
        })?;
        self.data.load_body(input, elements)?;
        self.offsets = offsets;
        Ok(())
    }

    fn save_prefix(&self, output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        self.data.save_prefix(output)
    }

    fn save_body(&self, output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        wire::write_fixed_slice(output, &self.offsets)?;
        self.data.save_body(output)
    }

    fn save_suffix(&self, output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        self.data.save_suffix(output)
    }
}
