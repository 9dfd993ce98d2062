use super::any::{compatible, swap_concrete};
use super::{AnyColumn, Column, ItemView};
use crate::error::{check_index, check_range, ColumnError};
use crate::types::{Type, TypeCode, TypeRef};
use crate::wire::{self, InputChannel, OutputChannel};

/// Variable length byte strings.
///
/// All rows live in one buffer; `offsets[i]` is the end of row `i` within it. The strings are
/// not required to be UTF-8.
#[derive(Debug, Clone, PartialEq)]
pub struct StringColumn {
    ty: TypeRef,
    data: Vec<u8>,
    offsets: Vec<usize>,
}

impl Default for StringColumn {
    fn default() -> Self {
        Self::new()
    }
}

impl StringColumn {
    pub fn new() -> Self {
        Self::with_type(Type::string())
    }

    pub(crate) fn with_type(ty: TypeRef) -> Self {
        debug_assert_eq!(*ty, Type::String);
        StringColumn {
            ty,
            data: Vec::new(),
            offsets: Vec::new(),
        }
    }

    pub fn push<B: AsRef<[u8]>>(&mut self, value: B) {
        self.data.extend_from_slice(value.as_ref());
        self.offsets.push(self.data.len());
    }

    fn start(&self, index: usize) -> usize {
        match index {
            0 => 0,
            i => self.offsets[i - 1],
        }
    }

    pub fn get(&self, index: usize) -> Option<&[u8]> {
        let end = *self.offsets.get(index)?;
        Some(&self.data[self.start(index)..end])
    }

    /// The row at `index` if it exists and is valid UTF-8.
    pub fn get_str(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.offsets.len()).filter_map(move |i| self.get(i))
    }
}

impl<B: AsRef<[u8]>> FromIterator<B> for StringColumn {
    fn from_iter<I: IntoIterator<Item = B>>(iter: I) -> Self {
        let mut col = StringColumn::new();
        for value in iter {
            col.push(value);
        }
        col
    }
}

impl Column for StringColumn {
    fn type_ref(&self) -> &TypeRef {
        &self.ty
    }

    fn append(&mut self, other: &AnyColumn) -> Result<(), ColumnError> {
        let other = compatible(self, other)?;
        let base = self.data.len();
        self.data.extend_from_slice(&other.data);
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
        let mut sliced = StringColumn::with_type(self.ty.clone());
        for row in begin..begin + len {
            if let Some(value) = self.get(row) {
                sliced.push(value);
            }
        }
        Ok(AnyColumn::String(sliced))
    }

    fn swap(&mut self, other: &mut AnyColumn) -> Result<(), ColumnError> {
        swap_concrete(self, other)
    }

    fn get_item(&self, index: usize) -> Result<ItemView<'_>, ColumnError> {
        check_index(index, self.size())?;
        let end = self.offsets[index];
        Ok(ItemView::new(
            TypeCode::String,
            &self.data[self.start(index)..end],
        ))
    }

    fn load_body(&mut self, input: &mut dyn InputChannel, rows: usize) -> Result<(), ColumnError> {
        let mut data = Vec::new();
        let mut offsets = Vec::new();
        for _ in 0..rows {
            wire::read_length_prefixed(input, &mut data)?;
            offsets.push(data.len());
        }
        self.data = data;
        self.offsets = offsets;
        Ok(())
    }

    fn save_body(&self, output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        for value in self.iter() {
            wire::write_length_prefixed(output, value)?;
        }
        Ok(())
    }
}
