//! Dictionary encoded columns.
//!
//! Each distinct value is stored once in a dictionary column and every row is a key into it.
//! Slot 0 of the dictionary always holds the default value of the dictionary type. The wire
//! layout is the ClickHouse `SharedDictionariesWithAdditionalKeys` serialization:
//!
//! ```text
//! prefix: u64 key version (1)
//! body:   u64 index flags
//!         u64 number of dictionary entries, dictionary body
//!         u64 number of rows, one key per row
//! ```
//!
//! The index flags carry the key width in their low byte and must include
//! `HAS_ADDITIONAL_KEYS`. Global dictionaries are not supported.

use rustc_hash::FxHashMap;

use super::any::{compatible, swap_concrete};
use super::factory::default_row;
use super::{AnyColumn, Column, ItemView};
use crate::error::{check_index, check_range, ChannelError, ColumnError};
use crate::types::{Type, TypeRef};
use crate::wire::{self, InputChannel, OutputChannel};

const KEY_VERSION: u64 = 1;

const INDEX_WIDTH_MASK: u64 = 0xff;
const NEED_GLOBAL_DICTIONARY: u64 = 1 << 8;
const HAS_ADDITIONAL_KEYS: u64 = 1 << 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexWidth {
    U8 = 0,
    U16 = 1,
    U32 = 2,
    U64 = 3,
}

impl IndexWidth {
    /// The narrowest width which can address `entries` dictionary entries.
    fn for_entries(entries: usize) -> Self {
        match entries as u64 {
            n if n <= 1 << 8 => IndexWidth::U8,
            n if n <= 1 << 16 => IndexWidth::U16,
            n if n <= 1 << 32 => IndexWidth::U32,
            _ => IndexWidth::U64,
        }
    }

    fn from_flags(flags: u64) -> Result<Self, ChannelError> {
        match flags & INDEX_WIDTH_MASK {
            0 => Ok(IndexWidth::U8),
            1 => Ok(IndexWidth::U16),
            2 => Ok(IndexWidth::U32),
            3 => Ok(IndexWidth::U64),
            other => Err(ChannelError::malformed(format!(
                "invalid low cardinality index width {}",
                other
            ))),
        }
    }

    fn read(self, input: &mut dyn InputChannel, rows: usize) -> Result<Vec<u64>, ChannelError> {
        Ok(match self {
            IndexWidth::U8 => widen(wire::read_fixed_vec::<u8>(input, rows)?),
            IndexWidth::U16 => widen(wire::read_fixed_vec::<u16>(input, rows)?),
            IndexWidth::U32 => widen(wire::read_fixed_vec::<u32>(input, rows)?),
            IndexWidth::U64 => wire::read_fixed_vec::<u64>(input, rows)?,
        })
    }

    fn write(self, output: &mut dyn OutputChannel, keys: &[u64]) -> Result<(), ChannelError> {
        // keys are below the dictionary size, so narrowing is lossless
        match self {
            IndexWidth::U8 => {
                let keys = keys.iter().map(|&k| k as u8).collect::<Vec<_>>();
                wire::write_fixed_slice(output, &keys)
            }
            IndexWidth::U16 => {
                let keys = keys.iter().map(|&k| k as u16).collect::<Vec<_>>();
                wire::write_fixed_slice(output, &keys)
            }
            IndexWidth::U32 => {
                let keys = keys.iter().map(|&k| k as u32).collect::<Vec<_>>();
                wire::write_fixed_slice(output, &keys)
            }
            IndexWidth::U64 => wire::write_fixed_slice(output, keys),
        }
    }
}

fn widen<T: Into<u64>>(keys: Vec<T>) -> Vec<u64> {
    keys.into_iter().map(Into::into).collect()
}

fn read_count(input: &mut dyn InputChannel) -> Result<usize, ChannelError> {
    let count = wire::read_fixed::<u64>(input)?;
    usize::try_from(count).map_err(|_| ChannelError::OverlargeAllocation {
        attempted: usize::MAX,
        maximum: input.max_allocation(),
    })
}

/// The dictionary keys of every row of `dictionary`, by item bytes.
fn build_lookup(dictionary: &AnyColumn) -> FxHashMap<Vec<u8>, u64> {
    let mut lookup = FxHashMap::default();
    for row in 0..dictionary.size() {
        if let Ok(item) = dictionary.get_item(row) {
            lookup.entry(item.data().to_vec()).or_insert(row as u64);
        }
    }
    lookup
}

#[derive(Debug, Clone, PartialEq)]
pub struct LowCardinalityColumn {
    ty: TypeRef,
    dictionary: Box<AnyColumn>,
    keys: Vec<u64>,
    lookup: FxHashMap<Vec<u8>, u64>,
}

impl LowCardinalityColumn {
    /// An empty column of `LowCardinality(nested)`.
    ///
    /// # Errors
    /// [`ColumnError::UnsupportedOperation`] unless `nested` is a numeric type or `String`.
    pub fn new(nested: TypeRef) -> Result<Self, ColumnError> {
        Self::with_type(Type::low_cardinality(nested))
    }

    pub(crate) fn with_type(ty: TypeRef) -> Result<Self, ColumnError> {
        let nested = match ty.item_type() {
            Some(nested) if nested.is_numeric() || **nested == Type::String => nested,
            _ => {
                return Err(ColumnError::UnsupportedOperation {
                    operation: "create_column",
                    type_name: ty.name().to_string(),
                })
            }
        };
        let dictionary = default_row(nested)?;
        let lookup = build_lookup(&dictionary);
        Ok(LowCardinalityColumn {
            ty,
            dictionary: Box::new(dictionary),
            keys: Vec::new(),
            lookup,
        })
    }

    /// The distinct values. Entry 0 is the default value and may be unused.
    pub fn dictionary(&self) -> &AnyColumn {
        &self.dictionary
    }

    /// One dictionary key per row.
    pub fn keys(&self) -> &[u64] {
        &self.keys
    }

    /// Append every row of `values`, a column of the dictionary type.
    pub fn append_values(&mut self, values: &AnyColumn) -> Result<(), ColumnError> {
        if values.type_ref() != self.dictionary.type_ref() {
            return Err(ColumnError::type_mismatch(
                self.dictionary.type_name(),
                values.type_name(),
            ));
        }
        let mut keys = Vec::with_capacity(values.size());
        for row in 0..values.size() {
            keys.push(self.intern(values, row)?);
        }
        self.keys.extend(keys);
        Ok(())
    }

    pub(crate) fn push_default(&mut self) {
        self.keys.push(0);
    }

    /// The key of row `row` of `source`, adding it to the dictionary if it is new.
    fn intern(&mut self, source: &AnyColumn, row: usize) -> Result<u64, ColumnError> {
        let bytes = source.get_item(row)?.data();
        if let Some(&key) = self.lookup.get(bytes) {
            return Ok(key);
        }
        let key = self.dictionary.size() as u64;
        self.dictionary.append(&source.slice(row, 1)?)?;
        self.lookup.insert(bytes.to_vec(), key);
        Ok(key)
    }

    #[cfg(feature = "slow_path_assertions")]
    pub(crate) fn assert_invariants(&self) {
        let entries = self.dictionary.size() as u64;
        assert!(entries > 0);
        assert!(self.keys.iter().all(|&k| k < entries));
        assert!(self.lookup.len() as u64 <= entries);
    }
}

impl Column for LowCardinalityColumn {
    fn type_ref(&self) -> &TypeRef {
        &self.ty
    }

    fn append(&mut self, other: &AnyColumn) -> Result<(), ColumnError> {
        let other = compatible(self, other)?;
        let mut remap: Vec<Option<u64>> = vec![None; other.dictionary.size()];
        let mut keys = Vec::with_capacity(other.keys.len());
        for &key in &other.keys {
            let cached = remap[key as usize];
            let mapped = match cached {
                Some(mapped) => mapped,
                None => {
                    let mapped = self.intern(&other.dictionary, key as usize)?;
                    remap[key as usize] = Some(mapped);
                    mapped
                }
            };
            keys.push(mapped);
        }
        self.keys.extend(keys);
        Ok(())
    }

    fn clear(&mut self) {
        self.keys.clear();
        match self.dictionary.slice(0, 1) {
            Ok(default) => *self.dictionary = default,
            Err(_) => self.dictionary.clear(),
        }
        self.lookup = build_lookup(&self.dictionary);
    }

    fn size(&self) -> usize {
        self.keys.len()
    }

    fn slice(&self, begin: usize, len: usize) -> Result<AnyColumn, ColumnError> {
        check_range(begin, len, self.size())?;
        Ok(AnyColumn::LowCardinality(LowCardinalityColumn {
            ty: self.ty.clone(),
            dictionary: self.dictionary.clone(),
            keys: self.keys[begin..begin + len].to_vec(),
            lookup: self.lookup.clone(),
        }))
    }

    fn swap(&mut self, other: &mut AnyColumn) -> Result<(), ColumnError> {
        swap_concrete(self, other)
    }

    fn get_item(&self, index: usize) -> Result<ItemView<'_>, ColumnError> {
        check_index(index, self.size())?;
        self.dictionary.get_item(self.keys[index] as usize)
    }

    fn load_prefix(&mut self, input: &mut dyn InputChannel, _rows: usize) -> Result<(), ColumnError> {
        let version = wire::read_fixed::<u64>(input)?;
        if version != KEY_VERSION {
            return Err(ChannelError::malformed(format!(
                "unsupported low cardinality key version {}",
                version
            ))
            .into());
        }
        Ok(())
    }

    fn load_body(&mut self, input: &mut dyn InputChannel, rows: usize) -> Result<(), ColumnError> {
        let flags = wire::read_fixed::<u64>(input)?;
        if flags & NEED_GLOBAL_DICTIONARY != 0 {
            return Err(ChannelError::malformed("global low cardinality dictionaries are not supported").into());
        }
        if flags & HAS_ADDITIONAL_KEYS == 0 {
            return Err(ChannelError::malformed("low cardinality column has no additional keys").into());
        }
        let width = IndexWidth::from_flags(flags)?;

        let entries = read_count(input)?;
        let mut dictionary = self.dictionary.slice(0, 0)?;
        dictionary.load_body(input, entries)?;
        if dictionary.is_empty() {
            // an empty block may come without even the default entry
            dictionary = self.dictionary.slice(0, 1)?;
        }
        tracing::trace!(entries, ?width, "loaded low cardinality dictionary");

        let count = read_count(input)?;
        if count != rows {
            return Err(ChannelError::malformed(format!(
                "low cardinality column has {} rows but {} were expected",
                count, rows
            ))
            .into());
        }
        let keys = width.read(input, rows)?;
        if let Some(bad) = keys.iter().find(|&&k| k >= entries as u64) {
            return Err(ChannelError::malformed(format!(
                "low cardinality key {} is outside a dictionary of {} entries",
                bad, entries
            ))
            .into());
        }

        self.lookup = build_lookup(&dictionary);
        *self.dictionary = dictionary;
        self.keys = keys;
        Ok(())
    }

    fn save_prefix(&self, output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        wire::write_fixed(output, KEY_VERSION)?;
        Ok(())
    }

    fn save_body(&self, output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        let width = IndexWidth::for_entries(self.dictionary.size());
        wire::write_fixed(output, width as u64 | HAS_ADDITIONAL_KEYS)?;
        wire::write_fixed(output, self.dictionary.size() as u64)?;
        self.dictionary.save_body(output)?;
        wire::write_fixed(output, self.keys.len() as u64)?;
        width.write(output, &self.keys)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::column::{ColumnIo, NumericColumn, StringColumn};
    use crate::wire::SliceInput;
    use pretty_assertions::assert_eq;
    use test_log::test;

    fn strings<'a, I: IntoIterator<Item = &'a str>>(values: I) -> AnyColumn {
        StringColumn::from_iter(values).into()
    }

    #[test]
    fn values_are_deduplicated() {
        let mut col = LowCardinalityColumn::new(Type::string()).unwrap();
        col.append_values(&strings(["b", "a", "b", ""])).unwrap();
        assert_eq!(col.size(), 4);
        assert_eq!(col.keys(), &[1, 2, 1, 0]);
        assert_eq!(col.dictionary().size(), 3);
        assert_eq!(col.get_item(2).unwrap().as_str(), Some("b"));
        assert_eq!(col.get_item(3).unwrap().as_str(), Some(""));
    }

    #[test]
    fn wire_layout() {
        let mut col = LowCardinalityColumn::new(Arc::new(Type::UInt16)).unwrap();
        col.append_values(&NumericColumn::from_vec(vec![5_u16, 5]).into())
            .unwrap();
        let mut out = Vec::new();
        col.save(&mut out).unwrap();

        let mut expected = Vec::new();
        wire::write_fixed(&mut expected, 1_u64).unwrap();
        wire::write_fixed(&mut expected, HAS_ADDITIONAL_KEYS).unwrap();
        wire::write_fixed(&mut expected, 2_u64).unwrap();
        wire::write_fixed_slice(&mut expected, &[0_u16, 5]).unwrap();
        wire::write_fixed(&mut expected, 2_u64).unwrap();
        wire::write_fixed_slice(&mut expected, &[1_u8, 1]).unwrap();
        assert_eq!(out, expected);

        let mut loaded = LowCardinalityColumn::new(Arc::new(Type::UInt16)).unwrap();
        loaded.load(&mut SliceInput::new(&out), 2).unwrap();
        assert_eq!(loaded, col);
    }

    #[test]
    fn append_merges_dictionaries() {
        let mut left = LowCardinalityColumn::new(Type::string()).unwrap();
        left.append_values(&strings(["x", "y"])).unwrap();
        let mut right = LowCardinalityColumn::new(Type::string()).unwrap();
        right.append_values(&strings(["y", "z", "y"])).unwrap();

        left.append(&right.into()).unwrap();
        let values = (0..left.size())
            .map(|i| left.get_item(i).unwrap().as_str().unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(values, vec!["x", "y", "y", "z", "y"]);
        assert_eq!(left.dictionary().size(), 4);
    }

    #[test]
    fn clear_keeps_only_the_default_entry() {
        let mut col = LowCardinalityColumn::new(Type::string()).unwrap();
        col.append_values(&strings(["a", "b"])).unwrap();
        col.clear();
        assert!(col.is_empty());
        assert_eq!(col.dictionary().size(), 1);
        col.append_values(&strings(["b"])).unwrap();
        assert_eq!(col.keys(), &[1]);
    }

    #[test]
    fn rejects_bad_index_flags() {
        let mut data = Vec::new();
        wire::write_fixed(&mut data, 1_u64).unwrap();
        wire::write_fixed(&mut data, NEED_GLOBAL_DICTIONARY | HAS_ADDITIONAL_KEYS).unwrap();
        let mut col = LowCardinalityColumn::new(Type::string()).unwrap();
        let err = col.load(&mut SliceInput::new(&data), 0).unwrap_err();
        assert!(matches!(err, ColumnError::Channel(ChannelError::Malformed(_))));

        let mut data = Vec::new();
        wire::write_fixed(&mut data, 1_u64).unwrap();
        wire::write_fixed(&mut data, 4_u64 | HAS_ADDITIONAL_KEYS).unwrap();
        assert!(col.load(&mut SliceInput::new(&data), 0).is_err());
    }

    #[test]
    fn rejects_keys_outside_the_dictionary() {
        let mut data = Vec::new();
        wire::write_fixed(&mut data, 1_u64).unwrap();
        wire::write_fixed(&mut data, HAS_ADDITIONAL_KEYS).unwrap();
        wire::write_fixed(&mut data, 1_u64).unwrap();
        wire::write_length_prefixed(&mut data, b"").unwrap();
        wire::write_fixed(&mut data, 1_u64).unwrap();
        wire::write_fixed(&mut data, 3_u8).unwrap();
        let mut col = LowCardinalityColumn::new(Type::string()).unwrap();
        let err = col.load(&mut SliceInput::new(&data), 1).unwrap_err();
        assert!(!err.is_end_of_data());
        assert!(col.is_empty());
    }

    #[test]
    fn only_scalar_dictionaries() {
        let err = LowCardinalityColumn::new(Type::nullable(Type::string())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "create_column() is not supported for column of LowCardinality(Nullable(String))"
        );
    }
}
